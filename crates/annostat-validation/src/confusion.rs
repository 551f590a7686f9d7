//! Confusion matrix and per-class precision/recall/F1
//!
//! The matrix is indexed `predicted → gold → count`. Every label observed on
//! either side is both a row and a column, so the matrix is always square.
//!
//! # Examples
//!
//! ```
//! use annostat_validation::{ClassificationObservation, confusion::ConfusionMatrix};
//!
//! let observations = [
//!     ClassificationObservation::new("X", "X"),
//!     ClassificationObservation::new("X", "Y"),
//!     ClassificationObservation::new("Y", "Y"),
//! ];
//! let matrix = ConfusionMatrix::from_observations(&observations);
//! assert_eq!(matrix.count("X", "Y"), 1);
//! assert_eq!(matrix.count("Y", "X"), 0);
//! assert_eq!(matrix.total(), 3);
//! assert_eq!(matrix.diagonal_total(), 2);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::ClassificationObservation;

/// Count matrix of predicted labels against gold labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfusionMatrix {
    cells: BTreeMap<String, BTreeMap<String, u64>>,
}

impl ConfusionMatrix {
    /// Builds a matrix from `(predicted, gold)` label pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let pairs = pairs.into_iter().collect::<Vec<_>>();
        let labels = pairs
            .iter()
            .flat_map(|(predicted, gold)| [*predicted, *gold])
            .collect::<BTreeSet<_>>();

        let mut cells = labels
            .iter()
            .map(|&row| {
                let columns = labels.iter().map(|&col| (col.to_owned(), 0)).collect();
                (row.to_owned(), columns)
            })
            .collect::<BTreeMap<String, BTreeMap<String, u64>>>();
        for (predicted, gold) in pairs {
            if let Some(count) = cells.get_mut(predicted).and_then(|row| row.get_mut(gold)) {
                *count += 1;
            }
        }
        Self { cells }
    }

    /// Builds a matrix from classification observations.
    #[must_use]
    pub fn from_observations(observations: &[ClassificationObservation]) -> Self {
        Self::from_pairs(
            observations
                .iter()
                .map(|obs| (obs.predicted_label.as_str(), obs.gold_label.as_str())),
        )
    }

    /// Labels in lexical order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    #[must_use]
    pub fn label_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of observations predicted as `predicted` whose gold label is `gold`.
    #[must_use]
    pub fn count(&self, predicted: &str, gold: &str) -> u64 {
        self.cells
            .get(predicted)
            .and_then(|row| row.get(gold))
            .copied()
            .unwrap_or(0)
    }

    /// Number of predictions of `label`.
    #[must_use]
    pub fn row_total(&self, label: &str) -> u64 {
        self.cells.get(label).map_or(0, |row| row.values().sum())
    }

    /// Number of gold occurrences of `label`.
    #[must_use]
    pub fn column_total(&self, label: &str) -> u64 {
        self.cells.values().filter_map(|row| row.get(label)).sum()
    }

    /// Sum of all cells.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cells.values().flat_map(BTreeMap::values).sum()
    }

    /// Number of correct predictions.
    #[must_use]
    pub fn diagonal_total(&self) -> u64 {
        self.labels().map(|label| self.count(label, label)).sum()
    }

    /// Returns `true` if no off-diagonal cell is populated.
    #[must_use]
    pub fn is_diagonal(&self) -> bool {
        self.diagonal_total() == self.total()
    }

    /// Per-class metrics for every label, in lexical order.
    #[must_use]
    pub fn class_metrics(&self) -> BTreeMap<String, ClassMetrics> {
        self.labels()
            .map(|label| {
                let true_positives = self.count(label, label);
                let predicted = self.row_total(label);
                let support = self.column_total(label);
                let metrics = ClassMetrics::from_counts(
                    true_positives,
                    predicted - true_positives,
                    support - true_positives,
                );
                (label.to_owned(), metrics)
            })
            .collect()
    }

    /// Micro-averaged precision, recall and F1 from summed TP/FP/FN.
    #[must_use]
    pub fn micro_average(&self) -> ClassMetrics {
        let (tp, fp, fn_) = self
            .class_metrics()
            .values()
            .fold((0, 0, 0), |(tp, fp, fn_), m| {
                (
                    tp + m.true_positives,
                    fp + m.false_positives,
                    fn_ + m.false_negatives,
                )
            });
        ClassMetrics::from_counts(tp, fp, fn_)
    }
}

/// Precision, recall and F1 of one class (or of the micro average).
///
/// Each ratio is `0` when its denominator is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Gold occurrences, `TP + FN`.
    pub support: u64,
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
}

impl ClassMetrics {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_counts(true_positives: u64, false_positives: u64, false_negatives: u64) -> Self {
        let ratio = |num: u64, den: u64| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(true_positives, true_positives + false_positives);
        let recall = ratio(true_positives, true_positives + false_negatives);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
            support: true_positives + false_negatives,
            true_positives,
            false_positives,
            false_negatives,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn scenario_a() -> ConfusionMatrix {
        let pairs = std::iter::repeat_n(("X", "X"), 8)
            .chain(std::iter::repeat_n(("X", "Y"), 2))
            .chain(std::iter::repeat_n(("Y", "Y"), 10));
        ConfusionMatrix::from_pairs(pairs)
    }

    #[test]
    fn test_scenario_a_cells() {
        let matrix = scenario_a();
        assert_eq!(matrix.count("X", "X"), 8);
        assert_eq!(matrix.count("X", "Y"), 2);
        assert_eq!(matrix.count("Y", "X"), 0);
        assert_eq!(matrix.count("Y", "Y"), 10);
        assert_eq!(matrix.total(), 20);
        assert_eq!(matrix.diagonal_total(), 18);
        assert!(!matrix.is_diagonal());
    }

    #[test]
    fn test_serializes_as_nested_map() {
        let json = serde_json::to_value(scenario_a()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"X": {"X": 8, "Y": 2}, "Y": {"X": 0, "Y": 10}})
        );
    }

    #[test]
    fn test_class_metrics() {
        let metrics = scenario_a().class_metrics();
        let x = metrics["X"];
        assert!((x.precision - 0.8).abs() < 1e-12);
        assert!((x.recall - 1.0).abs() < 1e-12);
        assert_eq!(x.support, 8);
        let y = metrics["Y"];
        assert!((y.precision - 1.0).abs() < 1e-12);
        assert!((y.recall - 10.0 / 12.0).abs() < 1e-12);
        assert_eq!(y.support, 12);
    }

    #[test]
    fn test_label_seen_only_as_gold() {
        let matrix = ConfusionMatrix::from_pairs([("A", "B"), ("A", "A")]);
        assert_eq!(matrix.labels().collect::<Vec<_>>(), ["A", "B"]);
        let b = matrix.class_metrics()["B"];
        assert_eq!(b.precision, 0.0);
        assert_eq!(b.recall, 0.0);
        assert_eq!(b.f1, 0.0);
    }

    #[test]
    fn test_micro_average_equals_accuracy() {
        let micro = scenario_a().micro_average();
        assert!((micro.precision - 0.9).abs() < 1e-12);
        assert!((micro.recall - 0.9).abs() < 1e-12);
        assert!((micro.f1 - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = ConfusionMatrix::default();
        assert_eq!(matrix.total(), 0);
        assert_eq!(matrix.micro_average().f1, 0.0);
    }

    proptest! {
        #[test]
        fn prop_margins_match_observations(
            pairs in prop::collection::vec((0_usize..4, 0_usize..4), 0..60),
        ) {
            const LABELS: [&str; 4] = ["a", "b", "c", "d"];
            let matrix = ConfusionMatrix::from_pairs(
                pairs.iter().map(|&(p, g)| (LABELS[p], LABELS[g])),
            );
            prop_assert_eq!(matrix.total(), pairs.len() as u64);
            let correct = pairs.iter().filter(|(p, g)| p == g).count() as u64;
            prop_assert_eq!(matrix.diagonal_total(), correct);
            for (i, label) in LABELS.iter().enumerate() {
                let predicted = pairs.iter().filter(|(p, _)| *p == i).count() as u64;
                let gold = pairs.iter().filter(|(_, g)| *g == i).count() as u64;
                prop_assert_eq!(matrix.row_total(label), predicted);
                prop_assert_eq!(matrix.column_total(label), gold);
            }
        }
    }
}
