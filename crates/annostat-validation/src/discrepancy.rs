//! Analysis of misclassifications
//!
//! Groups wrong predictions by `gold → predicted` pair, ranks the most common
//! confusions and derives improvement suggestions from simple rules.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ClassificationObservation;

/// Number of confusions kept in [`ErrorAnalysis::common_errors`].
pub const MAX_COMMON_ERRORS: usize = 10;
/// Number of example references kept per confusion.
pub const MAX_EXAMPLES: usize = 3;

const HIGH_ERROR_RATE: f64 = 0.3;
const LOW_CONFIDENCE: f64 = 0.7;
const FREQUENT_CONFUSION: u64 = 3;

/// One kind of misclassification and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonError {
    pub gold: String,
    pub predicted: String,
    pub frequency: u64,
    /// Context references of the first occurrences.
    pub examples: Vec<String>,
}

/// Rule-based hint derived from the error analysis.
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::Display)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion {
    #[display("error rate {:.1}% exceeds 30%: revise the rules or refine the model", error_rate * 100.0)]
    HighErrorRate { error_rate: f64 },
    #[display("average confidence {average_confidence:.2} is below 0.70: adjust the classification thresholds")]
    LowConfidence { average_confidence: f64 },
    #[display("frequent confusion {gold} -> {predicted} ({frequency} cases): review the distinguishing patterns")]
    FrequentConfusion {
        gold: String,
        predicted: String,
        frequency: u64,
    },
}

/// Summary of the wrong predictions in a set of observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorAnalysis {
    pub total_errors: u64,
    /// `total_errors / observations`, `0` for an empty input.
    pub error_rate: f64,
    /// Count per `"gold -> predicted"` key.
    pub errors_by_pair: BTreeMap<String, u64>,
    /// Most frequent confusions, frequency descending then labels ascending.
    pub common_errors: Vec<CommonError>,
    pub suggestions: Vec<Suggestion>,
}

impl ErrorAnalysis {
    /// Analyzes the misclassified observations.
    ///
    /// # Examples
    ///
    /// ```
    /// use annostat_validation::{ClassificationObservation, discrepancy::ErrorAnalysis};
    ///
    /// let observations = [
    ///     ClassificationObservation::new("A", "A"),
    ///     ClassificationObservation::new("B", "A"),
    ///     ClassificationObservation::new("B", "A"),
    /// ];
    /// let analysis = ErrorAnalysis::analyze(&observations);
    /// assert_eq!(analysis.total_errors, 2);
    /// assert_eq!(analysis.common_errors[0].gold, "A");
    /// assert_eq!(analysis.common_errors[0].predicted, "B");
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn analyze(observations: &[ClassificationObservation]) -> Self {
        let mut pairs = BTreeMap::<(&str, &str), (u64, Vec<String>)>::new();
        for obs in observations.iter().filter(|obs| !obs.is_correct()) {
            let (count, examples) = pairs
                .entry((obs.gold_label.as_str(), obs.predicted_label.as_str()))
                .or_default();
            *count += 1;
            if examples.len() < MAX_EXAMPLES
                && let Some(label) = obs.context.label()
            {
                examples.push(label);
            }
        }

        let total_errors = pairs.values().map(|(count, _)| count).sum::<u64>();
        let error_rate = if observations.is_empty() {
            0.0
        } else {
            total_errors as f64 / observations.len() as f64
        };
        let errors_by_pair = pairs
            .iter()
            .map(|((gold, predicted), (count, _))| (format!("{gold} -> {predicted}"), *count))
            .collect();

        let mut common_errors = pairs
            .into_iter()
            .map(|((gold, predicted), (frequency, examples))| CommonError {
                gold: gold.to_owned(),
                predicted: predicted.to_owned(),
                frequency,
                examples,
            })
            .collect::<Vec<_>>();
        // Stable sort keeps the (gold, predicted) order of the map among ties
        common_errors.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        common_errors.truncate(MAX_COMMON_ERRORS);

        let mut suggestions = vec![];
        if error_rate > HIGH_ERROR_RATE {
            suggestions.push(Suggestion::HighErrorRate { error_rate });
        }
        let confidences = observations
            .iter()
            .filter_map(|obs| obs.confidence)
            .collect::<Vec<_>>();
        if let Some(average_confidence) = annostat_stats::descriptive::mean(&confidences)
            && average_confidence < LOW_CONFIDENCE
        {
            suggestions.push(Suggestion::LowConfidence { average_confidence });
        }
        suggestions.extend(
            common_errors
                .iter()
                .filter(|e| e.frequency >= FREQUENT_CONFUSION)
                .map(|e| Suggestion::FrequentConfusion {
                    gold: e.gold.clone(),
                    predicted: e.predicted.clone(),
                    frequency: e.frequency,
                }),
        );

        tracing::debug!(total_errors, error_rate, suggestions = suggestions.len(), "error analysis done");

        Self {
            total_errors,
            error_rate,
            errors_by_pair,
            common_errors,
            suggestions,
        }
    }
}
