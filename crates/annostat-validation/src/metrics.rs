use std::collections::BTreeMap;

use annostat_stats::{StatsError, descriptive};
use serde::{Deserialize, Serialize};

use crate::{
    ClassificationObservation, ValidationError,
    agreement::{self, AgreementScore, KappaInterpretation},
    confusion::{ClassMetrics, ConfusionMatrix},
    observation,
};

/// Aggregate quality metrics of a classifier against a gold standard.
///
/// Always recomputed from scratch from the observation rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationMetrics {
    pub accuracy: f64,
    /// Micro-averaged precision.
    pub precision: f64,
    /// Micro-averaged recall.
    pub recall: f64,
    /// Micro-averaged F1.
    pub f1: f64,
    pub kappa: f64,
    pub kappa_interpretation: KappaInterpretation,
    pub agreement: AgreementScore,
    pub confusion_matrix: ConfusionMatrix,
    pub class_metrics: BTreeMap<String, ClassMetrics>,
    pub total_samples: u64,
    pub correct_predictions: u64,
    /// Mean of the supplied confidences.
    pub average_confidence: Option<f64>,
    /// Mean of the positive processing times.
    pub average_processing_time_ms: Option<f64>,
}

impl ValidationMetrics {
    /// Validates the observations and computes every metric.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::Stats`] with [`StatsError::EmptyDataset`] for an
    ///   empty input
    /// * any error of [`ClassificationObservation::check`]
    ///
    /// # Examples
    ///
    /// ```
    /// use annostat_validation::{ClassificationObservation, ValidationMetrics};
    ///
    /// let observations = [
    ///     ClassificationObservation::new("A", "A"),
    ///     ClassificationObservation::new("B", "B"),
    ///     ClassificationObservation::new("A", "B"),
    ///     ClassificationObservation::new("B", "B"),
    /// ];
    /// let metrics = ValidationMetrics::compute(&observations)?;
    /// assert_eq!(metrics.total_samples, 4);
    /// assert_eq!(metrics.correct_predictions, 3);
    /// assert!((metrics.accuracy - 0.75).abs() < 1e-12);
    /// # Ok::<(), annostat_validation::ValidationError>(())
    /// ```
    pub fn compute(observations: &[ClassificationObservation]) -> Result<Self, ValidationError> {
        if observations.is_empty() {
            return Err(StatsError::EmptyDataset.into());
        }
        observation::check_all(observations)?;

        let confusion_matrix = ConfusionMatrix::from_observations(observations);
        let accuracy = agreement::accuracy(&confusion_matrix)?;
        let agreement = AgreementScore::cohen_kappa(&confusion_matrix)?;
        let micro = confusion_matrix.micro_average();

        let confidences = observations
            .iter()
            .filter_map(|obs| obs.confidence)
            .collect::<Vec<_>>();
        let processing_times = observations
            .iter()
            .filter_map(|obs| obs.processing_time_ms)
            .filter(|&ms| ms > 0.0)
            .collect::<Vec<_>>();

        let metrics = Self {
            accuracy,
            precision: micro.precision,
            recall: micro.recall,
            f1: micro.f1,
            kappa: agreement.kappa,
            kappa_interpretation: agreement.interpretation,
            agreement,
            class_metrics: confusion_matrix.class_metrics(),
            total_samples: confusion_matrix.total(),
            correct_predictions: confusion_matrix.diagonal_total(),
            confusion_matrix,
            average_confidence: descriptive::mean(&confidences),
            average_processing_time_ms: descriptive::mean(&processing_times),
        };

        tracing::info!(
            samples = metrics.total_samples,
            accuracy = metrics.accuracy,
            kappa = metrics.kappa,
            "validation metrics computed"
        );

        Ok(metrics)
    }

    /// Computes metrics separately for each observation group.
    ///
    /// Observations without a group are left out. Groups are returned in
    /// lexical order.
    ///
    /// # Errors
    ///
    /// Same as [`ValidationMetrics::compute`]; indices in errors refer to the
    /// full input slice.
    pub fn compute_grouped(
        observations: &[ClassificationObservation],
    ) -> Result<BTreeMap<String, Self>, ValidationError> {
        observation::check_all(observations)?;

        let mut groups = BTreeMap::<&str, Vec<ClassificationObservation>>::new();
        let mut ungrouped = 0_usize;
        for obs in observations {
            match &obs.group {
                Some(group) => groups.entry(group.as_str()).or_default().push(obs.clone()),
                None => ungrouped += 1,
            }
        }
        if ungrouped > 0 {
            tracing::info!(ungrouped, "observations without a group are excluded from grouped metrics");
        }

        groups
            .into_iter()
            .map(|(group, rows)| Ok((group.to_owned(), Self::compute(&rows)?)))
            .collect()
    }

    /// Checks the metrics against minimum thresholds.
    #[must_use]
    pub fn evaluate(&self, thresholds: &ValidationThresholds) -> Verdict {
        let checks = [
            (Criterion::Accuracy, self.accuracy, thresholds.minimum_accuracy),
            (Criterion::Precision, self.precision, thresholds.minimum_precision),
            (Criterion::Recall, self.recall, thresholds.minimum_recall),
            (Criterion::F1, self.f1, thresholds.minimum_f1),
        ];
        let failures = checks
            .into_iter()
            .filter(|&(_, actual, required)| actual < required)
            .map(|(criterion, actual, required)| ThresholdFailure {
                criterion,
                actual,
                required,
            })
            .collect::<Vec<_>>();
        Verdict {
            passed: failures.is_empty(),
            failures,
        }
    }
}

/// Minimum values a classifier must reach to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationThresholds {
    pub minimum_accuracy: f64,
    pub minimum_precision: f64,
    pub minimum_recall: f64,
    pub minimum_f1: f64,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            minimum_accuracy: 0.8,
            minimum_precision: 0.75,
            minimum_recall: 0.75,
            minimum_f1: 0.75,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    #[display("accuracy")]
    Accuracy,
    #[display("precision")]
    Precision,
    #[display("recall")]
    Recall,
    #[display("f1")]
    F1,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, derive_more::Display)]
#[display("{criterion} {actual:.3} is below the required {required:.3}")]
pub struct ThresholdFailure {
    pub criterion: Criterion,
    pub actual: f64,
    pub required: f64,
}

/// Outcome of [`ValidationMetrics::evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub passed: bool,
    pub failures: Vec<ThresholdFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_a() -> Vec<ClassificationObservation> {
        std::iter::repeat_n(("X", "X"), 8)
            .chain(std::iter::repeat_n(("X", "Y"), 2))
            .chain(std::iter::repeat_n(("Y", "Y"), 10))
            .map(|(predicted, gold)| ClassificationObservation::new(predicted, gold))
            .collect()
    }

    #[test]
    fn test_scenario_a() {
        let metrics = ValidationMetrics::compute(&scenario_a()).unwrap();
        assert!((metrics.accuracy - 0.9).abs() < 1e-12);
        assert!((metrics.kappa - 0.8).abs() < 1e-12);
        assert_eq!(metrics.total_samples, 20);
        assert_eq!(metrics.correct_predictions, 18);
        assert_eq!(metrics.confusion_matrix.count("X", "Y"), 2);
        assert_eq!(metrics.confusion_matrix.count("Y", "X"), 0);
        assert_eq!(metrics.kappa_interpretation, KappaInterpretation::AlmostPerfect);
        assert_eq!(metrics.average_confidence, None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            ValidationMetrics::compute(&[]),
            Err(ValidationError::Stats(StatsError::EmptyDataset))
        );
    }

    #[test]
    fn test_averages() {
        let observations = [
            ClassificationObservation::new("A", "A")
                .with_confidence(0.9)
                .with_processing_time_ms(10.0),
            ClassificationObservation::new("A", "B")
                .with_confidence(0.5)
                .with_processing_time_ms(0.0),
            ClassificationObservation::new("B", "B").with_processing_time_ms(20.0),
        ];
        let metrics = ValidationMetrics::compute(&observations).unwrap();
        assert!((metrics.average_confidence.unwrap() - 0.7).abs() < 1e-12);
        assert!((metrics.average_processing_time_ms.unwrap() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_grouped_metrics() {
        let observations = [
            ClassificationObservation::new("A", "A").with_group("open"),
            ClassificationObservation::new("B", "A").with_group("open"),
            ClassificationObservation::new("B", "B").with_group("closed"),
            ClassificationObservation::new("A", "B"),
        ];
        let grouped = ValidationMetrics::compute_grouped(&observations).unwrap();
        assert_eq!(grouped.keys().collect::<Vec<_>>(), ["closed", "open"]);
        assert!((grouped["open"].accuracy - 0.5).abs() < 1e-12);
        assert!((grouped["closed"].accuracy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_grouped_reports_original_index() {
        let observations = [
            ClassificationObservation::new("A", "A").with_group("g"),
            ClassificationObservation::new("", "A").with_group("g"),
        ];
        assert_eq!(
            ValidationMetrics::compute_grouped(&observations),
            Err(ValidationError::InvalidLabel {
                index: 1,
                field: "predicted_label"
            })
        );
    }

    #[test]
    fn test_verdict() {
        let metrics = ValidationMetrics::compute(&scenario_a()).unwrap();
        let verdict = metrics.evaluate(&ValidationThresholds::default());
        assert!(verdict.passed);

        let strict = ValidationThresholds {
            minimum_accuracy: 0.95,
            ..ValidationThresholds::default()
        };
        let verdict = metrics.evaluate(&strict);
        assert!(!verdict.passed);
        assert_eq!(verdict.failures.len(), 1);
        assert_eq!(verdict.failures[0].criterion, Criterion::Accuracy);
        assert_eq!(
            verdict.failures[0].to_string(),
            "accuracy 0.900 is below the required 0.950"
        );
    }

    #[test]
    fn test_thresholds_deserialize_partial() {
        let thresholds: ValidationThresholds =
            serde_json::from_str(r#"{"minimum_f1": 0.5}"#).unwrap();
        assert_eq!(thresholds.minimum_f1, 0.5);
        assert_eq!(thresholds.minimum_accuracy, 0.8);
    }
}
