use annostat_stats::context::ObservationContext;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// A single prediction of a classifier paired with its gold-standard label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationObservation {
    #[serde(default)]
    pub predicted_label: String,
    #[serde(default)]
    pub gold_label: String,
    /// Optional precomputed correctness flag; must agree with the labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    /// Classifier confidence in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Classification latency in milliseconds, `>= 0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<f64>,
    /// Group used for per-group validation (e.g., a strategy family).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "ObservationContext::is_empty")]
    pub context: ObservationContext,
}

impl ClassificationObservation {
    /// Creates an observation from a predicted and a gold label.
    pub fn new(predicted_label: impl Into<String>, gold_label: impl Into<String>) -> Self {
        Self {
            predicted_label: predicted_label.into(),
            gold_label: gold_label.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    #[must_use]
    pub fn with_processing_time_ms(mut self, ms: f64) -> Self {
        self.processing_time_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: ObservationContext) -> Self {
        self.context = context;
        self
    }

    /// Returns `true` if the prediction matches the gold label.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.predicted_label == self.gold_label
    }

    /// Checks labels, the correctness flag and the optional numeric fields.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint, tagged with `index`.
    pub fn check(&self, index: usize) -> Result<(), ValidationError> {
        if self.predicted_label.trim().is_empty() {
            return Err(ValidationError::InvalidLabel {
                index,
                field: "predicted_label",
            });
        }
        if self.gold_label.trim().is_empty() {
            return Err(ValidationError::InvalidLabel {
                index,
                field: "gold_label",
            });
        }
        if self.is_correct.is_some_and(|flag| flag != self.is_correct()) {
            return Err(ValidationError::InconsistentCorrectness { index });
        }
        if let Some(value) = self.confidence
            && !(0.0..=1.0).contains(&value)
        {
            return Err(ValidationError::OutOfRange {
                index,
                field: "confidence",
                value,
            });
        }
        if let Some(value) = self.processing_time_ms
            && !(value.is_finite() && value >= 0.0)
        {
            return Err(ValidationError::OutOfRange {
                index,
                field: "processing_time_ms",
                value,
            });
        }
        Ok(())
    }
}

/// Checks every observation, failing on the first invalid one.
///
/// # Errors
///
/// See [`ClassificationObservation::check`].
pub fn check_all(observations: &[ClassificationObservation]) -> Result<(), ValidationError> {
    observations
        .iter()
        .enumerate()
        .try_for_each(|(index, obs)| obs.check(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_label_is_rejected() {
        let obs = ClassificationObservation::new("A", "");
        assert_eq!(
            obs.check(7),
            Err(ValidationError::InvalidLabel {
                index: 7,
                field: "gold_label"
            })
        );
    }

    #[test]
    fn test_inconsistent_flag_is_rejected() {
        let mut obs = ClassificationObservation::new("A", "B");
        obs.is_correct = Some(true);
        assert_eq!(
            obs.check(0),
            Err(ValidationError::InconsistentCorrectness { index: 0 })
        );
        obs.is_correct = Some(false);
        assert_eq!(obs.check(0), Ok(()));
    }

    #[test]
    fn test_out_of_range_fields() {
        let obs = ClassificationObservation::new("A", "A").with_confidence(1.5);
        assert!(matches!(
            obs.check(0),
            Err(ValidationError::OutOfRange {
                field: "confidence",
                ..
            })
        ));
        let obs = ClassificationObservation::new("A", "A").with_processing_time_ms(-1.0);
        assert!(matches!(
            obs.check(0),
            Err(ValidationError::OutOfRange {
                field: "processing_time_ms",
                ..
            })
        ));
        let obs = ClassificationObservation::new("A", "A").with_confidence(f64::NAN);
        assert!(obs.check(0).is_err());
    }

    #[test]
    fn test_deserialize_missing_label() {
        let obs: ClassificationObservation =
            serde_json::from_str(r#"{"predicted_label": "A"}"#).unwrap();
        assert!(obs.gold_label.is_empty());
        assert!(matches!(
            check_all(&[obs]),
            Err(ValidationError::InvalidLabel { index: 0, .. })
        ));
    }

    #[test]
    fn test_deserialize_with_context() {
        let obs: ClassificationObservation = serde_json::from_str(
            r#"{"predicted_label": "A", "gold_label": "B", "context": {"call_id": "c1", "turn_id": 3}}"#,
        )
        .unwrap();
        assert_eq!(obs.context.label().as_deref(), Some("c1#3"));
        assert!(!obs.is_correct());
    }
}
