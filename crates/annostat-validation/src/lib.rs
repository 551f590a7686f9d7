//! Scoring of classifier predictions against a human-annotated gold standard.
//!
//! # Modules
//!
//! - [`observation`]: Classification rows and their input checks
//! - [`confusion`]: Confusion matrix and per-class precision/recall/F1
//! - [`agreement`]: Accuracy and Cohen's kappa with Landis & Koch labels
//! - [`metrics`]: Aggregate [`ValidationMetrics`], per-group metrics and
//!   threshold verdicts
//! - [`discrepancy`]: Ranking of common misclassifications and suggestions
//!
//! # Examples
//!
//! ```
//! use annostat_validation::{ClassificationObservation, ValidationMetrics};
//!
//! let observations = std::iter::repeat_n(("X", "X"), 8)
//!     .chain(std::iter::repeat_n(("X", "Y"), 2))
//!     .chain(std::iter::repeat_n(("Y", "Y"), 10))
//!     .map(|(predicted, gold)| ClassificationObservation::new(predicted, gold))
//!     .collect::<Vec<_>>();
//!
//! let metrics = ValidationMetrics::compute(&observations)?;
//! assert!((metrics.accuracy - 0.9).abs() < 1e-12);
//! assert!((metrics.kappa - 0.8).abs() < 1e-12);
//! # Ok::<(), annostat_validation::ValidationError>(())
//! ```

pub use self::{
    error::ValidationError,
    metrics::{ValidationMetrics, ValidationThresholds},
    observation::ClassificationObservation,
};

pub mod agreement;
pub mod confusion;
pub mod discrepancy;
mod error;
pub mod metrics;
pub mod observation;
