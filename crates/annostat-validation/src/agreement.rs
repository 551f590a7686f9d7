//! Accuracy and Cohen's kappa
//!
//! ```text
//! Po = diagonal / n
//! Pe = Σ_c (row_total[c] / n) · (column_total[c] / n)
//! κ  = (Po − Pe) / (1 − Pe)
//! ```
//!
//! When `Pe == 1` (both raters always use the same single label) the ratio is
//! undefined and κ is reported as `0`.

use annostat_stats::StatsError;
use serde::{Deserialize, Serialize};

use crate::confusion::ConfusionMatrix;

const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Fraction of correct predictions.
///
/// # Errors
///
/// Returns [`StatsError::EmptyDataset`] if the matrix has no observations.
#[expect(clippy::cast_precision_loss)]
pub fn accuracy(matrix: &ConfusionMatrix) -> Result<f64, StatsError> {
    let total = matrix.total();
    if total == 0 {
        return Err(StatsError::EmptyDataset);
    }
    Ok(matrix.diagonal_total() as f64 / total as f64)
}

/// Chance-corrected agreement between predictions and gold labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgreementScore {
    /// Observed agreement `Po`.
    pub observed: f64,
    /// Agreement expected by chance `Pe`.
    pub expected: f64,
    pub kappa: f64,
    pub interpretation: KappaInterpretation,
}

impl AgreementScore {
    /// Computes Cohen's kappa from a confusion matrix.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::EmptyDataset`] if the matrix has no observations.
    ///
    /// # Examples
    ///
    /// ```
    /// use annostat_validation::{agreement::AgreementScore, confusion::ConfusionMatrix};
    ///
    /// let pairs = std::iter::repeat_n(("X", "X"), 8)
    ///     .chain(std::iter::repeat_n(("X", "Y"), 2))
    ///     .chain(std::iter::repeat_n(("Y", "Y"), 10));
    /// let score = AgreementScore::cohen_kappa(&ConfusionMatrix::from_pairs(pairs))?;
    /// assert!((score.observed - 0.9).abs() < 1e-12);
    /// assert!((score.expected - 0.5).abs() < 1e-12);
    /// assert!((score.kappa - 0.8).abs() < 1e-12);
    /// # Ok::<(), annostat_stats::StatsError>(())
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn cohen_kappa(matrix: &ConfusionMatrix) -> Result<Self, StatsError> {
        let observed = accuracy(matrix)?;
        let n = matrix.total() as f64;
        let expected = matrix
            .labels()
            .map(|label| {
                (matrix.row_total(label) as f64 / n) * (matrix.column_total(label) as f64 / n)
            })
            .sum::<f64>();

        let kappa = if (1.0 - expected).abs() <= DEGENERATE_TOLERANCE {
            tracing::warn!("chance agreement is 1, reporting kappa as 0");
            0.0
        } else {
            ((observed - expected) / (1.0 - expected)).clamp(-1.0, 1.0)
        };

        tracing::debug!(observed, expected, kappa, "cohen's kappa computed");

        Ok(Self {
            observed,
            expected,
            kappa,
            interpretation: KappaInterpretation::from_kappa(kappa),
        })
    }
}

/// Landis & Koch labels for kappa values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum KappaInterpretation {
    #[display("poor")]
    Poor,
    #[display("slight")]
    Slight,
    #[display("fair")]
    Fair,
    #[display("moderate")]
    Moderate,
    #[display("substantial")]
    Substantial,
    #[display("almost perfect")]
    AlmostPerfect,
}

impl KappaInterpretation {
    #[must_use]
    pub fn from_kappa(kappa: f64) -> Self {
        match kappa {
            k if k < 0.0 => Self::Poor,
            k if k < 0.2 => Self::Slight,
            k if k < 0.4 => Self::Fair,
            k if k < 0.6 => Self::Moderate,
            k if k < 0.8 => Self::Substantial,
            _ => Self::AlmostPerfect,
        }
    }
}
