/// Errors raised by the statistical primitives.
///
/// Procedures that cannot produce a meaningful number fail loudly with one
/// of these variants instead of returning `NaN` or infinity.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum StatsError {
    /// No observations where a non-zero denominator is required.
    #[display("no observations to evaluate")]
    EmptyDataset,
    /// Sample size below the minimum a procedure needs.
    #[display("{procedure} requires at least {required} observations, got {actual}")]
    InsufficientData {
        procedure: &'static str,
        required: usize,
        actual: usize,
    },
    /// Predictors without independent variation (collinear or constant).
    #[display("{procedure}: design matrix is singular (collinear or constant predictors)")]
    SingularDesign { procedure: &'static str },
    /// Paired series of different lengths.
    #[display("series length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    /// `NaN` or infinite input value.
    #[display("non-finite value at index {index}")]
    NonFiniteValue { index: usize },
}

/// Checks that all series have the same length, at least `required` values,
/// and only finite entries.
pub(crate) fn check_series(
    procedure: &'static str,
    required: usize,
    series: &[&[f64]],
) -> Result<usize, StatsError> {
    let Some(first) = series.first() else {
        return Err(StatsError::EmptyDataset);
    };
    let n = first.len();
    for s in &series[1..] {
        if s.len() != n {
            return Err(StatsError::LengthMismatch {
                expected: n,
                actual: s.len(),
            });
        }
    }
    if n < required {
        return Err(StatsError::InsufficientData {
            procedure,
            required,
            actual: n,
        });
    }
    for s in series {
        if let Some(index) = s.iter().position(|v| !v.is_finite()) {
            return Err(StatsError::NonFiniteValue { index });
        }
    }
    Ok(n)
}
