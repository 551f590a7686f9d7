//! Closed-form ordinary least squares regression
//!
//! Two models are provided, both solved analytically:
//!
//! - [`fit_simple`]: `y = intercept + slope·x`
//! - [`fit_two_predictor`]: `y = b0 + b1·x + b2·m`, solved on centered
//!   predictors through the 2×2 normal equations (Cramer's rule)
//!
//! Standard errors are the classical homoscedastic ones, with residual
//! variance `RSS / (n − p)` where `p` is the number of estimated parameters.
//!
//! # Examples
//!
//! ```
//! use annostat_stats::regression;
//!
//! let fit = regression::fit_simple(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0])?;
//! assert!((fit.slope - 2.0).abs() < 1e-9);
//! assert!(fit.intercept.abs() < 1e-9);
//! # Ok::<(), annostat_stats::StatsError>(())
//! ```

use serde::Serialize;

use crate::error::{StatsError, check_series};

/// Relative tolerance below which a normal-equations determinant counts as zero.
const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Relative tolerance below which a centered sum of squares is rounding noise.
const SPREAD_TOLERANCE: f64 = 1e-20;

/// Returns `true` when `centered_ss`, the centered sum of squares of
/// `values`, is zero at the raw scale of the series.
///
/// A constant such as `0.1` does not center to exactly zero, so the
/// comparison is made against `Σv²` rather than against `0`.
pub(crate) fn lacks_spread(centered_ss: f64, values: &[f64]) -> bool {
    let raw_ss = values.iter().map(|v| v * v).sum::<f64>();
    centered_ss <= 0.0 || centered_ss <= SPREAD_TOLERANCE * raw_ss
}

/// Result of a simple linear regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimpleFit {
    pub slope: f64,
    pub intercept: f64,
    /// Standard error of the slope.
    pub standard_error: f64,
    /// Number of observations used.
    pub n: usize,
}

/// Result of a two-predictor multiple regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TwoPredictorFit {
    /// Coefficient on the first predictor (`x`).
    pub b1: f64,
    /// Coefficient on the second predictor (`m`).
    pub b2: f64,
    /// Standard error of `b1`.
    pub se1: f64,
    /// Standard error of `b2`.
    pub se2: f64,
    /// Number of observations used.
    pub n: usize,
}

/// Fits `y` on `x` by ordinary least squares.
///
/// Requires `x.len() == y.len() >= 3` so the residual variance has at least
/// one degree of freedom.
///
/// # Errors
///
/// * [`StatsError::LengthMismatch`] - series of different lengths
/// * [`StatsError::InsufficientData`] - fewer than 3 observations
/// * [`StatsError::NonFiniteValue`] - `NaN` or infinite input
/// * [`StatsError::SingularDesign`] - `x` is constant
#[expect(clippy::cast_precision_loss)]
pub fn fit_simple(x: &[f64], y: &[f64]) -> Result<SimpleFit, StatsError> {
    const PROCEDURE: &str = "simple regression";
    let n = check_series(PROCEDURE, 3, &[x, y])?;
    let nf = n as f64;

    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let (sxx, sxy) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(sxx, sxy), (xi, yi)| {
            let dx = xi - mean_x;
            (sxx + dx * dx, sxy + dx * (yi - mean_y))
        });
    if lacks_spread(sxx, x) {
        return Err(StatsError::SingularDesign {
            procedure: PROCEDURE,
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let rss = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (yi - (intercept + slope * xi)).powi(2))
        .sum::<f64>();
    let mse = rss / (nf - 2.0);
    let standard_error = (mse / sxx).sqrt();

    tracing::trace!(n, slope, intercept, standard_error, "simple regression fitted");

    Ok(SimpleFit {
        slope,
        intercept,
        standard_error,
        n,
    })
}

/// Fits `y` on `x` and `m` jointly by ordinary least squares.
///
/// Predictors are centered, so the intercept is absorbed and the slopes are
/// obtained from
///
/// ```text
/// b1 = (Smm·Sxy − Sxm·Smy) / D
/// b2 = (Sxx·Smy − Sxm·Sxy) / D        D = Sxx·Smm − Sxm²
/// ```
///
/// Requires equal lengths of at least 4 (`n − 3 > 0` residual degrees of freedom).
///
/// # Errors
///
/// * [`StatsError::LengthMismatch`] - series of different lengths
/// * [`StatsError::InsufficientData`] - fewer than 4 observations
/// * [`StatsError::NonFiniteValue`] - `NaN` or infinite input
/// * [`StatsError::SingularDesign`] - `D` is numerically zero (collinear or
///   constant predictors)
#[expect(clippy::cast_precision_loss)]
pub fn fit_two_predictor(x: &[f64], m: &[f64], y: &[f64]) -> Result<TwoPredictorFit, StatsError> {
    const PROCEDURE: &str = "two-predictor regression";
    let n = check_series(PROCEDURE, 4, &[x, m, y])?;
    let nf = n as f64;

    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_m = m.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut smm = 0.0;
    let mut sxm = 0.0;
    let mut sxy = 0.0;
    let mut smy = 0.0;
    for ((xi, mi), yi) in x.iter().zip(m).zip(y) {
        let dx = xi - mean_x;
        let dm = mi - mean_m;
        let dy = yi - mean_y;
        sxx += dx * dx;
        smm += dm * dm;
        sxm += dx * dm;
        sxy += dx * dy;
        smy += dm * dy;
    }

    let denominator = sxx * smm - sxm * sxm;
    if lacks_spread(sxx, x)
        || lacks_spread(smm, m)
        || denominator <= SINGULARITY_TOLERANCE * sxx * smm
        || denominator <= 0.0
    {
        return Err(StatsError::SingularDesign {
            procedure: PROCEDURE,
        });
    }

    let b1 = (smm * sxy - sxm * smy) / denominator;
    let b2 = (sxx * smy - sxm * sxy) / denominator;

    let rss = x
        .iter()
        .zip(m)
        .zip(y)
        .map(|((xi, mi), yi)| {
            let predicted = mean_y + b1 * (xi - mean_x) + b2 * (mi - mean_m);
            (yi - predicted).powi(2)
        })
        .sum::<f64>();
    let mse = rss / (nf - 3.0);

    let se1 = (mse * smm / denominator).sqrt();
    let se2 = (mse * sxx / denominator).sqrt();

    tracing::trace!(n, b1, b2, se1, se2, "two-predictor regression fitted");

    Ok(TwoPredictorFit {
        b1,
        b2,
        se1,
        se2,
        n,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_simple_recovers_noiseless_line() {
        let fit = fit_simple(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!(fit.intercept.abs() < 1e-9);
        assert!(fit.standard_error.abs() < 1e-9);
        assert_eq!(fit.n, 5);
    }

    #[test]
    fn test_simple_standard_error() {
        // x̄ = 3, ȳ = 3.6, Sxx = 10, Sxy = 8
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 3.0, 4.0, 3.0, 6.0];
        let fit = fit_simple(&x, &y).unwrap();
        assert!((fit.slope - 0.8).abs() < 1e-12);
        assert!((fit.intercept - 1.2).abs() < 1e-12);
        // residuals [0, 0.2, 0.4, -1.4, 0.8], RSS = 2.8
        let expected_se = (2.8_f64 / 3.0 / 10.0).sqrt();
        assert!((fit.standard_error - expected_se).abs() < 1e-12);
    }

    #[test]
    fn test_simple_requires_three_points() {
        let err = fit_simple(&[1.0, 2.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            StatsError::InsufficientData {
                procedure: "simple regression",
                required: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_simple_rejects_mismatched_lengths() {
        let err = fit_simple(&[1.0, 2.0, 3.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, StatsError::LengthMismatch { .. }));
    }

    #[test]
    fn test_simple_rejects_constant_predictor() {
        let err = fit_simple(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, StatsError::SingularDesign { .. }));
    }

    #[test]
    fn test_simple_rejects_inexact_constant_predictor() {
        // 0.1 has no exact binary form, so the centered sum of squares is tiny but nonzero
        let y = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let err = fit_simple(&[0.1; 7], &y).unwrap_err();
        assert_eq!(
            err,
            StatsError::SingularDesign {
                procedure: "simple regression"
            }
        );
    }

    #[test]
    fn test_simple_accepts_small_spread_at_large_offset() {
        let x = [1e6, 1e6 + 1.0, 1e6 + 2.0, 1e6 + 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let fit = fit_simple(&x, &y).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_two_predictor_rejects_inexact_constant_mediator() {
        let x = (0..12_u8).map(|i| f64::from(i % 2)).collect::<Vec<_>>();
        let y = (0..12_u8)
            .map(|i| 2.0 * f64::from(i % 2) + 0.1 * f64::from(i))
            .collect::<Vec<_>>();
        let err = fit_two_predictor(&x, &[0.1; 12], &y).unwrap_err();
        assert_eq!(
            err,
            StatsError::SingularDesign {
                procedure: "two-predictor regression"
            }
        );
        let err = fit_two_predictor(&[0.1; 12], &x, &y).unwrap_err();
        assert!(matches!(err, StatsError::SingularDesign { .. }));
    }

    #[test]
    fn test_two_predictor_recovers_plane() {
        let x = [0.0, 1.0, 0.0, 1.0, 2.0, 3.0];
        let m = [1.0, 0.0, 2.0, 5.0, 1.0, 4.0];
        let y = x
            .iter()
            .zip(&m)
            .map(|(xi, mi)| 1.0 + 2.0 * xi - 0.5 * mi)
            .collect::<Vec<_>>();
        let fit = fit_two_predictor(&x, &m, &y).unwrap();
        assert!((fit.b1 - 2.0).abs() < 1e-9);
        assert!((fit.b2 + 0.5).abs() < 1e-9);
        assert!(fit.se1 < 1e-6);
        assert!(fit.se2 < 1e-6);
    }

    #[test]
    fn test_two_predictor_requires_four_points() {
        let err = fit_two_predictor(&[0.0, 1.0, 2.0], &[1.0, 0.0, 2.0], &[1.0, 2.0, 3.0])
            .unwrap_err();
        assert!(matches!(
            err,
            StatsError::InsufficientData {
                required: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_two_predictor_rejects_collinear_predictors() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let m = x.map(|v| 3.0 * v + 1.0);
        let y = [1.0, 3.0, 2.0, 5.0, 4.0];
        let err = fit_two_predictor(&x, &m, &y).unwrap_err();
        assert_eq!(
            err,
            StatsError::SingularDesign {
                procedure: "two-predictor regression"
            }
        );
    }

    #[test]
    fn test_two_predictor_matches_simple_when_orthogonal() {
        // m is orthogonal to x after centering, so b1 equals the simple slope
        let x = [-1.0, -1.0, 1.0, 1.0];
        let m = [-1.0, 1.0, -1.0, 1.0];
        let y = [1.0, 2.0, 4.0, 6.0];
        let multi = fit_two_predictor(&x, &m, &y).unwrap();
        let simple = fit_simple(&x, &y).unwrap();
        assert!((multi.b1 - simple.slope).abs() < 1e-12);
        assert!((multi.b2 - 0.75).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_simple_recovers_exact_lines(
            slope in -50.0_f64..50.0,
            intercept in -50.0_f64..50.0,
            xs in prop::collection::btree_set(-1000_i32..1000, 3..40),
        ) {
            let x = xs.into_iter().map(f64::from).collect::<Vec<_>>();
            let y = x.iter().map(|v| intercept + slope * v).collect::<Vec<_>>();
            let fit = fit_simple(&x, &y).unwrap();
            prop_assert!((fit.slope - slope).abs() < 1e-6);
            prop_assert!((fit.intercept - intercept).abs() < 1e-6);
        }
    }
}
