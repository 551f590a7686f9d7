//! Pearson correlation and one-way analysis of variance
//!
//! Significance is computed with the exact Student-t and F distributions from
//! [`crate::distribution`], not from lookup tables.
//!
//! # Examples
//!
//! ```
//! use annostat_stats::correlation::{self, CorrelationStrength};
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let y = [2.1, 3.9, 6.2, 7.8, 10.1, 12.0];
//! let corr = correlation::pearson(&x, &y)?;
//! assert!(corr.r > 0.99);
//! assert!(corr.p_value < 0.001);
//! assert_eq!(corr.strength(), CorrelationStrength::VeryStrong);
//! # Ok::<(), annostat_stats::StatsError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    descriptive,
    distribution,
    error::{StatsError, check_series},
    regression::lacks_spread,
};

/// Result of a Pearson correlation test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    /// Pearson correlation coefficient in `[-1, 1]`.
    pub r: f64,
    pub r_squared: f64,
    /// `r·√(n−2)/√(1−r²)`; `None` when it is unbounded or there is no evidence.
    pub t_statistic: Option<f64>,
    /// Two-sided p-value of the t-test.
    pub p_value: f64,
    pub n: usize,
}

impl Correlation {
    fn no_evidence(n: usize) -> Self {
        Self {
            r: 0.0,
            r_squared: 0.0,
            t_statistic: None,
            p_value: 1.0,
            n,
        }
    }

    /// Strength label for `|r|`.
    #[must_use]
    pub fn strength(&self) -> CorrelationStrength {
        CorrelationStrength::from_r(self.r)
    }

    /// Returns `true` if `p_value < alpha`.
    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Conventional strength label for a correlation coefficient.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    #[display("negligible")]
    Negligible,
    #[display("weak")]
    Weak,
    #[display("moderate")]
    Moderate,
    #[display("strong")]
    Strong,
    #[display("very strong")]
    VeryStrong,
}

impl CorrelationStrength {
    /// Classifies `|r|` with cut points 0.1, 0.3, 0.5 and 0.7.
    #[must_use]
    pub fn from_r(r: f64) -> Self {
        match r.abs() {
            a if a < 0.1 => Self::Negligible,
            a if a < 0.3 => Self::Weak,
            a if a < 0.5 => Self::Moderate,
            a if a < 0.7 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }
}

/// Computes the Pearson correlation between two paired series.
///
/// Fewer than 3 pairs, or a series without variance, is "no evidence"
/// rather than an error: `r = 0`, `p = 1`.
///
/// # Errors
///
/// * [`StatsError::LengthMismatch`] - series of different lengths
/// * [`StatsError::NonFiniteValue`] - `NaN` or infinite input
#[expect(clippy::cast_precision_loss)]
pub fn pearson(x: &[f64], y: &[f64]) -> Result<Correlation, StatsError> {
    let n = check_series("pearson correlation", 0, &[x, y])?;
    if n < 3 {
        tracing::debug!(n, "too few pairs for correlation, reporting no evidence");
        return Ok(Correlation::no_evidence(n));
    }
    let nf = n as f64;

    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;
    let (sxx, syy, sxy) = x.iter().zip(y).fold((0.0, 0.0, 0.0), |(sxx, syy, sxy), (xi, yi)| {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        (sxx + dx * dx, syy + dy * dy, sxy + dx * dy)
    });
    if lacks_spread(sxx, x) || lacks_spread(syy, y) {
        tracing::debug!(n, "constant series, reporting no evidence");
        return Ok(Correlation::no_evidence(n));
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let r_squared = r * r;
    let df = nf - 2.0;

    let (t_statistic, p_value) = if r_squared >= 1.0 {
        (None, 0.0)
    } else {
        let t = r * df.sqrt() / (1.0 - r_squared).sqrt();
        (Some(t), distribution::student_t_two_sided_p(t, df))
    };

    Ok(Correlation {
        r,
        r_squared,
        t_statistic,
        p_value,
        n,
    })
}

/// Result of a one-way ANOVA.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anova {
    pub ss_between: f64,
    pub ss_within: f64,
    pub df_between: usize,
    pub df_within: usize,
    pub ms_between: f64,
    pub ms_within: f64,
    /// `MSbetween / MSwithin`; `None` when there is no within-group variance.
    pub f_statistic: Option<f64>,
    pub p_value: f64,
    /// `SSbetween / SStotal`, `None` when the total variance is zero.
    pub eta_squared: Option<f64>,
    /// Number of non-empty groups.
    pub groups: usize,
    /// Total number of observations.
    pub n: usize,
}

impl Anova {
    /// Returns `true` if `p_value < alpha`.
    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// One-way ANOVA across groups of observations.
///
/// Empty groups are ignored. With zero within-group variance the F ratio is
/// undefined; the p-value is then 0 if the group means differ and 1 otherwise.
///
/// # Errors
///
/// * [`StatsError::EmptyDataset`] - no observations at all
/// * [`StatsError::InsufficientData`] - fewer than 2 non-empty groups, or no
///   within-group degrees of freedom
/// * [`StatsError::NonFiniteValue`] - `NaN` or infinite input
///
/// # Examples
///
/// ```
/// use annostat_stats::correlation::one_way_anova;
///
/// let groups = [vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]];
/// let anova = one_way_anova(&groups)?;
/// assert!((anova.f_statistic.unwrap() - 27.0).abs() < 1e-9);
/// assert!(anova.is_significant(0.05));
/// # Ok::<(), annostat_stats::StatsError>(())
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn one_way_anova<G>(groups: &[G]) -> Result<Anova, StatsError>
where
    G: AsRef<[f64]>,
{
    const PROCEDURE: &str = "one-way anova";

    let groups = groups
        .iter()
        .map(AsRef::as_ref)
        .filter(|g| !g.is_empty())
        .collect::<Vec<_>>();
    let n = groups.iter().map(|g| g.len()).sum::<usize>();
    if n == 0 {
        return Err(StatsError::EmptyDataset);
    }
    for g in &groups {
        check_series(PROCEDURE, 1, &[g])?;
    }
    let k = groups.len();
    if k < 2 {
        return Err(StatsError::InsufficientData {
            procedure: PROCEDURE,
            required: 2,
            actual: k,
        });
    }
    if n <= k {
        return Err(StatsError::InsufficientData {
            procedure: PROCEDURE,
            required: k + 1,
            actual: n,
        });
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n as f64;
    let ss_between = groups
        .iter()
        .map(|g| {
            let mean = g.iter().sum::<f64>() / g.len() as f64;
            g.len() as f64 * (mean - grand_mean).powi(2)
        })
        .sum::<f64>();
    let ss_within = groups.iter().map(|g| descriptive::sum_of_squares(g)).sum::<f64>();

    let df_between = k - 1;
    let df_within = n - k;
    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;

    let (f_statistic, p_value) = if ms_within > 0.0 {
        let f = ms_between / ms_within;
        (
            Some(f),
            distribution::f_survival(f, df_between as f64, df_within as f64),
        )
    } else {
        tracing::warn!("no within-group variance, F ratio is undefined");
        (None, if ss_between > 0.0 { 0.0 } else { 1.0 })
    };

    let ss_total = ss_between + ss_within;
    let eta_squared = (ss_total > 0.0).then(|| ss_between / ss_total);

    tracing::debug!(k, n, ss_between, ss_within, ?f_statistic, p_value, "anova computed");

    Ok(Anova {
        ss_between,
        ss_within,
        df_between,
        df_within,
        ms_between,
        ms_within,
        f_statistic,
        p_value,
        eta_squared,
        groups: k,
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_correlation_is_one() {
        let x = [1.0, 3.0, 2.0, 5.0, 4.0];
        let corr = pearson(&x, &x).unwrap();
        assert!((corr.r - 1.0).abs() < 1e-12);
        assert_eq!(corr.p_value, 0.0);
        assert_eq!(corr.t_statistic, None);
    }

    #[test]
    fn test_negated_correlation_is_minus_one() {
        let x = [1.0, 3.0, 2.0, 5.0, 4.0];
        let neg = x.map(|v| -v);
        let corr = pearson(&x, &neg).unwrap();
        assert!((corr.r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series_has_zero_correlation() {
        let corr = pearson(&[1.0, 2.0, 3.0, 4.0], &[7.0; 4]).unwrap();
        assert_eq!(corr.r, 0.0);
        assert_eq!(corr.p_value, 1.0);
    }

    #[test]
    fn test_inexact_constant_series_has_zero_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        for corr in [pearson(&x, &[0.1; 7]).unwrap(), pearson(&[0.1; 7], &x).unwrap()] {
            assert_eq!(corr.r, 0.0);
            assert_eq!(corr.p_value, 1.0);
            assert_eq!(corr.t_statistic, None);
        }
    }

    #[test]
    fn test_small_sample_has_no_evidence() {
        let corr = pearson(&[1.0, 2.0], &[2.0, 4.0]).unwrap();
        assert_eq!(corr.r, 0.0);
        assert_eq!(corr.p_value, 1.0);
        assert_eq!(corr.n, 2);
    }

    #[test]
    fn test_pearson_rejects_mismatch() {
        assert!(matches!(
            pearson(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(StatsError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_pearson_known_value() {
        // r = 0.8 exactly: Sxy = 8, Sxx = 10, Syy = 10
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 3.0, 2.0, 5.0, 4.0];
        let corr = pearson(&x, &y).unwrap();
        assert!((corr.r - 0.8).abs() < 1e-12);
        let t = corr.t_statistic.unwrap();
        assert!((t - 0.8 * 3.0_f64.sqrt() / 0.6).abs() < 1e-12);
        // two-sided p for t = 2.3094 with 3 df
        assert!((corr.p_value - 0.104_088).abs() < 1e-4);
        assert!(!corr.is_significant(0.05));
    }

    #[test]
    fn test_strength_thresholds() {
        assert_eq!(CorrelationStrength::from_r(0.05), CorrelationStrength::Negligible);
        assert_eq!(CorrelationStrength::from_r(-0.2), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::from_r(0.3), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_r(-0.69), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_r(0.7), CorrelationStrength::VeryStrong);
        assert_eq!(CorrelationStrength::VeryStrong.to_string(), "very strong");
    }

    #[test]
    fn test_anova_known_values() {
        let groups = [vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]];
        let anova = one_way_anova(&groups).unwrap();
        assert!((anova.ss_between - 54.0).abs() < 1e-9);
        assert!((anova.ss_within - 6.0).abs() < 1e-9);
        assert_eq!(anova.df_between, 2);
        assert_eq!(anova.df_within, 6);
        assert!((anova.f_statistic.unwrap() - 27.0).abs() < 1e-9);
        // F(2, 6) survival at 27 = 0.001
        assert!((anova.p_value - 0.001).abs() < 1e-6);
        assert!((anova.eta_squared.unwrap() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_anova_identical_groups() {
        let anova = one_way_anova(&[vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]]).unwrap();
        assert!(anova.ss_between.abs() < 1e-12);
        assert!((anova.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_anova_zero_within_variance() {
        let anova = one_way_anova(&[vec![1.0, 1.0], vec![2.0, 2.0]]).unwrap();
        assert_eq!(anova.f_statistic, None);
        assert_eq!(anova.p_value, 0.0);
    }

    #[test]
    fn test_anova_skips_empty_groups() {
        let anova = one_way_anova(&[vec![1.0, 2.0], vec![], vec![3.0, 5.0]]).unwrap();
        assert_eq!(anova.groups, 2);
        assert_eq!(anova.n, 4);
    }

    #[test]
    fn test_anova_requires_two_groups() {
        assert!(matches!(
            one_way_anova(&[vec![1.0, 2.0, 3.0]]),
            Err(StatsError::InsufficientData { required: 2, actual: 1, .. })
        ));
        assert_eq!(one_way_anova::<Vec<f64>>(&[]), Err(StatsError::EmptyDataset));
    }

    #[test]
    fn test_anova_requires_within_df() {
        assert!(matches!(
            one_way_anova(&[vec![1.0], vec![2.0]]),
            Err(StatsError::InsufficientData { .. })
        ));
    }
}
