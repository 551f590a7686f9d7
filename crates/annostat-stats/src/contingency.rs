//! Tests on contingency tables of counts
//!
//! - [`chi_square_test`]: Pearson chi-square test of independence with
//!   Cramér's V as effect size.
//! - [`odds_ratio`]: 2×2 odds ratio with a log-odds z-test.

use serde::{Deserialize, Serialize};

use crate::{distribution, error::StatsError};

/// Result of a Pearson chi-square test of independence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareTest {
    pub statistic: f64,
    /// `(r − 1)(c − 1)` over the rows and columns with a non-zero total.
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    /// `√(χ² / (n · min(r − 1, c − 1)))`.
    pub cramers_v: f64,
    pub association: Association,
    /// Total number of counts in the table.
    pub n: u64,
}

impl ChiSquareTest {
    /// Returns `true` if `p_value < alpha`.
    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Strength label for Cramér's V.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Association {
    #[display("weak")]
    Weak,
    #[display("moderate")]
    Moderate,
    #[display("strong")]
    Strong,
}

impl Association {
    /// Classifies Cramér's V with cut points 0.1 and 0.3.
    #[must_use]
    pub fn from_cramers_v(v: f64) -> Self {
        if v < 0.1 {
            Self::Weak
        } else if v < 0.3 {
            Self::Moderate
        } else {
            Self::Strong
        }
    }
}

/// Pearson chi-square test of independence on a table of counts.
///
/// Rows and columns whose total is zero carry no information and are left out
/// of the degrees of freedom.
///
/// # Errors
///
/// * [`StatsError::EmptyDataset`] - the table holds no counts
/// * [`StatsError::LengthMismatch`] - rows of different widths
/// * [`StatsError::InsufficientData`] - fewer than two populated rows or columns
///
/// # Examples
///
/// ```
/// use annostat_stats::contingency::{Association, chi_square_test};
///
/// let table = [vec![30_u64, 10], vec![10, 30]];
/// let test = chi_square_test(&table)?;
/// assert!((test.statistic - 20.0).abs() < 1e-9);
/// assert_eq!(test.degrees_of_freedom, 1);
/// assert_eq!(test.association, Association::Strong);
/// # Ok::<(), annostat_stats::StatsError>(())
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn chi_square_test<R>(table: &[R]) -> Result<ChiSquareTest, StatsError>
where
    R: AsRef<[u64]>,
{
    const PROCEDURE: &str = "chi-square test";

    let width = table.first().map_or(0, |row| row.as_ref().len());
    for row in table {
        if row.as_ref().len() != width {
            return Err(StatsError::LengthMismatch {
                expected: width,
                actual: row.as_ref().len(),
            });
        }
    }

    let row_totals = table
        .iter()
        .map(|row| row.as_ref().iter().sum::<u64>())
        .collect::<Vec<_>>();
    let col_totals = (0..width)
        .map(|j| table.iter().map(|row| row.as_ref()[j]).sum::<u64>())
        .collect::<Vec<_>>();
    let n = row_totals.iter().sum::<u64>();
    if n == 0 {
        return Err(StatsError::EmptyDataset);
    }

    let rows = row_totals.iter().filter(|&&t| t > 0).count();
    let cols = col_totals.iter().filter(|&&t| t > 0).count();
    let min_dim = rows.min(cols);
    if min_dim < 2 {
        return Err(StatsError::InsufficientData {
            procedure: PROCEDURE,
            required: 2,
            actual: min_dim,
        });
    }

    let nf = n as f64;
    let mut statistic = 0.0;
    for (row, &row_total) in table.iter().zip(&row_totals) {
        for (&observed, &col_total) in row.as_ref().iter().zip(&col_totals) {
            let expected = row_total as f64 * col_total as f64 / nf;
            if expected > 0.0 {
                statistic += (observed as f64 - expected).powi(2) / expected;
            }
        }
    }

    let degrees_of_freedom = (rows - 1) * (cols - 1);
    let p_value = distribution::chi_squared_survival(statistic, degrees_of_freedom as f64);
    let cramers_v = (statistic / (nf * (min_dim - 1) as f64)).sqrt();

    tracing::debug!(statistic, degrees_of_freedom, p_value, cramers_v, "chi-square computed");

    Ok(ChiSquareTest {
        statistic,
        degrees_of_freedom,
        p_value,
        cramers_v,
        association: Association::from_cramers_v(cramers_v),
        n,
    })
}

/// Odds ratio of a 2×2 table with a log-odds z-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OddsRatio {
    pub odds_ratio: f64,
    pub log_odds_ratio: f64,
    /// Standard error of the log odds ratio.
    pub standard_error: f64,
    pub z: f64,
    /// Two-sided p-value of `z`.
    pub p_value: f64,
    /// `true` if a zero cell forced the +0.5 continuity correction.
    pub corrected: bool,
}

/// Computes the odds ratio of the 2×2 table
///
/// ```text
///            event   other
/// group A      a       b
/// group B      c       d
/// ```
///
/// i.e. `(a·d) / (b·c)`. When any cell is zero, 0.5 is added to every cell so
/// the ratio stays finite. The standard error of the log ratio is
/// `√(1/a + 1/b + 1/c + 1/d)` with each cell floored at 1.
///
/// # Examples
///
/// ```
/// use annostat_stats::contingency::odds_ratio;
///
/// let or = odds_ratio(40, 20, 20, 40);
/// assert!((or.odds_ratio - 4.0).abs() < 1e-12);
/// assert!(or.p_value < 0.01);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn odds_ratio(a: u64, b: u64, c: u64, d: u64) -> OddsRatio {
    let corrected = [a, b, c, d].contains(&0);
    let shift = if corrected { 0.5 } else { 0.0 };
    let [fa, fb, fc, fd] = [a, b, c, d].map(|v| v as f64 + shift);

    let odds_ratio = (fa * fd) / (fb * fc);
    let log_odds_ratio = odds_ratio.ln();
    let standard_error = [a, b, c, d]
        .iter()
        .map(|&v| 1.0 / v.max(1) as f64)
        .sum::<f64>()
        .sqrt();
    let z = log_odds_ratio / standard_error;

    OddsRatio {
        odds_ratio,
        log_odds_ratio,
        standard_error,
        z,
        p_value: distribution::normal_two_sided_p(z),
        corrected,
    }
}
