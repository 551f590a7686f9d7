//! Baron–Kenny mediation analysis of a single mediator
//!
//! For the units where the mediator `m` is measured:
//!
//! 1. `y ~ x` gives the total effect `c`
//! 2. `m ~ x` gives `a` and its standard error
//! 3. `y ~ x + m` gives the direct effect `c'` and `b` with its standard error
//! 4. the indirect effect `a·b` is tested with the Sobel statistic
//!
//! ```text
//! z = a·b / √(b²·se_a² + a²·se_b²)
//! ```

use annostat_stats::{distribution, regression};
use serde::{Deserialize, Serialize};

use crate::{
    MediationError,
    config::MediationConfig,
    observation::{self, MediationObservation},
};

/// Classification of a mediation path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, derive_more::IsVariant,
)]
#[serde(rename_all = "lowercase")]
pub enum MediationType {
    #[display("full")]
    Full,
    #[display("partial")]
    Partial,
    #[display("none")]
    None,
}

/// Estimated paths of one mediator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediationPath {
    pub mediator: String,
    /// Effect of `x` on the mediator.
    pub a: f64,
    pub se_a: f64,
    /// Effect of the mediator on `y`, controlling for `x`.
    pub b: f64,
    pub se_b: f64,
    /// Total effect of `x` on `y` over the same units.
    pub c: f64,
    /// Direct effect of `x` on `y`, controlling for the mediator.
    pub c_prime: f64,
    pub indirect_effect: f64,
    /// `None` when the Sobel standard error is zero and the effect is not.
    pub sobel_z: Option<f64>,
    pub p_value: f64,
    pub significant: bool,
    pub mediation_type: MediationType,
    /// `|indirect / c|`, undefined when `c == 0`.
    pub variance_explained: Option<f64>,
    /// Number of units with the mediator present.
    pub n: usize,
}

/// Runs the Baron–Kenny procedure for one mediator at a time.
#[derive(Debug, Clone, Default)]
pub struct MediationAnalyzer {
    config: MediationConfig,
}

impl MediationAnalyzer {
    #[must_use]
    pub fn new(config: MediationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &MediationConfig {
        &self.config
    }

    /// Estimates the mediation path of `mediator`.
    ///
    /// # Errors
    ///
    /// * [`MediationError::Underpowered`] - at most `min_observations` units
    ///   carry the mediator
    /// * [`MediationError::Stats`] - a regression failed (singular design,
    ///   non-finite input)
    pub fn analyze(
        &self,
        mediator: &str,
        observations: &[MediationObservation],
    ) -> Result<MediationPath, MediationError> {
        let (x, m, y) = observation::complete_cases(observations, mediator);
        let n = x.len();
        if n <= self.config.min_observations {
            return Err(MediationError::Underpowered {
                mediator: mediator.to_owned(),
                observations: n,
                minimum: self.config.min_observations,
            });
        }

        let total = regression::fit_simple(&x, &y)?;
        let a_path = regression::fit_simple(&x, &m)?;
        let joint = regression::fit_two_predictor(&x, &m, &y)?;

        let a = a_path.slope;
        let se_a = a_path.standard_error;
        let b = joint.b2;
        let se_b = joint.se2;
        let c = total.slope;
        let c_prime = joint.b1;

        let indirect_effect = a * b;
        let (sobel_z, p_value) = sobel_test(a, se_a, b, se_b);
        let significant = p_value < self.config.significance_level;
        let mediation_type = if !significant {
            MediationType::None
        } else if c_prime.abs() < self.config.direct_effect_epsilon
            || p_value < self.config.full_mediation_p
        {
            MediationType::Full
        } else {
            MediationType::Partial
        };
        let variance_explained = (c != 0.0).then(|| (indirect_effect / c).abs());

        tracing::debug!(
            mediator,
            n,
            a,
            b,
            c,
            c_prime,
            ?sobel_z,
            p_value,
            %mediation_type,
            "mediation path estimated"
        );

        Ok(MediationPath {
            mediator: mediator.to_owned(),
            a,
            se_a,
            b,
            se_b,
            c,
            c_prime,
            indirect_effect,
            sobel_z,
            p_value,
            significant,
            mediation_type,
            variance_explained,
            n,
        })
    }
}

/// Sobel z statistic and its two-sided p-value.
///
/// A zero standard error yields `z = 0, p = 1` for a zero indirect effect and
/// an undefined `z` with `p = 0` otherwise.
#[must_use]
pub fn sobel_test(a: f64, se_a: f64, b: f64, se_b: f64) -> (Option<f64>, f64) {
    let indirect = a * b;
    let se = (b * b * se_a * se_a + a * a * se_b * se_b).sqrt();
    if se > 0.0 {
        let z = indirect / se;
        (Some(z), distribution::normal_two_sided_p(z))
    } else if indirect == 0.0 {
        (Some(0.0), 1.0)
    } else {
        (None, 0.0)
    }
}
