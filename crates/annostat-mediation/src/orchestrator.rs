use annostat_stats::{StatsError, regression};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    MediationError,
    analyzer::{MediationAnalyzer, MediationPath},
    config::MediationConfig,
    observation::{self, MediationObservation},
};

/// Aggregated outcome of the mediation analysis over every mediator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediationResult {
    /// Effect of `x` on `y` over all units, `None` when it cannot be
    /// estimated (fewer than 3 units or a constant `x`).
    pub total_effect: Option<f64>,
    /// `total_effect − total_indirect_effect`.
    pub direct_effect: Option<f64>,
    /// One path per analyzed mediator, ordered by mediator identifier.
    pub paths: Vec<MediationPath>,
    pub total_indirect_effect: f64,
    /// `total_indirect_effect / total_effect · 100`, undefined when the total
    /// effect is zero or unknown.
    pub total_mediation_percent: Option<f64>,
    pub observation_count: usize,
    /// `true` if at least one path was computed.
    pub convergence: bool,
    /// Mediators left out of `paths`, with the reason.
    pub skipped: Vec<SkippedMediator>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedMediator {
    pub mediator: String,
    pub reason: String,
}

/// Runs [`MediationAnalyzer`] for every mediator and aggregates the effects.
#[derive(Debug, Clone, Default)]
pub struct MediationOrchestrator {
    analyzer: MediationAnalyzer,
}

impl MediationOrchestrator {
    #[must_use]
    pub fn new(config: MediationConfig) -> Self {
        Self {
            analyzer: MediationAnalyzer::new(config),
        }
    }

    /// Analyzes every mediator that appears in the observations.
    ///
    /// Mediators with too few observations or a degenerate design are listed
    /// in [`MediationResult::skipped`] instead of failing the analysis. When
    /// the total effect itself cannot be estimated, the result is returned
    /// with `convergence == false` and no total or direct effect.
    ///
    /// # Errors
    ///
    /// * [`StatsError::EmptyDataset`] - no observations
    /// * [`StatsError::NonFiniteValue`] - non-finite `x`, `y` or mediator value
    ///
    /// # Examples
    ///
    /// ```
    /// use annostat_mediation::{MediationObservation, MediationOrchestrator};
    ///
    /// let observations = (0..5)
    ///     .map(|i| MediationObservation::new(f64::from(i), 2.0 * f64::from(i)).with_mediator("m", Some(1.0)))
    ///     .collect::<Vec<_>>();
    /// let result = MediationOrchestrator::default().run(&observations)?;
    /// assert!((result.total_effect.unwrap() - 2.0).abs() < 1e-9);
    /// assert!(result.paths.is_empty());
    /// assert!(!result.convergence);
    /// assert_eq!(result.skipped[0].mediator, "m");
    /// # Ok::<(), annostat_mediation::MediationError>(())
    /// ```
    pub fn run(&self, observations: &[MediationObservation]) -> Result<MediationResult, MediationError> {
        if observations.is_empty() {
            return Err(StatsError::EmptyDataset.into());
        }
        let x = observations.iter().map(|obs| obs.x).collect::<Vec<_>>();
        let y = observations.iter().map(|obs| obs.y).collect::<Vec<_>>();
        let total_effect = match regression::fit_simple(&x, &y) {
            Ok(fit) => Some(fit.slope),
            Err(err) => {
                let err = MediationError::from(err);
                if !err.is_skippable() {
                    return Err(err);
                }
                tracing::info!(reason = %err, "total effect cannot be estimated");
                None
            }
        };

        let mediators = observation::mediator_ids(observations.iter().map(|obs| &obs.mediators));
        let analyze = |mediator: &String| self.analyzer.analyze(mediator, observations);
        let outcomes = if self.analyzer.config().parallel {
            mediators.par_iter().map(analyze).collect::<Vec<_>>()
        } else {
            mediators.iter().map(analyze).collect::<Vec<_>>()
        };

        let mut paths = vec![];
        let mut skipped = vec![];
        for (mediator, outcome) in mediators.iter().zip(outcomes) {
            match outcome {
                Ok(path) => paths.push(path),
                Err(err) if err.is_skippable() => {
                    tracing::info!(mediator = %mediator, reason = %err, "mediator omitted");
                    skipped.push(SkippedMediator {
                        mediator: mediator.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let total_indirect_effect = paths.iter().map(|p| p.indirect_effect).sum::<f64>();
        let direct_effect = total_effect.map(|total| total - total_indirect_effect);
        let total_mediation_percent = total_effect
            .filter(|total| *total != 0.0)
            .map(|total| total_indirect_effect / total * 100.0);
        let convergence = total_effect.is_some() && !paths.is_empty();
        if !convergence {
            tracing::warn!("no mediator could be analyzed");
        }

        tracing::info!(
            observations = observations.len(),
            mediators = mediators.len(),
            paths = paths.len(),
            total_effect,
            total_indirect_effect,
            "mediation analysis finished"
        );

        Ok(MediationResult {
            total_effect,
            direct_effect,
            paths,
            total_indirect_effect,
            total_mediation_percent,
            observation_count: observations.len(),
            convergence,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_distr::{Distribution as _, Normal};
    use rand_pcg::Pcg64;

    use super::*;
    use crate::analyzer::MediationType;

    /// `m1` fully mediates; `m2` is only measured on the first 10 units.
    fn dataset(seed: u64) -> Vec<MediationObservation> {
        let mut rng = Pcg64::seed_from_u64(seed);
        let m_noise = Normal::new(0.0, 0.1).unwrap();
        let y_noise = Normal::new(0.0, 0.01).unwrap();
        (0..40)
            .map(|i| {
                let x = f64::from(u8::from(i % 2 == 1));
                let m1 = 2.0 * x + m_noise.sample(&mut rng);
                let y = 3.0 * m1 + y_noise.sample(&mut rng);
                let m2 = (i < 10).then(|| m_noise.sample(&mut rng));
                MediationObservation::new(x, y)
                    .with_mediator("m2", m2)
                    .with_mediator("m1", Some(m1))
            })
            .collect()
    }

    #[test]
    fn test_underpowered_mediator_is_absent() {
        let result = MediationOrchestrator::default().run(&dataset(1)).unwrap();
        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].mediator, "m1");
        assert_eq!(result.paths[0].mediation_type, MediationType::Full);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].mediator, "m2");
        assert!(result.convergence);
        assert_eq!(result.observation_count, 40);
    }

    #[test]
    fn test_effect_decomposition() {
        let result = MediationOrchestrator::default().run(&dataset(2)).unwrap();
        let total = result.total_effect.unwrap();
        let direct = result.direct_effect.unwrap();
        assert!((total - direct - result.total_indirect_effect).abs() < 1e-12);
        let percent = result.total_mediation_percent.unwrap();
        assert!(percent > 90.0 && percent < 110.0, "percent = {percent}");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let data = dataset(3)
            .into_iter()
            .enumerate()
            .map(|(i, obs)| {
                let extra = obs.mediator("m1").map(|m| m + [0.0, 0.3, 0.6, 0.9, 1.2][i % 5]);
                obs.with_mediator("m0", extra)
            })
            .collect::<Vec<_>>();
        let parallel = MediationOrchestrator::default().run(&data).unwrap();
        let sequential = MediationOrchestrator::new(MediationConfig {
            parallel: false,
            ..MediationConfig::default()
        })
        .run(&data)
        .unwrap();
        assert_eq!(parallel, sequential);
        let order = parallel.paths.iter().map(|p| p.mediator.as_str()).collect::<Vec<_>>();
        assert_eq!(order, ["m0", "m1"]);
    }

    #[test]
    fn test_no_mediators_does_not_converge() {
        let data = (0..6)
            .map(|i| MediationObservation::new(f64::from(i), f64::from(i * i)))
            .collect::<Vec<_>>();
        let result = MediationOrchestrator::default().run(&data).unwrap();
        assert!(!result.convergence);
        assert!(result.paths.is_empty());
        assert_eq!(result.total_indirect_effect, 0.0);
        assert_eq!(result.direct_effect, result.total_effect);
    }

    #[test]
    fn test_zero_total_effect_has_undefined_percent() {
        let data = [0.0, 1.0, 0.0, 1.0]
            .into_iter()
            .map(|x| MediationObservation::new(x, 5.0))
            .collect::<Vec<_>>();
        let result = MediationOrchestrator::default().run(&data).unwrap();
        assert_eq!(result.total_effect, Some(0.0));
        assert_eq!(result.total_mediation_percent, None);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert_eq!(
            MediationOrchestrator::default().run(&[]),
            Err(MediationError::Stats(StatsError::EmptyDataset))
        );
    }

    #[test]
    fn test_two_units_do_not_converge() {
        let tiny = [
            MediationObservation::new(0.0, 1.0).with_mediator("m", Some(1.0)),
            MediationObservation::new(1.0, 2.0).with_mediator("m", Some(2.0)),
        ];
        let result = MediationOrchestrator::default().run(&tiny).unwrap();
        assert!(!result.convergence);
        assert!(result.paths.is_empty());
        assert_eq!(result.total_effect, None);
        assert_eq!(result.direct_effect, None);
        assert_eq!(result.total_mediation_percent, None);
        assert_eq!(result.observation_count, 2);
        assert_eq!(result.skipped[0].mediator, "m");
    }

    #[test]
    fn test_constant_exposure_does_not_converge() {
        let data = (0..12)
            .map(|i| MediationObservation::new(0.1, f64::from(i)).with_mediator("m", Some(f64::from(i % 3))))
            .collect::<Vec<_>>();
        let result = MediationOrchestrator::default().run(&data).unwrap();
        assert!(!result.convergence);
        assert_eq!(result.total_effect, None);
        assert_eq!(result.skipped.len(), 1);
    }

    #[test]
    fn test_non_finite_mediator_is_an_error() {
        let mut data = dataset(4);
        data[0].mediators.insert("m1".to_owned(), Some(f64::NAN));
        assert!(matches!(
            MediationOrchestrator::default().run(&data),
            Err(MediationError::Stats(StatsError::NonFiniteValue { .. }))
        ));
    }
}
