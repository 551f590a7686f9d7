//! Descriptive profile of each strategy
//!
//! For every strategy: how its reactions are distributed, how effective it is
//! (`% positive − % negative`) and the mean of each mediator. The heuristic
//! [`StrategyProfiler::validate_hypothesis`] compares one mediator across two
//! groups of strategies; it is descriptive, not a significance test.

use std::collections::{BTreeMap, BTreeSet};

use annostat_stats::{
    StatsError,
    contingency::ChiSquareTest,
    correlation::Anova,
    descriptive::{self, DescriptiveStats},
};
use serde::Serialize;

use crate::{
    MediationError,
    config::{HypothesisRule, ProfileConfig},
    descriptive::{MediatorCorrelation, PairwiseComparison},
    observation::{self, StrategyObservation},
};

/// Profile of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyProfile {
    pub strategy: String,
    pub total: u64,
    pub positive_count: u64,
    pub neutral_count: u64,
    pub negative_count: u64,
    /// Percentage of positive reactions, in `[0, 100]`.
    pub positive_percent: f64,
    pub neutral_percent: f64,
    pub negative_percent: f64,
    /// `positive_percent − negative_percent`.
    pub effectiveness: f64,
    /// Percentage of each raw reaction label.
    pub reaction_distribution: BTreeMap<String, f64>,
    /// Mean of each mediator over the non-null values; `None` if all are null.
    pub mediator_means: BTreeMap<String, Option<f64>>,
}

impl StrategyProfile {
    /// Counts in [`ReactionClass::ALL`](crate::observation::ReactionClass::ALL) order.
    #[must_use]
    pub fn class_counts(&self) -> [u64; 3] {
        [self.positive_count, self.neutral_count, self.negative_count]
    }
}

/// Outcome of a heuristic group comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisCheck {
    pub name: String,
    pub mediator: String,
    pub higher_mean: f64,
    pub lower_mean: f64,
    /// `higher_mean / lower_mean`, undefined when `lower_mean == 0`.
    pub ratio: Option<f64>,
    pub ratio_threshold: f64,
    pub validated: bool,
}

/// Builds [`StrategyProfile`]s from annotated rows.
#[derive(Debug, Clone, Default)]
pub struct StrategyProfiler {
    config: ProfileConfig,
}

impl StrategyProfiler {
    #[must_use]
    pub fn new(config: ProfileConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Profiles every strategy, most effective first (ties by name).
    ///
    /// # Examples
    ///
    /// ```
    /// use annostat_mediation::{StrategyObservation, StrategyProfiler};
    ///
    /// let rows = [
    ///     StrategyObservation::new("ENGAGEMENT", "POSITIVE"),
    ///     StrategyObservation::new("ENGAGEMENT", "NEUTRAL"),
    ///     StrategyObservation::new("EXPLANATION", "NEGATIVE"),
    /// ];
    /// let profiles = StrategyProfiler::default().profile(&rows);
    /// assert_eq!(profiles[0].strategy, "ENGAGEMENT");
    /// assert!((profiles[0].effectiveness - 50.0).abs() < 1e-12);
    /// assert!((profiles[1].effectiveness + 100.0).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn profile(&self, rows: &[StrategyObservation]) -> Vec<StrategyProfile> {
        let mediators = observation::mediator_ids(rows.iter().map(|row| &row.mediators));

        let mut by_strategy = BTreeMap::<&str, Vec<&StrategyObservation>>::new();
        for row in rows {
            by_strategy.entry(row.strategy.as_str()).or_default().push(row);
        }

        let mut profiles = by_strategy
            .into_iter()
            .map(|(strategy, rows)| {
                let total = rows.len() as u64;
                let mut counts = [0_u64; 3];
                let mut labels = BTreeMap::<&str, u64>::new();
                for row in &rows {
                    let class = row.reaction_class(&self.config);
                    counts[class.index()] += 1;
                    *labels.entry(row.reaction.as_str()).or_default() += 1;
                }
                let percent = |count: u64| count as f64 / total as f64 * 100.0;
                let [positive_count, neutral_count, negative_count] = counts;

                let mediator_means = mediators
                    .iter()
                    .map(|id| {
                        let values = rows.iter().filter_map(|row| row.mediator(id)).collect::<Vec<_>>();
                        (id.clone(), descriptive::mean(&values))
                    })
                    .collect();

                StrategyProfile {
                    strategy: strategy.to_owned(),
                    total,
                    positive_count,
                    neutral_count,
                    negative_count,
                    positive_percent: percent(positive_count),
                    neutral_percent: percent(neutral_count),
                    negative_percent: percent(negative_count),
                    effectiveness: percent(positive_count) - percent(negative_count),
                    reaction_distribution: labels
                        .into_iter()
                        .map(|(label, count)| (label.to_owned(), percent(count)))
                        .collect(),
                    mediator_means,
                }
            })
            .collect::<Vec<_>>();
        profiles.sort_by(|a, b| b.effectiveness.total_cmp(&a.effectiveness));

        tracing::debug!(strategies = profiles.len(), rows = rows.len(), "strategy profile built");
        profiles
    }

    /// Compares the mean of `rule.mediator` across the two strategy groups.
    ///
    /// # Errors
    ///
    /// * [`MediationError::UnknownMediator`] - no row carries the mediator
    /// * [`MediationError::EmptyGroup`] - a group has no value for it
    ///
    /// # Examples
    ///
    /// ```
    /// use annostat_mediation::{HypothesisRule, StrategyObservation, StrategyProfiler};
    ///
    /// let rows = [
    ///     StrategyObservation::new("A", "POSITIVE").with_mediator("verbs", Some(6.0)),
    ///     StrategyObservation::new("B", "NEGATIVE").with_mediator("verbs", Some(2.0)),
    /// ];
    /// let rule = HypothesisRule {
    ///     name: "action verbs".to_owned(),
    ///     mediator: "verbs".to_owned(),
    ///     higher_group: vec!["A".to_owned()],
    ///     lower_group: vec!["B".to_owned()],
    ///     ratio_threshold: 2.0,
    /// };
    /// let check = StrategyProfiler::default().validate_hypothesis(&rows, &rule)?;
    /// assert!(check.validated);
    /// assert_eq!(check.ratio, Some(3.0));
    /// # Ok::<(), annostat_mediation::MediationError>(())
    /// ```
    pub fn validate_hypothesis(
        &self,
        rows: &[StrategyObservation],
        rule: &HypothesisRule,
    ) -> Result<HypothesisCheck, MediationError> {
        if !rows.iter().any(|row| row.mediator(&rule.mediator).is_some()) {
            return Err(MediationError::UnknownMediator {
                mediator: rule.mediator.clone(),
            });
        }

        let group_mean = |group: &[String], name: &str| {
            let members = group.iter().map(String::as_str).collect::<BTreeSet<_>>();
            let values = rows
                .iter()
                .filter(|row| members.contains(row.strategy.as_str()))
                .filter_map(|row| row.mediator(&rule.mediator))
                .collect::<Vec<_>>();
            descriptive::mean(&values).ok_or_else(|| MediationError::EmptyGroup {
                group: name.to_owned(),
                mediator: rule.mediator.clone(),
            })
        };
        let higher_mean = group_mean(&rule.higher_group, "higher")?;
        let lower_mean = group_mean(&rule.lower_group, "lower")?;

        let ratio = (lower_mean != 0.0).then(|| higher_mean / lower_mean);
        let validated = higher_mean > rule.ratio_threshold * lower_mean;

        tracing::debug!(
            name = %rule.name,
            higher_mean,
            lower_mean,
            validated,
            "hypothesis checked"
        );

        Ok(HypothesisCheck {
            name: rule.name.clone(),
            mediator: rule.mediator.clone(),
            higher_mean,
            lower_mean,
            ratio,
            ratio_threshold: rule.ratio_threshold,
            validated,
        })
    }

    /// Runs every hypothesis of the configuration, logging and skipping the
    /// ones that cannot be evaluated.
    #[must_use]
    pub fn validate_hypotheses(&self, rows: &[StrategyObservation]) -> Vec<HypothesisCheck> {
        self.config
            .hypotheses
            .iter()
            .filter_map(|rule| match self.validate_hypothesis(rows, rule) {
                Ok(check) => Some(check),
                Err(err) => {
                    tracing::warn!(name = %rule.name, %err, "hypothesis not evaluated");
                    None
                }
            })
            .collect()
    }
}

/// Everything [`StrategyProfiler`] can say about a set of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileReport {
    pub observation_count: usize,
    pub strategies: Vec<StrategyProfile>,
    pub hypotheses: Vec<HypothesisCheck>,
    pub mediator_summaries: BTreeMap<String, BTreeMap<String, DescriptiveStats>>,
    pub correlations: Vec<MediatorCorrelation>,
    /// ANOVA across strategies, for the mediators where it is defined.
    pub anovas: BTreeMap<String, Anova>,
    /// `None` when the strategy × reaction table has fewer than two populated
    /// rows or columns.
    pub chi_square: Option<ChiSquareTest>,
    pub pairwise: Vec<PairwiseComparison>,
}

impl StrategyProfiler {
    /// Builds the profile and runs every descriptive test.
    ///
    /// # Errors
    ///
    /// * [`StatsError::EmptyDataset`] - no rows
    /// * [`StatsError::NonFiniteValue`] - a non-finite mediator value
    pub fn report(&self, rows: &[StrategyObservation]) -> Result<ProfileReport, MediationError> {
        if rows.is_empty() {
            return Err(StatsError::EmptyDataset.into());
        }
        let strategies = self.profile(rows);
        let correlations = crate::descriptive::mediator_reaction_correlations(rows, &self.config)?;

        let mut anovas = BTreeMap::new();
        for mediator in observation::mediator_ids(rows.iter().map(|row| &row.mediators)) {
            match crate::descriptive::anova_by_strategy(rows, &mediator) {
                Ok(anova) => {
                    anovas.insert(mediator, anova);
                }
                Err(err @ StatsError::NonFiniteValue { .. }) => return Err(err.into()),
                Err(err) => tracing::debug!(mediator = %mediator, %err, "anova not defined"),
            }
        }

        let chi_square = match crate::descriptive::strategy_reaction_chi_square(&strategies) {
            Ok(test) => Some(test),
            Err(err) => {
                tracing::info!(%err, "chi-square test not defined");
                None
            }
        };
        let pairwise = crate::descriptive::pairwise_odds_ratios(&strategies, self.config.significance_level);

        Ok(ProfileReport {
            observation_count: rows.len(),
            hypotheses: self.validate_hypotheses(rows),
            mediator_summaries: crate::descriptive::mediator_summaries(rows),
            strategies,
            correlations,
            anovas,
            chi_square,
            pairwise,
        })
    }
}
