//! Descriptive tests relating strategies, reactions and mediators
//!
//! - per-strategy summary statistics of each mediator
//! - mediator × reaction Pearson correlations (reaction coded 3/2/1)
//! - one-way ANOVA of a mediator across strategies
//! - chi-square test on the strategy × reaction table
//! - pairwise odds ratios of a positive reaction between strategies

use std::collections::BTreeMap;

use annostat_stats::{
    StatsError,
    contingency::{self, ChiSquareTest, OddsRatio},
    correlation::{self, Anova, Correlation, CorrelationStrength},
    descriptive::DescriptiveStats,
};
use serde::Serialize;

use crate::{
    config::ProfileConfig,
    observation::{self, StrategyObservation},
    profile::StrategyProfile,
};

/// Summary statistics of every mediator, per strategy.
///
/// Outer key is the mediator, inner key the strategy. Strategies without any
/// value for a mediator are absent from its map.
#[must_use]
pub fn mediator_summaries(
    rows: &[StrategyObservation],
) -> BTreeMap<String, BTreeMap<String, DescriptiveStats>> {
    let mut values = BTreeMap::<&str, BTreeMap<&str, Vec<f64>>>::new();
    for row in rows {
        for (mediator, value) in &row.mediators {
            if let Some(value) = value {
                values
                    .entry(mediator.as_str())
                    .or_default()
                    .entry(row.strategy.as_str())
                    .or_default()
                    .push(*value);
            }
        }
    }
    values
        .into_iter()
        .map(|(mediator, by_strategy)| {
            let stats = by_strategy
                .into_iter()
                .filter_map(|(strategy, v)| Some((strategy.to_owned(), DescriptiveStats::new(v)?)))
                .collect();
            (mediator.to_owned(), stats)
        })
        .collect()
}

/// Correlation between a mediator and the coded reaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediatorCorrelation {
    pub mediator: String,
    pub correlation: Correlation,
    pub strength: CorrelationStrength,
    pub significant: bool,
}

/// Correlates every mediator with the reaction coded positive 3, neutral 2,
/// negative 1.
///
/// Mediators with at most `min_correlation_observations` values are left out.
///
/// # Errors
///
/// Returns [`StatsError::NonFiniteValue`] for a non-finite mediator value.
pub fn mediator_reaction_correlations(
    rows: &[StrategyObservation],
    config: &ProfileConfig,
) -> Result<Vec<MediatorCorrelation>, StatsError> {
    let mut results = vec![];
    for mediator in observation::mediator_ids(rows.iter().map(|row| &row.mediators)) {
        let (values, scores): (Vec<f64>, Vec<f64>) = rows
            .iter()
            .filter_map(|row| {
                let value = row.mediator(&mediator)?;
                Some((value, row.reaction_class(config).score()))
            })
            .unzip();
        if values.len() <= config.min_correlation_observations {
            tracing::debug!(mediator = %mediator, n = values.len(), "too few values for correlation");
            continue;
        }
        let correlation = correlation::pearson(&values, &scores)?;
        results.push(MediatorCorrelation {
            strength: correlation.strength(),
            significant: correlation.is_significant(config.significance_level),
            mediator,
            correlation,
        });
    }
    Ok(results)
}

/// One-way ANOVA of `mediator` across strategies (groups in strategy order).
///
/// # Errors
///
/// Same as [`correlation::one_way_anova`].
pub fn anova_by_strategy(rows: &[StrategyObservation], mediator: &str) -> Result<Anova, StatsError> {
    let mut groups = BTreeMap::<&str, Vec<f64>>::new();
    for row in rows {
        if let Some(value) = row.mediator(mediator) {
            groups.entry(row.strategy.as_str()).or_default().push(value);
        }
    }
    correlation::one_way_anova(&groups.into_values().collect::<Vec<_>>())
}

/// Chi-square test of independence between strategy and reaction class.
///
/// # Errors
///
/// Same as [`contingency::chi_square_test`].
pub fn strategy_reaction_chi_square(profiles: &[StrategyProfile]) -> Result<ChiSquareTest, StatsError> {
    let table = profiles.iter().map(StrategyProfile::class_counts).collect::<Vec<_>>();
    contingency::chi_square_test(&table)
}

/// Odds ratio of a positive reaction between two strategies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseComparison {
    pub first: String,
    pub second: String,
    pub odds: OddsRatio,
    pub significant: bool,
}

/// Compares every pair of strategies, in profile order.
#[must_use]
pub fn pairwise_odds_ratios(profiles: &[StrategyProfile], significance_level: f64) -> Vec<PairwiseComparison> {
    let mut comparisons = vec![];
    for (i, first) in profiles.iter().enumerate() {
        for second in &profiles[i + 1..] {
            let odds = contingency::odds_ratio(
                first.positive_count,
                first.total - first.positive_count,
                second.positive_count,
                second.total - second.positive_count,
            );
            comparisons.push(PairwiseComparison {
                first: first.strategy.clone(),
                second: second.strategy.clone(),
                significant: odds.p_value < significance_level,
                odds,
            });
        }
    }
    comparisons
}
