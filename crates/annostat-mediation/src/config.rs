use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Parameters of the mediation analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediationConfig {
    /// A mediator is analyzed only with strictly more non-null observations.
    pub min_observations: usize,
    /// Sobel p-value below which the indirect effect is significant.
    pub significance_level: f64,
    /// Sobel p-value below which a significant effect counts as full mediation.
    pub full_mediation_p: f64,
    /// `|c'|` below which the direct effect is considered absent.
    pub direct_effect_epsilon: f64,
    /// Analyze mediators on the rayon thread pool.
    pub parallel: bool,
}

impl Default for MediationConfig {
    fn default() -> Self {
        Self {
            min_observations: 10,
            significance_level: 0.05,
            full_mediation_p: 0.01,
            direct_effect_epsilon: 0.05,
            parallel: true,
        }
    }
}

/// Parameters of the strategy profile and its descriptive tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Reaction labels counted as positive (compared case-insensitively).
    pub positive_labels: BTreeSet<String>,
    /// Reaction labels counted as negative (compared case-insensitively).
    pub negative_labels: BTreeSet<String>,
    /// A mediator is correlated with the reaction only with strictly more values.
    pub min_correlation_observations: usize,
    pub significance_level: f64,
    pub hypotheses: Vec<HypothesisRule>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            positive_labels: ["POSITIVE", "POSITIF"].map(String::from).into(),
            negative_labels: ["NEGATIVE", "NEGATIF"].map(String::from).into(),
            min_correlation_observations: 10,
            significance_level: 0.05,
            hypotheses: vec![],
        }
    }
}

/// Heuristic comparison of one mediator across two groups of strategies.
///
/// The hypothesis holds when the mean over `higher_group` exceeds
/// `ratio_threshold` times the mean over `lower_group`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisRule {
    pub name: String,
    pub mediator: String,
    /// Strategies expected to show the larger mean.
    pub higher_group: Vec<String>,
    /// Strategies expected to show the smaller mean.
    pub lower_group: Vec<String>,
    #[serde(default = "default_ratio_threshold")]
    pub ratio_threshold: f64,
}

fn default_ratio_threshold() -> f64 {
    2.0
}
