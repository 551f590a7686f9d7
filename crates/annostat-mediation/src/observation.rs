use std::collections::{BTreeMap, BTreeSet};

use annostat_stats::context::ObservationContext;
use serde::{Deserialize, Serialize};

use crate::config::ProfileConfig;

/// One analysis unit: cause `x`, effect `y` and the mediator measurements.
///
/// A mediator that is absent from the map, or present as `null`, is missing
/// for this unit only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediationObservation {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub mediators: BTreeMap<String, Option<f64>>,
    #[serde(default, skip_serializing_if = "ObservationContext::is_empty")]
    pub context: ObservationContext,
}

impl MediationObservation {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mediator(mut self, id: impl Into<String>, value: Option<f64>) -> Self {
        self.mediators.insert(id.into(), value);
        self
    }

    /// Value of `mediator` for this unit, if measured.
    #[must_use]
    pub fn mediator(&self, mediator: &str) -> Option<f64> {
        self.mediators.get(mediator).copied().flatten()
    }
}

/// Collects the `(x, m, y)` series of the units where `mediator` is present.
pub(crate) fn complete_cases(
    observations: &[MediationObservation],
    mediator: &str,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut x = vec![];
    let mut m = vec![];
    let mut y = vec![];
    for obs in observations {
        if let Some(value) = obs.mediator(mediator) {
            x.push(obs.x);
            m.push(value);
            y.push(obs.y);
        }
    }
    (x, m, y)
}

/// One annotated turn: the strategy used, the reaction it received and the
/// mediator measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyObservation {
    pub strategy: String,
    pub reaction: String,
    #[serde(default)]
    pub mediators: BTreeMap<String, Option<f64>>,
    #[serde(default, skip_serializing_if = "ObservationContext::is_empty")]
    pub context: ObservationContext,
}

impl StrategyObservation {
    pub fn new(strategy: impl Into<String>, reaction: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            reaction: reaction.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mediator(mut self, id: impl Into<String>, value: Option<f64>) -> Self {
        self.mediators.insert(id.into(), value);
        self
    }

    #[must_use]
    pub fn mediator(&self, mediator: &str) -> Option<f64> {
        self.mediators.get(mediator).copied().flatten()
    }

    #[must_use]
    pub fn reaction_class(&self, config: &ProfileConfig) -> ReactionClass {
        ReactionClass::classify(&self.reaction, config)
    }
}

/// Polarity of a reaction label.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ReactionClass {
    #[display("positive")]
    Positive,
    #[display("neutral")]
    Neutral,
    #[display("negative")]
    Negative,
}

impl ReactionClass {
    pub const ALL: [Self; 3] = [Self::Positive, Self::Neutral, Self::Negative];

    /// Maps a reaction label to its class; labels that are neither positive
    /// nor negative are neutral.
    #[must_use]
    pub fn classify(label: &str, config: &ProfileConfig) -> Self {
        let matches = |set: &BTreeSet<String>| {
            set.iter().any(|l| l.eq_ignore_ascii_case(label.trim()))
        };
        if matches(&config.positive_labels) {
            Self::Positive
        } else if matches(&config.negative_labels) {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    /// Position in [`ReactionClass::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Ordinal coding used for correlations: positive 3, neutral 2, negative 1.
    #[must_use]
    pub fn score(self) -> f64 {
        match self {
            Self::Positive => 3.0,
            Self::Neutral => 2.0,
            Self::Negative => 1.0,
        }
    }
}

/// Union of the mediator identifiers present in the rows, in lexical order.
pub(crate) fn mediator_ids<'a, I>(maps: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a BTreeMap<String, Option<f64>>>,
{
    maps.into_iter()
        .flat_map(BTreeMap::keys)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}
