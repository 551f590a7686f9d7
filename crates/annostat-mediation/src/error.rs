use annostat_stats::StatsError;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum MediationError {
    /// Too few non-null observations for a mediator to be analyzed.
    #[display("mediator '{mediator}' has {observations} observations, more than {minimum} required")]
    Underpowered {
        mediator: String,
        observations: usize,
        minimum: usize,
    },
    /// Mediator without any value in the data.
    #[display("unknown mediator '{mediator}'")]
    UnknownMediator { mediator: String },
    /// Hypothesis group without any value for the mediator.
    #[display("group '{group}' has no values for mediator '{mediator}'")]
    EmptyGroup { group: String, mediator: String },
    #[display("{_0}")]
    #[from]
    Stats(StatsError),
}

impl MediationError {
    /// Returns `true` for conditions that drop a mediator from the result set
    /// instead of aborting the whole analysis.
    #[must_use]
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::Underpowered { .. }
                | Self::Stats(StatsError::InsufficientData { .. } | StatsError::SingularDesign { .. })
        )
    }
}
