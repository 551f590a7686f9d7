use annostat_stats::StatsError;

/// Errors raised while scoring classification observations.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ValidationError {
    /// A required label is missing or empty.
    #[display("observation {index}: {field} is empty")]
    InvalidLabel { index: usize, field: &'static str },
    /// `is_correct` was supplied and disagrees with the labels.
    #[display("observation {index}: is_correct does not match predicted and gold labels")]
    InconsistentCorrectness { index: usize },
    /// An optional numeric field lies outside its domain.
    #[display("observation {index}: {field} = {value} is out of range")]
    OutOfRange {
        index: usize,
        field: &'static str,
        value: f64,
    },
    #[display("{_0}")]
    #[from]
    Stats(StatsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ValidationError::InvalidLabel {
            index: 3,
            field: "gold_label",
        };
        assert_eq!(err.to_string(), "observation 3: gold_label is empty");

        let err = ValidationError::from(StatsError::EmptyDataset);
        assert_eq!(err.to_string(), "no observations to evaluate");
    }
}
