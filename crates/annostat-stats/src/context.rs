use serde::{Deserialize, Serialize};

/// Optional provenance attached to an observation row.
///
/// Carried through the computations untouched and surfaced where examples are
/// reported (e.g., misclassification examples).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationContext {
    /// Identifier of the call the row was taken from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    /// Turn number within the call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl ObservationContext {
    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.call_id.is_none() && self.turn_id.is_none() && self.speaker.is_none()
    }

    /// Short human-readable reference such as `call-12#4`, if any field is set.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match (&self.call_id, self.turn_id) {
            (Some(call), Some(turn)) => Some(format!("{call}#{turn}")),
            (Some(call), None) => Some(call.clone()),
            (None, Some(turn)) => Some(format!("#{turn}")),
            (None, None) => self.speaker.clone(),
        }
    }
}
