use serde::{Deserialize, Serialize};

use crate::payload::{AlreadyDone, Payload, already_done};

/// Outcome of one connector operation, forward or inverse.
///
/// Created by a connector method, appended to a run's action list, and later referenced
/// verbatim by the rollback engine — `rollbackData` must be sufficient on its own to reverse
/// the action; nothing is re-fetched from the external system at rollback time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Operation name, e.g. `"create_branch"`.
    pub action:       String,
    /// Owning connector name, e.g. `"github"`.
    pub system:       String,
    pub success:      bool,
    /// Operation-specific return data. Mutating operations carry `alreadyDone` here.
    pub output:       Payload,
    /// State captured at action time, sufficient to reverse the action without consulting the
    /// external system again.
    #[serde(rename = "rollbackData")]
    pub rollback_data: Payload,
}

impl ActionResult {
    pub fn already_done(&self) -> AlreadyDone {
        already_done(&self.output)
    }
}
