use serde::{Deserialize, Serialize};

/// Outcome of a single policy predicate evaluated against a [`crate::Context`].
///
/// A policy engine never short-circuits: every registered policy runs, and one
/// `PolicyResult` is produced per policy regardless of whether earlier ones passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyResult {
    /// Stable name of the rule. Used in audits and by tests asserting which policies fired.
    pub policy:  String,
    pub passed:  bool,
    /// Human-readable explanation, required on both pass and fail: audits need to know why a
    /// policy let something through just as much as why it blocked something.
    pub reason:  String,
}

impl PolicyResult {
    pub fn pass(policy: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { policy: policy.into(), passed: true, reason: reason.into() }
    }

    pub fn fail(policy: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { policy: policy.into(), passed: false, reason: reason.into() }
    }
}
