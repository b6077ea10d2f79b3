use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action_result::ActionResult;
use crate::decision::Decision;
use crate::payload::Payload;
use crate::policy_result::PolicyResult;
use crate::run_id::RunId;

/// The signed audit record of a single run.
///
/// A `Receipt` is built unsigned (empty `signature`), then signed once by the receipt
/// subsystem and never mutated again afterward — any later mutation of a signed receipt
/// invalidates its signature, by construction, since the signature covers every other field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(rename = "runID")]
    pub run_id:         RunId,
    pub workflow:       String,
    #[serde(rename = "userEmail")]
    pub user_email:     String,
    pub payload:        Payload,
    #[serde(rename = "policyResults")]
    pub policy_results: Vec<PolicyResult>,
    pub decision:       Decision,
    #[serde(rename = "actionsTaken")]
    pub actions_taken:  Vec<ActionResult>,
    pub timestamp:      DateTime<Utc>,
    #[serde(rename = "originalRunID", skip_serializing_if = "Option::is_none", default)]
    pub original_run_id: Option<RunId>,
    /// HMAC-SHA256 hex digest over [`Receipt::canonical_json`]. Empty until signed.
    #[serde(default)]
    pub signature:      String,
}

/// Mirrors exactly the fields the canonical-JSON signing rule treats as signable: every field
/// of [`Receipt`] except `signature`. Kept as a distinct type (rather than
/// skip-serializing `signature` on `Receipt` itself) so that signable-field construction
/// can never accidentally diverge from what gets persisted.
#[derive(Serialize)]
struct Signable<'a> {
    #[serde(rename = "actionsTaken")]
    actions_taken:    &'a [ActionResult],
    decision:         Decision,
    #[serde(rename = "originalRunID", skip_serializing_if = "Option::is_none")]
    original_run_id:  Option<RunId>,
    payload:          &'a Payload,
    #[serde(rename = "policyResults")]
    policy_results:   &'a [PolicyResult],
    #[serde(rename = "runID")]
    run_id:           RunId,
    timestamp:        DateTime<Utc>,
    #[serde(rename = "userEmail")]
    user_email:       &'a str,
    workflow:         &'a str,
}

impl Receipt {
    /// Constructs a fresh, unsigned receipt for a completed `Run` (or `Rollback`).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        workflow: impl Into<String>,
        user_email: impl Into<String>,
        payload: Payload,
        policy_results: Vec<PolicyResult>,
        decision: Decision,
        actions_taken: Vec<ActionResult>,
        original_run_id: Option<RunId>,
    ) -> Self {
        Self {
            run_id: RunId::new(),
            workflow: workflow.into(),
            user_email: user_email.into(),
            payload,
            policy_results,
            decision,
            actions_taken,
            timestamp: Utc::now(),
            original_run_id,
            signature: String::new(),
        }
    }

    /// The canonical JSON serialization of every signable field: sorted object keys at every
    /// nesting level, no insignificant whitespace, UTF-8. This is the exact byte sequence fed
    /// to HMAC-SHA256 when signing or verifying.
    ///
    /// Relies on `serde_json::Map` being `BTreeMap`-backed (this workspace never enables
    /// `serde_json`'s `preserve_order` feature): `serde_json::to_string` on a value built from
    /// such maps is already lexicographically sorted at every level, so no separate
    /// canonicalization pass is needed.
    pub fn canonical_json(&self) -> String {
        let signable = Signable {
            actions_taken: &self.actions_taken,
            decision: self.decision,
            original_run_id: self.original_run_id,
            payload: &self.payload,
            policy_results: &self.policy_results,
            run_id: self.run_id,
            timestamp: self.timestamp,
            user_email: &self.user_email,
            workflow: &self.workflow,
        };
        serde_json::to_string(&signable).expect("Signable receipt fields are always serializable")
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }
}
