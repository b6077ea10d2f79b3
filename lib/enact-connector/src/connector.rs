use std::collections::HashMap;
use std::sync::Arc;

use enact_model::{ActionResult, Payload};

use crate::error::ConnectorError;

/// A typed facade over an external system (version control, a relational store, a
/// filesystem, chat) exposing a fixed, allowlisted set of named operations.
///
/// Concrete connectors (GitHub REST, Postgres, Slack, a real filesystem) are external
/// collaborators and out of scope for this crate; only the contract lives here, plus the
/// [`InMemoryConnector`] test double used to exercise the policy engine, orchestrator, and
/// rollback engine end-to-end without a live external system.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// The connector name as it appears in [`enact_model::ActionResult::system`] and in the
    /// rollback dispatch table, e.g. `"github"`.
    fn name(&self) -> &str;

    /// Invokes a named operation. Implementations MUST consult their allowlist as the first
    /// action and return [`ConnectorError::Permission`] if `action` is not present in it.
    ///
    /// Mutating operations must populate `output["alreadyDone"]` (the idempotency marker:
    /// `false` when freshly performed, a short descriptive string when the target was already
    /// in the desired state) and `rollback_data` (state captured before mutating, sufficient
    /// to reverse the action without consulting the external system again).
    async fn call(&self, action: &str, args: &Payload) -> Result<ActionResult, ConnectorError>;
}

/// The orchestrator's registry of connector instances, keyed by connector name. Built once at
/// construction time and treated as read-only afterward — the core never re-resolves or
/// replaces an entry mid-run.
pub type Systems = HashMap<String, Arc<dyn Connector>>;
