//! The workflow contract.
//!
//! A workflow is a callable taking a [`Context`] and returning an ordered list of
//! [`ActionResult`]s. Workflows are external collaborators — concrete ones (a PR-opening
//! flow, a data-migration flow) are out of scope here; only the trait they implement, and
//! the registry the orchestrator looks them up in, live in this crate.
//!
//! Workflows may perform any orchestration logic internally (retries, branching, early
//! termination after the first failed action) but the orchestrator only ever sees the
//! returned list: actions a workflow performed but did not return are invisible to receipts
//! and to rollback. If a workflow's implementation returns an `Err` instead of a result list,
//! that propagates to the caller of `Run` unchanged and no receipt is written for the
//! aborted run — the spec pins this as the resolution for what was inconsistent behavior in
//! the source system.

use std::collections::HashMap;
use std::sync::Arc;

use enact_connector::Context;
use enact_model::ActionResult;

/// Opaque workflow failure. Workflows are arbitrary external collaborators performing
/// arbitrary I/O, so their error type is left as wide as `std::error::Error` rather than
/// modeled as a closed enum here.
pub type WorkflowError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait::async_trait]
pub trait Workflow: Send + Sync {
    async fn run(&self, ctx: &Context) -> Result<Vec<ActionResult>, WorkflowError>;
}

/// The orchestrator's registry of registered workflows, keyed by the name callers pass to
/// `Run`. Built once at construction time and treated as read-only afterward.
pub type Registry = HashMap<String, Arc<dyn Workflow>>;
