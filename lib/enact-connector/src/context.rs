use enact_model::Payload;

use crate::connector::Systems;

/// The per-run bundle passed to every policy and to the workflow.
///
/// Constructed fresh by the orchestrator for each `Run` invocation, immutable for the
/// duration of the run, and discarded once the run completes. Nothing holds a `Context`
/// across runs.
#[derive(Clone)]
pub struct Context {
    /// Identifier of the registered workflow this run invokes.
    pub workflow: String,
    /// Caller-declared actor identity. Opaque: Enact does not verify it belongs to whoever is
    /// actually making the call, it only records what was asserted.
    pub user_email: String,
    /// Free-form operational arguments; the lingua franca between caller, policies, and
    /// workflow.
    pub payload: Payload,
    /// Connector instances available to policies and the workflow, keyed by connector name.
    pub systems: Systems,
    /// Structured identity attributes (role, clearance level, ...), kept separate from
    /// `payload` so policies can distinguish asserted identity from operational arguments.
    pub user_attributes: Payload,
}

impl Context {
    pub fn new(workflow: impl Into<String>, user_email: impl Into<String>, payload: Payload, systems: Systems, user_attributes: Payload) -> Self {
        Self { workflow: workflow.into(), user_email: user_email.into(), payload, systems, user_attributes }
    }

    /// Looks up a connector by name, the way a policy or workflow that needs to consult a
    /// live system (e.g. to check for duplicates) would.
    pub fn system(&self, name: &str) -> Option<&std::sync::Arc<dyn crate::connector::Connector>> {
        self.systems.get(name)
    }
}
