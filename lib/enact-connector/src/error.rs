/// Errors a connector operation can raise.
///
/// Distinct from [`enact_model::ActionResult`] with `success: false`: an `ActionResult` is a
/// normal outcome (the remote system rejected the operation, a precondition failed) that a
/// workflow is free to inspect and continue past. A `ConnectorError` is raised instead of
/// returned, and is reserved for the two situations a workflow cannot be expected to recover
/// from: invoking an operation outside the connector's allowlist, or some lower-level
/// transport/protocol failure talking to the external system.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// The operation name is absent from this connector instance's allowlist. Raised before
    /// any other work happens — every operation method consults the allowlist first.
    #[error("'{action}' is not in the allowlist for connector '{system}'")]
    Permission { system: String, action: String },

    /// An operation this connector does not implement at all (as opposed to one it knows but
    /// has not been allowlisted for).
    #[error("connector '{system}' has no operation '{action}'")]
    UnknownOperation { system: String, action: String },

    /// A lower-level failure reaching or parsing a response from the external system.
    #[error("connector '{system}' operation '{action}' failed: {message}")]
    Transport { system: String, action: String, message: String },
}
