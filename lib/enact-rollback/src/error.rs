use enact_connector::ConnectorError;
use enact_model::Decision;

#[derive(Debug, thiserror::Error)]
pub enum RollbackError {
    /// The receipt's signature does not verify under the secret in use. Zero inverse
    /// operations are dispatched when this happens — checked before anything else.
    #[error("receipt signature does not verify; refusing to roll back")]
    Integrity,

    /// Only a PASS receipt can be rolled back: BLOCK has no actions to reverse, and rollback of
    /// a rollback receipt is not supported.
    #[error("receipt decision is {0}, not PASS; nothing to roll back")]
    NotReversible(Decision),

    /// An action's recorded `system` has no connector registered for this rollback.
    #[error("no connector registered for system '{0}'")]
    UnknownSystem(String),

    #[error(transparent)]
    Connector(#[from] ConnectorError),
}
