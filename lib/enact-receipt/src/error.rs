use enact_model::RunIdParseError;

#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    /// No secret was given explicitly and `ENACT_SECRET` is unset (and `allow_insecure` was
    /// not set to waive the requirement). A startup error, not a per-run one.
    #[error("no signing secret configured: pass one explicitly or set ENACT_SECRET")]
    MissingSecret,

    /// A secret shorter than 32 characters was supplied without `allow_insecure_secret`.
    #[error("signing secret is {actual} characters, minimum is {minimum} (set allow_insecure_secret to waive this in dev/test)")]
    SecretTooShort { actual: usize, minimum: usize },

    /// The `runID` is not a strict UUIDv4 textual form. Refused before any path is built.
    #[error("path traversal refused: '{0}' is not a valid run ID")]
    PathTraversal(String),

    /// The `runID` validated, but the path resolved from it somehow escaped the receipts
    /// directory. Should be unreachable given `RunId`'s validation, but checked anyway as
    /// defense in depth per the spec's path-traversal defense.
    #[error("path traversal refused: resolved path escapes the receipts directory")]
    PathEscape,

    #[error("receipts directory '{path}' could not be created or accessed: {source}")]
    Directory { path: String, #[source] source: std::io::Error },

    #[error("failed to write receipt '{run_id}': {source}")]
    Write { run_id: String, #[source] source: std::io::Error },

    #[error("receipt '{run_id}' not found")]
    NotFound { run_id: String },

    #[error("failed to read receipt '{run_id}': {source}")]
    Read { run_id: String, #[source] source: std::io::Error },

    #[error("receipt '{run_id}' is not valid JSON: {source}")]
    Corrupt { run_id: String, #[source] source: serde_json::Error },
}

impl From<RunIdParseError> for ReceiptError {
    fn from(value: RunIdParseError) -> Self {
        ReceiptError::PathTraversal(value.to_string())
    }
}
