use serde::{Deserialize, Serialize};

use crate::payload::Payload;

/// Caller-facing summary of a `Run` invocation.
///
/// A convenience projection over the receipt for callers that want the successful actions'
/// outputs without reading the full receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub success:  bool,
    pub workflow: String,
    pub output:   Payload,
}
