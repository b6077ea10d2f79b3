use serde_json::{Map, Value};

/// A free-form mapping from string keys to arbitrary JSON values.
///
/// Backed by [`serde_json::Map`], which (absent the `preserve_order` feature on `serde_json`,
/// which this workspace never enables) is a `BTreeMap` under the hood. That gives every
/// `Payload` lexicographically sorted keys for free, which is exactly what canonical
/// serialization for receipt signing needs: building the right value graph is enough, no
/// separate canonicalization pass is required.
pub type Payload = Map<String, Value>;

/// Reads the `alreadyDone` idempotency marker out of an action's `output` payload.
///
/// Per the connector contract, mutating operations populate this key with either the literal
/// `false` (freshly performed) or a short string describing the pre-existing state
/// (`"created"`, `"deleted"`, ...). Anything else (missing key, non-bool/non-string value) is
/// treated as `Fresh` since read operations are not required to set it at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlreadyDone {
    Fresh,
    Was(String),
}

impl AlreadyDone {
    /// True for [`AlreadyDone::Was`], mirroring the "string is truthy" convention from the
    /// contract: callers branch on this without ever parsing the string themselves.
    pub fn is_truthy(&self) -> bool {
        matches!(self, AlreadyDone::Was(_))
    }
}

pub fn already_done(output: &Payload) -> AlreadyDone {
    match output.get("alreadyDone") {
        Some(Value::String(s)) => AlreadyDone::Was(s.clone()),
        _ => AlreadyDone::Fresh,
    }
}
