use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A run identifier: a 128-bit UUIDv4, always handled in its canonical
/// 8-4-4-4-12 hyphenated textual form (36 characters).
///
/// `RunId` is the path-traversal defense for the receipt store: it is impossible to construct
/// one from an arbitrary string without going through [`RunId::parse`], which rejects
/// anything that is not a strict UUID. A receipt filename is always `<RunId>.json`, so a
/// rejected `RunId` never reaches the filesystem layer at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RunId(Uuid);

#[derive(Debug, thiserror::Error)]
#[error("'{0}' is not a valid run ID (expected a UUIDv4 in 8-4-4-4-12 hex form)")]
pub struct RunIdParseError(String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, RunIdParseError> {
        if !is_strict_uuid(s) {
            return Err(RunIdParseError(s.to_string()));
        }
        Uuid::parse_str(s).map(Self).map_err(|_| RunIdParseError(s.to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// The strict shape check: 36 characters, hyphens at the required positions, every other
/// character an ASCII hex digit. Deliberately stricter than "parses as a UUID" alone, since
/// some UUID parsers accept loose forms (braces, no hyphens, uppercase mixed with `urn:uuid:`
/// prefixes) that we do not want to treat as valid run IDs.
fn is_strict_uuid(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    for (i, b) in bytes.iter().enumerate() {
        match i {
            8 | 13 | 18 | 23 => {
                if *b != b'-' {
                    return false;
                }
            },
            _ => {
                if !b.is_ascii_hexdigit() {
                    return false;
                }
            },
        }
    }
    true
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = RunIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RunId {
    type Error = RunIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RunId> for String {
    fn from(value: RunId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_id_roundtrips() {
        let id = RunId::new();
        let parsed = RunId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn rejects_path_traversal() {
        assert!(RunId::parse("../../etc/passwd").is_err());
        assert!(RunId::parse("../../../etc/passwd").is_err());
    }

    #[test]
    fn rejects_loose_uuid_forms() {
        assert!(RunId::parse("urn:uuid:550e8400-e29b-41d4-a716-446655440000").is_err());
        assert!(RunId::parse("{550e8400-e29b-41d4-a716-446655440000}").is_err());
        assert!(RunId::parse("550e8400e29b41d4a716446655440000").is_err());
    }

    #[test]
    fn accepts_canonical_form() {
        assert!(RunId::parse("550e8400-e29b-41d4-a716-446655440000").is_ok());
    }
}
