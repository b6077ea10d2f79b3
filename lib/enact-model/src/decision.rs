use serde::{Deserialize, Serialize};

/// The decision lattice a receipt's `decision` field occupies.
///
/// `PASS`/`BLOCK` are produced by `Run`; `ROLLED_BACK`/`PARTIAL` only ever appear on a
/// rollback receipt (one that carries an `originalRunID`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "BLOCK")]
    Block,
    #[serde(rename = "ROLLED_BACK")]
    RolledBack,
    #[serde(rename = "PARTIAL")]
    Partial,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Pass => "PASS",
            Decision::Block => "BLOCK",
            Decision::RolledBack => "ROLLED_BACK",
            Decision::Partial => "PARTIAL",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
