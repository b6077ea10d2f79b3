use std::collections::HashSet;

use crate::error::ConnectorError;

/// The set of operation names a connector instance is authorized to perform.
///
/// This is the hardcoded floor that complements policies: even a policy gate that would
/// allow an operation cannot make a connector perform one outside its allowlist. Every
/// connector embeds one of these and calls [`Allowlist::check`] as the first action of every
/// operation method.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    system:  String,
    allowed: HashSet<String>,
}

impl Allowlist {
    pub fn new(system: impl Into<String>, allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { system: system.into(), allowed: allowed.into_iter().map(Into::into).collect() }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn contains(&self, action: &str) -> bool {
        self.allowed.contains(action)
    }

    /// Fails with [`ConnectorError::Permission`] if `action` is not allowlisted. Call this as
    /// the first line of every mutating (and, per the contract, every) operation method.
    pub fn check(&self, action: &str) -> Result<(), ConnectorError> {
        if self.contains(action) {
            Ok(())
        } else {
            Err(ConnectorError::Permission { system: self.system.clone(), action: action.to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_listed_action() {
        let allowlist = Allowlist::new("github", ["create_branch", "create_pr"]);
        assert!(allowlist.check("create_branch").is_ok());
    }

    #[test]
    fn rejects_unlisted_action() {
        let allowlist = Allowlist::new("github", ["create_branch"]);
        let err = allowlist.check("delete_repo").unwrap_err();
        assert!(matches!(err, ConnectorError::Permission { .. }));
    }
}
