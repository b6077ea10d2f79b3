use std::collections::HashMap;
use std::sync::Mutex;

use enact_model::{ActionResult, Payload};
use log::debug;
use serde_json::{Value, json};

use crate::allowlist::Allowlist;
use crate::connector::Connector;
use crate::error::ConnectorError;

/// A minimal in-memory connector, not a real integration with any external system.
///
/// Exists so the policy engine, the orchestrator, and the rollback engine can all be
/// exercised end-to-end in tests without a live GitHub/Postgres/Slack/filesystem. It
/// understands exactly the subset of the inverse-dispatch catalog needed to demonstrate
/// create → merge → rollback: `create_branch`, `delete_branch`, `create_pr`, `close_pr`.
pub struct InMemoryConnector {
    name:      String,
    allowlist: Allowlist,
    branches:  Mutex<HashMap<String, BranchRecord>>,
    prs:       Mutex<HashMap<u64, PrRecord>>,
    next_pr:   Mutex<u64>,
}

struct BranchRecord {
    sha: String,
}

struct PrRecord {
    repo:   String,
    open:   bool,
}

impl InMemoryConnector {
    pub fn new(name: impl Into<String>, allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let name = name.into();
        Self {
            allowlist: Allowlist::new(name.clone(), allowed),
            name,
            branches: Mutex::new(HashMap::new()),
            prs: Mutex::new(HashMap::new()),
            next_pr: Mutex::new(1),
        }
    }

    fn branch_key(repo: &str, branch: &str) -> String {
        format!("{repo}#{branch}")
    }

    fn str_arg(args: &Payload, key: &str) -> Result<String, ConnectorError> {
        match args.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(ConnectorError::Transport { system: "memory".into(), action: key.into(), message: format!("missing or non-string argument '{key}'") }),
        }
    }

    fn create_branch(&self, args: &Payload) -> Result<ActionResult, ConnectorError> {
        let repo = Self::str_arg(args, "repo")?;
        let branch = Self::str_arg(args, "branch")?;
        let sha = args.get("sha").and_then(Value::as_str).unwrap_or("deadbeef").to_string();

        let mut branches = self.branches.lock().unwrap();
        let key = Self::branch_key(&repo, &branch);
        let already = branches.contains_key(&key);
        if !already {
            branches.insert(key, BranchRecord { sha: sha.clone() });
        }
        debug!("in-memory github: create_branch {repo}#{branch} (already_done={already})");

        let mut output = Payload::new();
        output.insert("alreadyDone".into(), if already { json!("created") } else { json!(false) });
        output.insert("repo".into(), json!(repo));
        output.insert("branch".into(), json!(branch));

        let mut rollback_data = Payload::new();
        rollback_data.insert("repo".into(), json!(repo));
        rollback_data.insert("branch".into(), json!(branch));

        Ok(ActionResult { action: "create_branch".into(), system: self.name.clone(), success: true, output, rollback_data })
    }

    fn delete_branch(&self, args: &Payload) -> Result<ActionResult, ConnectorError> {
        let repo = Self::str_arg(args, "repo")?;
        let branch = Self::str_arg(args, "branch")?;

        let mut branches = self.branches.lock().unwrap();
        let key = Self::branch_key(&repo, &branch);
        let existed = branches.remove(&key).is_some();

        let mut output = Payload::new();
        output.insert("alreadyDone".into(), if existed { json!(false) } else { json!("deleted") });

        Ok(ActionResult { action: "delete_branch".into(), system: self.name.clone(), success: true, output, rollback_data: Payload::new() })
    }

    fn create_pr(&self, args: &Payload) -> Result<ActionResult, ConnectorError> {
        let repo = Self::str_arg(args, "repo")?;

        let mut prs = self.prs.lock().unwrap();
        let mut next_pr = self.next_pr.lock().unwrap();
        let pr_number = *next_pr;
        *next_pr += 1;
        prs.insert(pr_number, PrRecord { repo: repo.clone(), open: true });

        let mut output = Payload::new();
        output.insert("alreadyDone".into(), json!(false));
        output.insert("pr_number".into(), json!(pr_number));

        let mut rollback_data = Payload::new();
        rollback_data.insert("repo".into(), json!(repo));
        rollback_data.insert("pr_number".into(), json!(pr_number));

        Ok(ActionResult { action: "create_pr".into(), system: self.name.clone(), success: true, output, rollback_data })
    }

    fn close_pr(&self, args: &Payload) -> Result<ActionResult, ConnectorError> {
        let pr_number = args.get("pr_number").and_then(Value::as_u64).ok_or_else(|| ConnectorError::Transport {
            system: "memory".into(),
            action: "close_pr".into(),
            message: "missing pr_number".into(),
        })?;

        let mut prs = self.prs.lock().unwrap();
        let was_open = prs.get(&pr_number).map(|pr| pr.open).unwrap_or(false);
        if let Some(pr) = prs.get_mut(&pr_number) {
            pr.open = false;
        }

        let mut output = Payload::new();
        output.insert("alreadyDone".into(), if was_open { json!(false) } else { json!("closed") });

        Ok(ActionResult { action: "close_pr".into(), system: self.name.clone(), success: true, output, rollback_data: Payload::new() })
    }
}

#[async_trait::async_trait]
impl Connector for InMemoryConnector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, action: &str, args: &Payload) -> Result<ActionResult, ConnectorError> {
        self.allowlist.check(action)?;
        match action {
            "create_branch" => self.create_branch(args),
            "delete_branch" => self.delete_branch(args),
            "create_pr" => self.create_pr(args),
            "close_pr" => self.close_pr(args),
            other => Err(ConnectorError::UnknownOperation { system: self.name.clone(), action: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, Value)]) -> Payload {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[tokio::test]
    async fn create_branch_is_idempotent() {
        let conn = InMemoryConnector::new("github", ["create_branch"]);
        let a = conn.call("create_branch", &args(&[("repo", json!("o/r")), ("branch", json!("agent/fix"))])).await.unwrap();
        assert_eq!(a.already_done(), enact_model::AlreadyDone::Fresh);
        assert!(!a.already_done().is_truthy());

        let b = conn.call("create_branch", &args(&[("repo", json!("o/r")), ("branch", json!("agent/fix"))])).await.unwrap();
        assert_eq!(b.already_done(), enact_model::AlreadyDone::Was("created".to_string()));
        assert!(b.already_done().is_truthy());
    }

    #[tokio::test]
    async fn disallowed_action_is_rejected() {
        let conn = InMemoryConnector::new("github", ["create_branch"]);
        let err = conn.call("delete_branch", &Payload::new()).await.unwrap_err();
        assert!(matches!(err, ConnectorError::Permission { .. }));
    }
}
