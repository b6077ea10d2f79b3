use enact_connector::Systems;
use enact_model::{ActionResult, Decision, Receipt};
use enact_receipt::Secret;
use log::{info, warn};

use crate::catalog::{self, Classification, Inverse};
use crate::error::RollbackError;

/// Reverses a completed run.
///
/// Holds only a reference to the orchestrator's connector registry: an engine is cheap to
/// construct per call and carries no state of its own between runs.
pub struct RollbackEngine<'a> {
    systems: &'a Systems,
}

impl<'a> RollbackEngine<'a> {
    pub fn new(systems: &'a Systems) -> Self {
        Self { systems }
    }

    /// Rolls back `receipt`. Verifies its signature and decision before dispatching anything;
    /// walks `actionsTaken` in strict reverse; stops at the first inversion that fails.
    ///
    /// Returns a freshly built, signed rollback receipt — never mutates `receipt` itself.
    pub async fn rollback(&self, receipt: &Receipt, secret: &Secret) -> Result<Receipt, RollbackError> {
        if !enact_receipt::verify(receipt, secret) {
            return Err(RollbackError::Integrity);
        }
        if receipt.decision != Decision::Pass {
            return Err(RollbackError::NotReversible(receipt.decision));
        }

        let mut inversions: Vec<ActionResult> = Vec::new();
        for action in receipt.actions_taken.iter().rev() {
            match catalog::classify(&action.system, &action.action) {
                Classification::ReadOnly => continue,
                Classification::Irreversible => {
                    info!("rollback: skipping irreversible action {}.{}", action.system, action.action);
                    continue;
                },
                Classification::Reversible => {
                    let Some(inverse) = catalog::inverse_of(&action.system, &action.action) else {
                        warn!("rollback: {}.{} classified reversible but has no inverse entry; skipping", action.system, action.action);
                        continue;
                    };
                    let connector = self
                        .systems
                        .get(&action.system)
                        .ok_or_else(|| RollbackError::UnknownSystem(action.system.clone()))?;
                    let inverse_action = match inverse {
                        Inverse::SameArgs(name) => name,
                        Inverse::FilesystemRestore => {
                            if action.rollback_data.contains_key("content") {
                                "write_file"
                            } else {
                                "delete_file"
                            }
                        },
                    };
                    let result = connector.call(inverse_action, &action.rollback_data).await?;
                    let failed = !result.success;
                    inversions.push(result);
                    if failed {
                        break;
                    }
                },
            }
        }

        let decision = if inversions.last().map(|r| !r.success).unwrap_or(false) { Decision::Partial } else { Decision::RolledBack };

        let mut rollback_receipt = Receipt::new(
            receipt.workflow.clone(),
            receipt.user_email.clone(),
            receipt.payload.clone(),
            receipt.policy_results.clone(),
            decision,
            inversions,
            Some(receipt.run_id),
        );
        enact_receipt::sign(&mut rollback_receipt, secret);
        Ok(rollback_receipt)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use enact_connector::InMemoryConnector;
    use enact_model::{Payload, PolicyResult};
    use serde_json::json;

    use super::*;

    fn secret() -> Secret {
        Secret::resolve(Some("s".repeat(32)), false).unwrap()
    }

    fn systems_with_github() -> Systems {
        let mut systems: Systems = Systems::new();
        let conn: Arc<dyn enact_connector::Connector> =
            Arc::new(InMemoryConnector::new("github", ["create_branch", "delete_branch", "create_pr", "close_pr"]));
        systems.insert("github".into(), conn);
        systems
    }

    fn rollback_data(pairs: &[(&str, serde_json::Value)]) -> Payload {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    async fn run_pass_receipt(systems: &Systems, secret: &Secret) -> Receipt {
        let github = systems.get("github").unwrap();
        let branch = github.call("create_branch", &rollback_data(&[("repo", json!("o/r")), ("branch", json!("agent/fix"))])).await.unwrap();
        let pr = github.call("create_pr", &rollback_data(&[("repo", json!("o/r"))])).await.unwrap();

        let mut receipt = Receipt::new(
            "pr_flow",
            "a@x.test",
            Payload::new(),
            vec![PolicyResult::pass("freeze", "not frozen")],
            Decision::Pass,
            vec![branch, pr],
            None,
        );
        enact_receipt::sign(&mut receipt, secret);
        receipt
    }

    #[tokio::test]
    async fn rollback_inverts_actions_in_strict_reverse() {
        let systems = systems_with_github();
        let secret = secret();
        let original = run_pass_receipt(&systems, &secret).await;

        let engine = RollbackEngine::new(&systems);
        let result = engine.rollback(&original, &secret).await.unwrap();

        assert_eq!(result.decision, Decision::RolledBack);
        assert_eq!(result.original_run_id, Some(original.run_id));
        assert_eq!(result.actions_taken.len(), 2);
        assert_eq!(result.actions_taken[0].action, "close_pr");
        assert_eq!(result.actions_taken[1].action, "delete_branch");
        assert!(enact_receipt::verify(&result, &secret));
    }

    #[tokio::test]
    async fn rollback_refuses_a_tampered_receipt() {
        let systems = systems_with_github();
        let secret = secret();
        let mut original = run_pass_receipt(&systems, &secret).await;
        original.decision = Decision::Pass; // already PASS, but mutate something signed
        original.workflow = "tampered".into();

        let engine = RollbackEngine::new(&systems);
        let err = engine.rollback(&original, &secret).await.unwrap_err();
        assert!(matches!(err, RollbackError::Integrity));
    }

    #[tokio::test]
    async fn rollback_of_a_block_receipt_is_refused() {
        let systems = systems_with_github();
        let secret = secret();
        let mut receipt = Receipt::new("pr_flow", "a@x.test", Payload::new(), vec![PolicyResult::fail("freeze", "frozen")], Decision::Block, vec![], None);
        enact_receipt::sign(&mut receipt, &secret);

        let engine = RollbackEngine::new(&systems);
        let err = engine.rollback(&receipt, &secret).await.unwrap_err();
        assert!(matches!(err, RollbackError::NotReversible(Decision::Block)));
    }

    #[tokio::test]
    async fn an_unregistered_system_is_refused() {
        let systems: Systems = Systems::new();
        let secret = secret();
        let branch = ActionResult {
            action: "create_branch".into(),
            system: "github".into(),
            success: true,
            output: Payload::new(),
            rollback_data: rollback_data(&[("repo", json!("o/r")), ("branch", json!("agent/fix"))]),
        };
        let mut receipt = Receipt::new("pr_flow", "a@x.test", Payload::new(), vec![], Decision::Pass, vec![branch], None);
        enact_receipt::sign(&mut receipt, &secret);

        let engine = RollbackEngine::new(&systems);
        let err = engine.rollback(&receipt, &secret).await.unwrap_err();
        assert!(matches!(err, RollbackError::UnknownSystem(system) if system == "github"));
    }

    /// A double whose single inverse call always reports `success: false`, standing in for the
    /// `merge_pr` → `revert_commit` failure in the partial-rollback scenario.
    struct AlwaysFailingInverse;

    #[async_trait::async_trait]
    impl enact_connector::Connector for AlwaysFailingInverse {
        fn name(&self) -> &str {
            "github"
        }

        async fn call(&self, action: &str, _args: &Payload) -> Result<ActionResult, enact_connector::ConnectorError> {
            Ok(ActionResult { action: action.into(), system: "github".into(), success: false, output: Payload::new(), rollback_data: Payload::new() })
        }
    }

    #[tokio::test]
    async fn a_failed_inversion_stops_the_walk_and_yields_partial() {
        let mut systems: Systems = Systems::new();
        let conn: Arc<dyn enact_connector::Connector> = Arc::new(AlwaysFailingInverse);
        systems.insert("github".into(), conn);
        let secret = secret();

        let branch = ActionResult {
            action: "create_branch".into(),
            system: "github".into(),
            success: true,
            output: Payload::new(),
            rollback_data: rollback_data(&[("repo", json!("o/r")), ("branch", json!("agent/fix"))]),
        };
        let merge = ActionResult {
            action: "merge_pr".into(),
            system: "github".into(),
            success: true,
            output: Payload::new(),
            rollback_data: rollback_data(&[("repo", json!("o/r")), ("base_branch", json!("main")), ("merge_sha", json!("abc123"))]),
        };
        let mut receipt = Receipt::new("pr_flow", "a@x.test", Payload::new(), vec![], Decision::Pass, vec![branch, merge], None);
        enact_receipt::sign(&mut receipt, &secret);

        let engine = RollbackEngine::new(&systems);
        let result = engine.rollback(&receipt, &secret).await.unwrap();

        assert_eq!(result.decision, Decision::Partial);
        assert_eq!(result.actions_taken.len(), 1, "delete_branch must not be attempted after revert_commit fails");
        assert_eq!(result.actions_taken[0].action, "revert_commit");
        assert!(!result.actions_taken[0].success);
    }
}
