//! The run orchestrator: wires the policy engine, connector registry, workflow registry, and
//! receipt subsystem together behind the two operations callers actually invoke, `run` and
//! `rollback`.
//!
//! A [`Client`] is assembled once, through [`ClientBuilder`], and is read-only for the rest of
//! its life: registered policies, workflows, and connectors never change after `build()`, and
//! the signing secret is resolved exactly once. The one documented exception is the freeze
//! policy (`enact_policy::freeze::freeze_policy`), which re-reads `ENACT_FREEZE` on every
//! evaluation by design.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use enact_connector::{Connector, Context, Systems};
use enact_model::{Payload, Receipt, RunId, RunResult};
use enact_policy::PolicyFn;
use enact_receipt::{ReceiptError, ReceiptStore, Secret};
use enact_rollback::{RollbackEngine, RollbackError};
use enact_workflow::{Registry, Workflow, WorkflowError};
use log::{debug, info};
use serde_json::Value;

const RECEIPTS_DIR_ENV_VAR: &str = "ENACT_RECEIPTS_DIR";
const DEFAULT_RECEIPTS_DIR: &str = "./receipts";

/// Errors `Client::run` and `Client::rollback` can return.
///
/// Policy failures and partial rollbacks are never modeled here — they are first-class
/// `Decision`s on a receipt that both calls return successfully. Only configuration and
/// integrity problems (an unknown workflow, an unreachable receipts directory, a tampered
/// receipt) propagate as `Err`.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("no workflow registered under the name '{0}'")]
    UnknownWorkflow(String),

    #[error("rollback was not enabled on this client")]
    RollbackDisabled,

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error(transparent)]
    Rollback(#[from] RollbackError),

    /// An uncaught error from a workflow's own implementation. Per the workflow contract, this
    /// propagates unchanged and no receipt is written for the aborted run.
    #[error("workflow '{workflow}' failed: {source}")]
    Workflow {
        workflow: String,
        #[source]
        source:   WorkflowError,
    },
}

/// Assembles a [`Client`]. Mirrors the way the policy-reasoner's `Srv` is built from a flat
/// list of named collaborators, except as a fluent builder: the number of optional ambient
/// knobs here (secret vs. `ENACT_SECRET`, `allow_insecure_secret`, receipts directory vs.
/// `ENACT_RECEIPTS_DIR`, rollback enabled or not) is large enough that a builder reads better
/// than a constructor with half a dozen `Option` parameters.
#[derive(Default)]
pub struct ClientBuilder {
    secret:                Option<String>,
    allow_insecure_secret: bool,
    receipts_dir:          Option<PathBuf>,
    rollback_enabled:      bool,
    policies:              Vec<PolicyFn>,
    workflows:             Registry,
    systems:               Systems,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self { rollback_enabled: true, ..Default::default() }
    }

    /// Sets the HMAC signing secret explicitly. If never called (or called with `None`), the
    /// secret falls back to the `ENACT_SECRET` environment variable at `build()` time.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn secret_opt(mut self, secret: Option<String>) -> Self {
        self.secret = secret;
        self
    }

    /// Waives the 32-character minimum secret length. Dev/test only: never set this on a
    /// client that signs receipts anyone relies on.
    pub fn allow_insecure_secret(mut self, allow: bool) -> Self {
        self.allow_insecure_secret = allow;
        self
    }

    /// Sets the receipts directory explicitly. Falls back to `ENACT_RECEIPTS_DIR`, and then to
    /// `./receipts`, if never called.
    pub fn receipts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.receipts_dir = Some(dir.into());
        self
    }

    pub fn receipts_dir_opt(mut self, dir: Option<PathBuf>) -> Self {
        self.receipts_dir = dir;
        self
    }

    /// Whether `Client::rollback` is permitted at all. Defaults to enabled; a client built
    /// with this set to `false` refuses every rollback with [`ClientError::RollbackDisabled`]
    /// regardless of whether the target receipt would otherwise be reversible.
    pub fn rollback_enabled(mut self, enabled: bool) -> Self {
        self.rollback_enabled = enabled;
        self
    }

    /// Registers a policy. Policies run in registration order, which is also the order their
    /// results appear in a receipt.
    pub fn policy(mut self, policy: PolicyFn) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn policies(mut self, policies: impl IntoIterator<Item = PolicyFn>) -> Self {
        self.policies.extend(policies);
        self
    }

    /// Registers a workflow under `name`. A run naming a workflow never registered here fails
    /// with [`ClientError::UnknownWorkflow`] before any policy evaluates.
    pub fn workflow(mut self, name: impl Into<String>, workflow: Arc<dyn Workflow>) -> Self {
        self.workflows.insert(name.into(), workflow);
        self
    }

    /// Registers a connector under `name`, the name policies and workflows look it up by in
    /// `Context::system` and the name the rollback engine uses to resolve the inverse of an
    /// action recorded under that system.
    pub fn system(mut self, name: impl Into<String>, connector: Arc<dyn Connector>) -> Self {
        self.systems.insert(name.into(), connector);
        self
    }

    /// Resolves the signing secret and receipts directory, opens the receipt store, and
    /// produces an immutable [`Client`]. Nothing about the client re-reads the environment
    /// after this call returns, except the freeze policy, which documents the exception.
    pub fn build(self) -> Result<Client, ClientError> {
        let secret = Secret::resolve(self.secret, self.allow_insecure_secret)?;
        let receipts_dir = self.receipts_dir.unwrap_or_else(|| match env::var(RECEIPTS_DIR_ENV_VAR) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => PathBuf::from(DEFAULT_RECEIPTS_DIR),
        });
        let store = ReceiptStore::open(receipts_dir)?;
        Ok(Client { policies: self.policies, workflows: self.workflows, systems: self.systems, secret, store, rollback_enabled: self.rollback_enabled })
    }
}

/// The orchestrator. Exposes the two operations Enact exists to provide: [`Client::run`],
/// which gates a workflow behind every registered policy and records what happened, and
/// [`Client::rollback`], which reverses a completed run using state captured at action time.
///
/// Everything a `Client` holds (policies, workflows, connectors, the signing secret) is
/// read-only after construction; multiple `run`/`rollback` calls may proceed concurrently
/// against the same client, each with its own freshly built [`Context`].
pub struct Client {
    policies:         Vec<PolicyFn>,
    workflows:        Registry,
    systems:          Systems,
    secret:           Secret,
    store:            ReceiptStore,
    rollback_enabled: bool,
}

impl Client {
    /// Runs `workflow` as `user_email` with `payload`.
    ///
    /// 1. Resolves the workflow; unknown names fail fast with [`ClientError::UnknownWorkflow`]
    ///    before anything else happens.
    /// 2. Builds a fresh [`Context`] and evaluates every registered policy against it — the
    ///    engine never short-circuits, so the receipt always carries one result per policy.
    /// 3. If any policy failed, builds, signs, and persists a `BLOCK` receipt with no actions
    ///    and returns immediately; the workflow never runs.
    /// 4. Otherwise runs the workflow. An `Err` from the workflow propagates unchanged and no
    ///    receipt is written for the aborted run. A successful return yields the ordered
    ///    action list that becomes the `PASS` receipt's `actionsTaken`.
    pub async fn run(&self, workflow: &str, user_email: &str, payload: Payload) -> Result<(RunResult, Receipt), ClientError> {
        let handler = self.workflows.get(workflow).cloned().ok_or_else(|| ClientError::UnknownWorkflow(workflow.to_string()))?;

        let user_attributes = payload.get("userAttributes").and_then(Value::as_object).cloned().unwrap_or_default();
        let ctx = Context::new(workflow, user_email, payload.clone(), self.systems.clone(), user_attributes);

        let policy_results = enact_policy::evaluate(&ctx, &self.policies);
        if !enact_policy::all_passed(&policy_results) {
            info!("run of '{workflow}' by {user_email} BLOCKed: {} polic{} failed", policy_results.iter().filter(|r| !r.passed).count(), if policy_results.len() == 1 { "y" } else { "ies" });
            let mut receipt = Receipt::new(workflow, user_email, payload, policy_results, enact_model::Decision::Block, vec![], None);
            enact_receipt::sign(&mut receipt, &self.secret);
            self.store.persist(&receipt)?;
            let result = RunResult { success: false, workflow: workflow.to_string(), output: Payload::new() };
            return Ok((result, receipt));
        }

        let actions = handler.run(&ctx).await.map_err(|source| ClientError::Workflow { workflow: workflow.to_string(), source })?;
        debug!("run of '{workflow}' by {user_email} executed {} action(s)", actions.len());

        let mut output = Payload::new();
        for action in &actions {
            if action.success {
                output.insert(action.action.clone(), Value::Object(action.output.clone()));
            }
        }

        let mut receipt = Receipt::new(workflow, user_email, payload, policy_results, enact_model::Decision::Pass, actions, None);
        enact_receipt::sign(&mut receipt, &self.secret);
        self.store.persist(&receipt)?;

        let result = RunResult { success: true, workflow: workflow.to_string(), output };
        Ok((result, receipt))
    }

    /// Reverses the run identified by `run_id`.
    ///
    /// Refuses outright if this client was built with rollback disabled. Otherwise loads the
    /// original receipt (which validates `run_id` against the strict UUID pattern before
    /// touching the filesystem), hands it to the [`RollbackEngine`] — which re-verifies its
    /// signature and refuses a tampered or non-`PASS` receipt before inverting anything — and
    /// persists whatever rollback receipt comes back.
    pub async fn rollback(&self, run_id: &str) -> Result<Receipt, ClientError> {
        if !self.rollback_enabled {
            return Err(ClientError::RollbackDisabled);
        }
        let original = self.store.load(run_id)?;
        let engine = RollbackEngine::new(&self.systems);
        let rollback_receipt = engine.rollback(&original, &self.secret).await?;
        self.store.persist(&rollback_receipt)?;
        info!("rolled back run {run_id}: decision = {}", rollback_receipt.decision);
        Ok(rollback_receipt)
    }

    /// Lists every run ID with a persisted receipt.
    pub fn list_receipts(&self) -> Result<Vec<RunId>, ClientError> {
        Ok(self.store.list()?)
    }

    /// Loads a receipt by run ID without verifying its signature. Callers that need to know
    /// whether it can be trusted must call [`Client::verify_receipt`] explicitly.
    pub fn load_receipt(&self, run_id: &str) -> Result<Receipt, ClientError> {
        Ok(self.store.load(run_id)?)
    }

    /// Recomputes `receipt`'s canonical-JSON HMAC under this client's secret and
    /// constant-time-compares it against the stored signature.
    pub fn verify_receipt(&self, receipt: &Receipt) -> bool {
        enact_receipt::verify(receipt, &self.secret)
    }
}

#[cfg(test)]
mod tests {
    use enact_connector::InMemoryConnector;
    use enact_model::{ActionResult, Decision, PolicyResult};
    use serde_json::json;

    use super::*;

    /// A minimal stand-in for a real PR-opening workflow: creates a branch, then a PR, against
    /// whichever connector is registered under `"github"`. Exists only to exercise `Client`
    /// end-to-end in tests; it is not a shipped workflow.
    struct PrFlow;

    #[async_trait::async_trait]
    impl Workflow for PrFlow {
        async fn run(&self, ctx: &Context) -> Result<Vec<ActionResult>, WorkflowError> {
            let github = ctx.system("github").expect("github connector registered");
            let branch = github.call("create_branch", &ctx.payload).await?;
            let pr = github.call("create_pr", &ctx.payload).await?;
            Ok(vec![branch, pr])
        }
    }

    fn no_main_branch_policy() -> PolicyFn {
        Arc::new(|ctx: &Context| match ctx.payload.get("branch").and_then(Value::as_str) {
            Some("main") => PolicyResult::fail("no_main_branch", "refusing to operate directly on 'main'"),
            _ => PolicyResult::pass("no_main_branch", "branch is not 'main'"),
        })
    }

    fn payload(pairs: &[(&str, Value)]) -> Payload {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn test_client(receipts_dir: &std::path::Path) -> Client {
        let github: Arc<dyn Connector> = Arc::new(InMemoryConnector::new("github", ["create_branch", "delete_branch", "create_pr", "close_pr"]));
        ClientBuilder::new()
            .secret("x".repeat(32))
            .receipts_dir(receipts_dir.to_path_buf())
            .policy(no_main_branch_policy())
            .workflow("pr_flow", Arc::new(PrFlow))
            .system("github", github)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn blocked_run_records_a_block_receipt_with_no_actions() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path());

        let (result, receipt) = client.run("pr_flow", "a@x.test", payload(&[("repo", json!("o/r")), ("branch", json!("main"))])).await.unwrap();

        assert!(!result.success);
        assert_eq!(receipt.decision, Decision::Block);
        assert!(receipt.actions_taken.is_empty());
        assert_eq!(receipt.policy_results.len(), 1);
        assert!(!receipt.policy_results[0].passed);
        assert!(client.verify_receipt(&receipt));
    }

    #[tokio::test]
    async fn passing_run_executes_the_workflow_and_signs_a_pass_receipt() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path());

        let (result, receipt) = client.run("pr_flow", "a@x.test", payload(&[("repo", json!("o/r")), ("branch", json!("agent/fix"))])).await.unwrap();

        assert!(result.success);
        assert_eq!(receipt.decision, Decision::Pass);
        assert_eq!(receipt.actions_taken.len(), 2);
        assert!(result.output.contains_key("create_branch"));
        assert!(result.output.contains_key("create_pr"));
        assert!(client.verify_receipt(&receipt));
    }

    #[tokio::test]
    async fn retrying_an_identical_run_reports_already_done() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path());
        let p = payload(&[("repo", json!("o/r")), ("branch", json!("agent/fix"))]);

        let (_, first) = client.run("pr_flow", "a@x.test", p.clone()).await.unwrap();
        assert!(!first.actions_taken[0].already_done().is_truthy());

        let (_, second) = client.run("pr_flow", "a@x.test", p).await.unwrap();
        assert!(second.actions_taken[0].already_done().is_truthy());
    }

    #[tokio::test]
    async fn rollback_reverses_a_passing_run() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path());
        let (_, original) = client.run("pr_flow", "a@x.test", payload(&[("repo", json!("o/r")), ("branch", json!("agent/fix"))])).await.unwrap();

        let rollback_receipt = client.rollback(&original.run_id.to_string()).await.unwrap();

        assert_eq!(rollback_receipt.decision, Decision::RolledBack);
        assert_eq!(rollback_receipt.original_run_id, Some(original.run_id));
        assert!(client.verify_receipt(&rollback_receipt));
    }

    #[tokio::test]
    async fn rollback_refused_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let github: Arc<dyn Connector> = Arc::new(InMemoryConnector::new("github", ["create_branch", "create_pr"]));
        let client = ClientBuilder::new()
            .secret("x".repeat(32))
            .receipts_dir(dir.path().to_path_buf())
            .rollback_enabled(false)
            .workflow("pr_flow", Arc::new(PrFlow))
            .system("github", github)
            .build()
            .unwrap();
        let (_, original) = client.run("pr_flow", "a@x.test", payload(&[("repo", json!("o/r")), ("branch", json!("agent/fix"))])).await.unwrap();

        let err = client.rollback(&original.run_id.to_string()).await.unwrap_err();
        assert!(matches!(err, ClientError::RollbackDisabled));
    }

    #[tokio::test]
    async fn unknown_workflow_is_refused_before_any_policy_runs() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path());
        let err = client.run("does_not_exist", "a@x.test", Payload::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::UnknownWorkflow(name) if name == "does_not_exist"));
    }

    #[tokio::test]
    async fn tampered_receipt_is_refused_at_rollback() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path());
        let (_, original) = client.run("pr_flow", "a@x.test", payload(&[("repo", json!("o/r")), ("branch", json!("agent/fix"))])).await.unwrap();

        let mut tampered = client.load_receipt(&original.run_id.to_string()).unwrap();
        tampered.user_email = "attacker@evil.test".into();
        client.store.persist(&tampered).unwrap();

        let err = client.rollback(&original.run_id.to_string()).await.unwrap_err();
        assert!(matches!(err, ClientError::Rollback(RollbackError::Integrity)));
    }
}
