//! Value types shared by every Enact crate: the per-run `Context` input, the `PolicyResult`
//! and `ActionResult` outcomes, the signed `Receipt`, and the caller-facing `RunResult`.
//!
//! This crate is deliberately inert: it holds data and the canonicalization rule, nothing
//! that talks to a connector, a policy, or the filesystem. Everything downstream (policy
//! engine, receipt subsystem, connector contract, rollback engine, orchestrator) builds on
//! top of these types rather than redefining them.

pub mod action_result;
pub mod decision;
pub mod payload;
pub mod policy_result;
pub mod receipt;
pub mod run_id;
pub mod run_result;

pub use action_result::ActionResult;
pub use decision::Decision;
pub use payload::{AlreadyDone, Payload, already_done};
pub use policy_result::PolicyResult;
pub use receipt::Receipt;
pub use run_id::{RunId, RunIdParseError};
pub use run_result::RunResult;
