//! Builds, signs, verifies, persists, and lists Enact receipts.
//!
//! A receipt is the one artifact every `Run` produces, success or failure. It is built from the
//! outcome of a run (the decision, the policy results, the actions taken), signed with an
//! HMAC-SHA256 keyed by [`Secret`], and written to a directory on disk, one file per run. The
//! signature covers the receipt's canonical JSON form ([`enact_model::Receipt::canonical_json`])
//! so that any later edit to a persisted receipt is detectable by re-verifying it.

mod error;
mod secret;
mod sign;
mod store;

pub use error::ReceiptError;
pub use secret::Secret;
pub use sign::{sign, verify};
pub use store::ReceiptStore;
