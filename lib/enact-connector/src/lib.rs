//! The connector contract: the invariants every connector must uphold (allowlist,
//! idempotency marker, rollback-data capture) plus the `Context` that carries a run's
//! connector instances to policies and the workflow.
//!
//! Concrete connectors — GitHub REST, Postgres, Slack, a real filesystem — are external
//! collaborators and out of scope here; this crate only specifies the interface, plus a
//! minimal [`in_memory::InMemoryConnector`] test double.

pub mod allowlist;
pub mod connector;
pub mod context;
pub mod error;
pub mod in_memory;

pub use allowlist::Allowlist;
pub use connector::{Connector, Systems};
pub use context::Context;
pub use error::ConnectorError;
pub use in_memory::InMemoryConnector;
