//! Client side of the taskboard: a typed HTTP client, a keyed query cache
//! with freshness tracking, and a mutation coordinator that invalidates the
//! cache as writes settle.
//!
//! Everything hangs off a [`ClientSession`]; there is no global state.

pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod mutation;
pub mod queries;
pub mod session;

#[cfg(test)]
pub(crate) mod fake;

pub use api::{HttpApi, TaskboardApi};
pub use cache::{Freshness, QueryCache, QueryData, QueryKey};
pub use config::ClientConfig;
pub use coordinator::{MergePolicy, MutationCoordinator};
pub use error::{ClientError, Result};
pub use mutation::{MutationKind, MutationStatus, MutationTracker};
pub use queries::Queries;
pub use session::ClientSession;
