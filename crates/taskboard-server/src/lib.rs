//! # taskboard-server
//!
//! HTTP API for users and their tasks.
//!
//! Handlers are stateless: every request validates its input, checks that
//! the referenced rows exist, performs one store operation and maps the
//! outcome to a JSON response. The SQLite store is the only source of truth.

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod tasks;
pub mod users;

pub use api::{build_router, serve, serve_listener, AppState};
pub use config::ServerConfig;
pub use error::ApiError;
