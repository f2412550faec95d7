//! Gateway Server - HTTP login gateway
//!
//! This crate wires the typed caches, the access-control middleware and the
//! axum routes of the login gateway on top of a [`gateway_store::GatewayStore`].

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use crate::config::{ServerMode, Settings};
pub use crate::error::AppError;
pub use crate::handlers::{ApiResponse, HealthResponse};
pub use crate::server::{create_router, run_server};
pub use crate::state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
