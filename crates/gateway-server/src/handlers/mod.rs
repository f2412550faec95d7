//! HTTP handlers, one module per route family.

pub mod health;
pub mod history;
pub mod metrics;
pub mod notices;
pub mod response;
pub mod servers;
pub mod whitelist;

pub use health::HealthResponse;
pub use response::{ApiResponse, status_code};
