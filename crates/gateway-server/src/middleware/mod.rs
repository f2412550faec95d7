//! Middleware stack para el servidor HTTP.
//!
//! - `RequestIdLayer`: genera/propaga X-Request-Id (UUID v7)
//! - `LoggingLayer`: un span por request con grupo de API e IP del cliente
//! - `access_control`: whitelist por grupo de API

mod access;
mod logging;
mod request_id;

pub use access::{access_control, client_ip};
pub use logging::{LoggingLayer, LoggingMiddleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer, RequestIdMiddleware};
