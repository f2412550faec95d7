//! Error types for the login gateway domain.
//!
//! Every fallible domain operation returns [`Result<T>`], whose error is a
//! [`GatewayError`]. Store and cache layers map their own failures into the
//! `Store` variant at their boundary, so handlers only ever deal with this type.
//!
//! # Example
//!
//! ```
//! use gateway_core::{GatewayError, Result};
//!
//! fn parse_port(raw: &str) -> Result<u16> {
//!     raw.parse()
//!         .map_err(|_| GatewayError::validation("port", format!("'{raw}' is not a port")))
//! }
//!
//! assert!(parse_port("8080").is_ok());
//! assert!(parse_port("abc").unwrap_err().is_validation());
//! ```

use thiserror::Error;

/// Main error type for gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Input was rejected before any state was touched.
    #[error("Validation error for field '{field}': {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// The backing store failed while executing an operation.
    #[error("Store error during '{operation}': {message}")]
    Store {
        /// Name of the store operation that failed
        operation: String,
        /// Description of what went wrong
        message: String,
        /// Underlying error
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    // ============================================
    // Convenience constructors
    // ============================================

    /// Creates a Validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a Store error without a cause.
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a Store error wrapping the underlying failure.
    pub fn store_with_cause<E>(operation: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store {
            operation: operation.into(),
            message: cause.to_string(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates a NotFound error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================
    // Query methods
    // ============================================

    /// Returns true if the input was rejected by validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns true if the backing store failed.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store { .. })
    }

    /// Returns true if a record was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias using [`GatewayError`].
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let error = GatewayError::validation("ip", "invalid address: 300.1.1.1");
        let msg = error.to_string();

        assert!(msg.contains("ip"));
        assert!(msg.contains("300.1.1.1"));
        assert!(error.is_validation());
        assert!(!error.is_store());
    }

    #[test]
    fn test_store_error_with_cause() {
        let io_error = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = GatewayError::store_with_cause("load_server_list", io_error);

        use std::error::Error;
        assert!(error.source().is_some());
        assert!(error.is_store());
        assert!(error.to_string().contains("load_server_list"));
    }

    #[test]
    fn test_result_with_question_mark() {
        fn inner() -> Result<()> {
            Err(GatewayError::internal("boom"))
        }

        fn outer() -> Result<String> {
            inner()?;
            Ok("unreachable".into())
        }

        assert!(outer().is_err());
    }
}
