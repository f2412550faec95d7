//! Error types for backing stores.

use gateway_core::GatewayError;

/// Errors that can occur when talking to the backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or refused the operation.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// A call did not complete in time.
    #[error("operation timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The write conflicts with existing data.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Creates a new unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }

    /// Converts into the domain error, tagging the failed operation.
    pub fn into_gateway(self, operation: &str) -> GatewayError {
        match self {
            Self::NotFound(what) => GatewayError::not_found(what),
            other => GatewayError::store_with_cause(operation, other),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::unavailable("connection refused");
        assert_eq!(err.to_string(), "store unavailable: connection refused");

        let err = StoreError::Timeout { millis: 1500 };
        assert_eq!(err.to_string(), "operation timed out after 1500ms");
    }

    #[test]
    fn test_is_transient() {
        assert!(StoreError::unavailable("down").is_transient());
        assert!(StoreError::Timeout { millis: 10 }.is_transient());
        assert!(!StoreError::NotFound("notice 3".into()).is_transient());
        assert!(!StoreError::Conflict("dup".into()).is_transient());
    }

    #[test]
    fn test_into_gateway() {
        let err = StoreError::unavailable("down").into_gateway("load_server_list");
        assert!(err.is_store());

        let err = StoreError::NotFound("notice 9".into()).into_gateway("find_announcement");
        assert!(err.is_not_found());
    }
}
