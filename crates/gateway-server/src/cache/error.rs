use gateway_core::GatewayError;
use gateway_store::StoreError;
use thiserror::Error;

/// Error del sistema de cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// A load-through call to the store failed; nothing was cached.
    #[error("failed to load {key}: {source}")]
    Load {
        key: String,
        #[source]
        source: StoreError,
    },

    /// A store write failed; the cache was not touched.
    #[error("{operation} failed: {source}")]
    Write {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// Input rejected before any mutation.
    #[error(transparent)]
    Invalid(#[from] GatewayError),
}

impl CacheError {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}
