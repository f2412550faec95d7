//! # Gateway Store
//!
//! Backing store abstraction for the login gateway.
//!
//! The gateway caches are load-through views over an authoritative store. This
//! crate defines that store's interface ([`GatewayStore`]), its error type, a
//! deadline wrapper ([`TimeoutStore`]) and an in-memory implementation
//! ([`MemoryStore`]).
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use gateway_core::ServerRecord;
//! use gateway_store::{GatewayStore, MemoryStore, TimeoutStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = TimeoutStore::new(MemoryStore::new(), Duration::from_secs(3));
//! store
//!     .upsert_server_records(&[ServerRecord::new(1, 1).with_name("Dragon")])
//!     .await
//!     .unwrap();
//!
//! let servers = store.load_server_list().await.unwrap();
//! assert_eq!(servers.len(), 1);
//! # }
//! ```

pub mod error;
pub mod memory;
pub mod timeout;
pub mod traits;

// Re-exports
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use timeout::TimeoutStore;
pub use traits::{GatewayStore, WhitelistGroups};

// Re-export gateway_core for consumers
pub use gateway_core;
