//! Cache layer for the login gateway.
//!
//! Each domain gets its own strongly typed cache instance, created by the
//! application state and handed to handlers by reference:
//!
//! - [`ServerListCache`]: the game-server fleet, updated by sparse merges;
//! - [`AnnouncementCache`]: login notices, resolved per read;
//! - [`WhitelistCache`]: per-group IP allow lists.
//!
//! All of them sit on a [`KeyValueStore`] (one read-write lock per instance)
//! and, where they load lazily, on [`LoadThroughCache`].

pub mod announcements;
pub mod error;
pub mod keys;
pub mod server_list;
pub mod store;
pub mod whitelist;

// Re-exports
pub use announcements::{AnnouncementCache, select_active};
pub use error::CacheError;
pub use keys::CacheKey;
pub use server_list::{ServerListCache, ServerTable};
pub use store::{KeyValueStore, LoadThroughCache};
pub use whitelist::{WhitelistCache, WhitelistSource};
