//! Gateway Core - Domain types and merge rules
//!
//! This crate provides the records exchanged between the login gateway's
//! store, cache and HTTP layers, together with the partial-update rules that
//! keep sparse reports from clobbering known state.

pub mod error;
pub mod merge;
pub mod types;
pub mod whitelist;

pub use error::{GatewayError, Result};
pub use types::{
    Announcement, AnnouncementQuery, Page, PlayerHistoryEntry, ServerKey, ServerRecord,
    UserHistory, account_state, server_state,
};
pub use whitelist::WhitelistEntry;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
