//! Backing store trait definition.

use std::collections::BTreeMap;

use async_trait::async_trait;
use gateway_core::{
    Announcement, AnnouncementQuery, Page, PlayerHistoryEntry, ServerRecord, UserHistory,
};

use crate::error::StoreResult;

/// Whitelist groups keyed by lowercase group name.
pub type WhitelistGroups = BTreeMap<String, Vec<String>>;

/// The authoritative store behind the gateway caches.
///
/// This trait abstracts over the relational database that owns server,
/// announcement, account and whitelist data. The cache layer only ever
/// consumes it through this interface.
///
/// # Implementors
///
/// - `MemoryStore` - Keeps everything in process memory
/// - `TimeoutStore` - Bounds the latency of any other store
///
/// Group names passed to whitelist operations are already normalized to
/// lowercase by the caller.
#[async_trait]
pub trait GatewayStore: Send + Sync {
    // ============================================
    // Servers
    // ============================================

    /// Loads every server record, ordered by `(cluster_id, game_id)`.
    async fn load_server_list(&self) -> StoreResult<Vec<ServerRecord>>;

    /// Inserts or updates records by composite key.
    ///
    /// On conflict only the columns present in each record are updated.
    /// The batch is atomic.
    async fn upsert_server_records(&self, records: &[ServerRecord]) -> StoreResult<()>;

    /// Updates the `state` of existing servers.
    ///
    /// Records without a state are skipped; unknown keys are ignored.
    /// The batch is atomic.
    async fn update_server_states(&self, records: &[ServerRecord]) -> StoreResult<()>;

    // ============================================
    // Announcements
    // ============================================

    /// Loads enabled announcements whose `end_time` is after `now`,
    /// ordered by priority then id, both descending.
    async fn load_announcements(&self, now: i64) -> StoreResult<Vec<Announcement>>;

    /// Creates an announcement and returns it with its assigned id.
    async fn create_announcement(&self, notice: Announcement) -> StoreResult<Announcement>;

    /// Replaces an existing announcement.
    async fn update_announcement(&self, notice: Announcement) -> StoreResult<()>;

    /// Deletes one announcement. Deleting a missing id is not an error.
    async fn delete_announcement(&self, id: u64) -> StoreResult<()>;

    /// Deletes several announcements.
    async fn delete_announcements(&self, ids: &[u64]) -> StoreResult<()>;

    /// Finds one announcement by id.
    async fn find_announcement(&self, id: u64) -> StoreResult<Option<Announcement>>;

    /// Returns a filtered page of announcements, newest id first.
    async fn list_announcements(&self, query: &AnnouncementQuery)
    -> StoreResult<Page<Announcement>>;

    // ============================================
    // Accounts
    // ============================================

    /// Returns an account's login history; unknown accounts get an empty one.
    async fn get_user_history(&self, account_id: &str) -> StoreResult<UserHistory>;

    /// Records a login, creating the account history on first use.
    async fn record_player_login(
        &self,
        account_id: &str,
        entry: PlayerHistoryEntry,
    ) -> StoreResult<()>;

    /// Sets an account's state flag.
    async fn set_user_state(&self, account_id: &str, state: i32) -> StoreResult<()>;

    // ============================================
    // Whitelist
    // ============================================

    /// Loads one group's entries in insertion order. A missing group yields an empty list.
    async fn load_whitelist_group(&self, group: &str) -> StoreResult<Vec<String>>;

    /// Loads every group.
    async fn load_all_whitelist_groups(&self) -> StoreResult<WhitelistGroups>;

    /// Replaces a group's entries atomically (delete all, then insert).
    async fn replace_whitelist_group(&self, group: &str, ips: &[String]) -> StoreResult<()>;

    /// Adds an entry; adding an existing entry only refreshes its timestamp.
    async fn upsert_whitelist_ip(&self, group: &str, ip: &str) -> StoreResult<()>;

    /// Removes an entry. Removing a missing entry is not an error.
    async fn delete_whitelist_ip(&self, group: &str, ip: &str) -> StoreResult<()>;

    // ============================================
    // Lifecycle
    // ============================================

    /// Performs a health check on the store.
    async fn health_check(&self) -> StoreResult<()>;

    /// Returns the name of this store, for logging.
    fn name(&self) -> &str;
}
