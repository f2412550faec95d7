//! In-memory implementation of the gateway store.
//!
//! All state lives in one `parking_lot::RwLock`, so every batch operation is
//! atomic with respect to other callers. No lock is held across an `.await`.
//!
//! The store also carries a small fault-injection surface (`set_available`,
//! `fail_on`, `set_latency`) and per-operation call counters, used by tests
//! that need to drive the cache layer through store failures and slow loads.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use gateway_core::{
    Announcement, AnnouncementQuery, Page, PlayerHistoryEntry, ServerKey, ServerRecord,
    UserHistory, server_state,
};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{GatewayStore, WhitelistGroups};

/// Column defaults applied when a server row is first inserted.
const DEFAULT_STATE: i32 = server_state::MAINTENANCE;
const DEFAULT_IS_SHOW: i32 = 1;
const DEFAULT_IS_NEW: i32 = 0;

#[derive(Debug, Clone)]
struct WhitelistRow {
    id: u64,
    group: String,
    ip: String,
    updated_at: i64,
}

#[derive(Debug, Default)]
struct Tables {
    servers: BTreeMap<ServerKey, ServerRecord>,
    announcements: BTreeMap<u64, Announcement>,
    next_announcement_id: u64,
    histories: HashMap<String, UserHistory>,
    whitelist: Vec<WhitelistRow>,
    next_whitelist_id: u64,
}

impl Tables {
    /// Whitelist rows ordered by insertion id.
    fn whitelist_rows(&self) -> Vec<&WhitelistRow> {
        let mut rows: Vec<&WhitelistRow> = self.whitelist.iter().collect();
        rows.sort_by_key(|row| row.id);
        rows
    }
}

/// A [`GatewayStore`] that keeps every table in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    failing: Mutex<HashSet<&'static str>>,
    latency: Mutex<Option<Duration>>,
    calls: Mutex<HashMap<&'static str, u64>>,
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with server rows.
    pub fn with_servers(servers: impl IntoIterator<Item = ServerRecord>) -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.write();
            for server in servers {
                tables.servers.insert(server.key(), server);
            }
        }
        store
    }

    /// Makes every operation fail with [`StoreError::Unavailable`] while `false`.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Makes the named operation fail until [`MemoryStore::clear_faults`] is called.
    pub fn fail_on(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    /// Removes every injected failure.
    pub fn clear_faults(&self) {
        self.failing.lock().clear();
        self.set_available(true);
    }

    /// Delays every operation by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Returns how many times the named operation was invoked.
    pub fn call_count(&self, operation: &str) -> u64 {
        self.calls.lock().get(operation).copied().unwrap_or(0)
    }

    /// Records the call, applies latency and injected faults.
    async fn enter(&self, operation: &'static str) -> StoreResult<()> {
        *self.calls.lock().entry(operation).or_insert(0) += 1;

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("memory store switched off"));
        }
        if self.failing.lock().contains(operation) {
            return Err(StoreError::unavailable(format!(
                "injected failure for {operation}"
            )));
        }
        Ok(())
    }
}

fn insert_with_defaults(record: &ServerRecord) -> ServerRecord {
    let mut row = record.clone();
    row.state.get_or_insert(DEFAULT_STATE);
    row.is_show.get_or_insert(DEFAULT_IS_SHOW);
    row.is_new.get_or_insert(DEFAULT_IS_NEW);
    row
}

#[async_trait]
impl GatewayStore for MemoryStore {
    async fn load_server_list(&self) -> StoreResult<Vec<ServerRecord>> {
        self.enter("load_server_list").await?;
        Ok(self.tables.read().servers.values().cloned().collect())
    }

    async fn upsert_server_records(&self, records: &[ServerRecord]) -> StoreResult<()> {
        self.enter("upsert_server_records").await?;
        let mut tables = self.tables.write();
        for record in records {
            match tables.servers.get_mut(&record.key()) {
                Some(row) => {
                    row.merge_from(record);
                },
                None => {
                    tables.servers.insert(record.key(), insert_with_defaults(record));
                },
            }
        }
        debug!(count = records.len(), "Server records upserted");
        Ok(())
    }

    async fn update_server_states(&self, records: &[ServerRecord]) -> StoreResult<()> {
        self.enter("update_server_states").await?;
        let mut tables = self.tables.write();
        for record in records {
            let Some(state) = record.state else {
                continue;
            };
            if let Some(row) = tables.servers.get_mut(&record.key()) {
                row.state = Some(state);
            }
        }
        Ok(())
    }

    async fn load_announcements(&self, now: i64) -> StoreResult<Vec<Announcement>> {
        self.enter("load_announcements").await?;
        let tables = self.tables.read();
        let mut list: Vec<Announcement> = tables
            .announcements
            .values()
            .filter(|n| n.is_pending_or_active(now))
            .cloned()
            .collect();
        list.sort_by(|a, b| (b.priority, b.id).cmp(&(a.priority, a.id)));
        Ok(list)
    }

    async fn create_announcement(&self, mut notice: Announcement) -> StoreResult<Announcement> {
        self.enter("create_announcement").await?;
        let mut tables = self.tables.write();
        tables.next_announcement_id += 1;
        let now = now_unix();
        notice.id = tables.next_announcement_id;
        notice.created_at = now;
        notice.updated_at = now;
        tables.announcements.insert(notice.id, notice.clone());
        Ok(notice)
    }

    async fn update_announcement(&self, mut notice: Announcement) -> StoreResult<()> {
        self.enter("update_announcement").await?;
        let mut tables = self.tables.write();
        let Some(existing) = tables.announcements.get(&notice.id) else {
            return Err(StoreError::NotFound(format!("announcement {}", notice.id)));
        };
        notice.created_at = existing.created_at;
        notice.updated_at = now_unix();
        tables.announcements.insert(notice.id, notice);
        Ok(())
    }

    async fn delete_announcement(&self, id: u64) -> StoreResult<()> {
        self.enter("delete_announcement").await?;
        self.tables.write().announcements.remove(&id);
        Ok(())
    }

    async fn delete_announcements(&self, ids: &[u64]) -> StoreResult<()> {
        self.enter("delete_announcements").await?;
        let mut tables = self.tables.write();
        for id in ids {
            tables.announcements.remove(id);
        }
        Ok(())
    }

    async fn find_announcement(&self, id: u64) -> StoreResult<Option<Announcement>> {
        self.enter("find_announcement").await?;
        Ok(self.tables.read().announcements.get(&id).cloned())
    }

    async fn list_announcements(
        &self,
        query: &AnnouncementQuery,
    ) -> StoreResult<Page<Announcement>> {
        self.enter("list_announcements").await?;
        let query = query.normalized();
        let tables = self.tables.read();

        // BTreeMap ordena por id ascendente; el listado es descendente
        let matching: Vec<&Announcement> = tables
            .announcements
            .values()
            .rev()
            .filter(|n| query.matches(n))
            .collect();

        let list = matching
            .iter()
            .skip(query.offset())
            .take(query.page_size as usize)
            .map(|n| (*n).clone())
            .collect();

        Ok(Page {
            list,
            total: matching.len() as u64,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn get_user_history(&self, account_id: &str) -> StoreResult<UserHistory> {
        self.enter("get_user_history").await?;
        Ok(self
            .tables
            .read()
            .histories
            .get(account_id)
            .cloned()
            .unwrap_or_else(|| UserHistory::empty(account_id)))
    }

    async fn record_player_login(
        &self,
        account_id: &str,
        entry: PlayerHistoryEntry,
    ) -> StoreResult<()> {
        self.enter("record_player_login").await?;
        self.tables
            .write()
            .histories
            .entry(account_id.to_string())
            .or_insert_with(|| UserHistory::empty(account_id))
            .record_login(entry);
        Ok(())
    }

    async fn set_user_state(&self, account_id: &str, state: i32) -> StoreResult<()> {
        self.enter("set_user_state").await?;
        if let Some(history) = self.tables.write().histories.get_mut(account_id) {
            history.state = state;
        }
        Ok(())
    }

    async fn load_whitelist_group(&self, group: &str) -> StoreResult<Vec<String>> {
        self.enter("load_whitelist_group").await?;
        Ok(self
            .tables
            .read()
            .whitelist_rows()
            .into_iter()
            .filter(|row| row.group == group)
            .map(|row| row.ip.clone())
            .collect())
    }

    async fn load_all_whitelist_groups(&self) -> StoreResult<WhitelistGroups> {
        self.enter("load_all_whitelist_groups").await?;
        let mut groups = WhitelistGroups::new();
        for row in self.tables.read().whitelist_rows() {
            groups.entry(row.group.clone()).or_default().push(row.ip.clone());
        }
        Ok(groups)
    }

    async fn replace_whitelist_group(&self, group: &str, ips: &[String]) -> StoreResult<()> {
        self.enter("replace_whitelist_group").await?;
        let now = now_unix();
        let mut tables = self.tables.write();
        tables.whitelist.retain(|row| row.group != group);
        for ip in ips {
            tables.next_whitelist_id += 1;
            let id = tables.next_whitelist_id;
            tables.whitelist.push(WhitelistRow {
                id,
                group: group.to_string(),
                ip: ip.clone(),
                updated_at: now,
            });
        }
        Ok(())
    }

    async fn upsert_whitelist_ip(&self, group: &str, ip: &str) -> StoreResult<()> {
        self.enter("upsert_whitelist_ip").await?;
        let now = now_unix();
        let mut tables = self.tables.write();
        if let Some(row) = tables
            .whitelist
            .iter_mut()
            .find(|row| row.group == group && row.ip == ip)
        {
            debug!(group, ip, previous = row.updated_at, "Whitelist entry refreshed");
            row.updated_at = now;
            return Ok(());
        }
        tables.next_whitelist_id += 1;
        let id = tables.next_whitelist_id;
        tables.whitelist.push(WhitelistRow {
            id,
            group: group.to_string(),
            ip: ip.to_string(),
            updated_at: now,
        });
        debug!(group, ip, id, "Whitelist entry inserted");
        Ok(())
    }

    async fn delete_whitelist_ip(&self, group: &str, ip: &str) -> StoreResult<()> {
        self.enter("delete_whitelist_ip").await?;
        self.tables
            .write()
            .whitelist
            .retain(|row| !(row.group == group && row.ip == ip));
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.enter("health_check").await
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_inserts_with_defaults() {
        let store = MemoryStore::new();
        store
            .upsert_server_records(&[ServerRecord::new(1, 1).with_name("Dragon")])
            .await
            .unwrap();

        let servers = store.load_server_list().await.unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].state, Some(DEFAULT_STATE));
        assert_eq!(servers[0].is_show, Some(DEFAULT_IS_SHOW));
        assert_eq!(servers[0].is_new, Some(DEFAULT_IS_NEW));
    }

    #[tokio::test]
    async fn test_upsert_updates_only_present_columns() {
        let store = MemoryStore::with_servers([ServerRecord::new(1, 1)
            .with_name("Dragon")
            .with_state(2)]);

        store
            .upsert_server_records(&[ServerRecord::new(1, 1).with_port(7000)])
            .await
            .unwrap();

        let servers = store.load_server_list().await.unwrap();
        assert_eq!(servers[0].name.as_deref(), Some("Dragon"));
        assert_eq!(servers[0].state, Some(2));
        assert_eq!(servers[0].port, Some(7000));
    }

    #[tokio::test]
    async fn test_update_states_ignores_unknown_and_stateless() {
        let store = MemoryStore::with_servers([ServerRecord::new(1, 1).with_state(2)]);

        store
            .update_server_states(&[
                ServerRecord::new(1, 1).with_state(1),
                ServerRecord::new(9, 9).with_state(3),
                ServerRecord::new(1, 1).with_name("no state"),
            ])
            .await
            .unwrap();

        let servers = store.load_server_list().await.unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].state, Some(1));
        assert!(servers[0].name.is_none());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = MemoryStore::new();
        store.fail_on("load_server_list");

        let err = store.load_server_list().await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(store.call_count("load_server_list"), 1);

        store.clear_faults();
        assert!(store.load_server_list().await.is_ok());
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = MemoryStore::new();
        store.set_available(false);

        assert!(store.health_check().await.is_err());
        assert!(store.load_all_whitelist_groups().await.is_err());
    }
}
