//! Latency bound for store calls.
//!
//! A cold-cache load holds the cache's exclusive lock while it waits on the
//! store, so a hung store call would stall every caller of that cache. Wrapping
//! the store in [`TimeoutStore`] turns such a hang into a
//! [`StoreError::Timeout`] after a fixed deadline.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use gateway_core::{
    Announcement, AnnouncementQuery, Page, PlayerHistoryEntry, ServerRecord, UserHistory,
};
use tracing::warn;

use crate::error::{StoreError, StoreResult};
use crate::traits::{GatewayStore, WhitelistGroups};

/// Wraps a store and bounds every call with a deadline.
#[derive(Debug)]
pub struct TimeoutStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: GatewayStore> TimeoutStore<S> {
    /// Creates a new wrapper.
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the configured deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                let millis = self.timeout.as_millis() as u64;
                warn!(operation, millis, store = self.inner.name(), "Store call timed out");
                Err(StoreError::Timeout { millis })
            },
        }
    }
}

#[async_trait]
impl<S: GatewayStore> GatewayStore for TimeoutStore<S> {
    async fn load_server_list(&self) -> StoreResult<Vec<ServerRecord>> {
        self.bounded("load_server_list", self.inner.load_server_list())
            .await
    }

    async fn upsert_server_records(&self, records: &[ServerRecord]) -> StoreResult<()> {
        self.bounded(
            "upsert_server_records",
            self.inner.upsert_server_records(records),
        )
        .await
    }

    async fn update_server_states(&self, records: &[ServerRecord]) -> StoreResult<()> {
        self.bounded(
            "update_server_states",
            self.inner.update_server_states(records),
        )
        .await
    }

    async fn load_announcements(&self, now: i64) -> StoreResult<Vec<Announcement>> {
        self.bounded("load_announcements", self.inner.load_announcements(now))
            .await
    }

    async fn create_announcement(&self, notice: Announcement) -> StoreResult<Announcement> {
        self.bounded("create_announcement", self.inner.create_announcement(notice))
            .await
    }

    async fn update_announcement(&self, notice: Announcement) -> StoreResult<()> {
        self.bounded("update_announcement", self.inner.update_announcement(notice))
            .await
    }

    async fn delete_announcement(&self, id: u64) -> StoreResult<()> {
        self.bounded("delete_announcement", self.inner.delete_announcement(id))
            .await
    }

    async fn delete_announcements(&self, ids: &[u64]) -> StoreResult<()> {
        self.bounded("delete_announcements", self.inner.delete_announcements(ids))
            .await
    }

    async fn find_announcement(&self, id: u64) -> StoreResult<Option<Announcement>> {
        self.bounded("find_announcement", self.inner.find_announcement(id))
            .await
    }

    async fn list_announcements(
        &self,
        query: &AnnouncementQuery,
    ) -> StoreResult<Page<Announcement>> {
        self.bounded("list_announcements", self.inner.list_announcements(query))
            .await
    }

    async fn get_user_history(&self, account_id: &str) -> StoreResult<UserHistory> {
        self.bounded("get_user_history", self.inner.get_user_history(account_id))
            .await
    }

    async fn record_player_login(
        &self,
        account_id: &str,
        entry: PlayerHistoryEntry,
    ) -> StoreResult<()> {
        self.bounded(
            "record_player_login",
            self.inner.record_player_login(account_id, entry),
        )
        .await
    }

    async fn set_user_state(&self, account_id: &str, state: i32) -> StoreResult<()> {
        self.bounded("set_user_state", self.inner.set_user_state(account_id, state))
            .await
    }

    async fn load_whitelist_group(&self, group: &str) -> StoreResult<Vec<String>> {
        self.bounded(
            "load_whitelist_group",
            self.inner.load_whitelist_group(group),
        )
        .await
    }

    async fn load_all_whitelist_groups(&self) -> StoreResult<WhitelistGroups> {
        self.bounded(
            "load_all_whitelist_groups",
            self.inner.load_all_whitelist_groups(),
        )
        .await
    }

    async fn replace_whitelist_group(&self, group: &str, ips: &[String]) -> StoreResult<()> {
        self.bounded(
            "replace_whitelist_group",
            self.inner.replace_whitelist_group(group, ips),
        )
        .await
    }

    async fn upsert_whitelist_ip(&self, group: &str, ip: &str) -> StoreResult<()> {
        self.bounded(
            "upsert_whitelist_ip",
            self.inner.upsert_whitelist_ip(group, ip),
        )
        .await
    }

    async fn delete_whitelist_ip(&self, group: &str, ip: &str) -> StoreResult<()> {
        self.bounded(
            "delete_whitelist_ip",
            self.inner.delete_whitelist_ip(group, ip),
        )
        .await
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.bounded("health_check", self.inner.health_check()).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
