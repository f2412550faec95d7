//! Server list cache.
//!
//! The aggregate list and the per-server entries live in one immutable
//! [`ServerTable`] published under [`CacheKey::ServerList`]. A batch of updates
//! builds a new table from a copy of the current one and publishes it with a
//! single write, so readers see either none or all of a batch.

use std::collections::HashMap;
use std::sync::Arc;

use gateway_core::{ServerKey, ServerRecord};
use gateway_store::GatewayStore;
use tracing::{debug, error, warn};

use crate::cache::error::CacheError;
use crate::cache::keys::CacheKey;
use crate::cache::store::LoadThroughCache;
use crate::metrics::CacheMetrics;

/// Snapshot of the server list with a key index into it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerTable {
    list: Vec<ServerRecord>,
    slots: HashMap<ServerKey, usize>,
}

impl ServerTable {
    /// Builds a table from store rows, keeping their order.
    ///
    /// A key repeated in `records` keeps its first position and its last value.
    pub fn from_records(records: Vec<ServerRecord>) -> Self {
        let mut table = Self::default();
        for record in records {
            table.upsert_slot(record);
        }
        table
    }

    /// Records in list order.
    pub fn records(&self) -> &[ServerRecord] {
        &self.list
    }

    /// Per-server entry lookup.
    pub fn get(&self, key: &ServerKey) -> Option<&ServerRecord> {
        self.slots.get(key).map(|&idx| &self.list[idx])
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Merges `update` into its slot, or appends it as a new record.
    fn apply(&mut self, update: &ServerRecord) {
        match self.slots.get(&update.key()) {
            Some(&idx) => {
                self.list[idx].merge_from(update);
            },
            None => {
                self.slots.insert(update.key(), self.list.len());
                self.list.push(update.clone());
            },
        }
    }

    fn upsert_slot(&mut self, record: ServerRecord) {
        match self.slots.get(&record.key()) {
            Some(&idx) => self.list[idx] = record,
            None => {
                self.slots.insert(record.key(), self.list.len());
                self.list.push(record);
            },
        }
    }
}

/// Cache of the game-server fleet.
pub struct ServerListCache {
    store: Arc<dyn GatewayStore>,
    inner: LoadThroughCache<Arc<ServerTable>>,
}

impl ServerListCache {
    pub fn new(store: Arc<dyn GatewayStore>) -> Self {
        Self {
            store,
            inner: LoadThroughCache::new(CacheMetrics::new("server_list")),
        }
    }

    /// Returns the current server table, loading it from the store when cold.
    pub async fn get_list(&self) -> Result<Arc<ServerTable>, CacheError> {
        let store = Arc::clone(&self.store);
        self.inner
            .get_or_load(CacheKey::ServerList, || async move {
                let records = store.load_server_list().await.map_err(|source| {
                    error!(error = %source, "Failed to load server list from store");
                    CacheError::Load {
                        key: CacheKey::ServerList.to_string(),
                        source,
                    }
                })?;
                debug!(count = records.len(), "Server list loaded");
                Ok(Arc::new(ServerTable::from_records(records)))
            })
            .await
    }

    /// Returns the cached entry for one server without touching the store.
    pub async fn get_server(&self, key: &ServerKey) -> Option<ServerRecord> {
        let table = self.inner.store().get(&CacheKey::ServerList).await?;
        table.get(key).cloned()
    }

    /// Merges a batch of sparse updates into the cached list.
    ///
    /// Existing servers keep their position and only the fields present in the
    /// update change; unknown servers are appended. The whole batch runs under
    /// the exclusive lock and is published as one new table. A cold cache
    /// starts from an empty table and logs a warning, so callers warm the cache
    /// first (the server does so at startup).
    ///
    /// Returns the number of updates applied.
    pub async fn apply_updates(&self, updates: &[ServerRecord]) -> usize {
        if updates.is_empty() {
            return 0;
        }

        let mut entries = self.inner.store().lock_exclusive().await;
        let mut table = match entries.get(&CacheKey::ServerList) {
            Some(current) => ServerTable::clone(current),
            None => {
                warn!(
                    updates = updates.len(),
                    "Server list not loaded, applying updates to an empty table"
                );
                ServerTable::default()
            },
        };

        for update in updates {
            table.apply(update);
        }

        debug!(applied = updates.len(), total = table.len(), "Server list updated");
        entries.insert(CacheKey::ServerList, Arc::new(table));
        updates.len()
    }

    pub fn metrics(&self) -> &CacheMetrics {
        self.inner.metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_store::MemoryStore;

    fn cache_with(records: Vec<ServerRecord>) -> (Arc<MemoryStore>, ServerListCache) {
        let store = Arc::new(MemoryStore::with_servers(records));
        let cache = ServerListCache::new(store.clone());
        (store, cache)
    }

    #[tokio::test]
    async fn test_get_list_loads_once() {
        let (store, cache) = cache_with(vec![ServerRecord::new(1, 1), ServerRecord::new(1, 2)]);

        let first = cache.get_list().await.unwrap();
        let second = cache.get_list().await.unwrap();

        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.call_count("load_server_list"), 1);
    }

    #[tokio::test]
    async fn test_load_populates_per_server_entries() {
        let (_store, cache) = cache_with(vec![ServerRecord::new(1, 7).with_name("Dragon")]);
        assert!(cache.get_server(&ServerKey::new(1, 7)).await.is_none());

        cache.get_list().await.unwrap();

        let server = cache.get_server(&ServerKey::new(1, 7)).await.unwrap();
        assert_eq!(server.name.as_deref(), Some("Dragon"));
    }

    #[tokio::test]
    async fn test_load_failure_is_retried() {
        let (store, cache) = cache_with(vec![ServerRecord::new(1, 1)]);
        store.set_available(false);

        let err = cache.get_list().await.unwrap_err();
        assert!(matches!(err, CacheError::Load { .. }));

        store.set_available(true);
        assert_eq!(cache.get_list().await.unwrap().len(), 1);
        assert_eq!(store.call_count("load_server_list"), 2);
    }

    #[tokio::test]
    async fn test_updates_on_cold_cache_create_records() {
        let (_store, cache) = cache_with(vec![]);

        cache
            .apply_updates(&[ServerRecord::new(1, 1).with_state(2)])
            .await;
        cache
            .apply_updates(&[ServerRecord::new(1, 1).with_addr("1.2.3.4")])
            .await;

        let server = cache.get_server(&ServerKey::new(1, 1)).await.unwrap();
        assert_eq!(server.state, Some(2));
        assert_eq!(server.addr.as_deref(), Some("1.2.3.4"));
        assert_eq!(server.name, None);
        assert_eq!(server.port, None);
    }

    #[tokio::test]
    async fn test_cold_update_does_not_read_the_store() {
        let (store, cache) = cache_with(vec![ServerRecord::new(9, 9).with_state(1)]);

        let applied = cache
            .apply_updates(&[ServerRecord::new(1, 1).with_state(2)])
            .await;

        assert_eq!(applied, 1);
        assert_eq!(store.call_count("load_server_list"), 0);
        assert!(cache.get_server(&ServerKey::new(9, 9)).await.is_none());
        assert!(cache.get_server(&ServerKey::new(1, 1)).await.is_some());
    }

    #[tokio::test]
    async fn test_sequential_and_batched_updates_agree() {
        let (_store, sequential) = cache_with(vec![]);
        sequential
            .apply_updates(&[ServerRecord::new(1, 1).with_state(2)])
            .await;
        sequential
            .apply_updates(&[ServerRecord::new(1, 1).with_addr("x")])
            .await;

        let (_store, batched) = cache_with(vec![]);
        let mut combined = ServerRecord::new(1, 1).with_state(2);
        combined.addr = Some("x".into());
        batched.apply_updates(&[combined]).await;

        assert_eq!(
            sequential.get_server(&ServerKey::new(1, 1)).await,
            batched.get_server(&ServerKey::new(1, 1)).await
        );
    }

    #[tokio::test]
    async fn test_absent_field_never_overwrites_zero() {
        let (_store, cache) = cache_with(vec![ServerRecord::new(1, 1).with_state(0)]);
        cache.get_list().await.unwrap();

        cache
            .apply_updates(&[ServerRecord::new(1, 1).with_name("renamed")])
            .await;
        assert_eq!(cache.get_server(&ServerKey::new(1, 1)).await.unwrap().state, Some(0));

        cache
            .apply_updates(&[ServerRecord::new(1, 1).with_state(3)])
            .await;
        cache
            .apply_updates(&[ServerRecord::new(1, 1).with_state(0)])
            .await;
        assert_eq!(cache.get_server(&ServerKey::new(1, 1)).await.unwrap().state, Some(0));
    }

    #[tokio::test]
    async fn test_list_order_is_preserved() {
        let (_store, cache) = cache_with(vec![
            ServerRecord::new(1, 1),
            ServerRecord::new(1, 2),
            ServerRecord::new(1, 3),
        ]);
        cache.get_list().await.unwrap();

        cache
            .apply_updates(&[
                ServerRecord::new(1, 9).with_name("new"),
                ServerRecord::new(1, 2).with_state(3),
            ])
            .await;

        let table = cache.get_list().await.unwrap();
        let order: Vec<i64> = table.records().iter().map(|r| r.game_id).collect();
        assert_eq!(order, vec![1, 2, 3, 9]);
        assert_eq!(table.records()[1].state, Some(3));
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let (_store, cache) = cache_with(vec![]);

        assert_eq!(cache.apply_updates(&[]).await, 0);
        assert!(cache.inner.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_caller_mutation_does_not_leak_into_cache() {
        let (_store, cache) = cache_with(vec![]);
        let mut update = ServerRecord::new(2, 1).with_name("before");

        cache.apply_updates(std::slice::from_ref(&update)).await;
        update.name = Some("after".into());

        let server = cache.get_server(&ServerKey::new(2, 1)).await.unwrap();
        assert_eq!(server.name.as_deref(), Some("before"));
    }

    #[tokio::test]
    async fn test_old_snapshot_is_not_mutated() {
        let (_store, cache) = cache_with(vec![ServerRecord::new(1, 1).with_state(1)]);
        let before = cache.get_list().await.unwrap();

        cache
            .apply_updates(&[ServerRecord::new(1, 1).with_state(2)])
            .await;

        assert_eq!(before.records()[0].state, Some(1));
        assert_eq!(cache.get_list().await.unwrap().records()[0].state, Some(2));
    }

    #[tokio::test]
    async fn test_concurrent_batches_do_not_lose_updates() {
        let (_store, cache) = cache_with(vec![ServerRecord::new(1, 1)]);
        let cache = Arc::new(cache);
        cache.get_list().await.unwrap();

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    let update = if i % 2 == 0 {
                        ServerRecord::new(1, 1).with_port(7000 + i)
                    } else {
                        ServerRecord::new(1, 100 + i as i64)
                    };
                    cache.apply_updates(&[update]).await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let table = cache.get_list().await.unwrap();
        // 1 original + 10 nuevos
        assert_eq!(table.len(), 11);
        assert!(table.get(&ServerKey::new(1, 1)).unwrap().port.is_some());
    }
}
