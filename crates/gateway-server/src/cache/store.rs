//! Key-value storage and the load-through protocol.
//!
//! Every typed cache owns one [`KeyValueStore`], i.e. one `RwLock` around one
//! map. Values are replaced wholesale on every write; callers get clones
//! (typically of an `Arc`), so a reader never sees a half-written value.

use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;

use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::debug;

use crate::cache::keys::CacheKey;
use crate::metrics::CacheMetrics;

/// Thread-safe map from [`CacheKey`] to `V`, without expiration or eviction.
#[derive(Debug)]
pub struct KeyValueStore<V> {
    entries: RwLock<HashMap<CacheKey, V>>,
}

impl<V: Clone> KeyValueStore<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a copy of the value stored under `key`.
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub async fn set(&self, key: CacheKey, value: V) {
        self.entries.write().await.insert(key, value);
    }

    /// Returns a copy of every entry.
    pub async fn snapshot(&self) -> Vec<(CacheKey, V)> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Takes exclusive access to the whole map.
    ///
    /// Used for critical sections spanning a read-modify-write; every other
    /// reader and writer waits until the guard is dropped.
    pub async fn lock_exclusive(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, V>> {
        self.entries.write().await
    }
}

impl<V: Clone> Default for KeyValueStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`KeyValueStore`] with a get-or-load operation.
///
/// # Known limitation
///
/// The loader runs while the exclusive lock is held, so cold loads of
/// different keys on the same instance are serialized too. Loader latency
/// should be bounded by the caller (the server wraps its store in a
/// `TimeoutStore`).
#[derive(Debug)]
pub struct LoadThroughCache<V> {
    store: KeyValueStore<V>,
    metrics: CacheMetrics,
}

impl<V: Clone> LoadThroughCache<V> {
    pub fn new(metrics: CacheMetrics) -> Self {
        Self {
            store: KeyValueStore::new(),
            metrics,
        }
    }

    /// Returns the value under `key`, running `loader` on a miss.
    ///
    /// 1. Shared lock: a present value is returned at once.
    /// 2. Exclusive lock, then re-check: a value stored by a caller that won
    ///    the race is returned without loading.
    /// 3. Otherwise `loader` runs under the exclusive lock. Success is stored
    ///    and returned. Failure is returned and nothing is stored, so the next
    ///    call retries.
    ///
    /// # Examples
    ///
    /// ```
    /// use gateway_server::cache::{CacheKey, LoadThroughCache};
    /// use gateway_server::metrics::CacheMetrics;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let cache: LoadThroughCache<u32> = LoadThroughCache::new(CacheMetrics::new("doc"));
    ///
    /// let first = cache
    ///     .get_or_load(CacheKey::ServerList, || async { Ok::<_, String>(7) })
    ///     .await;
    /// let second = cache
    ///     .get_or_load(CacheKey::ServerList, || async { Ok::<_, String>(8) })
    ///     .await;
    ///
    /// assert_eq!(first, Ok(7));
    /// assert_eq!(second, Ok(7));
    /// # }
    /// ```
    pub async fn get_or_load<F, Fut, E>(&self, key: CacheKey, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.store.get(&key).await {
            self.metrics.record_hit();
            return Ok(value);
        }

        let mut entries = self.store.lock_exclusive().await;
        if let Some(value) = entries.get(&key) {
            // otro caller lo cargo mientras esperabamos el lock
            self.metrics.record_hit();
            return Ok(value.clone());
        }

        self.metrics.record_miss();
        debug!(key = %key, "Cache miss, loading from store");

        let start = Instant::now();
        match loader().await {
            Ok(value) => {
                self.metrics.record_load(start.elapsed());
                entries.insert(key, value.clone());
                self.metrics.update_entry_count(entries.len());
                Ok(value)
            },
            Err(err) => {
                self.metrics.record_load_failure();
                Err(err)
            },
        }
    }

    /// Stores `value` under `key` unconditionally.
    pub async fn set(&self, key: CacheKey, value: V) {
        let mut entries = self.store.lock_exclusive().await;
        entries.insert(key, value);
        self.metrics.update_entry_count(entries.len());
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &KeyValueStore<V> {
        &self.store
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_key_value_store_set_replaces() {
        let store = KeyValueStore::new();
        assert!(store.get(&CacheKey::ServerList).await.is_none());

        store.set(CacheKey::ServerList, 1).await;
        store.set(CacheKey::ServerList, 2).await;

        assert_eq!(store.get(&CacheKey::ServerList).await, Some(2));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_cold_loads_run_loader_once() {
        let cache = Arc::new(LoadThroughCache::new(CacheMetrics::new("test")));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_load(CacheKey::LoginNotice, || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok::<_, String>(Arc::new(vec![1, 2, 3]))
                        })
                        .await
                })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|v| Arc::ptr_eq(v, &results[0])));
        assert_eq!(cache.metrics().loads(), 1);
        assert_eq!(cache.metrics().misses(), 1);
        assert_eq!(cache.metrics().hits(), 31);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache: LoadThroughCache<u32> = LoadThroughCache::new(CacheMetrics::new("test"));

        let first = cache
            .get_or_load(CacheKey::ServerList, || async { Err("store down") })
            .await;
        assert_eq!(first, Err("store down"));
        assert!(cache.store().is_empty().await);

        let second = cache
            .get_or_load(CacheKey::ServerList, || async { Ok::<_, &str>(5) })
            .await;
        assert_eq!(second, Ok(5));
        assert_eq!(cache.metrics().load_failures(), 1);
        assert_eq!(cache.metrics().loads(), 1);
    }

    #[tokio::test]
    async fn test_keys_load_independently() {
        let cache: LoadThroughCache<&str> = LoadThroughCache::new(CacheMetrics::new("test"));

        let a = cache
            .get_or_load(CacheKey::whitelist("a"), || async { Ok::<_, ()>("a") })
            .await;
        let b = cache
            .get_or_load(CacheKey::whitelist("b"), || async { Ok::<_, ()>("b") })
            .await;

        assert_eq!((a, b), (Ok("a"), Ok("b")));
        assert_eq!(cache.store().len().await, 2);
    }

    #[tokio::test]
    async fn test_set_overrides_loaded_value() {
        let cache: LoadThroughCache<u32> = LoadThroughCache::new(CacheMetrics::new("test"));
        cache
            .get_or_load(CacheKey::LoginNotice, || async { Ok::<_, ()>(1) })
            .await
            .unwrap();

        cache.set(CacheKey::LoginNotice, 2).await;

        let value = cache
            .get_or_load(CacheKey::LoginNotice, || async { Ok::<_, ()>(3) })
            .await;
        assert_eq!(value, Ok(2));
    }
}
