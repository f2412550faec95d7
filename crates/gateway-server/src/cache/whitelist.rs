//! Per-API-group IP whitelist cache.
//!
//! A group's entry has three states:
//!
//! - absent: no restriction configured, every client is allowed;
//! - present and empty: every client is denied;
//! - present with entries: only matching clients are allowed.
//!
//! Writes go to the store first. The cache changes only after the store
//! accepted the write. Writers are serialized from the store write until the
//! cache holds the result, so a slow reload cannot overwrite a newer one.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use gateway_core::GatewayError;
use gateway_core::whitelist::{is_allowed, normalize_group, validate_entries, validate_entry};
use gateway_store::GatewayStore;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::error::CacheError;
use crate::cache::keys::CacheKey;
use crate::cache::store::KeyValueStore;
use crate::metrics::CacheMetrics;

/// Where the startup whitelist came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitelistSource {
    /// Loaded from the store, reconciled with the configured baseline.
    Store,
    /// The store was unreachable; seeded from configuration only.
    Config,
}

/// Cache of allowed IP/CIDR entries per API group.
pub struct WhitelistCache {
    store: Arc<dyn GatewayStore>,
    entries: KeyValueStore<Arc<Vec<String>>>,
    /// Held by mutations across the store write and the cache update.
    writes: Mutex<()>,
    metrics: CacheMetrics,
}

fn group_key(group: &str) -> Result<CacheKey, CacheError> {
    let key = CacheKey::whitelist(group);
    if key.group().is_none_or(str::is_empty) {
        return Err(GatewayError::validation("api_group", "api_group must not be empty").into());
    }
    Ok(key)
}

fn trimmed_entries(raw: &[String]) -> Vec<String> {
    let mut ips: Vec<String> = Vec::with_capacity(raw.len());
    for ip in raw.iter().map(|ip| ip.trim()).filter(|ip| !ip.is_empty()) {
        if !ips.iter().any(|existing| existing == ip) {
            ips.push(ip.to_string());
        }
    }
    ips
}

impl WhitelistCache {
    pub fn new(store: Arc<dyn GatewayStore>) -> Self {
        Self {
            store,
            entries: KeyValueStore::new(),
            writes: Mutex::new(()),
            metrics: CacheMetrics::new("whitelist"),
        }
    }

    /// Returns a copy of the group's entries, or `None` when the group is not
    /// configured.
    pub async fn get_group(&self, group: &str) -> Option<Vec<String>> {
        self.entries
            .get(&CacheKey::whitelist(group))
            .await
            .map(|ips| ips.as_ref().clone())
    }

    /// Checks a client address against the group's allow list.
    pub async fn check(&self, group: &str, client_ip: &str) -> bool {
        let allowed = self.entries.get(&CacheKey::whitelist(group)).await;
        is_allowed(client_ip, allowed.as_deref().map(Vec::as_slice))
    }

    /// Replaces the group's entries.
    ///
    /// Every entry is validated before anything is written. Blank entries are
    /// dropped and duplicates collapse. An empty list leaves the group present
    /// and denying everyone.
    pub async fn replace_group(&self, group: &str, ips: &[String]) -> Result<Vec<String>, CacheError> {
        let key = group_key(group)?;
        let valid = validate_entries(ips)?;
        let name = name_of(&key);
        let _writer = self.writes.lock().await;

        self.store
            .replace_whitelist_group(&name, &valid)
            .await
            .map_err(|source| CacheError::Write {
                operation: "replace_whitelist_group",
                source,
            })?;

        info!(group = %name, count = valid.len(), "Whitelist group replaced");
        self.entries.set(key, Arc::new(valid.clone())).await;
        self.update_entry_gauge().await;
        Ok(valid)
    }

    /// Adds one entry to the group. Adding an existing entry is a no-op.
    pub async fn add_ip(&self, group: &str, ip: &str) -> Result<(), CacheError> {
        let key = group_key(group)?;
        let ip = validate_entry(ip)?;
        let name = name_of(&key);
        let _writer = self.writes.lock().await;

        self.store
            .upsert_whitelist_ip(&name, &ip)
            .await
            .map_err(|source| CacheError::Write {
                operation: "upsert_whitelist_ip",
                source,
            })?;

        self.reload_or_patch(key, "add_ip", |ips| {
            let mut ips = ips.unwrap_or_default();
            if !ips.contains(&ip) {
                ips.push(ip.clone());
            }
            Some(ips)
        })
        .await;
        Ok(())
    }

    /// Removes one entry from the group.
    pub async fn remove_ip(&self, group: &str, ip: &str) -> Result<(), CacheError> {
        let key = group_key(group)?;
        let ip = validate_entry(ip)?;
        let name = name_of(&key);
        let _writer = self.writes.lock().await;

        self.store
            .delete_whitelist_ip(&name, &ip)
            .await
            .map_err(|source| CacheError::Write {
                operation: "delete_whitelist_ip",
                source,
            })?;

        self.reload_or_patch(key, "remove_ip", |ips| {
            ips.map(|mut ips| {
                ips.retain(|existing| *existing != ip);
                ips
            })
        })
        .await;
        Ok(())
    }

    /// Re-reads the group from the store after a successful write.
    ///
    /// Callers hold the writer lock. If that read fails the cached entry is
    /// patched in memory with `patch`, a warning is logged and the degraded
    /// counter is bumped.
    async fn reload_or_patch<F>(&self, key: CacheKey, operation: &'static str, patch: F)
    where
        F: FnOnce(Option<Vec<String>>) -> Option<Vec<String>>,
    {
        let name = name_of(&key);
        match self.store.load_whitelist_group(&name).await {
            Ok(ips) => {
                debug!(group = %name, count = ips.len(), "Whitelist group reloaded");
                self.entries.set(key, Arc::new(ips)).await;
            },
            Err(err) => {
                warn!(
                    group = %name,
                    operation,
                    error = %err,
                    "Whitelist reload failed after store write, patching cache in memory"
                );
                self.metrics.record_degraded(operation);

                let mut entries = self.entries.lock_exclusive().await;
                let current = entries.get(&key).map(|ips| ips.as_ref().clone());
                if let Some(patched) = patch(current) {
                    entries.insert(key, Arc::new(patched));
                }
            },
        }
        self.update_entry_gauge().await;
    }

    /// Seeds the cache at startup.
    ///
    /// When the store answers, its groups are loaded and every configured
    /// entry missing from the store is written to it (failures are logged and
    /// skipped). When the store is unreachable, `configured` alone seeds the
    /// cache, including groups configured with an empty list.
    pub async fn init_from_store(
        &self,
        configured: &HashMap<String, Vec<String>>,
    ) -> WhitelistSource {
        let mut baseline: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (group, ips) in configured {
            let group = normalize_group(group);
            if group.is_empty() {
                continue;
            }
            let merged = baseline.entry(group).or_default();
            for ip in trimmed_entries(ips) {
                if !merged.contains(&ip) {
                    merged.push(ip);
                }
            }
        }

        let stored = match self.store.load_all_whitelist_groups().await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(
                    error = %err,
                    groups = baseline.len(),
                    "Whitelist store unreachable, seeding from configuration"
                );
                for (group, ips) in baseline {
                    self.entries
                        .set(CacheKey::Whitelist(group), Arc::new(ips))
                        .await;
                }
                self.update_entry_gauge().await;
                return WhitelistSource::Config;
            },
        };

        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (group, ips) in stored {
            groups.entry(normalize_group(&group)).or_default().extend(ips);
        }

        for (group, ips) in baseline {
            for ip in ips {
                if groups.get(&group).is_some_and(|known| known.contains(&ip)) {
                    continue;
                }
                match self.store.upsert_whitelist_ip(&group, &ip).await {
                    Ok(()) => {
                        info!(group = %group, ip = %ip, "Configured whitelist entry synced to store");
                        groups.entry(group.clone()).or_default().push(ip);
                    },
                    Err(err) => {
                        warn!(group = %group, ip = %ip, error = %err, "Failed to sync configured whitelist entry");
                    },
                }
            }
        }

        info!(groups = groups.len(), "Whitelist loaded from store");
        for (group, ips) in groups {
            self.entries
                .set(CacheKey::Whitelist(group), Arc::new(ips))
                .await;
        }
        self.update_entry_gauge().await;
        WhitelistSource::Store
    }

    /// Names of every configured group, sorted.
    pub async fn groups(&self) -> Vec<String> {
        self.all().await.into_keys().collect()
    }

    /// Copy of every configured group.
    pub async fn all(&self) -> BTreeMap<String, Vec<String>> {
        self.entries
            .snapshot()
            .await
            .into_iter()
            .filter_map(|(key, ips)| Some((key.group()?.to_string(), ips.as_ref().clone())))
            .collect()
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    async fn update_entry_gauge(&self) {
        self.metrics.update_entry_count(self.entries.len().await);
    }
}

fn name_of(key: &CacheKey) -> String {
    key.group().unwrap_or_default().to_string()
}
