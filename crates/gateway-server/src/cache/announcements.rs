//! Login announcement cache.
//!
//! The cached value is the candidate set: enabled announcements that have not
//! ended when they were loaded. The display window is applied on every read,
//! since "now" moves while the snapshot stays valid.

use std::collections::BTreeMap;
use std::sync::Arc;

use gateway_core::Announcement;
use gateway_store::GatewayStore;
use tracing::{error, info};

use crate::cache::error::CacheError;
use crate::cache::keys::CacheKey;
use crate::cache::store::LoadThroughCache;
use crate::metrics::CacheMetrics;

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Picks one announcement per notice type among those active at `now`.
///
/// Higher priority wins; equal priorities go to the higher id. The result is
/// ordered by notice type.
pub fn select_active(candidates: &[Announcement], now: i64) -> Vec<Announcement> {
    let mut winners: BTreeMap<i32, &Announcement> = BTreeMap::new();
    for notice in candidates.iter().filter(|n| n.is_active_at(now)) {
        winners
            .entry(notice.notice_type)
            .and_modify(|current| {
                if notice.outranks(*current) {
                    *current = notice;
                }
            })
            .or_insert(notice);
    }
    winners.into_values().cloned().collect()
}

/// Cache of login announcements.
pub struct AnnouncementCache {
    store: Arc<dyn GatewayStore>,
    inner: LoadThroughCache<Arc<Vec<Announcement>>>,
}

impl AnnouncementCache {
    pub fn new(store: Arc<dyn GatewayStore>) -> Self {
        Self {
            store,
            inner: LoadThroughCache::new(CacheMetrics::new("login_notice")),
        }
    }

    /// Returns the winning announcement of each notice type, right now.
    pub async fn get_active(&self) -> Result<Vec<Announcement>, CacheError> {
        self.get_active_at(unix_now()).await
    }

    /// Same as [`AnnouncementCache::get_active`] for an explicit clock.
    pub async fn get_active_at(&self, now: i64) -> Result<Vec<Announcement>, CacheError> {
        let store = Arc::clone(&self.store);
        let candidates = self
            .inner
            .get_or_load(CacheKey::LoginNotice, || async move {
                load_candidates(store.as_ref(), now).await.map(Arc::new)
            })
            .await?;
        Ok(select_active(&candidates, now))
    }

    /// Reloads the candidate set and republishes it.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<(), CacheError> {
        let candidates = load_candidates(self.store.as_ref(), unix_now()).await?;
        info!(count = candidates.len(), "Login notices refreshed");
        self.inner.set(CacheKey::LoginNotice, Arc::new(candidates)).await;
        Ok(())
    }

    pub fn metrics(&self) -> &CacheMetrics {
        self.inner.metrics()
    }
}

async fn load_candidates(
    store: &dyn GatewayStore,
    now: i64,
) -> Result<Vec<Announcement>, CacheError> {
    store.load_announcements(now).await.map_err(|source| {
        error!(error = %source, "Failed to load login notices from store");
        CacheError::Load {
            key: CacheKey::LoginNotice.to_string(),
            source,
        }
    })
}
