//! Application state.

use std::sync::Arc;

use gateway_store::GatewayStore;

use crate::cache::{AnnouncementCache, ServerListCache, WhitelistCache};
use crate::config::ServerMode;

/// Application state shared across all handlers.
///
/// Every cache is an explicit instance owned here, so tests can build as many
/// isolated states as they need.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn GatewayStore>,
    servers: Arc<ServerListCache>,
    notices: Arc<AnnouncementCache>,
    whitelist: Arc<WhitelistCache>,
    mode: ServerMode,
}

impl AppState {
    /// Creates the state and its caches over `store`.
    pub fn new(store: Arc<dyn GatewayStore>, mode: ServerMode) -> Self {
        Self {
            servers: Arc::new(ServerListCache::new(Arc::clone(&store))),
            notices: Arc::new(AnnouncementCache::new(Arc::clone(&store))),
            whitelist: Arc::new(WhitelistCache::new(Arc::clone(&store))),
            store,
            mode,
        }
    }

    /// Returns the backing store.
    pub fn store(&self) -> &dyn GatewayStore {
        self.store.as_ref()
    }

    pub fn servers(&self) -> &ServerListCache {
        &self.servers
    }

    pub fn notices(&self) -> &AnnouncementCache {
        &self.notices
    }

    pub fn whitelist(&self) -> &WhitelistCache {
        &self.whitelist
    }

    pub fn mode(&self) -> ServerMode {
        self.mode
    }
}
