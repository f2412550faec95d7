//! Login gateway binary.

use std::sync::Arc;

use anyhow::Context;
use gateway_server::metrics::init_metrics;
use gateway_server::{AppState, Settings, run_server};
use gateway_store::{GatewayStore, MemoryStore, TimeoutStore};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("failed to load configuration")?;
    let addr = settings
        .bind_addr()
        .context("invalid server.host / server.port")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?settings.server.mode,
        "Starting login gateway"
    );
    if settings.is_dev() {
        tracing::warn!("Dev mode: access control is disabled");
    }

    let prometheus_handle = init_metrics().context("failed to install metrics recorder")?;

    let store: Arc<dyn GatewayStore> = Arc::new(TimeoutStore::new(
        MemoryStore::new(),
        settings.store_timeout(),
    ));
    tracing::info!(store = store.name(), "Backing store ready");

    let state = AppState::new(store, settings.server.mode);

    // Warm the server list; a cold cache is loaded again on first read.
    match state.servers().get_list().await {
        Ok(table) => tracing::info!(servers = table.len(), "Server list warmed"),
        Err(e) => tracing::warn!(error = %e, "Server list warm-up failed"),
    }

    let source = state
        .whitelist()
        .init_from_store(&settings.ip_whitelist)
        .await;
    tracing::info!(source = ?source, "Whitelist initialized");

    run_server(addr, state, prometheus_handle).await?;

    tracing::info!("Server stopped");
    Ok(())
}
