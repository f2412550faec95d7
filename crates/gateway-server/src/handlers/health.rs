use axum::{Json, extract::State};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}

impl HealthResponse {
    fn new(up: bool, store: &str) -> Self {
        Self {
            status: if up { "UP" } else { "DOWN" }.to_string(),
            store: store.to_string(),
        }
    }
}

/// Reports `UP` when the backing store answers its health check.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store();
    let up = match store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, store = store.name(), "Store health check failed");
            false
        }
    };
    Json(HealthResponse::new(up, store.name()))
}
