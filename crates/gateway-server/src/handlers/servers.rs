//! Server list endpoints.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use gateway_core::{ServerRecord, server_state};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use crate::error::AppError;
use crate::handlers::response::ApiResponse;
use crate::state::AppState;

/// One entry of a state change batch. Entries without `state` are skipped.
#[derive(Debug, Deserialize)]
pub struct ChangeStateRequest {
    pub cluster_id: i64,
    pub game_id: i64,
    #[serde(default)]
    pub state: Option<i32>,
}

/// GET /loginServer/getServerList
#[instrument(skip_all)]
pub async fn get_server_list(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ServerRecord>>, AppError> {
    let table = state
        .servers()
        .get_list()
        .await
        .inspect_err(|e| error!(error = %e, "Failed to get server list"))?;
    Ok(ApiResponse::ok(table.records().to_vec()))
}

/// POST /loginServer/reportServerList
///
/// Body: JSON array of sparse server records. The store is written first,
/// then the same records are merged into the cache.
#[instrument(skip_all)]
pub async fn report_server_list(
    State(state): State<AppState>,
    payload: Result<Json<Vec<ServerRecord>>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(records) = payload.inspect_err(|e| warn!(error = %e, "Bad server report"))?;
    if records.is_empty() {
        return Ok(ApiResponse::done("empty list"));
    }

    state
        .store()
        .upsert_server_records(&records)
        .await
        .map_err(|e| {
            error!(error = %e, count = records.len(), "Server report upsert failed");
            AppError::Failed("batch report failed".to_string())
        })?;

    let applied = state.servers().apply_updates(&records).await;
    info!(applied, "Server report applied");
    Ok(ApiResponse::done("batch report succeeded"))
}

/// POST /loginServer/changeServerState
#[instrument(skip_all)]
pub async fn change_server_state(
    State(state): State<AppState>,
    payload: Result<Json<Vec<ChangeStateRequest>>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(changes) = payload.map_err(|e| {
        AppError::BadRequest(format!(
            "parameter error: cluster_id, game_id and state are required ({})",
            e.body_text()
        ))
    })?;

    let records: Vec<ServerRecord> = changes
        .into_iter()
        .filter_map(|change| {
            let state = change.state?;
            if !(server_state::MAINTENANCE..=server_state::FULL).contains(&state) {
                warn!(state, cluster_id = change.cluster_id, game_id = change.game_id, "Unknown server state reported");
            }
            Some(ServerRecord::new(change.cluster_id, change.game_id).with_state(state))
        })
        .collect();

    state
        .store()
        .update_server_states(&records)
        .await
        .map_err(|e| {
            error!(error = %e, "Server state update failed");
            AppError::Failed("state update failed".to_string())
        })?;

    state.servers().apply_updates(&records).await;
    Ok(ApiResponse::done("state updated"))
}
