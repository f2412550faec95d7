//! Player login history endpoints.

use axum::{
    Form, Json,
    extract::rejection::{FormRejection, JsonRejection, QueryRejection},
    extract::{Query, State},
};
use gateway_core::{PlayerHistoryEntry, UserHistory};
use serde::Deserialize;
use tracing::{error, instrument};

use crate::error::AppError;
use crate::handlers::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AccountQuery {
    pub account_id: Option<String>,
}

/// A player's login on one server.
#[derive(Debug, Deserialize)]
pub struct SetHistoryRequest {
    pub account_id: String,
    #[serde(flatten)]
    pub entry: PlayerHistoryEntry,
}

#[derive(Debug, Deserialize)]
pub struct SetStateRequest {
    pub account_id: String,
    pub state: i32,
}

/// GET /loginServer/getPlayerServerList?account_id=
#[instrument(skip_all)]
pub async fn get_player_server_list(
    State(state): State<AppState>,
    query: Result<Query<AccountQuery>, QueryRejection>,
) -> Result<ApiResponse<UserHistory>, AppError> {
    let Query(query) = query?;
    let Some(account_id) = query.account_id else {
        return Err(AppError::BadRequest(
            "missing required parameter: account_id".to_string(),
        ));
    };
    if account_id.is_empty() {
        return Err(AppError::Failed("invalid request parameter".to_string()));
    }

    let history = state
        .store()
        .get_user_history(&account_id)
        .await
        .map_err(|e| {
            error!(error = %e, account_id = %account_id, "Failed to load player history");
            AppError::Failed("failed to get server list".to_string())
        })?;
    Ok(ApiResponse::ok(history))
}

/// POST /loginServer/setUserHistory
#[instrument(skip_all)]
pub async fn set_user_history(
    State(state): State<AppState>,
    payload: Result<Json<SetHistoryRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(request) = payload?;
    if request.account_id.is_empty() {
        return Err(AppError::BadRequest("account_id must not be empty".to_string()));
    }

    state
        .store()
        .record_player_login(&request.account_id, request.entry)
        .await
        .map_err(|e| {
            error!(error = %e, account_id = %request.account_id, "Failed to save player history");
            AppError::Failed("failed to save history".to_string())
        })?;
    Ok(ApiResponse::done("reported"))
}

/// POST /loginServer/setUserState (form encoded)
#[instrument(skip_all)]
pub async fn set_user_state(
    State(state): State<AppState>,
    payload: Result<Form<SetStateRequest>, FormRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Form(request) = payload?;

    state
        .store()
        .set_user_state(&request.account_id, request.state)
        .await
        .map_err(|e| {
            error!(error = %e, account_id = %request.account_id, "Failed to update account state");
            AppError::Failed("failed to update state".to_string())
        })?;
    Ok(ApiResponse::done("ok"))
}
