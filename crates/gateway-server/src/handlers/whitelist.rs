//! Whitelist administration endpoints.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::cache::CacheError;
use crate::error::AppError;
use crate::handlers::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GroupQuery {
    #[serde(default)]
    pub api_group: String,
}

/// A group and its entries. `ips` is `null` when the group is not configured.
#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub api_group: String,
    pub ips: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SetGroupRequest {
    pub api_group: String,
    #[serde(default)]
    pub ips: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct IpRequest {
    pub api_group: String,
    pub ip: String,
}

/// Maps a cache write error to the envelope, keeping the action in the message.
fn write_error(action: &str, err: CacheError) -> AppError {
    if err.is_invalid() {
        return AppError::BadRequest(format!("parameter error: {err}"));
    }
    error!(error = %err, action, "Whitelist write failed");
    AppError::Failed(format!("{action} failed: {err}"))
}

fn require_group(group: &str) -> Result<(), AppError> {
    if group.trim().is_empty() {
        return Err(AppError::BadRequest(
            "parameter error: api_group must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// GET /loginServer/whitelist/get?api_group=
#[instrument(skip_all)]
pub async fn get_whitelist(
    State(state): State<AppState>,
    query: Result<Query<GroupQuery>, QueryRejection>,
) -> Result<ApiResponse<GroupResponse>, AppError> {
    let Query(query) = query?;
    require_group(&query.api_group)?;

    let ips = state.whitelist().get_group(&query.api_group).await;
    Ok(ApiResponse::ok(GroupResponse {
        api_group: query.api_group,
        ips,
    }))
}

/// GET /loginServer/whitelist/getAll
#[instrument(skip_all)]
pub async fn get_all_whitelists(
    State(state): State<AppState>,
) -> ApiResponse<BTreeMap<String, Vec<String>>> {
    ApiResponse::ok(state.whitelist().all().await)
}

/// POST /loginServer/whitelist/set
#[instrument(skip_all)]
pub async fn set_whitelist(
    State(state): State<AppState>,
    payload: Result<Json<SetGroupRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(request) = payload?;
    require_group(&request.api_group)?;

    let stored = state
        .whitelist()
        .replace_group(&request.api_group, &request.ips)
        .await
        .map_err(|e| write_error("set", e))?;

    info!(group = %request.api_group, count = stored.len(), "Whitelist set");
    Ok(ApiResponse::done("set succeeded"))
}

/// POST /loginServer/whitelist/add
#[instrument(skip_all)]
pub async fn add_whitelist_ip(
    State(state): State<AppState>,
    payload: Result<Json<IpRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(request) = payload?;
    require_group(&request.api_group)?;

    state
        .whitelist()
        .add_ip(&request.api_group, &request.ip)
        .await
        .map_err(|e| write_error("add", e))?;
    Ok(ApiResponse::done("add succeeded"))
}

/// POST /loginServer/whitelist/remove
#[instrument(skip_all)]
pub async fn remove_whitelist_ip(
    State(state): State<AppState>,
    payload: Result<Json<IpRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(request) = payload?;
    require_group(&request.api_group)?;

    state
        .whitelist()
        .remove_ip(&request.api_group, &request.ip)
        .await
        .map_err(|e| write_error("remove", e))?;
    Ok(ApiResponse::done("remove succeeded"))
}
