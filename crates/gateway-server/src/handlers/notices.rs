//! Login notice endpoints: the client read path and the admin CRUD surface.
//!
//! Every admin write goes to the store first and then republishes the
//! cached candidate set, so clients see the change on their next read.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
};
use gateway_core::{Announcement, AnnouncementQuery, Page};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::error::AppError;
use crate::handlers::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    #[serde(default)]
    pub ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct FindQuery {
    #[serde(default)]
    pub id: Option<String>,
}

/// Accepts the id as a JSON number or a numeric string.
fn parse_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Republishes the cached notices after an admin write.
///
/// The write already succeeded, so a failed reload is only logged; the old
/// snapshot keeps serving until the next successful refresh.
async fn refresh_notices(state: &AppState) {
    if let Err(e) = state.notices().refresh().await {
        warn!(error = %e, "Login notice refresh failed after admin write");
    }
}

/// GET /loginServer/getLoginNotice
///
/// Never fails from the client's point of view: a load error yields an
/// empty list.
#[instrument(skip_all)]
pub async fn get_login_notice(State(state): State<AppState>) -> ApiResponse<Vec<Announcement>> {
    let notices = state.notices().get_active().await.unwrap_or_else(|e| {
        warn!(error = %e, "Login notices unavailable, serving empty list");
        Vec::new()
    });
    ApiResponse::ok(notices)
}

/// POST /loginServer/loginNotice/create
#[instrument(skip_all)]
pub async fn create_notice(
    State(state): State<AppState>,
    payload: Result<Json<Announcement>, JsonRejection>,
) -> Result<ApiResponse<Announcement>, AppError> {
    let Json(notice) = payload?;

    let created = state
        .store()
        .create_announcement(notice)
        .await
        .map_err(|e| {
            error!(error = %e, "Create login notice failed");
            AppError::Failed("create failed".to_string())
        })?;

    info!(id = created.id, notice_type = created.notice_type, "Login notice created");
    refresh_notices(&state).await;
    Ok(ApiResponse::ok_with_message("created", created))
}

/// POST /loginServer/loginNotice/update
#[instrument(skip_all)]
pub async fn update_notice(
    State(state): State<AppState>,
    payload: Result<Json<Announcement>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(notice) = payload?;
    if notice.id == 0 {
        return Err(AppError::BadRequest("invalid id".to_string()));
    }
    let id = notice.id;

    state
        .store()
        .update_announcement(notice)
        .await
        .map_err(|e| {
            error!(error = %e, id, "Update login notice failed");
            AppError::Failed("update failed".to_string())
        })?;

    refresh_notices(&state).await;
    Ok(ApiResponse::done("updated"))
}

/// POST /loginServer/loginNotice/delete
#[instrument(skip_all)]
pub async fn delete_notice(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(request) = payload?;
    let id = request
        .id
        .as_ref()
        .and_then(parse_id)
        .filter(|id| *id != 0)
        .ok_or_else(|| AppError::BadRequest("id must not be empty".to_string()))?;

    state.store().delete_announcement(id).await.map_err(|e| {
        error!(error = %e, id, "Delete login notice failed");
        AppError::Failed("delete failed".to_string())
    })?;

    refresh_notices(&state).await;
    Ok(ApiResponse::done("deleted"))
}

/// POST /loginServer/loginNotice/batchDelete
#[instrument(skip_all)]
pub async fn batch_delete_notices(
    State(state): State<AppState>,
    payload: Result<Json<BatchDeleteRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, AppError> {
    let Json(request) = payload?;
    if request.ids.is_empty() {
        return Err(AppError::BadRequest("ids must not be empty".to_string()));
    }

    state
        .store()
        .delete_announcements(&request.ids)
        .await
        .map_err(|e| {
            error!(error = %e, count = request.ids.len(), "Batch delete login notices failed");
            AppError::Failed("batch delete failed".to_string())
        })?;

    refresh_notices(&state).await;
    Ok(ApiResponse::done("batch deleted"))
}

/// GET /loginServer/loginNotice/find?id=
#[instrument(skip_all)]
pub async fn find_notice(
    State(state): State<AppState>,
    query: Result<Query<FindQuery>, QueryRejection>,
) -> Result<ApiResponse<Announcement>, AppError> {
    let Query(query) = query?;
    let id = query
        .id
        .as_deref()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|id| *id != 0)
        .ok_or_else(|| AppError::BadRequest("invalid id".to_string()))?;

    match state.store().find_announcement(id).await {
        Ok(Some(notice)) => Ok(ApiResponse::ok(notice)),
        Ok(None) => Err(AppError::Failed("not found".to_string())),
        Err(e) => {
            error!(error = %e, id, "Find login notice failed");
            Err(AppError::Failed("query failed".to_string()))
        }
    }
}

/// GET /loginServer/loginNotice/list
#[instrument(skip_all)]
pub async fn list_notices(
    State(state): State<AppState>,
    query: Result<Query<AnnouncementQuery>, QueryRejection>,
) -> Result<ApiResponse<Page<Announcement>>, AppError> {
    let Query(query) = query?;
    let query = query.normalized();

    let page = state
        .store()
        .list_announcements(&query)
        .await
        .map_err(|e| {
            error!(error = %e, "List login notices failed");
            AppError::Failed("failed to get list".to_string())
        })?;
    Ok(ApiResponse::ok(page))
}
