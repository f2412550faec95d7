use axum::{
    extract::rejection::{FormRejection, JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::cache::CacheError;
use crate::handlers::response::{ApiResponse, status_code};

#[derive(Debug)]
pub enum AppError {
    /// Parametros invalidos (status 1002)
    BadRequest(String),

    /// La operacion fallo (status 1001)
    Failed(String),

    /// Acceso rechazado por el control de acceso (HTTP 403)
    Forbidden(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (http_status, code, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::OK, status_code::BAD_REQUEST, msg),
            AppError::Failed(msg) => (StatusCode::OK, status_code::ERROR, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, status_code::BAD_REQUEST, msg),
        };

        (http_status, ApiResponse::<()>::empty(code, message)).into_response()
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Invalid(inner) => AppError::BadRequest(inner.to_string()),
            other => AppError::Failed(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("invalid parameters: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(format!("invalid parameters: {}", rejection.body_text()))
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::BadRequest(format!("invalid parameters: {}", rejection.body_text()))
    }
}
