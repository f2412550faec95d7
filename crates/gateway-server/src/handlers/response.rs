//! Response envelope shared by every endpoint.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Business status codes carried in the envelope.
pub mod status_code {
    pub const SUCCESS: i32 = 0;
    pub const ERROR: i32 = 1001;
    pub const BAD_REQUEST: i32 = 1002;
}

/// `{ "status": .., "message": .., "data": .. }`, with `data` omitted when
/// there is none.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub status: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Default message for a status code, used when the caller gives none.
fn default_message(code: i32) -> &'static str {
    match code {
        status_code::SUCCESS => "success",
        status_code::ERROR => "failed",
        status_code::BAD_REQUEST => "parameter error",
        _ => "",
    }
}

impl<T> ApiResponse<T> {
    /// Builds an envelope; an empty `message` falls back to the code's default.
    pub fn new(code: i32, message: impl Into<String>, data: Option<T>) -> Self {
        let message = message.into();
        Self {
            status: code,
            message: if message.is_empty() {
                default_message(code).to_string()
            } else {
                message
            },
            data,
        }
    }

    /// Success with data and the default message.
    pub fn ok(data: T) -> Self {
        Self::new(status_code::SUCCESS, "", Some(data))
    }

    /// Success with data and a custom message.
    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self::new(status_code::SUCCESS, message, Some(data))
    }
}

impl ApiResponse<()> {
    /// Envelope without data.
    pub fn empty(code: i32, message: impl Into<String>) -> Self {
        Self::new(code, message, None)
    }

    /// Success without data.
    pub fn done(message: impl Into<String>) -> Self {
        Self::empty(status_code::SUCCESS, message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
