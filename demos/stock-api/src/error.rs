use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use ashare_summary::api::ApiResponse;
use ashare_summary::SummaryError;

/// Unified error type that renders as the `{"ok": false, "msg": "..."}`
/// envelope with an HTTP status matching the failure class.
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::failure(self.message))).into_response()
    }
}

impl From<SummaryError> for AppError {
    fn from(e: SummaryError) -> Self {
        match e.http_status() {
            400 => AppError::bad_request(e.to_string()),
            _ => AppError::internal(e.to_string()),
        }
    }
}
