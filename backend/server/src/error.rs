use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Request-fatal errors. Per-row award failures are not listed here, they
/// are recorded in the row outcome and never abort the batch.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request body")]
    MalformedPayload,

    #[error("Failed to get access token: {0}")]
    Auth(String),

    #[error("Failed to get users: {0}")]
    DirectoryFetch(String),

    #[error("Store request failed: {0}")]
    Store(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::Auth(_) | AppError::DirectoryFetch(_) | AppError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
