//! Error types for the server.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use peruser_store::StoreError;
use serde_json::json;
use thiserror::Error;

/// Errors that can stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::ServerConfig`].
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Storage error while opening or seeding the store.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// I/O error from the listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-request failures, each mapped to one response.
///
/// Bodies are fixed strings. Store messages are logged, never returned.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("invalid request")]
    BadRequest,

    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::NotFound,
            StoreError::Conflict(_) => ApiError::Conflict,
            StoreError::Validation(_) => ApiError::BadRequest,
            other => {
                tracing::error!(error = %other, "store operation failed");
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        tracing::debug!(error = %e, "rejected request body");
        ApiError::BadRequest
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // Denials carry a status only.
            ApiError::Forbidden => StatusCode::FORBIDDEN.into_response(),
            other => (other.status(), Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}
