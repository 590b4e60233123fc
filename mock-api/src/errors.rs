//! Error types for the mock API

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

/// Handler failures, rendered as plain-text responses
#[derive(Error, Debug)]
pub enum MockError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MockError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MockError::BadRequest(_) => StatusCode::BAD_REQUEST,
            MockError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            MockError::ServerError(_) | MockError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        (status, format!("{}\n", self)).into_response()
    }
}
