use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use taskboard_shared::{ErrorBody, ValidationError};
use taskboard_store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced user or task does not exist. Carries the full message
    /// ("User not found", "Task not found").
    #[error("{0}")]
    NotFound(&'static str),

    /// Anything unexpected. The message is passed through to the caller.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub const USER_NOT_FOUND: Self = ApiError::NotFound("User not found");
    pub const TASK_NOT_FOUND: Self = ApiError::NotFound("Task not found");

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}
