//! Request boundary: turns raw path segments and bodies into plain values so
//! the handlers never deal with transport details.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde_json::Value;
use uuid::Uuid;

use taskboard_shared::ValidationError;

use crate::error::ApiError;

/// Resolve the identifier segment of a route.
///
/// An empty segment means the caller never supplied one. A segment that is
/// not a UUID cannot name any stored row, so it resolves to `not_found`.
pub fn resource_id(
    raw: &str,
    name: &'static str,
    not_found: ApiError,
) -> Result<Uuid, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingId(name).into());
    }
    Uuid::parse_str(raw).map_err(|_| not_found)
}

pub fn user_id(raw: &str) -> Result<Uuid, ApiError> {
    resource_id(raw, "userId", ApiError::USER_NOT_FOUND)
}

pub fn task_id(raw: &str) -> Result<Uuid, ApiError> {
    resource_id(raw, "taskId", ApiError::TASK_NOT_FOUND)
}

/// A JSON request body, kept untyped so that field-level type errors surface
/// as validation failures.
///
/// A body that does not parse as JSON at all is an internal error carrying the
/// parser's message.
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Internal(e.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::Internal(e.to_string()))
    }
}
