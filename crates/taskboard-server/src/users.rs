//! `/owners` handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use taskboard_shared::{NewUser, RenameUser, User};

use crate::api::AppState;
use crate::error::ApiError;
use crate::extract::{self, JsonBody};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.with_db(|db| Ok(db.list_users()?))?;
    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let new_user = NewUser::from_json(&body)?;

    let user = state.with_db(|db| Ok(db.create_user(&new_user.name)?))?;

    info!(user_id = %user.id, name = %user.name, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn rename_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<User>, ApiError> {
    let id = extract::user_id(&raw_id)?;
    let rename = RenameUser::from_json(&body)?;

    let user = state.with_db(|db| match db.rename_user(id, &rename.name) {
        Ok(user) => Ok(user),
        Err(taskboard_store::StoreError::NotFound) => Err(ApiError::USER_NOT_FOUND),
        Err(other) => Err(other.into()),
    })?;

    info!(user_id = %user.id, name = %user.name, "User renamed");
    Ok(Json(user))
}

/// Deleting a user takes its tasks with it (schema cascade).
pub async fn delete_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = extract::user_id(&raw_id)?;

    let deleted = state.with_db(|db| Ok(db.delete_user(id)?))?;
    if !deleted {
        return Err(ApiError::USER_NOT_FOUND);
    }

    info!(user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
