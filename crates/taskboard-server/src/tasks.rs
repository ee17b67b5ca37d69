//! Task handlers: `/owners/{id}/items` and `/items/{id}`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use taskboard_shared::{NewTask, Task, TaskPatch};
use taskboard_store::StoreError;

use crate::api::AppState;
use crate::error::ApiError;
use crate::extract::{self, JsonBody};

pub async fn list_tasks(
    State(state): State<AppState>,
    Path(raw_user_id): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let user_id = extract::user_id(&raw_user_id)?;

    let tasks = state.with_db(|db| {
        if !db.user_exists(user_id)? {
            return Err(ApiError::USER_NOT_FOUND);
        }
        Ok(db.list_tasks_for_user(user_id)?)
    })?;

    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    Path(raw_user_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let user_id = extract::user_id(&raw_user_id)?;
    let new_task = NewTask::from_json(&body)?;

    let task = state.with_db(|db| {
        if !db.user_exists(user_id)? {
            return Err(ApiError::USER_NOT_FOUND);
        }
        // The author can still vanish between the check and the insert; the
        // foreign key turns that into the same answer.
        match db.create_task(user_id, &new_task.title) {
            Ok(task) => Ok(task),
            Err(StoreError::ForeignKey) => Err(ApiError::USER_NOT_FOUND),
            Err(other) => Err(other.into()),
        }
    })?;

    info!(task_id = %task.id, user_id = %user_id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// Applies only the supplied fields. `updatedAt` is stamped here on every
/// accepted update; concurrent patches to one task are last-write-wins.
pub async fn update_task(
    State(state): State<AppState>,
    Path(raw_task_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<Task>, ApiError> {
    let task_id = extract::task_id(&raw_task_id)?;
    let patch = TaskPatch::from_json(&body)?;
    let updated_at = taskboard_store::now();

    let task = state.with_db(|db| match db.update_task(task_id, &patch, updated_at) {
        Ok(task) => Ok(task),
        Err(StoreError::NotFound) => Err(ApiError::TASK_NOT_FOUND),
        Err(other) => Err(other.into()),
    })?;

    info!(
        task_id = %task.id,
        title_changed = patch.title.is_some(),
        completed = ?patch.completed,
        "Task updated"
    );
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(raw_task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let task_id = extract::task_id(&raw_task_id)?;

    let deleted = state.with_db(|db| Ok(db.delete_task(task_id)?))?;
    if !deleted {
        return Err(ApiError::TASK_NOT_FOUND);
    }

    info!(task_id = %task_id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}
