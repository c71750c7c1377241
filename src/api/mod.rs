use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use axum::routing::{get, patch};
use axum::{Json, Router, http::StatusCode, middleware};
use serde::Serialize;
use tracing::{debug, info};

use crate::auth::{Identity, require_auth};
use crate::error::AppError;
use crate::models::{NewTaskRequest, Task, TaskPatch};
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub success: bool,
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub success: bool,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub id: String,
}

pub fn router(state: AppState) -> Router {
    let tasks = Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", patch(update_task).delete(delete_task))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .merge(tasks)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.health_check().await?;
    Ok(StatusCode::OK)
}

async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
) -> Result<Json<TasksResponse>, AppError> {
    let tasks = state
        .store
        .fetch_tasks(&user.uid)
        .await
        .map_err(|e| AppError::operation("Failed to fetch tasks", e))?;
    Ok(Json(TasksResponse {
        success: true,
        tasks,
    }))
}

async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
    payload: Result<Json<NewTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    debug!("create task request from user {}: list={:?} myDay={:?}", user.uid, req.list, req.my_day);

    let new_task = req
        .into_new_task(&user.uid)
        .ok_or_else(|| AppError::BadRequest("Task title is required".to_string()))?;

    let task = state
        .store
        .create_task(new_task)
        .await
        .map_err(|e| AppError::operation("Failed to create task", e))?;

    info!("task {} created for user {}", task.id, user.uid);
    Ok((StatusCode::CREATED, Json(TaskResponse { success: true, task })))
}

async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<TaskResponse>, AppError> {
    let Json(patch) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if patch.has_blank_title() {
        return Err(AppError::BadRequest("Task title is required".to_string()));
    }

    ensure_owner(&state, &user, &id).await?;

    let task = state
        .store
        .update_task(&id, patch)
        .await
        .map_err(|e| AppError::operation("Failed to update task", e))?;
    Ok(Json(TaskResponse { success: true, task }))
}

async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    ensure_owner(&state, &user, &id).await?;

    let id = state
        .store
        .delete_task(&id)
        .await
        .map_err(|e| AppError::operation("Failed to delete task", e))?;

    info!("task {} deleted by user {}", id, user.uid);
    Ok(Json(DeletedResponse { success: true, id }))
}

/// Tasks owned by someone else are reported as missing.
async fn ensure_owner(state: &AppState, user: &Identity, id: &str) -> Result<(), AppError> {
    match state.store.get_task(id).await? {
        Some(task) if task.user_id == user.uid => Ok(()),
        _ => Err(AppError::Store(StoreError::NotFound(id.to_string()))),
    }
}
