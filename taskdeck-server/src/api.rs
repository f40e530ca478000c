//! HTTP API for Taskdeck: router, handlers, and error mapping.
//!
//! Each route translates 1:1 onto a [`TaskStore`] operation and serializes
//! the returned entities as JSON. The HTTP layer carries no ordering logic
//! of its own.
//!
//! | Method/Path                  | Operation        | Success |
//! |------------------------------|------------------|---------|
//! | GET    /tasks                | list incomplete  | 200     |
//! | GET    /tasks/completed      | list completed   | 200     |
//! | POST   /tasks                | create           | 201     |
//! | PATCH  /tasks/reorder        | reorder batch    | 200     |
//! | PATCH  /tasks/{id}           | sparse update    | 200     |
//! | PATCH  /tasks/{id}/complete  | complete         | 200     |
//! | PATCH  /tasks/{id}/defer     | defer to end     | 200     |
//! | DELETE /tasks/{id}           | delete           | 204     |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use taskdeck_model::{ReorderItem, Task, TaskDraft, TaskError, TaskId, TaskPatch};

use crate::store::{StoreError, TaskStore};

/// Error type returned by all handlers, serialized as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// A plain 404 for ids with no task.
    fn not_found(detail: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::Task(TaskError::TitleEmpty | TaskError::TitleTooLong) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            StoreError::Task(TaskError::NotFound(_)) => StatusCode::NOT_FOUND,
            StoreError::Task(TaskError::CompletedImmutable(_)) => StatusCode::CONFLICT,
            StoreError::Snapshot(e) => {
                tracing::error!(error = %e, "store persistence failed");
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: "internal storage error".to_string(),
                };
            }
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.detail }));
        (self.status, body).into_response()
    }
}

/// Builds the Taskdeck router over a shared store.
///
/// The static `/tasks/reorder` segment wins over `/tasks/{id}`, so reorder
/// requests never reach the id-parsing handlers.
pub fn router(store: Arc<TaskStore>) -> axum::Router {
    axum::Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/completed", get(list_completed))
        .route("/tasks/reorder", patch(reorder_tasks))
        .route("/tasks/{id}", patch(update_task).delete(delete_task))
        .route("/tasks/{id}/complete", patch(complete_task))
        .route("/tasks/{id}/defer", patch(defer_task))
        .with_state(store)
}

/// GET /tasks — all incomplete tasks, ascending by position.
async fn list_tasks(State(store): State<Arc<TaskStore>>) -> Json<Vec<Task>> {
    Json(store.list_incomplete().await)
}

/// GET /tasks/completed — all completed tasks, newest first.
async fn list_completed(State(store): State<Arc<TaskStore>>) -> Json<Vec<Task>> {
    Json(store.list_completed().await)
}

/// POST /tasks — create a task at the end of the ordering.
async fn create_task(
    State(store): State<Arc<TaskStore>>,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = store.create(draft).await?;
    tracing::info!(id = %task.id, position = task.position, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// PATCH /tasks/reorder — apply a batch of position assignments.
async fn reorder_tasks(
    State(store): State<Arc<TaskStore>>,
    Json(items): Json<Vec<ReorderItem>>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let count = items.len();
    let tasks = store.reorder(items).await?;
    tracing::info!(items = count, "tasks reordered");
    Ok(Json(tasks))
}

/// PATCH /tasks/{id} — sparse update of editable fields.
async fn update_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<TaskId>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let task = store.update(id, patch).await?;
    Ok(Json(task))
}

/// PATCH /tasks/{id}/complete — flip the completed flag.
async fn complete_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, ApiError> {
    let task = store.complete(id).await?;
    tracing::info!(id = %id, "task completed");
    Ok(Json(task))
}

/// PATCH /tasks/{id}/defer — move to the end of the incomplete ordering.
async fn defer_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, ApiError> {
    let task = store.defer(id).await?;
    tracing::info!(id = %id, position = task.position, "task deferred");
    Ok(Json(task))
}

/// DELETE /tasks/{id} — remove a task regardless of completion state.
async fn delete_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<TaskId>,
) -> Result<StatusCode, ApiError> {
    if store.delete(id).await? {
        tracing::info!(id = %id, "task deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("task not found: {id}")))
    }
}

/// Starts the server on the given address and returns the bound address and
/// a join handle.
///
/// This is the primary entry point used by both `main.rs` and test code.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
    store: Arc<TaskStore>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "server error");
        }
    });

    Ok((bound_addr, handle))
}
