//! Task API endpoints.
//!
//! Each handler does at most one logical read and one logical write to the
//! store; the scheduling decisions come from [`crate::task`].

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use super::error::ApiError;
use super::routes::AppState;
use super::task_store::StoreError;
use super::types::{
    CreatedResponse, EmptyResponse, IdQuery, ListQuery, NextDateQuery, TaskPayload, TaskResponse,
    TasksResponse,
};
use crate::task::{
    complete_task, format_date, lifecycle::is_overdue, next_occurrence, parse_date,
    parse_task_id, schedule_on_create, schedule_on_edit, validate_for_create, validate_for_edit,
    Completion, StoredSchedule, TaskDraft, ValidationError,
};

/// Create task routes (mounted under `/api`, behind auth).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/task",
            post(create_task)
                .get(get_task)
                .put(edit_task)
                .delete(delete_task),
        )
        .route("/task/done", post(mark_done))
        .route("/tasks", get(list_tasks))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/nextdate?now=&date=&repeat= - Compute the next occurrence.
///
/// Plain-text in both directions, so errors are plain text too.
pub async fn next_date(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NextDateQuery>,
) -> Result<String, (StatusCode, String)> {
    let now = if query.now.is_empty() {
        state.today()
    } else {
        parse_date(&query.now)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid 'now': {}", e)))?
    };
    let anchor = parse_date(&query.date)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid 'date': {}", e)))?;

    next_occurrence(now, anchor, &query.repeat)
        .map(format_date)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

/// POST /api/task - Create a task.
async fn create_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let Json(payload) = payload?;
    let draft = TaskDraft::from(payload);
    let valid = validate_for_create(&draft)?;

    let today = state.today();
    let date = schedule_on_create(today, &valid).map_err(ValidationError::from)?;
    let new_task = valid.into_new_task(date);

    let id = state.store.insert_task(&new_task).await?;
    tracing::info!(id, date = %new_task.date, repeat = %new_task.repeat, "Task created");
    Ok(Json(CreatedResponse { id }))
}

/// GET /api/tasks?search= - List tasks by date.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<TasksResponse>, ApiError> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let tasks = state
        .store
        .list_tasks(search, state.config.tasks_limit)
        .await?;
    Ok(Json(TasksResponse {
        tasks: tasks.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/task?id= - Get a single task.
async fn get_task(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = parse_task_id(&query.id)?;
    let task = state.store.get_task(id).await?;
    Ok(Json(task.into()))
}

/// PUT /api/task - Replace every field of a task.
async fn edit_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Json<EmptyResponse>, ApiError> {
    let Json(payload) = payload?;
    let draft = TaskDraft::from(payload);
    let (id, valid) = validate_for_edit(&draft)?;

    let date = schedule_on_edit(state.today(), &valid);
    let task = valid.into_new_task(date).with_id(id);

    state.store.update_task(&task).await?;
    tracing::info!(id, date = %task.date, "Task updated");
    Ok(Json(EmptyResponse {}))
}

/// POST /api/task/done?id= - Complete a task: reschedule or delete it.
async fn mark_done(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<EmptyResponse>, ApiError> {
    let id = parse_task_id(&query.id)?;
    let task = state.store.get_task(id).await?;

    let schedule = StoredSchedule::from_task(&task).map_err(|e| {
        tracing::error!(
            id,
            date = %task.date,
            repeat = %task.repeat,
            "Stored task violates validation invariants: {}",
            e
        );
        StoreError::Corrupt {
            id,
            reason: e.to_string(),
        }
    })?;

    let today = state.today();
    let overdue = is_overdue(today, schedule.date);
    let completion = complete_task(today, &schedule).map_err(|e| {
        tracing::warn!(id, date = %task.date, "Task cannot be rescheduled: {}", e);
        ValidationError::from(e)
    })?;
    match completion {
        Completion::Delete => {
            state.store.delete_task(id).await?;
            tracing::info!(id, overdue, "One-shot task completed and deleted");
        }
        Completion::Reschedule(next) => {
            let next = format_date(next);
            state.store.update_date(id, &next).await?;
            tracing::info!(id, overdue, next = %next, "Recurring task rescheduled");
        }
    }
    Ok(Json(EmptyResponse {}))
}

/// DELETE /api/task?id= - Delete a task.
async fn delete_task(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<EmptyResponse>, ApiError> {
    let id = parse_task_id(&query.id)?;
    state.store.delete_task(id).await?;
    tracing::info!(id, "Task deleted");
    Ok(Json(EmptyResponse {}))
}
