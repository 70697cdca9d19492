//! Task CRUD routes.

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use recap_core::{Task, TaskStatus};
use recap_store::{TaskCreateParams, TaskFilter, TaskRepository, TaskUpdateParams};

use crate::error::ApiError;
use crate::handlers::{default_user, require_iso_date};
use crate::state::AppState;

/// Query params for `GET /api/tasks`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<String>,
    pub completed: Option<bool>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Comma-separated tag names, overlap match.
    pub tags: Option<String>,
}

fn parse_status(value: &str) -> Result<TaskStatus, ApiError> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| ApiError::bad_request(format!("unknown status '{value}'")))
}

/// GET /api/tasks
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    for (field, value) in [("from", query.from.as_deref()), ("to", query.to.as_deref())] {
        if let Some(date) = value {
            require_iso_date(field, date)?;
        }
    }
    let conn = state.conn()?;
    let user = default_user(&conn)?;
    let filter = TaskFilter {
        status: query.status.as_deref().map(parse_status).transpose()?,
        completed: query.completed,
        from: query.from,
        to: query.to,
        tags: query.tags.map(|tags| {
            tags.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(ToString::to_string)
                .collect()
        }),
    };
    let tasks = TaskRepository::list(&conn, &user.id, &filter)?;
    Ok(Json(tasks))
}

fn parse_create_params(body: &serde_json::Value) -> Result<TaskCreateParams, ApiError> {
    let title_ok = body
        .get("title")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|t| !t.trim().is_empty());
    if !title_ok {
        return Err(ApiError::bad_request("title is required"));
    }
    let params: TaskCreateParams = serde_json::from_value(body.clone())
        .map_err(|e| ApiError::bad_request(format!("invalid task: {e}")))?;
    for (field, value) in [
        ("start_date", params.start_date.as_deref()),
        ("end_date", params.end_date.as_deref()),
    ] {
        if let Some(date) = value {
            require_iso_date(field, date)?;
        }
    }
    Ok(params)
}

/// POST /api/tasks
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Task>, ApiError> {
    let params = parse_create_params(&body)?;
    let conn = state.conn()?;
    let user = default_user(&conn)?;
    let task = TaskRepository::create(&conn, &user.id, &params)?;
    Ok(Json(task))
}

/// PATCH /api/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(updates): Json<TaskUpdateParams>,
) -> Result<Json<Task>, ApiError> {
    for (field, value) in [
        ("start_date", updates.start_date.as_deref()),
        ("end_date", updates.end_date.as_deref()),
    ] {
        if let Some(date) = value {
            require_iso_date(field, date)?;
        }
    }
    let conn = state.conn()?;
    let task = TaskRepository::update(&conn, &id, &updates)?
        .ok_or_else(|| ApiError::not_found(format!("task {id} not found")))?;
    Ok(Json(task))
}

/// DELETE /api/tasks/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.conn()?;
    if !TaskRepository::delete(&conn, &id)? {
        return Err(ApiError::not_found(format!("task {id} not found")));
    }
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// Body for `POST /api/tasks/bulk`.
#[derive(Debug, Deserialize)]
pub struct BulkBody {
    pub tasks: Vec<serde_json::Value>,
}

/// One row's outcome in a bulk insert.
#[derive(Debug, Serialize)]
pub struct BulkResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Bulk insert response.
#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub created: usize,
    pub failed: usize,
    pub results: Vec<BulkResult>,
}

/// POST /api/tasks/bulk — one row at a time, per-row results.
pub async fn bulk_create(
    State(state): State<AppState>,
    Json(body): Json<BulkBody>,
) -> Result<Json<BulkResponse>, ApiError> {
    let conn = state.conn()?;
    let user = default_user(&conn)?;

    let mut response = BulkResponse {
        created: 0,
        failed: 0,
        results: Vec::with_capacity(body.tasks.len()),
    };
    for record in &body.tasks {
        let outcome = parse_create_params(record)
            .and_then(|params| Ok(TaskRepository::create(&conn, &user.id, &params)?));
        match outcome {
            Ok(task) => {
                response.created += 1;
                response.results.push(BulkResult {
                    task: Some(task),
                    error: None,
                });
            }
            Err(err) => {
                response.failed += 1;
                let message = match err {
                    ApiError::BadRequest(m) | ApiError::NotFound(m) | ApiError::Unauthorized(m) => m,
                    ApiError::Internal(e) => e.to_string(),
                };
                response.results.push(BulkResult {
                    task: None,
                    error: Some(message),
                });
            }
        }
    }
    Ok(Json(response))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
