//! Daily summary routes (manual path — no AI call).

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Deserialize;

use recap_core::DailySummary;
use recap_store::{SettingRepository, SummaryRepository, SummaryUpsertParams, TaskRepository};

use crate::error::ApiError;
use crate::handlers::{default_user, require_iso_date};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: u32 = 30;

/// Query params for `GET /api/daily-summary`.
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// GET /api/daily-summary?date=
pub async fn get_by_date(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DailySummary>, ApiError> {
    let date = query
        .date
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::bad_request("date is required"))?;
    require_iso_date("date", &date)?;
    let conn = state.conn()?;
    let user = default_user(&conn)?;
    let summary = SummaryRepository::get_by_date(&conn, &user.id, &date)?
        .ok_or_else(|| ApiError::not_found(format!("no summary for {date}")))?;
    Ok(Json(summary))
}

/// Body for `POST /api/daily-summary`.
#[derive(Debug, Deserialize)]
pub struct ManualUpsertBody {
    pub date: String,
    pub manual_summary: Option<String>,
    pub generated_summary: Option<String>,
    /// Optional snapshot selection; missing ids are silently dropped.
    pub task_ids: Option<Vec<String>>,
}

/// POST /api/daily-summary — manual upsert, keyed by (user, date).
pub async fn upsert_manual(
    State(state): State<AppState>,
    Json(body): Json<ManualUpsertBody>,
) -> Result<Json<DailySummary>, ApiError> {
    if body.date.trim().is_empty() {
        return Err(ApiError::bad_request("date is required"));
    }
    require_iso_date("date", &body.date)?;
    let conn = state.conn()?;
    let user = default_user(&conn)?;
    let tasks = match body.task_ids {
        Some(ref ids) => TaskRepository::get_many(&conn, ids)?,
        None => Vec::new(),
    };
    let summary = SummaryRepository::upsert(
        &conn,
        &user.id,
        &body.date,
        &SummaryUpsertParams {
            manual_summary: body.manual_summary,
            generated_summary: body.generated_summary,
            generated_by: None,
            tasks_completed: tasks,
        },
    )?;
    Ok(Json(summary))
}

/// Query params for `GET /api/daily-summary/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

/// GET /api/daily-summary/history?limit= — newest first. The default page
/// size comes from the `summary.history_limit` setting.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<DailySummary>>, ApiError> {
    let conn = state.conn()?;
    let user = default_user(&conn)?;
    let limit = match query.limit {
        Some(limit) if limit > 0 => limit,
        _ => SettingRepository::get(&conn, "summary.history_limit")?
            .and_then(|s| s.value.parse().ok())
            .unwrap_or(DEFAULT_HISTORY_LIMIT),
    };
    Ok(Json(SummaryRepository::history(&conn, &user.id, limit)?))
}

/// DELETE /api/daily-summary/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.conn()?;
    if !SummaryRepository::delete(&conn, &id)? {
        return Err(ApiError::not_found(format!("summary {id} not found")));
    }
    Ok(Json(serde_json::json!({ "deleted": id })))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
