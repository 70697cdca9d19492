//! AI generation routes.
//!
//! Both routes run the PRIMARY → FALLBACK chain and carry a deterministic
//! tail: summaries fall back to a fixed template, task extraction falls back
//! to parsing the caller's input text as a checklist.

use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use recap_core::{Task, TaskStatus};
use recap_llm::checklist::parse_checklist;
use recap_llm::generate::GenerationSource;
use recap_llm::prompt::build_task_extraction_prompt;
use recap_store::{
    SettingRepository, SummaryRepository, SummaryUpsertParams, TaskCreateParams, TaskRepository,
};

use crate::error::ApiError;
use crate::handlers::{default_user, require_iso_date};
use crate::state::AppState;

/// Body for `POST /api/generate-summary`.
#[derive(Debug, Deserialize)]
pub struct GenerateSummaryBody {
    pub date: String,
    /// Explicit selection; when absent, tasks completed on `date` are used.
    pub task_ids: Option<Vec<String>>,
    pub manual_summary: Option<String>,
}

/// POST /api/generate-summary
///
/// Generates the text, then upserts the summary row for (user, date) —
/// whichever stage produced the text, the side effect is the same.
pub async fn generate_summary(
    State(state): State<AppState>,
    Json(body): Json<GenerateSummaryBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.date.trim().is_empty() {
        return Err(ApiError::bad_request("date is required"));
    }
    require_iso_date("date", &body.date)?;

    // Read everything up front; the checkout must go back to the pool before
    // the provider round trip, which can block for two full provider
    // timeouts.
    let (user, tasks, use_emoji) = {
        let conn = state.conn()?;
        let user = default_user(&conn)?;
        let tasks = match body.task_ids {
            Some(ref ids) => TaskRepository::get_many(&conn, ids)?,
            None => TaskRepository::list_completed_on(&conn, &user.id, &body.date)?,
        };
        let use_emoji = SettingRepository::get(&conn, "summary.use_emoji")?
            .and_then(|s| s.value.parse().ok())
            .unwrap_or(true);
        (user, tasks, use_emoji)
    };

    let (text, source) = state
        .chain
        .generate_daily_summary(&body.date, &tasks, body.manual_summary.as_deref(), use_emoji)
        .await;

    let conn = state.conn()?;
    let summary = SummaryRepository::upsert(
        &conn,
        &user.id,
        &body.date,
        &SummaryUpsertParams {
            manual_summary: body.manual_summary,
            generated_summary: Some(text.clone()),
            generated_by: Some(source.as_str().to_string()),
            tasks_completed: tasks,
        },
    )?;

    Ok(Json(serde_json::json!({
        "summary": text,
        "generated_by": source,
        "tasks_completed": summary.tasks_completed,
        "date": summary.summary_date,
    })))
}

/// Body for `POST /api/generate-tasks`.
#[derive(Debug, Deserialize)]
pub struct GenerateTasksBody {
    pub text: String,
    pub start_date: Option<String>,
}

/// POST /api/generate-tasks
///
/// Asks the model for a markdown checklist and inserts the parsed items as
/// tasks. When both providers fail, the input text itself is parsed as a
/// checklist instead — no AI involved.
pub async fn generate_tasks(
    State(state): State<AppState>,
    Json(body): Json<GenerateTasksBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.text.trim().is_empty() {
        return Err(ApiError::bad_request("text is required"));
    }
    if let Some(date) = body.start_date.as_deref() {
        require_iso_date("start_date", date)?;
    }

    let prompt = build_task_extraction_prompt(&body.text);
    let (items, source) = match state.chain.complete(&prompt).await {
        Some((reply, source)) => (parse_checklist(&reply), source),
        None => (parse_checklist(&body.text), GenerationSource::Deterministic),
    };

    let conn = state.conn()?;
    let user = default_user(&conn)?;
    let mut tasks: Vec<Task> = Vec::with_capacity(items.len());
    for item in items {
        let params = TaskCreateParams {
            title: item.title,
            description: item.description,
            status: item.completed.then_some(TaskStatus::Completed),
            start_date: body.start_date.clone(),
            ..Default::default()
        };
        tasks.push(TaskRepository::create(&conn, &user.id, &params)?);
    }

    Ok(Json(serde_json::json!({
        "tasks": tasks,
        "generated_by": source,
    })))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
