//! Admin routes: settings, users, diagnostics, bootstrap, clear, backup.

use axum::extract::{Path, State};
use axum::response::Json;
use serde::Deserialize;

use recap_core::{SystemSetting, User};
use recap_store::schema::BootstrapReport;
use recap_store::{
    bootstrap, export_backup, import_backup, BackupDocument, ImportReport, SettingRepository,
    SummaryRepository, TaskRepository, UserRepository,
};

use crate::error::ApiError;
use crate::handlers::default_user;
use crate::state::AppState;

/// GET /api/admin/settings
pub async fn settings_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<SystemSetting>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(SettingRepository::list(&conn)?))
}

/// Body for `PUT /api/admin/settings`.
#[derive(Debug, Deserialize)]
pub struct SettingUpsertBody {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

/// PUT /api/admin/settings
pub async fn settings_upsert(
    State(state): State<AppState>,
    Json(body): Json<SettingUpsertBody>,
) -> Result<Json<SystemSetting>, ApiError> {
    if body.key.trim().is_empty() {
        return Err(ApiError::bad_request("key is required"));
    }
    let conn = state.conn()?;
    let setting =
        SettingRepository::upsert(&conn, &body.key, &body.value, body.description.as_deref())?;
    Ok(Json(setting))
}

/// DELETE /api/admin/settings/{key}
pub async fn settings_delete(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.conn()?;
    if !SettingRepository::delete(&conn, &key)? {
        return Err(ApiError::not_found(format!("setting {key} not found")));
    }
    Ok(Json(serde_json::json!({ "deleted": key })))
}

/// GET /api/admin/users
pub async fn users_list(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(UserRepository::list(&conn)?))
}

/// GET /api/admin/diagnostics
///
/// Database reachability, row counts, the env-var discovery report (which
/// variable matched; values are never included), and provider key presence.
pub async fn diagnostics(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.conn()?;
    let mut counts = serde_json::Map::new();
    for table in [
        "users",
        "tasks",
        "client_tags",
        "daily_summaries",
        "system_settings",
    ] {
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .map_err(recap_store::StoreError::from)?;
        let _ = counts.insert(table.to_string(), count.into());
    }

    Ok(Json(serde_json::json!({
        "database": {
            "reachable": true,
            "counts": counts,
        },
        "discovery": state.discovery.as_ref(),
        "providers": state.providers,
    })))
}

/// POST /api/admin/bootstrap — idempotent.
pub async fn run_bootstrap(
    State(state): State<AppState>,
) -> Result<Json<BootstrapReport>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(bootstrap(&conn)?))
}

/// Body for `POST /api/admin/clear`.
#[derive(Debug, Deserialize)]
pub struct ClearBody {
    pub scope: String,
}

/// POST /api/admin/clear — bulk delete by the default user's id.
pub async fn clear(
    State(state): State<AppState>,
    Json(body): Json<ClearBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.conn()?;
    let user = default_user(&conn)?;
    let (tasks, summaries) = match body.scope.as_str() {
        "tasks" => (TaskRepository::clear(&conn, &user.id)?, 0),
        "summaries" => (0, SummaryRepository::clear(&conn, &user.id)?),
        "all" => (
            TaskRepository::clear(&conn, &user.id)?,
            SummaryRepository::clear(&conn, &user.id)?,
        ),
        other => {
            return Err(ApiError::bad_request(format!(
                "unknown scope '{other}' (expected tasks, summaries, or all)"
            )))
        }
    };
    Ok(Json(serde_json::json!({
        "tasks_deleted": tasks,
        "summaries_deleted": summaries,
    })))
}

/// GET /api/admin/backup — export.
pub async fn backup_export(
    State(state): State<AppState>,
) -> Result<Json<BackupDocument>, ApiError> {
    let conn = state.conn()?;
    let user = default_user(&conn)?;
    Ok(Json(export_backup(&conn, &user.id)?))
}

/// POST /api/admin/backup — import. Only the envelope is validated up front;
/// individual bad records are counted, not fatal.
pub async fn backup_import(
    State(state): State<AppState>,
    Json(document): Json<serde_json::Value>,
) -> Result<Json<ImportReport>, ApiError> {
    if document.get("version").is_none() {
        return Err(ApiError::bad_request("backup is missing 'version'"));
    }
    let data = document
        .get("data")
        .ok_or_else(|| ApiError::bad_request("backup is missing 'data'"))?;
    let conn = state.conn()?;
    let user = default_user(&conn)?;
    Ok(Json(import_backup(&conn, &user.id, data)?))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use crate::testutil::{request, test_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn settings_upsert_and_delete() {
        let app = test_app();
        let (status, setting) = request(
            app.clone(),
            "PUT",
            "/api/admin/settings",
            Some(serde_json::json!({"key": "summary.use_emoji", "value": "false"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(setting["value"], "false");

        let (status, _) = request(
            app.clone(),
            "DELETE",
            "/api/admin/settings/summary.use_emoji",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = request(app, "DELETE", "/api/admin/settings/summary.use_emoji", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn seeded_settings_are_listed() {
        let app = test_app();
        let (status, settings) = request(app, "GET", "/api/admin/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        let keys: Vec<&str> = settings
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|s| s["key"].as_str())
            .collect();
        assert!(keys.contains(&"summary.use_emoji"));
        assert!(keys.contains(&"summary.history_limit"));
    }

    #[tokio::test]
    async fn diagnostics_reports_counts_and_probes() {
        let app = test_app();
        let _ = request(
            app.clone(),
            "POST",
            "/api/tasks",
            Some(serde_json::json!({"title": "One"})),
        )
        .await;
        let (status, diag) = request(app, "GET", "/api/admin/diagnostics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(diag["database"]["reachable"], true);
        assert_eq!(diag["database"]["counts"]["tasks"], 1);
        assert!(diag["discovery"]["probes"].is_array());
        assert_eq!(diag["providers"]["openai"], false);
    }

    #[tokio::test]
    async fn bootstrap_is_idempotent_over_http() {
        let app = test_app();
        let (status, report) = request(app.clone(), "POST", "/api/admin/bootstrap", None).await;
        assert_eq!(status, StatusCode::OK);
        // Test state is already bootstrapped, so nothing new is seeded
        assert_eq!(report["settings_seeded"], 0);
        assert!(report["default_user_id"].as_str().unwrap().starts_with("user-"));
    }

    #[tokio::test]
    async fn clear_scopes() {
        let app = test_app();
        let _ = request(
            app.clone(),
            "POST",
            "/api/tasks",
            Some(serde_json::json!({"title": "Gone soon"})),
        )
        .await;
        let _ = request(
            app.clone(),
            "POST",
            "/api/daily-summary",
            Some(serde_json::json!({"date": "2024-03-01"})),
        )
        .await;

        let (status, counts) = request(
            app.clone(),
            "POST",
            "/api/admin/clear",
            Some(serde_json::json!({"scope": "all"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(counts["tasks_deleted"], 1);
        assert_eq!(counts["summaries_deleted"], 1);

        let (status, _) = request(
            app,
            "POST",
            "/api/admin/clear",
            Some(serde_json::json!({"scope": "everything"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn backup_round_trip_over_http() {
        let app = test_app();
        let _ = request(
            app.clone(),
            "POST",
            "/api/tasks",
            Some(serde_json::json!({"title": "Exported"})),
        )
        .await;

        let (status, document) = request(app.clone(), "GET", "/api/admin/backup", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(document["version"], "1");
        assert_eq!(document["data"]["tasks"].as_array().unwrap().len(), 1);

        let (status, report) = request(app, "POST", "/api/admin/backup", Some(document)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["tasks"]["imported"], 1);
        assert_eq!(report["tasks"]["failed"], 0);
    }

    #[tokio::test]
    async fn import_without_version_or_data_is_400() {
        let app = test_app();
        let (status, error) = request(
            app.clone(),
            "POST",
            "/api/admin/backup",
            Some(serde_json::json!({"data": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error["error"].as_str().unwrap().contains("version"));

        let (status, error) = request(
            app,
            "POST",
            "/api/admin/backup",
            Some(serde_json::json!({"version": "1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error["error"].as_str().unwrap().contains("data"));
    }

    #[tokio::test]
    async fn import_counts_malformed_records() {
        let app = test_app();
        let (_, task) = request(
            app.clone(),
            "POST",
            "/api/tasks",
            Some(serde_json::json!({"title": "Good"})),
        )
        .await;
        let (status, report) = request(
            app,
            "POST",
            "/api/admin/backup",
            Some(serde_json::json!({
                "version": "1",
                "data": {"tasks": [{"not": "a task"}, task]},
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["tasks"]["imported"], 1);
        assert_eq!(report["tasks"]["failed"], 1);
    }

    #[tokio::test]
    async fn users_list_contains_the_default_user() {
        let app = test_app();
        let (status, users) = request(app, "GET", "/api/admin/users", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(users[0]["email"], "owner@recap.local");
    }
}
