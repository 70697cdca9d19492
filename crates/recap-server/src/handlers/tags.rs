//! Client tag routes.
//!
//! Deleting a tag never touches the task rows that reference its name; the
//! names simply dangle. That matches the storage model, where tags are a
//! lookup table and tasks embed names.

use axum::extract::{Path, State};
use axum::response::Json;

use recap_core::ClientTag;
use recap_store::{TagCreateParams, TagRepository, TagUpdateParams};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/client-tags
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ClientTag>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(TagRepository::list(&conn)?))
}

/// POST /api/client-tags — duplicate names are a 400.
pub async fn create(
    State(state): State<AppState>,
    Json(params): Json<TagCreateParams>,
) -> Result<Json<ClientTag>, ApiError> {
    if params.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let conn = state.conn()?;
    if TagRepository::get_by_name(&conn, &params.name)?.is_some() {
        return Err(ApiError::bad_request(format!(
            "client tag '{}' already exists",
            params.name
        )));
    }
    Ok(Json(TagRepository::create(&conn, &params)?))
}

/// PATCH /api/client-tags/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(updates): Json<TagUpdateParams>,
) -> Result<Json<ClientTag>, ApiError> {
    let conn = state.conn()?;
    if let Some(ref name) = updates.name {
        // Renaming onto another tag's name would trip the UNIQUE constraint
        if let Some(existing) = TagRepository::get_by_name(&conn, name)? {
            if existing.id != id {
                return Err(ApiError::bad_request(format!(
                    "client tag '{name}' already exists"
                )));
            }
        }
    }
    let tag = TagRepository::update(&conn, &id, &updates)?
        .ok_or_else(|| ApiError::not_found(format!("client tag {id} not found")))?;
    Ok(Json(tag))
}

/// DELETE /api/client-tags/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.conn()?;
    if !TagRepository::delete(&conn, &id)? {
        return Err(ApiError::not_found(format!("client tag {id} not found")));
    }
    Ok(Json(serde_json::json!({ "deleted": id })))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
