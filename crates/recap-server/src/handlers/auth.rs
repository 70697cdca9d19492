//! Login route.
//!
//! Credentials are a compiled-in list compared in process. There are no
//! sessions and no tokens; a successful login just returns the user profile,
//! and the admin routes themselves stay unauthenticated.

use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use recap_core::{User, DEFAULT_USER_EMAIL, DEFAULT_USER_NAME, DEFAULT_USER_ROLE};
use recap_store::UserRepository;

use crate::error::ApiError;
use crate::state::AppState;

/// The compiled-in credential list.
const CREDENTIALS: &[(&str, &str)] = &[(DEFAULT_USER_EMAIL, "recap-admin")];

/// Body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<User>, ApiError> {
    let matched = CREDENTIALS
        .iter()
        .any(|(email, password)| *email == body.email && *password == body.password);
    if !matched {
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }
    let conn = state.conn()?;
    let user = UserRepository::get_or_create(
        &conn,
        &body.email,
        DEFAULT_USER_NAME,
        DEFAULT_USER_ROLE,
    )?;
    Ok(Json(user))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
