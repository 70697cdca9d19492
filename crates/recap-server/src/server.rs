//! Router assembly and the serve loop.

use axum::extract::State;
use axum::response::Json;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{admin, auth, generate, summaries, tags, tasks};
use crate::health::{self, HealthResponse};
use crate::state::AppState;

/// Server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route("/api/tasks/bulk", post(tasks::bulk_create))
        .route(
            "/api/tasks/{id}",
            axum::routing::patch(tasks::update).delete(tasks::remove),
        )
        .route("/api/client-tags", get(tags::list).post(tags::create))
        .route(
            "/api/client-tags/{id}",
            axum::routing::patch(tags::update).delete(tags::remove),
        )
        .route(
            "/api/daily-summary",
            get(summaries::get_by_date).post(summaries::upsert_manual),
        )
        .route("/api/daily-summary/history", get(summaries::history))
        .route("/api/daily-summary/{id}", delete(summaries::remove))
        .route("/api/generate-summary", post(generate::generate_summary))
        .route("/api/generate-tasks", post(generate::generate_tasks))
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/admin/settings",
            get(admin::settings_list).put(admin::settings_upsert),
        )
        .route("/api/admin/settings/{key}", delete(admin::settings_delete))
        .route("/api/admin/users", get(admin::users_list))
        .route("/api/admin/diagnostics", get(admin::diagnostics))
        .route("/api/admin/bootstrap", post(admin::run_bootstrap))
        .route("/api/admin/clear", post(admin::clear))
        .route(
            "/api/admin/backup",
            get(admin::backup_export).post(admin::backup_import),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time))
}

/// Handle returned by [`start`].
pub struct ServerHandle {
    /// Bound port (useful when configured with port 0).
    pub port: u16,
    server: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Wait for the serve loop to exit.
    pub async fn wait(self) {
        let _ = self.server.await;
    }
}

/// Bind and serve. The returned handle resolves when the listener shuts
/// down; pass a `shutdown` future (usually ctrl-c) to stop gracefully.
pub async fn start(
    config: &ServerConfig,
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<ServerHandle> {
    let router = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    info!(host = %config.host, port = local_addr.port(), "recap server listening");

    let server = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
        {
            tracing::error!(error = %err, "server exited with error");
        }
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        server,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
