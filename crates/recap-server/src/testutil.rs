//! Shared helpers for router-level tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use recap_llm::FallbackChain;
use recap_settings::discovery::probe_candidates;
use recap_store::{bootstrap, new_in_memory, ConnectionConfig};

use crate::server::build_router;
use crate::state::{AppState, ProviderPresence};

/// In-memory, bootstrapped state with the given provider chain.
pub(crate) fn test_state(chain: FallbackChain) -> AppState {
    let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
    {
        let conn = pool.get().unwrap();
        let _ = bootstrap(&conn).unwrap();
    }
    let discovery = probe_candidates(&[], ":memory:");
    AppState::new(pool, chain, discovery, ProviderPresence::default())
}

/// Router over an empty chain (every generation falls to the deterministic
/// tail).
pub(crate) fn test_app() -> Router {
    test_app_with_chain(FallbackChain::default())
}

/// Router over a scripted chain.
pub(crate) fn test_app_with_chain(chain: FallbackChain) -> Router {
    build_router(test_state(chain))
}

/// Issue one request and decode the JSON response body.
pub(crate) async fn request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1_000_000)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
