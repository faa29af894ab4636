// GET handlers: metrics, health, version

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::AppState;
use crate::version::{NAME, VERSION};

#[derive(Deserialize)]
pub(super) struct MetricsQuery {
    compact: Option<String>,
}

/// GET /metrics — runs one fresh collection pass and serializes the
/// snapshot. `?compact=1` (or `true`) minifies; the default is indented.
/// Responses are never cacheable: every one is freshly computed.
pub(super) async fn metrics_handler(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> impl IntoResponse {
    let snapshot = state.collector.collect().await;
    let compact = matches!(query.compact.as_deref(), Some("1") | Some("true"));
    let body = if compact {
        serde_json::to_string(&snapshot)
    } else {
        serde_json::to_string_pretty(&snapshot)
    };
    match body {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CACHE_CONTROL, "no-cache, no-store"),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "snapshot serialization failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET /health — liveness only; never consults the collectors.
pub(super) async fn health_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "OK")
}

/// GET /version — service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}
