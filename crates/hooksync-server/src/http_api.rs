//! HTTP API for webhook deliveries and probes.
//!
//! Provides:
//! - `POST <endpoint>` - Webhook receiver (default `/webhook`)
//! - `/_ready` - Readiness probe (repository root writable)
//! - `/_alive` - Liveness probe
//!
//! Status codes for the webhook endpoint:
//!
//! | Outcome | Status |
//! |---------|--------|
//! | Accepted | 200 |
//! | Wrong content type, malformed body | 400 |
//! | Unresolved repository, failed verification | 401 |
//! | Body over the configured limit | 413 |
//! | Sync hand-off failed | 500 |

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{debug, error, info, info_span, warn};

use hooksync_core::{Decision, Delivery, EventKind, Gatekeeper, HooksyncConfig, HooksyncError};
use hooksync_verify::{SHA1_HEADER, SHA256_HEADER};

/// Header naming the provider event.
pub const EVENT_HEADER: &str = "X-GitHub-Event";

/// Header carrying the provider delivery id.
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";

/// Shared state for HTTP handlers.
#[derive(Clone, Debug)]
pub struct HttpState {
    /// Resolve/verify/hand-off pipeline.
    pub gatekeeper: Gatekeeper,
    /// Directory repositories are synced into.
    pub repo_root: PathBuf,
}

/// Create the HTTP router.
pub fn create_router(state: HttpState, config: &HooksyncConfig) -> Router {
    Router::new()
        .route(&config.endpoint_path, post(webhook_handler))
        .route("/_ready", get(ready_handler))
        .route("/_alive", get(alive_handler))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(Arc::new(state))
}

/// Returns true for `application/json`, ignoring parameters and case.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Header value as text; values that are not visible ASCII count as absent.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Picks the strongest signature header present.
fn signature_header(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, SHA256_HEADER).or_else(|| header_str(headers, SHA1_HEADER))
}

/// Handler for the webhook endpoint.
async fn webhook_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_json(&headers) {
        let content_type = header_str(&headers, header::CONTENT_TYPE.as_str()).unwrap_or("");
        warn!(content_type = %content_type, "rejecting delivery with non-JSON content type");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": "bad_request",
                "reason": format!("content-type must be application/json but is: {}", content_type),
            })),
        )
            .into_response();
    }

    let event = EventKind::from_header(header_str(&headers, EVENT_HEADER));
    let delivery_id = header_str(&headers, DELIVERY_HEADER)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let span = info_span!("delivery", delivery = %delivery_id, event = %event);
    let delivery = Delivery {
        raw_body: &body,
        signature: signature_header(&headers),
        event: &event,
        delivery_id: &delivery_id,
    };

    span.in_scope(|| respond(&state.gatekeeper, &delivery))
}

/// Maps the gatekeeper outcome onto a response.
fn respond(gatekeeper: &Gatekeeper, delivery: &Delivery<'_>) -> Response {
    match gatekeeper.evaluate(delivery) {
        Ok(decision @ Decision::Accepted { .. }) => (
            StatusCode::OK,
            Json(json!({
                "status": "accepted",
                "repository": decision.repository(),
                "detail": decision.to_string(),
            })),
        )
            .into_response(),
        Ok(decision) => {
            debug!("{}", decision);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "status": "unauthorized" })),
            )
                .into_response()
        }
        Err(HooksyncError::Notification(reason)) => {
            warn!("rejecting malformed notification: {}", reason);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "bad_request", "reason": reason })),
            )
                .into_response()
        }
        Err(e) => {
            error!("delivery failed after acceptance: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error" })),
            )
                .into_response()
        }
    }
}

/// Handler for `/_ready` - Readiness probe.
///
/// Returns 200 OK if a file can be created in the repository root, 503
/// otherwise.
async fn ready_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let root = state.repo_root.clone();
    let probe = tokio::task::spawn_blocking(move || tempfile::tempfile_in(&root)).await;

    match probe {
        Ok(Ok(_)) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Ok(Err(e)) => {
            warn!("path {} not available or writable: {}", state.repo_root.display(), e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "reason": "repo_root_not_writable",
                })),
            )
        }
        Err(e) => {
            error!("readiness probe task failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "reason": "probe_failed",
                })),
            )
        }
    }
}

/// Handler for `/_alive` - Liveness probe.
async fn alive_handler() -> StatusCode {
    StatusCode::OK
}

/// Start the HTTP server.
///
/// # Arguments
/// * `config` - Listen port, endpoint path and body limit.
/// * `state` - Shared state for handlers.
///
/// Runs until `shutdown` resolves.
pub async fn serve<F>(config: &HooksyncConfig, state: HttpState, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let router = create_router(state, config);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.listen_port));

    info!(
        "Starting webhook receiver on port {} at {}",
        config.listen_port, config.endpoint_path
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
