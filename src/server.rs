//! Repository extraction HTTP endpoint
//!
//! `POST /api/github` with `{"url": "..."}` returns the snapshot as
//! `{metadata, readme, files}` or `{error}` with 400 for a missing or
//! malformed URL, the upstream status when the repository lookup fails, and
//! 500 for anything else.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::source::SnapshotFetcher;
use crate::types::{Result, SkillError, SnapshotResponse};

pub const EXTRACT_ROUTE: &str = "/api/github";

#[derive(Clone)]
pub struct ServerState {
    fetcher: Arc<SnapshotFetcher>,
    shutdown: CancellationToken,
}

impl ServerState {
    pub fn new(fetcher: Arc<SnapshotFetcher>, shutdown: CancellationToken) -> Self {
        Self { fetcher, shutdown }
    }
}

#[derive(Debug, Deserialize)]
struct ExtractRequest {
    #[serde(default)]
    url: Option<String>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(EXTRACT_ROUTE, post(extract_handler))
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` is cancelled. In-flight snapshot
/// builds observe the same token.
pub async fn serve(addr: SocketAddr, state: ServerState) -> Result<()> {
    let shutdown = state.shutdown.clone();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Serving {} on http://{}", EXTRACT_ROUTE, listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

async fn extract_handler(State(state): State<ServerState>, body: Bytes) -> Response {
    let request: ExtractRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON request: {}", e),
            );
        }
    };

    let Some(url) = request.url.filter(|u| !u.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "URL is required".to_string());
    };

    let cancel = state.shutdown.child_token();
    match state.fetcher.extract(&url, &cancel).await {
        Ok(snapshot) => (StatusCode::OK, Json(SnapshotResponse::from(&snapshot))).into_response(),
        Err(e) => {
            warn!("Extraction of {} failed: {}", url, e);
            error_response(status_for(&e), e.to_string())
        }
    }
}

fn status_for(err: &SkillError) -> StatusCode {
    StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::BAD_GATEWAY)
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
