use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::warn;

use instadown_archive::{Archive, ArchiveError, CrawlOutcome};

pub struct AppState {
    pub archive: Archive,
}

#[derive(Deserialize)]
pub struct CollectRequest {
    url: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        .route("/api/post", post(api_collect_post).fallback(method_not_allowed))
        .route("/api/album", post(api_collect_album).fallback(method_not_allowed))
        .with_state(state)
}

pub async fn api_collect_post(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CollectRequest>, JsonRejection>,
) -> Response {
    let url = match required_url(body) {
        Ok(url) => url,
        Err(resp) => return resp,
    };
    match state.archive.collect_post(&url).await {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => error_response(e),
    }
}

pub async fn api_collect_album(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CollectRequest>, JsonRejection>,
) -> Response {
    let url = match required_url(body) {
        Ok(url) => url,
        Err(resp) => return resp,
    };
    match state.archive.collect_profile(&url).await {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => error_response(e),
    }
}

async fn method_not_allowed() -> Response {
    error_body(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

fn required_url(body: Result<Json<CollectRequest>, JsonRejection>) -> Result<String, Response> {
    let Json(body) = body.map_err(|_| error_body(StatusCode::BAD_REQUEST, "invalid request body"))?;
    body.url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| error_body(StatusCode::BAD_REQUEST, "url is required"))
}

fn outcome_response(outcome: CrawlOutcome) -> Response {
    match outcome {
        CrawlOutcome::Cached(record) | CrawlOutcome::Crawled(record) => {
            (StatusCode::OK, Json(record.view())).into_response()
        }
        CrawlOutcome::NoDisplayableMedia { owner } => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "owner": owner,
                "count": 0,
                "data": [],
                "message": "no image found",
            })),
        )
            .into_response(),
    }
}

fn error_response(err: ArchiveError) -> Response {
    let status = match &err {
        ArchiveError::InvalidReference(_) => StatusCode::BAD_REQUEST,
        ArchiveError::MalformedUpstreamNode(_) | ArchiveError::UpstreamUnavailable(_) => {
            StatusCode::BAD_GATEWAY
        }
        ArchiveError::Database(_) | ArchiveError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!(error = %err, status = status.as_u16(), "Collect request failed");
    }
    error_body(status, &err.to_string())
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
