//! HTTP route handlers.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::app::TiktideError;
use crate::domain::ExploreBatch;

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/tiktok/explore", get(explore))
        .route("/tiktok/search", get(search))
        .with_state(state)
}

/// Error body `{"error": "..."}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<TiktideError> for ApiError {
    fn from(e: TiktideError) -> Self {
        if e.is_validation() {
            Self::bad_request(e.to_string())
        } else {
            error!("Request failed: {}", e);
            Self::internal(e.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Parse `number`: absent means `default`, anything but a positive integer is rejected.
fn parse_number(raw: Option<&str>, default: usize) -> Result<usize, ApiError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ApiError::bad_request("number must be a positive integer")),
    }
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "tiktide",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn query_error(rejection: QueryRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

#[derive(Debug, Deserialize)]
pub struct ExploreParams {
    pub number: Option<String>,
}

async fn explore(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ExploreParams>, QueryRejection>,
) -> Result<Json<ExploreBatch>, ApiError> {
    let Query(params) = params.map_err(query_error)?;
    let number = parse_number(params.number.as_deref(), state.default_number)?;
    let headless = state.harvester.config().headless;
    let batch = state.harvester.collect_explore_items(number, headless).await?;
    Ok(Json(batch))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub keywords: Option<String>,
    pub number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub keywords: String,
    pub count: usize,
    pub videos: Vec<String>,
}

async fn search(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params.map_err(query_error)?;
    let keywords = params.keywords.as_deref().unwrap_or_default().trim();
    if keywords.is_empty() {
        return Err(ApiError::bad_request("keywords parameter is required"));
    }
    let number = parse_number(params.number.as_deref(), state.default_number)?;

    let mut videos = state.harvester.search_videos_by_keywords(keywords).await?;
    videos.truncate(number);

    Ok(Json(SearchResponse {
        keywords: keywords.to_string(),
        count: videos.len(),
        videos,
    }))
}
