use crate::errors::AppError;
use crate::models::{SearchQuery, SearchResponse};
use crate::services::LookupService;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Header naming the agent who issued the search.
pub const CALLER_HEADER: &str = "x-agent-id";

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<LookupService>,
}

/// GET /
///
/// Service status and number of customer rows loaded.
pub async fn status(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "rows_loaded": state.lookup.rows_loaded(),
        })),
    )
}

/// POST /buscar
///
/// Searches the customer table and the web for the given criteria.
pub async fn buscar(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(query): Json<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let caller = headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("anonymous");

    tracing::info!("POST /buscar - caller: {}", caller);

    let response = state.lookup.search(&query, caller).await?;
    Ok(Json(response))
}

/// Routes without middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/buscar", post(buscar))
        .with_state(state)
}

/// Routes wrapped in request tracing, a body size limit and a request timeout.
///
/// `TimeoutLayer` needs a `Default` response body, so it stays inside the body limit.
pub fn app(state: Arc<AppState>, request_timeout: Duration) -> Router {
    router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(TimeoutLayer::new(request_timeout)),
    )
}
