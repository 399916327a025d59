// Scan endpoints: URL classification plus the history and stats it feeds

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;
use validator::Validate;

use crate::{
    app::AppState,
    models::scan::{HistoryQuery, ScanRequest},
    utils::api_error::ApiError,
};

// =============================================================================
// SCAN HANDLERS
// =============================================================================

/// Classify a URL and return its verdict
/// POST /api/v1/scan
pub async fn scan_url(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ApiError::from(e).into_response();
    }

    // Length cap comes from config, so it cannot live in the validator attribute
    let max_len = state.config.scan.max_url_length;
    if request.url.len() > max_len {
        return ApiError::ValidationError(format!(
            "URL exceeds maximum length of {} characters",
            max_len
        ))
        .into_response();
    }

    let verdict = state.analyzer.classify(&request.url).await;
    Json(verdict).into_response()
}

/// Aggregate counters across all recorded scans
/// GET /api/v1/stats
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    match state.recorder.stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Most recent scans, newest first
/// GET /api/v1/history?limit=50
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    match state.recorder.history(query.limit).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Drop all history entries, leaving stats intact
/// DELETE /api/v1/history
pub async fn clear_history(State(state): State<AppState>) -> impl IntoResponse {
    match state.recorder.clear_history().await {
        Ok(()) => {
            info!("Scan history cleared");
            StatusCode::NO_CONTENT.into_response()
        },
        Err(e) => ApiError::from(e).into_response(),
    }
}
