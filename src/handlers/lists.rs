// Whitelist and blacklist management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;
use validator::Validate;

use crate::{
    app::AppState,
    models::scan::{DomainRequest, ListsResponse},
    utils::api_error::ApiError,
};

// =============================================================================
// LIST HANDLERS
// =============================================================================

/// Current whitelist and blacklist contents
/// GET /api/v1/lists
pub async fn get_lists(State(state): State<AppState>) -> impl IntoResponse {
    match state.lists.lists().await {
        Ok(lists) => Json(ListsResponse::from(lists)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Add a domain to the whitelist
/// POST /api/v1/lists/whitelist
pub async fn add_to_whitelist(
    State(state): State<AppState>,
    Json(request): Json<DomainRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ApiError::from(e).into_response();
    }

    match state.lists.add_to_whitelist(&request.domain).await {
        Ok(lists) => {
            info!("Added {} to whitelist", request.domain);
            (StatusCode::CREATED, Json(ListsResponse::from(lists))).into_response()
        },
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Remove a domain from the whitelist
/// DELETE /api/v1/lists/whitelist/{domain}
pub async fn remove_from_whitelist(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> impl IntoResponse {
    match state.lists.remove_from_whitelist(&domain).await {
        Ok(lists) => {
            info!("Removed {} from whitelist", domain);
            Json(ListsResponse::from(lists)).into_response()
        },
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Add a domain to the blacklist
/// POST /api/v1/lists/blacklist
pub async fn add_to_blacklist(
    State(state): State<AppState>,
    Json(request): Json<DomainRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ApiError::from(e).into_response();
    }

    match state.lists.add_to_blacklist(&request.domain).await {
        Ok(lists) => {
            info!("Added {} to blacklist", request.domain);
            (StatusCode::CREATED, Json(ListsResponse::from(lists))).into_response()
        },
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Remove a domain from the blacklist
/// DELETE /api/v1/lists/blacklist/{domain}
pub async fn remove_from_blacklist(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> impl IntoResponse {
    match state.lists.remove_from_blacklist(&domain).await {
        Ok(lists) => {
            info!("Removed {} from blacklist", domain);
            Json(ListsResponse::from(lists)).into_response()
        },
        Err(e) => ApiError::from(e).into_response(),
    }
}
