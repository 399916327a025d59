// HTTP surface of the scanner: scan/verdict endpoints, list management,
// and the component health report

pub mod lists;
pub mod scan;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;

use crate::app::AppState;
use crate::storage::{KeyValueStore, StorageError};

// Scan, stats and history routes
pub fn scan_routes() -> Router<AppState> {
    Router::new()
        .route("/scan", post(scan::scan_url))
        .route("/stats", get(scan::get_stats))
        .route("/history", get(scan::get_history).delete(scan::clear_history))
}

// Whitelist and blacklist management routes
pub fn list_routes() -> Router<AppState> {
    Router::new()
        .route("/lists", get(lists::get_lists))
        .route("/lists/whitelist", post(lists::add_to_whitelist))
        .route(
            "/lists/whitelist/{domain}",
            delete(lists::remove_from_whitelist),
        )
        .route("/lists/blacklist", post(lists::add_to_blacklist))
        .route(
            "/lists/blacklist/{domain}",
            delete(lists::remove_from_blacklist),
        )
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

/// Component health report
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let mut overall_healthy = true;
    let timestamp = chrono::Utc::now().to_rfc3339();

    // Storage health check with a write/read/remove round trip
    let storage_health = match storage_round_trip(state.store.as_ref()).await {
        Ok(latency_ms) => {
            json!({
                "status": "healthy",
                "latency_ms": latency_ms,
                "error": null
            })
        },
        Err(e) => {
            overall_healthy = false;
            json!({
                "status": "unhealthy",
                "error": format!("Storage probe failed: {}", e)
            })
        },
    };

    // The remote reputation client is optional; a missing key is not a fault
    let reputation_health = json!({
        "status": if state.config.reputation.is_enabled() { "configured" } else { "disabled" },
        "privacy_mode": state.config.reputation.privacy_mode
    });

    let response = json!({
        "status": if overall_healthy { "healthy" } else { "degraded" },
        "service": "phishguard",
        "timestamp": timestamp,
        "components": {
            "storage": storage_health,
            "reputation": reputation_health
        }
    });

    if overall_healthy {
        (StatusCode::OK, Json(response)).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response()
    }
}

async fn storage_round_trip(store: &dyn KeyValueStore) -> Result<u128, StorageError> {
    let started = std::time::Instant::now();
    let probe = chrono::Utc::now().timestamp_millis().to_string();

    store.set("health:probe", &probe).await?;
    match store.get("health:probe").await? {
        Some(value) if value == probe => {},
        _ => return Err(StorageError::backend("Probe value did not round-trip")),
    }
    store.remove("health:probe").await?;

    Ok(started.elapsed().as_millis())
}
