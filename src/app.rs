// Application state and router assembly

use std::sync::Arc;
use std::time::Duration;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{
    app_config::AppConfig,
    handlers,
    services::{
        analyzer::UrlAnalyzer, lists::ListService, rate_limiter::SlidingWindowLimiter,
        recorder::ScanRecorder, reputation::ReputationClient, scan_cache::ScanCache,
    },
    storage::KeyValueStore,
};

// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub config: Arc<AppConfig>,
    pub analyzer: Arc<UrlAnalyzer>,
    pub recorder: Arc<ScanRecorder>,
    pub lists: Arc<ListService>,
    pub cache: Arc<ScanCache>,
}

impl AppState {
    /// Wire every service onto the given storage backend.
    pub fn new(config: AppConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let config = Arc::new(config);

        let lists = Arc::new(ListService::new(
            store.clone(),
            config.scan.whitelist.clone(),
            config.scan.blacklist.clone(),
        ));
        let cache = Arc::new(ScanCache::new(
            store.clone(),
            Duration::from_secs(config.cache.ttl_seconds),
        ));
        let recorder = Arc::new(ScanRecorder::new(store.clone(), config.scan.history_limit));

        let reputation = ReputationClient::from_config(&config.reputation);
        let rate_limiter = SlidingWindowLimiter::new(
            config.reputation.rate_limit_max_requests as usize,
            Duration::from_secs(config.reputation.rate_limit_window_seconds),
        );
        let analyzer = Arc::new(UrlAnalyzer::new(
            lists.clone(),
            cache.clone(),
            recorder.clone(),
            reputation,
            rate_limiter,
        ));

        Self {
            store,
            config,
            analyzer,
            recorder,
            lists,
            cache,
        }
    }
}

// =============================================================================
// ROUTER ASSEMBLY
// =============================================================================

/// Full application router with tracing and CORS layers applied.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    let api = Router::new()
        .merge(handlers::scan_routes())
        .merge(handlers::list_routes());

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring unparseable CORS origin: {}", origin);
                None
            },
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
