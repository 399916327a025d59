// Common test utilities and helper structs
// Shared across all test files to avoid duplication

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use phishguard::{
    app::{build_router, AppState},
    app_config::{AppConfig, CacheConfig, Environment, ReputationConfig, ScanConfig},
    storage::{KeyValueStore, MemoryStore},
};
use serde::Serialize;
use std::sync::Arc;
use tower::util::ServiceExt;

/// Baseline configuration for tests: no remote reputation, permissive limits.
pub fn test_config() -> AppConfig {
    AppConfig {
        bind_address: "127.0.0.1:0".to_string(),
        port: 0,
        environment: Environment::Development,
        rust_log: "debug".to_string(),
        rust_backtrace: false,
        cors_allowed_origins: vec!["*".to_string()],
        scan: ScanConfig {
            max_url_length: 2048,
            history_limit: 100,
            whitelist: Vec::new(),
            blacklist: Vec::new(),
        },
        cache: CacheConfig {
            ttl_seconds: 86_400,
            sweep_interval_seconds: 3_600,
        },
        reputation: ReputationConfig {
            api_key: None,
            api_url: "http://127.0.0.1:9".to_string(),
            poll_delay_seconds: 0,
            timeout_seconds: 5,
            privacy_mode: false,
            rate_limit_max_requests: 4,
            rate_limit_window_seconds: 60,
        },
    }
}

/// Configuration with the reputation client pointed at a mock server.
pub fn test_config_with_reputation(api_url: &str) -> AppConfig {
    let mut config = test_config();
    config.reputation.api_key = Some("test-api-key".to_string());
    config.reputation.api_url = api_url.to_string();
    config
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store);
        let app = build_router(state.clone());
        TestApp { app, state }
    }

    /// Send a POST request
    pub fn post(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "POST", uri)
    }

    /// Send a GET request
    pub fn get(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "GET", uri)
    }

    /// Send a DELETE request
    pub fn delete(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "DELETE", uri)
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test request builder
pub struct TestRequest<'a> {
    app: &'a TestApp,
    request: Request<Body>,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: &str, uri: &str) -> Self {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        Self { app, request }
    }

    /// Add JSON body to request
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        let body_bytes = serde_json::to_vec(body).unwrap();
        self.request = Request::builder()
            .method(self.request.method().clone())
            .uri(self.request.uri().clone())
            .header("content-type", "application/json")
            .body(Body::from(body_bytes))
            .unwrap();
        self
    }

    /// Send the request
    pub async fn send(self) -> TestResponse {
        let response = self.app.app.clone().oneshot(self.request).await.unwrap();

        TestResponse { response }
    }
}

/// Test response wrapper
pub struct TestResponse {
    response: Response<Body>,
}

impl TestResponse {
    /// Get status code
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// Parse JSON response
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> T {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// Get response body as text
    pub async fn text(self) -> String {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }
}
