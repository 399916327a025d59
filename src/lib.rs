// Library exports for PhishGuard
// This file exposes modules and functions for library consumers

pub mod app;
pub mod app_config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use app::{build_router, AppState};
pub use app_config::{config, AppConfig, Environment, CONFIG};
pub use models::{HistoryEntry, ScanRequest, ScanStats, ScanStatus, Verdict};
pub use services::{
    spawn_cache_sweeper, ListService, ReputationClient, ScanCache, ScanRecorder,
    SlidingWindowLimiter, UrlAnalyzer,
};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use utils::{extract_features, ApiError, UrlFeatures};

// Re-export handler route builders
pub use handlers::{health_check, list_routes, scan_routes};
