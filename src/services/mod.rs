// Services module for PhishGuard
// Business logic layer for the application

pub mod analyzer;
pub mod lists;
pub mod rate_limiter;
pub mod recorder;
pub mod reputation;
pub mod scan_cache;

// Re-export commonly used services
pub use analyzer::UrlAnalyzer;
pub use lists::{ListService, ListSet};
pub use rate_limiter::SlidingWindowLimiter;
pub use recorder::ScanRecorder;
pub use reputation::{
    EngineStats, ReputationClient, ReputationError, ReputationReport, ReputationStatus,
};
pub use scan_cache::{spawn_cache_sweeper, CacheEntry, ScanCache};
