// Centralized configuration management for PhishGuard
// Load ALL env vars ONCE at startup; everything else reads from CONFIG

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Global application configuration loaded once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    // For tests, load .env file first
    #[cfg(test)]
    dotenv::dotenv().ok();

    AppConfig::from_env().expect("Failed to load configuration")
});

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Server
    pub bind_address: String,
    pub port: u16,
    pub environment: Environment,
    pub rust_log: String,
    pub rust_backtrace: bool,
    pub cors_allowed_origins: Vec<String>,

    // Scanner
    pub scan: ScanConfig,
    pub cache: CacheConfig,
    pub reputation: ReputationConfig,
}

/// Scan pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub max_url_length: usize,
    pub history_limit: usize,
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
}

/// Verdict cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub sweep_interval_seconds: u64,
}

/// Remote reputation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub poll_delay_seconds: u64,
    pub timeout_seconds: u64,
    pub privacy_mode: bool,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_seconds: u64,
}

impl ReputationConfig {
    /// Remote lookups run only when a credential is configured.
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Environment type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Helper function to get optional env var with default
        let get_or_default = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        // Helper function to parse env var with default
        let parse_or_default = |key: &str, default: &str| -> Result<u32, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u32".to_string())
            })
        };

        let parse_u64_or_default = |key: &str, default: &str| -> Result<u64, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u64".to_string())
            })
        };

        let parse_usize_or_default = |key: &str, default: &str| -> Result<usize, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid usize".to_string())
            })
        };

        let parse_bool_or_default = |key: &str, default: &str| -> bool {
            get_or_default(key, default).to_lowercase() == "true"
        };

        // Comma-separated domain list; entries are lowercased since all
        // domain comparisons happen on lowercased hostnames
        let parse_domain_list = |key: &str| -> Vec<String> {
            env::var(key)
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };

        // Parse bind address to extract port
        let bind_address = get_or_default("BIND_ADDRESS", "0.0.0.0:8080");
        let port = bind_address
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let environment_str = get_or_default("ENVIRONMENT", "development");
        let environment = Environment::from(environment_str);

        let rust_log = get_or_default("RUST_LOG", "info");
        let rust_backtrace = get_or_default("RUST_BACKTRACE", "0") != "0";

        let cors_allowed_origins: Vec<String> = get_or_default("CORS_ALLOWED_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let scan = ScanConfig {
            max_url_length: parse_usize_or_default("SCAN_MAX_URL_LENGTH", "2048")?,
            history_limit: parse_usize_or_default("SCAN_HISTORY_LIMIT", "100")?,
            whitelist: parse_domain_list("SCAN_WHITELIST"),
            blacklist: parse_domain_list("SCAN_BLACKLIST"),
        };

        let cache = CacheConfig {
            ttl_seconds: parse_u64_or_default("SCAN_CACHE_TTL_SECONDS", "86400")?,
            sweep_interval_seconds: parse_u64_or_default(
                "SCAN_CACHE_SWEEP_INTERVAL_SECONDS",
                "3600",
            )?,
        };

        if cache.ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "SCAN_CACHE_TTL_SECONDS".to_string(),
                "TTL must be greater than zero".to_string(),
            ));
        }

        // Empty credential means no remote lookups, same as unset
        let api_key = env::var("REPUTATION_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let reputation = ReputationConfig {
            api_key,
            api_url: get_or_default("REPUTATION_API_URL", "https://www.virustotal.com/api/v3"),
            poll_delay_seconds: parse_u64_or_default("REPUTATION_POLL_DELAY_SECONDS", "5")?,
            timeout_seconds: parse_u64_or_default("REPUTATION_TIMEOUT_SECONDS", "30")?,
            privacy_mode: parse_bool_or_default("REPUTATION_PRIVACY_MODE", "false"),
            rate_limit_max_requests: parse_or_default("REPUTATION_RATE_LIMIT_MAX_REQUESTS", "4")?,
            rate_limit_window_seconds: parse_u64_or_default(
                "REPUTATION_RATE_LIMIT_WINDOW_SECONDS",
                "60",
            )?,
        };

        Ok(Self {
            bind_address,
            port,
            environment,
            rust_log,
            rust_backtrace,
            cors_allowed_origins,
            scan,
            cache,
            reputation,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Check if running in test environment
    pub fn is_test(&self) -> bool {
        self.environment == Environment::Test
    }
}

/// Get the global configuration instance
/// This is the primary way to access configuration throughout the app
pub fn config() -> &'static AppConfig {
    &CONFIG
}
