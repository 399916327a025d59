use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishguard::{
    app::build_router,
    app_config,
    services::spawn_cache_sweeper,
    storage::{KeyValueStore, MemoryStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phishguard=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = app_config::config().clone();
    let bind_address = config.bind_address.clone();

    println!("=== STARTING PHISHGUARD API ===");
    info!("Starting PhishGuard API on {}", bind_address);
    info!("Environment: {}", config.environment);

    if config.reputation.is_enabled() {
        println!("✓ Remote reputation lookups enabled");
        info!(
            "Remote reputation lookups enabled (privacy mode: {})",
            config.reputation.privacy_mode
        );
    } else {
        println!("✗ Remote reputation lookups disabled (no API key)");
        info!("Remote reputation lookups disabled; verdicts use local scoring only");
    }

    // Storage backend; process-local unless an embedder swaps it out
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let state = AppState::new(config.clone(), store);
    println!("✓ Services initialized");
    info!(
        "Services initialized (cache TTL {}s, history limit {})",
        config.cache.ttl_seconds, config.scan.history_limit
    );

    // Background sweep of expired cache entries
    spawn_cache_sweeper(
        state.cache.clone(),
        Duration::from_secs(config.cache.sweep_interval_seconds),
    );

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    println!("✓ Listening on {}", bind_address);
    info!("Listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
