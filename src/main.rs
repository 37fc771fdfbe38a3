use std::sync::Arc;
use std::time::Duration;

use tickerscan::config::Config;
use tickerscan::services::SqliteStore;
use tickerscan::sources::YahooFinanceClient;
use tickerscan::AppState;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickerscan=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!("Starting tickerscan server on {}:{}", config.host, config.port);

    let store = Arc::new(SqliteStore::new(&config.database_path)?);
    info!("Using database at {}", config.database_path);

    let provider = Arc::new(YahooFinanceClient::new(config.yahoo.clone())?);
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState::new(config, store, provider);

    // Periodically drop expired sessions
    let auth_service = state.auth_service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            auth_service.purge_expired_sessions();
            debug!("Active sessions: {}", auth_service.session_count());
        }
    });

    let app = tickerscan::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
