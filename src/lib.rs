//! tickerscan - subscription-gated stock and ETF technical signal scanner

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use axum::{extract::FromRef, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use services::{AuthService, ScanService, SqliteStore, WatchlistService};
use sources::PriceHistoryProvider;

pub use types::*;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: Arc<AuthService>,
    pub watchlist: Arc<WatchlistService>,
    pub scanner: Arc<ScanService>,
}

impl AppState {
    /// Wire services from configuration, a store and a history source.
    pub fn new(
        config: Config,
        store: Arc<SqliteStore>,
        provider: Arc<dyn PriceHistoryProvider>,
    ) -> Self {
        let auth_service = AuthService::new(
            store.clone(),
            config.session_ttl_days,
            config.subscription_days,
        );
        let watchlist = WatchlistService::new(
            store,
            config.default_tickers.clone(),
            config.max_watchlist,
        );
        let scanner = ScanService::new(provider, config.scan.clone());

        Self {
            config: Arc::new(config),
            auth_service: Arc::new(auth_service),
            watchlist: Arc::new(watchlist),
            scanner: Arc::new(scanner),
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<WatchlistService> {
    fn from_ref(state: &AppState) -> Self {
        state.watchlist.clone()
    }
}

impl FromRef<AppState> for Arc<ScanService> {
    fn from_ref(state: &AppState) -> Self {
        state.scanner.clone()
    }
}

/// Full HTTP application with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
