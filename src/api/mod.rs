pub mod auth;
pub mod health;
pub mod market;
pub mod tickers;

use crate::error::AppError;
use crate::AppState;
use axum::{http::Uri, Router};

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/auth", auth::router())
        .merge(tickers::router())
        .merge(market::router())
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}
