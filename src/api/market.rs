use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::auth::Subscribed;
use crate::error::{AppError, Result};
use crate::services::{ScanService, WatchlistService};
use crate::types::ScanRow;
use crate::AppState;

/// API response wrapper matching frontend expectations
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct MarketDataRequest {
    pub tickers: Option<Vec<String>>,
}

/// POST /api/market-data
///
/// Scan the posted tickers. Rows come back in request order; symbols that
/// fail validation come back as placeholder rows.
async fn scan_tickers(
    State(state): State<AppState>,
    Subscribed(user): Subscribed,
    Json(request): Json<MarketDataRequest>,
) -> Result<Json<ApiResponse<Vec<ScanRow>>>> {
    let tickers: Vec<String> = request
        .tickers
        .ok_or_else(|| AppError::BadRequest("tickers must be an array".to_string()))?
        .into_iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();

    if tickers.is_empty() {
        return Err(AppError::BadRequest("at least one ticker is required".to_string()));
    }
    let max = state.watchlist.max_tickers();
    if tickers.len() > max {
        return Err(AppError::BadRequest(format!("at most {} tickers per request", max)));
    }

    info!("User {} scanning {} tickers", user.id, tickers.len());
    Ok(Json(ApiResponse {
        data: state.scanner.scan(&tickers).await,
    }))
}

/// GET /api/market-data
///
/// Scan the caller's saved watch-list.
async fn scan_watchlist(
    State(scanner): State<Arc<ScanService>>,
    State(watchlist): State<Arc<WatchlistService>>,
    Subscribed(user): Subscribed,
) -> Json<ApiResponse<Vec<ScanRow>>> {
    let tickers = watchlist.tickers(&user.id);
    Json(ApiResponse {
        data: scanner.scan(&tickers).await,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/market-data", post(scan_tickers).get(scan_watchlist))
}
