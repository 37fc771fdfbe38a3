use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::Authenticated;
use crate::error::Result;
use crate::services::WatchlistService;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct TickersBody {
    #[serde(default)]
    pub tickers: Vec<String>,
}

/// GET /api/tickers
async fn get_tickers(
    State(watchlist): State<Arc<WatchlistService>>,
    auth: Authenticated,
) -> Json<TickersBody> {
    Json(TickersBody {
        tickers: watchlist.tickers(&auth.user.id),
    })
}

/// POST /api/tickers
///
/// Replaces the saved list; an empty list restores the defaults.
async fn save_tickers(
    State(watchlist): State<Arc<WatchlistService>>,
    auth: Authenticated,
    Json(body): Json<TickersBody>,
) -> Result<Json<TickersBody>> {
    let saved = watchlist.save(&auth.user.id, &body.tickers)?;
    let tickers = if saved.is_empty() {
        watchlist.defaults().to_vec()
    } else {
        saved
    };
    Ok(Json(TickersBody { tickers }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/tickers", get(get_tickers).post(save_tickers))
}
