//! Per-user saved ticker lists.

use crate::services::SqliteStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::error;

const MAX_TICKER_LEN: usize = 20;

/// Saved watch-lists with a default fallback.
#[derive(Clone)]
pub struct WatchlistService {
    store: Arc<SqliteStore>,
    defaults: Vec<String>,
    max_tickers: usize,
}

impl WatchlistService {
    pub fn new(store: Arc<SqliteStore>, defaults: Vec<String>, max_tickers: usize) -> Self {
        Self {
            store,
            defaults,
            max_tickers,
        }
    }

    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    pub fn max_tickers(&self) -> usize {
        self.max_tickers
    }

    /// The user's saved list, or the defaults when none is saved or it
    /// cannot be read.
    pub fn tickers(&self, user_id: &str) -> Vec<String> {
        match self.store.user_tickers(user_id) {
            Ok(tickers) if !tickers.is_empty() => tickers,
            Ok(_) => self.defaults.clone(),
            Err(e) => {
                error!("Failed to load tickers for {}: {}", user_id, e);
                self.defaults.clone()
            }
        }
    }

    /// Normalise and store a list, returning what was saved.
    pub fn save(&self, user_id: &str, tickers: &[String]) -> Result<Vec<String>, rusqlite::Error> {
        let normalized = self.normalize(tickers);
        self.store.replace_user_tickers(user_id, &normalized)?;
        Ok(normalized)
    }

    /// Trim, uppercase, drop invalid symbols and duplicates (first one
    /// wins), then cap the length.
    pub fn normalize(&self, tickers: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        tickers
            .iter()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| is_valid_ticker(t))
            .filter(|t| seen.insert(t.clone()))
            .take(self.max_tickers)
            .collect()
    }
}

/// 1-20 characters of A-Z, 0-9 and `.^=-`.
pub fn is_valid_ticker(ticker: &str) -> bool {
    !ticker.is_empty()
        && ticker.len() <= MAX_TICKER_LEN
        && ticker
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '^' | '=' | '-'))
}
