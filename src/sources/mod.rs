//! Price history sources.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::PriceHistory;

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

/// Why a source could not produce a history.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("{code}: {description}")]
    Api { code: String, description: String },

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("no price data for {0}")]
    NoData(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Request(err.to_string())
    }
}

/// Supplies daily closing-price history for a ticker.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Short source name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch chronological daily closes for `ticker`.
    async fn fetch_price_history(&self, ticker: &str) -> Result<PriceHistory, SourceError>;
}
