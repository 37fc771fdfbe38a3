//! Watch-list scanning.
//!
//! Fetches histories with bounded concurrency, evaluates each ticker through
//! the indicator engine, rule set and confidence scorer, and degrades any
//! ticker that cannot be evaluated to a placeholder row.

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::cache::TickerCache;
use super::watchlist::is_valid_ticker;
use super::signals::{
    ConfidenceScorer, IndicatorEngine, Rsi, ScoreContext, SignalInput, SignalRules,
};
use crate::config::{ScanConfig, MIN_HISTORY_FLOOR};
use crate::sources::{PriceHistoryProvider, SourceError};
use crate::types::{round2, InstrumentType, PriceHistory, RowStatus, ScanRow};

/// Why a ticker fell back to a placeholder row.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{ticker}: only {have} closes, need {need}")]
    InsufficientHistory {
        ticker: String,
        have: usize,
        need: usize,
    },

    #[error("{0}: EMA20/EMA50 undefined")]
    IndicatorUndefined(String),

    #[error("{ticker}: {source}")]
    ProviderUnavailable {
        ticker: String,
        #[source]
        source: SourceError,
    },

    #[error("{ticker}: no response within {secs}s")]
    Timeout { ticker: String, secs: u64 },

    #[error("{0:?}: not a valid ticker symbol")]
    InvalidTicker(String),
}

/// Scans tickers against a price history provider.
pub struct ScanService {
    provider: Arc<dyn PriceHistoryProvider>,
    engine: IndicatorEngine,
    rules: Arc<dyn SignalRules>,
    scorer: ConfidenceScorer,
    config: ScanConfig,
    cache: TickerCache<PriceHistory>,
}

impl ScanService {
    pub fn new(provider: Arc<dyn PriceHistoryProvider>, config: ScanConfig) -> Self {
        let engine = IndicatorEngine::new(
            Rsi::new(config.rsi_period, config.rsi_method),
            config.rsi_window,
        );

        info!(
            "Scanner ready: source={}, rules={}, rsi={:?}/{} over {} closes, concurrency={}",
            provider.name(),
            config.rule_set.rules().name(),
            config.rsi_method,
            config.rsi_period,
            config.rsi_window,
            config.max_concurrency
        );

        Self {
            provider,
            engine,
            rules: config.rule_set.rules(),
            scorer: ConfidenceScorer::new(config.mild_rsi_tier),
            cache: TickerCache::new(config.history_cache_ttl()),
            config,
        }
    }

    /// Swap in a custom rule set.
    pub fn with_rules(mut self, rules: Arc<dyn SignalRules>) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn source_name(&self) -> &'static str {
        self.provider.name()
    }

    /// One row per requested ticker, in request order.
    ///
    /// Never fails: tickers that cannot be evaluated come back as
    /// placeholder rows.
    pub async fn scan(&self, tickers: &[String]) -> Vec<ScanRow> {
        let concurrency = self.config.max_concurrency.max(1);

        // Built up front so the stream does not borrow from the slice iterator
        let pending: Vec<_> = tickers.iter().map(|ticker| self.scan_ticker(ticker)).collect();
        let rows: Vec<ScanRow> = stream::iter(pending).buffered(concurrency).collect().await;

        let live = rows.iter().filter(|row| row.is_live()).count();
        info!("Scanned {} tickers ({} live)", rows.len(), live);
        self.cache.purge_expired();

        rows
    }

    /// Evaluate a single ticker, degrading on any failure.
    pub async fn scan_ticker(&self, ticker: &str) -> ScanRow {
        let instrument_type = self.config.instrument_type(ticker);

        let result = match self.fetch(ticker).await {
            Ok(history) => self.evaluate(ticker, instrument_type, &history),
            Err(err) => Err(err),
        };

        result.unwrap_or_else(|err| {
            warn!("Ticker unavailable, using placeholder row: {}", err);
            ScanRow::unavailable(ticker, instrument_type)
        })
    }

    async fn fetch(&self, ticker: &str) -> Result<PriceHistory, ScanError> {
        if !is_valid_ticker(&ticker.trim().to_uppercase()) {
            return Err(ScanError::InvalidTicker(ticker.to_string()));
        }

        if let Some(history) = self.cache.get(ticker) {
            debug!("History cache hit for {}", ticker);
            return Ok(history);
        }

        let history = tokio::time::timeout(
            self.config.fetch_timeout(),
            self.provider.fetch_price_history(ticker),
        )
        .await
        .map_err(|_| ScanError::Timeout {
            ticker: ticker.to_string(),
            secs: self.config.fetch_timeout_secs,
        })?
        .map_err(|source| ScanError::ProviderUnavailable {
            ticker: ticker.to_string(),
            source,
        })?;

        debug!("Fetched {} closes for {}", history.len(), ticker);
        self.cache.insert(ticker, history.clone());
        Ok(history)
    }

    /// Build a live row from a fetched history.
    pub fn evaluate(
        &self,
        ticker: &str,
        instrument_type: InstrumentType,
        history: &PriceHistory,
    ) -> Result<ScanRow, ScanError> {
        let need = self.config.min_history.max(MIN_HISTORY_FLOOR);
        if history.len() < need {
            return Err(ScanError::InsufficientHistory {
                ticker: ticker.to_string(),
                have: history.len(),
                need,
            });
        }

        let indicators = self
            .engine
            .compute(&history.closes)
            .ok_or_else(|| ScanError::IndicatorUndefined(ticker.to_string()))?;

        let price = history.current_price;
        let rsi = indicators.rsi.round();
        let change_percent = round2(history.change_percent());

        let input = SignalInput::new(price, &indicators, rsi);
        let classification = self.rules.classify(&input);
        let context = ScoreContext {
            price,
            indicators: &indicators,
            change_percent,
        };
        let confidence_level = self
            .scorer
            .score(classification.label, rsi, Some(&context));

        debug!(
            "{}: price={:.2} rsi={} signal={:?} ({:?}) confidence={}",
            ticker, price, rsi, classification.label, classification.basis, confidence_level
        );

        Ok(ScanRow {
            ticker: ticker.to_string(),
            instrument_type,
            price: Some(price),
            change_percent,
            rsi: Some(rsi as u8),
            signal: classification.label,
            confidence_level,
            ema_position: input.position().description().to_string(),
            status: RowStatus::Live,
        })
    }
}
