//! In-memory price history providers shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tickerscan::sources::{PriceHistoryProvider, SourceError};
use tickerscan::PriceHistory;

/// Evenly spaced closes from `from` to `to` inclusive.
pub fn ramp(count: usize, from: f64, to: f64) -> Vec<f64> {
    let step = (to - from) / (count - 1) as f64;
    (0..count).map(|i| from + step * i as f64).collect()
}

/// 299 closes rising from 100 to 149, then a close at 150.
pub fn uptrend() -> Vec<f64> {
    let mut closes = ramp(299, 100.0, 149.0);
    closes.push(150.0);
    closes
}

pub fn downtrend() -> Vec<f64> {
    ramp(300, 200.0, 100.0)
}

struct Entry {
    closes: Vec<f64>,
    delay: Duration,
}

/// Serves canned histories; unknown tickers are reported as missing.
#[derive(Default)]
pub struct FakeProvider {
    entries: HashMap<String, Entry>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, ticker: &str, closes: Vec<f64>) -> Self {
        self.entries.insert(
            ticker.to_uppercase(),
            Entry {
                closes,
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn with_delay(mut self, ticker: &str, closes: Vec<f64>, delay: Duration) -> Self {
        self.entries
            .insert(ticker.to_uppercase(), Entry { closes, delay });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceHistoryProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_price_history(&self, ticker: &str) -> Result<PriceHistory, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = match self.entries.get(&ticker.to_uppercase()) {
            Some(entry) => {
                if !entry.delay.is_zero() {
                    tokio::time::sleep(entry.delay).await;
                }
                PriceHistory::from_closes(ticker, entry.closes.clone())
                    .ok_or_else(|| SourceError::NoData(ticker.to_string()))
            }
            None => Err(SourceError::Api {
                code: "Not Found".to_string(),
                description: "No data found, symbol may be delisted".to_string(),
            }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
