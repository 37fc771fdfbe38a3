//! Technical indicator implementations.

pub mod ema;
pub mod rsi;

pub use ema::Ema;
pub use rsi::{Rsi, RsiMethod, NEUTRAL_RSI};

use serde::Serialize;

/// Indicators for one ticker at scan time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    pub ema20: f64,
    pub ema50: f64,
    /// Equal to `ema50` when fewer than 100 closes are available.
    pub ema100: f64,
    /// Equal to `ema100` when fewer than 200 closes are available.
    pub ema200: f64,
    /// Unrounded RSI in [0, 100].
    pub rsi: f64,
    /// Whether ema100 fell back to a shorter EMA.
    pub ema100_aliased: bool,
    /// Whether ema200 fell back to a shorter EMA.
    pub ema200_aliased: bool,
}

impl IndicatorSet {
    /// Price strictly below every EMA.
    pub fn below_all(&self, price: f64) -> bool {
        self.emas().iter().all(|&ema| price < ema)
    }

    /// Price strictly above every EMA.
    pub fn above_all(&self, price: f64) -> bool {
        self.emas().iter().all(|&ema| price > ema)
    }

    /// EMA 20/50/100/200 in that order.
    pub fn emas(&self) -> [f64; 4] {
        [self.ema20, self.ema50, self.ema100, self.ema200]
    }
}

/// Computes EMA 20/50/100/200 and RSI from a close series.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorEngine {
    rsi: Rsi,
    /// Number of most recent closes fed to RSI.
    rsi_window: usize,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        let rsi = Rsi::default();
        Self {
            rsi,
            rsi_window: rsi.method().default_window(),
        }
    }
}

impl IndicatorEngine {
    pub fn new(rsi: Rsi, rsi_window: usize) -> Self {
        Self { rsi, rsi_window }
    }

    pub fn rsi_window(&self) -> usize {
        self.rsi_window
    }

    /// Compute the full indicator set.
    ///
    /// Returns None only when EMA20 or EMA50 cannot be computed; longer EMAs
    /// fall back to the next shorter one.
    pub fn compute(&self, closes: &[f64]) -> Option<IndicatorSet> {
        let ema20 = Ema::new(20).calculate(closes)?;
        let ema50 = Ema::new(50).calculate(closes)?;

        let (ema100, ema100_aliased) = match Ema::new(100).calculate(closes) {
            Some(value) => (value, false),
            None => (ema50, true),
        };
        let (ema200, ema200_aliased) = match Ema::new(200).calculate(closes) {
            Some(value) => (value, false),
            None => (ema100, true),
        };

        Some(IndicatorSet {
            ema20,
            ema50,
            ema100,
            ema200,
            rsi: self.rsi(closes),
            ema100_aliased,
            ema200_aliased,
        })
    }

    /// RSI over the configured trailing window.
    pub fn rsi(&self, closes: &[f64]) -> f64 {
        let start = closes.len().saturating_sub(self.rsi_window);
        self.rsi.calculate(&closes[start..])
    }
}
