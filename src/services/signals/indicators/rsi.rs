//! Relative Strength Index (RSI) indicator.

use serde::{Deserialize, Serialize};

/// RSI returned when the window is too short to compute one.
pub const NEUTRAL_RSI: f64 = 50.0;

/// How average gains and losses are formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiMethod {
    /// Plain averages over the first `period` deltas of the window.
    #[default]
    Simple,
    /// Seeded like `Simple`, then Wilder-smoothed over the rest of the window.
    Wilder,
}

impl RsiMethod {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "simple" | "sma" => Some(Self::Simple),
            "wilder" | "smoothed" => Some(Self::Wilder),
            _ => None,
        }
    }

    /// Closes fed to RSI when no window is configured.
    pub fn default_window(&self) -> usize {
        match self {
            Self::Simple => 50,
            Self::Wilder => 200,
        }
    }
}

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of gains to losses.
/// Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rsi {
    period: usize,
    method: RsiMethod,
}

impl Default for Rsi {
    fn default() -> Self {
        Self {
            period: 14,
            method: RsiMethod::Simple,
        }
    }
}

impl Rsi {
    pub fn new(period: usize, method: RsiMethod) -> Self {
        Self { period, method }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn method(&self) -> RsiMethod {
        self.method
    }

    pub fn min_periods(&self) -> usize {
        self.period + 1
    }

    /// RSI of the given window, clamped to [0, 100].
    ///
    /// Returns [`NEUTRAL_RSI`] when the window holds fewer than
    /// `period + 1` closes.
    pub fn calculate(&self, closes: &[f64]) -> f64 {
        if self.period == 0 || closes.len() < self.min_periods() {
            return NEUTRAL_RSI;
        }

        let (gains, losses): (Vec<f64>, Vec<f64>) = closes
            .windows(2)
            .map(|pair| {
                let change = pair[1] - pair[0];
                if change > 0.0 {
                    (change, 0.0)
                } else {
                    (0.0, -change)
                }
            })
            .unzip();

        let period = self.period as f64;
        let mut avg_gain: f64 = gains.iter().take(self.period).sum::<f64>() / period;
        let mut avg_loss: f64 = losses.iter().take(self.period).sum::<f64>() / period;

        if self.method == RsiMethod::Wilder {
            for (gain, loss) in gains.iter().zip(&losses).skip(self.period) {
                avg_gain = (avg_gain * (period - 1.0) + gain) / period;
                avg_loss = (avg_loss * (period - 1.0) + loss) / period;
            }
        }

        if avg_loss == 0.0 {
            return 100.0;
        }

        let rs = avg_gain / avg_loss;
        (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
    }
}
