//! Exponential Moving Average (EMA) indicator.

/// EMA (Exponential Moving Average) indicator.
///
/// Seeded with the simple average of the first `period` closes, then
/// smoothed with a factor of `2 / (period + 1)` over every later close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Minimum number of closes required for a value.
    pub fn min_periods(&self) -> usize {
        self.period
    }

    /// EMA over the full series, or None if the series is shorter than the
    /// period.
    pub fn calculate(&self, closes: &[f64]) -> Option<f64> {
        Self::calculate_ema(closes, self.period)
    }

    /// Calculate EMA value.
    fn calculate_ema(closes: &[f64], period: usize) -> Option<f64> {
        if period == 0 || closes.len() < period {
            return None;
        }

        let multiplier = 2.0 / (period as f64 + 1.0);

        // First EMA is SMA
        let sma: f64 = closes.iter().take(period).sum::<f64>() / period as f64;

        let mut ema = sma;
        for close in closes.iter().skip(period) {
            ema = (close - ema) * multiplier + ema;
        }

        Some(ema)
    }
}
