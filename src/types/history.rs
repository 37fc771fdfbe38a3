use serde::{Deserialize, Serialize};

/// Daily closing-price history for one ticker.
///
/// `closes` is chronological (oldest first) with missing values already
/// filtered out by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistory {
    pub ticker: String,
    /// Latest close.
    pub current_price: f64,
    /// Close before the latest one.
    pub previous_price: f64,
    pub closes: Vec<f64>,
}

impl PriceHistory {
    /// Build a history from a close series, taking the last two closes as
    /// current and previous price.
    ///
    /// Returns None for an empty series. A single close is its own previous
    /// price.
    pub fn from_closes(ticker: impl Into<String>, closes: Vec<f64>) -> Option<Self> {
        let current_price = *closes.last()?;
        let previous_price = if closes.len() > 1 {
            closes[closes.len() - 2]
        } else {
            current_price
        };

        Some(Self {
            ticker: ticker.into(),
            current_price,
            previous_price,
            closes,
        })
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Day-over-day change in percent, unrounded.
    ///
    /// Zero when the previous price is not positive.
    pub fn change_percent(&self) -> f64 {
        if self.previous_price <= 0.0 {
            return 0.0;
        }
        (self.current_price - self.previous_price) / self.previous_price * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_closes_takes_last_two() {
        let history = PriceHistory::from_closes("AAPL", vec![100.0, 149.0, 150.0]).unwrap();
        assert_eq!(history.current_price, 150.0);
        assert_eq!(history.previous_price, 149.0);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_from_closes_single_value() {
        let history = PriceHistory::from_closes("AAPL", vec![42.0]).unwrap();
        assert_eq!(history.previous_price, 42.0);
        assert_eq!(history.change_percent(), 0.0);
    }

    #[test]
    fn test_from_closes_empty() {
        assert!(PriceHistory::from_closes("AAPL", Vec::new()).is_none());
    }

    #[test]
    fn test_change_percent() {
        let history = PriceHistory::from_closes("AAPL", vec![149.0, 150.0]).unwrap();
        let change = history.change_percent();
        assert!((change - 0.6711409).abs() < 1e-6);
    }

    #[test]
    fn test_change_percent_zero_previous() {
        let history = PriceHistory {
            ticker: "BAD".to_string(),
            current_price: 10.0,
            previous_price: 0.0,
            closes: vec![0.0, 10.0],
        };
        assert_eq!(history.change_percent(), 0.0);
    }
}
