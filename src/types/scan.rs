use serde::{Deserialize, Serialize, Serializer};

/// Discrete favourability label for a ticker.
///
/// Variants are declared from most to least favourable, so the derived
/// ordering reads `VeryFavorable < ... < NotFavorable`; use
/// [`SignalLabel::rank`] when comparing favourability explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalLabel {
    VeryFavorable,
    Favorable,
    Interesting,
    ToConsider,
    NotFavorable,
}

impl SignalLabel {
    /// All labels, most favourable first.
    pub const ALL: [SignalLabel; 5] = [
        SignalLabel::VeryFavorable,
        SignalLabel::Favorable,
        SignalLabel::Interesting,
        SignalLabel::ToConsider,
        SignalLabel::NotFavorable,
    ];

    /// Favourability rank, 4 for VeryFavorable down to 0 for NotFavorable.
    pub fn rank(&self) -> u8 {
        match self {
            SignalLabel::VeryFavorable => 4,
            SignalLabel::Favorable => 3,
            SignalLabel::Interesting => 2,
            SignalLabel::ToConsider => 1,
            SignalLabel::NotFavorable => 0,
        }
    }

    /// Starting confidence level before adjustments.
    pub fn base_confidence(&self) -> u8 {
        match self {
            SignalLabel::VeryFavorable => 85,
            SignalLabel::Favorable => 70,
            SignalLabel::Interesting => 50,
            SignalLabel::ToConsider => 35,
            SignalLabel::NotFavorable => 20,
        }
    }

    /// Get display label for this signal.
    pub fn label(&self) -> &'static str {
        match self {
            SignalLabel::VeryFavorable => "Very Favorable",
            SignalLabel::Favorable => "Favorable",
            SignalLabel::Interesting => "Interesting",
            SignalLabel::ToConsider => "To Consider",
            SignalLabel::NotFavorable => "Not Favorable",
        }
    }
}

/// Instrument classification shown next to each ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentType {
    Stock,
    #[serde(rename = "ETF")]
    Etf,
}

/// Price band on the EMA ladder.
///
/// Walks EMA200, EMA100, EMA50, EMA20 in that order and stops at the first
/// EMA the price is below. Lower bounds are inclusive. Total for any EMA
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmaBand {
    BelowEma200,
    Ema200To100,
    Ema100To50,
    Ema50To20,
    AboveEma20,
}

impl EmaBand {
    pub fn locate(price: f64, ema20: f64, ema50: f64, ema100: f64, ema200: f64) -> Self {
        if price < ema200 {
            EmaBand::BelowEma200
        } else if price < ema100 {
            EmaBand::Ema200To100
        } else if price < ema50 {
            EmaBand::Ema100To50
        } else if price < ema20 {
            EmaBand::Ema50To20
        } else {
            EmaBand::AboveEma20
        }
    }

    /// Label this band maps to: the further below the long averages, the
    /// more favourable.
    pub fn label(&self) -> SignalLabel {
        match self {
            EmaBand::BelowEma200 => SignalLabel::VeryFavorable,
            EmaBand::Ema200To100 => SignalLabel::Favorable,
            EmaBand::Ema100To50 => SignalLabel::Interesting,
            EmaBand::Ema50To20 => SignalLabel::ToConsider,
            EmaBand::AboveEma20 => SignalLabel::NotFavorable,
        }
    }
}

/// Price position relative to the four EMAs.
///
/// Refines [`EmaBand`]: strictly above or below every EMA wins, otherwise
/// the band decides. Below EMA200 without being below all is `Mixed`; at or
/// above every EMA while touching one of them is `AboveEma200`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmaPosition {
    AboveAll,
    BelowAll,
    Between200And100,
    Between100And50,
    Between50And20,
    AboveEma200,
    Mixed,
}

impl EmaPosition {
    /// Classify a price against EMA 20/50/100/200.
    pub fn locate(price: f64, ema20: f64, ema50: f64, ema100: f64, ema200: f64) -> Self {
        let emas = [ema20, ema50, ema100, ema200];
        if emas.iter().all(|&ema| price > ema) {
            return EmaPosition::AboveAll;
        }
        if emas.iter().all(|&ema| price < ema) {
            return EmaPosition::BelowAll;
        }

        match EmaBand::locate(price, ema20, ema50, ema100, ema200) {
            EmaBand::BelowEma200 => EmaPosition::Mixed,
            EmaBand::Ema200To100 => EmaPosition::Between200And100,
            EmaBand::Ema100To50 => EmaPosition::Between100And50,
            EmaBand::Ema50To20 => EmaPosition::Between50And20,
            EmaBand::AboveEma20 => EmaPosition::AboveEma200,
        }
    }

    /// Human-readable description used in scan rows.
    pub fn description(&self) -> &'static str {
        match self {
            EmaPosition::AboveAll => "Above all EMAs (20, 50, 100, 200)",
            EmaPosition::BelowAll => "Below all EMAs",
            EmaPosition::Between200And100 => "Between EMA200 and EMA100",
            EmaPosition::Between100And50 => "Between EMA100 and EMA50",
            EmaPosition::Between50And20 => "Between EMA50 and EMA20",
            EmaPosition::AboveEma200 => "Above EMA200 (strength zone)",
            EmaPosition::Mixed => "Mixed position between EMAs",
        }
    }
}

/// Whether a row was computed from live history or is a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Live,
    Unavailable,
}

/// Position text used on placeholder rows.
pub const UNAVAILABLE_POSITION: &str = "Unavailable";

/// One result row of a scan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRow {
    /// Ticker as requested.
    pub ticker: String,
    /// Stock or ETF.
    pub instrument_type: InstrumentType,
    /// Latest close, serialized as "N/A" when unavailable.
    #[serde(serialize_with = "serialize_price")]
    pub price: Option<f64>,
    /// Day-over-day change, rounded to 2 decimals.
    pub change_percent: f64,
    /// Rounded RSI, null when unavailable.
    pub rsi: Option<u8>,
    pub signal: SignalLabel,
    /// Confidence level (0-100).
    pub confidence_level: u8,
    pub ema_position: String,
    pub status: RowStatus,
}

impl ScanRow {
    /// Placeholder row emitted when a ticker cannot be evaluated.
    pub fn unavailable(ticker: &str, instrument_type: InstrumentType) -> Self {
        let signal = SignalLabel::Interesting;
        Self {
            ticker: ticker.to_string(),
            instrument_type,
            price: None,
            change_percent: 0.0,
            rsi: None,
            signal,
            confidence_level: signal.base_confidence(),
            ema_position: UNAVAILABLE_POSITION.to_string(),
            status: RowStatus::Unavailable,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == RowStatus::Live
    }
}

fn serialize_price<S: Serializer>(price: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match price {
        Some(value) => serializer.serialize_f64(round2(*value)),
        None => serializer.serialize_str("N/A"),
    }
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_label_rank_order() {
        let ranks: Vec<u8> = SignalLabel::ALL.iter().map(|l| l.rank()).collect();
        assert_eq!(ranks, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_signal_label_base_confidence() {
        assert_eq!(SignalLabel::VeryFavorable.base_confidence(), 85);
        assert_eq!(SignalLabel::Favorable.base_confidence(), 70);
        assert_eq!(SignalLabel::Interesting.base_confidence(), 50);
        assert_eq!(SignalLabel::ToConsider.base_confidence(), 35);
        assert_eq!(SignalLabel::NotFavorable.base_confidence(), 20);
    }

    #[test]
    fn test_signal_label_serialization() {
        let json = serde_json::to_string(&SignalLabel::ToConsider).unwrap();
        assert_eq!(json, "\"to_consider\"");
    }

    #[test]
    fn test_instrument_type_serialization() {
        assert_eq!(serde_json::to_string(&InstrumentType::Etf).unwrap(), "\"ETF\"");
        assert_eq!(serde_json::to_string(&InstrumentType::Stock).unwrap(), "\"Stock\"");
    }

    #[test]
    fn test_ema_position_bands() {
        // ema20 > ema50 > ema100 > ema200
        let (e20, e50, e100, e200) = (140.0, 130.0, 120.0, 110.0);
        assert_eq!(EmaPosition::locate(150.0, e20, e50, e100, e200), EmaPosition::AboveAll);
        assert_eq!(EmaPosition::locate(100.0, e20, e50, e100, e200), EmaPosition::BelowAll);
        assert_eq!(EmaPosition::locate(115.0, e20, e50, e100, e200), EmaPosition::Between200And100);
        assert_eq!(EmaPosition::locate(125.0, e20, e50, e100, e200), EmaPosition::Between100And50);
        assert_eq!(EmaPosition::locate(135.0, e20, e50, e100, e200), EmaPosition::Between50And20);
    }

    #[test]
    fn test_ema_position_ties() {
        let (e20, e50, e100, e200) = (140.0, 130.0, 120.0, 110.0);
        // Touching EMA20 from above is not strictly above all
        assert_eq!(EmaPosition::locate(140.0, e20, e50, e100, e200), EmaPosition::AboveEma200);
        // Lower bound of a band is inclusive
        assert_eq!(EmaPosition::locate(110.0, e20, e50, e100, e200), EmaPosition::Between200And100);
    }

    #[test]
    fn test_ema_position_unordered_emas() {
        // Downtrend ordering: ema200 on top
        let (e20, e50, e100, e200) = (100.0, 110.0, 120.0, 130.0);
        assert_eq!(EmaPosition::locate(125.0, e20, e50, e100, e200), EmaPosition::Mixed);
        assert_eq!(EmaPosition::locate(90.0, e20, e50, e100, e200), EmaPosition::BelowAll);
        assert_eq!(EmaPosition::locate(140.0, e20, e50, e100, e200), EmaPosition::AboveAll);
    }

    #[test]
    fn test_ema_band_ladder() {
        let (e20, e50, e100, e200) = (140.0, 130.0, 120.0, 110.0);
        assert_eq!(EmaBand::locate(100.0, e20, e50, e100, e200), EmaBand::BelowEma200);
        assert_eq!(EmaBand::locate(110.0, e20, e50, e100, e200), EmaBand::Ema200To100);
        assert_eq!(EmaBand::locate(125.0, e20, e50, e100, e200), EmaBand::Ema100To50);
        assert_eq!(EmaBand::locate(135.0, e20, e50, e100, e200), EmaBand::Ema50To20);
        assert_eq!(EmaBand::locate(140.0, e20, e50, e100, e200), EmaBand::AboveEma20);
    }

    #[test]
    fn test_ema_band_labels_monotonic() {
        let bands = [
            EmaBand::BelowEma200,
            EmaBand::Ema200To100,
            EmaBand::Ema100To50,
            EmaBand::Ema50To20,
            EmaBand::AboveEma20,
        ];
        let labels: Vec<SignalLabel> = bands.iter().map(|b| b.label()).collect();
        assert_eq!(labels, SignalLabel::ALL.to_vec());
    }

    #[test]
    fn test_unavailable_row() {
        let row = ScanRow::unavailable("XYZ", InstrumentType::Stock);
        assert_eq!(row.price, None);
        assert_eq!(row.rsi, None);
        assert_eq!(row.signal, SignalLabel::Interesting);
        assert_eq!(row.confidence_level, 50);
        assert!(!row.is_live());
    }

    #[test]
    fn test_scan_row_serialization_unavailable_price() {
        let row = ScanRow::unavailable("XYZ", InstrumentType::Stock);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["price"], "N/A");
        assert_eq!(json["changePercent"], 0.0);
        assert!(json["rsi"].is_null());
        assert_eq!(json["confidenceLevel"], 50);
        assert_eq!(json["instrumentType"], "Stock");
        assert_eq!(json["status"], "unavailable");
    }

    #[test]
    fn test_scan_row_serialization_live_price() {
        let row = ScanRow {
            ticker: "AAPL".to_string(),
            instrument_type: InstrumentType::Stock,
            price: Some(189.456),
            change_percent: 0.67,
            rsi: Some(55),
            signal: SignalLabel::Interesting,
            confidence_level: 50,
            ema_position: EmaPosition::AboveAll.description().to_string(),
            status: RowStatus::Live,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["price"], 189.46);
        assert_eq!(json["rsi"], 55);
        assert_eq!(json["signal"], "interesting");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.671140939), 0.67);
        assert_eq!(round2(-2.345678), -2.35);
        assert_eq!(round2(12.0), 12.0);
    }
}
