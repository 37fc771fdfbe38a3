//! Signal classification rules.
//!
//! Maps price, EMA 20/50/100/200 and RSI to one of five favourability
//! labels. Two rule sets are available behind [`SignalRules`]; both share
//! the EMA band ladder from [`EmaBand`] and the position reconciliation in
//! [`reconcile_with_position`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::indicators::IndicatorSet;
use crate::types::{EmaBand, EmaPosition, SignalLabel};

/// Everything a rule set looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalInput {
    pub price: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub ema100: f64,
    pub ema200: f64,
    /// RSI as displayed (already rounded).
    pub rsi: f64,
}

impl SignalInput {
    pub fn new(price: f64, indicators: &IndicatorSet, rsi: f64) -> Self {
        Self {
            price,
            ema20: indicators.ema20,
            ema50: indicators.ema50,
            ema100: indicators.ema100,
            ema200: indicators.ema200,
            rsi,
        }
    }

    pub fn band(&self) -> EmaBand {
        EmaBand::locate(self.price, self.ema20, self.ema50, self.ema100, self.ema200)
    }

    pub fn position(&self) -> EmaPosition {
        EmaPosition::locate(self.price, self.ema20, self.ema50, self.ema100, self.ema200)
    }
}

/// Which rule produced a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationBasis {
    /// EMA band and RSI tier agreed.
    Band,
    /// RSI tier alone.
    Rsi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub label: SignalLabel,
    pub basis: ClassificationBasis,
}

/// A complete, total classification rule set.
pub trait SignalRules: Send + Sync {
    /// Identifier used in configuration and logs.
    fn name(&self) -> &'static str;

    /// Classify a ticker. Must return a label for every input.
    fn classify(&self, input: &SignalInput) -> Classification;
}

/// RSI tier: <30, [30,40), [40,60], (60,70], >70.
pub fn rsi_tier(rsi: f64) -> SignalLabel {
    if rsi < 30.0 {
        SignalLabel::VeryFavorable
    } else if rsi < 40.0 {
        SignalLabel::Favorable
    } else if rsi <= 60.0 {
        SignalLabel::Interesting
    } else if rsi <= 70.0 {
        SignalLabel::ToConsider
    } else {
        SignalLabel::NotFavorable
    }
}

/// Keep a label from contradicting the EMA position.
///
/// Strictly above every EMA caps the label at Favorable; strictly below
/// every EMA floors it at ToConsider.
pub fn reconcile_with_position(label: SignalLabel, position: EmaPosition) -> SignalLabel {
    match (label, position) {
        (SignalLabel::VeryFavorable, EmaPosition::AboveAll) => SignalLabel::Favorable,
        (SignalLabel::NotFavorable, EmaPosition::BelowAll) => SignalLabel::ToConsider,
        (label, _) => label,
    }
}

/// Band label when the RSI tier agrees with it, RSI tier otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombinedTierRules;

impl SignalRules for CombinedTierRules {
    fn name(&self) -> &'static str {
        "combined"
    }

    fn classify(&self, input: &SignalInput) -> Classification {
        let band_label = input.band().label();
        let rsi_label = rsi_tier(input.rsi);

        let (label, basis) = if band_label == rsi_label {
            (band_label, ClassificationBasis::Band)
        } else {
            (rsi_label, ClassificationBasis::Rsi)
        };

        Classification {
            label: reconcile_with_position(label, input.position()),
            basis,
        }
    }
}

/// RSI tier only.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsiTierRules;

impl SignalRules for RsiTierRules {
    fn name(&self) -> &'static str {
        "rsi"
    }

    fn classify(&self, input: &SignalInput) -> Classification {
        Classification {
            label: reconcile_with_position(rsi_tier(input.rsi), input.position()),
            basis: ClassificationBasis::Rsi,
        }
    }
}

/// Configurable choice of rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    #[default]
    Combined,
    RsiOnly,
}

impl RuleSet {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "combined" | "band" => Some(Self::Combined),
            "rsi" | "rsi_only" => Some(Self::RsiOnly),
            _ => None,
        }
    }

    pub fn rules(&self) -> Arc<dyn SignalRules> {
        match self {
            Self::Combined => Arc::new(CombinedTierRules),
            Self::RsiOnly => Arc::new(RsiTierRules),
        }
    }
}
