//! Technical signal engine.
//!
//! Indicator math, label classification and confidence scoring. Everything
//! here is pure and total; fetching and orchestration live in
//! [`crate::services::scanner`].

pub mod classifier;
pub mod confidence;
pub mod indicators;

pub use classifier::{
    rsi_tier, Classification, ClassificationBasis, CombinedTierRules, RsiTierRules, RuleSet,
    SignalInput, SignalRules,
};
pub use confidence::{ConfidenceScorer, ScoreContext};
pub use indicators::{IndicatorEngine, IndicatorSet, Rsi, RsiMethod};
