//! Confidence level ("nivel") scoring.

use super::indicators::IndicatorSet;
use crate::types::SignalLabel;

/// Price context for the volatility and band-alignment adjustments.
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    pub price: f64,
    pub indicators: &'a IndicatorSet,
    /// Day-over-day change in percent.
    pub change_percent: f64,
}

/// One RSI adjustment tier.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RsiTier {
    below: f64,
    above: f64,
    delta: f64,
}

const EXTREME_RSI: RsiTier = RsiTier {
    below: 25.0,
    above: 75.0,
    delta: 10.0,
};

const MILD_RSI: RsiTier = RsiTier {
    below: 35.0,
    above: 65.0,
    delta: 5.0,
};

/// Change beyond which a ticker is considered volatile.
const VOLATILITY_THRESHOLD_PCT: f64 = 5.0;
const VOLATILITY_PENALTY: f64 = 5.0;
const ALIGNMENT_DELTA: f64 = 5.0;

/// Maps a signal label plus context to a 0-100 confidence level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer {
    /// Also apply the ±5 tier when the ±10 tier does not fire.
    mild_rsi_tier: bool,
}

impl ConfidenceScorer {
    pub fn new(mild_rsi_tier: bool) -> Self {
        Self { mild_rsi_tier }
    }

    /// Score a label.
    ///
    /// Adjustments run in order and the running score is clamped to
    /// [0, 100] after each one:
    /// 1. RSI tier, most severe first, only the first match fires
    /// 2. volatility penalty when |change| > 5%
    /// 3. band alignment for VeryFavorable below all / NotFavorable above all
    ///
    /// Steps 2 and 3 need a context.
    pub fn score(&self, label: SignalLabel, rsi: f64, context: Option<&ScoreContext<'_>>) -> u8 {
        let mut score = label.base_confidence() as f64;

        let tiers: &[RsiTier] = if self.mild_rsi_tier {
            &[EXTREME_RSI, MILD_RSI]
        } else {
            &[EXTREME_RSI]
        };
        for tier in tiers {
            if rsi < tier.below {
                score = clamp(score + tier.delta);
                break;
            }
            if rsi > tier.above {
                score = clamp(score - tier.delta);
                break;
            }
        }

        if let Some(ctx) = context {
            if ctx.change_percent.abs() > VOLATILITY_THRESHOLD_PCT {
                score = clamp(score - VOLATILITY_PENALTY);
            }

            match label {
                SignalLabel::VeryFavorable if ctx.indicators.below_all(ctx.price) => {
                    score = clamp(score + ALIGNMENT_DELTA);
                }
                SignalLabel::NotFavorable if ctx.indicators.above_all(ctx.price) => {
                    score = clamp(score - ALIGNMENT_DELTA);
                }
                _ => {}
            }
        }

        clamp(score.round()) as u8
    }
}

fn clamp(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}
