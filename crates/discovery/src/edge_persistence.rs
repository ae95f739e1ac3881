//! Sigmoid-squashed persistence probability. Informational only: its
//! calibration has never been validated against realized outcomes, so it
//! feeds alert text but never gates index inclusion by itself.

use crate::hidden_alpha::WalletSignals;
use smart_money_core::types::{EdgePersistence, PersistenceRisk};

const MIN_TRADES: i64 = 30;
const MIN_DAYS_ACTIVE: i64 = 14;

const WEIGHT_STRATEGY_DURABILITY: f64 = 0.25;
const WEIGHT_CONSISTENCY: f64 = 0.25;
const WEIGHT_TRACK_RECORD: f64 = 0.20;
const WEIGHT_RECENT_VS_HISTORICAL: f64 = 0.15;
const WEIGHT_MARKET_DIVERSIFICATION: f64 = 0.15;

const DECAY_60D: f64 = 0.90;
const DECAY_90D: f64 = 0.80;

#[derive(Debug, Clone, Copy)]
pub struct PersistenceFactors {
    /// Each factor normalized to [0, 1] before weighting.
    pub strategy_durability: f64,
    pub consistency: f64,
    pub track_record: f64,
    pub recent_vs_historical: f64,
    pub market_diversification: f64,
    pub total_trades: i64,
    pub days_active: i64,
}

fn sigmoid(score: f64) -> f64 {
    1.0 / (1.0 + (-2.0 * (score - 0.5)).exp())
}

fn risk_bucket(probability_30d: f64, consistency: f64) -> PersistenceRisk {
    if probability_30d >= 0.75 && consistency >= 0.70 {
        PersistenceRisk::Low
    } else if probability_30d >= 0.55 {
        PersistenceRisk::Moderate
    } else if probability_30d >= 0.35 {
        PersistenceRisk::High
    } else {
        PersistenceRisk::VeryHigh
    }
}

/// Maps the raw signals already loaded for hidden-alpha discovery onto the
/// five normalized factors the persistence estimate weighs.
pub fn derive_persistence_factors(s: &WalletSignals) -> PersistenceFactors {
    let recent_vs_historical = if s.historical_win_rate > 0.0 {
        (s.recent_win_rate / s.historical_win_rate / 1.5).clamp(0.0, 1.0)
    } else {
        0.5
    };

    PersistenceFactors {
        strategy_durability: (s.strategy_confidence / 100.0).clamp(0.0, 1.0),
        consistency: (s.consistency_score / 100.0).clamp(0.0, 1.0),
        track_record: (s.track_record_score / 100.0).clamp(0.0, 1.0),
        recent_vs_historical,
        market_diversification: (1.0 - s.category_volume_fraction).clamp(0.0, 1.0),
        total_trades: s.total_trades,
        days_active: s.days_active,
    }
}

pub fn estimate(factors: &PersistenceFactors) -> Option<EdgePersistence> {
    if factors.total_trades < MIN_TRADES || factors.days_active < MIN_DAYS_ACTIVE {
        return None;
    }

    let weighted_score = factors.strategy_durability * WEIGHT_STRATEGY_DURABILITY
        + factors.consistency * WEIGHT_CONSISTENCY
        + factors.track_record * WEIGHT_TRACK_RECORD
        + factors.recent_vs_historical * WEIGHT_RECENT_VS_HISTORICAL
        + factors.market_diversification * WEIGHT_MARKET_DIVERSIFICATION;

    let probability_30d = sigmoid(weighted_score);
    let probability_60d = probability_30d * DECAY_60D;
    let probability_90d = probability_30d * DECAY_90D;
    let risk = risk_bucket(probability_30d, factors.consistency);

    Some(EdgePersistence { probability_30d, probability_60d, probability_90d, risk })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors(score: f64) -> PersistenceFactors {
        PersistenceFactors {
            strategy_durability: score,
            consistency: score,
            track_record: score,
            recent_vs_historical: score,
            market_diversification: score,
            total_trades: 50,
            days_active: 30,
        }
    }

    #[test]
    fn insufficient_history_returns_none() {
        let mut f = factors(0.9);
        f.total_trades = 5;
        assert!(estimate(&f).is_none());
    }

    #[test]
    fn sixty_and_ninety_day_probabilities_decay_from_thirty_day() {
        let result = estimate(&factors(0.9)).unwrap();
        assert!((result.probability_60d - result.probability_30d * 0.90).abs() < 1e-9);
        assert!((result.probability_90d - result.probability_30d * 0.80).abs() < 1e-9);
        assert!(result.probability_60d < result.probability_30d);
        assert!(result.probability_90d < result.probability_60d);
    }

    #[test]
    fn high_score_yields_low_risk() {
        let result = estimate(&factors(0.95)).unwrap();
        assert_eq!(result.risk, PersistenceRisk::Low);
    }

    #[test]
    fn low_score_yields_very_high_risk() {
        let result = estimate(&factors(0.05)).unwrap();
        assert_eq!(result.risk, PersistenceRisk::VeryHigh);
    }

    #[test]
    fn derive_persistence_factors_rewards_recent_outperformance() {
        let mut s = crate::hidden_alpha::test_support::base_signals();
        s.recent_win_rate = 0.75;
        s.historical_win_rate = 0.50;
        let factors = derive_persistence_factors(&s);
        assert!(factors.recent_vs_historical > 0.5);
    }

    #[test]
    fn derive_persistence_factors_handles_zero_historical_win_rate() {
        let mut s = crate::hidden_alpha::test_support::base_signals();
        s.historical_win_rate = 0.0;
        let factors = derive_persistence_factors(&s);
        assert_eq!(factors.recent_vs_historical, 0.5);
    }

    #[test]
    fn probability_stays_within_unit_interval() {
        let result = estimate(&factors(1.0)).unwrap();
        assert!(result.probability_30d <= 1.0);
        let result_low = estimate(&factors(0.0)).unwrap();
        assert!(result_low.probability_30d >= 0.0);
    }
}
