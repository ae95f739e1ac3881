//! Weighted composite score assembly and strategy-driven adjustments.

use crate::classifier::{classify, Classification, StrategyIndicators};
use crate::ladders::{consistency, profitability, risk_adjusted, track_record};
use chrono::Utc;
use smart_money_core::types::{StrategyType, Tier, WalletScore};

pub const MODEL_VERSION: &str = "smart-money-scorer-v1";

#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub profitability: f64,
    pub risk_adjusted: f64,
    pub consistency: f64,
    pub track_record: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            profitability: 0.40,
            risk_adjusted: 0.30,
            consistency: 0.20,
            track_record: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WalletMetrics {
    pub total_pnl: f64,
    pub total_trades: i64,
    pub total_volume: f64,
    pub unique_markets: i64,
    pub days_active: i64,
    pub buy_count: i64,
    pub sell_count: i64,
    pub complete_set_ratio: f64,
    pub direction_bias: f64,
}

impl WalletMetrics {
    fn avg_trade_size(&self) -> f64 {
        if self.total_trades > 0 {
            self.total_volume / self.total_trades as f64
        } else {
            0.0
        }
    }

    fn strategy_indicators(&self) -> StrategyIndicators {
        StrategyIndicators {
            complete_set_ratio: self.complete_set_ratio,
            direction_bias: self.direction_bias,
            total_trades: self.total_trades,
            buy_count: self.buy_count,
            sell_count: self.sell_count,
            unique_markets: self.unique_markets,
        }
    }
}

/// Compute a full `WalletScore`. `peer_pnls` is the cohort's P&L distribution
/// used for percentile ranking once it has at least 10 members.
pub fn score_wallet(
    wallet_id: &str,
    metrics: &WalletMetrics,
    peer_pnls: &[f64],
    weights: &ScoreWeights,
) -> WalletScore {
    let classification = classify(&metrics.strategy_indicators());

    let mut profitability_score = profitability(metrics.total_pnl, peer_pnls);
    let mut consistency_score = consistency(
        metrics.total_trades,
        metrics.buy_count,
        metrics.sell_count,
        metrics.days_active,
    );
    let risk_adjusted_score = risk_adjusted(metrics.avg_trade_size(), metrics.unique_markets);
    let track_record_score = track_record(metrics.days_active, metrics.total_volume, metrics.unique_markets);

    apply_strategy_adjustments(&classification, &mut profitability_score, &mut consistency_score);

    let total_score = (profitability_score * weights.profitability
        + risk_adjusted_score * weights.risk_adjusted
        + consistency_score * weights.consistency
        + track_record_score * weights.track_record)
        .clamp(0.0, 100.0);

    WalletScore {
        wallet_id: wallet_id.to_string(),
        total_score,
        tier: Tier::from_score(total_score),
        profitability: profitability_score,
        risk_adjusted: risk_adjusted_score,
        consistency: consistency_score,
        track_record: track_record_score,
        strategy_type: classification.strategy_type,
        strategy_confidence: classification.confidence,
        rank: None,
        calculated_at: Utc::now(),
        model_version: MODEL_VERSION.to_string(),
    }
}

fn apply_strategy_adjustments(
    classification: &Classification,
    profitability_score: &mut f64,
    consistency_score: &mut f64,
) {
    match classification.strategy_type {
        StrategyType::Arbitrageur => {
            if *consistency_score < 70.0 {
                *consistency_score *= 0.8;
            } else {
                *consistency_score = (*consistency_score * 1.1).min(100.0);
            }
        }
        StrategyType::DirectionalMomentum => {
            if *profitability_score > 60.0 {
                *profitability_score = (*profitability_score * 1.1).min(100.0);
            }
        }
        _ => {}
    }
}

/// Assign ranks by descending total score. Ties keep insertion order, which
/// is stable given a deterministic query ordering upstream.
pub fn assign_ranks(scores: &mut [WalletScore]) {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| {
        scores[b]
            .total_score
            .partial_cmp(&scores[a].total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (rank, &idx) in indices.iter().enumerate() {
        scores[idx].rank = Some(rank as i64 + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_metrics() -> WalletMetrics {
        WalletMetrics {
            total_pnl: 500.0,
            total_trades: 10,
            total_volume: 2_000.0,
            unique_markets: 5,
            days_active: 10,
            buy_count: 5,
            sell_count: 5,
            complete_set_ratio: 0.0,
            direction_bias: 0.5,
        }
    }

    #[test]
    fn total_score_is_always_within_bounds() {
        let score = score_wallet("0xabc", &base_metrics(), &[], &ScoreWeights::default());
        assert!(score.total_score >= 0.0 && score.total_score <= 100.0);
    }

    #[test]
    fn tier_is_consistent_with_total_score() {
        let score = score_wallet("0xabc", &base_metrics(), &[], &ScoreWeights::default());
        assert_eq!(score.tier, Tier::from_score(score.total_score));
    }

    #[test]
    fn arbitrageur_consistency_is_penalized_below_seventy() {
        let mut metrics = base_metrics();
        metrics.complete_set_ratio = 0.95;
        metrics.total_trades = 600;
        metrics.buy_count = 300;
        metrics.sell_count = 300;
        // Low days_active keeps consistency below 70 so the penalty path fires.
        metrics.days_active = 2;

        let unadjusted_consistency = consistency(
            metrics.total_trades,
            metrics.buy_count,
            metrics.sell_count,
            metrics.days_active,
        );
        let score = score_wallet("0xarb", &metrics, &[], &ScoreWeights::default());

        assert!(unadjusted_consistency < 70.0);
        assert!((score.consistency - unadjusted_consistency * 0.8).abs() < 1e-9);
    }

    #[test]
    fn directional_momentum_boosts_high_profitability() {
        let mut metrics = base_metrics();
        metrics.direction_bias = 0.95;
        metrics.unique_markets = 10;
        metrics.total_pnl = 50_000.0; // drives profitability ladder above 60

        let unadjusted = profitability(metrics.total_pnl, &[]);
        let score = score_wallet("0xmom", &metrics, &[], &ScoreWeights::default());

        assert!(unadjusted > 60.0);
        assert!((score.profitability - (unadjusted * 1.1).min(100.0)).abs() < 1e-9);
    }

    #[test]
    fn assign_ranks_orders_by_descending_score() {
        let mut scores = vec![
            score_wallet("low", &{ let mut m = base_metrics(); m.total_pnl = 10.0; m }, &[], &ScoreWeights::default()),
            score_wallet("high", &{ let mut m = base_metrics(); m.total_pnl = 90_000.0; m }, &[], &ScoreWeights::default()),
        ];
        assign_ranks(&mut scores);
        let high_rank = scores.iter().find(|s| s.wallet_id == "high").unwrap().rank;
        let low_rank = scores.iter().find(|s| s.wallet_id == "low").unwrap().rank;
        assert_eq!(high_rank, Some(1));
        assert_eq!(low_rank, Some(2));
    }
}
