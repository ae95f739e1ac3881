//! Strategy classification: three competing candidate scores, with a
//! HYBRID fallback for close races and UNKNOWN for weak signal everywhere.

use smart_money_core::types::StrategyType;

const HYBRID_MARGIN: f64 = 15.0;
const UNKNOWN_FLOOR: f64 = 30.0;

#[derive(Debug, Clone, Copy)]
pub struct StrategyIndicators {
    pub complete_set_ratio: f64,
    pub direction_bias: f64,
    pub total_trades: i64,
    pub buy_count: i64,
    pub sell_count: i64,
    pub unique_markets: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct Classification {
    pub strategy_type: StrategyType,
    pub confidence: f64,
}

fn arbitrageur_score(ind: &StrategyIndicators) -> f64 {
    let trades_bonus = if ind.total_trades > 500 { 20.0 } else { 0.0 };
    ind.complete_set_ratio * 100.0 + trades_bonus
}

fn market_maker_score(ind: &StrategyIndicators) -> f64 {
    let total = ind.buy_count + ind.sell_count;
    let buy_fraction = if total > 0 {
        ind.buy_count as f64 / total as f64
    } else {
        0.5
    };
    let trades_bonus = if ind.total_trades > 500 { 30.0 } else { 0.0 };
    (1.0 - (0.5 - buy_fraction).abs() * 2.0) * 50.0 + trades_bonus
}

fn directional_momentum_score(ind: &StrategyIndicators) -> f64 {
    let markets_bonus = if ind.unique_markets < 50 { 30.0 } else { 0.0 };
    (ind.direction_bias - 0.5).abs() * 100.0 + markets_bonus
}

/// Pure function of `(metrics, indicators)`: classification is deterministic
/// and idempotent by construction — no hidden state is consulted.
pub fn classify(ind: &StrategyIndicators) -> Classification {
    let mut candidates = vec![
        (StrategyType::Arbitrageur, arbitrageur_score(ind)),
        (StrategyType::MarketMaker, market_maker_score(ind)),
        (StrategyType::DirectionalMomentum, directional_momentum_score(ind)),
    ];
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let (best_type, best_score) = candidates[0];
    let runner_up_score = candidates[1].1;

    if best_score < UNKNOWN_FLOOR {
        return Classification {
            strategy_type: StrategyType::Unknown,
            confidence: 0.0,
        };
    }

    if best_score - runner_up_score < HYBRID_MARGIN {
        return Classification {
            strategy_type: StrategyType::Hybrid,
            confidence: best_score * 0.7,
        };
    }

    Classification {
        strategy_type: best_type,
        confidence: best_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators(
        complete_set_ratio: f64,
        direction_bias: f64,
        total_trades: i64,
        buy_count: i64,
        sell_count: i64,
        unique_markets: i64,
    ) -> StrategyIndicators {
        StrategyIndicators {
            complete_set_ratio,
            direction_bias,
            total_trades,
            buy_count,
            sell_count,
            unique_markets,
        }
    }

    #[test]
    fn classifies_arbitrageur_from_complete_set_ratio() {
        let ind = indicators(0.9, 0.5, 600, 300, 300, 40);
        let result = classify(&ind);
        assert_eq!(result.strategy_type, StrategyType::Arbitrageur);
    }

    #[test]
    fn classifies_directional_momentum_from_direction_bias() {
        let ind = indicators(0.0, 0.95, 100, 90, 10, 10);
        let result = classify(&ind);
        assert_eq!(result.strategy_type, StrategyType::DirectionalMomentum);
    }

    #[test]
    fn falls_back_to_unknown_below_floor() {
        // Skewed buy/sell (weak market-making signal), no complete sets,
        // neutral direction bias, and enough unique markets to zero out the
        // momentum bonus — every candidate lands below the UNKNOWN floor.
        let ind = indicators(0.0, 0.5, 10, 9, 1, 60);
        let result = classify(&ind);
        assert_eq!(result.strategy_type, StrategyType::Unknown);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn labels_hybrid_when_top_two_are_close() {
        // market_maker=40, arbitrageur=35 — within the 15-point hybrid margin.
        let ind = indicators(0.35, 0.5, 10, 6, 4, 10);
        let result = classify(&ind);
        assert_eq!(result.strategy_type, StrategyType::Hybrid);
    }

    #[test]
    fn classification_is_a_pure_function_of_its_inputs() {
        let ind = indicators(0.9, 0.5, 600, 300, 300, 40);
        let a = classify(&ind);
        let b = classify(&ind);
        assert_eq!(a.strategy_type, b.strategy_type);
        assert_eq!(a.confidence, b.confidence);
    }
}
