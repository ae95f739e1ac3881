//! Eligibility and category filtering, and top-N selection.

use crate::config::IndexConfig;
use smart_money_core::types::{MarketCategory, StrategyType};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct WalletCandidate {
    pub wallet_id: String,
    pub total_score: f64,
    pub sharpe: f64,
    pub volume: f64,
    pub days_active: i64,
    pub trades: i64,
    pub strategy_type: StrategyType,
    pub category_volume_fractions: HashMap<MarketCategory, f64>,
}

pub fn filter_eligible(candidates: &[WalletCandidate], config: &IndexConfig) -> Vec<WalletCandidate> {
    let excluded = config.effectively_excluded_strategies();

    candidates
        .iter()
        .filter(|c| c.total_score >= config.min_total_score)
        .filter(|c| c.trades >= config.min_trades)
        .filter(|c| c.days_active >= config.min_days_active)
        .filter(|c| c.volume >= config.min_volume)
        .filter(|c| c.sharpe >= config.min_sharpe)
        .filter(|c| {
            config.allowed_strategies.is_empty() || config.allowed_strategies.contains(&c.strategy_type)
        })
        .filter(|c| !excluded.contains(&c.strategy_type))
        .filter(|c| category_filter_passes(c, config))
        .cloned()
        .collect()
}

fn category_filter_passes(candidate: &WalletCandidate, config: &IndexConfig) -> bool {
    if config.required_categories.is_empty() {
        return true;
    }
    let concentration: f64 = config
        .required_categories
        .iter()
        .map(|cat| candidate.category_volume_fractions.get(cat).copied().unwrap_or(0.0))
        .sum();
    concentration >= config.min_category_concentration
}

/// Top `num_constituents` by total score, descending.
pub fn select_top_n(mut candidates: Vec<WalletCandidate>, num_constituents: usize) -> Vec<WalletCandidate> {
    candidates.sort_by(|a, b| b.total_score.partial_cmp(&a.total_score).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(num_constituents);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(wallet_id: &str, score: f64, strategy: StrategyType) -> WalletCandidate {
        WalletCandidate {
            wallet_id: wallet_id.to_string(),
            total_score: score,
            sharpe: 1.0,
            volume: 10_000.0,
            days_active: 60,
            trades: 100,
            strategy_type: strategy,
            category_volume_fractions: HashMap::new(),
        }
    }

    fn base_config() -> IndexConfig {
        IndexConfig {
            index_id: "test".to_string(),
            min_total_score: 40.0,
            min_trades: 10,
            min_days_active: 30,
            min_volume: 1_000.0,
            min_sharpe: 0.0,
            allowed_strategies: vec![],
            excluded_strategies: vec![],
            is_replication_index: false,
            required_categories: vec![],
            min_category_concentration: 0.0,
            num_constituents: 10,
            weighting_method: smart_money_core::types::WeightingMethod::Equal,
            max_weight_per_trader: 0.2,
            max_strategy_concentration: 0.5,
        }
    }

    #[test]
    fn replication_index_excludes_latency_dependent_strategies_even_when_unlisted() {
        let mut config = base_config();
        config.is_replication_index = true;
        let candidates = vec![
            candidate("arb", 90.0, StrategyType::Arbitrageur),
            candidate("mm", 90.0, StrategyType::MarketMaker),
            candidate("momentum", 90.0, StrategyType::DirectionalMomentum),
        ];
        let eligible = filter_eligible(&candidates, &config);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].wallet_id, "momentum");
    }

    #[test]
    fn allowed_strategies_acts_as_a_whitelist_when_non_empty() {
        let mut config = base_config();
        config.allowed_strategies = vec![StrategyType::DirectionalMomentum];
        let candidates = vec![
            candidate("arb", 90.0, StrategyType::Arbitrageur),
            candidate("momentum", 90.0, StrategyType::DirectionalMomentum),
        ];
        let eligible = filter_eligible(&candidates, &config);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].wallet_id, "momentum");
    }

    #[test]
    fn category_filter_requires_minimum_combined_concentration() {
        let mut config = base_config();
        config.required_categories = vec![MarketCategory::Crypto, MarketCategory::Politics];
        config.min_category_concentration = 0.6;

        let mut low = candidate("low", 90.0, StrategyType::Hybrid);
        low.category_volume_fractions.insert(MarketCategory::Crypto, 0.2);

        let mut high = candidate("high", 90.0, StrategyType::Hybrid);
        high.category_volume_fractions.insert(MarketCategory::Crypto, 0.4);
        high.category_volume_fractions.insert(MarketCategory::Politics, 0.3);

        let eligible = filter_eligible(&[low, high], &config);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].wallet_id, "high");
    }

    #[test]
    fn select_top_n_truncates_by_descending_score() {
        let candidates = vec![
            candidate("a", 50.0, StrategyType::Hybrid),
            candidate("b", 90.0, StrategyType::Hybrid),
            candidate("c", 70.0, StrategyType::Hybrid),
        ];
        let selected = select_top_n(candidates, 2);
        assert_eq!(selected.iter().map(|c| c.wallet_id.clone()).collect::<Vec<_>>(), vec!["b", "c"]);
    }
}
