//! Index construction: eligibility, selection, weighting, concentration
//! checks, and rebalance diffing against a previous snapshot.

pub mod concentration;
pub mod config;
pub mod eligibility;
pub mod rebalance;
pub mod store;
pub mod weighting;

use chrono::Utc;
use config::IndexConfig;
use eligibility::WalletCandidate;
use smart_money_core::types::{Index, IndexConstituent};
use weighting::WeightInput;

#[derive(Debug, Clone)]
pub struct BuildResult {
    pub index: Index,
    pub diff: rebalance::RebalanceDiff,
    pub warnings: Vec<String>,
}

pub fn build_index(candidates: &[WalletCandidate], config: &IndexConfig, previous: Option<&Index>) -> BuildResult {
    let eligible = eligibility::filter_eligible(candidates, config);
    let selected = eligibility::select_top_n(eligible, config.num_constituents);

    let weight_inputs: Vec<WeightInput> = selected
        .iter()
        .map(|c| WeightInput { score: c.total_score, sharpe: c.sharpe, volume: c.volume })
        .collect();

    let mut weights = weighting::raw_weights(&weight_inputs, config.weighting_method);
    weighting::cap_and_renormalize(&mut weights, config.max_weight_per_trader);

    let now = Utc::now();
    let mut constituents: Vec<IndexConstituent> = selected
        .iter()
        .zip(weights.iter())
        .map(|(c, &weight)| IndexConstituent {
            wallet_id: c.wallet_id.clone(),
            weight,
            score_at_inclusion: c.total_score,
            sharpe_at_inclusion: c.sharpe,
            strategy_type: c.strategy_type,
            added_at: now,
        })
        .collect();

    let strategies: Vec<_> = constituents.iter().map(|c| c.strategy_type).collect();
    let warnings = concentration::check_strategy_concentration(&strategies, config.max_strategy_concentration);

    let previous_constituents: &[IndexConstituent] = previous.map(|p| p.constituents.as_slice()).unwrap_or(&[]);
    let diff = rebalance::diff_and_merge(previous_constituents, &mut constituents);

    let index = Index {
        index_id: config.index_id.clone(),
        constituents,
        created_at: previous.map(|p| p.created_at).unwrap_or(now),
        last_rebalanced: now,
        cumulative_return: previous.map(|p| p.cumulative_return).unwrap_or(0.0),
    };

    BuildResult { index, diff, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smart_money_core::types::{StrategyType, WeightingMethod};
    use std::collections::HashMap;

    fn candidate(wallet_id: &str, score: f64) -> WalletCandidate {
        WalletCandidate {
            wallet_id: wallet_id.to_string(),
            total_score: score,
            sharpe: 1.0,
            volume: 10_000.0,
            days_active: 60,
            trades: 100,
            strategy_type: StrategyType::Hybrid,
            category_volume_fractions: HashMap::new(),
        }
    }

    fn config() -> IndexConfig {
        IndexConfig {
            index_id: "psi-10".to_string(),
            min_total_score: 0.0,
            min_trades: 0,
            min_days_active: 0,
            min_volume: 0.0,
            min_sharpe: -100.0,
            allowed_strategies: vec![],
            excluded_strategies: vec![],
            is_replication_index: false,
            required_categories: vec![],
            min_category_concentration: 0.0,
            num_constituents: 3,
            weighting_method: WeightingMethod::Equal,
            max_weight_per_trader: 0.5,
            max_strategy_concentration: 1.0,
        }
    }

    #[test]
    fn build_index_weights_sum_to_one() {
        let candidates = vec![candidate("a", 90.0), candidate("b", 80.0), candidate("c", 70.0)];
        let result = build_index(&candidates, &config(), None);
        let total: f64 = result.index.constituents.iter().map(|c| c.weight).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn first_build_has_no_previous_index_has_no_removals() {
        let candidates = vec![candidate("a", 90.0)];
        let result = build_index(&candidates, &config(), None);
        assert_eq!(result.diff.added, vec!["a".to_string()]);
        assert!(result.diff.removed.is_empty());
    }
}
