//! Post-weighting strategy concentration warnings (non-rejecting).

use smart_money_core::types::StrategyType;
use std::collections::HashMap;

pub fn check_strategy_concentration(
    strategies: &[StrategyType],
    max_strategy_concentration: f64,
) -> Vec<String> {
    if strategies.is_empty() {
        return Vec::new();
    }
    let mut counts: HashMap<StrategyType, usize> = HashMap::new();
    for s in strategies {
        *counts.entry(*s).or_insert(0) += 1;
    }

    let n = strategies.len();
    let limit = max_strategy_concentration * n as f64;
    let mut warnings = Vec::new();
    for (strategy, count) in counts {
        if count as f64 > limit {
            warnings.push(format!(
                "{:?} makes up {}/{} constituents, exceeding the {:.0}% concentration limit",
                strategy,
                count,
                n,
                max_strategy_concentration * 100.0
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warns_when_a_single_strategy_dominates() {
        let strategies = vec![
            StrategyType::Arbitrageur,
            StrategyType::Arbitrageur,
            StrategyType::Arbitrageur,
            StrategyType::Hybrid,
        ];
        let warnings = check_strategy_concentration(&strategies, 0.5);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn no_warning_when_evenly_distributed() {
        let strategies = vec![
            StrategyType::Arbitrageur,
            StrategyType::MarketMaker,
            StrategyType::DirectionalMomentum,
            StrategyType::Hybrid,
        ];
        let warnings = check_strategy_concentration(&strategies, 0.5);
        assert!(warnings.is_empty());
    }
}
