//! Diffing a freshly-built constituent set against the previous index.

use smart_money_core::types::IndexConstituent;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct RebalanceDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// `new` constituents that are carried over from `old` keep `old`'s
/// `added_at`, so tenure in the index survives a rebalance that merely
/// re-weights an existing constituent.
pub fn diff_and_merge(old: &[IndexConstituent], new: &mut [IndexConstituent]) -> RebalanceDiff {
    let old_ids: HashSet<&str> = old.iter().map(|c| c.wallet_id.as_str()).collect();
    let new_ids: HashSet<&str> = new.iter().map(|c| c.wallet_id.as_str()).collect();

    let added = new_ids.difference(&old_ids).map(|s| s.to_string()).collect();
    let removed = old_ids.difference(&new_ids).map(|s| s.to_string()).collect();

    for constituent in new.iter_mut() {
        if let Some(previous) = old.iter().find(|c| c.wallet_id == constituent.wallet_id) {
            constituent.added_at = previous.added_at;
        }
    }

    RebalanceDiff { added, removed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use smart_money_core::types::StrategyType;

    fn constituent(wallet_id: &str) -> IndexConstituent {
        IndexConstituent {
            wallet_id: wallet_id.to_string(),
            weight: 0.1,
            score_at_inclusion: 80.0,
            sharpe_at_inclusion: 1.5,
            strategy_type: StrategyType::Hybrid,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn identifies_added_and_removed_wallets() {
        let old = vec![constituent("a"), constituent("b")];
        let mut new = vec![constituent("b"), constituent("c")];
        let diff = diff_and_merge(&old, &mut new);
        assert_eq!(diff.added, vec!["c".to_string()]);
        assert_eq!(diff.removed, vec!["a".to_string()]);
    }

    #[test]
    fn carried_over_constituents_keep_their_original_added_at() {
        let mut old = vec![constituent("a")];
        old[0].added_at = Utc::now() - chrono::Duration::days(30);
        let original_added_at = old[0].added_at;

        let mut new = vec![constituent("a")];
        diff_and_merge(&old, &mut new);

        assert_eq!(new[0].added_at, original_added_at);
    }
}
