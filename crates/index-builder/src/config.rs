use smart_money_core::types::{MarketCategory, StrategyType, WeightingMethod};

#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub index_id: String,
    pub min_total_score: f64,
    pub min_trades: i64,
    pub min_days_active: i64,
    pub min_volume: f64,
    pub min_sharpe: f64,
    /// Non-empty acts as a whitelist; empty means no strategy restriction.
    pub allowed_strategies: Vec<StrategyType>,
    /// Always enforced, even when `allowed_strategies` is empty.
    pub excluded_strategies: Vec<StrategyType>,
    /// When true, latency-dependent strategies are excluded regardless of
    /// the lists above.
    pub is_replication_index: bool,
    pub required_categories: Vec<MarketCategory>,
    pub min_category_concentration: f64,
    pub num_constituents: usize,
    pub weighting_method: WeightingMethod,
    pub max_weight_per_trader: f64,
    pub max_strategy_concentration: f64,
}

impl IndexConfig {
    pub fn effectively_excluded_strategies(&self) -> Vec<StrategyType> {
        let mut excluded = self.excluded_strategies.clone();
        if self.is_replication_index {
            for s in StrategyType::LATENCY_DEPENDENT {
                if !excluded.contains(&s) {
                    excluded.push(s);
                }
            }
        }
        excluded
    }
}
