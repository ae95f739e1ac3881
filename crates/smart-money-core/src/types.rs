//! Core data model shared by every stage of the pipeline.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

/// A single on-chain trade. Read-only input to the pipeline; produced upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub ts: DateTime<Utc>,
    pub wallet_id: String,
    pub display_name: Option<String>,
    pub market_id: String,
    pub market_slug: String,
    pub condition_id: String,
    pub outcome_label: String,
    pub outcome_index: i32,
    pub side: Side,
    pub price: Decimal,
    pub size: Decimal,
    pub notional: Decimal,
    pub tx_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketResolution {
    pub condition_id: String,
    pub market_slug: String,
    pub title: String,
    pub is_resolved: bool,
    pub winning_outcome_label: Option<String>,
    pub winning_outcome_index: Option<i32>,
    pub outcome_prices: Vec<f64>,
    pub outcomes: Vec<String>,
    pub end_time: Option<DateTime<Utc>>,
    pub resolution_time: Option<DateTime<Utc>>,
}

impl MarketResolution {
    /// A market is resolved iff exactly one outcome price is at or above the
    /// settlement threshold.
    pub fn winning_index(prices: &[f64]) -> Option<usize> {
        prices.iter().position(|&p| p >= 0.99)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionPnl {
    pub wallet_id: String,
    pub condition_id: String,
    pub outcome_index: i32,
    pub net_shares: Decimal,
    pub net_cost: Decimal,
    pub avg_entry_price: Decimal,
    pub settlement_price: Decimal,
    pub realized_pnl: Decimal,
    pub buy_count: i64,
    pub sell_count: i64,
    pub first_trade_at: DateTime<Utc>,
    pub last_trade_at: DateTime<Utc>,
    pub resolved_at: DateTime<Utc>,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WalletPnl {
    pub total_realized_pnl: Decimal,
    pub positions_closed: i64,
    pub wins: i64,
    pub losses: i64,
}

impl WalletPnl {
    pub fn win_rate(&self) -> f64 {
        if self.positions_closed > 0 {
            self.wins as f64 / self.positions_closed as f64
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    Good,
    Partial,
    PnlCalculated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletProfile {
    pub wallet_id: String,
    pub total_trades: i64,
    pub total_volume: Decimal,
    pub unique_markets: i64,
    pub first_trade_at: DateTime<Utc>,
    pub last_trade_at: DateTime<Utc>,
    pub days_active: i64,
    pub buy_count: i64,
    pub sell_count: i64,
    pub avg_trade_size: Decimal,
    pub avg_price: Decimal,
    pub complete_set_ratio: f64,
    pub direction_bias: f64,
    pub total_pnl: Decimal,
    pub updated_at: DateTime<Utc>,
    pub data_quality: DataQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl Tier {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Tier::Diamond
        } else if score >= 60.0 {
            Tier::Gold
        } else if score >= 40.0 {
            Tier::Silver
        } else {
            Tier::Bronze
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    Arbitrageur,
    MarketMaker,
    DirectionalMomentum,
    /// Not produced by the classifier; reserved for the replication-index
    /// exclusion list alongside Arbitrageur and MarketMaker.
    Scalper,
    Hybrid,
    Unknown,
}

impl StrategyType {
    /// Strategies that earn on latency and cannot be copied with a delay.
    pub const LATENCY_DEPENDENT: [StrategyType; 3] =
        [StrategyType::Arbitrageur, StrategyType::MarketMaker, StrategyType::Scalper];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletScore {
    pub wallet_id: String,
    pub total_score: f64,
    pub tier: Tier,
    pub profitability: f64,
    pub risk_adjusted: f64,
    pub consistency: f64,
    pub track_record: f64,
    pub strategy_type: StrategyType,
    pub strategy_confidence: f64,
    pub rank: Option<i64>,
    pub calculated_at: DateTime<Utc>,
    pub model_version: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WalletSharpe {
    pub sharpe_ratio: f64,
    pub sharpe_capped: f64,
    pub mean_daily_pnl: f64,
    pub std_daily_pnl: f64,
    pub max_drawdown: f64,
    pub days_with_pnl: i64,
    pub confidence: f64,
}

impl WalletSharpe {
    pub const MAX_SHARPE_RATIO: f64 = 10.0;
    pub const HIGH_CONFIDENCE_DAYS: f64 = 30.0;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingMethod {
    Equal,
    ScoreWeighted,
    SharpeWeighted,
    VolumeWeighted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConstituent {
    pub wallet_id: String,
    pub weight: f64,
    pub score_at_inclusion: f64,
    pub sharpe_at_inclusion: f64,
    pub strategy_type: StrategyType,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    pub index_id: String,
    pub constituents: Vec<IndexConstituent>,
    pub created_at: DateTime<Utc>,
    pub last_rebalanced: DateTime<Utc>,
    pub cumulative_return: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn order(&self) -> u8 {
        match self {
            Severity::Low => 0,
            Severity::Medium => 1,
            Severity::High => 2,
            Severity::Critical => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    ConsensusSignal,
    EdgeDecay,
    WinRateAnomaly,
    TimingPattern,
    VolumeConcentration,
    ImpossibleSharpe,
    ConsecutiveWins,
    NewAccountWhale,
    VolumeSpike,
    SmartMoneyDivergence,
    WhaleAnomaly,
    CoordinatedEntry,
    LateEntryConviction,
    HiddenGem,
    RisingStar,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub wallet_id: Option<String>,
    pub market_id: Option<String>,
    pub direction: Option<String>,
    pub volume: Option<f64>,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketCategory {
    Crypto,
    Politics,
    Sports,
    News,
    Entertainment,
    Economics,
    Science,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketClassification {
    pub market_slug: String,
    pub category: MarketCategory,
    pub confidence: f64,
    pub matched_patterns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryType {
    HiddenGem,
    RisingStar,
    NicheSpecialist,
    Contrarian,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiddenAlphaDiscovery {
    pub wallet_id: String,
    pub discovery_type: DiscoveryType,
    pub discovery_score: f64,
    pub visibility_score: f64,
    pub discovery_reason: String,
    pub standout_metrics: serde_json::Value,
    pub discovered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PersistenceRisk {
    Low,
    Moderate,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EdgePersistence {
    pub probability_30d: f64,
    pub probability_60d: f64,
    pub probability_90d: f64,
    pub risk: PersistenceRisk,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_inclusive_on_the_low_end() {
        assert_eq!(Tier::from_score(39.9), Tier::Bronze);
        assert_eq!(Tier::from_score(40.0), Tier::Silver);
        assert_eq!(Tier::from_score(59.9), Tier::Silver);
        assert_eq!(Tier::from_score(60.0), Tier::Gold);
        assert_eq!(Tier::from_score(79.9), Tier::Gold);
        assert_eq!(Tier::from_score(80.0), Tier::Diamond);
    }

    #[test]
    fn tier_ordering_is_monotone_in_score() {
        assert!(Tier::Bronze < Tier::Silver);
        assert!(Tier::Silver < Tier::Gold);
        assert!(Tier::Gold < Tier::Diamond);
    }

    #[test]
    fn winning_index_picks_first_outcome_at_or_above_threshold() {
        assert_eq!(MarketResolution::winning_index(&[0.01, 0.99]), Some(1));
        assert_eq!(MarketResolution::winning_index(&[0.5, 0.5]), None);
        assert_eq!(MarketResolution::winning_index(&[1.0, 0.0, 0.0]), Some(0));
    }

    #[test]
    fn wallet_pnl_win_rate_handles_zero_positions() {
        let pnl = WalletPnl::default();
        assert_eq!(pnl.win_rate(), 0.0);
    }
}
