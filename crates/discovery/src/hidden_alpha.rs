//! Four independent discovery methods surfacing wallets the public
//! leaderboard's top-score ranking alone would miss.

use chrono::Utc;
use smart_money_core::types::{DiscoveryType, HiddenAlphaDiscovery};

pub const HIDDEN_VOLUME_CEILING: f64 = 50_000.0;
pub const MAX_DISCOVERIES_PER_TYPE: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct WalletSignals {
    pub sharpe: f64,
    pub total_trades: i64,
    pub total_volume: f64,
    pub days_active: i64,
    pub win_rate: f64,
    pub category_volume_fraction: f64,
    pub category_relative_edge: f64,
    pub total_score: f64,
    pub consensus_divergence_pct: f64,
    pub is_profitable: bool,
    /// Consistency and track-record ladder scores (0-100) from the composite scorer.
    pub consistency_score: f64,
    pub track_record_score: f64,
    /// Confidence the classifier assigned the wallet's current strategy label (0-100).
    pub strategy_confidence: f64,
    pub recent_win_rate: f64,
    pub historical_win_rate: f64,
}

fn discovery(
    wallet_id: &str,
    discovery_type: DiscoveryType,
    discovery_score: f64,
    visibility_score: f64,
    discovery_reason: String,
    standout_metrics: serde_json::Value,
) -> HiddenAlphaDiscovery {
    HiddenAlphaDiscovery {
        wallet_id: wallet_id.to_string(),
        discovery_type,
        discovery_score: discovery_score.clamp(0.0, 100.0),
        visibility_score,
        discovery_reason,
        standout_metrics,
        discovered_at: Utc::now(),
    }
}

pub fn hidden_gem(wallet_id: &str, s: &WalletSignals) -> Option<HiddenAlphaDiscovery> {
    if s.sharpe < 1.5 || s.total_trades < 30 || s.total_volume >= HIDDEN_VOLUME_CEILING {
        return None;
    }
    let score = (s.sharpe / 10.0 * 60.0 + (1.0 - s.total_volume / HIDDEN_VOLUME_CEILING) * 40.0).min(100.0);
    Some(discovery(
        wallet_id,
        DiscoveryType::HiddenGem,
        score,
        s.total_score,
        format!("Sharpe {:.2} over {} trades on only ${:.0} volume", s.sharpe, s.total_trades, s.total_volume),
        serde_json::json!({ "sharpe": s.sharpe, "total_volume": s.total_volume }),
    ))
}

pub fn rising_star(wallet_id: &str, s: &WalletSignals) -> Option<HiddenAlphaDiscovery> {
    if s.days_active > 30 || s.win_rate < 0.60 || s.sharpe < 1.0 {
        return None;
    }
    let score = (s.win_rate * 60.0 + (s.sharpe / 10.0 * 40.0)).min(100.0);
    Some(discovery(
        wallet_id,
        DiscoveryType::RisingStar,
        score,
        s.total_score,
        format!("{:.0}% win rate and Sharpe {:.2} in the first {} days", s.win_rate * 100.0, s.sharpe, s.days_active),
        serde_json::json!({ "win_rate": s.win_rate, "days_active": s.days_active }),
    ))
}

pub fn niche_specialist(wallet_id: &str, s: &WalletSignals) -> Option<HiddenAlphaDiscovery> {
    if s.category_volume_fraction < 0.70 || s.category_relative_edge < 20.0 {
        return None;
    }
    let score = (s.category_volume_fraction * 40.0 + (s.category_relative_edge / 100.0 * 60.0)).min(100.0);
    Some(discovery(
        wallet_id,
        DiscoveryType::NicheSpecialist,
        score,
        s.total_score,
        format!(
            "{:.0}% of volume in one category, {:.1} points above cohort average there",
            s.category_volume_fraction * 100.0, s.category_relative_edge
        ),
        serde_json::json!({ "category_volume_fraction": s.category_volume_fraction, "category_relative_edge": s.category_relative_edge }),
    ))
}

pub fn contrarian(wallet_id: &str, s: &WalletSignals) -> Option<HiddenAlphaDiscovery> {
    if !s.is_profitable || s.consensus_divergence_pct < 30.0 {
        return None;
    }
    let score = (s.consensus_divergence_pct / 100.0 * 70.0 + (s.total_score / 100.0 * 30.0)).min(100.0);
    Some(discovery(
        wallet_id,
        DiscoveryType::Contrarian,
        score,
        s.total_score,
        format!("Profitable while diverging {:.0} points from consensus", s.consensus_divergence_pct),
        serde_json::json!({ "consensus_divergence_pct": s.consensus_divergence_pct }),
    ))
}

/// Runs all four methods for one wallet and returns whichever fired.
pub fn discover_wallet(wallet_id: &str, s: &WalletSignals) -> Vec<HiddenAlphaDiscovery> {
    [hidden_gem(wallet_id, s), rising_star(wallet_id, s), niche_specialist(wallet_id, s), contrarian(wallet_id, s)]
        .into_iter()
        .flatten()
        .collect()
}

/// Merges discoveries across wallets, sorts by score descending, and caps
/// each discovery type at `MAX_DISCOVERIES_PER_TYPE`.
pub fn merge_and_cap(mut discoveries: Vec<HiddenAlphaDiscovery>) -> Vec<HiddenAlphaDiscovery> {
    discoveries.sort_by(|a, b| b.discovery_score.partial_cmp(&a.discovery_score).unwrap_or(std::cmp::Ordering::Equal));

    let mut counts = std::collections::HashMap::new();
    discoveries
        .into_iter()
        .filter(|d| {
            let count = counts.entry(d.discovery_type).or_insert(0usize);
            *count += 1;
            *count <= MAX_DISCOVERIES_PER_TYPE
        })
        .collect()
}

/// Shared fixture exposed so `edge_persistence`'s tests can build a
/// `WalletSignals` without duplicating every field default.
#[cfg(test)]
pub mod test_support {
    use super::WalletSignals;

    pub fn base_signals() -> WalletSignals {
        WalletSignals {
            sharpe: 0.0,
            total_trades: 0,
            total_volume: 0.0,
            days_active: 100,
            win_rate: 0.0,
            category_volume_fraction: 0.0,
            category_relative_edge: 0.0,
            total_score: 50.0,
            consensus_divergence_pct: 0.0,
            is_profitable: false,
            consistency_score: 50.0,
            track_record_score: 50.0,
            strategy_confidence: 50.0,
            recent_win_rate: 0.5,
            historical_win_rate: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::base_signals;

    #[test]
    fn hidden_gem_requires_low_volume_and_good_sharpe() {
        let mut s = base_signals();
        s.sharpe = 2.0;
        s.total_trades = 40;
        s.total_volume = 10_000.0;
        assert!(hidden_gem("w1", &s).is_some());

        s.total_volume = 100_000.0;
        assert!(hidden_gem("w1", &s).is_none());
    }

    #[test]
    fn rising_star_requires_short_tenure() {
        let mut s = base_signals();
        s.days_active = 15;
        s.win_rate = 0.70;
        s.sharpe = 1.2;
        assert!(rising_star("w1", &s).is_some());

        s.days_active = 60;
        assert!(rising_star("w1", &s).is_none());
    }

    #[test]
    fn contrarian_requires_profitability_and_divergence() {
        let mut s = base_signals();
        s.is_profitable = true;
        s.consensus_divergence_pct = 40.0;
        assert!(contrarian("w1", &s).is_some());

        s.is_profitable = false;
        assert!(contrarian("w1", &s).is_none());
    }

    #[test]
    fn merge_and_cap_limits_each_discovery_type() {
        let discoveries: Vec<HiddenAlphaDiscovery> = (0..15)
            .map(|i| {
                let mut s = base_signals();
                s.sharpe = 2.0;
                s.total_trades = 40;
                s.total_volume = 1_000.0 + i as f64;
                hidden_gem(&format!("w{i}"), &s).unwrap()
            })
            .collect();
        let merged = merge_and_cap(discoveries);
        assert_eq!(merged.len(), MAX_DISCOVERIES_PER_TYPE);
    }

    #[test]
    fn merge_and_cap_sorts_by_score_descending() {
        let mut low_signals = base_signals();
        low_signals.sharpe = 1.5;
        low_signals.total_trades = 30;
        low_signals.total_volume = 49_000.0;

        let mut high_signals = base_signals();
        high_signals.sharpe = 9.0;
        high_signals.total_trades = 30;
        high_signals.total_volume = 100.0;

        let discoveries = vec![hidden_gem("low", &low_signals).unwrap(), hidden_gem("high", &high_signals).unwrap()];
        let merged = merge_and_cap(discoveries);
        assert_eq!(merged[0].wallet_id, "high");
    }
}
