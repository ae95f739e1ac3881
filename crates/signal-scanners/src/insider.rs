//! Insider-pattern detection. Six subtypes, all excluded for short-horizon
//! crypto price markets: a 15-minute or hourly up/down market resolves
//! against a public price feed, so no one can have non-public information
//! about it.

use smart_money_core::types::{AlertType, Severity};

/// Glob-style patterns checked with a NOT-LIKE conjunction; `%` matches any
/// run of characters, matching SQL LIKE semantics.
pub const SHORT_HORIZON_EXCLUSION_PATTERNS: &[&str] = &[
    "%-up-or-down-15-minute%",
    "%-up-or-down-hourly%",
    "%-up-or-down-1-hour%",
    "%-15m-%",
    "%-1h-%",
];

pub fn is_short_horizon_market(slug: &str) -> bool {
    SHORT_HORIZON_EXCLUSION_PATTERNS.iter().any(|pattern| glob_like_match(pattern, slug))
}

fn glob_like_match(pattern: &str, value: &str) -> bool {
    let parts: Vec<&str> = pattern.split('%').collect();
    if parts.len() == 1 {
        return pattern == value;
    }
    let mut remaining = value;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            if !remaining.starts_with(part) {
                return false;
            }
            remaining = &remaining[part.len()..];
        } else if i == parts.len() - 1 {
            return remaining.ends_with(part);
        } else if let Some(pos) = remaining.find(part) {
            remaining = &remaining[pos + part.len()..];
        } else {
            return false;
        }
    }
    true
}

#[derive(Debug, Clone)]
pub struct InsiderFinding {
    pub alert_type: AlertType,
    pub severity: Severity,
    pub confidence: f64,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
pub struct NewAccountWhaleInput {
    pub account_age_days: i64,
    pub max_single_market_bet: f64,
    pub concentration: f64,
}

pub fn new_account_whale(input: &NewAccountWhaleInput) -> Option<InsiderFinding> {
    if input.account_age_days > 7 || input.max_single_market_bet < 5_000.0 || input.concentration < 0.8 {
        return None;
    }
    Some(InsiderFinding {
        alert_type: AlertType::NewAccountWhale,
        severity: Severity::High,
        confidence: 0.70,
        message: format!(
            "{}-day-old account placed a ${:.0} concentrated bet",
            input.account_age_days, input.max_single_market_bet
        ),
    })
}

#[derive(Debug, Clone, Copy)]
pub struct VolumeSpikeInput {
    pub recent_volume: f64,
    pub historical_daily_average: f64,
    pub directional_imbalance: f64,
}

pub fn volume_spike(input: &VolumeSpikeInput) -> Option<InsiderFinding> {
    if input.historical_daily_average <= 0.0 {
        return None;
    }
    let ratio = input.recent_volume / input.historical_daily_average;
    if ratio < 10.0 || input.directional_imbalance < 0.7 {
        return None;
    }
    Some(InsiderFinding {
        alert_type: AlertType::VolumeSpike,
        severity: Severity::Medium,
        confidence: 0.65,
        message: format!("volume {:.1}x historical average with {:.0}% directional imbalance", ratio, input.directional_imbalance * 100.0),
    })
}

#[derive(Debug, Clone, Copy)]
pub struct SmartMoneyDivergenceInput {
    pub top_wallets_against_consensus: i64,
}

pub fn smart_money_divergence(input: &SmartMoneyDivergenceInput) -> Option<InsiderFinding> {
    if input.top_wallets_against_consensus < 3 {
        return None;
    }
    Some(InsiderFinding {
        alert_type: AlertType::SmartMoneyDivergence,
        severity: Severity::Medium,
        confidence: 0.65,
        message: format!("{} top-100 wallets betting against the 7-day consensus", input.top_wallets_against_consensus),
    })
}

#[derive(Debug, Clone, Copy)]
pub struct WhaleAnomalyInput {
    pub is_known_large_volume_wallet: bool,
    pub is_first_entry_to_market: bool,
    pub bet_size: f64,
}

pub fn whale_anomaly(input: &WhaleAnomalyInput) -> Option<InsiderFinding> {
    if !input.is_known_large_volume_wallet || !input.is_first_entry_to_market || input.bet_size < 5_000.0 {
        return None;
    }
    Some(InsiderFinding {
        alert_type: AlertType::WhaleAnomaly,
        severity: Severity::High,
        confidence: 0.70,
        message: format!("known whale's first entry into this market, ${:.0}", input.bet_size),
    })
}

#[derive(Debug, Clone, Copy)]
pub struct CoordinatedEntryInput {
    pub distinct_wallets: i64,
    pub window_minutes: i64,
    pub total_volume: f64,
}

pub fn coordinated_entry(input: &CoordinatedEntryInput) -> Option<InsiderFinding> {
    if input.distinct_wallets < 3 || input.window_minutes > 120 || input.total_volume < 10_000.0 {
        return None;
    }
    Some(InsiderFinding {
        alert_type: AlertType::CoordinatedEntry,
        severity: Severity::High,
        confidence: 0.75,
        message: format!(
            "{} wallets entered the same direction within {} minutes, ${:.0} total",
            input.distinct_wallets, input.window_minutes, input.total_volume
        ),
    })
}

#[derive(Debug, Clone, Copy)]
pub struct LateEntryConvictionInput {
    pub bet_size: f64,
    pub is_first_entry_to_market: bool,
    pub volume_ratio_vs_historical: f64,
}

pub fn late_entry_conviction(input: &LateEntryConvictionInput) -> Option<InsiderFinding> {
    if input.bet_size < 10_000.0 {
        return None;
    }
    if !input.is_first_entry_to_market && input.volume_ratio_vs_historical < 2.0 {
        return None;
    }
    Some(InsiderFinding {
        alert_type: AlertType::LateEntryConviction,
        severity: Severity::High,
        confidence: 0.70,
        message: format!("${:.0} conviction bet late in the market's lifecycle", input.bet_size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_horizon_slugs_are_recognized() {
        assert!(is_short_horizon_market("bitcoin-up-or-down-15-minute-730"));
        assert!(!is_short_horizon_market("will-candidate-x-win-election"));
    }

    #[test]
    fn new_account_whale_requires_all_three_conditions() {
        let mut input = NewAccountWhaleInput { account_age_days: 2, max_single_market_bet: 6_000.0, concentration: 0.9 };
        assert!(new_account_whale(&input).is_some());
        input.concentration = 0.5;
        assert!(new_account_whale(&input).is_none());
    }

    #[test]
    fn volume_spike_needs_both_magnitude_and_direction() {
        let mut input = VolumeSpikeInput { recent_volume: 50_000.0, historical_daily_average: 1_000.0, directional_imbalance: 0.9 };
        assert!(volume_spike(&input).is_some());
        input.directional_imbalance = 0.5;
        assert!(volume_spike(&input).is_none());
    }

    #[test]
    fn coordinated_entry_rejects_wide_time_windows() {
        let input = CoordinatedEntryInput { distinct_wallets: 4, window_minutes: 180, total_volume: 20_000.0 };
        assert!(coordinated_entry(&input).is_none());
    }

    #[test]
    fn late_entry_conviction_accepts_first_entry_or_volume_surge() {
        let first_entry = LateEntryConvictionInput { bet_size: 15_000.0, is_first_entry_to_market: true, volume_ratio_vs_historical: 0.5 };
        assert!(late_entry_conviction(&first_entry).is_some());

        let surge = LateEntryConvictionInput { bet_size: 15_000.0, is_first_entry_to_market: false, volume_ratio_vs_historical: 3.0 };
        assert!(late_entry_conviction(&surge).is_some());

        let neither = LateEntryConvictionInput { bet_size: 15_000.0, is_first_entry_to_market: false, volume_ratio_vs_historical: 1.0 };
        assert!(late_entry_conviction(&neither).is_none());
    }
}
