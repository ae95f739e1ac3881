//! The five general-purpose anomaly detectors. Each is a pure function over
//! pre-aggregated wallet statistics so the SQL aggregation and the scoring
//! logic can be tested independently.

use smart_money_core::types::{AlertType, Severity};

#[derive(Debug, Clone)]
pub struct AnomalyFinding {
    pub alert_type: AlertType,
    pub severity: Severity,
    pub confidence: f64,
    pub integrity_impact: u8,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
pub struct WalletTradeStats {
    pub win_rate: f64,
    pub total_trades: i64,
    pub inter_trade_interval_mean_secs: f64,
    pub inter_trade_interval_stddev_secs: f64,
    pub largest_market_volume_fraction: f64,
    pub trade_level_sharpe: f64,
    pub longest_consecutive_win_streak: i64,
}

pub fn win_rate_anomaly(stats: &WalletTradeStats) -> Option<AnomalyFinding> {
    if stats.total_trades < 30 || stats.win_rate <= 0.85 {
        return None;
    }
    let (severity, integrity_impact) = if stats.win_rate > 0.98 {
        (Severity::Critical, 30)
    } else if stats.win_rate > 0.95 {
        (Severity::High, 15)
    } else {
        (Severity::Medium, 15)
    };
    Some(AnomalyFinding {
        alert_type: AlertType::WinRateAnomaly,
        severity,
        confidence: 0.85,
        integrity_impact,
        message: format!("win rate {:.1}% over {} trades", stats.win_rate * 100.0, stats.total_trades),
    })
}

pub fn timing_pattern(stats: &WalletTradeStats) -> Option<AnomalyFinding> {
    if stats.inter_trade_interval_mean_secs <= 0.0 || stats.inter_trade_interval_mean_secs >= 5.0 {
        return None;
    }
    let coefficient_of_variation = stats.inter_trade_interval_stddev_secs / stats.inter_trade_interval_mean_secs;
    if coefficient_of_variation >= 0.1 {
        return None;
    }
    Some(AnomalyFinding {
        alert_type: AlertType::TimingPattern,
        severity: Severity::Medium,
        confidence: 0.75,
        integrity_impact: 10,
        message: format!(
            "inter-trade interval mean {:.2}s, cv {:.3} suggests automated timing",
            stats.inter_trade_interval_mean_secs, coefficient_of_variation
        ),
    })
}

pub fn volume_concentration(stats: &WalletTradeStats) -> Option<AnomalyFinding> {
    if stats.total_trades < 100 || stats.largest_market_volume_fraction < 1.0 {
        return None;
    }
    Some(AnomalyFinding {
        alert_type: AlertType::VolumeConcentration,
        severity: Severity::Low,
        confidence: 0.60,
        integrity_impact: 5,
        message: "all volume concentrated in a single market".to_string(),
    })
}

pub fn impossible_sharpe(stats: &WalletTradeStats) -> Option<AnomalyFinding> {
    if stats.total_trades < 30 || stats.trade_level_sharpe <= 5.0 {
        return None;
    }
    Some(AnomalyFinding {
        alert_type: AlertType::ImpossibleSharpe,
        severity: Severity::High,
        confidence: 0.80,
        integrity_impact: 25,
        message: format!("trade-level Sharpe of {:.2} exceeds plausible bounds", stats.trade_level_sharpe),
    })
}

pub fn consecutive_wins(stats: &WalletTradeStats) -> Option<AnomalyFinding> {
    if stats.total_trades < 20 || stats.longest_consecutive_win_streak <= 20 {
        return None;
    }
    Some(AnomalyFinding {
        alert_type: AlertType::ConsecutiveWins,
        severity: Severity::Medium,
        confidence: 0.70,
        integrity_impact: 15,
        message: format!("longest winning streak of {} trades", stats.longest_consecutive_win_streak),
    })
}

pub fn run_all(stats: &WalletTradeStats) -> Vec<AnomalyFinding> {
    [
        win_rate_anomaly(stats),
        timing_pattern(stats),
        volume_concentration(stats),
        impossible_sharpe(stats),
        consecutive_wins(stats),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_stats() -> WalletTradeStats {
        WalletTradeStats {
            win_rate: 0.55,
            total_trades: 100,
            inter_trade_interval_mean_secs: 3_600.0,
            inter_trade_interval_stddev_secs: 1_200.0,
            largest_market_volume_fraction: 0.3,
            trade_level_sharpe: 1.2,
            longest_consecutive_win_streak: 5,
        }
    }

    #[test]
    fn clean_wallet_triggers_nothing() {
        assert!(run_all(&clean_stats()).is_empty());
    }

    #[test]
    fn win_rate_escalates_with_threshold() {
        let mut stats = clean_stats();
        stats.win_rate = 0.90;
        assert_eq!(win_rate_anomaly(&stats).unwrap().severity, Severity::Medium);
        stats.win_rate = 0.96;
        assert_eq!(win_rate_anomaly(&stats).unwrap().severity, Severity::High);
        stats.win_rate = 0.99;
        let finding = win_rate_anomaly(&stats).unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.integrity_impact, 30);
    }

    #[test]
    fn win_rate_requires_minimum_sample_size() {
        let mut stats = clean_stats();
        stats.win_rate = 0.99;
        stats.total_trades = 10;
        assert!(win_rate_anomaly(&stats).is_none());
    }

    #[test]
    fn bot_like_timing_is_flagged() {
        let mut stats = clean_stats();
        stats.inter_trade_interval_mean_secs = 2.0;
        stats.inter_trade_interval_stddev_secs = 0.1;
        assert!(timing_pattern(&stats).is_some());
    }

    #[test]
    fn impossible_sharpe_requires_both_thresholds() {
        let mut stats = clean_stats();
        stats.trade_level_sharpe = 6.0;
        stats.total_trades = 10;
        assert!(impossible_sharpe(&stats).is_none());
        stats.total_trades = 40;
        assert!(impossible_sharpe(&stats).is_some());
    }
}
