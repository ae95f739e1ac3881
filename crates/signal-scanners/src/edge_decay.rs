//! Compares a wallet's trailing 7-day window against its preceding 30-day
//! window, looking for signs its edge is fading. Informational only — this
//! never feeds back into scoring.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecaySeverity {
    None,
    EarlyWarning,
    Moderate,
    Severe,
    Critical,
}

impl DecaySeverity {
    pub fn from_score(decay_score: f64) -> Self {
        if decay_score >= 80.0 {
            DecaySeverity::Critical
        } else if decay_score >= 60.0 {
            DecaySeverity::Severe
        } else if decay_score >= 40.0 {
            DecaySeverity::Moderate
        } else if decay_score >= 20.0 {
            DecaySeverity::EarlyWarning
        } else {
            DecaySeverity::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPriority {
    Urgent,
    High,
    Medium,
}

impl DecaySeverity {
    pub fn dispatch_priority(decay_score: f64) -> DispatchPriority {
        if decay_score >= 60.0 {
            DispatchPriority::Urgent
        } else if decay_score >= 40.0 {
            DispatchPriority::High
        } else {
            DispatchPriority::Medium
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WindowStats {
    pub win_rate: f64,
    pub sharpe: f64,
    pub pnl_per_trade: f64,
    pub complete_set_ratio: f64,
    pub direction_bias: f64,
    pub trades: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct DecaySignal {
    pub win_rate_drop: f64,
    pub sharpe_drop: f64,
    pub pnl_per_trade_drop: f64,
    pub strategy_drift: f64,
    pub decay_score: f64,
    pub severity: DecaySeverity,
}

/// Each component contributes 0-25 points to a 0-100 decay score: a
/// proportional drop, floored at zero so an improving wallet never scores
/// negative, capped at the component's share of the total.
fn component_score(recent: f64, historical: f64, weight: f64) -> f64 {
    if historical <= 0.0 {
        return 0.0;
    }
    let drop = ((historical - recent) / historical).clamp(0.0, 1.0);
    drop * weight
}

pub fn evaluate_decay(recent: &WindowStats, historical: &WindowStats) -> Option<DecaySignal> {
    if recent.trades < 5 || historical.trades < 10 {
        return None;
    }

    let win_rate_drop = component_score(recent.win_rate, historical.win_rate, 25.0);
    let sharpe_drop = component_score(recent.sharpe, historical.sharpe, 25.0);
    let pnl_per_trade_drop = component_score(recent.pnl_per_trade, historical.pnl_per_trade, 25.0);

    let complete_set_drift = (recent.complete_set_ratio - historical.complete_set_ratio).abs();
    let direction_drift = (recent.direction_bias - historical.direction_bias).abs();
    let strategy_drift = (complete_set_drift.max(direction_drift) * 2.0).min(1.0) * 25.0;

    let decay_score = (win_rate_drop + sharpe_drop + pnl_per_trade_drop + strategy_drift).min(100.0);
    let severity = DecaySeverity::from_score(decay_score);
    if severity == DecaySeverity::None {
        return None;
    }

    Some(DecaySignal {
        win_rate_drop,
        sharpe_drop,
        pnl_per_trade_drop,
        strategy_drift,
        decay_score,
        severity,
    })
}
