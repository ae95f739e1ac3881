//! Piecewise scoring ladders for the four composite subscores.
//!
//! Each ladder returns a value in `[0, 100]`. Boundaries are deliberately
//! generous at the low end (a brand-new wallet with a handful of trades
//! should not floor to zero) and saturate at the top so that a single
//! outlier metric cannot dominate the composite.

/// Profitability from absolute P&L, for cohorts too small to rank by
/// percentile (fewer than 10 peers).
pub fn profitability_ladder(total_pnl: f64) -> f64 {
    if total_pnl <= 0.0 {
        return 20.0 * (1.0 + (total_pnl / 1000.0)).clamp(0.0, 1.0);
    }
    if total_pnl < 1_000.0 {
        35.0 + (total_pnl / 1_000.0) * 10.0
    } else if total_pnl < 5_000.0 {
        45.0 + ((total_pnl - 1_000.0) / 4_000.0) * 15.0
    } else if total_pnl < 20_000.0 {
        60.0 + ((total_pnl - 5_000.0) / 15_000.0) * 15.0
    } else if total_pnl < 100_000.0 {
        75.0 + ((total_pnl - 20_000.0) / 80_000.0) * 15.0
    } else {
        90.0 + ((total_pnl - 100_000.0) / 900_000.0 * 10.0).min(10.0)
    }
}

/// Profitability from percentile rank within the scored cohort, used once
/// the cohort has at least 10 peers.
pub fn profitability_percentile(pnl: f64, peer_pnls: &[f64]) -> f64 {
    if peer_pnls.is_empty() {
        return profitability_ladder(pnl);
    }
    let below = peer_pnls.iter().filter(|&&p| p < pnl).count();
    (below as f64 / peer_pnls.len() as f64) * 100.0
}

const MIN_PEERS_FOR_PERCENTILE: usize = 10;

pub fn profitability(total_pnl: f64, peer_pnls: &[f64]) -> f64 {
    if peer_pnls.len() >= MIN_PEERS_FOR_PERCENTILE {
        profitability_percentile(total_pnl, peer_pnls)
    } else {
        profitability_ladder(total_pnl)
    }
}

fn avg_size_bonus(avg_trade_size: f64) -> f64 {
    if avg_trade_size <= 100.0 {
        20.0
    } else if avg_trade_size <= 500.0 {
        15.0
    } else if avg_trade_size <= 2_000.0 {
        10.0
    } else if avg_trade_size <= 10_000.0 {
        5.0
    } else {
        0.0
    }
}

fn market_diversity_bonus(unique_markets: i64) -> f64 {
    if unique_markets >= 20 {
        30.0
    } else if unique_markets >= 10 {
        20.0
    } else if unique_markets >= 5 {
        15.0
    } else if unique_markets >= 2 {
        5.0
    } else {
        0.0
    }
}

/// Rewards small average position size (less market-moving, more
/// repeatable) and diversification across markets.
pub fn risk_adjusted(avg_trade_size: f64, unique_markets: i64) -> f64 {
    (50.0 + avg_size_bonus(avg_trade_size) + market_diversity_bonus(unique_markets)).min(100.0)
}

fn balance_bonus(buy_count: i64, sell_count: i64) -> f64 {
    let total = buy_count + sell_count;
    if total == 0 {
        return 0.0;
    }
    let avg = total as f64 / 2.0;
    let balance = buy_count.min(sell_count) as f64 / avg;
    balance * 35.0
}

fn days_active_bonus(days_active: i64) -> f64 {
    ((days_active as f64 / 30.0) * 20.0).min(20.0)
}

fn frequency_bonus(trades_per_day: f64) -> f64 {
    if trades_per_day >= 1.0 {
        20.0
    } else {
        trades_per_day * 20.0
    }
}

/// Trade frequency + buy/sell balance + tenure.
pub fn consistency(total_trades: i64, buy_count: i64, sell_count: i64, days_active: i64) -> f64 {
    let days = days_active.max(1);
    let trades_per_day = total_trades as f64 / days as f64;
    (days_active_bonus(days_active) + balance_bonus(buy_count, sell_count) + frequency_bonus(trades_per_day))
        .min(100.0)
}

fn volume_bonus(total_volume: f64) -> f64 {
    if total_volume >= 1_000_000.0 {
        60.0
    } else if total_volume >= 100_000.0 {
        40.0
    } else if total_volume >= 10_000.0 {
        20.0
    } else if total_volume >= 1_000.0 {
        10.0
    } else {
        0.0
    }
}

/// Tenure + volume + market breadth.
pub fn track_record(days_active: i64, total_volume: f64, unique_markets: i64) -> f64 {
    let tenure_bonus = ((days_active as f64 / 30.0) * 15.0).min(15.0);
    let markets_bonus = if unique_markets >= 5 { 10.0 } else { unique_markets as f64 * 2.0 };
    (tenure_bonus + volume_bonus(total_volume) + markets_bonus).min(100.0)
}
