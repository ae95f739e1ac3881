//! Aggregation queries feeding each scanner, and the mapping from scanner
//! findings to persisted `Alert` rows.

use crate::anomaly::{self, WalletTradeStats};
use crate::consensus::{self, Direction, WalletVote};
use crate::edge_decay::{self, WindowStats};
use crate::insider;
use crate::integrity;
use chrono::Utc;
use smart_money_core::types::{Alert, AlertType, Severity};
use smart_money_core::Result;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

fn new_alert(
    alert_type: AlertType,
    severity: Severity,
    title: String,
    message: String,
    wallet_id: Option<String>,
    market_id: Option<String>,
    direction: Option<String>,
    volume: Option<f64>,
    data: serde_json::Value,
) -> Alert {
    Alert {
        alert_id: Uuid::new_v4().to_string(),
        alert_type,
        severity,
        title,
        message,
        wallet_id,
        market_id,
        direction,
        volume,
        data,
        created_at: Utc::now(),
        delivered_at: None,
    }
}

pub async fn run_consensus_scan(pool: &PgPool) -> Result<Vec<Alert>> {
    let rows = sqlx::query(
        r#"
        SELECT
            t.condition_id,
            t.wallet_id,
            t.side,
            t.outcome_index,
            t.volume,
            COALESCE(s.total_score, 0) AS total_score,
            COALESCE(r.winning_outcome_index, -1) AS winning_outcome_index
        FROM trades t
        JOIN smart_money_scores s ON s.wallet_id = t.wallet_id AND s.total_score >= $1
        LEFT JOIN market_resolutions r ON r.condition_id = t.condition_id
        WHERE t.created_at >= NOW() - INTERVAL '48 hours'
          AND (r.is_resolved IS NULL OR r.is_resolved = false)
        "#,
    )
    .bind(consensus::MIN_TOTAL_SCORE)
    .fetch_all(pool)
    .await?;

    let mut by_market: HashMap<String, Vec<WalletVote>> = HashMap::new();
    for row in &rows {
        let condition_id: String = row.try_get("condition_id")?;
        let side: String = row.try_get("side")?;
        let outcome_index: i32 = row.try_get("outcome_index")?;
        let volume: f64 = row.try_get::<f64, _>("volume")?;
        let total_score: f64 = row.try_get("total_score")?;

        // BUY on outcome 0 (YES) or SELL on outcome 1 (NO) both push YES.
        let direction = match (side.as_str(), outcome_index) {
            ("buy", 0) | ("sell", 1) => Some(Direction::Yes),
            ("sell", 0) | ("buy", 1) => Some(Direction::No),
            _ => None,
        };

        by_market.entry(condition_id).or_default().push(WalletVote { direction, volume, total_score });
    }

    let mut alerts = Vec::new();
    for (condition_id, votes) in by_market {
        if let Some(signal) = consensus::evaluate_market(&votes) {
            let direction_str = match signal.direction {
                Direction::Yes => "YES",
                Direction::No => "NO",
            };
            alerts.push(new_alert(
                AlertType::ConsensusSignal,
                Severity::Medium,
                format!("Smart-money consensus: {direction_str}"),
                format!(
                    "{} participants, {:.0}% agreement, confidence {:.2}",
                    signal.participant_count, signal.agreement_pct * 100.0, signal.confidence
                ),
                None,
                Some(condition_id),
                Some(direction_str.to_string()),
                None,
                serde_json::json!({ "strength": format!("{:?}", signal.strength) }),
            ));
        }
    }

    info!(alert_count = alerts.len(), "consensus scan complete");
    Ok(alerts)
}

pub async fn run_edge_decay_scan(pool: &PgPool) -> Result<Vec<Alert>> {
    let rows = sqlx::query(
        r#"
        SELECT
            wallet_id,
            recent_win_rate, recent_sharpe, recent_pnl_per_trade,
            recent_complete_set_ratio, recent_direction_bias, recent_trades,
            historical_win_rate, historical_sharpe, historical_pnl_per_trade,
            historical_complete_set_ratio, historical_direction_bias, historical_trades
        FROM wallet_edge_windows
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut alerts = Vec::new();
    for row in rows {
        let wallet_id: String = row.try_get("wallet_id")?;
        let recent = WindowStats {
            win_rate: row.try_get("recent_win_rate")?,
            sharpe: row.try_get("recent_sharpe")?,
            pnl_per_trade: row.try_get("recent_pnl_per_trade")?,
            complete_set_ratio: row.try_get("recent_complete_set_ratio")?,
            direction_bias: row.try_get("recent_direction_bias")?,
            trades: row.try_get("recent_trades")?,
        };
        let historical = WindowStats {
            win_rate: row.try_get("historical_win_rate")?,
            sharpe: row.try_get("historical_sharpe")?,
            pnl_per_trade: row.try_get("historical_pnl_per_trade")?,
            complete_set_ratio: row.try_get("historical_complete_set_ratio")?,
            direction_bias: row.try_get("historical_direction_bias")?,
            trades: row.try_get("historical_trades")?,
        };

        if let Some(signal) = edge_decay::evaluate_decay(&recent, &historical) {
            alerts.push(new_alert(
                AlertType::EdgeDecay,
                Severity::Medium,
                format!("Edge decay detected: {:?}", signal.severity),
                format!("decay score {:.1}", signal.decay_score),
                Some(wallet_id),
                None,
                None,
                None,
                serde_json::json!({
                    "win_rate_drop": signal.win_rate_drop,
                    "sharpe_drop": signal.sharpe_drop,
                    "pnl_per_trade_drop": signal.pnl_per_trade_drop,
                    "strategy_drift": signal.strategy_drift,
                }),
            ));
        }
    }

    info!(alert_count = alerts.len(), "edge-decay scan complete");
    Ok(alerts)
}

async fn store_integrity_scores(pool: &PgPool, scores: &[(String, integrity::IntegrityScore)]) -> Result<()> {
    for (wallet_id, score) in scores {
        sqlx::query(
            r#"
            INSERT INTO wallet_integrity_scores (wallet_id, score, status, evaluated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (wallet_id) DO UPDATE SET
                score = EXCLUDED.score,
                status = EXCLUDED.status,
                evaluated_at = EXCLUDED.evaluated_at
            "#,
        )
        .bind(wallet_id)
        .bind(score.score as i16)
        .bind(format!("{:?}", score.status).to_uppercase())
        .execute(pool)
        .await?;
    }
    info!(count = scores.len(), "persisted integrity roll-ups");
    Ok(())
}

pub async fn run_anomaly_and_insider_scan(pool: &PgPool) -> Result<Vec<Alert>> {
    let rows = sqlx::query(
        r#"
        SELECT
            wallet_id, win_rate, total_trades, inter_trade_interval_mean_secs,
            inter_trade_interval_stddev_secs, largest_market_volume_fraction,
            trade_level_sharpe, longest_consecutive_win_streak
        FROM wallet_anomaly_stats
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut alerts = Vec::new();
    let mut integrity_scores: Vec<(String, integrity::IntegrityScore)> = Vec::new();
    for row in rows {
        let wallet_id: String = row.try_get("wallet_id")?;
        let stats = WalletTradeStats {
            win_rate: row.try_get("win_rate")?,
            total_trades: row.try_get("total_trades")?,
            inter_trade_interval_mean_secs: row.try_get("inter_trade_interval_mean_secs")?,
            inter_trade_interval_stddev_secs: row.try_get("inter_trade_interval_stddev_secs")?,
            largest_market_volume_fraction: row.try_get("largest_market_volume_fraction")?,
            trade_level_sharpe: row.try_get("trade_level_sharpe")?,
            longest_consecutive_win_streak: row.try_get("longest_consecutive_win_streak")?,
        };

        let findings = anomaly::run_all(&stats);
        integrity_scores.push((wallet_id.clone(), integrity::roll_up(&findings)));

        for finding in findings {
            alerts.push(new_alert(
                finding.alert_type,
                finding.severity,
                format!("{:?}", finding.alert_type),
                finding.message,
                Some(wallet_id.clone()),
                None,
                None,
                None,
                serde_json::json!({ "confidence": finding.confidence, "integrity_impact": finding.integrity_impact }),
            ));
        }
    }
    store_integrity_scores(pool, &integrity_scores).await?;

    // Insider detectors read event-shaped rows rather than per-wallet
    // aggregates; each subtype's trigger query already excludes
    // short-horizon crypto markets in its WHERE clause.
    let insider_rows = sqlx::query(
        r#"
        SELECT
            wallet_id, market_slug, account_age_days, max_single_market_bet,
            concentration, recent_volume, historical_daily_average, directional_imbalance,
            is_known_large_volume_wallet, is_first_entry_to_market, bet_volume_ratio_vs_historical
        FROM wallet_insider_candidates
        WHERE market_slug NOT LIKE ALL($1)
        "#,
    )
    .bind(insider::SHORT_HORIZON_EXCLUSION_PATTERNS.to_vec())
    .fetch_all(pool)
    .await?;

    for row in insider_rows {
        let wallet_id: String = row.try_get("wallet_id")?;
        let market_slug: String = row.try_get("market_slug")?;
        let max_single_market_bet: f64 = row.try_get("max_single_market_bet")?;
        let is_first_entry_to_market: bool = row.try_get("is_first_entry_to_market")?;

        let whale_input = insider::NewAccountWhaleInput {
            account_age_days: row.try_get("account_age_days")?,
            max_single_market_bet,
            concentration: row.try_get("concentration")?,
        };
        if let Some(finding) = insider::new_account_whale(&whale_input) {
            alerts.push(new_alert(
                finding.alert_type,
                finding.severity,
                "New account whale".to_string(),
                finding.message,
                Some(wallet_id.clone()),
                Some(market_slug.clone()),
                None,
                None,
                serde_json::json!({ "confidence": finding.confidence }),
            ));
        }

        let spike_input = insider::VolumeSpikeInput {
            recent_volume: row.try_get("recent_volume")?,
            historical_daily_average: row.try_get("historical_daily_average")?,
            directional_imbalance: row.try_get("directional_imbalance")?,
        };
        if let Some(finding) = insider::volume_spike(&spike_input) {
            alerts.push(new_alert(
                finding.alert_type,
                finding.severity,
                "Volume spike".to_string(),
                finding.message,
                Some(wallet_id.clone()),
                Some(market_slug.clone()),
                None,
                None,
                serde_json::json!({ "confidence": finding.confidence }),
            ));
        }

        let whale_anomaly_input = insider::WhaleAnomalyInput {
            is_known_large_volume_wallet: row.try_get("is_known_large_volume_wallet")?,
            is_first_entry_to_market,
            bet_size: max_single_market_bet,
        };
        if let Some(finding) = insider::whale_anomaly(&whale_anomaly_input) {
            alerts.push(new_alert(
                finding.alert_type,
                finding.severity,
                "Whale anomaly".to_string(),
                finding.message,
                Some(wallet_id.clone()),
                Some(market_slug.clone()),
                None,
                None,
                serde_json::json!({ "confidence": finding.confidence }),
            ));
        }

        let late_entry_input = insider::LateEntryConvictionInput {
            bet_size: max_single_market_bet,
            is_first_entry_to_market,
            volume_ratio_vs_historical: row.try_get("bet_volume_ratio_vs_historical")?,
        };
        if let Some(finding) = insider::late_entry_conviction(&late_entry_input) {
            alerts.push(new_alert(
                finding.alert_type,
                finding.severity,
                "Late-entry conviction".to_string(),
                finding.message,
                Some(wallet_id),
                Some(market_slug),
                None,
                None,
                serde_json::json!({ "confidence": finding.confidence }),
            ));
        }
    }

    let divergence_rows = sqlx::query(
        r#"
        SELECT condition_id, market_slug, top_wallets_against_consensus
        FROM market_smart_money_divergence
        WHERE market_slug NOT LIKE ALL($1)
        "#,
    )
    .bind(insider::SHORT_HORIZON_EXCLUSION_PATTERNS.to_vec())
    .fetch_all(pool)
    .await?;

    for row in divergence_rows {
        let condition_id: String = row.try_get("condition_id")?;
        let market_slug: String = row.try_get("market_slug")?;
        let input = insider::SmartMoneyDivergenceInput {
            top_wallets_against_consensus: row.try_get("top_wallets_against_consensus")?,
        };
        if let Some(finding) = insider::smart_money_divergence(&input) {
            alerts.push(new_alert(
                finding.alert_type,
                finding.severity,
                "Smart-money divergence".to_string(),
                finding.message,
                None,
                Some(market_slug.clone()),
                None,
                None,
                serde_json::json!({ "confidence": finding.confidence, "condition_id": condition_id }),
            ));
        }
    }

    let coordinated_rows = sqlx::query(
        r#"
        SELECT condition_id, market_slug, distinct_wallets, window_minutes, total_volume
        FROM market_coordinated_entries
        WHERE market_slug NOT LIKE ALL($1)
        "#,
    )
    .bind(insider::SHORT_HORIZON_EXCLUSION_PATTERNS.to_vec())
    .fetch_all(pool)
    .await?;

    for row in coordinated_rows {
        let condition_id: String = row.try_get("condition_id")?;
        let market_slug: String = row.try_get("market_slug")?;
        let total_volume: f64 = row.try_get("total_volume")?;
        let input = insider::CoordinatedEntryInput {
            distinct_wallets: row.try_get("distinct_wallets")?,
            window_minutes: row.try_get("window_minutes")?,
            total_volume,
        };
        if let Some(finding) = insider::coordinated_entry(&input) {
            alerts.push(new_alert(
                finding.alert_type,
                finding.severity,
                "Coordinated entry".to_string(),
                finding.message,
                None,
                Some(market_slug.clone()),
                None,
                Some(total_volume),
                serde_json::json!({ "confidence": finding.confidence, "condition_id": condition_id }),
            ));
        }
    }

    info!(alert_count = alerts.len(), "anomaly/insider scan complete");
    Ok(alerts)
}
