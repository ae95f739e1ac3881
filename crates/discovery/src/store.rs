//! Wallet-signal aggregation feeding both discovery methods and the
//! persistence estimator.

use crate::edge_persistence::{self, PersistenceFactors};
use crate::hidden_alpha::{self, WalletSignals};
use smart_money_core::types::{EdgePersistence, HiddenAlphaDiscovery};
use smart_money_core::Result;
use sqlx::{PgPool, Row};
use tracing::info;

pub async fn load_wallet_signals(pool: &PgPool) -> Result<Vec<(String, WalletSignals)>> {
    let rows = sqlx::query(
        r#"
        SELECT
            s.wallet_id,
            COALESCE(sh.sharpe_capped, 0) AS sharpe,
            COALESCE(p.total_trades, 0) AS total_trades,
            COALESCE(p.total_volume, 0) AS total_volume,
            COALESCE(p.days_active, 0) AS days_active,
            COALESCE(pnl.win_rate, 0) AS win_rate,
            COALESCE(c.top_category_fraction, 0) AS category_volume_fraction,
            COALESCE(c.top_category_relative_edge, 0) AS category_relative_edge,
            s.total_score,
            COALESCE(d.consensus_divergence_pct, 0) AS consensus_divergence_pct,
            COALESCE(pnl.total_pnl, 0) > 0 AS is_profitable,
            COALESCE(s.consistency, 0) AS consistency_score,
            COALESCE(s.track_record, 0) AS track_record_score,
            COALESCE(s.strategy_confidence, 0) AS strategy_confidence,
            COALESCE(ew.recent_win_rate, 0) AS recent_win_rate,
            COALESCE(ew.historical_win_rate, 0) AS historical_win_rate
        FROM smart_money_scores s
        LEFT JOIN trader_sharpe sh ON sh.wallet_id = s.wallet_id
        LEFT JOIN trader_profiles p ON p.wallet_id = s.wallet_id
        LEFT JOIN trader_pnl pnl ON pnl.wallet_id = s.wallet_id
        LEFT JOIN wallet_category_summary c ON c.wallet_id = s.wallet_id
        LEFT JOIN wallet_consensus_divergence d ON d.wallet_id = s.wallet_id
        LEFT JOIN wallet_edge_windows ew ON ew.wallet_id = s.wallet_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let wallet_id: String = row.try_get("wallet_id")?;
        let signals = WalletSignals {
            sharpe: row.try_get("sharpe")?,
            total_trades: row.try_get("total_trades")?,
            total_volume: row.try_get::<f64, _>("total_volume")?,
            days_active: row.try_get("days_active")?,
            win_rate: row.try_get::<f64, _>("win_rate")?,
            category_volume_fraction: row.try_get::<f64, _>("category_volume_fraction")?,
            category_relative_edge: row.try_get::<f64, _>("category_relative_edge")?,
            total_score: row.try_get("total_score")?,
            consensus_divergence_pct: row.try_get::<f64, _>("consensus_divergence_pct")?,
            is_profitable: row.try_get("is_profitable")?,
            consistency_score: row.try_get::<f64, _>("consistency_score")?,
            track_record_score: row.try_get::<f64, _>("track_record_score")?,
            strategy_confidence: row.try_get::<f64, _>("strategy_confidence")?,
            recent_win_rate: row.try_get::<f64, _>("recent_win_rate")?,
            historical_win_rate: row.try_get::<f64, _>("historical_win_rate")?,
        };
        out.push((wallet_id, signals));
    }

    info!(wallet_count = out.len(), "loaded wallet discovery signals");
    Ok(out)
}

pub async fn store_discoveries(pool: &PgPool, discoveries: &[HiddenAlphaDiscovery]) -> Result<()> {
    for d in discoveries {
        sqlx::query(
            r#"
            INSERT INTO hidden_alpha_discoveries
                (wallet_id, discovery_type, discovery_score, visibility_score, discovery_reason, standout_metrics, discovered_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (wallet_id, discovery_type) DO UPDATE SET
                discovery_score = EXCLUDED.discovery_score,
                visibility_score = EXCLUDED.visibility_score,
                discovery_reason = EXCLUDED.discovery_reason,
                standout_metrics = EXCLUDED.standout_metrics,
                discovered_at = EXCLUDED.discovered_at
            "#,
        )
        .bind(&d.wallet_id)
        .bind(format!("{:?}", d.discovery_type))
        .bind(d.discovery_score)
        .bind(d.visibility_score)
        .bind(&d.discovery_reason)
        .bind(&d.standout_metrics)
        .bind(d.discovered_at)
        .execute(pool)
        .await?;
    }
    info!(count = discoveries.len(), "persisted hidden-alpha discoveries");
    Ok(())
}

pub async fn run_discovery_pass(pool: &PgPool) -> Result<Vec<HiddenAlphaDiscovery>> {
    let wallets = load_wallet_signals(pool).await?;
    let discovered: Vec<HiddenAlphaDiscovery> = wallets
        .iter()
        .flat_map(|(wallet_id, signals)| hidden_alpha::discover_wallet(wallet_id, signals))
        .collect();
    let merged = hidden_alpha::merge_and_cap(discovered);
    store_discoveries(pool, &merged).await?;
    Ok(merged)
}

pub async fn store_persistence(pool: &PgPool, estimates: &[(String, EdgePersistence)]) -> Result<()> {
    for (wallet_id, estimate) in estimates {
        sqlx::query(
            r#"
            INSERT INTO wallet_edge_persistence
                (wallet_id, probability_30d, probability_60d, probability_90d, risk, predicted_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (wallet_id) DO UPDATE SET
                probability_30d = EXCLUDED.probability_30d,
                probability_60d = EXCLUDED.probability_60d,
                probability_90d = EXCLUDED.probability_90d,
                risk = EXCLUDED.risk,
                predicted_at = EXCLUDED.predicted_at
            "#,
        )
        .bind(wallet_id)
        .bind(estimate.probability_30d)
        .bind(estimate.probability_60d)
        .bind(estimate.probability_90d)
        .bind(format!("{:?}", estimate.risk).to_uppercase())
        .execute(pool)
        .await?;
    }
    info!(count = estimates.len(), "persisted edge-persistence estimates");
    Ok(())
}

/// Final cycle stage: estimates how long each sufficiently-tracked wallet's
/// edge is likely to persist and writes the informational estimate out.
/// Wallets under the trade/tenure floor in [`edge_persistence::estimate`]
/// are silently skipped rather than stored with a placeholder.
pub async fn run_persistence_pass(pool: &PgPool) -> Result<Vec<(String, EdgePersistence)>> {
    let wallets = load_wallet_signals(pool).await?;
    let estimates: Vec<(String, EdgePersistence)> = wallets
        .iter()
        .filter_map(|(wallet_id, signals)| {
            let factors: PersistenceFactors = edge_persistence::derive_persistence_factors(signals);
            edge_persistence::estimate(&factors).map(|e| (wallet_id.clone(), e))
        })
        .collect();
    store_persistence(pool, &estimates).await?;
    info!(wallet_count = estimates.len(), "edge-persistence pass complete");
    Ok(estimates)
}
