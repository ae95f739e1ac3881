//! Batched wallet-metrics retrieval and score persistence.
//!
//! The aggregation behind [`fetch_all_wallet_metrics`] is a single query:
//! scoring hundreds of thousands of wallets one row at a time would mean
//! that many round trips, so every input the ladders and classifier need
//! is assembled server-side and returned in one shot.

use crate::scoring::WalletMetrics;
use smart_money_core::Result;
use sqlx::{PgPool, Row};
use tracing::info;

pub async fn fetch_all_wallet_metrics(pool: &PgPool) -> Result<Vec<(String, WalletMetrics)>> {
    let rows = sqlx::query(
        r#"
        SELECT
            p.wallet_id,
            COALESCE(pnl.total_pnl, 0) AS total_pnl,
            COALESCE(p.total_trades, 0) AS total_trades,
            COALESCE(p.total_volume, 0) AS total_volume,
            COALESCE(p.unique_markets, 0) AS unique_markets,
            COALESCE(p.days_active, 0) AS days_active,
            COALESCE(p.buy_count, 0) AS buy_count,
            COALESCE(p.sell_count, 0) AS sell_count,
            COALESCE(p.complete_set_ratio, 0) AS complete_set_ratio,
            COALESCE(p.direction_bias, 0.5) AS direction_bias
        FROM trader_profiles p
        LEFT JOIN trader_pnl pnl ON pnl.wallet_id = p.wallet_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let wallet_id: String = row.try_get("wallet_id")?;
        let metrics = WalletMetrics {
            total_pnl: row.try_get::<f64, _>("total_pnl")?,
            total_trades: row.try_get("total_trades")?,
            total_volume: row.try_get::<f64, _>("total_volume")?,
            unique_markets: row.try_get("unique_markets")?,
            days_active: row.try_get("days_active")?,
            buy_count: row.try_get("buy_count")?,
            sell_count: row.try_get("sell_count")?,
            complete_set_ratio: row.try_get::<f64, _>("complete_set_ratio")?,
            direction_bias: row.try_get::<f64, _>("direction_bias")?,
        };
        out.push((wallet_id, metrics));
    }

    info!(wallet_count = out.len(), "loaded wallet metrics for scoring");
    Ok(out)
}

pub async fn store_scores(pool: &PgPool, scores: &[smart_money_core::types::WalletScore]) -> Result<()> {
    for score in scores {
        sqlx::query(
            r#"
            INSERT INTO smart_money_scores (
                wallet_id, total_score, tier, profitability, risk_adjusted,
                consistency, track_record, strategy_type, strategy_confidence,
                rank, calculated_at, model_version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (wallet_id) DO UPDATE SET
                total_score = EXCLUDED.total_score,
                tier = EXCLUDED.tier,
                profitability = EXCLUDED.profitability,
                risk_adjusted = EXCLUDED.risk_adjusted,
                consistency = EXCLUDED.consistency,
                track_record = EXCLUDED.track_record,
                strategy_type = EXCLUDED.strategy_type,
                strategy_confidence = EXCLUDED.strategy_confidence,
                rank = EXCLUDED.rank,
                calculated_at = EXCLUDED.calculated_at,
                model_version = EXCLUDED.model_version
            "#,
        )
        .bind(&score.wallet_id)
        .bind(score.total_score)
        .bind(format!("{:?}", score.tier).to_uppercase())
        .bind(score.profitability)
        .bind(score.risk_adjusted)
        .bind(score.consistency)
        .bind(score.track_record)
        .bind(format!("{:?}", score.strategy_type))
        .bind(score.strategy_confidence)
        .bind(score.rank)
        .bind(score.calculated_at)
        .bind(&score.model_version)
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO smart_money_scores_history (
                wallet_id, total_score, tier, strategy_type, calculated_at, model_version
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&score.wallet_id)
        .bind(score.total_score)
        .bind(format!("{:?}", score.tier).to_uppercase())
        .bind(format!("{:?}", score.strategy_type))
        .bind(score.calculated_at)
        .bind(&score.model_version)
        .execute(pool)
        .await?;
    }

    info!(count = scores.len(), "persisted wallet scores");
    Ok(())
}
