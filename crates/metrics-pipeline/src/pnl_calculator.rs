//! Realized P&L computation: joins trades against resolutions to produce
//! per-position and per-wallet aggregates.

use chrono::Utc;
use rust_decimal::Decimal;
use smart_money_core::types::{DataQuality, PositionPnl, WalletPnl};
use smart_money_core::Result;
use sqlx::{PgPool, Row};
use tracing::info;

const MIN_SHARES_THRESHOLD: f64 = 0.001;
const MIN_COST_THRESHOLD: f64 = 0.01;

pub struct PnlCalculator {
    pool: PgPool,
}

impl PnlCalculator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Recompute every position's realized P&L against resolved markets and
    /// roll the result up into wallet-level aggregates and profile fields.
    pub async fn run(&self) -> Result<usize> {
        let positions = self.compute_positions().await?;
        if positions.is_empty() {
            info!("no resolved positions to price");
            return Ok(0);
        }

        self.store_positions(&positions).await?;
        self.roll_up_wallets(&positions).await?;

        info!(positions = positions.len(), "P&L calculation complete");
        Ok(positions.len())
    }

    async fn compute_positions(&self) -> Result<Vec<PositionPnl>> {
        let rows = sqlx::query(
            r#"
            SELECT
                t.wallet_id,
                t.condition_id,
                t.outcome_index,
                r.winning_outcome_index,
                SUM(CASE WHEN t.side = 'buy' THEN t.size ELSE -t.size END) AS net_shares,
                SUM(CASE WHEN t.side = 'buy' THEN t.notional ELSE -t.notional END) AS net_cost,
                SUM(CASE WHEN t.side = 'buy' THEN t.notional ELSE 0 END)
                    / NULLIF(SUM(CASE WHEN t.side = 'buy' THEN t.size ELSE 0 END), 0) AS avg_entry_price,
                COUNT(*) FILTER (WHERE t.side = 'buy') AS buy_count,
                COUNT(*) FILTER (WHERE t.side = 'sell') AS sell_count,
                MIN(t.ts) AS first_trade_at,
                MAX(t.ts) AS last_trade_at,
                r.resolution_time
            FROM trades t
            JOIN market_resolutions r ON r.condition_id = t.condition_id AND r.is_resolved = true
            GROUP BY t.wallet_id, t.condition_id, t.outcome_index, r.winning_outcome_index, r.resolution_time
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();
        let mut positions = Vec::with_capacity(rows.len());

        for row in rows {
            let net_shares: f64 = row.try_get("net_shares").unwrap_or(0.0);
            let net_cost: f64 = row.try_get("net_cost").unwrap_or(0.0);

            if net_shares.abs() <= MIN_SHARES_THRESHOLD && net_cost.abs() <= MIN_COST_THRESHOLD {
                continue;
            }

            let outcome_index: i32 = row.get("outcome_index");
            let winning_outcome_index: Option<i32> = row.get("winning_outcome_index");
            let settlement_price = if Some(outcome_index) == winning_outcome_index {
                1.0
            } else {
                0.0
            };
            let realized_pnl = settlement_price * net_shares - net_cost;

            positions.push(PositionPnl {
                wallet_id: row.get("wallet_id"),
                condition_id: row.get("condition_id"),
                outcome_index,
                net_shares: Decimal::try_from(net_shares).unwrap_or_default(),
                net_cost: Decimal::try_from(net_cost).unwrap_or_default(),
                avg_entry_price: row
                    .try_get::<Option<f64>, _>("avg_entry_price")
                    .ok()
                    .flatten()
                    .and_then(|v| Decimal::try_from(v).ok())
                    .unwrap_or_default(),
                settlement_price: Decimal::try_from(settlement_price).unwrap_or_default(),
                realized_pnl: Decimal::try_from(realized_pnl).unwrap_or_default(),
                buy_count: row.get("buy_count"),
                sell_count: row.get("sell_count"),
                first_trade_at: row.get("first_trade_at"),
                last_trade_at: row.get("last_trade_at"),
                resolved_at: row
                    .try_get("resolution_time")
                    .unwrap_or(now),
                calculated_at: now,
            });
        }

        Ok(positions)
    }

    async fn store_positions(&self, positions: &[PositionPnl]) -> Result<()> {
        for p in positions {
            sqlx::query(
                r#"
                INSERT INTO position_pnl (
                    wallet_id, condition_id, outcome_index, net_shares, net_cost,
                    avg_entry_price, settlement_price, realized_pnl,
                    buy_count, sell_count, first_trade_at, last_trade_at,
                    resolved_at, calculated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                ON CONFLICT (wallet_id, condition_id, outcome_index) DO UPDATE SET
                    net_shares = EXCLUDED.net_shares,
                    net_cost = EXCLUDED.net_cost,
                    avg_entry_price = EXCLUDED.avg_entry_price,
                    settlement_price = EXCLUDED.settlement_price,
                    realized_pnl = EXCLUDED.realized_pnl,
                    buy_count = EXCLUDED.buy_count,
                    sell_count = EXCLUDED.sell_count,
                    last_trade_at = EXCLUDED.last_trade_at,
                    resolved_at = EXCLUDED.resolved_at,
                    calculated_at = EXCLUDED.calculated_at
                "#,
            )
            .bind(&p.wallet_id)
            .bind(&p.condition_id)
            .bind(p.outcome_index)
            .bind(p.net_shares)
            .bind(p.net_cost)
            .bind(p.avg_entry_price)
            .bind(p.settlement_price)
            .bind(p.realized_pnl)
            .bind(p.buy_count)
            .bind(p.sell_count)
            .bind(p.first_trade_at)
            .bind(p.last_trade_at)
            .bind(p.resolved_at)
            .bind(p.calculated_at)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn roll_up_wallets(&self, positions: &[PositionPnl]) -> Result<()> {
        use std::collections::HashMap;

        let mut by_wallet: HashMap<&str, WalletPnl> = HashMap::new();
        for p in positions {
            let entry = by_wallet.entry(p.wallet_id.as_str()).or_default();
            entry.total_realized_pnl += p.realized_pnl;
            entry.positions_closed += 1;
            if p.realized_pnl > Decimal::ZERO {
                entry.wins += 1;
            } else if p.realized_pnl < Decimal::ZERO {
                entry.losses += 1;
            }
        }

        for (wallet_id, pnl) in by_wallet {
            sqlx::query(
                r#"
                INSERT INTO trader_pnl (wallet_id, total_realized_pnl, positions_closed, wins, losses)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (wallet_id) DO UPDATE SET
                    total_realized_pnl = EXCLUDED.total_realized_pnl,
                    positions_closed = EXCLUDED.positions_closed,
                    wins = EXCLUDED.wins,
                    losses = EXCLUDED.losses
                "#,
            )
            .bind(wallet_id)
            .bind(pnl.total_realized_pnl)
            .bind(pnl.positions_closed)
            .bind(pnl.wins)
            .bind(pnl.losses)
            .execute(&self.pool)
            .await?;

            sqlx::query(
                r#"
                UPDATE trader_profiles SET
                    total_pnl = $2,
                    updated_at = NOW(),
                    data_quality = CASE WHEN data_quality = 'good' THEN 'good' ELSE 'pnl_calculated' END
                WHERE wallet_id = $1
                "#,
            )
            .bind(wallet_id)
            .bind(pnl.total_realized_pnl)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}

/// Pure helper exposed for direct unit testing of the settlement formula.
pub fn realized_pnl(settlement_price: f64, net_shares: f64, net_cost: f64) -> f64 {
    settlement_price * net_shares - net_cost
}

/// Pure helper mirroring the quality-preservation rule: once `good`, stays
/// `good`; otherwise degrades to `pnl_calculated`.
pub fn next_data_quality(current: DataQuality) -> DataQuality {
    match current {
        DataQuality::Good => DataQuality::Good,
        _ => DataQuality::PnlCalculated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realized_pnl_matches_the_documented_invariant() {
        assert_eq!(realized_pnl(1.0, 100.0, 40.0), 60.0);
        assert_eq!(realized_pnl(0.0, 100.0, 40.0), -40.0);
    }

    #[test]
    fn data_quality_preserves_good_and_degrades_otherwise() {
        assert_eq!(next_data_quality(DataQuality::Good), DataQuality::Good);
        assert_eq!(next_data_quality(DataQuality::Partial), DataQuality::PnlCalculated);
        assert_eq!(
            next_data_quality(DataQuality::PnlCalculated),
            DataQuality::PnlCalculated
        );
    }
}
