//! Daily-return aggregation and annualized Sharpe ratio with confidence
//! weighting.

use smart_money_core::types::WalletSharpe;
use smart_money_core::Result;
use sqlx::{PgPool, Row};
use tracing::info;

const MIN_DAYS_FOR_SHARPE: i64 = 3;
const TRADING_DAYS_PER_YEAR: f64 = 365.0;

pub struct SharpeCalculator {
    pool: PgPool,
}

impl SharpeCalculator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run(&self) -> Result<usize> {
        let rows = sqlx::query(
            r#"
            SELECT wallet_id, resolved_at::date AS day, SUM(realized_pnl) AS daily_pnl
            FROM position_pnl
            GROUP BY wallet_id, resolved_at::date
            ORDER BY wallet_id, day
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        use std::collections::HashMap;
        let mut by_wallet: HashMap<String, Vec<f64>> = HashMap::new();
        for row in rows {
            let wallet_id: String = row.get("wallet_id");
            let pnl: f64 = row.try_get("daily_pnl").unwrap_or(0.0);
            by_wallet.entry(wallet_id).or_default().push(pnl);
        }

        let mut computed = 0;
        for (wallet_id, daily_pnls) in by_wallet {
            if let Some(sharpe) = compute_sharpe(&daily_pnls) {
                self.store(&wallet_id, &sharpe).await?;
                computed += 1;
            }
        }

        info!(wallets = computed, "Sharpe calculation complete");
        Ok(computed)
    }

    async fn store(&self, wallet_id: &str, sharpe: &WalletSharpe) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO trader_sharpe (
                wallet_id, sharpe_ratio, sharpe_capped, mean_daily_pnl,
                std_daily_pnl, max_drawdown, days_with_pnl, confidence
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (wallet_id) DO UPDATE SET
                sharpe_ratio = EXCLUDED.sharpe_ratio,
                sharpe_capped = EXCLUDED.sharpe_capped,
                mean_daily_pnl = EXCLUDED.mean_daily_pnl,
                std_daily_pnl = EXCLUDED.std_daily_pnl,
                max_drawdown = EXCLUDED.max_drawdown,
                days_with_pnl = EXCLUDED.days_with_pnl,
                confidence = EXCLUDED.confidence
            "#,
        )
        .bind(wallet_id)
        .bind(sharpe.sharpe_ratio)
        .bind(sharpe.sharpe_capped)
        .bind(sharpe.mean_daily_pnl)
        .bind(sharpe.std_daily_pnl)
        .bind(sharpe.max_drawdown)
        .bind(sharpe.days_with_pnl)
        .bind(sharpe.confidence)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Pure Sharpe computation over a wallet's daily realized-P&L series.
/// Returns `None` when there isn't enough history to trust the estimate.
pub fn compute_sharpe(daily_pnls: &[f64]) -> Option<WalletSharpe> {
    let non_zero: Vec<f64> = daily_pnls.iter().copied().filter(|&p| p != 0.0).collect();
    if (non_zero.len() as i64) < MIN_DAYS_FOR_SHARPE {
        return None;
    }

    let n = non_zero.len() as f64;
    let mean = non_zero.iter().sum::<f64>() / n;
    let variance = non_zero.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let sharpe_ratio = if std_dev > 0.0 {
        (mean / std_dev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };
    let sharpe_capped = sharpe_ratio.min(WalletSharpe::MAX_SHARPE_RATIO);

    let worst_day = non_zero.iter().cloned().fold(0.0_f64, f64::min);
    let max_drawdown = if mean > 0.0 {
        (worst_day.min(0.0).abs() / mean).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let confidence = (n / WalletSharpe::HIGH_CONFIDENCE_DAYS).min(1.0);

    Some(WalletSharpe {
        sharpe_ratio,
        sharpe_capped,
        mean_daily_pnl: mean,
        std_daily_pnl: std_dev,
        max_drawdown,
        days_with_pnl: non_zero.len() as i64,
        confidence,
    })
}

/// Confidence-adjusted rank score: de-weights wallets with thin history
/// without discarding them outright. Used for ranking only, never stored
/// as the canonical Sharpe value.
pub fn confidence_adjusted_score(ml_score: f64, confidence: f64) -> f64 {
    (ml_score * (0.5 + 0.5 * confidence)).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_history_returns_none() {
        assert!(compute_sharpe(&[10.0, -5.0]).is_none());
    }

    #[test]
    fn zero_stddev_yields_zero_sharpe_not_a_panic() {
        let sharpe = compute_sharpe(&[10.0, 10.0, 10.0]).unwrap();
        assert_eq!(sharpe.sharpe_ratio, 0.0);
    }

    #[test]
    fn sharpe_is_capped_at_ten() {
        let daily: Vec<f64> = (0..30).map(|i| 100.0 + (i % 2) as f64).collect();
        let sharpe = compute_sharpe(&daily).unwrap();
        assert!(sharpe.sharpe_capped <= 10.0);
    }

    #[test]
    fn confidence_reaches_one_at_thirty_days() {
        let daily: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let sharpe = compute_sharpe(&daily).unwrap();
        assert_eq!(sharpe.confidence, 1.0);

        let daily_short: Vec<f64> = (0..15).map(|i| 10.0 + i as f64).collect();
        let sharpe_short = compute_sharpe(&daily_short).unwrap();
        assert!((sharpe_short.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn confidence_adjusted_score_halves_impact_at_zero_confidence() {
        assert_eq!(confidence_adjusted_score(80.0, 0.0), 40.0);
        assert_eq!(confidence_adjusted_score(80.0, 1.0), 80.0);
    }
}
