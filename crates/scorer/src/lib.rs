//! Composite scoring: ladders + classifier + strategy adjustments, batched
//! across the whole wallet population in one pass.

pub mod classifier;
pub mod ladders;
pub mod scoring;
pub mod store;

use scoring::{assign_ranks, score_wallet, ScoreWeights};
use smart_money_core::{types::WalletScore, Result};
use sqlx::PgPool;
use tracing::info;

pub struct Scorer {
    pool: PgPool,
    weights: ScoreWeights,
}

impl Scorer {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            weights: ScoreWeights::default(),
        }
    }

    pub fn with_weights(pool: PgPool, weights: ScoreWeights) -> Self {
        Self { pool, weights }
    }

    pub async fn run(&self) -> Result<Vec<WalletScore>> {
        let wallets = store::fetch_all_wallet_metrics(&self.pool).await?;
        let peer_pnls: Vec<f64> = wallets.iter().map(|(_, m)| m.total_pnl).collect();

        let mut scores: Vec<WalletScore> = wallets
            .iter()
            .map(|(wallet_id, metrics)| score_wallet(wallet_id, metrics, &peer_pnls, &self.weights))
            .collect();

        assign_ranks(&mut scores);
        store::store_scores(&self.pool, &scores).await?;

        info!(wallet_count = scores.len(), "scoring pass complete");
        Ok(scores)
    }
}
