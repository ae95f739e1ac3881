//! Independent post-scoring scanners: consensus, edge-decay, anomaly and
//! insider detection, and market categorization. Each scanner is safe to
//! run on its own; a failure in one must never block the others.

pub mod anomaly;
pub mod consensus;
pub mod edge_decay;
pub mod insider;
pub mod integrity;
pub mod market_classifier;
pub mod store;

use smart_money_core::types::Alert;
use smart_money_core::Result;
use sqlx::PgPool;
use tracing::{info, warn};

pub struct ScannerSuite {
    pool: PgPool,
}

impl ScannerSuite {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs every scanner. Each stage's failure is logged and skipped so one
    /// broken detector cannot take down the rest of the pass.
    pub async fn run(&self) -> Result<Vec<Alert>> {
        let mut alerts = Vec::new();

        match store::run_consensus_scan(&self.pool).await {
            Ok(mut found) => alerts.append(&mut found),
            Err(err) => warn!(error = %err, "consensus scan failed"),
        }

        match store::run_edge_decay_scan(&self.pool).await {
            Ok(mut found) => alerts.append(&mut found),
            Err(err) => warn!(error = %err, "edge-decay scan failed"),
        }

        match store::run_anomaly_and_insider_scan(&self.pool).await {
            Ok(mut found) => alerts.append(&mut found),
            Err(err) => warn!(error = %err, "anomaly/insider scan failed"),
        }

        info!(alert_count = alerts.len(), "scanner suite complete");
        Ok(alerts)
    }
}
