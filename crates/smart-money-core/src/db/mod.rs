//! Store gateway: a thin, typed wrapper over a Postgres-compatible pool.

use crate::config::StoreConfig;
use crate::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::path::Path;
use std::time::Duration;

/// Create a connection pool honoring the configured timeout and size.
pub async fn create_pool(config: &StoreConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.timeout_seconds))
        .connect(&config.url())
        .await?;

    Ok(pool)
}

/// Run migrations from the `./migrations` directory, if present.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    let migrator = sqlx::migrate::Migrator::new(Path::new("./migrations")).await?;
    migrator.run(pool).await?;
    Ok(())
}

/// Thin query surface used by every downstream crate. Keeping this as a
/// trait (rather than exposing `PgPool` directly everywhere) gives callers a
/// narrow, mockable seam for tests.
#[async_trait::async_trait]
pub trait StoreGateway: Send + Sync {
    async fn fetch_all(&self, sql: &str) -> Result<Vec<sqlx::postgres::PgRow>>;
    async fn execute(&self, sql: &str) -> Result<u64>;
}

pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl StoreGateway for PgGateway {
    async fn fetch_all(&self, sql: &str) -> Result<Vec<sqlx::postgres::PgRow>> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        let result = sqlx::query(sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Helper for pulling an optional numeric column out of a row without
/// panicking when the column is NULL — a pattern every aggregation query
/// in this codebase needs.
pub fn get_f64_or(row: &sqlx::postgres::PgRow, column: &str, default: f64) -> f64 {
    row.try_get::<Option<f64>, _>(column)
        .ok()
        .flatten()
        .unwrap_or(default)
}
