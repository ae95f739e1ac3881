//! One full pass over the pipeline in its canonical order: resolutions →
//! P&L → Sharpe → scoring → indices → hidden-alpha → consensus →
//! edge-decay → anomalies → ML-enrichment (no-op) → persistence.
//!
//! The first four steps are foundational: each later step reads entities
//! the previous one wrote, so a failure here aborts the cycle. Everything
//! from index building onward is independent of its siblings — one
//! scanner's failure is logged and the rest of the cycle still runs.

use alerting::AlertDispatcher;
use index_builder::config::IndexConfig;
use smart_money_core::types::{Severity, WeightingMethod};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Placeholder index lineup. A production deployment would load these from
/// a configuration table; the engine ships one flagship index so the
/// pipeline has something concrete to build end to end.
fn default_index_configs() -> Vec<IndexConfig> {
    vec![IndexConfig {
        index_id: "smart-money-flagship".to_string(),
        min_total_score: 60.0,
        min_trades: 20,
        min_days_active: 14,
        min_volume: 5_000.0,
        min_sharpe: 0.5,
        allowed_strategies: vec![],
        excluded_strategies: vec![],
        is_replication_index: true,
        required_categories: vec![],
        min_category_concentration: 0.0,
        num_constituents: 25,
        weighting_method: WeightingMethod::ScoreWeighted,
        max_weight_per_trader: 0.15,
        max_strategy_concentration: 0.40,
    }]
}

macro_rules! timed_step {
    ($name:expr, $body:expr) => {{
        let started = Instant::now();
        let result = $body;
        info!(step = $name, duration_s = started.elapsed().as_secs_f64(), "cycle step finished");
        result
    }};
}

pub async fn run_cycle(pool: &PgPool, dispatcher: &AlertDispatcher, ml_enrichment_enabled: bool) -> anyhow::Result<()> {
    info!("starting pipeline cycle");
    let cycle_started = Instant::now();

    timed_step!("resolutions", metrics_pipeline::ResolutionTracker::new(pool.clone()).run().await)?;
    timed_step!("pnl", metrics_pipeline::PnlCalculator::new(pool.clone()).run().await)?;
    timed_step!("sharpe", metrics_pipeline::SharpeCalculator::new(pool.clone()).run().await)?;
    let scores = timed_step!("scoring", scorer::Scorer::new(pool.clone()).run().await)?;
    info!(wallet_count = scores.len(), "scoring step produced scores");

    for config in default_index_configs() {
        let index_id = config.index_id.clone();
        let outcome = run_index_build(pool, &config).await;
        if let Err(err) = outcome {
            warn!(index_id, error = %err, "index build failed, continuing cycle");
        }
    }

    if let Err(err) = run_discovery(pool).await {
        warn!(error = %err, "hidden-alpha discovery failed, continuing cycle");
    }

    let mut alerts = Vec::new();
    match signal_scanners::ScannerSuite::new(pool.clone()).run().await {
        Ok(mut found) => alerts.append(&mut found),
        Err(err) => warn!(error = %err, "scanner suite failed, continuing cycle"),
    }

    if ml_enrichment_enabled {
        warn!("ML enrichment requested but not implemented; skipping");
    } else {
        info!("ML enrichment step skipped (feature disabled by default)");
    }

    if let Err(err) = run_persistence(pool).await {
        warn!(error = %err, "edge-persistence pass failed, continuing cycle");
    }

    let alert_count = alerts.len();
    for alert in &alerts {
        dispatcher.dispatch(alert).await;
    }

    info!(
        duration_s = cycle_started.elapsed().as_secs_f64(),
        alert_count,
        "pipeline cycle complete"
    );
    Ok(())
}

async fn run_index_build(pool: &PgPool, config: &IndexConfig) -> anyhow::Result<()> {
    let candidates = index_builder::store::load_candidates(pool).await?;
    let previous = index_builder::store::load_previous_index(pool, &config.index_id).await?;
    let result = index_builder::build_index(&candidates, config, previous.as_ref());

    for warning in &result.warnings {
        warn!(index_id = %config.index_id, warning, "index concentration warning");
    }

    index_builder::store::store_index(pool, &result.index).await?;
    info!(
        index_id = %config.index_id,
        added = result.diff.added.len(),
        removed = result.diff.removed.len(),
        "index rebalanced"
    );
    Ok(())
}

async fn run_discovery(pool: &PgPool) -> anyhow::Result<()> {
    let discoveries = discovery::run_discovery_pass(pool).await?;
    info!(discovery_count = discoveries.len(), "hidden-alpha discovery complete");
    Ok(())
}

async fn run_persistence(pool: &PgPool) -> anyhow::Result<()> {
    let estimates = discovery::run_persistence_pass(pool).await?;
    info!(wallet_count = estimates.len(), "edge-persistence estimates refreshed");
    Ok(())
}

pub fn build_dispatcher(config: &smart_money_core::config::AlertConfig, min_severity: Severity) -> Arc<AlertDispatcher> {
    let mut sinks: Vec<Box<dyn alerting::NotificationSink>> = Vec::new();

    if let Some(url) = &config.chat_webhook_url {
        sinks.push(Box::new(alerting::sinks::ChatWebhookSink::new(url.clone())));
    }
    if let (Some(token), Some(chat_id)) = (&config.bot_token, &config.bot_chat_id) {
        sinks.push(Box::new(alerting::sinks::BotApiSink::new(
            token.clone(),
            chat_id.clone(),
            config.bot_thread_id.clone(),
            false,
        )));
    }
    if !config.webhook_urls.is_empty() {
        sinks.push(Box::new(alerting::sinks::GenericWebhookSink::new(
            config.webhook_urls.clone(),
            config.webhook_secret.clone(),
        )));
    }

    Arc::new(AlertDispatcher::new(sinks, min_severity))
}
