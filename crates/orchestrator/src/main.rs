//! Smart Money Engine
//!
//! Wires the wallet-intelligence pipeline together and drives it on a
//! schedule: resolutions, P&L, Sharpe, scoring, index rebalancing,
//! hidden-alpha discovery, and signal scanning, with alerts fanned out to
//! whichever notification sinks are configured.

mod cycle;

use anyhow::Result;
use scheduler::Scheduler;
use smart_money_core::config::Config;
use smart_money_core::types::Severity;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HEALTH_FILE: &str = "/tmp/healthy";

fn touch_health_file() {
    let _ = std::fs::write(HEALTH_FILE, format!("{}", chrono::Utc::now().timestamp()));
}

fn parse_min_severity(raw: &str) -> Severity {
    match raw.to_uppercase().as_str() {
        "CRITICAL" => Severity::Critical,
        "HIGH" => Severity::High,
        "MEDIUM" => Severity::Medium,
        _ => Severity::Low,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orchestrator=info,smart_money_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting smart money engine");
    touch_health_file();

    let config = Config::from_env()?;
    let pool = smart_money_core::db::create_pool(&config.store).await?;
    smart_money_core::db::run_migrations(&pool).await.ok();

    let min_severity = parse_min_severity(&config.alerts.min_severity);
    let dispatcher = cycle::build_dispatcher(&config.alerts, min_severity);

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--once") {
        cycle::run_cycle(&pool, &dispatcher, false).await?;
        return Ok(());
    }

    let scheduler = Arc::new(Scheduler::new());
    let cycle_pool = pool.clone();
    let cycle_dispatcher = dispatcher.clone();
    scheduler.register(
        "pipeline_cycle",
        Duration::from_secs(config.scheduler.interval_seconds),
        Box::new(move || {
            let pool = cycle_pool.clone();
            let dispatcher = cycle_dispatcher.clone();
            Box::pin(async move {
                cycle::run_cycle(&pool, &dispatcher, false)
                    .await
                    .map_err(|err| smart_money_core::Error::Validation(err.to_string()))
            })
        }),
    );

    scheduler.run().await;
    info!("smart money engine stopped");
    Ok(())
}
