use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type JobFuture = Pin<Box<dyn Future<Output = smart_money_core::Result<()>> + Send>>;
pub type JobFn = Box<dyn Fn() -> JobFuture + Send + Sync>;

pub(crate) struct RegisteredJob {
    pub name: String,
    pub func: JobFn,
    pub interval: Duration,
    pub next_run_at: DateTime<Utc>,
    pub enabled: bool,
    pub run_count: u64,
    pub error_count: u64,
    pub last_error: Option<String>,
    pub last_run: Option<DateTime<Utc>>,
    pub last_duration: Option<Duration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub name: String,
    pub enabled: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: DateTime<Utc>,
    pub run_count: u64,
    pub error_count: u64,
    pub last_error: Option<String>,
    pub last_duration_s: Option<f64>,
}

impl From<&RegisteredJob> for JobStatus {
    fn from(job: &RegisteredJob) -> Self {
        JobStatus {
            name: job.name.clone(),
            enabled: job.enabled,
            last_run: job.last_run,
            next_run: job.next_run_at,
            run_count: job.run_count,
            error_count: job.error_count,
            last_error: job.last_error.clone(),
            last_duration_s: job.last_duration.map(|d| d.as_secs_f64()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub reported_at: DateTime<Utc>,
    pub jobs: Vec<JobStatus>,
}
