//! Single-threaded dispatch loop over a registry of jobs, each running in
//! its own spawned task. Jobs never overlap: the loop waits for one to
//! finish before considering the next tick's due set.

mod job;

pub use job::{JobFn, JobFuture, JobStatus, SchedulerStatus};

use chrono::Utc;
use job::RegisteredJob;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{error, info};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub struct Scheduler {
    jobs: Mutex<Vec<RegisteredJob>>,
    running: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { jobs: Mutex::new(Vec::new()), running: Arc::new(AtomicBool::new(false)) }
    }

    pub fn register(&self, name: &str, interval: Duration, func: JobFn) {
        let mut jobs = self.jobs.lock().unwrap();
        jobs.push(RegisteredJob {
            name: name.to_string(),
            func,
            interval,
            next_run_at: Utc::now(),
            enabled: true,
            run_count: 0,
            error_count: 0,
            last_error: None,
            last_run: None,
            last_duration: None,
        });
    }

    pub fn set_enabled(&self, name: &str, enabled: bool) {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.iter_mut().find(|j| j.name == name) {
            job.enabled = enabled;
        }
    }

    /// Runs the tick loop until a termination signal arrives or `shutdown`
    /// is called from another task.
    pub async fn run(self: &Arc<Self>) {
        self.running.store(true, Ordering::SeqCst);
        info!("scheduler started");

        let shutdown_signal = Self::wait_for_termination();
        tokio::pin!(shutdown_signal);

        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_due_jobs().await;
                }
                _ = &mut shutdown_signal => {
                    info!("scheduler received termination signal, shutting down");
                    break;
                }
            }
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!("scheduler stopped");
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    async fn wait_for_termination() {
        #[cfg(unix)]
        {
            let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
    }

    async fn run_due_jobs(&self) {
        let now = Utc::now();
        let due_indices: Vec<usize> = {
            let jobs = self.jobs.lock().unwrap();
            jobs.iter()
                .enumerate()
                .filter(|(_, j)| j.enabled && now >= j.next_run_at)
                .map(|(i, _)| i)
                .collect()
        };

        for index in due_indices {
            self.run_job(index).await;
        }
    }

    async fn run_job(&self, index: usize) {
        let (name, interval) = {
            let jobs = self.jobs.lock().unwrap();
            let job = &jobs[index];
            (job.name.clone(), job.interval)
        };

        let started = Instant::now();
        let result = {
            let future = {
                let jobs = self.jobs.lock().unwrap();
                (jobs[index].func)()
            };
            future.await
        };
        let duration = started.elapsed();

        let mut jobs = self.jobs.lock().unwrap();
        let job = &mut jobs[index];
        job.run_count += 1;
        job.last_run = Some(Utc::now());
        job.last_duration = Some(duration);
        job.next_run_at = Utc::now() + chrono::Duration::from_std(interval).unwrap_or(chrono::Duration::seconds(60));

        match result {
            Ok(()) => {
                job.last_error = None;
                info!(job = %name, duration_s = duration.as_secs_f64(), "job completed");
            }
            Err(err) => {
                job.error_count += 1;
                job.last_error = Some(err.to_string());
                error!(job = %name, error = %err, "job failed");
            }
        }
    }

    pub fn get_status(&self) -> SchedulerStatus {
        let jobs = self.jobs.lock().unwrap();
        SchedulerStatus {
            running: self.running.load(Ordering::SeqCst),
            reported_at: Utc::now(),
            jobs: jobs.iter().map(JobStatus::from).collect(),
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn run_due_jobs_invokes_only_jobs_past_their_next_run_at() {
        let scheduler = Scheduler::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        scheduler.register(
            "counter",
            Duration::from_secs(3600),
            Box::new(move || {
                let calls = calls_clone.clone();
                Box::pin(async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            }),
        );

        scheduler.run_due_jobs().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // next_run_at was advanced an hour out, so a second immediate pass
        // must not invoke it again.
        scheduler.run_due_jobs().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_job_still_advances_next_run_and_records_the_error() {
        let scheduler = Scheduler::new();
        scheduler.register(
            "failing",
            Duration::from_secs(3600),
            Box::new(|| Box::pin(async { Err(smart_money_core::Error::Validation("boom".to_string())) })),
        );

        scheduler.run_due_jobs().await;
        let status = scheduler.get_status();
        let job = &status.jobs[0];
        assert_eq!(job.error_count, 1);
        assert!(job.last_error.is_some());
        assert!(job.next_run > Utc::now());
    }

    #[tokio::test]
    async fn disabled_jobs_are_skipped() {
        let scheduler = Scheduler::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        scheduler.register(
            "disabled",
            Duration::from_secs(1),
            Box::new(move || {
                let calls = calls_clone.clone();
                Box::pin(async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            }),
        );
        scheduler.set_enabled("disabled", false);
        scheduler.run_due_jobs().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
