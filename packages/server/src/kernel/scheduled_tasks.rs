//! Scheduled sync passes using tokio-cron-scheduler.
//!
//! ```text
//! startup ──► pass
//! every interval ──► pass (skipped while the previous one still runs)
//!                      └─► resolve rules ──► publish report + metrics
//! ```
//!
//! At most one pass runs at a time. A pass that outlives the configured
//! timeout is abandoned and counted as a `sync-pass` error.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::sync::run_sync_pass;
use crate::kernel::{operation, ServerDeps};

/// How a scheduled tick ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Completed,
    Skipped,
    TimedOut,
}

/// Running scheduler plus the single-flight guard its passes share.
pub struct SyncScheduler {
    scheduler: JobScheduler,
    in_flight: Arc<Mutex<()>>,
}

/// Start the periodic sync job and kick off the first pass immediately.
pub async fn start_scheduler(
    deps: Arc<ServerDeps>,
    interval: Duration,
    pass_timeout: Duration,
) -> Result<SyncScheduler> {
    let scheduler = JobScheduler::new().await?;
    let in_flight = Arc::new(Mutex::new(()));

    let job_deps = deps.clone();
    let job_guard = in_flight.clone();
    let sync_job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let deps = job_deps.clone();
        let guard = job_guard.clone();
        Box::pin(async move {
            run_guarded_pass(&deps, &guard, pass_timeout).await;
        })
    })?;

    scheduler.add(sync_job).await?;
    scheduler.start().await?;

    // The repeated job first fires one interval after start.
    let startup_deps = deps.clone();
    let startup_guard = in_flight.clone();
    tokio::spawn(async move {
        run_guarded_pass(&startup_deps, &startup_guard, pass_timeout).await;
    });

    tracing::info!(
        interval = %humantime::format_duration(interval),
        timeout = %humantime::format_duration(pass_timeout),
        "Scheduled sync passes started"
    );

    Ok(SyncScheduler {
        scheduler,
        in_flight,
    })
}

/// Run one pass unless another is still in flight.
pub async fn run_guarded_pass(
    deps: &ServerDeps,
    in_flight: &Arc<Mutex<()>>,
    pass_timeout: Duration,
) -> PassOutcome {
    let Ok(_guard) = in_flight.try_lock() else {
        tracing::warn!("Previous sync pass still running, skipping this tick");
        deps.metrics.record_error(operation::SYNC_PASS_SKIPPED);
        return PassOutcome::Skipped;
    };

    match tokio::time::timeout(pass_timeout, run_sync_pass(deps)).await {
        Ok(_) => PassOutcome::Completed,
        Err(_) => {
            tracing::error!(
                timeout = %humantime::format_duration(pass_timeout),
                "Sync pass timed out"
            );
            deps.metrics.record_error(operation::SYNC_PASS);
            PassOutcome::TimedOut
        }
    }
}

impl SyncScheduler {
    /// Stop scheduling new passes and wait up to `grace` for the current one.
    pub async fn shutdown(mut self, grace: Duration) -> Result<()> {
        self.scheduler.shutdown().await?;

        match tokio::time::timeout(grace, self.in_flight.lock()).await {
            Ok(_) => tracing::info!("Scheduler stopped"),
            Err(_) => tracing::warn!(
                grace = %humantime::format_duration(grace),
                "In-flight sync pass did not finish in time, abandoning it"
            ),
        }
        Ok(())
    }
}
