//! Cron-driven trigger for the periodic recheck.

use super::error::{SchedulerError, SchedulerResult};
use super::worker::RecheckWorker;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Owns the cron scheduler and the single recurring recheck job
pub struct RecheckScheduler {
    scheduler: JobScheduler,
    worker: Arc<RecheckWorker>,
    schedule: String,
}

impl RecheckScheduler {
    /// Create a scheduler that will run the worker on the given cron
    /// expression (six-field, seconds first)
    pub async fn new(schedule: String, worker: Arc<RecheckWorker>) -> SchedulerResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::StartupFailed(e.to_string()))?;

        Ok(Self {
            scheduler,
            worker,
            schedule,
        })
    }

    /// Register the recheck job and start ticking
    pub async fn start(&mut self) -> SchedulerResult<()> {
        let worker = self.worker.clone();

        let job = Job::new_async(self.schedule.as_str(), move |_uuid, _l| {
            let worker = worker.clone();
            Box::pin(async move {
                let started = std::time::Instant::now();
                match worker.schedule_all_open().await {
                    Ok(outcome) => {
                        info!(
                            processed = outcome.processed,
                            failed = outcome.failed,
                            duration_ms = started.elapsed().as_millis(),
                            "Scheduled recheck completed"
                        );
                    }
                    Err(e) => {
                        error!(error = %e, "Scheduled recheck failed");
                    }
                }
            })
        })
        .map_err(|e| SchedulerError::InvalidCronExpression(e.to_string()))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::JobCreationFailed(e.to_string()))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| SchedulerError::StartupFailed(e.to_string()))?;

        info!(schedule = %self.schedule, "Recheck scheduler started");

        Ok(())
    }

    /// Stop ticking
    pub async fn shutdown(&mut self) -> SchedulerResult<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| SchedulerError::ShutdownFailed(e.to_string()))?;

        info!("Recheck scheduler shut down");
        Ok(())
    }
}
