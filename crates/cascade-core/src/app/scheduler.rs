//! Scheduler loop - polls for Ready tasks and runs them one at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::runner::{RunReport, TaskRunner};
use crate::error::{CoreError, Result};
use crate::ports::WorkflowStore;

/// Sequential poll loop over the store.
///
/// At most one task runs at a time; the next poll starts only after the
/// previous run has fully settled (propagation and saves included).
pub struct SchedulerLoop {
    store: Arc<dyn WorkflowStore>,
    runner: Arc<TaskRunner>,
    poll_interval: Duration,
}

impl SchedulerLoop {
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        runner: Arc<TaskRunner>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            runner,
            poll_interval,
        }
    }

    /// One iteration: pick any Ready task and run it. `Ok(None)` when idle.
    pub async fn tick(&self) -> Result<Option<RunReport>> {
        let Some(task) = self.store.find_ready_task().await? else {
            debug!("no ready task");
            return Ok(None);
        };

        let workflow = self
            .store
            .get_workflow(task.workflow_id)
            .await?
            .ok_or(CoreError::WorkflowNotFound(task.workflow_id))?;

        self.runner.run(&task, &workflow).await.map(Some)
    }

    /// Run ticks back to back, without waiting, until one finds nothing to do.
    ///
    /// Stops at the first error. Returns the number of tasks run.
    pub async fn drain(&self) -> Result<usize> {
        let mut ran = 0;
        while self.tick().await?.is_some() {
            ran += 1;
        }
        Ok(ran)
    }

    /// Poll until shutdown is signalled (or the sender is dropped).
    ///
    /// Every iteration waits `poll_interval`, whether a task ran, nothing was
    /// found, or the run failed. A failed run is logged and never retried here.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(poll_interval = ?self.poll_interval, "scheduler started");
        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            match self.tick().await {
                Ok(Some(report)) => debug!(
                    task_id = %report.task_id,
                    status = %report.task_status,
                    workflow_status = %report.workflow_status,
                    "tick finished"
                ),
                Ok(None) => {}
                Err(err) => error!(error = %err, "task run failed"),
            }

            // shutdown wins over the poll wait
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
        info!("scheduler stopped");
    }
}

/// Handle to a scheduler running on its own tokio task.
/// - `request_shutdown()` stops it after the current iteration
/// - `shutdown_and_join()` also waits for it to finish
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn spawn(scheduler: SchedulerLoop) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            scheduler.run(shutdown_rx).await;
        });
        Self { shutdown_tx, join }
    }

    /// An in-flight job is not cancelled; the loop just stops polling.
    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        if let Err(err) = self.join.await {
            error!(error = %err, "scheduler task panicked");
        }
    }
}
