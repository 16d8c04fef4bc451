use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;

use crate::domain::{JobInput, Task, TaskStatus, Workflow};
use crate::error::JobError;
use crate::jobs::{Job, policy};

/// Sends a (simulated) notification to the workflow's client.
pub struct NotificationJob {
    delay: Duration,
}

impl NotificationJob {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Job for NotificationJob {
    async fn run(&self, task: &Task, _inputs: &[JobInput]) -> Result<Value, JobError> {
        info!(task_id = %task.task_id, workflow_id = %task.workflow_id, "sending notification");
        tokio::time::sleep(self.delay).await;
        info!(task_id = %task.task_id, "notification sent");
        Ok(json!({}))
    }

    fn dependencies<'w>(&self, task: &Task, workflow: &'w Workflow) -> Vec<&'w Task> {
        policy::explicit_dependencies(task, workflow)
    }

    fn next_status(&self, task: &Task, workflow: &Workflow) -> Option<TaskStatus> {
        policy::default_next_status(task, &self.dependencies(task, workflow))
    }
}
