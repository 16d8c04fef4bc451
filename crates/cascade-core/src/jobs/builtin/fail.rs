use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{JobInput, Task, TaskStatus, Workflow};
use crate::error::JobError;
use crate::jobs::{Job, policy};

pub const FAIL_MESSAGE: &str = "This job always fails";

/// Always fails. Used to exercise failure handling and abort cascades.
pub struct FailJob;

#[async_trait]
impl Job for FailJob {
    async fn run(&self, _task: &Task, _inputs: &[JobInput]) -> Result<Value, JobError> {
        Err(JobError::Failed(FAIL_MESSAGE.to_string()))
    }

    fn dependencies<'w>(&self, task: &Task, workflow: &'w Workflow) -> Vec<&'w Task> {
        policy::explicit_dependencies(task, workflow)
    }

    fn next_status(&self, task: &Task, workflow: &Workflow) -> Option<TaskStatus> {
        policy::default_next_status(task, &self.dependencies(task, workflow))
    }
}
