use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{JobInput, Task, TaskStatus, Workflow};
use crate::error::JobError;
use crate::jobs::{Job, policy};

pub const LONG_JOB_OUTPUT: &str = "long job is long!";

/// Sleeps for a long while, then returns a fixed string.
pub struct LongJob {
    duration: Duration,
}

impl LongJob {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl Job for LongJob {
    async fn run(&self, _task: &Task, _inputs: &[JobInput]) -> Result<Value, JobError> {
        tokio::time::sleep(self.duration).await;
        Ok(Value::from(LONG_JOB_OUTPUT))
    }

    fn dependencies<'w>(&self, task: &Task, workflow: &'w Workflow) -> Vec<&'w Task> {
        policy::explicit_dependencies(task, workflow)
    }

    fn next_status(&self, task: &Task, workflow: &Workflow) -> Option<TaskStatus> {
        policy::default_next_status(task, &self.dependencies(task, workflow))
    }
}
