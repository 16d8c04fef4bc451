use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;

use crate::domain::{JobInput, Task, TaskStatus, Workflow};
use crate::error::JobError;
use crate::jobs::{Job, policy};

/// Uniform random number in `[0, 1)`.
pub struct RandomJob;

#[async_trait]
impl Job for RandomJob {
    async fn run(&self, _task: &Task, _inputs: &[JobInput]) -> Result<Value, JobError> {
        let n: f64 = rand::thread_rng().r#gen();
        Ok(Value::from(n))
    }

    fn dependencies<'w>(&self, task: &Task, workflow: &'w Workflow) -> Vec<&'w Task> {
        policy::explicit_dependencies(task, workflow)
    }

    fn next_status(&self, task: &Task, workflow: &Workflow) -> Option<TaskStatus> {
        policy::default_next_status(task, &self.dependencies(task, workflow))
    }
}
