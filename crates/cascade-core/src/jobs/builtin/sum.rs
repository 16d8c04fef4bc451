use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::domain::{JobInput, Task, TaskStatus, Workflow};
use crate::error::JobError;
use crate::jobs::{Job, policy};

/// Adds up the numeric outputs of the explicit dependencies.
pub struct SumJob;

#[async_trait]
impl Job for SumJob {
    async fn run(&self, task: &Task, inputs: &[JobInput]) -> Result<Value, JobError> {
        debug!(task_id = %task.task_id, inputs = inputs.len(), "summing dependency outputs");

        let mut total = 0.0;
        for input in inputs {
            let n = input.output().and_then(Value::as_f64).ok_or_else(|| {
                JobError::InvalidInput(format!(
                    "output of step {} is not a number",
                    input.task.step_number
                ))
            })?;
            total += n;
        }
        Ok(Value::from(total))
    }

    fn dependencies<'w>(&self, task: &Task, workflow: &'w Workflow) -> Vec<&'w Task> {
        policy::explicit_dependencies(task, workflow)
    }

    fn next_status(&self, task: &Task, workflow: &Workflow) -> Option<TaskStatus> {
        policy::default_next_status(task, &self.dependencies(task, workflow))
    }
}
