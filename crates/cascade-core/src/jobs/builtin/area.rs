use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::geometry;
use crate::domain::{JobInput, Task, TaskStatus, Workflow};
use crate::error::JobError;
use crate::jobs::{Job, policy};

/// Geodesic area, in square meters, of the task's input polygon.
pub struct PolygonAreaJob;

#[async_trait]
impl Job for PolygonAreaJob {
    async fn run(&self, task: &Task, _inputs: &[JobInput]) -> Result<Value, JobError> {
        let rings = geometry::polygon_rings(&task.input)?;
        let area = geometry::polygon_area(&rings);
        debug!(task_id = %task.task_id, area, "computed polygon area");

        if area.is_nan() || area <= 0.0 {
            return Err(JobError::Failed("Invalid area".to_string()));
        }
        Ok(Value::from(area))
    }

    fn dependencies<'w>(&self, task: &Task, workflow: &'w Workflow) -> Vec<&'w Task> {
        policy::explicit_dependencies(task, workflow)
    }

    fn next_status(&self, task: &Task, workflow: &Workflow) -> Option<TaskStatus> {
        policy::default_next_status(task, &self.dependencies(task, workflow))
    }
}
