use async_trait::async_trait;
use serde_json::{Value, json};

use super::geometry;
use crate::domain::{JobInput, Task, TaskStatus, Workflow};
use crate::error::JobError;
use crate::jobs::{Job, policy};

/// Describes the input polygon: ring count, vertex count and bounding box.
pub struct AnalysisJob;

#[async_trait]
impl Job for AnalysisJob {
    async fn run(&self, task: &Task, _inputs: &[JobInput]) -> Result<Value, JobError> {
        let rings = geometry::polygon_rings(&task.input)?;

        let mut vertices = 0usize;
        let mut bbox = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
        for &(lon, lat) in rings.iter().flatten() {
            vertices += 1;
            bbox[0] = bbox[0].min(lon);
            bbox[1] = bbox[1].min(lat);
            bbox[2] = bbox[2].max(lon);
            bbox[3] = bbox[3].max(lat);
        }
        if vertices == 0 {
            return Err(JobError::InvalidInput("polygon has no vertices".to_string()));
        }

        Ok(json!({
            "rings": rings.len(),
            "vertices": vertices,
            "bbox": bbox,
        }))
    }

    fn dependencies<'w>(&self, task: &Task, workflow: &'w Workflow) -> Vec<&'w Task> {
        policy::explicit_dependencies(task, workflow)
    }

    fn next_status(&self, task: &Task, workflow: &Workflow) -> Option<TaskStatus> {
        policy::default_next_status(task, &self.dependencies(task, workflow))
    }
}
