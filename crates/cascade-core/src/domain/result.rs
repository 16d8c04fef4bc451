//! Job results and the inputs handed to a job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ResultId, Task, TaskId};

/// Immutable output of one task run (or its failure description).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub result_id: ResultId,
    pub task_id: TaskId,

    /// Serialized job output; opaque to the engine.
    pub data: serde_json::Value,

    pub created_at: DateTime<Utc>,
}

/// A result that has not been stored yet. The store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResult {
    pub task_id: TaskId,
    pub data: serde_json::Value,
}

impl NewResult {
    pub fn new(task_id: TaskId, data: serde_json::Value) -> Self {
        Self { task_id, data }
    }
}

/// A dependency task paired with its result, built fresh for each job run.
///
/// `result` is `None` when the dependency never produced one.
#[derive(Debug, Clone, PartialEq)]
pub struct JobInput {
    pub task: Task,
    pub result: Option<TaskResult>,
}

impl JobInput {
    pub fn new(task: Task, result: Option<TaskResult>) -> Self {
        Self { task, result }
    }

    pub fn output(&self) -> Option<&serde_json::Value> {
        self.result.as_ref().map(|r| &r.data)
    }
}
