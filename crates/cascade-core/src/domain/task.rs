use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::{ResultId, TaskId, TaskStatus, WorkflowId};
use crate::error::CoreError;

/// Progress marker set while a job is running.
pub const STARTING_PROGRESS: &str = "starting job...";

/// Task type string as stored (selects the job).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(String);

impl TaskType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One step of a workflow.
///
/// Status changes go through [`Task::advance`], which only accepts forward
/// edges of the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub workflow_id: WorkflowId,

    /// Unique within the workflow, starts at 1.
    pub step_number: u32,

    pub task_type: TaskType,
    pub status: TaskStatus,

    /// Step numbers this task explicitly depends on.
    #[serde(default)]
    pub depends_on: BTreeSet<u32>,

    /// Set once a run attempt has produced a result (success or failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_id: Option<ResultId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,

    /// Client payload handed to the job (opaque to the engine).
    #[serde(default)]
    pub input: serde_json::Value,
}

impl Task {
    pub fn new(
        task_id: TaskId,
        workflow_id: WorkflowId,
        step_number: u32,
        task_type: TaskType,
    ) -> Self {
        Self {
            task_id,
            workflow_id,
            step_number,
            task_type,
            status: TaskStatus::Queued,
            depends_on: BTreeSet::new(),
            result_id: None,
            progress: None,
            input: serde_json::Value::Null,
        }
    }

    pub fn with_dependencies(mut self, steps: impl IntoIterator<Item = u32>) -> Self {
        self.depends_on.extend(steps);
        self
    }

    pub fn with_input(mut self, input: serde_json::Value) -> Self {
        self.input = input;
        self
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn is_error(&self) -> bool {
        self.status.is_error()
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Move to `next`, rejecting anything that is not a forward edge.
    pub fn advance(&mut self, next: TaskStatus) -> Result<(), CoreError> {
        if !self.status.can_advance_to(next) {
            return Err(CoreError::IllegalTransition {
                task_id: self.task_id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Claim the task for execution (Ready -> InProgress).
    pub fn start(&mut self, progress: impl Into<String>) -> Result<(), CoreError> {
        self.advance(TaskStatus::InProgress)?;
        self.progress = Some(progress.into());
        Ok(())
    }

    /// Record the end of a run (InProgress -> Completed | Failed).
    pub fn finish(&mut self, status: TaskStatus, result_id: ResultId) -> Result<(), CoreError> {
        if !matches!(status, TaskStatus::Completed | TaskStatus::Failed) {
            return Err(CoreError::IllegalTransition {
                task_id: self.task_id,
                from: self.status,
                to: status,
            });
        }
        self.advance(status)?;
        self.result_id = Some(result_id);
        self.progress = None;
        Ok(())
    }
}
