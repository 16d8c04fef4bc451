//! Workflow record and aggregate status.

use serde::{Deserialize, Serialize};

use super::{Task, TaskId, TaskStatus, WorkflowId, WorkflowStatus};

/// An ordered set of tasks belonging to one client submission.
///
/// Design:
/// - `tasks` is kept sorted by `step_number`.
/// - `status` is never set directly; it is recomputed from the tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub workflow_id: WorkflowId,
    pub client_id: String,
    pub status: WorkflowStatus,
    pub tasks: Vec<Task>,

    /// Set only once the workflow is Completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_result: Option<serde_json::Value>,
}

impl Workflow {
    pub fn new(
        workflow_id: WorkflowId,
        client_id: impl Into<String>,
        mut tasks: Vec<Task>,
    ) -> Self {
        tasks.sort_by_key(|t| t.step_number);
        Self {
            workflow_id,
            client_id: client_id.into(),
            status: WorkflowStatus::Initial,
            tasks,
            final_result: None,
        }
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.task_id == task_id)
    }

    pub fn step(&self, step_number: u32) -> Option<&Task> {
        self.tasks.iter().find(|t| t.step_number == step_number)
    }

    /// Aggregate status as a pure function of task statuses.
    ///
    /// - any Failed -> Failed
    /// - all Completed -> Completed
    /// - otherwise -> InProgress
    ///
    /// Aborted counts as neither, so a workflow holding only Completed and
    /// Aborted tasks stays InProgress.
    pub fn aggregate_status(tasks: &[Task]) -> WorkflowStatus {
        if tasks.iter().any(|t| t.status == TaskStatus::Failed) {
            WorkflowStatus::Failed
        } else if tasks.iter().all(|t| t.status == TaskStatus::Completed) {
            WorkflowStatus::Completed
        } else {
            WorkflowStatus::InProgress
        }
    }

    /// Recompute and store the aggregate status.
    pub fn recompute_status(&mut self) -> WorkflowStatus {
        self.status = Self::aggregate_status(&self.tasks);
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for task in &self.tasks {
            counts.record(task.status);
        }
        counts
    }
}

/// Number of tasks per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub queued: usize,
    pub ready: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
    pub aborted: usize,
}

impl StatusCounts {
    fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Queued => self.queued += 1,
            TaskStatus::Ready => self.ready += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Completed => self.completed += 1,
            TaskStatus::Failed => self.failed += 1,
            TaskStatus::Aborted => self.aborted += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.queued + self.ready + self.in_progress + self.completed + self.failed + self.aborted
    }
}
