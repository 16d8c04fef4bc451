//! Task and workflow state machines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Task status.
///
/// State transitions (forward only):
/// - Queued -> Ready -> InProgress -> Completed
/// - Queued -> Ready -> InProgress -> Failed
/// - Queued -> Aborted, Ready -> Aborted (a dependency ended in error)
///
/// Completed / Failed / Aborted are terminal ("finished").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for dependencies.
    Queued,

    /// Dependencies resolved favorably; eligible for execution.
    Ready,

    /// Claimed by a runner.
    InProgress,

    /// Job returned without error.
    Completed,

    /// Job returned an error.
    Failed,

    /// Never executed because a dependency ended in error.
    Aborted,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Queued,
        TaskStatus::Ready,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Failed,
        TaskStatus::Aborted,
    ];

    /// Terminal state (no further transitions).
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Aborted
        )
    }

    pub fn is_error(self) -> bool {
        matches!(self, TaskStatus::Failed | TaskStatus::Aborted)
    }

    pub fn is_pending(self) -> bool {
        matches!(
            self,
            TaskStatus::Queued | TaskStatus::Ready | TaskStatus::InProgress
        )
    }

    /// Is `self -> next` one of the legal forward edges?
    pub fn can_advance_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Queued, Ready)
                | (Queued, Aborted)
                | (Ready, InProgress)
                | (Ready, Aborted)
                | (InProgress, Completed)
                | (InProgress, Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Ready => "ready",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Aborted => "aborted",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow status, always derived from the task statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Submitted, no task has run yet.
    Initial,
    InProgress,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStatus::Initial => "initial",
            WorkflowStatus::InProgress => "in_progress",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
