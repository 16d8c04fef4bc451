use std::time::Duration;

use thiserror::Error;

use crate::domain::{TaskId, TaskStatus, TaskType, WorkflowId, WorkflowStatus};
use crate::jobs::JobKind;

/// Error returned by a job run.
///
/// The runner turns any of these into a Failed task; they never escape it.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("{0}")]
    Failed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("job timed out after {0:?}")]
    TimedOut(Duration),
}

/// Persistence failure. Not handled by the engine; it surfaces to the scheduler.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown task type: {0}")]
    UnknownTaskType(TaskType),

    #[error("no job registered for task_type={0}")]
    JobNotRegistered(TaskType),

    #[error("duplicate job for kind={0}")]
    DuplicateJob(JobKind),

    #[error("missing job kinds: {0:?}. These kinds were expected but not registered.")]
    MissingJobs(Vec<JobKind>),

    #[error("illegal status transition for {task_id}: {from} -> {to}")]
    IllegalTransition {
        task_id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("workflow not found: {0}")]
    WorkflowNotFound(WorkflowId),

    #[error("results for {workflow_id} are not ready (status: {status})")]
    ResultsNotReady {
        workflow_id: WorkflowId,
        status: WorkflowStatus,
    },

    #[error("invalid workflow definition: {0}")]
    InvalidDefinition(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
