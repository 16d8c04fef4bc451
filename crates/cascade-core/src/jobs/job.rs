//! Job trait - the unit of work bound to a task type.

use async_trait::async_trait;

use crate::domain::{JobInput, Task, TaskStatus, Workflow};
use crate::error::JobError;

/// A job computes a task's output and decides how the task's status moves.
///
/// The three operations are independent so that most jobs can share the
/// helpers in [`super::policy`] while aggregation-style jobs swap only the
/// dependency set and the readiness predicate.
///
/// # Example
/// ```ignore
/// struct EchoJob;
///
/// #[async_trait]
/// impl Job for EchoJob {
///     async fn run(&self, task: &Task, _inputs: &[JobInput]) -> Result<Value, JobError> {
///         Ok(task.input.clone())
///     }
///
///     fn dependencies<'w>(&self, task: &Task, workflow: &'w Workflow) -> Vec<&'w Task> {
///         policy::explicit_dependencies(task, workflow)
///     }
///
///     fn next_status(&self, task: &Task, workflow: &Workflow) -> Option<TaskStatus> {
///         policy::default_next_status(task, &self.dependencies(task, workflow))
///     }
/// }
/// ```
#[async_trait]
pub trait Job: Send + Sync {
    /// Do the work. Any error marks the task Failed; the caller never retries.
    async fn run(&self, task: &Task, inputs: &[JobInput]) -> Result<serde_json::Value, JobError>;

    /// Tasks of the same workflow this task depends on.
    fn dependencies<'w>(&self, task: &Task, workflow: &'w Workflow) -> Vec<&'w Task>;

    /// Next status given the dependencies' current statuses, or `None` for no change.
    fn next_status(&self, task: &Task, workflow: &Workflow) -> Option<TaskStatus>;
}
