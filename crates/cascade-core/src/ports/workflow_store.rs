//! WorkflowStore port - persistence boundary for workflows, tasks and results.
//!
//! The engine never touches storage except through this trait; the runner,
//! the scheduler loop and the status queries all receive it at construction.

use async_trait::async_trait;

use crate::domain::{NewResult, ResultId, Task, TaskResult, Workflow, WorkflowId};
use crate::error::StoreError;

/// Source of truth for workflow state.
///
/// # Contract
/// - `save_tasks` is an idempotent upsert keyed by `task_id`
/// - `save_workflow` upserts the workflow row only (status, final result);
///   tasks are written through `save_tasks`
/// - `get_workflow` returns the workflow with its tasks sorted by step
/// - results are immutable once saved
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Persist a new workflow together with all of its tasks.
    async fn insert_workflow(&self, workflow: &Workflow) -> Result<(), StoreError>;

    async fn get_workflow(&self, workflow_id: WorkflowId) -> Result<Option<Workflow>, StoreError>;

    async fn save_workflow(&self, workflow: &Workflow) -> Result<(), StoreError>;

    async fn save_tasks(&self, tasks: &[Task]) -> Result<(), StoreError>;

    /// Any one task in `Ready` status. No ordering is promised.
    async fn find_ready_task(&self) -> Result<Option<Task>, StoreError>;

    /// Store a result, assigning its id and timestamp.
    async fn save_result(&self, result: NewResult) -> Result<TaskResult, StoreError>;

    /// Bulk fetch; unknown ids are skipped.
    async fn get_results(&self, result_ids: &[ResultId]) -> Result<Vec<TaskResult>, StoreError>;
}
