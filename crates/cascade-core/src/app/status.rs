//! Status - read-only views of a workflow for outside callers.

use serde::{Deserialize, Serialize};

use crate::domain::{StatusCounts, WorkflowId, WorkflowStatus};
use crate::error::{CoreError, Result};
use crate::ports::WorkflowStore;

/// Progress of a workflow.
///
/// # Example
/// ```ignore
/// let view = workflow_status(store.as_ref(), workflow_id).await?;
/// println!("{}/{}", view.completed_tasks, view.total_tasks);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatusView {
    pub workflow_id: WorkflowId,
    pub status: WorkflowStatus,
    pub completed_tasks: usize,
    pub total_tasks: usize,

    /// Per-status breakdown of the tasks.
    pub counts: StatusCounts,
}

/// Final output of a completed workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResultsView {
    pub workflow_id: WorkflowId,
    pub status: WorkflowStatus,
    pub final_result: serde_json::Value,
}

pub async fn workflow_status(
    store: &dyn WorkflowStore,
    workflow_id: WorkflowId,
) -> Result<WorkflowStatusView> {
    let workflow = store
        .get_workflow(workflow_id)
        .await?
        .ok_or(CoreError::WorkflowNotFound(workflow_id))?;
    let counts = workflow.counts();

    Ok(WorkflowStatusView {
        workflow_id,
        status: workflow.status,
        completed_tasks: counts.completed,
        total_tasks: workflow.tasks.len(),
        counts,
    })
}

/// Only a Completed workflow has results; anything else is `ResultsNotReady`.
pub async fn workflow_results(
    store: &dyn WorkflowStore,
    workflow_id: WorkflowId,
) -> Result<WorkflowResultsView> {
    let workflow = store
        .get_workflow(workflow_id)
        .await?
        .ok_or(CoreError::WorkflowNotFound(workflow_id))?;

    match (workflow.status, workflow.final_result) {
        (WorkflowStatus::Completed, Some(final_result)) => Ok(WorkflowResultsView {
            workflow_id,
            status: workflow.status,
            final_result,
        }),
        (status, _) => Err(CoreError::ResultsNotReady {
            workflow_id,
            status,
        }),
    }
}
