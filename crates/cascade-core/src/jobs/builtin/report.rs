use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::domain::{JobInput, Task, TaskId, TaskStatus, TaskType, Workflow, WorkflowId};
use crate::error::JobError;
use crate::jobs::{Job, policy};

/// Summarizes every earlier step of the workflow, failures included.
///
/// Depends on all prior steps regardless of `depends_on`, and becomes Ready
/// once they are all finished, so it still runs after a failure upstream.
pub struct ReportJob;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    workflow_id: WorkflowId,
    tasks: Vec<TaskDigest>,
    tasks_status_summary: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskDigest {
    task_id: TaskId,
    #[serde(rename = "type")]
    task_type: TaskType,
    status: TaskStatus,
    output: Option<Value>,
}

#[async_trait]
impl Job for ReportJob {
    async fn run(&self, task: &Task, inputs: &[JobInput]) -> Result<Value, JobError> {
        info!(task_id = %task.task_id, tasks = inputs.len(), "generating report");

        let mut summary = Map::new();
        for status in TaskStatus::ALL {
            summary.insert(status.as_str().to_string(), Value::from(0u64));
        }
        for input in inputs {
            if let Some(Value::Number(n)) = summary.get_mut(input.task.status.as_str()) {
                *n = (n.as_u64().unwrap_or(0) + 1).into();
            }
        }

        let report = Report {
            workflow_id: task.workflow_id,
            tasks: inputs
                .iter()
                .map(|input| TaskDigest {
                    task_id: input.task.task_id,
                    task_type: input.task.task_type.clone(),
                    status: input.task.status,
                    output: input.output().cloned(),
                })
                .collect(),
            tasks_status_summary: summary,
        };

        serde_json::to_value(report).map_err(|e| JobError::Failed(e.to_string()))
    }

    fn dependencies<'w>(&self, task: &Task, workflow: &'w Workflow) -> Vec<&'w Task> {
        policy::all_prior_dependencies(task, workflow)
    }

    fn next_status(&self, task: &Task, workflow: &Workflow) -> Option<TaskStatus> {
        policy::finished_next_status(task, &self.dependencies(task, workflow))
    }
}
