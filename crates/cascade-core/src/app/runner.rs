//! TaskRunner - executes one Ready task and settles its workflow.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::propagator::propagate;
use crate::domain::{
    JobInput, NewResult, STARTING_PROGRESS, Task, TaskId, TaskStatus, TaskType, Workflow,
    WorkflowId, WorkflowStatus,
};
use crate::error::{CoreError, JobError, Result};
use crate::jobs::{Job, JobRegistry};
use crate::ports::WorkflowStore;

/// What a single run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub task_id: TaskId,
    pub task_status: TaskStatus,
    pub workflow_id: WorkflowId,
    pub workflow_status: WorkflowStatus,

    /// Tasks the propagator moved after the run, in settle order.
    pub changed: Vec<TaskId>,
}

/// One entry of a completed workflow's final result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepSummary {
    step_number: u32,
    task_id: TaskId,
    #[serde(rename = "type")]
    task_type: TaskType,
    output: Option<Value>,
}

/// Runs a task's job and records the outcome.
///
/// Protocol for one Ready task:
/// 1. claim: InProgress + progress marker, saved
/// 2. resolve the job; an unregistered type settles the task as Failed
/// 3. collect dependency results into inputs
/// 4. run the job; success -> Completed, error -> Failed, both store a result
/// 5. reload the workflow, recompute its status, build the final result if Completed
/// 6. propagate and save the changed tasks, then the workflow
///
/// Job errors never escape; storage errors do.
pub struct TaskRunner {
    store: Arc<dyn WorkflowStore>,
    registry: Arc<JobRegistry>,
    job_timeout: Option<Duration>,
}

impl TaskRunner {
    pub fn new(store: Arc<dyn WorkflowStore>, registry: Arc<JobRegistry>) -> Self {
        Self {
            store,
            registry,
            job_timeout: None,
        }
    }

    /// Bound each job run; an expired run fails the task.
    pub fn with_job_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.job_timeout = timeout;
        self
    }

    /// Run `task`, which must be Ready. `workflow` is the snapshot the task was
    /// found in; dependencies are resolved against it.
    ///
    /// A task whose type has no registered job is settled as Failed before the
    /// `JobNotRegistered` error is returned, so it is never picked up again.
    pub async fn run(&self, task: &Task, workflow: &Workflow) -> Result<RunReport> {
        let mut task = task.clone();
        task.start(STARTING_PROGRESS)?;
        self.store.save_tasks(std::slice::from_ref(&task)).await?;

        let job = match self.registry.job_for(&task) {
            Ok(job) => job,
            Err(err) => {
                warn!(
                    task_id = %task.task_id,
                    task_type = %task.task_type,
                    "no job registered for task type"
                );
                let data = json!({ "error": err.to_string() });
                self.settle(task, TaskStatus::Failed, data).await?;
                return Err(err);
            }
        };
        info!(
            task_id = %task.task_id,
            task_type = %task.task_type,
            workflow_id = %task.workflow_id,
            "starting job"
        );

        let inputs = self.collect_inputs(job.as_ref(), &task, workflow).await?;
        let (status, data) = match self.invoke(job.as_ref(), &task, &inputs).await {
            Ok(Value::Null) => (TaskStatus::Completed, json!({})),
            Ok(output) => (TaskStatus::Completed, output),
            Err(err) => {
                warn!(
                    task_id = %task.task_id,
                    task_type = %task.task_type,
                    error = %err,
                    "job failed"
                );
                (TaskStatus::Failed, json!({ "error": err.to_string() }))
            }
        };

        self.settle(task, status, data).await
    }

    /// Store the outcome, finish the task and bring its workflow up to date.
    async fn settle(
        &self,
        mut task: Task,
        status: TaskStatus,
        data: Value,
    ) -> Result<RunReport> {
        let result = self
            .store
            .save_result(NewResult::new(task.task_id, data))
            .await?;
        task.finish(status, result.result_id)?;
        self.store.save_tasks(std::slice::from_ref(&task)).await?;
        info!(task_id = %task.task_id, status = %status, "job finished");

        let mut current = self
            .store
            .get_workflow(task.workflow_id)
            .await?
            .ok_or(CoreError::WorkflowNotFound(task.workflow_id))?;

        let workflow_status = current.recompute_status();
        if workflow_status == WorkflowStatus::Completed {
            current.final_result = Some(self.summarize(&current).await?);
        }

        let changed = propagate(&mut current, &self.registry)?;
        if !changed.is_empty() {
            self.store.save_tasks(&changed).await?;
        }
        self.store.save_workflow(&current).await?;

        if workflow_status.is_terminal() {
            info!(
                workflow_id = %current.workflow_id,
                status = %workflow_status,
                "workflow finished"
            );
        }

        Ok(RunReport {
            task_id: task.task_id,
            task_status: status,
            workflow_id: current.workflow_id,
            workflow_status,
            changed: changed.iter().map(|t| t.task_id).collect(),
        })
    }

    /// One input per dependency; `result` is `None` when there is none to fetch.
    async fn collect_inputs(
        &self,
        job: &dyn Job,
        task: &Task,
        workflow: &Workflow,
    ) -> Result<Vec<JobInput>> {
        let dependencies = job.dependencies(task, workflow);
        let result_ids: Vec<_> = dependencies.iter().filter_map(|d| d.result_id).collect();

        let mut results: HashMap<_, _> = if result_ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .get_results(&result_ids)
                .await?
                .into_iter()
                .map(|r| (r.result_id, r))
                .collect()
        };

        Ok(dependencies
            .into_iter()
            .map(|dep| {
                let result = dep.result_id.and_then(|id| results.remove(&id));
                JobInput::new(dep.clone(), result)
            })
            .collect())
    }

    async fn invoke(
        &self,
        job: &dyn Job,
        task: &Task,
        inputs: &[JobInput],
    ) -> std::result::Result<Value, JobError> {
        match self.job_timeout {
            Some(limit) => tokio::time::timeout(limit, job.run(task, inputs))
                .await
                .unwrap_or(Err(JobError::TimedOut(limit))),
            None => job.run(task, inputs).await,
        }
    }

    /// Final result of a completed workflow: every task's output in step order.
    async fn summarize(&self, workflow: &Workflow) -> Result<Value> {
        let result_ids: Vec<_> = workflow.tasks.iter().filter_map(|t| t.result_id).collect();
        let mut results: HashMap<_, _> = self
            .store
            .get_results(&result_ids)
            .await?
            .into_iter()
            .map(|r| (r.result_id, r.data))
            .collect();

        let steps: Vec<StepSummary> = workflow
            .tasks
            .iter()
            .map(|t| StepSummary {
                step_number: t.step_number,
                task_id: t.task_id,
                task_type: t.task_type.clone(),
                output: t.result_id.and_then(|id| results.remove(&id)),
            })
            .collect();

        Ok(json!({ "tasks": steps }))
    }
}
