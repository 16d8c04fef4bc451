//! In-memory workflow store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::{
    NewResult, ResultId, Task, TaskId, TaskResult, TaskStatus, Workflow, WorkflowId,
    WorkflowStatus,
};
use crate::error::StoreError;
use crate::ports::{Clock, IdGenerator, SystemClock, UlidGenerator, WorkflowStore};

/// Workflow row without its tasks.
#[derive(Debug, Clone)]
struct WorkflowRow {
    client_id: String,
    status: WorkflowStatus,
    final_result: Option<Value>,
}

#[derive(Default)]
struct State {
    workflows: HashMap<WorkflowId, WorkflowRow>,

    /// All tasks (single source of truth for task rows).
    tasks: HashMap<TaskId, Task>,

    /// Task ids per workflow.
    by_workflow: HashMap<WorkflowId, Vec<TaskId>>,

    results: HashMap<ResultId, TaskResult>,
}

impl State {
    fn assemble(&self, workflow_id: WorkflowId) -> Option<Workflow> {
        let row = self.workflows.get(&workflow_id)?;
        let tasks = self
            .by_workflow
            .get(&workflow_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.tasks.get(id).cloned())
            .collect();

        let mut workflow = Workflow::new(workflow_id, row.client_id.clone(), tasks);
        workflow.status = row.status;
        workflow.final_result = row.final_result.clone();
        Some(workflow)
    }

    fn upsert_task(&mut self, task: &Task) -> Result<(), StoreError> {
        if !self.tasks.contains_key(&task.task_id) {
            let ids = self.by_workflow.get_mut(&task.workflow_id).ok_or_else(|| {
                StoreError::Corrupt(format!(
                    "{} references unknown workflow {}",
                    task.task_id, task.workflow_id
                ))
            })?;
            ids.push(task.task_id);
        }
        self.tasks.insert(task.task_id, task.clone());
        Ok(())
    }
}

/// `WorkflowStore` kept entirely in memory.
///
/// Cloning shares the same underlying state.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_parts(Arc::new(UlidGenerator::new(SystemClock)), Arc::new(SystemClock))
    }

    pub fn with_parts(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            ids,
            clock,
        }
    }

    /// Number of tasks currently in `status`, across all workflows.
    pub async fn count_tasks(&self, status: TaskStatus) -> usize {
        let state = self.state.lock().await;
        state.tasks.values().filter(|t| t.status == status).count()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowStore for InMemoryStore {
    async fn insert_workflow(&self, workflow: &Workflow) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.workflows.contains_key(&workflow.workflow_id) {
            return Err(StoreError::Corrupt(format!(
                "{} already exists",
                workflow.workflow_id
            )));
        }

        state.workflows.insert(
            workflow.workflow_id,
            WorkflowRow {
                client_id: workflow.client_id.clone(),
                status: workflow.status,
                final_result: workflow.final_result.clone(),
            },
        );
        state.by_workflow.insert(workflow.workflow_id, Vec::new());
        for task in &workflow.tasks {
            state.upsert_task(task)?;
        }
        Ok(())
    }

    async fn get_workflow(&self, workflow_id: WorkflowId) -> Result<Option<Workflow>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.assemble(workflow_id))
    }

    async fn save_workflow(&self, workflow: &Workflow) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let row = state
            .workflows
            .entry(workflow.workflow_id)
            .or_insert_with(|| WorkflowRow {
                client_id: workflow.client_id.clone(),
                status: workflow.status,
                final_result: None,
            });
        row.status = workflow.status;
        row.final_result = workflow.final_result.clone();
        state.by_workflow.entry(workflow.workflow_id).or_default();
        Ok(())
    }

    async fn save_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        for task in tasks {
            state.upsert_task(task)?;
        }
        Ok(())
    }

    async fn find_ready_task(&self) -> Result<Option<Task>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .tasks
            .values()
            .find(|t| t.status == TaskStatus::Ready)
            .cloned())
    }

    async fn save_result(&self, result: NewResult) -> Result<TaskResult, StoreError> {
        let stored = TaskResult {
            result_id: self.ids.generate_result_id(),
            task_id: result.task_id,
            data: result.data,
            created_at: self.clock.now(),
        };
        let mut state = self.state.lock().await;
        state.results.insert(stored.result_id, stored.clone());
        Ok(stored)
    }

    async fn get_results(&self, result_ids: &[ResultId]) -> Result<Vec<TaskResult>, StoreError> {
        let state = self.state.lock().await;
        Ok(result_ids
            .iter()
            .filter_map(|id| state.results.get(id).cloned())
            .collect())
    }
}
