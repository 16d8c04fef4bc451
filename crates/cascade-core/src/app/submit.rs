//! Workflow submission - turns a client draft into stored, seeded tasks.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::propagator::propagate;
use crate::domain::{Task, TaskType, Workflow};
use crate::error::{CoreError, Result};
use crate::jobs::{Job, JobKind, JobRegistry};
use crate::ports::{IdGenerator, WorkflowStore};

/// One step as the client describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub step_number: u32,
    pub task_type: TaskType,

    #[serde(default)]
    pub depends_on: Vec<u32>,

    /// Overrides the workflow-wide input for this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

impl TaskDraft {
    pub fn new(step_number: u32, kind: JobKind) -> Self {
        Self {
            step_number,
            task_type: kind.task_type(),
            depends_on: Vec::new(),
            input: None,
        }
    }

    pub fn depends_on(mut self, steps: impl IntoIterator<Item = u32>) -> Self {
        self.depends_on.extend(steps);
        self
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }
}

/// A workflow as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDraft {
    pub client_id: String,

    /// Input handed to every step that has none of its own.
    #[serde(default)]
    pub input: Value,

    pub tasks: Vec<TaskDraft>,
}

impl WorkflowDraft {
    pub fn new(client_id: impl Into<String>, input: Value) -> Self {
        Self {
            client_id: client_id.into(),
            input,
            tasks: Vec::new(),
        }
    }

    pub fn task(mut self, task: TaskDraft) -> Self {
        self.tasks.push(task);
        self
    }
}

/// Validate `draft` and build the workflow with every task Queued.
///
/// Rejected with `InvalidDefinition`:
/// - no tasks
/// - a step number of 0 or a repeated step number
/// - a dependency on a missing step or on the step itself
/// - a dependency cycle (its tasks could never become Ready); the graph checked
///   is the one each job resolves, so implicit edges such as a report's
///   dependency on every earlier step count too
///
/// Task types must name a registered job (`UnknownTaskType` / `JobNotRegistered`).
pub fn instantiate(
    draft: &WorkflowDraft,
    registry: &JobRegistry,
    ids: &dyn IdGenerator,
) -> Result<Workflow> {
    if draft.tasks.is_empty() {
        return Err(invalid("a workflow needs at least one task"));
    }

    let mut graph: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    for task in &draft.tasks {
        if task.step_number == 0 {
            return Err(invalid("step numbers start at 1"));
        }
        let deps = task.depends_on.iter().copied().collect();
        if graph.insert(task.step_number, deps).is_some() {
            return Err(invalid(format!("duplicate step {}", task.step_number)));
        }

        let kind = JobKind::try_from(&task.task_type)?;
        if !registry.contains(kind) {
            return Err(CoreError::JobNotRegistered(task.task_type.clone()));
        }
    }

    for (step, deps) in &graph {
        for dep in deps {
            if dep == step {
                return Err(invalid(format!("step {step} depends on itself")));
            }
            if !graph.contains_key(dep) {
                return Err(invalid(format!("step {step} depends on missing step {dep}")));
            }
        }
    }
    let workflow_id = ids.generate_workflow_id();
    let tasks = draft
        .tasks
        .iter()
        .map(|t| {
            Task::new(
                ids.generate_task_id(),
                workflow_id,
                t.step_number,
                t.task_type.clone(),
            )
            .with_dependencies(t.depends_on.iter().copied())
            .with_input(t.input.clone().unwrap_or_else(|| draft.input.clone()))
        })
        .collect();

    let workflow = Workflow::new(workflow_id, draft.client_id.clone(), tasks);

    let mut resolved: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    for task in &workflow.tasks {
        let deps = registry
            .job_for(task)?
            .dependencies(task, &workflow)
            .iter()
            .map(|d| d.step_number)
            .collect();
        resolved.insert(task.step_number, deps);
    }
    if let Some(step) = find_cycle(&resolved) {
        return Err(invalid(format!("dependency cycle through step {step}")));
    }

    Ok(workflow)
}

/// Build, seed and store a workflow.
///
/// Seeding runs the propagator once, so every task whose job considers its
/// dependencies satisfied starts out Ready.
pub async fn submit_workflow(
    store: &dyn WorkflowStore,
    registry: &JobRegistry,
    ids: &dyn IdGenerator,
    draft: &WorkflowDraft,
) -> Result<Workflow> {
    let mut workflow = instantiate(draft, registry, ids)?;
    let seeded = propagate(&mut workflow, registry)?;
    store.insert_workflow(&workflow).await?;

    info!(
        workflow_id = %workflow.workflow_id,
        client_id = %workflow.client_id,
        tasks = workflow.tasks.len(),
        ready = seeded.len(),
        "workflow submitted"
    );
    Ok(workflow)
}

fn invalid(msg: impl Into<String>) -> CoreError {
    CoreError::InvalidDefinition(msg.into())
}

/// Some step on a cycle, if the dependency graph has one.
fn find_cycle(graph: &BTreeMap<u32, BTreeSet<u32>>) -> Option<u32> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    let mut marks: BTreeMap<u32, Mark> = BTreeMap::new();
    for &root in graph.keys() {
        if marks.contains_key(&root) {
            continue;
        }
        // iterative DFS: (step, remaining deps)
        let mut stack: Vec<(u32, Vec<u32>)> = Vec::new();
        marks.insert(root, Mark::Visiting);
        stack.push((root, graph[&root].iter().copied().collect()));

        while let Some((step, pending)) = stack.last_mut() {
            match pending.pop() {
                Some(dep) => match marks.get(&dep) {
                    Some(Mark::Visiting) => return Some(dep),
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(dep, Mark::Visiting);
                        let next = graph.get(&dep).map(|d| d.iter().copied().collect());
                        stack.push((dep, next.unwrap_or_default()));
                    }
                },
                None => {
                    marks.insert(*step, Mark::Done);
                    stack.pop();
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::{TaskStatus, WorkflowStatus};
    use crate::impls::InMemoryStore;
    use crate::ports::{SystemClock, UlidGenerator};
    use serde_json::json;
    use std::sync::Arc;

    fn registry() -> JobRegistry {
        JobRegistry::builtin(&EngineConfig::default()).unwrap()
    }

    fn ids() -> UlidGenerator<SystemClock> {
        UlidGenerator::new(SystemClock)
    }

    fn sample() -> WorkflowDraft {
        WorkflowDraft::new("client-1", json!({"type": "Polygon", "coordinates": []}))
            .task(TaskDraft::new(1, JobKind::Analysis))
            .task(TaskDraft::new(2, JobKind::Area).with_input(json!({"custom": true})))
            .task(TaskDraft::new(3, JobKind::Notification).depends_on([2]))
            .task(TaskDraft::new(4, JobKind::Report))
    }

    #[tokio::test]
    async fn submit_seeds_ready_tasks_and_stores() {
        let store = Arc::new(InMemoryStore::new());
        let workflow = submit_workflow(store.as_ref(), &registry(), &ids(), &sample())
            .await
            .unwrap();

        let statuses: Vec<TaskStatus> = workflow.tasks.iter().map(|t| t.status).collect();
        assert_eq!(
            statuses,
            vec![
                TaskStatus::Ready,
                TaskStatus::Ready,
                TaskStatus::Queued,
                TaskStatus::Queued,
            ]
        );
        assert_eq!(workflow.status, WorkflowStatus::Initial);

        let stored = store.get_workflow(workflow.workflow_id).await.unwrap().unwrap();
        assert_eq!(stored, workflow);
    }

    #[test]
    fn step_input_overrides_shared_input() {
        let workflow = instantiate(&sample(), &registry(), &ids()).unwrap();
        assert_eq!(workflow.step(1).unwrap().input["type"], "Polygon");
        assert_eq!(workflow.step(2).unwrap().input, json!({"custom": true}));
        assert!(workflow.tasks.iter().all(|t| t.status == TaskStatus::Queued));
    }

    #[test]
    fn rejects_empty_workflow() {
        let draft = WorkflowDraft::new("client-1", Value::Null);
        assert!(matches!(
            instantiate(&draft, &registry(), &ids()),
            Err(CoreError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn rejects_bad_steps() {
        let zero = WorkflowDraft::new("c", Value::Null).task(TaskDraft::new(0, JobKind::Random));
        let duplicate = WorkflowDraft::new("c", Value::Null)
            .task(TaskDraft::new(1, JobKind::Random))
            .task(TaskDraft::new(1, JobKind::Sum));
        let missing = WorkflowDraft::new("c", Value::Null)
            .task(TaskDraft::new(1, JobKind::Sum).depends_on([7]));
        let own = WorkflowDraft::new("c", Value::Null)
            .task(TaskDraft::new(1, JobKind::Sum).depends_on([1]));
        let cycle = WorkflowDraft::new("c", Value::Null)
            .task(TaskDraft::new(1, JobKind::Sum).depends_on([3]))
            .task(TaskDraft::new(2, JobKind::Sum).depends_on([1]))
            .task(TaskDraft::new(3, JobKind::Sum).depends_on([2]));

        for draft in [zero, duplicate, missing, own, cycle] {
            assert!(
                matches!(
                    instantiate(&draft, &registry(), &ids()),
                    Err(CoreError::InvalidDefinition(_))
                ),
                "{draft:?}"
            );
        }
    }

    #[test]
    fn rejects_cycle_through_implicit_report_dependencies() {
        // report depends on every earlier step, so sum -> report -> sum
        let draft = WorkflowDraft::new("c", Value::Null)
            .task(TaskDraft::new(1, JobKind::Sum).depends_on([2]))
            .task(TaskDraft::new(2, JobKind::Report));
        assert!(matches!(
            instantiate(&draft, &registry(), &ids()),
            Err(CoreError::InvalidDefinition(msg)) if msg.contains("cycle")
        ));
    }

    #[tokio::test]
    async fn cyclic_draft_is_not_stored() {
        let store = InMemoryStore::new();
        let draft = WorkflowDraft::new("c", Value::Null)
            .task(TaskDraft::new(1, JobKind::Sum).depends_on([2]))
            .task(TaskDraft::new(2, JobKind::Report));

        let result = submit_workflow(&store, &registry(), &ids(), &draft).await;
        assert!(matches!(result, Err(CoreError::InvalidDefinition(_))));
        assert_eq!(store.count_tasks(TaskStatus::Queued).await, 0);
    }

    #[test]
    fn report_after_its_dependencies_is_fine() {
        let draft = WorkflowDraft::new("c", Value::Null)
            .task(TaskDraft::new(1, JobKind::Random))
            .task(TaskDraft::new(2, JobKind::Sum).depends_on([1]))
            .task(TaskDraft::new(3, JobKind::Report));
        assert!(instantiate(&draft, &registry(), &ids()).is_ok());
    }

    #[test]
    fn forward_dependencies_without_cycle_are_fine() {
        let draft = WorkflowDraft::new("c", Value::Null)
            .task(TaskDraft::new(1, JobKind::Sum).depends_on([2, 3]))
            .task(TaskDraft::new(2, JobKind::Random).depends_on([3]))
            .task(TaskDraft::new(3, JobKind::Random));
        assert!(instantiate(&draft, &registry(), &ids()).is_ok());
    }

    #[test]
    fn rejects_unknown_and_unregistered_types() {
        let mut unknown = TaskDraft::new(1, JobKind::Random);
        unknown.task_type = TaskType::new("polygonArea");
        let draft = WorkflowDraft::new("c", Value::Null).task(unknown);
        assert!(matches!(
            instantiate(&draft, &registry(), &ids()),
            Err(CoreError::UnknownTaskType(_))
        ));

        let only_sum = JobRegistry::builder()
            .register(JobKind::Sum, Arc::new(crate::jobs::builtin::SumJob))
            .unwrap()
            .build()
            .unwrap();
        let draft = WorkflowDraft::new("c", Value::Null).task(TaskDraft::new(1, JobKind::Random));
        assert!(matches!(
            instantiate(&draft, &only_sum, &ids()),
            Err(CoreError::JobNotRegistered(_))
        ));
    }
}
