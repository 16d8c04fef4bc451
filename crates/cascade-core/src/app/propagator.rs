//! Status propagator - settles Queued tasks after a change in a workflow.

use tracing::info;

use crate::domain::{Task, TaskStatus, Workflow};
use crate::error::Result;
use crate::jobs::JobRegistry;

/// Advance every Queued task whose job says it can move, until nothing moves.
///
/// Each pass walks the still-unchanged Queued tasks in order and applies a
/// change as soon as it is decided, so later tasks in the same pass already
/// see it. Tasks changed in one pass are not looked at again; the loop stops
/// after the first pass without changes.
///
/// Returns the changed tasks in the order they settled. Nothing is persisted.
pub fn propagate(workflow: &mut Workflow, registry: &JobRegistry) -> Result<Vec<Task>> {
    let mut remaining: Vec<usize> = workflow
        .tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.status == TaskStatus::Queued)
        .map(|(idx, _)| idx)
        .collect();
    let mut changed: Vec<usize> = Vec::new();

    loop {
        let mut unchanged = Vec::with_capacity(remaining.len());
        let settled_before = changed.len();

        for idx in remaining {
            let task = &workflow.tasks[idx];
            let job = registry.job_for(task)?;
            match job.next_status(task, workflow) {
                Some(next) if next != task.status => {
                    let task = &mut workflow.tasks[idx];
                    task.advance(next)?;
                    info!(
                        task_id = %task.task_id,
                        task_type = %task.task_type,
                        status = %next,
                        "task status changed"
                    );
                    changed.push(idx);
                }
                _ => unchanged.push(idx),
            }
        }

        if changed.len() == settled_before {
            break;
        }
        remaining = unchanged;
    }

    Ok(changed
        .into_iter()
        .map(|idx| workflow.tasks[idx].clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::{TaskId, TaskType, WorkflowId};
    use ulid::Ulid;

    fn registry() -> JobRegistry {
        JobRegistry::builtin(&EngineConfig::default()).unwrap()
    }

    fn workflow(rows: &[(u32, &str, TaskStatus, &[u32])]) -> Workflow {
        let workflow_id = WorkflowId::from_ulid(Ulid::new());
        let tasks = rows
            .iter()
            .map(|(step, task_type, status, deps)| {
                let mut task = Task::new(
                    TaskId::from_ulid(Ulid::new()),
                    workflow_id,
                    *step,
                    TaskType::new(*task_type),
                )
                .with_dependencies(deps.iter().copied());
                task.status = *status;
                task
            })
            .collect();
        Workflow::new(workflow_id, "client-1", tasks)
    }

    fn statuses(workflow: &Workflow) -> Vec<TaskStatus> {
        workflow.tasks.iter().map(|t| t.status).collect()
    }

    #[test]
    fn seeds_dependency_free_tasks() {
        let mut wf = workflow(&[
            (1, "random", TaskStatus::Queued, &[]),
            (2, "random", TaskStatus::Queued, &[]),
            (3, "sum", TaskStatus::Queued, &[1, 2]),
        ]);

        let changed = propagate(&mut wf, &registry()).unwrap();

        assert_eq!(changed.len(), 2);
        assert_eq!(
            statuses(&wf),
            vec![TaskStatus::Ready, TaskStatus::Ready, TaskStatus::Queued]
        );
    }

    #[test]
    fn failure_cascades_down_a_chain() {
        let mut wf = workflow(&[
            (1, "fail", TaskStatus::Failed, &[]),
            (2, "random", TaskStatus::Queued, &[1]),
            (3, "random", TaskStatus::Queued, &[2]),
        ]);

        let changed = propagate(&mut wf, &registry()).unwrap();

        let steps: Vec<u32> = changed.iter().map(|t| t.step_number).collect();
        assert_eq!(steps, vec![2, 3]);
        assert_eq!(
            statuses(&wf),
            vec![TaskStatus::Failed, TaskStatus::Aborted, TaskStatus::Aborted]
        );
    }

    #[test]
    fn later_pass_picks_up_tasks_unlocked_earlier() {
        // Step 2 depends on step 3, which settles after it in the first pass.
        let mut wf = workflow(&[
            (1, "fail", TaskStatus::Failed, &[]),
            (2, "random", TaskStatus::Queued, &[3]),
            (3, "random", TaskStatus::Queued, &[1]),
        ]);

        let changed = propagate(&mut wf, &registry()).unwrap();

        let steps: Vec<u32> = changed.iter().map(|t| t.step_number).collect();
        assert_eq!(steps, vec![3, 2]);
        assert!(changed.iter().all(|t| t.status == TaskStatus::Aborted));
    }

    #[test]
    fn settled_workflow_yields_no_changes() {
        let mut wf = workflow(&[
            (1, "random", TaskStatus::Completed, &[]),
            (2, "fail", TaskStatus::Failed, &[1]),
            (3, "sum", TaskStatus::Queued, &[2]),
            (4, "report", TaskStatus::Queued, &[]),
        ]);
        let registry = registry();

        let first = propagate(&mut wf, &registry).unwrap();
        assert_eq!(first.len(), 2);

        let again = propagate(&mut wf, &registry).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn running_and_finished_tasks_are_left_alone() {
        let mut wf = workflow(&[
            (1, "random", TaskStatus::InProgress, &[]),
            (2, "random", TaskStatus::Ready, &[]),
            (3, "random", TaskStatus::Completed, &[]),
        ]);
        let before = statuses(&wf);

        assert!(propagate(&mut wf, &registry()).unwrap().is_empty());
        assert_eq!(statuses(&wf), before);
    }

    #[test]
    fn aggregation_job_runs_after_failure_while_default_job_aborts() {
        let mut wf = workflow(&[
            (1, "random", TaskStatus::Completed, &[]),
            (2, "fail", TaskStatus::Failed, &[]),
            (3, "report", TaskStatus::Queued, &[]),
            (4, "sum", TaskStatus::Queued, &[1, 2]),
        ]);

        propagate(&mut wf, &registry()).unwrap();

        assert_eq!(wf.step(3).unwrap().status, TaskStatus::Ready);
        assert_eq!(wf.step(4).unwrap().status, TaskStatus::Aborted);
    }

    #[test]
    fn unknown_task_type_is_an_error() {
        let mut wf = workflow(&[(1, "mystery", TaskStatus::Queued, &[])]);
        assert!(propagate(&mut wf, &registry()).is_err());
    }
}
