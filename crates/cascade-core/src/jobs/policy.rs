//! Dependency resolvers and readiness policies shared by job implementations.
//!
//! Jobs compose these instead of inheriting a default:
//! - [`explicit_dependencies`] / [`all_prior_dependencies`] pick the dependency set
//! - [`default_next_status`] / [`finished_next_status`] turn it into a status change
//!
//! Only *direct* dependencies are looked at. For a chain A -> B -> C where A
//! just became Aborted, B aborts on one propagation pass and C on the next.

use std::collections::BTreeSet;

use crate::domain::{Task, TaskStatus, Workflow};

/// Tasks whose step number is listed in `task.depends_on`.
pub fn explicit_dependencies<'w>(task: &Task, workflow: &'w Workflow) -> Vec<&'w Task> {
    let steps: &BTreeSet<u32> = &task.depends_on;
    workflow
        .tasks
        .iter()
        .filter(|t| steps.contains(&t.step_number))
        .collect()
}

/// Every task with a smaller step number (aggregation / report jobs).
pub fn all_prior_dependencies<'w>(task: &Task, workflow: &'w Workflow) -> Vec<&'w Task> {
    workflow
        .tasks
        .iter()
        .filter(|t| t.step_number < task.step_number)
        .collect()
}

/// Default readiness.
///
/// - any dependency in error -> Aborted
/// - all dependencies Completed -> Ready
/// - otherwise no change
///
/// Only Queued tasks move; Ready, running and finished tasks never change here.
pub fn default_next_status(task: &Task, dependencies: &[&Task]) -> Option<TaskStatus> {
    if task.status != TaskStatus::Queued {
        return None;
    }
    if dependencies.iter().any(|d| d.is_error()) {
        return Some(TaskStatus::Aborted);
    }
    if dependencies.iter().all(|d| d.status == TaskStatus::Completed) {
        return Some(TaskStatus::Ready);
    }
    None
}

/// Readiness for jobs that summarize outcomes, failures included:
/// Ready once every dependency is finished, whatever the result.
pub fn finished_next_status(task: &Task, dependencies: &[&Task]) -> Option<TaskStatus> {
    if task.status == TaskStatus::Queued && dependencies.iter().all(|d| d.is_finished()) {
        Some(TaskStatus::Ready)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskId, TaskType, WorkflowId};
    use rstest::rstest;
    use ulid::Ulid;

    fn task(step: u32, status: TaskStatus, deps: &[u32]) -> Task {
        let mut task = Task::new(
            TaskId::from_ulid(Ulid::new()),
            WorkflowId::from_ulid(Ulid::nil()),
            step,
            TaskType::new("random"),
        )
        .with_dependencies(deps.iter().copied());
        task.status = status;
        task
    }

    fn deps_with(statuses: &[TaskStatus]) -> Vec<Task> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, s)| task(i as u32 + 1, *s, &[]))
            .collect()
    }

    #[rstest]
    #[case::all_completed(&[TaskStatus::Completed, TaskStatus::Completed], Some(TaskStatus::Ready))]
    #[case::one_failed(&[TaskStatus::Completed, TaskStatus::Failed], Some(TaskStatus::Aborted))]
    #[case::one_aborted(&[TaskStatus::Aborted, TaskStatus::Queued], Some(TaskStatus::Aborted))]
    #[case::one_queued(&[TaskStatus::Completed, TaskStatus::Queued], None)]
    #[case::one_running(&[TaskStatus::Completed, TaskStatus::InProgress], None)]
    #[case::no_dependencies(&[], Some(TaskStatus::Ready))]
    fn default_policy(#[case] statuses: &[TaskStatus], #[case] expected: Option<TaskStatus>) {
        let deps = deps_with(statuses);
        let refs: Vec<&Task> = deps.iter().collect();
        let subject = task(10, TaskStatus::Queued, &[]);

        assert_eq!(default_next_status(&subject, &refs), expected);
    }

    #[rstest]
    #[case::all_completed(&[TaskStatus::Completed, TaskStatus::Completed], Some(TaskStatus::Ready))]
    #[case::failed_counts_as_finished(&[TaskStatus::Completed, TaskStatus::Failed], Some(TaskStatus::Ready))]
    #[case::aborted_counts_as_finished(&[TaskStatus::Aborted, TaskStatus::Failed], Some(TaskStatus::Ready))]
    #[case::one_queued(&[TaskStatus::Failed, TaskStatus::Queued], None)]
    #[case::one_ready(&[TaskStatus::Ready], None)]
    fn finished_policy(#[case] statuses: &[TaskStatus], #[case] expected: Option<TaskStatus>) {
        let deps = deps_with(statuses);
        let refs: Vec<&Task> = deps.iter().collect();
        let subject = task(10, TaskStatus::Queued, &[]);

        assert_eq!(finished_next_status(&subject, &refs), expected);
    }

    #[rstest]
    #[case::ready(TaskStatus::Ready)]
    #[case::in_progress(TaskStatus::InProgress)]
    #[case::completed(TaskStatus::Completed)]
    #[case::failed(TaskStatus::Failed)]
    #[case::aborted(TaskStatus::Aborted)]
    fn non_queued_tasks_never_change(#[case] status: TaskStatus) {
        let deps = deps_with(&[TaskStatus::Failed]);
        let refs: Vec<&Task> = deps.iter().collect();
        let subject = task(10, status, &[]);

        assert_eq!(default_next_status(&subject, &refs), None);
        assert_eq!(finished_next_status(&subject, &refs), None);
    }

    #[test]
    fn explicit_resolver_follows_depends_on() {
        let workflow_id = WorkflowId::from_ulid(Ulid::nil());
        let tasks = vec![
            task(1, TaskStatus::Completed, &[]),
            task(2, TaskStatus::Completed, &[]),
            task(3, TaskStatus::Queued, &[1]),
        ];
        let workflow = Workflow::new(workflow_id, "client", tasks);
        let subject = workflow.step(3).unwrap();

        let deps = explicit_dependencies(subject, &workflow);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].step_number, 1);
    }

    #[test]
    fn all_prior_resolver_ignores_depends_on() {
        let workflow_id = WorkflowId::from_ulid(Ulid::nil());
        let tasks = vec![
            task(1, TaskStatus::Completed, &[]),
            task(2, TaskStatus::Failed, &[]),
            task(3, TaskStatus::Queued, &[1]),
            task(4, TaskStatus::Queued, &[]),
        ];
        let workflow = Workflow::new(workflow_id, "client", tasks);
        let subject = workflow.step(3).unwrap();

        let steps: Vec<u32> = all_prior_dependencies(subject, &workflow)
            .iter()
            .map(|t| t.step_number)
            .collect();
        assert_eq!(steps, vec![1, 2]);
    }
}
