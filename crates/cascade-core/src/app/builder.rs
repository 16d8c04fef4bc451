//! AppBuilder - wiring of store, registry and runner.
//!
//! Startup checks fail fast: a registry missing an expected job kind is an
//! error from `build()`, not from the first task that needs it.

use std::sync::Arc;

use super::runner::TaskRunner;
use super::scheduler::{SchedulerHandle, SchedulerLoop};
use super::status::{WorkflowResultsView, WorkflowStatusView, workflow_results, workflow_status};
use super::submit::{WorkflowDraft, submit_workflow};
use crate::config::EngineConfig;
use crate::domain::{Workflow, WorkflowId};
use crate::error::Result;
use crate::impls::InMemoryStore;
use crate::jobs::{Job, JobKind, JobRegistry, JobRegistryBuilder};
use crate::ports::{IdGenerator, SystemClock, UlidGenerator, WorkflowStore};

/// Builds an [`App`].
///
/// # Example
/// ```ignore
/// let app = AppBuilder::new(config)
///     .with_builtin_jobs()?
///     .expect_kinds(&JobKind::ALL)
///     .build()?;
/// ```
///
/// Without `store(..)` the app uses an [`InMemoryStore`].
pub struct AppBuilder {
    config: EngineConfig,
    registry: JobRegistryBuilder,
    store: Option<Arc<dyn WorkflowStore>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl AppBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: JobRegistryBuilder::new(),
            store: None,
            ids: None,
        }
    }

    pub fn store(mut self, store: Arc<dyn WorkflowStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn register(mut self, kind: JobKind, job: Arc<dyn Job>) -> Result<Self> {
        self.registry = self.registry.register(kind, job)?;
        Ok(self)
    }

    pub fn with_builtin_jobs(mut self) -> Result<Self> {
        self.registry = self.registry.with_builtin(&self.config)?;
        Ok(self)
    }

    pub fn expect_kinds(mut self, kinds: &[JobKind]) -> Self {
        self.registry = self.registry.expect_kinds(kinds);
        self
    }

    /// Fails with `MissingJobs` if an expected kind has no job.
    pub fn build(self) -> Result<App> {
        let registry = Arc::new(self.registry.build()?);
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()) as Arc<dyn WorkflowStore>);
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock)) as Arc<dyn IdGenerator>);
        let runner = Arc::new(
            TaskRunner::new(store.clone(), registry.clone())
                .with_job_timeout(self.config.job_timeout()),
        );

        Ok(App {
            config: self.config,
            store,
            registry,
            ids,
            runner,
        })
    }
}

/// A wired engine: submit workflows, query them, drive the scheduler.
pub struct App {
    config: EngineConfig,
    store: Arc<dyn WorkflowStore>,
    registry: Arc<JobRegistry>,
    ids: Arc<dyn IdGenerator>,
    runner: Arc<TaskRunner>,
}

impl App {
    pub async fn submit(&self, draft: &WorkflowDraft) -> Result<Workflow> {
        submit_workflow(self.store.as_ref(), &self.registry, self.ids.as_ref(), draft).await
    }

    pub async fn status(&self, workflow_id: WorkflowId) -> Result<WorkflowStatusView> {
        workflow_status(self.store.as_ref(), workflow_id).await
    }

    pub async fn results(&self, workflow_id: WorkflowId) -> Result<WorkflowResultsView> {
        workflow_results(self.store.as_ref(), workflow_id).await
    }

    pub fn scheduler(&self) -> SchedulerLoop {
        SchedulerLoop::new(
            self.store.clone(),
            self.runner.clone(),
            self.config.poll_interval(),
        )
    }

    pub fn spawn_scheduler(&self) -> SchedulerHandle {
        SchedulerHandle::spawn(self.scheduler())
    }

    pub fn runner(&self) -> &Arc<TaskRunner> {
        &self.runner
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn WorkflowStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::submit::TaskDraft;
    use crate::domain::WorkflowStatus;
    use crate::error::CoreError;
    use crate::jobs::builtin::SumJob;
    use serde_json::Value;

    #[test]
    fn test_build_success() {
        let app = AppBuilder::new(EngineConfig::default())
            .with_builtin_jobs()
            .unwrap()
            .expect_kinds(&JobKind::ALL)
            .build();
        assert!(app.is_ok());
    }

    #[test]
    fn test_build_missing_kinds() {
        let app = AppBuilder::new(EngineConfig::default())
            .register(JobKind::Sum, Arc::new(SumJob))
            .unwrap()
            .expect_kinds(&[JobKind::Sum, JobKind::Report])
            .build();
        assert!(matches!(
            app,
            Err(CoreError::MissingJobs(missing)) if missing == vec![JobKind::Report]
        ));
    }

    #[test]
    fn test_build_no_expect_kinds() {
        let app = AppBuilder::new(EngineConfig::default())
            .register(JobKind::Sum, Arc::new(SumJob))
            .unwrap()
            .build();
        assert!(app.is_ok());
    }

    #[tokio::test]
    async fn submit_and_drive_to_completion() {
        let app = AppBuilder::new(EngineConfig::default())
            .with_builtin_jobs()
            .unwrap()
            .build()
            .unwrap();
        let draft = WorkflowDraft::new("client-1", Value::Null)
            .task(TaskDraft::new(1, JobKind::Random))
            .task(TaskDraft::new(2, JobKind::Random))
            .task(TaskDraft::new(3, JobKind::Sum).depends_on([1, 2]));

        let workflow = app.submit(&draft).await.unwrap();
        assert_eq!(app.scheduler().drain().await.unwrap(), 3);

        let status = app.status(workflow.workflow_id).await.unwrap();
        assert_eq!(status.status, WorkflowStatus::Completed);
        assert_eq!(status.completed_tasks, 3);

        let results = app.results(workflow.workflow_id).await.unwrap();
        assert_eq!(results.final_result["tasks"].as_array().unwrap().len(), 3);
    }
}
