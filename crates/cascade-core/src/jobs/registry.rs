//! JobRegistry - maps job kinds to job implementations.
//!
//! Built through [`JobRegistryBuilder`], which checks at build time that every
//! expected kind has a job (fail-fast), so a missing registration shows up at
//! startup rather than when the first task of that kind becomes Ready.

use std::collections::HashMap;
use std::sync::Arc;

use super::builtin;
use super::job::Job;
use super::kind::JobKind;
use crate::config::EngineConfig;
use crate::domain::Task;
use crate::error::CoreError;

/// Lookup table from [`JobKind`] to a shared job instance.
pub struct JobRegistry {
    jobs: HashMap<JobKind, Arc<dyn Job>>,
}

impl JobRegistry {
    pub fn builder() -> JobRegistryBuilder {
        JobRegistryBuilder::new()
    }

    /// Registry holding every built-in job, configured from `config`.
    pub fn builtin(config: &EngineConfig) -> Result<Self, CoreError> {
        JobRegistryBuilder::new()
            .with_builtin(config)?
            .expect_kinds(&JobKind::ALL)
            .build()
    }

    pub fn get(&self, kind: JobKind) -> Option<Arc<dyn Job>> {
        self.jobs.get(&kind).cloned()
    }

    /// Job bound to the task's type.
    ///
    /// Unknown type strings and known-but-unregistered kinds both come back as
    /// `JobNotRegistered`.
    pub fn job_for(&self, task: &Task) -> Result<Arc<dyn Job>, CoreError> {
        JobKind::try_from(&task.task_type)
            .ok()
            .and_then(|kind| self.get(kind))
            .ok_or_else(|| CoreError::JobNotRegistered(task.task_type.clone()))
    }

    pub fn contains(&self, kind: JobKind) -> bool {
        self.jobs.contains_key(&kind)
    }

    /// Registered kinds in declaration order.
    pub fn registered_kinds(&self) -> Vec<JobKind> {
        let mut kinds: Vec<JobKind> = self.jobs.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

/// Builder for [`JobRegistry`].
///
/// ```ignore
/// let registry = JobRegistry::builder()
///     .register(JobKind::Sum, Arc::new(SumJob))?
///     .expect_kinds(&[JobKind::Sum])
///     .build()?;
/// ```
#[derive(Default)]
pub struct JobRegistryBuilder {
    jobs: HashMap<JobKind, Arc<dyn Job>>,
    expected: Option<Vec<JobKind>>,
}

impl JobRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `job` to `kind`. A kind can only be bound once.
    pub fn register(mut self, kind: JobKind, job: Arc<dyn Job>) -> Result<Self, CoreError> {
        if self.jobs.contains_key(&kind) {
            return Err(CoreError::DuplicateJob(kind));
        }
        self.jobs.insert(kind, job);
        Ok(self)
    }

    /// Register every built-in job.
    pub fn with_builtin(self, config: &EngineConfig) -> Result<Self, CoreError> {
        self.register(JobKind::Analysis, Arc::new(builtin::AnalysisJob))?
            .register(
                JobKind::Notification,
                Arc::new(builtin::NotificationJob::new(config.notification_delay())),
            )?
            .register(JobKind::Area, Arc::new(builtin::PolygonAreaJob))?
            .register(JobKind::Report, Arc::new(builtin::ReportJob))?
            .register(JobKind::Fail, Arc::new(builtin::FailJob))?
            .register(JobKind::Random, Arc::new(builtin::RandomJob))?
            .register(JobKind::Sum, Arc::new(builtin::SumJob))?
            .register(
                JobKind::Long,
                Arc::new(builtin::LongJob::new(config.long_job_duration())),
            )
    }

    /// Kinds that must be registered for `build()` to succeed.
    pub fn expect_kinds(mut self, kinds: &[JobKind]) -> Self {
        self.expected = Some(kinds.to_vec());
        self
    }

    pub fn build(self) -> Result<JobRegistry, CoreError> {
        if let Some(expected) = &self.expected {
            let missing: Vec<JobKind> = expected
                .iter()
                .filter(|kind| !self.jobs.contains_key(kind))
                .copied()
                .collect();
            if !missing.is_empty() {
                return Err(CoreError::MissingJobs(missing));
            }
        }
        Ok(JobRegistry { jobs: self.jobs })
    }
}
