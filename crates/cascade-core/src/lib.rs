//! cascade-core
//!
//! Engine for workflows made of dependent tasks.
//!
//! # Modules
//! - **domain**: ids, statuses, tasks, workflows, results
//! - **jobs**: the `Job` contract, readiness policies, registry, built-in jobs
//! - **ports**: storage, clock and id-generation seams
//! - **impls**: in-memory store
//! - **app**: submission, propagator, task runner, scheduler loop, status views
//! - **config**: engine settings
//! - **error**: error types

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod jobs;
pub mod ports;

pub use app::{
    App, AppBuilder, RunReport, SchedulerHandle, SchedulerLoop, TaskDraft, TaskRunner,
    WorkflowDraft,
};
pub use config::EngineConfig;
pub use domain::{Task, TaskStatus, Workflow, WorkflowStatus};
pub use error::{CoreError, JobError, StoreError};
pub use jobs::{Job, JobKind, JobRegistry};
