//! App - the engine built from the ports.
//!
//! # Components
//! - **AppBuilder / App**: wiring and the public entry points
//! - **submit**: draft validation and seeding
//! - **propagator**: fixpoint status propagation
//! - **TaskRunner**: single-task execution protocol
//! - **SchedulerLoop**: poll loop over Ready tasks
//! - **status**: status and results views

pub mod builder;
pub mod propagator;
pub mod runner;
pub mod scheduler;
pub mod status;
pub mod submit;

pub use self::builder::{App, AppBuilder};
pub use self::propagator::propagate;
pub use self::runner::{RunReport, TaskRunner};
pub use self::scheduler::{SchedulerHandle, SchedulerLoop};
pub use self::status::{WorkflowResultsView, WorkflowStatusView, workflow_results, workflow_status};
pub use self::submit::{TaskDraft, WorkflowDraft, instantiate, submit_workflow};
