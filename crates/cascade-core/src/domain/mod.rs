//! Domain model (ids, statuses, tasks, workflows, results).

pub mod ids;
pub mod result;
pub mod status;
pub mod task;
pub mod workflow;

pub use ids::{ResultId, TaskId, WorkflowId};
pub use result::{JobInput, NewResult, TaskResult};
pub use status::{TaskStatus, WorkflowStatus};
pub use task::{STARTING_PROGRESS, Task, TaskType};
pub use workflow::{StatusCounts, Workflow};
