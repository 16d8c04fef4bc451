//! Built-in jobs bound to the task types a workflow can use.

mod analysis;
mod area;
mod fail;
pub mod geometry;
mod long;
mod notification;
mod random;
mod report;
mod sum;

pub use analysis::AnalysisJob;
pub use area::PolygonAreaJob;
pub use fail::{FAIL_MESSAGE, FailJob};
pub use long::{LONG_JOB_OUTPUT, LongJob};
pub use notification::NotificationJob;
pub use random::RandomJob;
pub use report::ReportJob;
pub use sum::SumJob;
