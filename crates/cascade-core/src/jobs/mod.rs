//! Job contract, readiness policies, registry and the built-in jobs.

pub mod builtin;
pub mod job;
pub mod kind;
pub mod policy;
pub mod registry;

pub use job::Job;
pub use kind::JobKind;
pub use registry::{JobRegistry, JobRegistryBuilder};
