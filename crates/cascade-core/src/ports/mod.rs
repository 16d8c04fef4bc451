//! Ports - the seams between the engine and its environment.
//!
//! Each trait hides an external concern (storage, time, id allocation) so the
//! engine can be driven by the in-memory implementations in tests and by a
//! real backend in production.

pub mod clock;
pub mod id_generator;
pub mod workflow_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::workflow_store::WorkflowStore;
