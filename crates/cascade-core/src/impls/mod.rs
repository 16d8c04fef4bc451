//! Impls - in-process implementations of the ports.
//!
//! # Included
//! - **InMemoryStore**: `WorkflowStore` backed by hash maps, for the CLI demo
//!   and tests

pub mod memory_store;

pub use self::memory_store::InMemoryStore;
