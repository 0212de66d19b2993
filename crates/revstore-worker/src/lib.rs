//! Background execution for Revstore.
//!
//! This crate provides:
//! - A bounded task queue drained by a fixed number of concurrent workers
//! - A transfer scheduler that runs transmitters on the pool
//! - A deferred whose settlement runs as a queued task

pub mod deferred;
pub mod queue;
pub mod runner;
pub mod scheduler;

pub use deferred::AsyncDeferred;
pub use queue::{Task, TaskQueue};
pub use runner::WorkerPool;
pub use scheduler::PooledScheduler;
