//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system.
//!
//! ## Core Components
//! - `Task`: A unit of work executed on a worker thread
//! - `TaskResult`: What a finished task hands back to the calling thread
//! - `TaskFailure`: A task that panicked instead of producing a result
//!
//! ## Task Lifecycle
//! 1. A `Task` is published to the `TaskManager`
//! 2. The task's `process()` method runs on a worker thread
//! 3. The task returns a boxed `TaskResult`, or panics
//! 4. On the calling thread, the result's `handle_result()` folds it into the
//!    batch context, or the panic is reported as a `TaskFailure`
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - `TaskResult` must be `Send` to be transferred back
//! - Shared state reached from `process()` must be synchronized by the task

use thiserror::Error;

/// A unit of work executed on a worker thread.
///
/// Tasks should own (or share through `Arc`) everything they need, so they can
/// be moved to any worker.
///
/// # Type Parameters
/// - `C`: The context results are folded into on the calling thread
pub trait Task<C>: Send {
    /// Short human-readable description, used when reporting failures.
    fn describe(&self) -> String;

    /// Performs the work and returns a result for the calling thread.
    fn process(&self) -> Box<dyn TaskResult<C> + Send>;
}

/// The result of processing a `Task`.
pub trait TaskResult<C>: Send {
    /// Folds this result into `context`. Runs on the thread driving the batch.
    fn handle_result(self: Box<Self>, context: &mut C);
}

/// A task that panicked while processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("task `{description}` failed: {message}")]
pub struct TaskFailure {
    /// The failed task's description
    pub description: String,
    /// The panic payload, if it was a string
    pub message: String,
}
