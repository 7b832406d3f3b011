//! # Task Management System
//!
//! A persistent, bounded pool of worker threads that runs batches of tasks and
//! blocks the caller until the whole batch has been accounted for.
//!
//! ## Architecture Overview
//! - `TaskManager`: Owns the workers, distributes tasks and collects results
//! - `Task`: A unit of work executed on a worker
//! - `TaskResult`: The result of a task, folded into a caller-supplied context
//! - `TaskChannel`: The task channel and bookkeeping for one worker
//!
//! ## Scheduling
//! - Workers are spawned once and live as long as the manager
//! - Each worker has a dedicated task channel; all workers share one result channel
//! - Tasks are dispatched round-robin, at most `MAX_TASKS_IN_FLIGHT` per worker;
//!   the rest wait in a FIFO queue
//! - A panicking task is caught on the worker and reported as a `TaskFailure`;
//!   the worker keeps serving tasks
//!
//! ## Example Usage
//! ```ignore
//! let mut task_manager = TaskManager::new(num_workers)?;
//!
//! let report = task_manager.run_batch(tasks, &mut context)?;
//! for failure in &report.failures {
//!     log::error!("{failure}");
//! }
//! ```

pub mod task;

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, error, info};
use task::{Task, TaskFailure, TaskResult};
use thiserror::Error;

/// Maximum number of tasks that can be in flight per worker channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 4;

/// Errors raised by the pool itself, as opposed to by individual tasks.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The operating system refused to start a worker.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),
    /// Every worker has gone away while results were still outstanding.
    #[error("worker pool disconnected with {outstanding} task(s) outstanding")]
    Disconnected {
        /// Tasks that never reported back
        outstanding: usize,
    },
}

/// Outcome of a whole batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Tasks whose result was handled
    pub completed: usize,
    /// Tasks that panicked
    pub failures: Vec<TaskFailure>,
}

type BoxedTask<C> = Box<dyn Task<C> + Send>;
type TaskOutcome<C> = Result<Box<dyn TaskResult<C> + Send>, TaskFailure>;

/// Message sent from a worker back to the manager.
struct WorkerReport<C> {
    channel: usize,
    outcome: TaskOutcome<C>,
}

/// A communication channel between the manager and one worker thread.
struct TaskChannel<C> {
    task_sender: Sender<BoxedTask<C>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Type Parameters
/// - `C`: The context task results are folded into
pub struct TaskManager<C> {
    channels: Vec<TaskChannel<C>>,
    result_receiver: Receiver<WorkerReport<C>>,
    queued_tasks: VecDeque<BoxedTask<C>>,
    current_channel: usize,
}

impl<C: 'static> TaskManager<C> {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create; at least one is always spawned
    ///
    /// # Errors
    /// `TaskError::WorkerSpawn` if a thread cannot be started.
    pub fn new(num_workers: usize) -> Result<Self, TaskError> {
        let num_workers = num_workers.max(1);
        let (result_tx, result_rx) = channel::<WorkerReport<C>>();
        let mut channels = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<BoxedTask<C>>();
            let result_tx = result_tx.clone();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let outcome = run_caught(task.as_ref());
                    if result_tx
                        .send(WorkerReport {
                            channel: index,
                            outcome,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
            };

            let worker = thread::Builder::new()
                .name(format!("chunk-worker-{index}"))
                .spawn(task_closure)?;

            channels.push(TaskChannel {
                task_sender: task_tx,
                num_tasks_in_flight: 0,
                _worker: worker,
            });
        }

        info!("Task manager started with {num_workers} worker(s)");

        Ok(TaskManager {
            channels,
            result_receiver: result_rx,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        })
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was handed to the worker
    /// - `Err(task)` if the worker has disconnected
    fn try_send_task(&mut self, task: BoxedTask<C>, channel_idx: usize) -> Result<(), BoxedTask<C>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(()) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds the next worker, round-robin, that is below `MAX_TASKS_IN_FLIGHT`.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately handed to a worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: BoxedTask<C>) -> bool {
        let Some(channel_idx) = self.find_available_channel() else {
            self.queued_tasks.push_back(task);
            return false;
        };
        match self.try_send_task(task, channel_idx) {
            Ok(()) => {
                self.current_channel = (channel_idx + 1) % self.channels.len();
                true
            }
            Err(task) => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to workers until the queue is empty or every worker is full.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(()) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Channel is disconnected, put task back and stop processing
                    self.queued_tasks.push_front(task);
                    return;
                }
            }
        }
    }

    /// Runs every task in `tasks` and blocks until each one has reported back.
    ///
    /// Results are folded into `context` on the calling thread, in completion
    /// order. Panicking tasks do not abort the batch; they are logged and
    /// returned in the report.
    ///
    /// # Errors
    /// `TaskError::Disconnected` if the workers disappear mid-batch.
    pub fn run_batch<I>(&mut self, tasks: I, context: &mut C) -> Result<BatchReport, TaskError>
    where
        I: IntoIterator<Item = BoxedTask<C>>,
    {
        let mut outstanding = 0;
        for task in tasks {
            self.publish_task(task);
            outstanding += 1;
        }
        debug!("Dispatched batch of {outstanding} task(s)");

        let mut report = BatchReport::default();
        while outstanding > 0 {
            let WorkerReport { channel, outcome } = self
                .result_receiver
                .recv()
                .map_err(|_| TaskError::Disconnected { outstanding })?;
            outstanding -= 1;
            self.channels[channel].num_tasks_in_flight -= 1;

            match outcome {
                Ok(result) => {
                    result.handle_result(context);
                    report.completed += 1;
                }
                Err(failure) => {
                    error!("{failure}");
                    report.failures.push(failure);
                }
            }

            self.process_queued_tasks();
        }

        Ok(report)
    }
}

/// Runs a task, turning a panic into a `TaskFailure`.
fn run_caught<C>(task: &(dyn Task<C> + Send)) -> TaskOutcome<C> {
    panic::catch_unwind(AssertUnwindSafe(|| task.process())).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        TaskFailure {
            description: task.describe(),
            message,
        }
    })
}
