//! Worker thread implementation

use crate::core::{BoxedTask, PoolError, Result};
use crate::pool::config::TaskHook;
use crate::queue::QueueConsumer;
use crossbeam::sync::WaitGroup;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Instant;

#[cfg(feature = "tracing")]
use tracing::{span, Level};

/// Statistics for a worker thread
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total number of tasks that ran to completion
    pub tasks_completed: AtomicU64,
    /// Total number of tasks that panicked
    pub tasks_panicked: AtomicU64,
    /// Total number of completion hook calls that panicked
    pub hook_panics: AtomicU64,
    /// Total time spent running tasks (microseconds)
    pub total_processing_time_us: AtomicU64,
}

impl WorkerStats {
    /// Create new worker statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total tasks completed
    pub fn get_tasks_completed(&self) -> u64 {
        self.tasks_completed.load(Ordering::Relaxed)
    }

    /// Get total tasks panicked
    pub fn get_tasks_panicked(&self) -> u64 {
        self.tasks_panicked.load(Ordering::Relaxed)
    }

    /// Get total hook panics
    pub fn get_hook_panics(&self) -> u64 {
        self.hook_panics.load(Ordering::Relaxed)
    }

    /// Get average processing time per task in microseconds
    pub fn get_average_processing_time_us(&self) -> f64 {
        let total = self.total_processing_time_us.load(Ordering::Relaxed);
        let count = self.get_tasks_completed() + self.get_tasks_panicked();
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    fn record(&self, elapsed_us: u64, panicked: bool) {
        if panicked {
            self.tasks_panicked.fetch_add(1, Ordering::Relaxed);
        } else {
            self.tasks_completed.fetch_add(1, Ordering::Relaxed);
        }
        self.total_processing_time_us
            .fetch_add(elapsed_us, Ordering::Relaxed);
    }
}

/// Point-in-time copy of one worker's statistics
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerStatSnapshot {
    /// Worker ID
    pub worker_id: usize,
    /// Tasks that ran to completion
    pub tasks_completed: u64,
    /// Tasks that panicked
    pub tasks_panicked: u64,
    /// Completion hook calls that panicked
    pub hook_panics: u64,
    /// Average processing time per task in microseconds
    pub average_processing_time_us: f64,
}

/// A worker thread that runs tasks from the pool's queue
#[derive(Debug)]
pub struct Worker {
    id: usize,
    thread_id: ThreadId,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a worker bound to `consumer`.
    ///
    /// The worker holds `barrier` until its loop exits, which happens only
    /// once the queue is closed and drained.
    pub fn spawn(
        id: usize,
        name_prefix: &str,
        consumer: QueueConsumer,
        hook: Option<TaskHook>,
        barrier: WaitGroup,
    ) -> Result<Self> {
        let stats = Arc::new(WorkerStats::new());
        let stats_clone = Arc::clone(&stats);

        let thread = thread::Builder::new()
            .name(format!("{}-{}", name_prefix, id))
            .spawn(move || {
                Self::run(id, consumer, hook, stats_clone, barrier);
            })
            .map_err(|e| PoolError::spawn_with_source(id, "thread spawn failed", e))?;

        Ok(Self {
            id,
            thread_id: thread.thread().id(),
            thread: Mutex::new(Some(thread)),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Copy the current statistics
    pub fn snapshot(&self) -> WorkerStatSnapshot {
        WorkerStatSnapshot {
            worker_id: self.id,
            tasks_completed: self.stats.get_tasks_completed(),
            tasks_panicked: self.stats.get_tasks_panicked(),
            hook_panics: self.stats.get_hook_panics(),
            average_processing_time_us: self.stats.get_average_processing_time_us(),
        }
    }

    /// Reap the worker thread. Later calls are no-ops.
    pub fn join(&self) {
        if let Some(thread) = self.thread.lock().take() {
            if thread.join().is_err() {
                log::error!("worker {} exited by panic", self.id);
            }
        }
    }

    /// Main worker loop
    fn run(
        id: usize,
        consumer: QueueConsumer,
        hook: Option<TaskHook>,
        stats: Arc<WorkerStats>,
        barrier: WaitGroup,
    ) {
        // Dropped on exit, releasing the pool's drain wait.
        let _barrier = barrier;

        #[cfg(feature = "tracing")]
        let worker_span = span!(Level::DEBUG, "worker", id = id);
        #[cfg(feature = "tracing")]
        let _guard = worker_span.enter();

        log::debug!("worker {} started", id);

        while let Ok(task) = consumer.recv() {
            Self::execute_task(id, task, hook.as_ref(), &stats);
        }

        log::debug!(
            "worker {} exiting: {} completed, {} panicked",
            id,
            stats.get_tasks_completed(),
            stats.get_tasks_panicked()
        );
    }

    /// Run a single task with panic protection, then the completion hook
    ///
    /// The task is dropped inside its own guard, so a panicking destructor
    /// counts as a task failure instead of ending the worker. Panic logs carry
    /// the payload only; the location (and a backtrace when `RUST_BACKTRACE`
    /// is set) comes from the process panic hook.
    fn execute_task(id: usize, mut task: BoxedTask, hook: Option<&TaskHook>, stats: &WorkerStats) {
        let task_type = task.task_type().to_owned();

        #[cfg(feature = "tracing")]
        let task_span = span!(Level::DEBUG, "task", task_type = task_type.as_str());
        #[cfg(feature = "tracing")]
        let _task_guard = task_span.enter();

        let start = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| task.run()));
        let elapsed = start.elapsed();
        let elapsed_us = elapsed.as_micros() as u64;
        let released = catch_unwind(AssertUnwindSafe(move || drop(task)));

        if let Err(payload) = &outcome {
            log::error!(
                "worker {}: task {} panicked: {}",
                id,
                task_type,
                panic_message(&**payload)
            );
        }
        if let Err(payload) = &released {
            log::error!(
                "worker {}: task {} panicked while being dropped: {}",
                id,
                task_type,
                panic_message(&**payload)
            );
        }

        let panicked = outcome.is_err() || released.is_err();
        if !panicked {
            log::trace!("worker {}: {} completed in {}us", id, task_type, elapsed_us);
        }
        stats.record(elapsed_us, panicked);

        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_completion(elapsed, panicked);

        if let Some(hook) = hook {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| hook())) {
                log::error!(
                    "worker {}: task completion hook panicked: {}",
                    id,
                    panic_message(payload.as_ref())
                );
                stats.hook_panics.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// OS thread the worker runs on
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
