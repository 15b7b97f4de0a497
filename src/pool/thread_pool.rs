//! Bounded worker pool implementation

use crate::core::{BoxedTask, ClosureTask, PoolError, Result, Task};
use crate::pool::config::{PoolConfig, PoolOption};
use crate::pool::worker::{Worker, WorkerStatSnapshot};
use crate::queue::{BoundedQueue, QueueError};
use crossbeam::sync::WaitGroup;
use parking_lot::{Mutex, Once};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

/// Aggregate statistics for a pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of worker threads
    pub workers: usize,
    /// Queue capacity
    pub queue_capacity: usize,
    /// Tasks currently waiting in the queue
    pub queued: usize,
    /// Tasks admitted by `submit`
    pub submitted: u64,
    /// Submissions rejected because the queue was full
    pub rejected_full: u64,
    /// Submissions rejected because the pool was stopped
    pub rejected_stopped: u64,
    /// Tasks that ran to completion
    pub completed: u64,
    /// Tasks that panicked
    pub panicked: u64,
    /// Completion hook calls that panicked
    pub hook_panics: u64,
}

/// State guarded by the submission gate.
///
/// `stopped` and the queue's open/closed state only change together, under
/// the same lock that `submit` holds while admitting a task.
struct Gate {
    stopped: bool,
    queue: BoundedQueue,
}

/// A bounded pool of worker threads
///
/// # Submission
///
/// [`submit`](Self::submit) never blocks. A task is either admitted into the
/// queue or rejected with [`PoolError::QueueFull`] / [`PoolError::Stopped`].
///
/// # Shutdown Mechanism
///
/// [`stop`](Self::stop) closes the queue under the submission gate, then waits
/// on a counting barrier that every worker releases when it exits. Workers
/// exit only once the queue is closed and drained, so every admitted task
/// runs before `stop` returns.
///
/// # Example
///
/// ```rust
/// use bounded_pool::prelude::*;
///
/// # fn main() -> Result<()> {
/// let pool = Pool::new(2, 4)?;
///
/// pool.execute(|| println!("do work"))?;
/// pool.execute(|| println!("do more work"))?;
///
/// pool.stop()?;
/// assert!(matches!(pool.execute(|| {}), Err(PoolError::Stopped)));
/// # Ok(())
/// # }
/// ```
pub struct Pool {
    config: PoolConfig,
    num_workers: usize,
    queue_capacity: usize,
    gate: Mutex<Gate>,
    workers: Vec<Worker>,
    barrier: Mutex<Option<WaitGroup>>,
    stop_once: Once,
    total_submitted: AtomicU64,
    total_rejected_full: AtomicU64,
    total_rejected_stopped: AtomicU64,
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("config", &self.config)
            .field("stopped", &self.is_stopped())
            .field(
                "total_submitted",
                &self.total_submitted.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl Pool {
    /// Create a pool with `workers` threads and room for `queue_size` pending tasks
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] if either value is negative.
    pub fn new(workers: isize, queue_size: isize) -> Result<Self> {
        Self::with_config(PoolConfig::new(workers, queue_size))
    }

    /// Create a pool, applying option setters in order before workers start
    ///
    /// `None` entries are skipped.
    ///
    /// ```rust
    /// use bounded_pool::prelude::*;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// # fn main() -> Result<()> {
    /// let done = Arc::new(AtomicUsize::new(0));
    /// let counter = Arc::clone(&done);
    ///
    /// let pool = Pool::with_options(
    ///     2,
    ///     4,
    ///     vec![
    ///         Some(on_task_done(move || {
    ///             counter.fetch_add(1, Ordering::SeqCst);
    ///         })),
    ///         None,
    ///     ],
    /// )?;
    /// pool.execute(|| {})?;
    /// pool.stop()?;
    /// assert_eq!(done.load(Ordering::SeqCst), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_options(
        workers: isize,
        queue_size: isize,
        options: Vec<Option<PoolOption>>,
    ) -> Result<Self> {
        Self::with_config(PoolConfig::new(workers, queue_size).apply(options))
    }

    /// Create a pool from a configuration
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let num_workers = config.worker_count()?;
        let queue_capacity = config.queue_capacity()?;

        let mut queue = BoundedQueue::new(queue_capacity);
        let barrier = WaitGroup::new();

        let mut workers = Vec::with_capacity(num_workers);
        for id in 0..num_workers {
            let spawned = Worker::spawn(
                id,
                &config.thread_name_prefix,
                queue.consumer(),
                config.on_task_done().cloned(),
                barrier.clone(),
            );
            match spawned {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    log::error!("failed to start pool: {}", e);
                    queue.close();
                    barrier.wait();
                    for worker in &workers {
                        worker.join();
                    }
                    return Err(e);
                }
            }
        }

        log::debug!(
            "pool '{}' started with {} workers, queue capacity {}",
            config.thread_name_prefix,
            num_workers,
            queue_capacity
        );
        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_pool_start(num_workers, queue_capacity);

        Ok(Self {
            config,
            num_workers,
            queue_capacity,
            gate: Mutex::new(Gate {
                stopped: false,
                queue,
            }),
            workers,
            barrier: Mutex::new(Some(barrier)),
            stop_once: Once::new(),
            total_submitted: AtomicU64::new(0),
            total_rejected_full: AtomicU64::new(0),
            total_rejected_stopped: AtomicU64::new(0),
        })
    }

    /// Submit a task to the pool
    ///
    /// Returns as soon as the task is queued; it does not wait for it to run.
    ///
    /// # Errors
    ///
    /// - [`PoolError::Stopped`] if [`stop`](Self::stop) has begun
    /// - [`PoolError::QueueFull`] if the queue is at capacity
    pub fn submit<T: Task + 'static>(&self, task: T) -> Result<()> {
        self.submit_boxed(Box::new(task))
    }

    /// Submit an already boxed task
    pub fn submit_boxed(&self, task: BoxedTask) -> Result<()> {
        let admitted = {
            let gate = self.gate.lock();
            if gate.stopped {
                Err(QueueError::Closed(task))
            } else {
                gate.queue.try_send(task)
            }
        };

        // Rejected tasks are dropped here, outside the gate.
        match admitted {
            Ok(()) => {
                self.total_submitted.fetch_add(1, Ordering::Relaxed);
                #[cfg(feature = "tracing")]
                crate::tracing::metrics::record_submission(self.queue_len());
                Ok(())
            }
            Err(QueueError::Full(_)) => {
                self.total_rejected_full.fetch_add(1, Ordering::Relaxed);
                #[cfg(feature = "tracing")]
                crate::tracing::metrics::record_rejection("queue_full");
                Err(PoolError::queue_full(self.queue_capacity))
            }
            Err(_) => {
                self.total_rejected_stopped.fetch_add(1, Ordering::Relaxed);
                #[cfg(feature = "tracing")]
                crate::tracing::metrics::record_rejection("stopped");
                Err(PoolError::Stopped)
            }
        }
    }

    /// Execute a closure on the pool
    ///
    /// Shorthand for `submit(ClosureTask::new(f))`.
    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(ClosureTask::new(f))
    }

    /// Stop the pool and wait for every admitted task to finish
    ///
    /// Safe to call any number of times from any number of threads. The queue
    /// is closed exactly once; callers racing the first one block until the
    /// drain completes. Always returns `Ok(())`.
    ///
    /// A pool with zero workers returns immediately; its queued tasks never run.
    ///
    /// # Worker threads
    ///
    /// Called from one of this pool's own workers (directly, or by dropping
    /// the last handle inside a task), `stop` closes the queue and returns
    /// without waiting, since the caller is one of the workers a drain waits
    /// on. The remaining workers still run every admitted task, and a later
    /// `stop` from any other thread waits for them.
    pub fn stop(&self) -> Result<()> {
        if self.on_worker_thread() {
            let closed = self.close_gate();
            log::debug!(
                "pool '{}' stop requested from its own worker (queue closed: {}), not waiting for drain",
                self.config.thread_name_prefix,
                closed
            );
            return Ok(());
        }

        self.stop_once.call_once(|| {
            let closed = self.close_gate();
            log::debug!(
                "pool '{}' stopping (queue closed: {}), draining {} workers",
                self.config.thread_name_prefix,
                closed,
                self.num_workers
            );

            let barrier = self.barrier.lock().take();
            if let Some(barrier) = barrier {
                barrier.wait();
            }
            for worker in &self.workers {
                worker.join();
            }

            log::debug!("pool '{}' stopped", self.config.thread_name_prefix);
            #[cfg(feature = "tracing")]
            {
                let stats = self.stats();
                crate::tracing::metrics::record_pool_stop(stats.completed, stats.panicked);
            }
        });
        Ok(())
    }

    /// Reject further submissions and close the queue. Returns `true` on the
    /// first close.
    fn close_gate(&self) -> bool {
        let mut gate = self.gate.lock();
        gate.stopped = true;
        gate.queue.close()
    }

    fn on_worker_thread(&self) -> bool {
        let current = thread::current().id();
        self.workers.iter().any(|worker| worker.thread_id() == current)
    }

    /// Get the number of worker threads
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Get the queue capacity
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Get current queue length (approximate)
    pub fn queue_len(&self) -> usize {
        self.gate.lock().queue.len()
    }

    /// Check if the pool has been stopped
    pub fn is_stopped(&self) -> bool {
        self.gate.lock().stopped
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Get statistics for all workers
    pub fn worker_stats(&self) -> Vec<WorkerStatSnapshot> {
        self.workers.iter().map(Worker::snapshot).collect()
    }

    /// Get aggregate statistics
    pub fn stats(&self) -> PoolStats {
        let mut stats = PoolStats {
            workers: self.num_workers,
            queue_capacity: self.queue_capacity,
            queued: self.queue_len(),
            submitted: self.total_submitted.load(Ordering::Relaxed),
            rejected_full: self.total_rejected_full.load(Ordering::Relaxed),
            rejected_stopped: self.total_rejected_stopped.load(Ordering::Relaxed),
            ..PoolStats::default()
        };
        for worker in &self.workers {
            let snapshot = worker.snapshot();
            stats.completed += snapshot.tasks_completed;
            stats.panicked += snapshot.tasks_panicked;
            stats.hook_panics += snapshot.hook_panics;
        }
        stats
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::error!(
                "failed to stop pool '{}' during drop: {}",
                self.config.thread_name_prefix,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::config::on_task_done;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_pool_creation() {
        let pool = Pool::new(4, 8).expect("Failed to create pool");
        assert_eq!(pool.num_workers(), 4);
        assert_eq!(pool.queue_capacity(), 8);
        assert!(!pool.is_stopped());

        pool.stop().expect("Failed to stop pool");
        assert!(pool.is_stopped());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Pool::new(-1, 0),
            Err(PoolError::InvalidConfig { .. })
        ));
        assert!(matches!(
            Pool::new(0, -1),
            Err(PoolError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_task_execution() {
        let pool = Pool::new(2, 16).expect("Failed to create pool");
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let counter_clone = Arc::clone(&counter);
            pool.execute(move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            })
            .expect("Failed to submit task");
        }

        pool.stop().expect("Failed to stop pool");
        assert_eq!(counter.load(Ordering::SeqCst), 10);

        let stats = pool.stats();
        assert_eq!(stats.submitted, 10);
        assert_eq!(stats.completed, 10);
        assert_eq!(stats.queued, 0);
    }

    #[test]
    fn test_submit_after_stop() {
        let pool = Pool::new(2, 4).expect("Failed to create pool");
        pool.execute(|| {}).expect("Failed to submit task");
        pool.stop().expect("Failed to stop pool");

        let result = pool.execute(|| {});
        assert!(matches!(result, Err(PoolError::Stopped)));
        assert_eq!(pool.stats().rejected_stopped, 1);
    }

    #[test]
    fn test_zero_worker_pool_queues_without_running() {
        let pool = Pool::new(0, 2).expect("Failed to create pool");
        let ran = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let r = Arc::clone(&ran);
            pool.execute(move || {
                r.fetch_add(1, Ordering::SeqCst);
            })
            .expect("Failed to submit task");
        }
        assert_eq!(pool.queue_len(), 2);

        let result = pool.execute(|| {});
        assert!(matches!(result, Err(PoolError::QueueFull { capacity: 2 })));

        pool.stop().expect("Failed to stop pool");
        assert_eq!(ran.load(Ordering::SeqCst), 0);

        let stats = pool.stats();
        assert_eq!(stats.submitted, 2);
        assert_eq!(stats.rejected_full, 1);
    }

    #[test]
    fn test_rejected_task_is_never_run() {
        let pool = Pool::new(0, 0).expect("Failed to create pool");
        let ran = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&ran);

        let result = pool.execute(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });
        assert!(matches!(result, Err(PoolError::QueueFull { capacity: 0 })));

        // The rejected closure was dropped with its captured Arc.
        assert_eq!(Arc::strong_count(&ran), 1);
        pool.stop().expect("Failed to stop pool");
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_thread_name_prefix() {
        let config = PoolConfig::new(1, 1).with_thread_name_prefix("indexer");
        let pool = Pool::with_config(config).expect("Failed to create pool");
        let name = Arc::new(Mutex::new(None));
        let n = Arc::clone(&name);

        pool.execute(move || {
            *n.lock() = thread::current().name().map(String::from);
        })
        .expect("Failed to submit task");
        pool.stop().expect("Failed to stop pool");

        assert_eq!(name.lock().as_deref(), Some("indexer-0"));
    }

    #[test]
    fn test_hook_counts_panicking_tasks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let pool = Pool::with_options(
            1,
            4,
            vec![Some(on_task_done(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }))],
        )
        .expect("Failed to create pool");

        pool.execute(|| panic!("task failure")).expect("Failed to submit");
        pool.execute(|| {}).expect("Failed to submit");
        pool.stop().expect("Failed to stop pool");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let stats = pool.stats();
        assert_eq!(stats.panicked, 1);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn test_stop_waits_for_running_task() {
        let pool = Pool::new(1, 1).expect("Failed to create pool");
        let finished = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&finished);

        pool.execute(move || {
            thread::sleep(Duration::from_millis(50));
            f.fetch_add(1, Ordering::SeqCst);
        })
        .expect("Failed to submit task");

        pool.stop().expect("Failed to stop pool");
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_stops_pool() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = Pool::new(2, 8).expect("Failed to create pool");
            for _ in 0..8 {
                let c = Arc::clone(&counter);
                pool.execute(move || {
                    thread::sleep(Duration::from_millis(5));
                    c.fetch_add(1, Ordering::SeqCst);
                })
                .expect("Failed to submit task");
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_worker_stats_per_worker() {
        let pool = Pool::new(3, 0).expect("Failed to create pool");
        pool.stop().expect("Failed to stop pool");

        let stats = pool.worker_stats();
        assert_eq!(stats.len(), 3);
        let ids: Vec<usize> = stats.iter().map(|s| s.worker_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
