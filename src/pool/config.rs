//! Pool configuration and option setters

use crate::core::{PoolError, Result};
use std::fmt;
use std::sync::Arc;

/// Hook invoked once after every task, whether it completed or panicked
pub type TaskHook = Arc<dyn Fn() + Send + Sync + 'static>;

/// A configuration setter applied by [`Pool::with_options`](crate::Pool::with_options)
pub type PoolOption = Box<dyn FnOnce(&mut PoolConfig)>;

const DEFAULT_THREAD_NAME_PREFIX: &str = "pool-worker";

/// Configuration for a worker pool
///
/// Worker count and queue size are taken as signed values and checked by
/// [`validate`](Self::validate); negative values are rejected with
/// [`PoolError::InvalidConfig`].
#[derive(Clone)]
pub struct PoolConfig {
    /// Number of worker threads
    pub workers: isize,
    /// Maximum number of pending tasks (0 = hand-off only)
    pub queue_size: isize,
    /// Thread name prefix
    pub thread_name_prefix: String,
    on_task_done: Option<TaskHook>,
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("workers", &self.workers)
            .field("queue_size", &self.queue_size)
            .field("thread_name_prefix", &self.thread_name_prefix)
            .field("on_task_done", &self.on_task_done.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

impl PoolConfig {
    /// Create a new configuration with the given worker count and queue size
    #[must_use]
    pub fn new(workers: isize, queue_size: isize) -> Self {
        Self {
            workers,
            queue_size,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            on_task_done: None,
        }
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the hook called after each task finishes.
    ///
    /// The hook runs on the worker thread, after the task, even if the task
    /// panicked. A panicking hook is caught and logged.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_on_task_done<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_task_done = Some(Arc::new(hook));
        self
    }

    /// Apply option setters in order; `None` entries are skipped.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn apply<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = Option<PoolOption>>,
    {
        for option in options.into_iter().flatten() {
            option(&mut self);
        }
        self
    }

    /// Get the completion hook, if set
    pub fn on_task_done(&self) -> Option<&TaskHook> {
        self.on_task_done.as_ref()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.worker_count()?;
        self.queue_capacity()?;
        Ok(())
    }

    pub(crate) fn worker_count(&self) -> Result<usize> {
        non_negative("workers", self.workers)
    }

    pub(crate) fn queue_capacity(&self) -> Result<usize> {
        non_negative("queue_size", self.queue_size)
    }
}

fn non_negative(parameter: &str, value: isize) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        PoolError::invalid_config(parameter, format!("must be non-negative, got {}", value))
    })
}

/// Option that sets the completion hook
pub fn on_task_done<F>(hook: F) -> PoolOption
where
    F: Fn() + Send + Sync + 'static,
{
    Box::new(move |config: &mut PoolConfig| {
        config.on_task_done = Some(Arc::new(hook));
    })
}

/// Option that sets the worker thread name prefix
pub fn thread_name_prefix<S: Into<String>>(prefix: S) -> PoolOption {
    let prefix = prefix.into();
    Box::new(move |config: &mut PoolConfig| {
        config.thread_name_prefix = prefix;
    })
}
