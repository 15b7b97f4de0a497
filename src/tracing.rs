//! Tracing integration for observability.
//!
//! With the `tracing` feature enabled, workers run inside a `worker` span,
//! each task inside a `task` span, and the pool emits metric-style events.
//! [`TracedTask`] carries the submitter's span onto the worker thread.
//!
//! # Example
//!
//! ```rust,ignore
//! use bounded_pool::prelude::*;
//! use bounded_pool::tracing::TracedTask;
//!
//! let pool = Pool::new(4, 64)?;
//! let _span = tracing::info_span!("request", id = 7).entered();
//!
//! // Runs inside the "request" span on the worker
//! pool.submit(TracedTask::new(ClosureTask::new(|| tracing::info!("working"))))?;
//! ```

use crate::core::Task;

/// A task wrapper that propagates tracing context across thread boundaries.
///
/// The span current at construction is entered while the inner task runs.
/// Without the `tracing` feature this is a transparent wrapper.
pub struct TracedTask<T: Task> {
    inner: T,
    #[cfg(feature = "tracing")]
    span: tracing::Span,
}

impl<T: Task> TracedTask<T> {
    /// Wrap `task`, capturing the current span.
    pub fn new(task: T) -> Self {
        Self {
            inner: task,
            #[cfg(feature = "tracing")]
            span: tracing::Span::current(),
        }
    }

    /// Wrap `task` with an explicit span.
    #[cfg(feature = "tracing")]
    pub fn with_span(task: T, span: tracing::Span) -> Self {
        Self { inner: task, span }
    }
}

impl<T: Task> Task for TracedTask<T> {
    fn run(&mut self) {
        #[cfg(feature = "tracing")]
        let _guard = self.span.enter();
        self.inner.run();
    }

    fn task_type(&self) -> &str {
        self.inner.task_type()
    }
}

/// Metric-style tracing events.
#[cfg(feature = "tracing")]
pub mod metrics {
    use std::time::Duration;

    /// Records a task admission.
    #[inline]
    pub fn record_submission(queue_depth: usize) {
        tracing::trace!(
            counter.tasks_submitted = 1,
            gauge.queue_depth = queue_depth as i64,
            "task submitted"
        );
    }

    /// Records a rejected submission.
    #[inline]
    pub fn record_rejection(reason: &'static str) {
        tracing::trace!(counter.tasks_rejected = 1, reason = reason, "task rejected");
    }

    /// Records task completion with timing.
    #[inline]
    pub fn record_completion(duration: Duration, panicked: bool) {
        let duration_ms = duration.as_millis() as u64;
        if panicked {
            tracing::trace!(
                counter.tasks_panicked = 1,
                histogram.task_duration_ms = duration_ms,
                "task panicked"
            );
        } else {
            tracing::trace!(
                counter.tasks_completed = 1,
                histogram.task_duration_ms = duration_ms,
                "task completed"
            );
        }
    }

    /// Records pool startup.
    #[inline]
    pub fn record_pool_start(num_workers: usize, queue_capacity: usize) {
        tracing::info!(
            workers = num_workers,
            queue_capacity = queue_capacity,
            "worker pool started"
        );
    }

    /// Records pool shutdown.
    #[inline]
    pub fn record_pool_stop(tasks_completed: u64, tasks_panicked: u64) {
        tracing::info!(
            tasks_completed = tasks_completed,
            tasks_panicked = tasks_panicked,
            "worker pool stopped"
        );
    }
}
