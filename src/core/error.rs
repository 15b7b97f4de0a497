//! Error types for the worker pool

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors returned synchronously by the pool
///
/// Task panics never show up here: they are caught and logged on the worker
/// that ran the task.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// The pool has been stopped and no longer admits tasks
    #[error("Worker pool is stopped")]
    Stopped,

    /// Queue is full with capacity details
    #[error("Task queue is full (capacity {capacity})")]
    QueueFull {
        /// Maximum number of pending tasks
        capacity: usize,
    },

    /// Failed to spawn a worker thread with details
    #[error("Failed to spawn worker thread #{worker_id}: {message}")]
    SpawnError {
        /// ID of the worker that failed to spawn
        worker_id: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },
}

impl PoolError {
    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a queue full error
    pub fn queue_full(capacity: usize) -> Self {
        PoolError::QueueFull { capacity }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        worker_id: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        PoolError::SpawnError {
            worker_id,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns `true` for [`PoolError::Stopped`]
    pub fn is_stopped(&self) -> bool {
        matches!(self, PoolError::Stopped)
    }

    /// Returns `true` for [`PoolError::QueueFull`]
    pub fn is_queue_full(&self) -> bool {
        matches!(self, PoolError::QueueFull { .. })
    }
}
