//! Task trait and related types

use std::fmt;

/// A unit of work executed by the pool
///
/// Tasks take no arguments and return nothing. A task that panics is caught
/// by the worker running it; the panic never reaches the submitter.
pub trait Task: Send {
    /// Run the task
    fn run(&mut self);

    /// Get the task's type name for logging
    fn task_type(&self) -> &str {
        "Task"
    }
}

impl fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({})", self.task_type())
    }
}

/// A boxed task that can be sent across threads
pub type BoxedTask = Box<dyn Task>;

/// Helper to create a task from a closure
pub struct ClosureTask<F>
where
    F: FnOnce() + Send,
{
    closure: Option<F>,
    name: String,
}

impl<F> ClosureTask<F>
where
    F: FnOnce() + Send,
{
    /// Create a new closure task
    pub fn new(closure: F) -> Self {
        Self {
            closure: Some(closure),
            name: "ClosureTask".to_string(),
        }
    }

    /// Create a new closure task with a custom name
    pub fn with_name<S: Into<String>>(closure: F, name: S) -> Self {
        Self {
            closure: Some(closure),
            name: name.into(),
        }
    }

    /// Returns `true` once the closure has been consumed
    pub fn is_spent(&self) -> bool {
        self.closure.is_none()
    }
}

impl<F> Task for ClosureTask<F>
where
    F: FnOnce() + Send,
{
    fn run(&mut self) {
        // A spent closure is a no-op, not a shutdown signal.
        if let Some(closure) = self.closure.take() {
            closure();
        }
    }

    fn task_type(&self) -> &str {
        &self.name
    }
}
