//! # Bounded Pool
//!
//! A fixed-size worker pool with a bounded task queue.
//!
//! ## Features
//!
//! - **Fixed workers**: the worker count is set at construction and never changes
//! - **Bounded queue**: submission fails fast with `QueueFull` instead of blocking
//! - **Failure isolation**: a panicking task is caught and logged; its worker keeps going
//! - **Completion hook**: an optional callback runs once after every task
//! - **Graceful shutdown**: `stop` drains all admitted tasks and is safe to call repeatedly
//!   from any number of threads
//!
//! ## Quick Start
//!
//! ```rust
//! use bounded_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = Pool::new(4, 16)?;
//!
//! for i in 0..10 {
//!     pool.execute(move || {
//!         println!("Task {} executing", i);
//!     })?;
//! }
//!
//! // Waits for all ten tasks
//! pool.stop()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Rejection
//!
//! ```rust
//! use bounded_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! // No workers: tasks are queued but never run
//! let pool = Pool::new(0, 2)?;
//! pool.execute(|| {})?;
//! pool.execute(|| {})?;
//!
//! match pool.execute(|| {}) {
//!     Err(PoolError::QueueFull { capacity }) => assert_eq!(capacity, 2),
//!     other => panic!("unexpected: {:?}", other),
//! }
//!
//! pool.stop()?;
//! assert!(pool.execute(|| {}).unwrap_err().is_stopped());
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use bounded_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = PoolConfig::new(8, 1000)
//!     .with_thread_name_prefix("indexer")
//!     .with_on_task_done(|| log::trace!("task done"));
//!
//! let pool = Pool::with_config(config)?;
//! # pool.stop()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Tasks
//!
//! ```rust
//! use bounded_pool::prelude::*;
//!
//! struct Flush {
//!     path: String,
//! }
//!
//! impl Task for Flush {
//!     fn run(&mut self) {
//!         println!("Flushing {}", self.path);
//!     }
//!
//!     fn task_type(&self) -> &str {
//!         "Flush"
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! # let pool = Pool::new(1, 1)?;
//! pool.submit(Flush {
//!     path: "/tmp/segment-0".to_string(),
//! })?;
//! # pool.stop()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod pool;
pub mod prelude;
pub mod queue;
pub mod tracing;

pub use crate::core::{BoxedTask, ClosureTask, PoolError, Result, Task};
pub use crate::pool::{Pool, PoolConfig, PoolOption, PoolStats, WorkerStatSnapshot};
