//! Task queue used between submitters and workers.
//!
//! [`BoundedQueue`] is a fixed-capacity FIFO built on a crossbeam bounded
//! channel. The pool owns the queue behind its submission gate; each worker
//! holds a [`QueueConsumer`] and blocks on it until the queue is closed and
//! drained.

mod bounded;

pub use bounded::{BoundedQueue, QueueConsumer, QueueError, QueueResult};
