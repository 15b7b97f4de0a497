//! Bounded FIFO queue with capacity limit.

use crate::core::BoxedTask;
use crossbeam::channel::{self, Receiver, Sender, TrySendError};

/// Errors that can occur during queue operations.
///
/// Rejected tasks are handed back to the caller so they are dropped by the
/// submitter, never run.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Queue is at capacity
    #[error("queue is full")]
    Full(BoxedTask),
    /// Queue is closed and not accepting new tasks
    #[error("queue is closed")]
    Closed(BoxedTask),
    /// Queue is closed and fully drained
    #[error("queue is disconnected")]
    Disconnected,
}

/// Result type for queue operations.
pub type QueueResult<T> = std::result::Result<T, QueueError>;

/// A bounded FIFO queue with a fixed capacity.
///
/// Admission never blocks: [`try_send`](Self::try_send) fails with
/// [`QueueError::Full`] when the queue holds `capacity` tasks. A capacity of
/// zero makes the queue a rendezvous point, admitting a task only when a
/// consumer is already waiting in [`QueueConsumer::recv`].
///
/// Closing drops the only sender, so consumers keep receiving what was
/// already admitted and then observe [`QueueError::Disconnected`].
///
/// # Example
///
/// ```rust
/// use bounded_pool::core::ClosureTask;
/// use bounded_pool::queue::{BoundedQueue, QueueError};
///
/// let mut queue = BoundedQueue::new(1);
/// queue.try_send(Box::new(ClosureTask::new(|| {}))).unwrap();
///
/// match queue.try_send(Box::new(ClosureTask::new(|| {}))) {
///     Err(QueueError::Full(_)) => println!("Queue is full"),
///     _ => panic!("expected Full error"),
/// }
///
/// let consumer = queue.consumer();
/// assert!(queue.close());
/// assert!(consumer.recv().is_ok());
/// assert!(matches!(consumer.recv(), Err(QueueError::Disconnected)));
/// ```
#[derive(Debug)]
pub struct BoundedQueue {
    sender: Option<Sender<BoxedTask>>,
    receiver: Receiver<BoxedTask>,
    capacity: usize,
}

impl BoundedQueue {
    /// Creates a new bounded queue with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = channel::bounded(capacity);
        Self {
            sender: Some(sender),
            receiver,
            capacity,
        }
    }

    /// Returns the maximum capacity of this queue.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Attempts to enqueue a task without blocking.
    ///
    /// # Errors
    ///
    /// - [`QueueError::Full`] if the queue is at capacity
    /// - [`QueueError::Closed`] if the queue has been closed
    pub fn try_send(&self, task: BoxedTask) -> QueueResult<()> {
        let Some(sender) = self.sender.as_ref() else {
            return Err(QueueError::Closed(task));
        };
        sender.try_send(task).map_err(|e| match e {
            TrySendError::Full(task) => QueueError::Full(task),
            TrySendError::Disconnected(task) => QueueError::Closed(task),
        })
    }

    /// Closes the queue for new tasks.
    ///
    /// Returns `true` if this call performed the close, `false` if the queue
    /// was already closed.
    pub fn close(&mut self) -> bool {
        self.sender.take().is_some()
    }

    /// Returns `true` if the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.sender.is_none()
    }

    /// Returns the current number of pending tasks.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no tasks are pending.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Creates a consumer handle for a worker.
    pub fn consumer(&self) -> QueueConsumer {
        QueueConsumer {
            receiver: self.receiver.clone(),
        }
    }
}

/// The receiving side of a [`BoundedQueue`], one per worker.
#[derive(Debug, Clone)]
pub struct QueueConsumer {
    receiver: Receiver<BoxedTask>,
}

impl QueueConsumer {
    /// Receives a task, blocking until one is available.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Disconnected`] once the queue is closed and empty.
    pub fn recv(&self) -> QueueResult<BoxedTask> {
        self.receiver.recv().map_err(|_| QueueError::Disconnected)
    }
}
