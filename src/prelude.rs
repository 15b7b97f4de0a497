//! Convenient re-exports for common types and traits

pub use crate::core::{BoxedTask, ClosureTask, PoolError, Result, Task};
pub use crate::pool::{
    on_task_done, thread_name_prefix, Pool, PoolConfig, PoolOption, PoolStats,
};
