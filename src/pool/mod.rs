//! Worker pool, its configuration and worker threads

pub mod config;
pub mod thread_pool;
pub mod worker;

pub use config::{on_task_done, thread_name_prefix, PoolConfig, PoolOption, TaskHook};
pub use thread_pool::{Pool, PoolStats};
pub use worker::{Worker, WorkerStatSnapshot, WorkerStats};
