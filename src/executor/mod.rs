// src/executor/mod.rs
//! Task executor
//!
//! Maps the fixed set of logical roles (Platform, UI, Scripting, Background,
//! GPU, IO) onto dedicated threads, each draining its own FIFO queue:
//!
//! - **Task Type**: the role enum
//! - **Role Runner**: one thread + channel per role, panic-isolated
//! - **Task Executor**: role table, async/sync submission, reroute, teardown
//! - **Stats / Observer**: per-role counters and an event hook
//! - **Thread Context**: thread-local instance and role identity
//!
//! # Architecture
//!
//! ```text
//!  post_task(role, label, f) ──► runner_for(role) ──► [queue] ──► role thread
//!                                   │                               │
//!                   Scripting absent? reroute to Ui      catch_unwind(f)
//!                   role torn down?   counted no-op      stats + observer
//!
//!  post_sync_task(role, label, f) ─► same path, caller blocks on a
//!                                    one-shot channel for f's result
//! ```
//!
//! The only blocking primitive is `post_sync_task`; it is reserved for
//! key/rotation delivery and teardown barriers.

pub mod observer;
pub(crate) mod role_runner;
pub mod stats;
pub mod task_executor;
pub mod task_type;
pub mod thread_context;

// Re-export commonly used types
pub use observer::{RecordingObserver, TaskEvent, TaskObserver, TaskPhase};
pub use stats::{ExecutorStats, RoleStats};
pub use task_executor::TaskExecutor;
pub use task_type::TaskType;
