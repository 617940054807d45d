// src/executor/task_executor.rs
//! Role-addressed task executor
//!
//! Maps each [`TaskType`] to at most one [`RoleRunner`]. Role contexts are
//! created once and reused for the executor's lifetime:
//!
//! ```text
//! new()                    Platform, Background
//! init_scripting_thread()  Scripting          (skipped for declarative frontends)
//! init_view_threads()      Ui, Gpu, Io        (on view attach)
//! ```
//!
//! A missing Scripting context reroutes to Ui. Any other missing or torn
//! down role turns posts into counted no-ops.

use crate::executor::observer::TaskObserver;
use crate::executor::role_runner::{panic_message, RoleRunner, Task};
use crate::executor::stats::{ExecutorStats, TaskAccounting};
use crate::executor::TaskType;
use crate::observability::METRIC_SYNC_WAIT;
use crate::utils::errors::Result;
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

pub struct TaskExecutor {
    /// Thread name prefix, e.g. `uihost-7`
    name: String,
    runners: [RwLock<Option<Arc<RoleRunner>>>; TaskType::COUNT],
    accounting: Arc<TaskAccounting>,
}

impl TaskExecutor {
    /// Create an executor with its Platform and Background roles running
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let executor = Self::empty(name);
        executor.init_role(TaskType::Platform)?;
        executor.init_role(TaskType::Background)?;
        Ok(executor)
    }

    /// Create an executor without any role context
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runners: std::array::from_fn(|_| RwLock::new(None)),
            accounting: Arc::new(TaskAccounting::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start the dedicated Scripting role
    pub fn init_scripting_thread(&self) -> Result<()> {
        self.init_role(TaskType::Scripting)
    }

    /// Start the roles that need an attached view: Ui, Gpu, Io
    pub fn init_view_threads(&self) -> Result<()> {
        for role in TaskType::VIEW_ROLES {
            self.init_role(role)?;
        }
        Ok(())
    }

    /// Start `role` if it has no context yet
    pub fn init_role(&self, role: TaskType) -> Result<()> {
        let mut slot = self.runners[role.index()].write();
        if slot.is_some() {
            debug!(executor = %self.name, role = role.as_str(), "role already initialised");
            return Ok(());
        }
        let thread_name = format!("{}.{}", self.name, role.as_str());
        *slot = Some(RoleRunner::spawn(role, thread_name, Arc::clone(&self.accounting))?);
        Ok(())
    }

    /// Whether `role` has its own context (no reroute)
    pub fn has_role(&self, role: TaskType) -> bool {
        self.runners[role.index()].read().is_some()
    }

    /// Role whose thread a task addressed to `role` would run on
    pub fn resolve(&self, role: TaskType) -> Option<TaskType> {
        self.runner_for(role).map(|runner| runner.role())
    }

    /// Whether the calling thread is the one serving `role`
    pub fn runs_on_current_thread(&self, role: TaskType) -> bool {
        self.runner_for(role)
            .map(|runner| runner.is_current_thread())
            .unwrap_or(false)
    }

    fn runner_for(&self, role: TaskType) -> Option<Arc<RoleRunner>> {
        if let Some(runner) = self.runners[role.index()].read().clone() {
            return Some(runner);
        }
        if role == TaskType::Scripting {
            return self.runners[TaskType::Ui.index()].read().clone();
        }
        None
    }

    /// Enqueue `task` on `role` and return immediately.
    ///
    /// FIFO within a role, no ordering across roles. Returns `false` (and
    /// runs nothing) when the role has no context.
    pub fn post_task<F>(&self, role: TaskType, label: &'static str, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        match self.runner_for(role) {
            Some(runner) => self.enqueue(&runner, role, label, Box::new(task)),
            None => {
                self.accounting.dropped(role, label);
                false
            }
        }
    }

    /// Run `task` on `role` now if already on that thread, otherwise post it
    pub fn run_now_or_post<F>(&self, role: TaskType, label: &'static str, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        match self.runner_for(role) {
            Some(runner) if runner.is_current_thread() => {
                self.run_inline(&runner, role, label, task).is_some()
            }
            Some(runner) => self.enqueue(&runner, role, label, Box::new(task)),
            None => {
                self.accounting.dropped(role, label);
                false
            }
        }
    }

    /// Enqueue `task` on `role` and block until it has run.
    ///
    /// Returns the task's result, or `None` if the role has no context or
    /// the task panicked. Called from the role's own thread, the task runs
    /// inline instead of deadlocking.
    pub fn post_sync_task<R, F>(&self, role: TaskType, label: &'static str, task: F) -> Option<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let Some(runner) = self.runner_for(role) else {
            self.accounting.dropped(role, label);
            return None;
        };

        if runner.is_current_thread() {
            return self.run_inline(&runner, role, label, task);
        }

        let (done_tx, done_rx) = crossbeam_channel::bounded::<R>(1);
        let job = Box::new(move || {
            let _ = done_tx.send(task());
        });
        if !self.enqueue(&runner, role, label, job) {
            return None;
        }

        let started = Instant::now();
        // Disconnects without a value if the task panicked or the role stopped
        let result = done_rx.recv().ok();
        metrics::histogram!(METRIC_SYNC_WAIT, "role" => runner.role().as_str())
            .record(started.elapsed().as_secs_f64());
        result
    }

    fn enqueue(
        &self,
        runner: &RoleRunner,
        requested: TaskType,
        label: &'static str,
        job: Box<dyn FnOnce() + Send + 'static>,
    ) -> bool {
        self.accounting.posted(requested, runner.role(), label);
        let task = Task {
            requested,
            label,
            job,
        };
        match runner.enqueue(task) {
            Ok(()) => true,
            Err(_) => {
                self.accounting.dropped(requested, label);
                false
            }
        }
    }

    fn run_inline<R, F>(
        &self,
        runner: &RoleRunner,
        requested: TaskType,
        label: &'static str,
        task: F,
    ) -> Option<R>
    where
        F: FnOnce() -> R,
    {
        let resolved = runner.role();
        self.accounting.posted(requested, resolved, label);
        match catch_unwind(AssertUnwindSafe(task)) {
            Ok(value) => {
                self.accounting.completed(requested, resolved, label);
                Some(value)
            }
            Err(panic) => {
                error!(
                    role = resolved.as_str(),
                    label,
                    reason = panic_message(panic.as_ref()),
                    "inline task panicked"
                );
                self.accounting.panicked(requested, resolved, label);
                None
            }
        }
    }

    /// Tear down `role`: later posts become no-ops, pending tasks drain
    /// first. Returns `false` if the role had no context of its own.
    pub fn shutdown_role(&self, role: TaskType) -> bool {
        let runner = self.runners[role.index()].write().take();
        match runner {
            Some(runner) => {
                runner.stop();
                debug!(executor = %self.name, role = role.as_str(), "role torn down");
                true
            }
            None => false,
        }
    }

    /// Tear down every role, Scripting and view roles first
    pub fn shutdown(&self) {
        const ORDER: [TaskType; TaskType::COUNT] = [
            TaskType::Scripting,
            TaskType::Ui,
            TaskType::Gpu,
            TaskType::Io,
            TaskType::Background,
            TaskType::Platform,
        ];
        for role in ORDER {
            self.shutdown_role(role);
        }
        info!(executor = %self.name, "task executor shut down");
    }

    pub fn set_observer(&self, observer: Option<Arc<dyn TaskObserver>>) {
        self.accounting.set_observer(observer);
    }

    pub fn stats(&self) -> ExecutorStats {
        self.accounting.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::observer::{RecordingObserver, TaskPhase};
    use crate::executor::thread_context;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn full_executor(name: &str) -> TaskExecutor {
        let executor = TaskExecutor::new(name).unwrap();
        executor.init_scripting_thread().unwrap();
        executor.init_view_threads().unwrap();
        executor
    }

    #[test]
    fn test_initial_roles() {
        let executor = TaskExecutor::new("t-initial").unwrap();
        assert!(executor.has_role(TaskType::Platform));
        assert!(executor.has_role(TaskType::Background));
        assert!(!executor.has_role(TaskType::Ui));
        assert!(!executor.has_role(TaskType::Scripting));
        executor.shutdown();
    }

    #[test]
    fn test_sync_task_blocks_until_done() {
        let executor = full_executor("t-sync");
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let result = executor.post_sync_task(TaskType::Ui, "slow", move || {
            std::thread::sleep(Duration::from_millis(30));
            counter_clone.fetch_add(1, Ordering::SeqCst)
        });

        assert_eq!(result, Some(0));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        executor.shutdown();
    }

    #[test]
    fn test_sync_task_waits_for_earlier_tasks() {
        let executor = full_executor("t-barrier");
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            let order = Arc::clone(&order);
            assert!(executor.post_task(TaskType::Ui, "push", move || order.lock().push(i)));
        }
        executor.post_sync_task(TaskType::Ui, "barrier", || ());

        assert_eq!(order.lock().len(), 10);
        executor.shutdown();
    }

    #[test]
    fn test_scripting_reroutes_to_ui_when_absent() {
        let executor = TaskExecutor::new("t-reroute").unwrap();
        executor.init_view_threads().unwrap();

        assert_eq!(executor.resolve(TaskType::Scripting), Some(TaskType::Ui));
        let role = executor.post_sync_task(TaskType::Scripting, "where", thread_context::current_role);
        assert_eq!(role, Some(Some(TaskType::Ui)));
        executor.shutdown();
    }

    #[test]
    fn test_dedicated_scripting_is_not_rerouted() {
        let executor = full_executor("t-dedicated");
        assert_eq!(executor.resolve(TaskType::Scripting), Some(TaskType::Scripting));
        executor.shutdown();
    }

    #[test]
    fn test_post_to_missing_role_is_noop() {
        let executor = TaskExecutor::new("t-missing").unwrap();
        let ran = Arc::new(AtomicUsize::new(0));

        let ran_clone = Arc::clone(&ran);
        assert!(!executor.post_task(TaskType::Gpu, "trim", move || {
            ran_clone.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(executor.post_sync_task(TaskType::Ui, "barrier", || 1), None);

        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(executor.stats().role(TaskType::Gpu).dropped, 1);
        executor.shutdown();
    }

    #[test]
    fn test_post_after_shutdown_is_noop() {
        let executor = full_executor("t-torn");
        assert!(executor.shutdown_role(TaskType::Ui));
        assert!(!executor.shutdown_role(TaskType::Ui));

        assert!(!executor.post_task(TaskType::Ui, "late", || {}));
        assert_eq!(executor.post_sync_task(TaskType::Ui, "late-sync", || 5), None);
        // Scripting still has its own context
        assert_eq!(executor.post_sync_task(TaskType::Scripting, "alive", || 5), Some(5));

        executor.shutdown();
        assert!(!executor.post_task(TaskType::Scripting, "late", || {}));
        assert!(!executor.post_task(TaskType::Platform, "late", || {}));
    }

    #[test]
    fn test_shutdown_drains_pending() {
        let executor = full_executor("t-drain");
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            executor.post_task(TaskType::Io, "count", move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        executor.shutdown_role(TaskType::Io);

        assert_eq!(counter.load(Ordering::SeqCst), 50);
        executor.shutdown();
    }

    #[test]
    fn test_sync_from_same_role_runs_inline() {
        let executor = Arc::new(full_executor("t-inline"));

        let inner = Arc::clone(&executor);
        let result = executor.post_sync_task(TaskType::Ui, "outer", move || {
            inner.post_sync_task(TaskType::Ui, "inner", || 41).map(|v| v + 1)
        });

        assert_eq!(result, Some(Some(42)));
        executor.shutdown();
    }

    #[test]
    fn test_run_now_or_post() {
        let executor = Arc::new(full_executor("t-now"));
        let order = Arc::new(Mutex::new(Vec::new()));

        let inner = Arc::clone(&executor);
        let order_clone = Arc::clone(&order);
        executor.post_sync_task(TaskType::Scripting, "outer", move || {
            let order_inner = Arc::clone(&order_clone);
            inner.run_now_or_post(TaskType::Scripting, "now", move || order_inner.lock().push("now"));
            order_clone.lock().push("after");
        });

        assert_eq!(*order.lock(), vec!["now", "after"]);
        executor.shutdown();
    }

    #[test]
    fn test_sync_task_panic_returns_none() {
        let executor = full_executor("t-panic");
        let result: Option<u8> = executor.post_sync_task(TaskType::Ui, "boom", || panic!("boom"));
        assert_eq!(result, None);

        // Role survives the panic
        assert_eq!(executor.post_sync_task(TaskType::Ui, "after", || 1), Some(1));
        assert_eq!(executor.stats().role(TaskType::Ui).panicked, 1);
        executor.shutdown();
    }

    #[test]
    fn test_observer_records_phases() {
        let executor = full_executor("t-observe");
        let observer = Arc::new(RecordingObserver::new());
        executor.set_observer(Some(observer.clone()));

        executor.post_sync_task(TaskType::Background, "bg", || ());
        executor.shutdown_role(TaskType::Gpu);
        executor.post_task(TaskType::Gpu, "gpu", || ());

        assert_eq!(observer.find("bg", TaskPhase::Posted).len(), 1);
        assert_eq!(observer.find("bg", TaskPhase::Completed).len(), 1);
        assert_eq!(observer.find("gpu", TaskPhase::Dropped).len(), 1);
        executor.shutdown();
    }

    #[test]
    fn test_concurrent_posters_keep_per_producer_order() {
        let executor = Arc::new(full_executor("t-concurrent"));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let executor = Arc::clone(&executor);
                let seen = Arc::clone(&seen);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let seen = Arc::clone(&seen);
                        executor.post_task(TaskType::Ui, "push", move || seen.lock().push((p, i)));
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }
        executor.post_sync_task(TaskType::Ui, "barrier", || ());

        let seen = seen.lock();
        assert_eq!(seen.len(), 400);
        for p in 0..4 {
            let mine: Vec<_> = seen.iter().filter(|(q, _)| *q == p).map(|(_, i)| *i).collect();
            assert_eq!(mine, (0..100).collect::<Vec<_>>());
        }
        executor.shutdown();
    }
}
