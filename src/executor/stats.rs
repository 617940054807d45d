// src/executor/stats.rs
//! Per-role task accounting
//!
//! Counters are plain relaxed atomics; the observer and metrics facade are
//! fed from the same call sites so the three views never disagree.

use crate::executor::observer::{TaskEvent, TaskObserver, TaskPhase};
use crate::executor::TaskType;
use crate::observability::{METRIC_TASKS_DROPPED, METRIC_TASKS_PANICKED, METRIC_TASKS_POSTED};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

#[derive(Default)]
struct RoleCounters {
    posted: AtomicU64,
    executed: AtomicU64,
    dropped: AtomicU64,
    abandoned: AtomicU64,
    panicked: AtomicU64,
}

/// Shared between an executor and its role threads
#[derive(Default)]
pub(crate) struct TaskAccounting {
    counters: [RoleCounters; TaskType::COUNT],
    observer: RwLock<Option<Arc<dyn TaskObserver>>>,
}

impl TaskAccounting {
    pub(crate) fn set_observer(&self, observer: Option<Arc<dyn TaskObserver>>) {
        *self.observer.write() = observer;
    }

    pub(crate) fn posted(&self, requested: TaskType, resolved: TaskType, label: &'static str) {
        trace!(role = resolved.as_str(), label, "task posted");
        self.counters[resolved.index()].posted.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRIC_TASKS_POSTED, "role" => resolved.as_str()).increment(1);
        self.notify(requested, Some(resolved), label, TaskPhase::Posted);
    }

    pub(crate) fn completed(&self, requested: TaskType, resolved: TaskType, label: &'static str) {
        self.counters[resolved.index()].executed.fetch_add(1, Ordering::Relaxed);
        self.notify(requested, Some(resolved), label, TaskPhase::Completed);
    }

    pub(crate) fn panicked(&self, requested: TaskType, resolved: TaskType, label: &'static str) {
        self.counters[resolved.index()].panicked.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRIC_TASKS_PANICKED, "role" => resolved.as_str()).increment(1);
        self.notify(requested, Some(resolved), label, TaskPhase::Panicked);
    }

    pub(crate) fn dropped(&self, requested: TaskType, label: &'static str) {
        trace!(role = requested.as_str(), label, "task dropped, role unavailable");
        self.counters[requested.index()].dropped.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRIC_TASKS_DROPPED, "role" => requested.as_str()).increment(1);
        self.notify(requested, None, label, TaskPhase::Dropped);
    }

    /// A posted task that never ran because its role stopped first
    pub(crate) fn abandoned(&self, requested: TaskType, resolved: TaskType, label: &'static str) {
        trace!(role = resolved.as_str(), label, "task dropped, role stopped");
        let counters = &self.counters[resolved.index()];
        counters.dropped.fetch_add(1, Ordering::Relaxed);
        counters.abandoned.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(METRIC_TASKS_DROPPED, "role" => resolved.as_str()).increment(1);
        self.notify(requested, Some(resolved), label, TaskPhase::Dropped);
    }

    fn notify(
        &self,
        requested: TaskType,
        resolved: Option<TaskType>,
        label: &'static str,
        phase: TaskPhase,
    ) {
        let observer = self.observer.read().clone();
        if let Some(observer) = observer {
            observer.on_task_event(&TaskEvent {
                requested,
                resolved,
                label,
                phase,
            });
        }
    }

    pub(crate) fn snapshot(&self) -> ExecutorStats {
        let mut roles = [RoleStats::default(); TaskType::COUNT];
        for (stats, counters) in roles.iter_mut().zip(self.counters.iter()) {
            *stats = RoleStats {
                posted: counters.posted.load(Ordering::Relaxed),
                executed: counters.executed.load(Ordering::Relaxed),
                dropped: counters.dropped.load(Ordering::Relaxed),
                abandoned: counters.abandoned.load(Ordering::Relaxed),
                panicked: counters.panicked.load(Ordering::Relaxed),
            };
        }
        ExecutorStats { roles }
    }
}

/// Counters for one role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleStats {
    pub posted: u64,
    pub executed: u64,
    /// Never ran: role unavailable at post time, or stopped before reaching it
    pub dropped: u64,
    /// The part of `dropped` that had already been posted
    pub abandoned: u64,
    pub panicked: u64,
}

impl RoleStats {
    /// Tasks accepted but not yet finished
    pub fn pending(&self) -> u64 {
        self.posted
            .saturating_sub(self.executed + self.panicked + self.abandoned)
    }
}

/// Executor statistics snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ExecutorStats {
    roles: [RoleStats; TaskType::COUNT],
}

impl ExecutorStats {
    pub fn role(&self, role: TaskType) -> RoleStats {
        self.roles[role.index()]
    }

    pub fn total_posted(&self) -> u64 {
        self.roles.iter().map(|r| r.posted).sum()
    }

    pub fn total_dropped(&self) -> u64 {
        self.roles.iter().map(|r| r.dropped).sum()
    }
}
