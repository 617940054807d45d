// src/executor/observer.rs
//! Task observation hook
//!
//! The executor reports every task transition to an optional observer.
//! Used for tracing task flow in the embedding host and for asserting
//! ordering in tests.

use crate::executor::TaskType;
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    /// Accepted into a role queue (or about to run inline)
    Posted,
    Completed,
    /// Target role had no execution context
    Dropped,
    /// Task body panicked; the runner survived
    Panicked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEvent {
    /// Role the task was addressed to
    pub requested: TaskType,
    /// Role whose thread runs it, after scripting-to-UI reroute
    pub resolved: Option<TaskType>,
    pub label: &'static str,
    pub phase: TaskPhase,
}

pub trait TaskObserver: Send + Sync {
    fn on_task_event(&self, event: &TaskEvent);
}

/// Observer that keeps every event in order
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<TaskEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TaskEvent> {
        self.events.lock().clone()
    }

    /// Events with the given label and phase
    pub fn find(&self, label: &str, phase: TaskPhase) -> Vec<TaskEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.label == label && e.phase == phase)
            .cloned()
            .collect()
    }

    /// Position of the first event matching label and phase
    pub fn position(&self, label: &str, phase: TaskPhase) -> Option<usize> {
        self.events
            .lock()
            .iter()
            .position(|e| e.label == label && e.phase == phase)
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl TaskObserver for RecordingObserver {
    fn on_task_event(&self, event: &TaskEvent) {
        self.events.lock().push(event.clone());
    }
}
