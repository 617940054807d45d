// src/executor/role_runner.rs
//! One physical execution context for one role
//!
//! A dedicated OS thread draining an unbounded FIFO channel. Each task runs
//! under `catch_unwind`, so a panicking task is logged and counted but never
//! takes the thread (or the caller on another role) down with it.

use crate::executor::stats::TaskAccounting;
use crate::executor::thread_context;
use crate::executor::TaskType;
use crate::utils::errors::{EngineError, Result};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use tracing::{debug, error, warn};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

pub(crate) struct Task {
    pub(crate) requested: TaskType,
    pub(crate) label: &'static str,
    pub(crate) job: Job,
}

enum Message {
    Run(Task),
    /// Queued behind all pending work; the thread exits when it reaches it
    Stop,
}

pub(crate) struct RoleRunner {
    role: TaskType,
    tx: Sender<Message>,
    thread_id: ThreadId,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RoleRunner {
    /// Spawn the thread backing `role`
    pub(crate) fn spawn(
        role: TaskType,
        thread_name: String,
        accounting: Arc<TaskAccounting>,
    ) -> Result<Arc<Self>> {
        let (tx, rx) = crossbeam_channel::unbounded::<Message>();

        let join = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || run_loop(role, rx, accounting))
            .map_err(|source| EngineError::ThreadSpawn { role, source })?;

        debug!(role = role.as_str(), thread = %thread_name, "role runner started");

        Ok(Arc::new(Self {
            role,
            tx,
            thread_id: join.thread().id(),
            join: Mutex::new(Some(join)),
        }))
    }

    pub(crate) fn role(&self) -> TaskType {
        self.role
    }

    pub(crate) fn is_current_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Enqueue a task; hands it back if the runner already stopped
    pub(crate) fn enqueue(&self, task: Task) -> std::result::Result<(), Task> {
        self.tx.send(Message::Run(task)).map_err(|err| match err.0 {
            Message::Run(task) => task,
            Message::Stop => unreachable!("only Run messages are enqueued here"),
        })
    }

    /// Drain pending work and stop the thread.
    ///
    /// Joins unless called from the runner's own thread, where the stop
    /// marker is processed after the current task returns.
    pub(crate) fn stop(&self) {
        if self.tx.send(Message::Stop).is_err() {
            return;
        }
        if self.is_current_thread() {
            return;
        }
        if let Some(join) = self.join.lock().take() {
            if join.join().is_err() {
                warn!(role = self.role.as_str(), "role runner exited abnormally");
            }
        }
    }
}

fn run_loop(role: TaskType, rx: Receiver<Message>, accounting: Arc<TaskAccounting>) {
    thread_context::set_current_role(role);

    while let Ok(message) = rx.recv() {
        let Task {
            requested,
            label,
            job,
        } = match message {
            Message::Run(task) => task,
            Message::Stop => break,
        };

        match catch_unwind(AssertUnwindSafe(job)) {
            Ok(()) => accounting.completed(requested, role, label),
            Err(panic) => {
                error!(
                    role = role.as_str(),
                    label,
                    reason = panic_message(panic.as_ref()),
                    "task panicked"
                );
                accounting.panicked(requested, role, label);
            }
        }
    }

    // Posters that raced the stop marker; the jobs are dropped unrun
    drain_abandoned(&rx, role, &accounting);
    debug!(role = role.as_str(), "role runner stopped");
}

/// Account for tasks still queued behind `Stop`. Returns how many there were.
fn drain_abandoned(rx: &Receiver<Message>, role: TaskType, accounting: &TaskAccounting) -> usize {
    let mut left = 0;
    while let Ok(message) = rx.try_recv() {
        if let Message::Run(task) = message {
            accounting.abandoned(task.requested, role, task.label);
            left += 1;
        }
    }
    if left > 0 {
        warn!(role = role.as_str(), left, "tasks queued after stop were dropped");
    }
    left
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
