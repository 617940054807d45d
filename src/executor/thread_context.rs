// src/executor/thread_context.rs
//! Per-thread identity
//!
//! Role threads record which role they run and which instance they serve,
//! so code running inside a task can find its owner without a lookup.

use crate::executor::TaskType;
use crate::InstanceId;
use std::cell::Cell;

/// No instance bound to this thread
pub const INSTANCE_ID_UNDEFINED: InstanceId = -1;

/// Identity used by the embedding thread while it creates containers
pub const INSTANCE_ID_PLATFORM: InstanceId = -2;

thread_local! {
    static CURRENT_INSTANCE: Cell<InstanceId> = const { Cell::new(INSTANCE_ID_UNDEFINED) };
    static CURRENT_ROLE: Cell<Option<TaskType>> = const { Cell::new(None) };
}

/// Bind the calling thread to `instance_id`
pub fn init_for_thread(instance_id: InstanceId) {
    CURRENT_INSTANCE.with(|current| current.set(instance_id));
}

/// Instance bound to the calling thread, if any
pub fn current_instance() -> Option<InstanceId> {
    let id = CURRENT_INSTANCE.with(Cell::get);
    (id != INSTANCE_ID_UNDEFINED).then_some(id)
}

/// Role run by the calling thread, `None` off role threads
pub fn current_role() -> Option<TaskType> {
    CURRENT_ROLE.with(Cell::get)
}

pub(crate) fn set_current_role(role: TaskType) {
    CURRENT_ROLE.with(|current| current.set(Some(role)));
}
