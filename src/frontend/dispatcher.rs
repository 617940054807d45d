// src/frontend/dispatcher.rs
//! Message channel between the script side and the platform
//!
//! Payloads are opaque: the runtime forwards them without interpretation.

use bytes::Bytes;

pub trait MessageDispatcher: Send + Sync {
    /// Forward a call from the script side to the platform
    fn dispatch(&self, group: &str, data: Bytes, call_id: i32, reply_expected: bool);

    /// Report a failed plugin call back to the script side
    fn dispatch_plugin_error(&self, call_id: i32, error_code: i32, message: String);
}
