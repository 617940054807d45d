// src/engine/mod.rs
//! Process-wide runtime state
//!
//! ```text
//! embedding host ──(instance id)──▶ Engine ──▶ Registry ──▶ Container
//!                                     │
//!                                     ├── EngineLoaders (script engines)
//!                                     ├── EventReporter (telemetry)
//!                                     └── Watchdog ◀── WatchdogTicker thread
//! ```
//!
//! Tests build one [`Engine`] each; embedders install a single one with
//! [`Engine::init_global`] at process start and call [`Engine::clear`] at
//! process end.

pub mod engine;
pub mod watchdog;

// Re-export commonly used types
pub use engine::Engine;
pub use watchdog::{Watchdog, WatchdogTicker};
