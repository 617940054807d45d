// src/container/mod.rs
//! Container lifecycle and registry
//!
//! A container is the unit of creation and destruction for one UI
//! instance. It owns the frontend/pipeline pair, drives them through the
//! lifecycle state machine and hands their teardown to the roles they
//! live on.

pub mod container;
pub mod registry;
pub mod services;
pub mod state;

// Re-export commonly used types
pub use container::{Container, WindowStyle};
pub use registry::{ContainerRegistry, Registry};
pub use services::ContainerServices;
pub use state::ContainerState;
