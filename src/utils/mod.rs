// src/utils/mod.rs
//! Common utilities shared by every layer
//!
//! - **errors**: crate-wide error type and `Result` alias
//! - **config**: layered engine configuration (defaults, file, environment)
//! - **memory**: allocator cache trimming used under memory pressure

pub mod config;
pub mod errors;
pub mod memory;

pub use config::{AppConfig, EngineConfig, LogFormat, ObservabilityConfig, RuntimeConfig};
pub use errors::{EngineError, Result};
pub use memory::purge_malloc_cache;
