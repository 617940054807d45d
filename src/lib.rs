// src/lib.rs
//! UIHost Container Runtime Library
//!
//! Owns the lifetime of running UI instances ("page apps") for an embedded
//! UI engine: routes platform events to the right execution context and
//! keeps rendering, scripting and platform callbacks from racing each other.
//!
//! # Architecture
//!
//! - **executor**: role-addressed task executor (Platform, UI, Scripting,
//!   Background, GPU, IO threads)
//! - **container**: per-instance aggregate, lifecycle state machine, registry
//! - **engine**: process-wide state and the instance-id addressed entry points
//! - **frontend**: script engine / card / declarative frontend variants
//! - **pipeline**: render root, input routing and frame scheduling
//! - **platform**: view, ability and resource seams with headless stand-ins
//! - **assets**: asset manager and package file provider
//! - **observability**: tracing, metrics and telemetry event report
//! - **utils**: errors, configuration, memory trim

// Public module exports
pub mod assets;
pub mod container;
pub mod engine;
pub mod executor;
pub mod frontend;
pub mod observability;
pub mod pipeline;
pub mod platform;
pub mod utils;

/// Process-unique instance key, supplied by the embedding host
pub type InstanceId = i32;

// Re-export commonly used types
pub use container::{Container, ContainerState};
pub use engine::Engine;
pub use executor::{TaskExecutor, TaskType};
pub use frontend::{FrontendState, FrontendType};
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HASH: &str = env!("GIT_HASH");

/// Runtime build information
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            git_hash: GIT_HASH,
            build_timestamp: env!("BUILD_TIMESTAMP"),
            rustc_version: env!("RUSTC_VERSION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_build_info() {
        let info = BuildInfo::current();
        assert!(!info.version.is_empty());
        assert!(!info.git_hash.is_empty());
    }
}
