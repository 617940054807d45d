// src/utils/errors.rs
//! Error types for the container runtime
//!
//! Errors stay inside the crate's internal plumbing. The instance-id
//! addressed surface on [`crate::engine::Engine`] turns every one of them
//! into a logged no-op, `false` or an empty default.

use crate::executor::TaskType;
use crate::frontend::FrontendType;
use crate::InstanceId;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to spawn {role} thread: {source}")]
    ThreadSpawn {
        role: TaskType,
        #[source]
        source: std::io::Error,
    },

    #[error("frontend type {0:?} is not supported by this container")]
    UnsupportedFrontend(FrontendType),

    #[error("no script engine loader registered for {0}")]
    EngineLoaderMissing(&'static str),

    #[error("script engine loader {0} failed to create an engine")]
    EngineCreateFailed(&'static str),

    #[error("instance {0} is already registered")]
    DuplicateInstance(InstanceId),

    #[error("instance {0} not found")]
    InstanceNotFound(InstanceId),

    #[error("instance {0} already has a view attached")]
    ViewAlreadyAttached(InstanceId),

    #[error("failed to create platform window for instance {0}")]
    WindowCreateFailed(InstanceId),

    #[error("asset error: {0}")]
    Asset(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
