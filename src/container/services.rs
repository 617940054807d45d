// src/container/services.rs
//! Process-wide collaborators shared by every container

use crate::frontend::EngineLoaders;
use crate::observability::EventReporter;
use crate::utils::config::{AppConfig, EngineConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct ContainerServices {
    pub loaders: Arc<EngineLoaders>,
    pub reporter: Arc<EventReporter>,
    pub app: AppConfig,
    pub thread_name_prefix: String,
    card_type: AtomicBool,
}

impl ContainerServices {
    pub fn new(config: &EngineConfig, loaders: Arc<EngineLoaders>, reporter: Arc<EventReporter>) -> Self {
        Self {
            loaders,
            reporter,
            app: config.app.clone(),
            thread_name_prefix: config.runtime.thread_name_prefix.clone(),
            card_type: AtomicBool::new(config.app.card_type),
        }
    }

    /// Whether a card frontend has been created in this process
    pub fn is_card_type(&self) -> bool {
        self.card_type.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_card_type(&self) {
        self.card_type.store(true, Ordering::Relaxed);
    }
}
