// src/frontend/script_engine.rs
//! Script engine seam
//!
//! The engine itself is a black box. It is produced by a loader registered
//! under one of four library names, picked by engine variant and whether the
//! frontend is declarative:
//!
//! ```text
//!               imperative                   declarative
//! variant A     libuihost_script_a.so        libuihost_declarative_a.so
//! variant B     libuihost_script_b.so        libuihost_declarative_b.so
//! ```

use crate::frontend::router::PageEntry;
use crate::frontend::state::{FrontendState, FrontendType};
use crate::platform::Ability;
use crate::utils::errors::{EngineError, Result};
use crate::InstanceId;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub const SCRIPT_ENGINE_A_LIB: &str = "libuihost_script_a.so";
pub const SCRIPT_ENGINE_B_LIB: &str = "libuihost_script_b.so";
pub const DECLARATIVE_ENGINE_A_LIB: &str = "libuihost_declarative_a.so";
pub const DECLARATIVE_ENGINE_B_LIB: &str = "libuihost_declarative_b.so";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptVariant {
    A,
    B,
}

impl ScriptVariant {
    pub fn from_flag(is_variant_b: bool) -> Self {
        if is_variant_b {
            ScriptVariant::B
        } else {
            ScriptVariant::A
        }
    }
}

/// Library name the engine for this combination is loaded from
pub fn engine_library(variant: ScriptVariant, declarative: bool) -> &'static str {
    match (variant, declarative) {
        (ScriptVariant::A, false) => SCRIPT_ENGINE_A_LIB,
        (ScriptVariant::B, false) => SCRIPT_ENGINE_B_LIB,
        (ScriptVariant::A, true) => DECLARATIVE_ENGINE_A_LIB,
        (ScriptVariant::B, true) => DECLARATIVE_ENGINE_B_LIB,
    }
}

/// Debug switches handed to the engine on initialize
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugFlags {
    pub need_debug_breakpoint: bool,
    pub debug_version: bool,
}

/// Script engine driven by a frontend.
///
/// Every method runs on the Scripting role (the UI role for declarative
/// frontends). Defaults are no-ops.
pub trait ScriptEngine: Send + Sync {
    /// Returns `false` if the engine could not start
    fn initialize(&self, _frontend_type: FrontendType, _debug: DebugFlags) -> bool {
        true
    }

    fn add_extra_native_object(&self, _name: &str, _object: Arc<dyn Ability>) {}

    fn load_page(&self, _page: &PageEntry) {}

    fn push_page(&self, _page: &PageEntry) {}

    fn update_page(&self, _page: &PageEntry) {}

    fn pop_page(&self, _page: &PageEntry) {}

    /// Returns `true` if the script handled the back press itself
    fn on_back_pressed(&self) -> bool {
        false
    }

    fn on_lifecycle(&self, _state: FrontendState) {}

    fn on_start_continuation(&self) -> bool {
        false
    }

    fn on_save_data(&self) -> Option<String> {
        None
    }

    fn on_restore_data(&self, _data: &str) -> bool {
        false
    }

    fn on_complete_continuation(&self, _result: i32) {}

    fn on_remote_terminated(&self) {}

    fn on_configuration_updated(&self, _configuration: &str) {}

    fn on_new_request(&self, _data: &str) {}

    fn run_garbage_collection(&self) {}

    fn on_plugin_error(&self, _call_id: i32, _error_code: i32, _message: &str) {}

    fn destroy(&self) {}
}

/// Produces engines for one library
pub trait ScriptEngineLoader: Send + Sync {
    fn create_engine(&self, instance_id: InstanceId) -> Option<Arc<dyn ScriptEngine>>;
}

impl<F> ScriptEngineLoader for F
where
    F: Fn(InstanceId) -> Option<Arc<dyn ScriptEngine>> + Send + Sync,
{
    fn create_engine(&self, instance_id: InstanceId) -> Option<Arc<dyn ScriptEngine>> {
        self(instance_id)
    }
}

/// Loader table keyed by library name
#[derive(Default)]
pub struct EngineLoaders {
    loaders: DashMap<&'static str, Arc<dyn ScriptEngineLoader>>,
}

impl EngineLoaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with a [`TracingScriptEngine`] loader for every library
    pub fn with_tracing_engines() -> Self {
        let loaders = Self::new();
        for library in [
            SCRIPT_ENGINE_A_LIB,
            SCRIPT_ENGINE_B_LIB,
            DECLARATIVE_ENGINE_A_LIB,
            DECLARATIVE_ENGINE_B_LIB,
        ] {
            loaders.register(
                library,
                Arc::new(|id: InstanceId| -> Option<Arc<dyn ScriptEngine>> {
                    Some(Arc::new(TracingScriptEngine::new(id)))
                }),
            );
        }
        loaders
    }

    pub fn register(&self, library: &'static str, loader: Arc<dyn ScriptEngineLoader>) {
        if self.loaders.insert(library, loader).is_some() {
            debug!(library, "script engine loader replaced");
        }
    }

    pub fn unregister(&self, library: &str) -> bool {
        self.loaders.remove(library).is_some()
    }

    pub fn get(&self, library: &'static str) -> Result<Arc<dyn ScriptEngineLoader>> {
        self.loaders
            .get(library)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(EngineError::EngineLoaderMissing(library))
    }

    /// Load the engine for `variant`/`declarative` and create an instance
    pub fn create_engine(
        &self,
        variant: ScriptVariant,
        declarative: bool,
        instance_id: InstanceId,
    ) -> Result<Arc<dyn ScriptEngine>> {
        let library = engine_library(variant, declarative);
        self.get(library)?
            .create_engine(instance_id)
            .ok_or(EngineError::EngineCreateFailed(library))
    }

    pub fn libraries(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.loaders.iter().map(|entry| *entry.key()).collect();
        names.sort_unstable();
        names
    }
}

/// Engine that only logs what it is asked to do
pub struct TracingScriptEngine {
    instance_id: InstanceId,
}

impl TracingScriptEngine {
    pub fn new(instance_id: InstanceId) -> Self {
        Self { instance_id }
    }
}

impl ScriptEngine for TracingScriptEngine {
    fn initialize(&self, frontend_type: FrontendType, flags: DebugFlags) -> bool {
        info!(
            instance_id = self.instance_id,
            frontend = %frontend_type,
            breakpoint = flags.need_debug_breakpoint,
            "engine initialized"
        );
        true
    }

    fn load_page(&self, page: &PageEntry) {
        info!(instance_id = self.instance_id, page_id = page.page_id, "load page");
    }

    fn push_page(&self, page: &PageEntry) {
        info!(instance_id = self.instance_id, page_id = page.page_id, "push page");
    }

    fn pop_page(&self, page: &PageEntry) {
        info!(instance_id = self.instance_id, page_id = page.page_id, "pop page");
    }

    fn on_lifecycle(&self, state: FrontendState) {
        debug!(instance_id = self.instance_id, ?state, "lifecycle");
    }

    fn run_garbage_collection(&self) {
        debug!(instance_id = self.instance_id, "gc");
    }

    fn destroy(&self) {
        info!(instance_id = self.instance_id, "engine destroyed");
    }
}
