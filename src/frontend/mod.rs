// src/frontend/mod.rs
//! Application-logic frontend
//!
//! ```text
//!   Container ──▶ Frontend ──post──▶ Scripting role ──▶ ScriptEngine
//!                    │                 (UI role when declarative)
//!                    ├── PageRouter (page stack)
//!                    └── MessageDispatcher (weak, back to the container)
//! ```
//!
//! The variant set is closed: script engine, static card, declarative
//! engine. Engines come from loaders registered per library name.

pub mod dispatcher;
pub mod frontend;
pub mod router;
pub mod script_engine;
pub mod state;

// Re-export commonly used types
pub use dispatcher::MessageDispatcher;
pub use frontend::{Frontend, FrontendKind};
pub use router::{PageEntry, PageRouter, PopOutcome};
pub use script_engine::{
    engine_library, DebugFlags, EngineLoaders, ScriptEngine, ScriptEngineLoader, ScriptVariant,
    TracingScriptEngine, DECLARATIVE_ENGINE_A_LIB, DECLARATIVE_ENGINE_B_LIB, SCRIPT_ENGINE_A_LIB,
    SCRIPT_ENGINE_B_LIB,
};
pub use state::{FrontendState, FrontendType};
