// src/pipeline/mod.rs
//! Render pipeline of one instance
//!
//! The pipeline owns the root of the render tree and is confined to the UI
//! role: it is built on attach, fed input by tasks the view callbacks post,
//! and destroyed by a UI-role task during teardown. Layout and painting sit
//! behind the [`PlatformWindow`] seam.

pub mod events;
pub mod pipeline;
pub mod theme;
pub mod window;

// Re-export commonly used types
pub use events::{
    KeyAction, KeyCode, KeyEvent, MouseAction, MouseButton, MouseEvent, RotationEvent, TouchPoint,
    TouchType,
};
pub use pipeline::{Pipeline, PipelineStats, RootSize};
pub use theme::{ColorScheme, Theme, WindowModal};
pub use window::{PlatformWindow, Window};
