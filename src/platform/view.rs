// src/platform/view.rs
//! Platform view seam
//!
//! The view decodes raw input on the Platform role and hands it to the
//! callbacks the container registers at attach time. Those callbacks only
//! re-post onto the UI role; key and rotation callbacks block for the
//! consumed flag the OS input dispatcher needs.

use crate::pipeline::{KeyEvent, MouseEvent, PlatformWindow, RotationEvent, TouchPoint};
use crate::platform::resource::ResourceRegister;
use crate::InstanceId;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub type TouchCallback = Box<dyn Fn(TouchPoint) + Send + Sync>;
pub type KeyCallback = Box<dyn Fn(KeyEvent) -> bool + Send + Sync>;
pub type MouseCallback = Box<dyn Fn(MouseEvent) + Send + Sync>;
pub type RotationCallback = Box<dyn Fn(RotationEvent) -> bool + Send + Sync>;
pub type ViewChangeCallback = Box<dyn Fn(i32, i32) + Send + Sync>;
pub type DensityChangeCallback = Box<dyn Fn(f64) + Send + Sync>;
pub type SystemBarHeightChangeCallback = Box<dyn Fn(f64, f64) + Send + Sync>;
pub type SurfaceDestroyCallback = Box<dyn Fn() + Send + Sync>;
pub type IdleCallback = Box<dyn Fn(i64) + Send + Sync>;

/// Every platform event callback a container installs on its view
pub struct ViewCallbacks {
    pub touch: TouchCallback,
    pub key: KeyCallback,
    pub mouse: MouseCallback,
    pub rotation: RotationCallback,
    pub view_change: ViewChangeCallback,
    pub density_change: DensityChangeCallback,
    pub system_bar_height_change: SystemBarHeightChangeCallback,
    pub surface_destroy: SurfaceDestroyCallback,
    pub idle: IdleCallback,
}

pub trait PlatformView: Send + Sync {
    fn instance_id(&self) -> InstanceId;

    /// Create the render surface; `None` aborts the attach
    fn create_platform_window(&self) -> Option<Box<dyn PlatformWindow>>;

    fn register_callbacks(&self, callbacks: ViewCallbacks);

    fn resource_register(&self) -> Arc<dyn ResourceRegister>;

    fn set_create_time(&self, _created_at: DateTime<Utc>) {}

    /// Start delivering events and frames
    fn launch(&self);

    /// Handle a dump request; `false` leaves it to the pipeline
    fn dump(&self, _params: &[String]) -> bool {
        false
    }

    /// Drop registered callbacks and platform resources
    fn release(&self);
}
