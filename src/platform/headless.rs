// src/platform/headless.rs
//! Headless platform view and window
//!
//! Stand-ins for a real windowing toolkit: the host (or a test) feeds input
//! through `dispatch_*`, which calls the registered callbacks exactly as a
//! platform input dispatcher would.

use crate::pipeline::{KeyEvent, MouseEvent, PlatformWindow, RotationEvent, TouchPoint};
use crate::platform::resource::{LocalResourceRegister, ResourceRegister};
use crate::platform::view::{PlatformView, ViewCallbacks};
use crate::InstanceId;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Window that counts frame requests
#[derive(Clone, Default)]
pub struct HeadlessWindow {
    frames: Arc<AtomicU64>,
    destroyed: Arc<AtomicBool>,
}

impl HeadlessWindow {
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::SeqCst)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl PlatformWindow for HeadlessWindow {
    fn request_frame(&mut self) {
        self.frames.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&mut self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }
}

pub struct HeadlessView {
    instance_id: InstanceId,
    window: HeadlessWindow,
    fail_window: bool,
    callbacks: RwLock<Option<ViewCallbacks>>,
    resources: Arc<LocalResourceRegister>,
    created_at: Mutex<Option<DateTime<Utc>>>,
    launched: AtomicBool,
    released: AtomicBool,
}

impl HeadlessView {
    pub fn new(instance_id: InstanceId) -> Arc<Self> {
        Arc::new(Self::build(instance_id, false))
    }

    /// View whose window creation always fails
    pub fn without_surface(instance_id: InstanceId) -> Arc<Self> {
        Arc::new(Self::build(instance_id, true))
    }

    fn build(instance_id: InstanceId, fail_window: bool) -> Self {
        Self {
            instance_id,
            window: HeadlessWindow::default(),
            fail_window,
            callbacks: RwLock::new(None),
            resources: Arc::new(LocalResourceRegister::new()),
            created_at: Mutex::new(None),
            launched: AtomicBool::new(false),
            released: AtomicBool::new(false),
        }
    }

    /// Handle to the window this view hands out
    pub fn window(&self) -> HeadlessWindow {
        self.window.clone()
    }

    pub fn resources(&self) -> Arc<LocalResourceRegister> {
        Arc::clone(&self.resources)
    }

    pub fn has_callbacks(&self) -> bool {
        self.callbacks.read().is_some()
    }

    pub fn is_launched(&self) -> bool {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        *self.created_at.lock()
    }

    pub fn dispatch_touch(&self, event: TouchPoint) {
        if let Some(callbacks) = self.callbacks.read().as_ref() {
            (callbacks.touch)(event);
        }
    }

    /// Returns whether the instance consumed the key
    pub fn dispatch_key(&self, event: KeyEvent) -> bool {
        self.callbacks
            .read()
            .as_ref()
            .map(|callbacks| (callbacks.key)(event))
            .unwrap_or(false)
    }

    pub fn dispatch_mouse(&self, event: MouseEvent) {
        if let Some(callbacks) = self.callbacks.read().as_ref() {
            (callbacks.mouse)(event);
        }
    }

    pub fn dispatch_rotation(&self, event: RotationEvent) -> bool {
        self.callbacks
            .read()
            .as_ref()
            .map(|callbacks| (callbacks.rotation)(event))
            .unwrap_or(false)
    }

    pub fn dispatch_view_change(&self, width: i32, height: i32) {
        if let Some(callbacks) = self.callbacks.read().as_ref() {
            (callbacks.view_change)(width, height);
        }
    }

    pub fn dispatch_density_change(&self, density: f64) {
        if let Some(callbacks) = self.callbacks.read().as_ref() {
            (callbacks.density_change)(density);
        }
    }

    pub fn dispatch_system_bar_height_change(&self, status_bar: f64, navigation_bar: f64) {
        if let Some(callbacks) = self.callbacks.read().as_ref() {
            (callbacks.system_bar_height_change)(status_bar, navigation_bar);
        }
    }

    pub fn dispatch_surface_destroy(&self) {
        if let Some(callbacks) = self.callbacks.read().as_ref() {
            (callbacks.surface_destroy)();
        }
    }

    pub fn dispatch_idle(&self, deadline: i64) {
        if let Some(callbacks) = self.callbacks.read().as_ref() {
            (callbacks.idle)(deadline);
        }
    }
}

impl PlatformView for HeadlessView {
    fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    fn create_platform_window(&self) -> Option<Box<dyn PlatformWindow>> {
        if self.fail_window {
            return None;
        }
        Some(Box::new(self.window.clone()))
    }

    fn register_callbacks(&self, callbacks: ViewCallbacks) {
        *self.callbacks.write() = Some(callbacks);
    }

    fn resource_register(&self) -> Arc<dyn ResourceRegister> {
        self.resources.clone()
    }

    fn set_create_time(&self, created_at: DateTime<Utc>) {
        *self.created_at.lock() = Some(created_at);
    }

    fn launch(&self) {
        debug!(instance_id = self.instance_id, "headless view launched");
        self.launched.store(true, Ordering::SeqCst);
    }

    fn release(&self) {
        self.callbacks.write().take();
        self.released.store(true, Ordering::SeqCst);
    }
}
