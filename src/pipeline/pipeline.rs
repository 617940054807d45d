// src/pipeline/pipeline.rs
//! Per-instance pipeline: render root, input routing and frame scheduling
//!
//! ```text
//! platform callbacks ──post──▶ UI role ──▶ Pipeline::on_*()
//!                                              │
//!                         ┌────────────────────┼──────────────────┐
//!                         ▼                    ▼                  ▼
//!                   root state          Frontend (back)     PlatformWindow
//!                  (size, theme)       via Scripting role   (frame requests)
//! ```
//!
//! Every method is expected to run on the UI role. After [`Pipeline::destroy`]
//! all entry points are no-ops.

use crate::assets::AssetManager;
use crate::executor::TaskExecutor;
use crate::frontend::Frontend;
use crate::pipeline::events::{KeyAction, KeyCode, KeyEvent, MouseEvent, RotationEvent, TouchPoint};
use crate::pipeline::theme::{ColorScheme, Theme, WindowModal};
use crate::pipeline::window::Window;
use crate::platform::ResourceRegister;
use crate::InstanceId;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace};

pub type FinishHandler = Box<dyn Fn() + Send + Sync>;
pub type StatusBarHandler = Box<dyn Fn(u32) + Send + Sync>;

/// Custom theme key carrying the status bar background color
const STATUS_BAR_COLOR_KEY: &str = "status_bar_color";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RootSize {
    pub density: f64,
    pub width: i32,
    pub height: i32,
}

/// Input counters
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PipelineStats {
    pub touch_events: u64,
    pub key_events: u64,
    pub mouse_events: u64,
    pub rotation_events: u64,
    pub idle_callbacks: u64,
    pub frames_requested: u64,
}

#[derive(Default)]
struct InputCounters {
    touch: AtomicU64,
    key: AtomicU64,
    mouse: AtomicU64,
    rotation: AtomicU64,
    idle: AtomicU64,
}

struct RootState {
    window: Window,
    root_size: RootSize,
    root_ready: bool,
    font_scale: f32,
    right_to_left: bool,
    window_modal: WindowModal,
    theme: Theme,
    status_bar_height: f64,
    navigation_bar_height: f64,
    surface_alive: bool,
    visible: bool,
    dirty: bool,
}

impl RootState {
    /// Request a frame if the root has pending changes and can draw
    fn flush(&mut self, force: bool) {
        if !self.root_ready || !self.surface_alive || self.window.is_destroyed() {
            return;
        }
        if self.dirty && (self.visible || force) {
            self.window.request_frame();
            self.dirty = false;
        }
    }
}

pub struct Pipeline {
    instance_id: InstanceId,
    executor: Arc<TaskExecutor>,
    asset_manager: Option<Arc<AssetManager>>,
    res_register: Arc<dyn ResourceRegister>,
    frontend: Mutex<Option<Arc<Frontend>>>,
    state: Mutex<RootState>,
    finish_handler: Mutex<Option<FinishHandler>>,
    status_bar_handler: Mutex<Option<StatusBarHandler>>,
    counters: InputCounters,
    destroyed: AtomicBool,
}

impl Pipeline {
    pub fn new(
        window: Window,
        executor: Arc<TaskExecutor>,
        asset_manager: Option<Arc<AssetManager>>,
        res_register: Arc<dyn ResourceRegister>,
        frontend: Option<Arc<Frontend>>,
        instance_id: InstanceId,
    ) -> Self {
        Self {
            instance_id,
            executor,
            asset_manager,
            res_register,
            frontend: Mutex::new(frontend),
            state: Mutex::new(RootState {
                window,
                root_size: RootSize::default(),
                root_ready: false,
                font_scale: 1.0,
                right_to_left: false,
                window_modal: WindowModal::Normal,
                theme: Theme::default(),
                status_bar_height: 0.0,
                navigation_bar_height: 0.0,
                surface_alive: true,
                visible: false,
                dirty: true,
            }),
            finish_handler: Mutex::new(None),
            status_bar_handler: Mutex::new(None),
            counters: InputCounters::default(),
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub fn executor(&self) -> &Arc<TaskExecutor> {
        &self.executor
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Run `f` against the root state unless destroyed
    fn with_state<R>(&self, f: impl FnOnce(&mut RootState) -> R) -> Option<R> {
        if self.is_destroyed() {
            return None;
        }
        Some(f(&mut self.state.lock()))
    }

    // ---- setup ----

    pub fn set_root_size(&self, density: f64, width: i32, height: i32) {
        self.with_state(|state| {
            state.root_size = RootSize {
                density,
                width,
                height,
            };
            state.dirty = true;
        });
    }

    pub fn set_is_right_to_left(&self, right_to_left: bool) {
        self.with_state(|state| state.right_to_left = right_to_left);
    }

    pub fn set_window_modal(&self, modal: WindowModal) {
        self.with_state(|state| state.window_modal = modal);
    }

    pub fn set_font_scale(&self, scale: f32) {
        self.with_state(|state| {
            if (state.font_scale - scale).abs() > f32::EPSILON {
                state.font_scale = scale;
                state.dirty = true;
                state.flush(false);
            }
        });
    }

    /// Apply a color scheme and the package's custom theme, if any
    pub fn apply_theme(&self, color_scheme: ColorScheme) {
        let mut theme = Theme::new(color_scheme);
        if let Some(assets) = &self.asset_manager {
            theme.load_custom(assets);
        }

        let status_bar_color = theme
            .custom
            .as_ref()
            .and_then(|custom| custom.get(STATUS_BAR_COLOR_KEY))
            .and_then(|value| value.as_u64())
            .and_then(|value| u32::try_from(value).ok());

        let applied = self.with_state(|state| {
            state.theme = theme;
            state.dirty = true;
        });

        if let (Some(()), Some(color)) = (applied, status_bar_color) {
            self.notify_status_bar_bg_color(color);
        }
    }

    /// Mark the root as ready to draw and request the first frame
    pub fn setup_root_element(&self) {
        self.with_state(|state| {
            state.root_ready = true;
            state.dirty = true;
            state.flush(true);
        });
        debug!(instance_id = self.instance_id, "root element ready");
    }

    pub fn set_finish_event_handler(&self, handler: FinishHandler) {
        *self.finish_handler.lock() = Some(handler);
    }

    pub fn set_status_bar_event_handler(&self, handler: StatusBarHandler) {
        *self.status_bar_handler.lock() = Some(handler);
    }

    /// Ask the host to finish the instance
    pub fn notify_finish(&self) {
        if self.is_destroyed() {
            return;
        }
        if let Some(handler) = self.finish_handler.lock().as_ref() {
            handler();
        }
    }

    pub fn notify_status_bar_bg_color(&self, color: u32) {
        if self.is_destroyed() {
            return;
        }
        if let Some(handler) = self.status_bar_handler.lock().as_ref() {
            handler(color);
        }
    }

    // ---- input ----

    pub fn on_touch_event(&self, event: TouchPoint) {
        trace!(instance_id = self.instance_id, ?event, "touch");
        if self
            .with_state(|state| {
                state.dirty = true;
                state.flush(false);
            })
            .is_some()
        {
            self.counters.touch.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns whether the key was consumed
    pub fn on_key_event(&self, event: KeyEvent) -> bool {
        let Some(root_ready) = self.with_state(|state| state.root_ready) else {
            return false;
        };
        self.counters.key.fetch_add(1, Ordering::Relaxed);

        match (event.code, event.action) {
            (KeyCode::Back, KeyAction::Up) => self.call_router_back_to_pop_page(),
            (KeyCode::Back, _) => root_ready,
            _ => false,
        }
    }

    pub fn on_mouse_event(&self, event: MouseEvent) {
        trace!(instance_id = self.instance_id, ?event, "mouse");
        if self
            .with_state(|state| {
                state.dirty = true;
                state.flush(false);
            })
            .is_some()
        {
            self.counters.mouse.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Rotary input is not consumed by the root
    pub fn on_rotation_event(&self, event: RotationEvent) -> bool {
        if self.is_destroyed() {
            return false;
        }
        trace!(instance_id = self.instance_id, value = event.value, "rotation");
        self.counters.rotation.fetch_add(1, Ordering::Relaxed);
        false
    }

    // ---- surface ----

    pub fn on_surface_changed(&self, width: i32, height: i32) {
        self.with_state(|state| {
            state.root_size.width = width;
            state.root_size.height = height;
            state.surface_alive = true;
            state.dirty = true;
            state.flush(true);
        });
    }

    pub fn on_surface_density_changed(&self, density: f64) {
        self.with_state(|state| {
            state.root_size.density = density;
            state.dirty = true;
            state.flush(false);
        });
    }

    pub fn on_system_bar_height_changed(&self, status_bar: f64, navigation_bar: f64) {
        self.with_state(|state| {
            state.status_bar_height = status_bar;
            state.navigation_bar_height = navigation_bar;
            state.dirty = true;
        });
    }

    pub fn on_surface_destroyed(&self) {
        self.with_state(|state| state.surface_alive = false);
        debug!(instance_id = self.instance_id, "surface destroyed");
    }

    pub fn on_idle(&self, deadline: i64) {
        if self.with_state(|state| state.flush(true)).is_some() {
            trace!(instance_id = self.instance_id, deadline, "idle");
            self.counters.idle.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn on_show(&self) {
        self.with_state(|state| {
            state.visible = true;
            state.flush(false);
        });
    }

    pub fn on_hide(&self) {
        self.with_state(|state| state.visible = false);
    }

    // ---- routing ----

    /// Forward a back press to the frontend's router
    pub fn call_router_back_to_pop_page(&self) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let frontend = self.frontend.lock().clone();
        match frontend {
            Some(frontend) => frontend.on_back_pressed(),
            None => false,
        }
    }

    /// Write a JSON state report to the log
    pub fn dump(&self, params: &[String]) -> bool {
        if self.is_destroyed() {
            return false;
        }
        if params.iter().any(|p| p == "-h") {
            info!(
                instance_id = self.instance_id,
                "dump usage: [-h] [-stats] (default: root state)"
            );
            return true;
        }

        let report = self.with_state(|state| {
            serde_json::json!({
                "instance_id": self.instance_id,
                "root_size": state.root_size,
                "root_ready": state.root_ready,
                "font_scale": state.font_scale,
                "right_to_left": state.right_to_left,
                "window_modal": state.window_modal,
                "theme": state.theme,
                "status_bar_height": state.status_bar_height,
                "navigation_bar_height": state.navigation_bar_height,
                "surface_alive": state.surface_alive,
                "visible": state.visible,
            })
        });
        let Some(mut report) = report else {
            return false;
        };

        if params.iter().any(|p| p == "-stats") {
            report["input"] = serde_json::json!(self.stats());
            report["executor"] = serde_json::json!(self.executor.stats());
        }

        info!(instance_id = self.instance_id, dump = %report, "pipeline dump");
        true
    }

    // ---- teardown ----

    /// Destroy the window and release platform resources. Idempotent.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.state.lock().window.destroy();
        self.frontend.lock().take();
        self.finish_handler.lock().take();
        self.status_bar_handler.lock().take();
        let released = self.res_register.release_all();
        debug!(
            instance_id = self.instance_id,
            released, "pipeline destroyed"
        );
    }

    // ---- inspection ----

    pub fn root_size(&self) -> RootSize {
        self.state.lock().root_size
    }

    pub fn font_scale(&self) -> f32 {
        self.state.lock().font_scale
    }

    pub fn window_modal(&self) -> WindowModal {
        self.state.lock().window_modal
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.state.lock().theme.color_scheme
    }

    pub fn is_right_to_left(&self) -> bool {
        self.state.lock().right_to_left
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().visible
    }

    pub fn frames_requested(&self) -> u64 {
        self.state.lock().window.frames_requested()
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            touch_events: self.counters.touch.load(Ordering::Relaxed),
            key_events: self.counters.key.load(Ordering::Relaxed),
            mouse_events: self.counters.mouse.load(Ordering::Relaxed),
            rotation_events: self.counters.rotation.load(Ordering::Relaxed),
            idle_callbacks: self.counters.idle.load(Ordering::Relaxed),
            frames_requested: self.frames_requested(),
        }
    }
}
