// src/container/container.rs
//! Aggregate root of one running UI instance
//!
//! ```text
//!                         ┌──────────────────────────────┐
//!                         │          Container           │
//!                         │  state ─ frontend ─ pipeline │
//!                         │  view ─ assets ─ executor    │
//!                         └──────┬──────────────┬────────┘
//!             post (Scripting)   │              │   post (UI)
//!                    ┌───────────▼───┐     ┌────▼──────────┐
//!                    │   Frontend    │◀weak┤   Pipeline    │
//!                    └───────────────┘     └───────────────┘
//! ```
//!
//! Frontend and pipeline handles are only swapped on the caller's thread;
//! work on the role threads runs against handles captured when the task was
//! created. Cross-role closures hold `Weak` handles and skip their work if
//! the target is gone.

use crate::assets::{AssetManager, FileAssetProvider};
use crate::container::services::ContainerServices;
use crate::container::state::ContainerState;
use crate::executor::{thread_context, TaskExecutor, TaskType};
use crate::frontend::{
    DebugFlags, Frontend, FrontendKind, FrontendState, FrontendType, MessageDispatcher,
    ScriptVariant,
};
use crate::observability::AppStartExceptionType;
use crate::pipeline::{ColorScheme, Pipeline, WindowModal, Window};
use crate::platform::{Ability, PlatformEventCallback, PlatformView, ViewCallbacks};
use crate::utils::errors::{EngineError, Result};
use crate::utils::memory::purge_malloc_cache;
use crate::InstanceId;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, trace, warn};

/// Name the ability is exposed under to scripts
const ABILITY_OBJECT_NAME: &str = "ability";

/// Roles that get a memory trim on garbage collection
const TRIM_ROLES: [TaskType; 3] = [TaskType::Ui, TaskType::Gpu, TaskType::Io];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowStyle {
    pub modal: WindowModal,
    pub color_scheme: ColorScheme,
}

pub struct Container {
    instance_id: InstanceId,
    frontend_type: FrontendType,
    script_variant: ScriptVariant,
    ability: Arc<dyn Ability>,
    event_callback: Arc<dyn PlatformEventCallback>,
    services: Arc<ContainerServices>,
    executor: Arc<TaskExecutor>,
    state: Mutex<ContainerState>,
    frontend: Mutex<Option<Arc<Frontend>>>,
    pipeline: Mutex<Option<Arc<Pipeline>>>,
    view: Mutex<Option<Arc<dyn PlatformView>>>,
    asset_manager: Mutex<Option<Arc<AssetManager>>>,
    library_path: Mutex<Option<PathBuf>>,
    window_style: Mutex<WindowStyle>,
    /// Serializes view attach so only one pipeline is ever built
    attach: Mutex<()>,
    created_at: DateTime<Utc>,
    weak_self: Weak<Container>,
}

impl Container {
    /// Build the container and its Platform, Background and (unless
    /// declarative) Scripting roles. No frontend yet.
    pub fn new(
        instance_id: InstanceId,
        frontend_type: FrontendType,
        is_script_variant_b: bool,
        ability: Arc<dyn Ability>,
        event_callback: Arc<dyn PlatformEventCallback>,
        services: Arc<ContainerServices>,
    ) -> Result<Arc<Self>> {
        let executor = Arc::new(TaskExecutor::new(format!(
            "{}-{}",
            services.thread_name_prefix, instance_id
        ))?);

        if !frontend_type.is_declarative() {
            executor.init_scripting_thread()?;
            executor.post_task(TaskType::Scripting, "thread-init", move || {
                thread_context::init_for_thread(instance_id)
            });
        }

        let container = Arc::new_cyclic(|weak_self| Self {
            instance_id,
            frontend_type,
            script_variant: ScriptVariant::from_flag(is_script_variant_b),
            ability,
            event_callback,
            services,
            executor,
            state: Mutex::new(ContainerState::Created),
            frontend: Mutex::new(None),
            pipeline: Mutex::new(None),
            view: Mutex::new(None),
            asset_manager: Mutex::new(None),
            library_path: Mutex::new(None),
            window_style: Mutex::new(WindowStyle::default()),
            attach: Mutex::new(()),
            created_at: Utc::now(),
            weak_self: weak_self.clone(),
        });

        debug!(
            instance_id,
            frontend = %frontend_type,
            "container created"
        );
        Ok(container)
    }

    // ---- accessors ----

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub fn frontend_type(&self) -> FrontendType {
        self.frontend_type
    }

    pub fn script_variant(&self) -> ScriptVariant {
        self.script_variant
    }

    pub fn state(&self) -> ContainerState {
        *self.state.lock()
    }

    pub fn executor(&self) -> Arc<TaskExecutor> {
        Arc::clone(&self.executor)
    }

    pub fn frontend(&self) -> Option<Arc<Frontend>> {
        self.frontend.lock().clone()
    }

    pub fn pipeline(&self) -> Option<Arc<Pipeline>> {
        self.pipeline.lock().clone()
    }

    pub fn asset_manager(&self) -> Option<Arc<AssetManager>> {
        self.asset_manager.lock().clone()
    }

    /// Native library directory of the last added package
    pub fn library_path(&self) -> Option<PathBuf> {
        self.library_path.lock().clone()
    }

    pub fn window_style(&self) -> WindowStyle {
        *self.window_style.lock()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Move to `next`; returns `false` for no-op or illegal transitions
    fn transition(&self, next: ContainerState) -> bool {
        let mut state = self.state.lock();
        if *state == next {
            return false;
        }
        if !state.can_transition_to(next) {
            debug!(
                instance_id = self.instance_id,
                from = state.as_str(),
                to = next.as_str(),
                "transition ignored"
            );
            return false;
        }
        trace!(
            instance_id = self.instance_id,
            from = state.as_str(),
            to = next.as_str(),
            "transition"
        );
        *state = next;
        true
    }

    // ---- initialization ----

    /// Build the frontend. Declarative frontends wait for the view, since
    /// their engine runs on the UI role.
    pub fn initialize(&self) {
        if self.frontend_type.is_declarative() {
            debug!(instance_id = self.instance_id, "frontend deferred until view attach");
            return;
        }
        if self.initialize_frontend() {
            self.transition(ContainerState::Initialized);
        }
    }

    fn build_frontend(&self) -> std::result::Result<Arc<Frontend>, AppStartExceptionType> {
        let kind = match self.frontend_type {
            FrontendType::JsPlugin => {
                error!(
                    instance_id = self.instance_id,
                    "{}",
                    EngineError::UnsupportedFrontend(self.frontend_type)
                );
                return Err(AppStartExceptionType::FrontendTypeErr);
            }
            FrontendType::JsCard => {
                self.services.mark_card_type();
                FrontendKind::Card
            }
            FrontendType::Js | FrontendType::DeclarativeJs => {
                let declarative = self.frontend_type.is_declarative();
                let engine = self
                    .services
                    .loaders
                    .create_engine(self.script_variant, declarative, self.instance_id)
                    .map_err(|e| {
                        error!(instance_id = self.instance_id, "{}", e);
                        AppStartExceptionType::EngineLoadErr
                    })?;
                if declarative {
                    FrontendKind::Declarative(engine)
                } else {
                    FrontendKind::Script(engine)
                }
            }
        };
        Ok(Frontend::new(self.instance_id, kind))
    }

    /// Construct and initialize the frontend. Failures are reported and
    /// leave the container without one.
    fn initialize_frontend(&self) -> bool {
        let frontend = match self.build_frontend() {
            Ok(frontend) => frontend,
            Err(kind) => {
                self.services
                    .reporter
                    .send_app_start_exception(self.instance_id, kind);
                return false;
            }
        };

        frontend.set_debug_flags(DebugFlags {
            need_debug_breakpoint: self.services.app.need_debug_breakpoint,
            debug_version: self.services.app.debug_version,
        });
        if self
            .ability
            .ability_info()
            .map(|info| info.is_launcher_ability)
            .unwrap_or(false)
        {
            frontend.disallow_pop_last_page();
        }
        if let Some(assets) = self.asset_manager() {
            frontend.set_asset_manager(assets);
        }
        let dispatcher: Weak<dyn MessageDispatcher> = self.weak_self.clone();
        frontend.set_js_message_dispatcher(dispatcher);

        frontend.initialize(self.frontend_type, Arc::clone(&self.executor));
        frontend.add_extra_native_object(ABILITY_OBJECT_NAME, Arc::clone(&self.ability));

        *self.frontend.lock() = Some(frontend);
        true
    }

    /// Register a package's assets and its native library directory
    pub fn add_asset_path(&self, package_path: &Path, paths: &[String]) -> Result<()> {
        let provider = FileAssetProvider::initialize(package_path, paths)?;

        let assets = {
            let mut slot = self.asset_manager.lock();
            match slot.as_ref() {
                Some(assets) => Arc::clone(assets),
                None => {
                    let assets = Arc::new(AssetManager::new());
                    *slot = Some(Arc::clone(&assets));
                    if !self.frontend_type.is_declarative() {
                        if let Some(frontend) = self.frontend() {
                            frontend.set_asset_manager(Arc::clone(&assets));
                        }
                    }
                    assets
                }
            }
        };

        assets.push_back(Arc::new(provider));
        assets.set_package_path(package_path);
        *self.library_path.lock() = Some(native_library_dir(package_path));
        debug!(
            instance_id = self.instance_id,
            package = %package_path.display(),
            "asset path added"
        );
        Ok(())
    }

    // ---- view attach ----

    /// Bind a platform view: start the view roles, build the pipeline and
    /// route the view's events to it. A container takes one view; a failed
    /// attach (no window) may be retried.
    pub fn attach_view(
        &self,
        view: Arc<dyn PlatformView>,
        density: f64,
        width: i32,
        height: i32,
    ) -> Result<()> {
        let _attach = self.attach.lock();
        let state = self.state();
        if state.is_torn_down() {
            return Err(EngineError::InstanceNotFound(self.instance_id));
        }
        if state.has_view() || self.pipeline.lock().is_some() {
            warn!(instance_id = self.instance_id, state = state.as_str(), "view already attached");
            return Err(EngineError::ViewAlreadyAttached(self.instance_id));
        }

        self.executor.init_view_threads()?;
        let instance_id = self.instance_id;
        self.executor.post_task(TaskType::Ui, "thread-init", move || {
            thread_context::init_for_thread(instance_id)
        });

        if self.frontend_type.is_declarative() && self.frontend().is_none() {
            self.initialize_frontend();
        }

        let Some(platform_window) = view.create_platform_window() else {
            error!(instance_id, "platform window creation failed, attach aborted");
            return Err(EngineError::WindowCreateFailed(instance_id));
        };
        *self.view.lock() = Some(Arc::clone(&view));

        if !self.frontend_type.is_card() {
            view.set_create_time(self.created_at);
        }

        let frontend = self.frontend();
        let pipeline = Arc::new(Pipeline::new(
            Window::new(platform_window),
            Arc::clone(&self.executor),
            self.asset_manager(),
            view.resource_register(),
            frontend.clone(),
            instance_id,
        ));
        if let Some(frontend) = &frontend {
            frontend.attach_pipeline(Arc::downgrade(&pipeline));
        }
        *self.pipeline.lock() = Some(Arc::clone(&pipeline));

        self.initialize_callbacks(view.as_ref(), &pipeline);
        self.install_host_handlers(&pipeline);

        let style = self.window_style();
        let right_to_left = self.services.app.right_to_left;
        let setup = Arc::clone(&pipeline);
        self.executor.post_task(TaskType::Ui, "pipeline-setup", move || {
            setup.set_root_size(density, width, height);
            setup.set_is_right_to_left(right_to_left);
            setup.set_window_modal(style.modal);
            setup.apply_theme(style.color_scheme);
            setup.setup_root_element();
        });

        view.launch();
        self.transition(ContainerState::ViewAttached);
        info!(instance_id, width, height, density, "view attached");
        Ok(())
    }

    /// Install the view callbacks. Each re-posts onto the UI role against a
    /// weak pipeline handle; key and rotation wait for the consumed flag.
    fn initialize_callbacks(&self, view: &dyn PlatformView, pipeline: &Arc<Pipeline>) {
        let poster = PipelinePoster {
            executor: Arc::clone(&self.executor),
            pipeline: Arc::downgrade(pipeline),
        };

        let touch = poster.clone();
        let key = poster.clone();
        let mouse = poster.clone();
        let rotation = poster.clone();
        let view_change = poster.clone();
        let density_change = poster.clone();
        let system_bar = poster.clone();
        let surface_destroy = poster.clone();
        let idle = poster;

        view.register_callbacks(ViewCallbacks {
            touch: Box::new(move |event| {
                touch.post("touch-event", move |p| p.on_touch_event(event))
            }),
            key: Box::new(move |event| key.sync("key-event", move |p| p.on_key_event(event))),
            mouse: Box::new(move |event| {
                mouse.post("mouse-event", move |p| p.on_mouse_event(event))
            }),
            rotation: Box::new(move |event| {
                rotation.sync("rotation-event", move |p| p.on_rotation_event(event))
            }),
            view_change: Box::new(move |width, height| {
                view_change.post("view-change", move |p| p.on_surface_changed(width, height))
            }),
            density_change: Box::new(move |density| {
                density_change.post("density-change", move |p| {
                    p.on_surface_density_changed(density)
                })
            }),
            system_bar_height_change: Box::new(move |status_bar, navigation_bar| {
                system_bar.post("system-bar-change", move |p| {
                    p.on_system_bar_height_changed(status_bar, navigation_bar)
                })
            }),
            surface_destroy: Box::new(move || {
                surface_destroy.post("surface-destroy", |p| p.on_surface_destroyed())
            }),
            idle: Box::new(move |deadline| idle.post("idle", move |p| p.on_idle(deadline))),
        });
    }

    /// Finish and status-bar requests go back to the host on the Platform role
    fn install_host_handlers(&self, pipeline: &Pipeline) {
        let weak = self.weak_self.clone();
        pipeline.set_finish_event_handler(Box::new(move || {
            if let Some(container) = weak.upgrade() {
                container.on_finish();
            }
        }));

        let weak = self.weak_self.clone();
        pipeline.set_status_bar_event_handler(Box::new(move |color| {
            if let Some(container) = weak.upgrade() {
                container.on_status_bar_bg_color_changed(color);
            }
        }));
    }

    // ---- lifecycle ----

    pub fn on_show(&self) {
        if let Some(frontend) = self.frontend() {
            frontend.on_show();
        }
        self.post_to_pipeline("pipeline-show", |p| p.on_show());
        self.transition(ContainerState::Foreground);
    }

    /// Hide the instance, then collect once on the Scripting role and trim
    /// the view roles
    pub fn on_hide(&self) {
        if let Some(frontend) = self.frontend() {
            frontend.on_hide();
        }
        self.post_to_pipeline("pipeline-hide", |p| p.on_hide());
        self.transition(ContainerState::Background);
        self.trigger_garbage_collection();
    }

    pub fn on_active(&self) {
        if let Some(frontend) = self.frontend() {
            frontend.on_active();
        }
    }

    pub fn on_inactive(&self) {
        if let Some(frontend) = self.frontend() {
            frontend.on_inactive();
        }
    }

    /// Trim allocator caches on the view roles and ask the script engine
    /// to collect
    pub fn trigger_garbage_collection(&self) {
        for role in TRIM_ROLES {
            self.executor.post_task(role, "memory-trim", purge_malloc_cache);
        }
        if let Some(frontend) = self.frontend() {
            let weak = Arc::downgrade(&frontend);
            self.executor
                .post_task(TaskType::Scripting, "frontend-gc", move || {
                    if let Some(frontend) = weak.upgrade() {
                        frontend.trigger_garbage_collection();
                    }
                });
        }
    }

    // ---- pages ----

    pub fn run_page(&self, page_id: i32, content: &str, params: &str) -> bool {
        self.frontend()
            .map(|frontend| frontend.run_page(page_id, content, params))
            .unwrap_or(false)
    }

    pub fn push_page(&self, page_id: i32, content: &str, params: &str) -> bool {
        self.frontend()
            .map(|frontend| frontend.push_page(page_id, content, params))
            .unwrap_or(false)
    }

    pub fn update_page(&self, page_id: i32, content: &str) -> bool {
        self.frontend()
            .map(|frontend| frontend.update_page(page_id, content))
            .unwrap_or(false)
    }

    /// Route a back press through the pipeline on the UI role
    pub fn on_back_pressed(&self) -> bool {
        if let Some(pipeline) = self.pipeline() {
            return self
                .executor
                .post_sync_task(TaskType::Ui, "back-press", move || {
                    pipeline.call_router_back_to_pop_page()
                })
                .unwrap_or(false);
        }
        self.frontend()
            .map(|frontend| frontend.on_back_pressed())
            .unwrap_or(false)
    }

    // ---- continuation and data ----

    pub fn on_start_continuation(&self) -> bool {
        self.frontend()
            .map(|frontend| frontend.on_start_continuation())
            .unwrap_or(false)
    }

    pub fn on_save_data(&self) -> String {
        self.frontend()
            .and_then(|frontend| frontend.on_save_data())
            .unwrap_or_default()
    }

    pub fn on_restore_data(&self, data: &str) -> bool {
        self.frontend()
            .map(|frontend| frontend.on_restore_data(data))
            .unwrap_or(false)
    }

    pub fn on_complete_continuation(&self, result: i32) {
        if let Some(frontend) = self.frontend() {
            frontend.on_complete_continuation(result);
        }
    }

    pub fn on_remote_terminated(&self) {
        if let Some(frontend) = self.frontend() {
            frontend.on_remote_terminated();
        }
    }

    pub fn on_configuration_updated(&self, configuration: &str) {
        if let Some(frontend) = self.frontend() {
            frontend.on_configuration_updated(configuration);
        }
    }

    pub fn on_new_request(&self, data: &str) {
        if let Some(frontend) = self.frontend() {
            frontend.on_new_request(data);
        }
    }

    // ---- presentation ----

    pub fn set_font_scale(&self, scale: f32) {
        self.post_to_pipeline("font-scale", move |p| p.set_font_scale(scale));
    }

    pub fn set_window_style(&self, modal: WindowModal, color_scheme: ColorScheme) {
        *self.window_style.lock() = WindowStyle {
            modal,
            color_scheme,
        };
        self.post_to_pipeline("window-style", move |p| {
            p.set_window_modal(modal);
            p.apply_theme(color_scheme);
        });
    }

    /// Let the view claim the dump, else dump the pipeline state
    pub fn dump(&self, params: &[String]) -> bool {
        let view = self.view.lock().clone();
        if view.map(|view| view.dump(params)).unwrap_or(false) {
            return true;
        }
        let Some(pipeline) = self.pipeline() else {
            return false;
        };
        let params = params.to_vec();
        self.executor
            .post_sync_task(TaskType::Ui, "dump", move || pipeline.dump(&params))
            .unwrap_or(false)
    }

    // ---- host notifications ----

    pub fn on_finish(&self) {
        let callback = Arc::clone(&self.event_callback);
        self.executor
            .post_task(TaskType::Platform, "platform-finish", move || callback.on_finish());
    }

    pub fn on_status_bar_bg_color_changed(&self, color: u32) {
        let callback = Arc::clone(&self.event_callback);
        self.executor
            .post_task(TaskType::Platform, "platform-status-bar", move || {
                callback.on_status_bar_bg_color_changed(color)
            });
    }

    // ---- teardown ----

    /// Hand the pipeline to the UI role and the frontend to the Scripting
    /// role for destruction. Both are swapped out before posting, so a
    /// second call finds nothing to destroy. Returns `false` if teardown
    /// had already started.
    pub fn destroy(&self) -> bool {
        if !self.transition(ContainerState::Destroying) {
            return false;
        }

        if let Some(pipeline) = self.pipeline.lock().take() {
            self.executor
                .post_task(TaskType::Ui, "pipeline-destroy", move || pipeline.destroy());
        }

        if let Some(frontend) = self.frontend.lock().take() {
            self.executor
                .post_task(TaskType::Scripting, "frontend-destroy", move || {
                    frontend.update_state(FrontendState::OnDestroy);
                    frontend.destroy();
                });
        }

        info!(instance_id = self.instance_id, "container destroying");
        true
    }

    /// Release the platform view; the last step before de-registration
    pub fn destroy_view(&self) {
        if let Some(view) = self.view.lock().take() {
            view.release();
        }
        self.transition(ContainerState::Destroyed);
    }

    fn post_to_pipeline<F>(&self, label: &'static str, f: F) -> bool
    where
        F: FnOnce(&Pipeline) + Send + 'static,
    {
        match self.pipeline() {
            Some(pipeline) => self
                .executor
                .post_task(TaskType::Ui, label, move || f(&pipeline)),
            None => false,
        }
    }
}

impl MessageDispatcher for Container {
    fn dispatch(&self, group: &str, data: Bytes, call_id: i32, reply_expected: bool) {
        let callback = Arc::clone(&self.event_callback);
        let group = group.to_string();
        self.executor
            .post_task(TaskType::Platform, "plugin-message", move || {
                callback.on_plugin_message(&group, data, call_id, reply_expected)
            });
    }

    fn dispatch_plugin_error(&self, call_id: i32, error_code: i32, message: String) {
        let Some(frontend) = self.frontend() else {
            warn!(instance_id = self.instance_id, call_id, "plugin error without frontend");
            return;
        };
        let weak = Arc::downgrade(&frontend);
        self.executor
            .post_task(TaskType::Background, "plugin-error", move || {
                if let Some(frontend) = weak.upgrade() {
                    frontend.transfer_plugin_error(call_id, error_code, message);
                }
            });
    }
}

/// Re-posts view events onto the UI role against a weak pipeline
#[derive(Clone)]
struct PipelinePoster {
    executor: Arc<TaskExecutor>,
    pipeline: Weak<Pipeline>,
}

impl PipelinePoster {
    fn post<F>(&self, label: &'static str, f: F)
    where
        F: FnOnce(&Pipeline) + Send + 'static,
    {
        let pipeline = self.pipeline.clone();
        self.executor.post_task(TaskType::Ui, label, move || {
            if let Some(pipeline) = pipeline.upgrade() {
                f(&pipeline);
            }
        });
    }

    fn sync<F>(&self, label: &'static str, f: F) -> bool
    where
        F: FnOnce(&Pipeline) -> bool + Send + 'static,
    {
        let pipeline = self.pipeline.clone();
        self.executor
            .post_sync_task(TaskType::Ui, label, move || {
                pipeline.upgrade().map(|p| f(&p)).unwrap_or(false)
            })
            .unwrap_or(false)
    }
}

/// `<package>/lib/<arch>`
fn native_library_dir(package_path: &Path) -> PathBuf {
    let arch = match std::env::consts::ARCH {
        "aarch64" => "arm64",
        other => other,
    };
    package_path.join("lib").join(arch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::EngineLoaders;
    use crate::observability::EventReporter;
    use crate::pipeline::{KeyAction, KeyCode, KeyEvent, TouchPoint, TouchType};
    use crate::platform::{AbilityInfo, HeadlessView, NoopEventCallback, StaticAbility};
    use crate::utils::config::EngineConfig;

    fn services() -> Arc<ContainerServices> {
        Arc::new(ContainerServices::new(
            &EngineConfig::default(),
            Arc::new(EngineLoaders::with_tracing_engines()),
            Arc::new(EventReporter::new()),
        ))
    }

    fn container(id: InstanceId, frontend_type: FrontendType) -> Arc<Container> {
        let container = Container::new(
            id,
            frontend_type,
            false,
            StaticAbility::anonymous(),
            Arc::new(NoopEventCallback),
            services(),
        )
        .unwrap();
        container.initialize();
        container
    }

    fn drain(container: &Container) {
        let executor = container.executor();
        executor.post_sync_task(TaskType::Ui, "barrier", || ());
        executor.post_sync_task(TaskType::Scripting, "barrier", || ());
    }

    #[test]
    fn test_initialize_builds_frontend() {
        let container = container(1, FrontendType::Js);
        assert_eq!(container.state(), ContainerState::Initialized);
        assert!(container.frontend().is_some());
        assert!(container.pipeline().is_none());
        container.executor().shutdown();
    }

    #[test]
    fn test_unsupported_frontend_leaves_container_empty() {
        let services = services();
        let container = Container::new(
            1,
            FrontendType::JsPlugin,
            false,
            StaticAbility::anonymous(),
            Arc::new(NoopEventCallback),
            services.clone(),
        )
        .unwrap();
        container.initialize();

        assert!(container.frontend().is_none());
        assert_eq!(container.state(), ContainerState::Created);
        assert_eq!(
            services
                .reporter
                .app_start_exceptions(AppStartExceptionType::FrontendTypeErr),
            1
        );
        container.on_show();
        assert!(!container.run_page(1, "index", ""));
        assert_eq!(container.on_save_data(), "");
        container.executor().shutdown();
    }

    #[test]
    fn test_missing_loader_is_reported() {
        let services = Arc::new(ContainerServices::new(
            &EngineConfig::default(),
            Arc::new(EngineLoaders::new()),
            Arc::new(EventReporter::new()),
        ));
        let container = Container::new(
            2,
            FrontendType::Js,
            true,
            StaticAbility::anonymous(),
            Arc::new(NoopEventCallback),
            services.clone(),
        )
        .unwrap();
        container.initialize();

        assert!(container.frontend().is_none());
        assert_eq!(
            services
                .reporter
                .app_start_exceptions(AppStartExceptionType::EngineLoadErr),
            1
        );
        container.executor().shutdown();
    }

    #[test]
    fn test_attach_view_builds_pipeline_and_routes_input() {
        let container = container(3, FrontendType::Js);
        let view = HeadlessView::new(3);
        container.attach_view(view.clone(), 2.0, 720, 1280).unwrap();

        assert_eq!(container.state(), ContainerState::ViewAttached);
        assert!(view.is_launched());
        assert!(view.created_at().is_some());
        let pipeline = container.pipeline().unwrap();

        view.dispatch_touch(TouchPoint::new(0, 1.0, 2.0, TouchType::Down));
        assert!(view.dispatch_key(KeyEvent::new(KeyCode::Back, KeyAction::Down)));
        drain(&container);

        assert_eq!(pipeline.root_size().width, 720);
        assert_eq!(pipeline.stats().touch_events, 1);
        assert!(view.window().frames() >= 1);
        container.executor().shutdown();
    }

    #[test]
    fn test_second_attach_is_rejected() {
        let container = container(9, FrontendType::Js);
        let first_view = HeadlessView::new(9);
        container.attach_view(first_view.clone(), 1.0, 100, 100).unwrap();
        let first = container.pipeline().unwrap();

        let second_view = HeadlessView::new(9);
        let result = container.attach_view(second_view.clone(), 1.0, 200, 200);
        assert!(matches!(result, Err(EngineError::ViewAlreadyAttached(9))));
        assert!(Arc::ptr_eq(&first, &container.pipeline().unwrap()));
        assert!(!second_view.has_callbacks());
        assert!(!second_view.is_launched());

        container.destroy();
        drain(&container);
        assert!(first.is_destroyed());
        assert!(first_view.window().is_destroyed());
        container.executor().shutdown();
    }

    #[test]
    fn test_attach_retry_after_window_failure() {
        let container = container(10, FrontendType::Js);
        assert!(container
            .attach_view(HeadlessView::without_surface(10), 1.0, 10, 10)
            .is_err());
        container
            .attach_view(HeadlessView::new(10), 1.0, 10, 10)
            .unwrap();
        assert_eq!(container.state(), ContainerState::ViewAttached);
        assert!(container.pipeline().is_some());
        container.executor().shutdown();
    }

    #[test]
    fn test_window_failure_aborts_attach() {
        let container = container(4, FrontendType::Js);
        let result = container.attach_view(HeadlessView::without_surface(4), 1.0, 10, 10);

        assert!(matches!(result, Err(EngineError::WindowCreateFailed(4))));
        assert!(container.pipeline().is_none());
        assert_eq!(container.state(), ContainerState::Initialized);
        container.executor().shutdown();
    }

    #[test]
    fn test_declarative_frontend_waits_for_view() {
        let container = container(5, FrontendType::DeclarativeJs);
        assert!(container.frontend().is_none());
        assert!(!container.executor().has_role(TaskType::Scripting));

        container
            .attach_view(HeadlessView::new(5), 1.0, 100, 100)
            .unwrap();
        assert!(container.frontend().is_some());
        assert_eq!(
            container.executor().resolve(TaskType::Scripting),
            Some(TaskType::Ui)
        );
        container.executor().shutdown();
    }

    #[test]
    fn test_launcher_keeps_last_page() {
        let ability = StaticAbility::new(AbilityInfo {
            bundle_name: "com.example.launcher".into(),
            ability_name: "Home".into(),
            is_launcher_ability: true,
        });
        let container = Container::new(
            6,
            FrontendType::JsCard,
            false,
            ability,
            Arc::new(NoopEventCallback),
            services(),
        )
        .unwrap();
        container.initialize();
        container.run_page(1, "home", "");

        assert!(!container.on_back_pressed());
        assert_eq!(container.frontend().unwrap().page_depth(), 1);
        container.executor().shutdown();
    }

    #[test]
    fn test_destroy_twice_posts_once() {
        let container = container(7, FrontendType::Js);
        container
            .attach_view(HeadlessView::new(7), 1.0, 100, 100)
            .unwrap();

        assert!(container.destroy());
        assert!(!container.destroy());
        assert!(container.frontend().is_none());
        assert!(container.pipeline().is_none());

        drain(&container);
        container.destroy_view();
        assert_eq!(container.state(), ContainerState::Destroyed);
        container.executor().shutdown();
    }

    #[test]
    fn test_add_asset_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("manifest.json"), b"{}").unwrap();
        let container = container(8, FrontendType::Js);

        container.add_asset_path(dir.path(), &[]).unwrap();
        let assets = container.asset_manager().unwrap();
        assert!(assets.get_asset("manifest.json").is_some());
        assert!(container
            .frontend()
            .unwrap()
            .asset_manager()
            .map(|a| Arc::ptr_eq(&a, &assets))
            .unwrap_or(false));
        assert!(container.library_path().unwrap().starts_with(dir.path().join("lib")));
        container.executor().shutdown();
    }
}
