// src/engine/engine.rs
//! Process-wide runtime state and the instance-id addressed entry points
//!
//! Every entry point starts with a registry lookup. A miss is expected when
//! platform callbacks race teardown, so it degrades to a logged no-op,
//! `false` or an empty string, never an error.

use crate::container::{Container, ContainerRegistry, ContainerServices};
use crate::engine::watchdog::{Watchdog, WatchdogTicker};
use crate::executor::TaskType;
use crate::frontend::{EngineLoaders, FrontendType, MessageDispatcher, ScriptEngineLoader};
use crate::observability::EventReporter;
use crate::pipeline::{ColorScheme, WindowModal};
use crate::platform::{Ability, PlatformEventCallback, PlatformView};
use crate::utils::config::EngineConfig;
use crate::utils::errors::{EngineError, Result};
use crate::InstanceId;
use bytes::Bytes;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

static GLOBAL: OnceCell<Engine> = OnceCell::new();

pub struct Engine {
    config: EngineConfig,
    registry: ContainerRegistry,
    services: Arc<ContainerServices>,
    watchdog: Arc<Watchdog>,
    ticker: Mutex<Option<WatchdogTicker>>,
}

impl Engine {
    /// Engine with no engine loaders registered
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_loaders(config, EngineLoaders::new())
    }

    pub fn with_loaders(config: EngineConfig, loaders: EngineLoaders) -> Result<Self> {
        config.validate()?;

        let reporter = Arc::new(EventReporter::new());
        let services = Arc::new(ContainerServices::new(
            &config,
            Arc::new(loaders),
            Arc::clone(&reporter),
        ));
        let watchdog = Arc::new(Watchdog::new(reporter));

        let ticker = if config.runtime.watchdog_enabled {
            let interval = Duration::from_millis(config.runtime.watchdog_interval_ms);
            Some(WatchdogTicker::spawn(Arc::clone(&watchdog), interval)?)
        } else {
            None
        };

        Ok(Self {
            config,
            registry: ContainerRegistry::new(),
            services,
            watchdog,
            ticker: Mutex::new(ticker),
        })
    }

    /// Install the process-wide engine
    pub fn init_global(config: EngineConfig, loaders: EngineLoaders) -> Result<&'static Engine> {
        GLOBAL.get_or_try_init(|| Self::with_loaders(config, loaders))
    }

    pub fn global() -> Option<&'static Engine> {
        GLOBAL.get()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn reporter(&self) -> Arc<EventReporter> {
        Arc::clone(&self.services.reporter)
    }

    pub fn watchdog(&self) -> &Arc<Watchdog> {
        &self.watchdog
    }

    pub fn register_loader(&self, library: &'static str, loader: Arc<dyn ScriptEngineLoader>) {
        self.services.loaders.register(library, loader);
    }

    pub fn is_card_type(&self) -> bool {
        self.services.is_card_type()
    }

    pub fn get_container(&self, instance_id: InstanceId) -> Option<Arc<Container>> {
        self.registry.get(instance_id)
    }

    pub fn container_count(&self) -> usize {
        self.registry.len()
    }

    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.registry.ids()
    }

    fn with_container<R: Default>(
        &self,
        instance_id: InstanceId,
        op: &'static str,
        f: impl FnOnce(&Container) -> R,
    ) -> R {
        match self.registry.get(instance_id) {
            Some(container) => f(&container),
            None => {
                debug!(instance_id, op, "container not found");
                R::default()
            }
        }
    }

    // ---- creation and teardown ----

    /// Create, register and initialize a container. `false` if the id is
    /// taken or the container could not start its roles.
    pub fn create_container(
        &self,
        instance_id: InstanceId,
        frontend_type: FrontendType,
        is_script_variant_b: bool,
        ability: Arc<dyn Ability>,
        event_callback: Arc<dyn PlatformEventCallback>,
    ) -> bool {
        match self.try_create_container(
            instance_id,
            frontend_type,
            is_script_variant_b,
            ability,
            event_callback,
        ) {
            Ok(()) => true,
            Err(e) => {
                error!(instance_id, "create container failed: {}", e);
                false
            }
        }
    }

    fn try_create_container(
        &self,
        instance_id: InstanceId,
        frontend_type: FrontendType,
        is_script_variant_b: bool,
        ability: Arc<dyn Ability>,
        event_callback: Arc<dyn PlatformEventCallback>,
    ) -> Result<()> {
        if self.registry.contains(instance_id) {
            return Err(EngineError::DuplicateInstance(instance_id));
        }
        let container = Container::new(
            instance_id,
            frontend_type,
            is_script_variant_b,
            ability,
            event_callback,
            Arc::clone(&self.services),
        )?;
        if !self.registry.add(instance_id, Arc::clone(&container)) {
            container.executor().shutdown();
            return Err(EngineError::DuplicateInstance(instance_id));
        }
        container.initialize();
        info!(instance_id, frontend = %frontend_type, "container registered");
        Ok(())
    }

    /// Tear down a container: post the destroy tasks, wait for the UI and
    /// Scripting roles to drain, release the view, de-register, and stop
    /// the roles.
    pub fn destroy_container(&self, instance_id: InstanceId) -> bool {
        let Some(container) = self.registry.get(instance_id) else {
            warn!(instance_id, "destroy: container not found");
            return false;
        };
        if !container.destroy() {
            debug!(instance_id, "destroy already in progress");
            return false;
        }

        let executor = container.executor();
        executor.post_sync_task(TaskType::Ui, "wait-ui", || ());
        executor.post_sync_task(TaskType::Scripting, "wait-scripting", || ());

        container.destroy_view();
        self.watchdog.unregister(instance_id);
        self.registry.remove(instance_id);
        executor.shutdown();
        info!(instance_id, "container destroyed");
        true
    }

    /// Attach `view` to the container it names
    pub fn set_view(&self, view: Arc<dyn PlatformView>, density: f64, width: i32, height: i32) -> bool {
        let instance_id = view.instance_id();
        let Some(container) = self.registry.get(instance_id) else {
            warn!(instance_id, "set view: container not found");
            return false;
        };
        match container.attach_view(view, density, width, height) {
            Ok(()) => {
                self.watchdog.register(instance_id, &container.executor());
                true
            }
            Err(e) => {
                error!(instance_id, "attach view failed: {}", e);
                false
            }
        }
    }

    /// Destroy every live container
    pub fn clear(&self) {
        for instance_id in self.registry.ids() {
            self.destroy_container(instance_id);
        }
        if let Some(ticker) = self.ticker.lock().take() {
            ticker.stop();
        }
    }

    // ---- lifecycle ----

    pub fn on_show(&self, instance_id: InstanceId) {
        self.with_container(instance_id, "on_show", |c| c.on_show())
    }

    pub fn on_hide(&self, instance_id: InstanceId) {
        self.with_container(instance_id, "on_hide", |c| c.on_hide())
    }

    pub fn on_active(&self, instance_id: InstanceId) {
        self.with_container(instance_id, "on_active", |c| c.on_active())
    }

    pub fn on_inactive(&self, instance_id: InstanceId) {
        self.with_container(instance_id, "on_inactive", |c| c.on_inactive())
    }

    pub fn on_back_pressed(&self, instance_id: InstanceId) -> bool {
        self.with_container(instance_id, "on_back_pressed", |c| c.on_back_pressed())
    }

    pub fn trigger_garbage_collection(&self, instance_id: InstanceId) {
        self.with_container(instance_id, "trigger_garbage_collection", |c| {
            c.trigger_garbage_collection()
        })
    }

    // ---- pages ----

    pub fn run_page(&self, instance_id: InstanceId, page_id: i32, content: &str, params: &str) -> bool {
        self.with_container(instance_id, "run_page", |c| {
            c.run_page(page_id, content, params)
        })
    }

    pub fn push_page(&self, instance_id: InstanceId, page_id: i32, content: &str, params: &str) -> bool {
        self.with_container(instance_id, "push_page", |c| {
            c.push_page(page_id, content, params)
        })
    }

    pub fn update_page(&self, instance_id: InstanceId, page_id: i32, content: &str) -> bool {
        self.with_container(instance_id, "update_page", |c| c.update_page(page_id, content))
    }

    // ---- continuation and data ----

    pub fn on_start_continuation(&self, instance_id: InstanceId) -> bool {
        self.with_container(instance_id, "on_start_continuation", |c| {
            c.on_start_continuation()
        })
    }

    pub fn on_save_data(&self, instance_id: InstanceId) -> String {
        self.with_container(instance_id, "on_save_data", |c| c.on_save_data())
    }

    pub fn on_restore_data(&self, instance_id: InstanceId, data: &str) -> bool {
        self.with_container(instance_id, "on_restore_data", |c| c.on_restore_data(data))
    }

    pub fn on_complete_continuation(&self, instance_id: InstanceId, result: i32) {
        self.with_container(instance_id, "on_complete_continuation", |c| {
            c.on_complete_continuation(result)
        })
    }

    pub fn on_remote_terminated(&self, instance_id: InstanceId) {
        self.with_container(instance_id, "on_remote_terminated", |c| {
            c.on_remote_terminated()
        })
    }

    pub fn on_configuration_updated(&self, instance_id: InstanceId, configuration: &str) {
        self.with_container(instance_id, "on_configuration_updated", |c| {
            c.on_configuration_updated(configuration)
        })
    }

    pub fn on_new_request(&self, instance_id: InstanceId, data: &str) {
        self.with_container(instance_id, "on_new_request", |c| c.on_new_request(data))
    }

    // ---- presentation and resources ----

    pub fn set_font_scale(&self, instance_id: InstanceId, scale: f32) {
        self.with_container(instance_id, "set_font_scale", |c| c.set_font_scale(scale))
    }

    pub fn set_window_style(
        &self,
        instance_id: InstanceId,
        modal: WindowModal,
        color_scheme: ColorScheme,
    ) {
        self.with_container(instance_id, "set_window_style", |c| {
            c.set_window_style(modal, color_scheme)
        })
    }

    pub fn add_asset_path(&self, instance_id: InstanceId, package_path: &Path, paths: &[String]) -> bool {
        self.with_container(instance_id, "add_asset_path", |c| {
            match c.add_asset_path(package_path, paths) {
                Ok(()) => true,
                Err(e) => {
                    warn!(instance_id, "add asset path failed: {}", e);
                    false
                }
            }
        })
    }

    pub fn dump(&self, instance_id: InstanceId, params: &[String]) -> bool {
        self.with_container(instance_id, "dump", |c| c.dump(params))
    }

    // ---- messaging ----

    pub fn dispatch(
        &self,
        instance_id: InstanceId,
        group: &str,
        data: Bytes,
        call_id: i32,
        reply_expected: bool,
    ) {
        self.with_container(instance_id, "dispatch", |c| {
            c.dispatch(group, data, call_id, reply_expected)
        })
    }

    pub fn dispatch_plugin_error(
        &self,
        instance_id: InstanceId,
        call_id: i32,
        error_code: i32,
        message: &str,
    ) {
        self.with_container(instance_id, "dispatch_plugin_error", |c| {
            c.dispatch_plugin_error(call_id, error_code, message.to_string())
        })
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.get_mut().take() {
            ticker.stop();
        }
    }
}
