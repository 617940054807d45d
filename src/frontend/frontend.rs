// src/frontend/frontend.rs
//! Uniform lifecycle and event contract over the frontend variants
//!
//! Engine work is posted to the Scripting role, which the executor reroutes
//! to the UI role for declarative frontends. Calls that need an answer
//! (back press, continuation, save/restore) use sync tasks. Every entry
//! point is a no-op once the frontend is destroyed.

use crate::assets::AssetManager;
use crate::executor::{TaskExecutor, TaskType};
use crate::frontend::dispatcher::MessageDispatcher;
use crate::frontend::router::{PageEntry, PageRouter, PopOutcome};
use crate::frontend::script_engine::{DebugFlags, ScriptEngine};
use crate::frontend::state::{FrontendState, FrontendType};
use crate::pipeline::Pipeline;
use crate::platform::Ability;
use crate::InstanceId;
use bytes::Bytes;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

/// Closed set of hosted frontend variants
pub enum FrontendKind {
    /// Script engine on the Scripting role
    Script(Arc<dyn ScriptEngine>),
    /// Static card without an engine
    Card,
    /// Declarative engine on the UI role
    Declarative(Arc<dyn ScriptEngine>),
}

impl FrontendKind {
    fn frontend_type(&self) -> FrontendType {
        match self {
            FrontendKind::Script(_) => FrontendType::Js,
            FrontendKind::Card => FrontendType::JsCard,
            FrontendKind::Declarative(_) => FrontendType::DeclarativeJs,
        }
    }
}

pub struct Frontend {
    instance_id: InstanceId,
    kind: FrontendKind,
    executor: OnceCell<Arc<TaskExecutor>>,
    state: Mutex<FrontendState>,
    router: Mutex<PageRouter>,
    pipeline: Mutex<Weak<Pipeline>>,
    dispatcher: Mutex<Option<Weak<dyn MessageDispatcher>>>,
    asset_manager: Mutex<Option<Arc<AssetManager>>>,
    debug: Mutex<DebugFlags>,
    destroyed: AtomicBool,
}

impl Frontend {
    pub fn new(instance_id: InstanceId, kind: FrontendKind) -> Arc<Self> {
        Arc::new(Self {
            instance_id,
            kind,
            executor: OnceCell::new(),
            state: Mutex::new(FrontendState::Created),
            router: Mutex::new(PageRouter::new()),
            pipeline: Mutex::new(Weak::new()),
            dispatcher: Mutex::new(None),
            asset_manager: Mutex::new(None),
            debug: Mutex::new(DebugFlags::default()),
            destroyed: AtomicBool::new(false),
        })
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub fn frontend_type(&self) -> FrontendType {
        self.kind.frontend_type()
    }

    pub fn state(&self) -> FrontendState {
        *self.state.lock()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn page_depth(&self) -> usize {
        self.router.lock().depth()
    }

    pub fn top_page(&self) -> Option<PageEntry> {
        self.router.lock().top().cloned()
    }

    fn engine(&self) -> Option<Arc<dyn ScriptEngine>> {
        if self.is_destroyed() {
            return None;
        }
        match &self.kind {
            FrontendKind::Script(engine) | FrontendKind::Declarative(engine) => {
                Some(Arc::clone(engine))
            }
            FrontendKind::Card => None,
        }
    }

    /// Post `f` against the engine on the Scripting role
    fn post_to_engine<F>(&self, label: &'static str, f: F) -> bool
    where
        F: FnOnce(&dyn ScriptEngine) + Send + 'static,
    {
        let (Some(engine), Some(executor)) = (self.engine(), self.executor.get()) else {
            return false;
        };
        executor.post_task(TaskType::Scripting, label, move || f(engine.as_ref()))
    }

    /// Run `f` against the engine on the Scripting role, inline if already there
    fn run_on_engine<F>(&self, label: &'static str, f: F) -> bool
    where
        F: FnOnce(&dyn ScriptEngine) + Send + 'static,
    {
        let (Some(engine), Some(executor)) = (self.engine(), self.executor.get()) else {
            return false;
        };
        executor.run_now_or_post(TaskType::Scripting, label, move || f(engine.as_ref()))
    }

    /// Run `f` against the engine and wait for its answer
    fn sync_with_engine<R, F>(&self, label: &'static str, f: F) -> Option<R>
    where
        F: FnOnce(&dyn ScriptEngine) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (Some(engine), Some(executor)) = (self.engine(), self.executor.get()) else {
            return None;
        };
        executor.post_sync_task(TaskType::Scripting, label, move || f(engine.as_ref()))
    }

    // ---- setup ----

    /// Bind the executor and start the engine. Returns `false` if already
    /// initialized or destroyed.
    pub fn initialize(&self, frontend_type: FrontendType, executor: Arc<TaskExecutor>) -> bool {
        if self.is_destroyed() {
            return false;
        }
        if frontend_type != self.frontend_type() {
            warn!(
                instance_id = self.instance_id,
                requested = %frontend_type,
                actual = %self.frontend_type(),
                "frontend type mismatch"
            );
        }
        if self.executor.set(executor).is_err() {
            warn!(instance_id = self.instance_id, "frontend already initialized");
            return false;
        }

        let flags = *self.debug.lock();
        let instance_id = self.instance_id;
        self.post_to_engine("frontend-init", move |engine| {
            if !engine.initialize(frontend_type, flags) {
                warn!(instance_id, "script engine failed to initialize");
            }
        });
        self.update_state(FrontendState::OnCreate);
        debug!(instance_id, frontend = %frontend_type, "frontend initialized");
        true
    }

    pub fn set_js_message_dispatcher(&self, dispatcher: Weak<dyn MessageDispatcher>) {
        *self.dispatcher.lock() = Some(dispatcher);
    }

    pub fn set_asset_manager(&self, asset_manager: Arc<AssetManager>) {
        *self.asset_manager.lock() = Some(asset_manager);
    }

    pub fn asset_manager(&self) -> Option<Arc<AssetManager>> {
        self.asset_manager.lock().clone()
    }

    pub fn attach_pipeline(&self, pipeline: Weak<Pipeline>) {
        *self.pipeline.lock() = pipeline;
    }

    /// Keep the last page on back press (launcher abilities)
    pub fn disallow_pop_last_page(&self) {
        self.router.lock().disallow_pop_last_page();
    }

    pub fn set_debug_flags(&self, flags: DebugFlags) {
        *self.debug.lock() = flags;
    }

    pub fn debug_flags(&self) -> DebugFlags {
        *self.debug.lock()
    }

    /// Expose a native object to scripts
    pub fn add_extra_native_object(&self, name: &'static str, object: Arc<dyn Ability>) {
        self.post_to_engine("frontend-native-object", move |engine| {
            engine.add_extra_native_object(name, object);
        });
    }

    // ---- lifecycle ----

    /// Move to `state` and notify the engine. Ignored after `OnDestroy`.
    pub fn update_state(&self, state: FrontendState) {
        {
            let mut current = self.state.lock();
            if current.is_terminal() {
                trace!(instance_id = self.instance_id, ?state, "state update after destroy");
                return;
            }
            if *current == state {
                return;
            }
            *current = state;
        }
        self.run_on_engine("frontend-lifecycle", move |engine| engine.on_lifecycle(state));
    }

    pub fn on_show(&self) {
        self.update_state(FrontendState::OnShow);
    }

    pub fn on_hide(&self) {
        self.update_state(FrontendState::OnHide);
    }

    pub fn on_active(&self) {
        self.update_state(FrontendState::OnActive);
    }

    pub fn on_inactive(&self) {
        self.update_state(FrontendState::OnInactive);
    }

    // ---- pages ----

    pub fn run_page(&self, page_id: i32, content: &str, params: &str) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let entry = PageEntry::new(page_id, content, params);
        self.router.lock().run(entry.clone());
        self.post_to_engine("frontend-run-page", move |engine| engine.load_page(&entry));
        true
    }

    pub fn push_page(&self, page_id: i32, content: &str, params: &str) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let entry = PageEntry::new(page_id, content, params);
        self.router.lock().push(entry.clone());
        self.post_to_engine("frontend-push-page", move |engine| engine.push_page(&entry));
        true
    }

    /// Replace the content of the top page. `false` if it is not `page_id`.
    pub fn update_page(&self, page_id: i32, content: &str) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let Some(entry) = self.router.lock().update(page_id, content) else {
            return false;
        };
        self.post_to_engine("frontend-update-page", move |engine| {
            engine.update_page(&entry)
        });
        true
    }

    /// Handle a back press; returns whether it was consumed
    pub fn on_back_pressed(&self) -> bool {
        if self.is_destroyed() {
            return false;
        }
        if self
            .sync_with_engine("frontend-back-press", |engine| engine.on_back_pressed())
            .unwrap_or(false)
        {
            return true;
        }

        let outcome = self.router.lock().pop();
        match outcome {
            PopOutcome::Popped(entry) => {
                self.post_to_engine("frontend-pop-page", move |engine| engine.pop_page(&entry));
                true
            }
            PopOutcome::Finish(entry) => {
                self.post_to_engine("frontend-pop-page", move |engine| engine.pop_page(&entry));
                let pipeline = self.pipeline.lock().upgrade();
                match pipeline {
                    Some(pipeline) => pipeline.notify_finish(),
                    None => debug!(instance_id = self.instance_id, "finish without pipeline"),
                }
                true
            }
            PopOutcome::Kept | PopOutcome::Empty => false,
        }
    }

    // ---- continuation and data ----

    pub fn on_start_continuation(&self) -> bool {
        self.sync_with_engine("frontend-start-continuation", |engine| {
            engine.on_start_continuation()
        })
        .unwrap_or(false)
    }

    pub fn on_save_data(&self) -> Option<String> {
        self.sync_with_engine("frontend-save-data", |engine| engine.on_save_data())
            .flatten()
    }

    pub fn on_restore_data(&self, data: &str) -> bool {
        let data = data.to_string();
        self.sync_with_engine("frontend-restore-data", move |engine| {
            engine.on_restore_data(&data)
        })
        .unwrap_or(false)
    }

    pub fn on_complete_continuation(&self, result: i32) {
        self.post_to_engine("frontend-complete-continuation", move |engine| {
            engine.on_complete_continuation(result)
        });
    }

    pub fn on_remote_terminated(&self) {
        self.post_to_engine("frontend-remote-terminated", |engine| {
            engine.on_remote_terminated()
        });
    }

    pub fn on_configuration_updated(&self, configuration: &str) {
        let configuration = configuration.to_string();
        self.post_to_engine("frontend-configuration", move |engine| {
            engine.on_configuration_updated(&configuration)
        });
    }

    pub fn on_new_request(&self, data: &str) {
        let data = data.to_string();
        self.post_to_engine("frontend-new-request", move |engine| {
            engine.on_new_request(&data)
        });
    }

    // ---- resources and messaging ----

    pub fn trigger_garbage_collection(&self) {
        self.run_on_engine("engine-gc", |engine| engine.run_garbage_collection());
    }

    /// Hand a plugin error to the engine
    pub fn transfer_plugin_error(&self, call_id: i32, error_code: i32, message: String) {
        self.post_to_engine("frontend-plugin-error", move |engine| {
            engine.on_plugin_error(call_id, error_code, &message)
        });
    }

    /// Forward a script-side call to the platform
    pub fn dispatch_to_platform(
        &self,
        group: &str,
        data: Bytes,
        call_id: i32,
        reply_expected: bool,
    ) -> bool {
        let dispatcher = self.dispatcher.lock().as_ref().and_then(Weak::upgrade);
        match dispatcher {
            Some(dispatcher) => {
                dispatcher.dispatch(group, data, call_id, reply_expected);
                true
            }
            None => false,
        }
    }

    /// Release the engine. Expected on the Scripting role after
    /// `update_state(OnDestroy)`.
    pub fn destroy(&self) {
        let engine = self.engine();
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(engine) = engine {
            engine.destroy();
        }
        self.release_links();
    }

    fn release_links(&self) {
        self.router.lock().clear();
        *self.pipeline.lock() = Weak::new();
        self.dispatcher.lock().take();
        debug!(instance_id = self.instance_id, "frontend destroyed");
    }
}
