//! Container lifecycle scenarios.
//!
//! Drives an `Engine` end to end through the headless platform view and a
//! recording script engine, observing task flow through the executor's
//! `TaskObserver` hook.
//!
//! ## Run
//! ```bash
//! cargo test --test container_lifecycle
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread;

use bytes::Bytes;
use parking_lot::Mutex;
use uihost_engine::executor::{RecordingObserver, TaskEvent, TaskObserver, TaskPhase, TaskType};
use uihost_engine::frontend::{
    EngineLoaders, FrontendState, FrontendType, PageEntry, ScriptEngine, DECLARATIVE_ENGINE_A_LIB,
    SCRIPT_ENGINE_A_LIB,
};
use uihost_engine::observability::AppStartExceptionType;
use uihost_engine::pipeline::{
    ColorScheme, KeyAction, KeyCode, KeyEvent, TouchPoint, TouchType, WindowModal,
};
use uihost_engine::platform::{HeadlessView, PlatformEventCallback, StaticAbility};
use uihost_engine::{ContainerState, Engine, EngineConfig, InstanceId, TaskExecutor};

// ---- collaborators ----

/// Script engine that records every call it receives
#[derive(Default)]
struct RecordingEngine {
    calls: Mutex<Vec<String>>,
}

impl RecordingEngine {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn count(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    fn push(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }
}

impl ScriptEngine for RecordingEngine {
    fn load_page(&self, page: &PageEntry) {
        self.push(format!("load:{}", page.page_id));
    }

    fn push_page(&self, page: &PageEntry) {
        self.push(format!("push:{}", page.page_id));
    }

    fn pop_page(&self, page: &PageEntry) {
        self.push(format!("pop:{}", page.page_id));
    }

    fn on_lifecycle(&self, state: FrontendState) {
        self.push(format!("{:?}", state));
    }

    fn on_save_data(&self) -> Option<String> {
        Some("{\"counter\":3}".to_string())
    }

    fn on_restore_data(&self, data: &str) -> bool {
        self.push(format!("restore:{}", data));
        true
    }

    fn run_garbage_collection(&self) {
        self.push("gc");
    }

    fn on_plugin_error(&self, call_id: i32, error_code: i32, message: &str) {
        self.push(format!("plugin-error:{}:{}:{}", call_id, error_code, message));
    }

    fn destroy(&self) {
        self.push("destroy");
    }
}

#[derive(Default)]
struct RecordingCallback {
    finished: AtomicUsize,
    plugin_messages: Mutex<Vec<(String, Bytes, i32)>>,
}

impl PlatformEventCallback for RecordingCallback {
    fn on_finish(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }

    fn on_status_bar_bg_color_changed(&self, _color: u32) {}

    fn on_plugin_message(&self, group: &str, data: Bytes, call_id: i32, _reply_expected: bool) {
        self.plugin_messages
            .lock()
            .push((group.to_string(), data, call_id));
    }
}

/// Checks at `frontend-destroy` completion that the instance is still
/// registered
struct RegistryWatcher {
    engine: Weak<Engine>,
    instance_id: InstanceId,
    registered_at_frontend_destroy: AtomicBool,
    inner: Arc<RecordingObserver>,
}

impl TaskObserver for RegistryWatcher {
    fn on_task_event(&self, event: &TaskEvent) {
        if event.label == "frontend-destroy" && event.phase == TaskPhase::Completed {
            let registered = self
                .engine
                .upgrade()
                .map(|engine| engine.get_container(self.instance_id).is_some())
                .unwrap_or(false);
            self.registered_at_frontend_destroy
                .store(registered, Ordering::SeqCst);
        }
        self.inner.on_task_event(event);
    }
}

// ---- fixtures ----

struct Harness {
    engine: Arc<Engine>,
    script: Arc<RecordingEngine>,
    callback: Arc<RecordingCallback>,
}

fn harness() -> Harness {
    let script = Arc::new(RecordingEngine::default());
    let loaders = EngineLoaders::new();
    for library in [SCRIPT_ENGINE_A_LIB, DECLARATIVE_ENGINE_A_LIB] {
        let script = Arc::clone(&script);
        loaders.register(
            library,
            Arc::new(move |_: InstanceId| -> Option<Arc<dyn ScriptEngine>> {
                Some(script.clone() as Arc<dyn ScriptEngine>)
            }),
        );
    }
    Harness {
        engine: Arc::new(Engine::with_loaders(EngineConfig::default(), loaders).unwrap()),
        script,
        callback: Arc::new(RecordingCallback::default()),
    }
}

impl Harness {
    fn create(&self, id: InstanceId, frontend_type: FrontendType) -> bool {
        self.engine.create_container(
            id,
            frontend_type,
            false,
            StaticAbility::anonymous(),
            self.callback.clone(),
        )
    }

    fn create_attached(&self, id: InstanceId, frontend_type: FrontendType) -> Arc<HeadlessView> {
        assert!(self.create(id, frontend_type));
        let view = HeadlessView::new(id);
        assert!(self.engine.set_view(view.clone(), 2.0, 720, 1280));
        view
    }

    fn executor(&self, id: InstanceId) -> Arc<TaskExecutor> {
        self.engine.get_container(id).unwrap().executor()
    }

    fn observe(&self, id: InstanceId) -> Arc<RecordingObserver> {
        let observer = Arc::new(RecordingObserver::new());
        self.executor(id).set_observer(Some(observer.clone()));
        observer
    }

    fn drain(&self, id: InstanceId) {
        let executor = self.executor(id);
        executor.post_sync_task(TaskType::Ui, "test-barrier", || ());
        executor.post_sync_task(TaskType::Scripting, "test-barrier", || ());
        executor.post_sync_task(TaskType::Platform, "test-barrier", || ());
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.engine.clear();
    }
}

// ---- registry ----

#[test]
fn test_duplicate_create_keeps_existing_container() {
    let h = harness();
    assert!(h.create(1, FrontendType::Js));
    let original = h.engine.get_container(1).unwrap();

    assert!(!h.create(1, FrontendType::JsCard));
    let current = h.engine.get_container(1).unwrap();
    assert!(Arc::ptr_eq(&original, &current));
    assert_eq!(current.frontend_type(), FrontendType::Js);
}

#[test]
fn test_operations_after_destroy_are_noops() {
    let h = harness();
    h.create_attached(1, FrontendType::Js);
    assert!(h.engine.destroy_container(1));
    assert!(h.engine.get_container(1).is_none());

    h.engine.on_show(1);
    h.engine.on_hide(1);
    h.engine.on_active(1);
    h.engine.on_inactive(1);
    h.engine.on_complete_continuation(1, 0);
    h.engine.on_remote_terminated(1);
    h.engine.on_configuration_updated(1, "{}");
    h.engine.on_new_request(1, "{}");
    h.engine.set_font_scale(1, 1.5);
    h.engine.trigger_garbage_collection(1);
    assert!(!h.engine.on_back_pressed(1));
    assert!(!h.engine.run_page(1, 1, "index", ""));
    assert!(!h.engine.push_page(1, 2, "detail", ""));
    assert!(!h.engine.update_page(1, 1, "index"));
    assert!(!h.engine.on_start_continuation(1));
    assert_eq!(h.engine.on_save_data(1), "");
    assert!(!h.engine.on_restore_data(1, "{}"));
    assert!(!h.engine.dump(1, &[]));
    assert!(!h.engine.destroy_container(1));
}

// ---- executor ----

#[test]
fn test_sync_task_side_effects_visible_on_return() {
    let h = harness();
    h.create_attached(1, FrontendType::Js);
    let executor = h.executor(1);

    let runs = Arc::new(AtomicUsize::new(0));
    let runs_clone = runs.clone();
    let on_ui = executor.post_sync_task(TaskType::Ui, "on-ui-check", move || {
        runs_clone.fetch_add(1, Ordering::SeqCst);
        thread::current().name().map(str::to_string)
    });

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(on_ui.flatten().as_deref(), Some("uihost-1.ui"));
}

#[test]
fn test_posting_to_torn_down_role_is_noop() {
    let h = harness();
    h.create_attached(1, FrontendType::Js);
    let executor = h.executor(1);
    let observer = h.observe(1);

    assert!(executor.shutdown_role(TaskType::Gpu));
    let ran = Arc::new(AtomicBool::new(false));
    let ran_clone = ran.clone();
    assert!(!executor.post_task(TaskType::Gpu, "late", move || {
        ran_clone.store(true, Ordering::SeqCst)
    }));
    assert_eq!(executor.post_sync_task(TaskType::Gpu, "late-sync", || 1), None);

    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(observer.find("late", TaskPhase::Dropped).len(), 1);
    assert_eq!(observer.find("late-sync", TaskPhase::Dropped).len(), 1);
}

// ---- teardown ----

#[test]
fn test_teardown_ordering() {
    let h = harness();
    h.create_attached(1, FrontendType::Js);
    h.engine.run_page(1, 1, "index", "");

    let recorder = Arc::new(RecordingObserver::new());
    let watcher = Arc::new(RegistryWatcher {
        engine: Arc::downgrade(&h.engine),
        instance_id: 1,
        registered_at_frontend_destroy: AtomicBool::new(false),
        inner: recorder.clone(),
    });
    let executor = h.executor(1);
    executor.set_observer(Some(watcher.clone()));

    assert!(h.engine.destroy_container(1));

    let pipeline_posted = recorder.position("pipeline-destroy", TaskPhase::Posted).unwrap();
    let frontend_posted = recorder.position("frontend-destroy", TaskPhase::Posted).unwrap();
    assert!(pipeline_posted < frontend_posted);

    let pipeline_done = recorder.position("pipeline-destroy", TaskPhase::Completed).unwrap();
    let frontend_done = recorder.position("frontend-destroy", TaskPhase::Completed).unwrap();
    let wait_ui = recorder.position("wait-ui", TaskPhase::Completed).unwrap();
    let wait_scripting = recorder.position("wait-scripting", TaskPhase::Completed).unwrap();
    assert!(pipeline_done < wait_ui);
    assert!(frontend_done < wait_scripting);

    assert!(watcher.registered_at_frontend_destroy.load(Ordering::SeqCst));
    assert!(h.engine.get_container(1).is_none());

    let calls = h.script.calls();
    let on_destroy = calls.iter().position(|c| c == "OnDestroy").unwrap();
    let destroy = calls.iter().position(|c| c == "destroy").unwrap();
    assert!(on_destroy < destroy);
}

#[test]
fn test_concurrent_destroy_posts_one_teardown() {
    let h = harness();
    h.create_attached(3, FrontendType::Js);
    let observer = h.observe(3);

    let results: Vec<bool> = (0..2)
        .map(|_| {
            let engine = Arc::clone(&h.engine);
            thread::spawn(move || engine.destroy_container(3))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(results.iter().filter(|ok| **ok).count(), 1);
    assert_eq!(observer.find("pipeline-destroy", TaskPhase::Posted).len(), 1);
    assert_eq!(observer.find("frontend-destroy", TaskPhase::Posted).len(), 1);
    assert_eq!(h.script.count("destroy"), 1);
    assert!(h.engine.get_container(3).is_none());
}

#[test]
fn test_destroy_without_view_still_destroys_frontend() {
    let h = harness();
    assert!(h.create(4, FrontendType::Js));
    h.engine.run_page(4, 1, "index", "");

    assert!(h.engine.destroy_container(4));
    assert_eq!(h.script.count("destroy"), 1);
}

// ---- failure containment ----

#[test]
fn test_unsupported_frontend_reports_once() {
    let h = harness();
    assert!(h.create(1, FrontendType::JsPlugin));

    let container = h.engine.get_container(1).unwrap();
    assert!(container.frontend().is_none());

    h.engine.on_show(1);
    assert!(!h.engine.run_page(1, 1, "index", ""));
    assert_eq!(
        h.engine
            .reporter()
            .app_start_exceptions(AppStartExceptionType::FrontendTypeErr),
        1
    );
}

#[test]
fn test_window_failure_creates_no_pipeline() {
    let h = harness();
    assert!(h.create(1, FrontendType::Js));
    assert!(!h
        .engine
        .set_view(HeadlessView::without_surface(1), 1.0, 10, 10));

    let container = h.engine.get_container(1).unwrap();
    assert!(container.pipeline().is_none());
    assert!(!h.engine.watchdog().is_registered(1));
}

#[test]
fn test_second_view_is_rejected() {
    let h = harness();
    let first_view = h.create_attached(1, FrontendType::Js);
    let first = h.engine.get_container(1).unwrap().pipeline().unwrap();

    let second_view = HeadlessView::new(1);
    assert!(!h.engine.set_view(second_view.clone(), 1.0, 10, 10));
    let current = h.engine.get_container(1).unwrap().pipeline().unwrap();
    assert!(Arc::ptr_eq(&first, &current));
    assert!(!second_view.has_callbacks());

    assert!(h.engine.destroy_container(1));
    assert!(first.is_destroyed());
    assert!(first_view.window().is_destroyed());
    assert!(first_view.is_released());
}

// ---- background and GC ----

#[test]
fn test_hide_posts_gc_and_memory_trim() {
    let h = harness();
    h.create_attached(2, FrontendType::Js);
    h.engine.on_show(2);
    let observer = h.observe(2);

    h.engine.on_hide(2);
    h.drain(2);

    let gc = observer.find("frontend-gc", TaskPhase::Posted);
    assert_eq!(gc.len(), 1);
    assert_eq!(gc[0].resolved, Some(TaskType::Scripting));

    let trims = observer.find("memory-trim", TaskPhase::Posted);
    assert!(trims.iter().any(|e| e.resolved == Some(TaskType::Ui)));
    assert!(trims.iter().any(|e| e.resolved == Some(TaskType::Gpu)));
    assert!(trims.iter().any(|e| e.resolved == Some(TaskType::Io)));

    assert_eq!(h.script.count("gc"), 1);
    assert_eq!(observer.find("engine-gc", TaskPhase::Completed).len(), 1);
    assert_eq!(
        h.engine.get_container(2).unwrap().state(),
        ContainerState::Background
    );
}

#[test]
fn test_declarative_hide_collects_on_ui() {
    let h = harness();
    h.create_attached(2, FrontendType::DeclarativeJs);
    let observer = h.observe(2);

    h.engine.on_hide(2);
    h.drain(2);

    let gc = observer.find("frontend-gc", TaskPhase::Posted);
    assert_eq!(gc.len(), 1);
    assert_eq!(gc[0].requested, TaskType::Scripting);
    assert_eq!(gc[0].resolved, Some(TaskType::Ui));
    assert_eq!(h.script.count("gc"), 1);
}

// ---- input and pages ----

#[test]
fn test_back_key_pops_then_finishes() {
    let h = harness();
    let view = h.create_attached(1, FrontendType::Js);
    h.engine.run_page(1, 1, "pages/index", "");
    h.engine.push_page(1, 2, "pages/detail", "");
    h.engine.on_show(1);

    assert!(view.dispatch_key(KeyEvent::new(KeyCode::Back, KeyAction::Up)));
    assert!(view.dispatch_key(KeyEvent::new(KeyCode::Back, KeyAction::Up)));
    h.drain(1);

    assert!(h.script.calls().contains(&"pop:2".to_string()));
    assert_eq!(h.callback.finished.load(Ordering::SeqCst), 1);
}

#[test]
fn test_touch_is_processed_on_ui_role() {
    let h = harness();
    let view = h.create_attached(1, FrontendType::Js);
    let observer = h.observe(1);

    view.dispatch_touch(TouchPoint::new(0, 10.0, 10.0, TouchType::Down));
    view.dispatch_touch(TouchPoint::new(0, 10.0, 10.0, TouchType::Up));
    h.drain(1);

    let touches = observer.find("touch-event", TaskPhase::Completed);
    assert_eq!(touches.len(), 2);
    assert!(touches.iter().all(|e| e.resolved == Some(TaskType::Ui)));
    let pipeline = h.engine.get_container(1).unwrap().pipeline().unwrap();
    assert_eq!(pipeline.stats().touch_events, 2);
}

#[test]
fn test_update_page_is_distinct_from_back() {
    let h = harness();
    h.create_attached(1, FrontendType::Js);
    h.engine.run_page(1, 1, "index", "");
    h.engine.push_page(1, 2, "detail", "");

    assert!(h.engine.update_page(1, 2, "detail-v2"));
    let frontend = h.engine.get_container(1).unwrap().frontend().unwrap();
    assert_eq!(frontend.page_depth(), 2);
    assert_eq!(frontend.top_page().unwrap().content, "detail-v2");
}

#[test]
fn test_save_and_restore_data() {
    let h = harness();
    h.create_attached(1, FrontendType::Js);

    assert_eq!(h.engine.on_save_data(1), "{\"counter\":3}");
    assert!(h.engine.on_restore_data(1, "{\"counter\":3}"));
    assert!(h
        .script
        .calls()
        .contains(&"restore:{\"counter\":3}".to_string()));
}

#[test]
fn test_presentation_settings_reach_pipeline() {
    let h = harness();
    h.create_attached(1, FrontendType::Js);

    h.engine.set_font_scale(1, 1.25);
    h.engine
        .set_window_style(1, WindowModal::DialogModal, ColorScheme::Dark);
    h.drain(1);

    let pipeline = h.engine.get_container(1).unwrap().pipeline().unwrap();
    assert_eq!(pipeline.font_scale(), 1.25);
    assert_eq!(pipeline.window_modal(), WindowModal::DialogModal);
    assert_eq!(pipeline.color_scheme(), ColorScheme::Dark);
    assert!(h.engine.dump(1, &["-stats".to_string()]));
}

// ---- messaging ----

#[test]
fn test_plugin_message_reaches_host() {
    let h = harness();
    h.create_attached(1, FrontendType::Js);
    let frontend = h.engine.get_container(1).unwrap().frontend().unwrap();

    assert!(frontend.dispatch_to_platform("storage", Bytes::from_static(b"get"), 9, true));
    h.drain(1);

    let messages = h.callback.plugin_messages.lock().clone();
    assert_eq!(messages, vec![("storage".to_string(), Bytes::from_static(b"get"), 9)]);
}

#[test]
fn test_plugin_error_goes_through_background() {
    let h = harness();
    h.create_attached(1, FrontendType::Js);
    let observer = h.observe(1);

    h.engine.dispatch_plugin_error(1, 9, 404, "not found");
    let executor = h.executor(1);
    executor.post_sync_task(TaskType::Background, "test-barrier", || ());
    h.drain(1);

    let posted = observer.find("plugin-error", TaskPhase::Posted);
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].resolved, Some(TaskType::Background));
    assert!(h
        .script
        .calls()
        .contains(&"plugin-error:9:404:not found".to_string()));
}

// ---- lifecycle state ----

#[test]
fn test_state_machine_through_show_and_hide() {
    let h = harness();
    assert!(h.create(1, FrontendType::Js));
    let container = h.engine.get_container(1).unwrap();
    assert_eq!(container.state(), ContainerState::Initialized);

    assert!(h.engine.set_view(HeadlessView::new(1), 1.0, 10, 10));
    assert_eq!(container.state(), ContainerState::ViewAttached);

    h.engine.on_show(1);
    assert_eq!(container.state(), ContainerState::Foreground);
    h.engine.on_hide(1);
    assert_eq!(container.state(), ContainerState::Background);
    h.engine.on_show(1);
    assert_eq!(container.state(), ContainerState::Foreground);

    assert!(h.engine.destroy_container(1));
    assert_eq!(container.state(), ContainerState::Destroyed);
    assert_eq!(
        container.frontend().map(|f| f.state()),
        None,
        "frontend is swapped out on destroy"
    );
}
