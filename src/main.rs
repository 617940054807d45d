// src/main.rs
//! UIHost demo host
//!
//! Drives one instance through its whole lifecycle against a headless view:
//! create, attach, run pages, feed input, background, dump, destroy.
//! `uihost [package-dir]` also registers the package's assets.

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use uihost_engine::frontend::{EngineLoaders, FrontendType};
use uihost_engine::observability::{init_metrics, init_tracing, render_metrics};
use uihost_engine::pipeline::{
    ColorScheme, KeyAction, KeyCode, KeyEvent, TouchPoint, TouchType, WindowModal,
};
use uihost_engine::platform::{AbilityInfo, HeadlessView, NoopEventCallback, StaticAbility};
use uihost_engine::{BuildInfo, Engine, EngineConfig};

const DEMO_INSTANCE: i32 = 1;

fn main() -> Result<()> {
    // Load configuration
    let config = EngineConfig::load()?;

    // Initialize observability (tracing, metrics)
    init_tracing(&config.observability)?;
    if config.observability.metrics_enabled {
        init_metrics()?;
    }

    let build = BuildInfo::current();
    info!(
        "Starting UIHost v{} ({}, {})",
        build.version, build.git_hash, build.rustc_version
    );

    let engine = Engine::init_global(config, EngineLoaders::with_tracing_engines())?;

    let ability = StaticAbility::new(AbilityInfo {
        bundle_name: "com.example.demo".to_string(),
        ability_name: "MainAbility".to_string(),
        is_launcher_ability: false,
    });
    if !engine.create_container(
        DEMO_INSTANCE,
        FrontendType::Js,
        false,
        ability,
        Arc::new(NoopEventCallback),
    ) {
        bail!("failed to create instance {}", DEMO_INSTANCE);
    }

    if let Some(package) = std::env::args().nth(1).map(PathBuf::from) {
        engine.add_asset_path(DEMO_INSTANCE, &package, &[]);
    }

    let view = HeadlessView::new(DEMO_INSTANCE);
    if !engine.set_view(view.clone(), 2.0, 1080, 2340) {
        bail!("failed to attach view to instance {}", DEMO_INSTANCE);
    }
    engine.set_window_style(DEMO_INSTANCE, WindowModal::Normal, ColorScheme::Dark);

    engine.run_page(DEMO_INSTANCE, 1, "pages/index", "{}");
    engine.push_page(DEMO_INSTANCE, 2, "pages/detail", "{}");
    engine.on_show(DEMO_INSTANCE);
    engine.on_active(DEMO_INSTANCE);

    view.dispatch_touch(TouchPoint::new(0, 120.0, 300.0, TouchType::Down));
    view.dispatch_touch(TouchPoint::new(0, 120.0, 300.0, TouchType::Up));
    let consumed = view.dispatch_key(KeyEvent::new(KeyCode::Back, KeyAction::Up));
    info!(consumed, "back key delivered");

    engine.on_inactive(DEMO_INSTANCE);
    engine.on_hide(DEMO_INSTANCE);
    engine.dump(DEMO_INSTANCE, &["-stats".to_string()]);

    engine.destroy_container(DEMO_INSTANCE);
    info!(events = %engine.reporter().export_json()?, "telemetry");
    engine.clear();

    if let Some(metrics) = render_metrics() {
        println!("{}", metrics);
    }
    info!("UIHost stopped");
    Ok(())
}
