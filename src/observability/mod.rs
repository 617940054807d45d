// src/observability/mod.rs
//! Logging, metrics and telemetry
//!
//! - **Tracing**: `tracing-subscriber` with `EnvFilter`, pretty or JSON output
//! - **Metrics**: `metrics` facade exported through a Prometheus recorder
//! - **Event report**: app-level exceptional events (start failures, stalls)
//!
//! Both initialisers are idempotent so tests and embedders can call them
//! more than once.

pub mod event_report;

pub use event_report::{AppStartExceptionType, EventReporter, ReportedEvent};

use crate::utils::config::{LogFormat, ObservabilityConfig};
use crate::utils::errors::{EngineError, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const METRIC_TASKS_POSTED: &str = "uihost_tasks_posted_total";
pub const METRIC_TASKS_DROPPED: &str = "uihost_tasks_dropped_total";
pub const METRIC_TASKS_PANICKED: &str = "uihost_tasks_panicked_total";
pub const METRIC_SYNC_WAIT: &str = "uihost_sync_task_wait_seconds";
pub const METRIC_LIVE_CONTAINERS: &str = "uihost_live_containers";
pub const METRIC_APP_EVENTS: &str = "uihost_app_events_total";

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the global tracing subscriber
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| EngineError::InvalidConfig(format!("log_level: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_thread_names(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_thread_names(true))
            .try_init(),
    };

    if installed.is_err() {
        debug!("tracing subscriber already installed");
    }
    Ok(())
}

/// Install the Prometheus metrics recorder
pub fn init_metrics() -> Result<()> {
    PROMETHEUS.get_or_try_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| EngineError::InvalidConfig(format!("metrics recorder: {}", e)))
    })?;
    Ok(())
}

/// Render current metrics in Prometheus text format
pub fn render_metrics() -> Option<String> {
    PROMETHEUS.get().map(|handle| handle.render())
}
