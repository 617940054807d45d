// src/observability/event_report.rs
//! Telemetry for app-level exceptional events
//!
//! Every report is logged, counted in metrics and retained (bounded) so the
//! embedding host or a test can inspect what happened to an instance.

use crate::executor::TaskType;
use crate::observability::METRIC_APP_EVENTS;
use crate::utils::errors::Result;
use crate::InstanceId;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, warn};

/// Number of reports kept in memory
const MAX_RETAINED_EVENTS: usize = 256;

/// Why an instance failed to start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStartExceptionType {
    /// Frontend type not hosted by this container
    FrontendTypeErr,
    /// Script engine library could not be loaded
    EngineLoadErr,
}

impl AppStartExceptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppStartExceptionType::FrontendTypeErr => "frontend_type_err",
            AppStartExceptionType::EngineLoadErr => "engine_load_err",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReportedEvent {
    AppStartException {
        instance_id: InstanceId,
        kind: AppStartExceptionType,
    },
    WatchdogStall {
        instance_id: InstanceId,
        role: TaskType,
    },
}

/// Telemetry sink shared by every container of an engine
#[derive(Default)]
pub struct EventReporter {
    events: Mutex<Vec<ReportedEvent>>,
}

impl EventReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_app_start_exception(&self, instance_id: InstanceId, kind: AppStartExceptionType) {
        error!(instance_id, kind = kind.as_str(), "app start exception");
        metrics::counter!(METRIC_APP_EVENTS, "event" => kind.as_str()).increment(1);
        self.retain(ReportedEvent::AppStartException { instance_id, kind });
    }

    pub fn send_watchdog_stall(&self, instance_id: InstanceId, role: TaskType) {
        warn!(instance_id, role = role.as_str(), "role did not answer watchdog heartbeat");
        metrics::counter!(METRIC_APP_EVENTS, "event" => "watchdog_stall").increment(1);
        self.retain(ReportedEvent::WatchdogStall { instance_id, role });
    }

    fn retain(&self, event: ReportedEvent) {
        let mut events = self.events.lock();
        if events.len() == MAX_RETAINED_EVENTS {
            events.remove(0);
        }
        events.push(event);
    }

    /// Snapshot of retained reports, oldest first
    pub fn events(&self) -> Vec<ReportedEvent> {
        self.events.lock().clone()
    }

    /// Retained reports as a JSON array
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&*self.events.lock())?)
    }

    /// Number of retained start exceptions of `kind`
    pub fn app_start_exceptions(&self, kind: AppStartExceptionType) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, ReportedEvent::AppStartException { kind: k, .. } if *k == kind))
            .count()
    }
}
