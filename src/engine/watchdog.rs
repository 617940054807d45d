// src/engine/watchdog.rs
//! Passive liveness monitor
//!
//! Each tick posts a heartbeat to the UI and Scripting roles of every
//! registered container. A heartbeat still pending at the next tick means
//! the role made no progress for a whole interval and is reported as a
//! stall (once per stall).

use crate::executor::{TaskExecutor, TaskType};
use crate::observability::EventReporter;
use crate::InstanceId;
use crossbeam_channel::{select, tick, Sender};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

const WATCHED_ROLES: [TaskType; 2] = [TaskType::Ui, TaskType::Scripting];

#[derive(Default)]
struct Heartbeat {
    pending: Arc<AtomicBool>,
    reported: AtomicBool,
}

struct WatchEntry {
    executor: Weak<TaskExecutor>,
    heartbeats: [Heartbeat; 2],
}

pub struct Watchdog {
    entries: DashMap<InstanceId, WatchEntry>,
    reporter: Arc<EventReporter>,
}

impl Watchdog {
    pub fn new(reporter: Arc<EventReporter>) -> Self {
        Self {
            entries: DashMap::new(),
            reporter,
        }
    }

    pub fn register(&self, instance_id: InstanceId, executor: &Arc<TaskExecutor>) {
        self.entries.insert(
            instance_id,
            WatchEntry {
                executor: Arc::downgrade(executor),
                heartbeats: Default::default(),
            },
        );
        debug!(instance_id, "watchdog registered");
    }

    pub fn unregister(&self, instance_id: InstanceId) -> bool {
        self.entries.remove(&instance_id).is_some()
    }

    pub fn is_registered(&self, instance_id: InstanceId) -> bool {
        self.entries.contains_key(&instance_id)
    }

    /// Check last round's heartbeats and post a new round
    pub fn tick(&self) {
        for entry in self.entries.iter() {
            let instance_id = *entry.key();
            let Some(executor) = entry.executor.upgrade() else {
                continue;
            };

            for (role, heartbeat) in WATCHED_ROLES.iter().zip(entry.heartbeats.iter()) {
                if heartbeat.pending.load(Ordering::SeqCst) {
                    if !heartbeat.reported.swap(true, Ordering::SeqCst) {
                        warn!(instance_id, role = role.as_str(), "role missed a heartbeat");
                        self.reporter.send_watchdog_stall(instance_id, *role);
                    }
                    continue;
                }
                heartbeat.reported.store(false, Ordering::SeqCst);
                heartbeat.pending.store(true, Ordering::SeqCst);

                let pending = Arc::clone(&heartbeat.pending);
                let posted = executor.post_task(*role, "watchdog-heartbeat", move || {
                    pending.store(false, Ordering::SeqCst)
                });
                if !posted {
                    heartbeat.pending.store(false, Ordering::SeqCst);
                }
            }
        }
    }
}

/// Thread ticking a [`Watchdog`] at a fixed interval until dropped
pub struct WatchdogTicker {
    stop: Sender<()>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl WatchdogTicker {
    pub fn spawn(watchdog: Arc<Watchdog>, interval: Duration) -> std::io::Result<Self> {
        let (stop, stopped) = crossbeam_channel::bounded::<()>(1);
        let ticks = tick(interval);

        let join = thread::Builder::new()
            .name("uihost-watchdog".to_string())
            .spawn(move || loop {
                select! {
                    recv(ticks) -> _ => watchdog.tick(),
                    recv(stopped) -> _ => break,
                }
            })?;

        debug!(interval_ms = interval.as_millis() as u64, "watchdog ticker started");
        Ok(Self {
            stop,
            join: Mutex::new(Some(join)),
        })
    }

    pub fn stop(&self) {
        let _ = self.stop.try_send(());
        if let Some(join) = self.join.lock().take() {
            if join.join().is_err() {
                warn!("watchdog ticker exited abnormally");
            }
        }
    }
}

impl Drop for WatchdogTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
