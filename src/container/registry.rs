// src/container/registry.rs
//! Instance id → container map
//!
//! The single authority for existence checks. `remove` is the only
//! de-registration point: once it returns, `get` never observes the entry
//! again.

use crate::container::Container;
use crate::observability::METRIC_LIVE_CONTAINERS;
use crate::InstanceId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub type ContainerRegistry = Registry<Container>;

pub struct Registry<T> {
    entries: DashMap<InstanceId, Arc<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `id`. Rejected, leaving the existing entry
    /// untouched, if `id` is taken.
    pub fn add(&self, id: InstanceId, value: Arc<T>) -> bool {
        match self.entries.entry(id) {
            Entry::Occupied(_) => {
                warn!(instance_id = id, "instance already registered");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
                self.update_gauge();
                debug!(instance_id = id, "instance registered");
                true
            }
        }
    }

    pub fn get(&self, id: InstanceId) -> Option<Arc<T>> {
        self.entries.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn remove(&self, id: InstanceId) -> Option<Arc<T>> {
        let removed = self.entries.remove(&id).map(|(_, value)| value);
        if removed.is_some() {
            self.update_gauge();
            debug!(instance_id = id, "instance removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered ids in ascending order
    pub fn ids(&self) -> Vec<InstanceId> {
        let mut ids: Vec<_> = self.entries.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    fn update_gauge(&self) {
        metrics::gauge!(METRIC_LIVE_CONTAINERS).set(self.entries.len() as f64);
    }
}
