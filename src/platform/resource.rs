// src/platform/resource.rs
//! Platform resource registrar
//!
//! Native resources (video surfaces, web views, ...) created on behalf of
//! the render tree. The view supplies the registrar; the pipeline releases
//! whatever is left when it is destroyed.

use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

pub trait ResourceRegister: Send + Sync {
    /// Create a resource and return its handle
    fn create_resource(&self, kind: &str, param: &str) -> i64;

    fn release_resource(&self, id: i64) -> bool;

    /// Release every live resource, returning how many were released
    fn release_all(&self) -> usize;

    fn live_resources(&self) -> usize;
}

/// In-process registrar keeping resource descriptors in a map
#[derive(Default)]
pub struct LocalResourceRegister {
    next_id: AtomicI64,
    resources: DashMap<i64, (String, String)>,
}

impl LocalResourceRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kind of a live resource
    pub fn kind_of(&self, id: i64) -> Option<String> {
        self.resources.get(&id).map(|entry| entry.0.clone())
    }
}

impl ResourceRegister for LocalResourceRegister {
    fn create_resource(&self, kind: &str, param: &str) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.resources.insert(id, (kind.to_string(), param.to_string()));
        debug!(id, kind, "resource created");
        id
    }

    fn release_resource(&self, id: i64) -> bool {
        self.resources.remove(&id).is_some()
    }

    fn release_all(&self) -> usize {
        let count = self.resources.len();
        self.resources.clear();
        count
    }

    fn live_resources(&self) -> usize {
        self.resources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_release() {
        let register = LocalResourceRegister::new();
        let video = register.create_resource("video", "src=a.mp4");
        let web = register.create_resource("web", "");

        assert_ne!(video, web);
        assert_eq!(register.kind_of(video).as_deref(), Some("video"));
        assert!(register.release_resource(video));
        assert!(!register.release_resource(video));
        assert_eq!(register.live_resources(), 1);
        assert_eq!(register.release_all(), 1);
        assert_eq!(register.live_resources(), 0);
    }
}
