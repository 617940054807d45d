// src/assets/asset_manager.rs
//! Provider chain for instance assets

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// A source of named assets
pub trait AssetProvider: Send + Sync {
    fn get_asset(&self, name: &str) -> Option<Vec<u8>>;

    /// Asset names under `prefix`
    fn list(&self, prefix: &str) -> Vec<String>;
}

/// First-match lookup over providers in insertion order
#[derive(Default)]
pub struct AssetManager {
    providers: RwLock<Vec<Arc<dyn AssetProvider>>>,
    package_path: RwLock<Option<PathBuf>>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&self, provider: Arc<dyn AssetProvider>) {
        self.providers.write().push(provider);
        debug!(providers = self.provider_count(), "asset provider added");
    }

    pub fn provider_count(&self) -> usize {
        self.providers.read().len()
    }

    pub fn get_asset(&self, name: &str) -> Option<Vec<u8>> {
        let providers = self.providers.read().clone();
        let found = providers.iter().find_map(|p| p.get_asset(name));
        trace!(name, found = found.is_some(), "asset lookup");
        found
    }

    pub fn list(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .providers
            .read()
            .iter()
            .flat_map(|p| p.list(prefix))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Directory native libraries of the package are loaded from
    pub fn set_package_path(&self, path: impl AsRef<Path>) {
        *self.package_path.write() = Some(path.as_ref().to_path_buf());
    }

    pub fn package_path(&self) -> Option<PathBuf> {
        self.package_path.read().clone()
    }
}
