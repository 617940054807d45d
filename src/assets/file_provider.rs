// src/assets/file_provider.rs
//! Assets read from an unpacked package directory

use crate::assets::asset_manager::AssetProvider;
use crate::utils::errors::{EngineError, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Looks each asset up under every search path of a package, in order
#[derive(Debug)]
pub struct FileAssetProvider {
    package_path: PathBuf,
    search_paths: Vec<PathBuf>,
}

impl FileAssetProvider {
    /// Bind to `package_path`; an empty `paths` searches the package root
    pub fn initialize(package_path: impl AsRef<Path>, paths: &[String]) -> Result<Self> {
        let package_path = package_path.as_ref().to_path_buf();
        if !package_path.is_dir() {
            return Err(EngineError::Asset(format!(
                "package path {} is not a directory",
                package_path.display()
            )));
        }

        let mut search_paths: Vec<PathBuf> = paths
            .iter()
            .filter_map(|p| match relative_clean(p) {
                Some(clean) => Some(package_path.join(clean)),
                None => {
                    warn!(path = %p, "ignoring asset search path escaping the package");
                    None
                }
            })
            .collect();
        if search_paths.is_empty() {
            search_paths.push(package_path.clone());
        }

        debug!(package = %package_path.display(), paths = search_paths.len(), "file asset provider ready");
        Ok(Self {
            package_path,
            search_paths,
        })
    }

    pub fn package_path(&self) -> &Path {
        &self.package_path
    }
}

/// Relative, `..`-free form of `path`
fn relative_clean(path: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => return None,
        }
    }
    Some(clean)
}

impl AssetProvider for FileAssetProvider {
    fn get_asset(&self, name: &str) -> Option<Vec<u8>> {
        let relative = relative_clean(name)?;
        self.search_paths
            .iter()
            .map(|base| base.join(&relative))
            .find(|candidate| candidate.is_file())
            .and_then(|path| std::fs::read(path).ok())
    }

    fn list(&self, prefix: &str) -> Vec<String> {
        let Some(relative) = relative_clean(prefix) else {
            return Vec::new();
        };
        let mut names = Vec::new();
        for base in &self.search_paths {
            let Ok(entries) = std::fs::read_dir(base.join(&relative)) else {
                continue;
            };
            for entry in entries.flatten() {
                if entry.path().is_file() {
                    let name = relative.join(entry.file_name());
                    names.push(name.to_string_lossy().into_owned());
                }
            }
        }
        names
    }
}
