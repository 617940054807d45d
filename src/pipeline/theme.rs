// src/pipeline/theme.rs
//! Window presentation settings and theme loading

use crate::assets::AssetManager;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Asset holding app-provided theme overrides
pub const CUSTOM_THEME_ASSET: &str = "custom_style.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowModal {
    #[default]
    Normal,
    SemiModal,
    DialogModal,
    ContainerModal,
}

/// Active theme of a pipeline
#[derive(Debug, Clone, Default, Serialize)]
pub struct Theme {
    pub color_scheme: ColorScheme,
    pub custom: Option<serde_json::Value>,
}

impl Theme {
    pub fn new(color_scheme: ColorScheme) -> Self {
        Self {
            color_scheme,
            custom: None,
        }
    }

    /// Load [`CUSTOM_THEME_ASSET`] if present; malformed JSON is ignored
    pub fn load_custom(&mut self, assets: &AssetManager) {
        let Some(bytes) = assets.get_asset(CUSTOM_THEME_ASSET) else {
            debug!("no custom theme");
            return;
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => self.custom = Some(value),
            Err(e) => warn!("ignoring malformed {}: {}", CUSTOM_THEME_ASSET, e),
        }
    }
}
