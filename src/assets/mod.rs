// src/assets/mod.rs
//! Asset loading
//!
//! - **Asset Manager**: ordered provider chain shared by a container, its
//!   frontend and its pipeline
//! - **File Provider**: reads assets from an unpacked application package
//!
//! Asset contents are opaque bytes; formats belong to the consumers.

pub mod asset_manager;
pub mod file_provider;

// Re-export commonly used types
pub use asset_manager::{AssetManager, AssetProvider};
pub use file_provider::FileAssetProvider;
