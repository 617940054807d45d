// src/platform/mod.rs
//! Platform embedding seams
//!
//! Narrow interfaces the container calls into, owned by the embedding host:
//!
//! - **Ability**: the hosting ability and its metadata, exposed to scripts
//! - **Event Callback**: container-to-host notifications (finish, status bar,
//!   plugin messages)
//! - **View**: the platform view a pipeline renders into, plus its input
//!   callback registration
//! - **Resource**: platform resource registrar shared with the pipeline
//! - **Headless**: in-process implementations for tests and demos

pub mod ability;
pub mod headless;
pub mod resource;
pub mod view;

// Re-export commonly used types
pub use ability::{Ability, AbilityInfo, NoopEventCallback, PlatformEventCallback, StaticAbility};
pub use headless::{HeadlessView, HeadlessWindow};
pub use resource::{LocalResourceRegister, ResourceRegister};
pub use view::{PlatformView, ViewCallbacks};
