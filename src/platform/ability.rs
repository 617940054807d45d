// src/platform/ability.rs
//! Hosting ability and host notification callback

use bytes::Bytes;
use std::sync::Arc;

/// Metadata of the ability hosting an instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbilityInfo {
    pub bundle_name: String,
    pub ability_name: String,
    /// Launcher abilities keep their last page
    pub is_launcher_ability: bool,
}

/// The platform ability bridged into the script engine as a native object
pub trait Ability: Send + Sync {
    fn ability_info(&self) -> Option<AbilityInfo>;
}

/// Ability with fixed metadata
#[derive(Debug, Clone, Default)]
pub struct StaticAbility {
    info: Option<AbilityInfo>,
}

impl StaticAbility {
    pub fn new(info: AbilityInfo) -> Arc<Self> {
        Arc::new(Self { info: Some(info) })
    }

    pub fn anonymous() -> Arc<Self> {
        Arc::new(Self { info: None })
    }
}

impl Ability for StaticAbility {
    fn ability_info(&self) -> Option<AbilityInfo> {
        self.info.clone()
    }
}

/// Notifications from a container back to its embedding host.
///
/// Always invoked on the Platform role.
pub trait PlatformEventCallback: Send + Sync {
    /// The instance asked to close (last page popped)
    fn on_finish(&self);

    fn on_status_bar_bg_color_changed(&self, color: u32);

    /// Opaque plugin call from the script side
    fn on_plugin_message(&self, _group: &str, _data: Bytes, _call_id: i32, _reply_expected: bool) {}
}

/// Callback that ignores everything
#[derive(Debug, Default)]
pub struct NoopEventCallback;

impl PlatformEventCallback for NoopEventCallback {
    fn on_finish(&self) {}

    fn on_status_bar_bg_color_changed(&self, _color: u32) {}
}
