// src/frontend/state.rs
//! Frontend type and lifecycle state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Application-logic engine flavour requested by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontendType {
    /// Script engine on its own Scripting thread
    Js,
    /// Static card: pages and lifecycle, no engine
    JsCard,
    /// Declarative script engine running on the UI thread
    DeclarativeJs,
    /// Plugin frontend, hosted elsewhere
    JsPlugin,
}

impl FrontendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrontendType::Js => "js",
            FrontendType::JsCard => "js_card",
            FrontendType::DeclarativeJs => "declarative_js",
            FrontendType::JsPlugin => "js_plugin",
        }
    }

    pub fn is_declarative(&self) -> bool {
        matches!(self, FrontendType::DeclarativeJs)
    }

    pub fn is_card(&self) -> bool {
        matches!(self, FrontendType::JsCard)
    }

    /// Whether a container can host this type
    pub fn is_supported(&self) -> bool {
        !matches!(self, FrontendType::JsPlugin)
    }
}

impl fmt::Display for FrontendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a frontend.
///
/// Show/Hide/Active/Inactive may cycle in any order; `OnDestroy` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontendState {
    #[default]
    Created,
    OnCreate,
    OnShow,
    OnHide,
    OnActive,
    OnInactive,
    OnDestroy,
}

impl FrontendState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FrontendState::OnDestroy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontend_type_flags() {
        assert!(FrontendType::DeclarativeJs.is_declarative());
        assert!(!FrontendType::Js.is_declarative());
        assert!(FrontendType::JsCard.is_card());
        assert!(!FrontendType::JsPlugin.is_supported());
        assert_eq!(FrontendType::DeclarativeJs.to_string(), "declarative_js");
    }

    #[test]
    fn test_only_destroy_is_terminal() {
        assert!(FrontendState::OnDestroy.is_terminal());
        assert!(!FrontendState::OnHide.is_terminal());
        assert_eq!(FrontendState::default(), FrontendState::Created);
    }
}
