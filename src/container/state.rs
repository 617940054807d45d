// src/container/state.rs
//! Container lifecycle state machine
//!
//! ```text
//! Created ──▶ Initialized ──▶ ViewAttached ──▶ Foreground ◀──▶ Background
//!    │             │               │                │              │
//!    └─────────────┴───────────────┴────────────────┴──────────────┴──▶ Destroying ──▶ Destroyed
//! ```
//!
//! `Created` may jump straight to `ViewAttached` for declarative frontends,
//! whose frontend is only built once the view exists.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerState {
    Created,
    Initialized,
    ViewAttached,
    Foreground,
    Background,
    Destroying,
    Destroyed,
}

impl ContainerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerState::Created => "created",
            ContainerState::Initialized => "initialized",
            ContainerState::ViewAttached => "view_attached",
            ContainerState::Foreground => "foreground",
            ContainerState::Background => "background",
            ContainerState::Destroying => "destroying",
            ContainerState::Destroyed => "destroyed",
        }
    }

    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(self, next: ContainerState) -> bool {
        use ContainerState::*;
        matches!(
            (self, next),
            (Created, Initialized)
                | (Created, ViewAttached)
                | (Initialized, ViewAttached)
                | (ViewAttached, Foreground)
                | (ViewAttached, Background)
                | (Foreground, Background)
                | (Background, Foreground)
                | (Destroying, Destroyed)
        ) || (next == Destroying && !matches!(self, Destroying | Destroyed))
    }

    pub fn is_torn_down(&self) -> bool {
        matches!(self, ContainerState::Destroying | ContainerState::Destroyed)
    }

    /// Whether a view has been attached and the instance is not torn down
    pub fn has_view(&self) -> bool {
        matches!(
            self,
            ContainerState::ViewAttached | ContainerState::Foreground | ContainerState::Background
        )
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
