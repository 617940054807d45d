// src/executor/task_type.rs
//! Logical thread roles that tasks are addressed to

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named logical thread of execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Embedding / UI-toolkit thread
    Platform,
    /// Render and event thread, owns the pipeline
    Ui,
    /// Script engine thread; absent for declarative frontends, whose
    /// scripting tasks run on `Ui`
    Scripting,
    /// GC and cleanup work
    Background,
    Gpu,
    Io,
}

impl TaskType {
    pub const COUNT: usize = 6;

    pub const ALL: [TaskType; TaskType::COUNT] = [
        TaskType::Platform,
        TaskType::Ui,
        TaskType::Scripting,
        TaskType::Background,
        TaskType::Gpu,
        TaskType::Io,
    ];

    /// Roles bound when a platform view is attached
    pub const VIEW_ROLES: [TaskType; 3] = [TaskType::Ui, TaskType::Gpu, TaskType::Io];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Platform => "platform",
            TaskType::Ui => "ui",
            TaskType::Scripting => "scripting",
            TaskType::Background => "background",
            TaskType::Gpu => "gpu",
            TaskType::Io => "io",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_match_all() {
        for (i, role) in TaskType::ALL.iter().enumerate() {
            assert_eq!(role.index(), i);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(TaskType::Scripting.to_string(), "scripting");
        assert_eq!(TaskType::Ui.to_string(), "ui");
    }
}
