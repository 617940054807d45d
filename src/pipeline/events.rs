// src/pipeline/events.rs
//! Input events delivered by the platform view
//!
//! Decoded on the Platform role, processed on the UI role.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchType {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TouchPoint {
    pub id: i32,
    pub x: f32,
    pub y: f32,
    pub kind: TouchType,
    /// Event time in milliseconds, platform clock
    pub time_ms: i64,
}

impl TouchPoint {
    pub fn new(id: i32, x: f32, y: f32, kind: TouchType) -> Self {
        Self {
            id,
            x,
            y,
            kind,
            time_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCode {
    Back,
    Enter,
    Tab,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    Other(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    Down,
    Up,
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub action: KeyAction,
    pub repeat: u32,
}

impl KeyEvent {
    pub fn new(code: KeyCode, action: KeyAction) -> Self {
        Self {
            code,
            action,
            repeat: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    None,
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseAction {
    Press,
    Release,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MouseEvent {
    pub x: f32,
    pub y: f32,
    pub button: MouseButton,
    pub action: MouseAction,
}

/// Crown / rotary input
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RotationEvent {
    pub value: f64,
}
