//! Synthesized keyboard events and the injection seam

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Context;

/// Kind of synthesized key event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventKind {
    /// A key was pressed
    #[default]
    KeyDown,
}

impl std::fmt::Display for KeyEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyEventKind::KeyDown => write!(f, "keydown"),
        }
    }
}

/// A keyboard event synthesized from a symbolic command
///
/// The code is carried twice, as `key_code` and `which`, the way platform
/// keyboard events expose it to listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Event kind
    pub kind: KeyEventKind,

    /// Platform key code
    pub key_code: u16,

    /// Same value as `key_code`
    pub which: u16,

    /// Symbol the event was synthesized from (e.g. "left")
    pub symbol: String,

    /// Whether the event bubbles
    pub bubbles: bool,

    /// Whether listeners may cancel the event
    pub cancelable: bool,

    /// When the event was fired
    pub time_fired: DateTime<Utc>,

    /// Run that produced the event
    pub context: Context,
}

impl KeyEvent {
    /// Create a bubbling, cancelable keydown event with the current timestamp
    pub fn key_down(symbol: impl Into<String>, key_code: u16, context: Context) -> Self {
        Self {
            kind: KeyEventKind::KeyDown,
            key_code,
            which: key_code,
            symbol: symbol.into(),
            bubbles: true,
            cancelable: true,
            time_fired: Utc::now(),
            context,
        }
    }
}

/// Input-injection subsystem
///
/// Receives synthesized key events and delivers them to whatever is being
/// driven. Implementations must not block; dispatch happens inline on the
/// sequencer's task.
pub trait InputInjector: Send + Sync {
    /// Dispatch an event
    fn dispatch(&self, event: KeyEvent);
}
