//! Directional head gestures and the diagnostic messages that accompany
//! them.  Both are plain data; delivery is up to the caller.

use std::fmt;

use crate::sexp::{escape_string, format_event};

// ── Gesture types ──────────────────────────────────────────

/// A recognized head gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// Head tilted up (nod up).
    Up,
    /// Head tilted down (nod down).
    Down,
    /// Head turned left.
    Left,
    /// Head turned right.
    Right,
}

impl Gesture {
    /// String representation for IPC and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Diagnostics ────────────────────────────────────────────

/// Developer-facing status line produced alongside gesture detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub message: String,
}

impl DiagnosticEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Serialize as an IPC s-expression.
    pub fn to_sexp(&self) -> String {
        let message = format!("\"{}\"", escape_string(&self.message));
        format_event("motion-diagnostic", &[("message", message.as_str())])
    }
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
