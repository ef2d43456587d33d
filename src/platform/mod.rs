//! Platform abstraction layer
//!
//! Maps browser input onto simulation actions. Timestamps are supplied by the
//! caller (`performance.now()` on web) and passed straight to the
//! [`InputTracker`](crate::sim::InputTracker).

pub use crate::sim::Action;

impl Action {
    /// Map a DOM `KeyboardEvent.code` to an action
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Self::Left),
            "ArrowRight" | "KeyD" => Some(Self::Right),
            "Space" | "ArrowUp" | "KeyW" => Some(Self::Jump),
            _ => None,
        }
    }

    /// Whether the browser default for this key should be suppressed
    /// (page scrolling on Space and the arrows)
    pub fn suppresses_default(code: &str) -> bool {
        matches!(code, "Space" | "ArrowUp" | "ArrowLeft" | "ArrowRight")
    }
}
