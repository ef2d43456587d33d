//! Per-tick input snapshots
//!
//! The simulation never sees raw key events. Shells feed press/release
//! transitions into an [`InputTracker`] and hand the resulting immutable
//! [`InputState`] to each tick.

use serde::{Deserialize, Serialize};

/// Logical control, independent of the raw event source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Jump,
}

/// Normalized input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Timestamp (ms) of the most recent released-to-held edge of `left`
    pub left_since_ms: f64,
    /// Timestamp (ms) of the most recent released-to-held edge of `right`
    pub right_since_ms: f64,
    /// Timestamp (ms) at which this snapshot was sampled
    pub now_ms: f64,
}

impl InputState {
    /// The single held direction: -1, +1, or 0 when both or neither are held
    pub fn direction(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    /// How long the held direction has been down at sample time
    pub fn hold_ms(&self) -> f32 {
        let since = match (self.left, self.right) {
            (true, false) => self.left_since_ms,
            (false, true) => self.right_since_ms,
            _ => return 0.0,
        };
        (self.now_ms - since).max(0.0) as f32
    }
}

/// Folds timestamped press/release events into [`InputState`] snapshots
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    state: InputState,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Key repeat while already held does not move the edge timestamp.
    pub fn press(&mut self, action: Action, at_ms: f64) {
        match action {
            Action::Left => {
                if !self.state.left {
                    self.state.left_since_ms = at_ms;
                }
                self.state.left = true;
            }
            Action::Right => {
                if !self.state.right {
                    self.state.right_since_ms = at_ms;
                }
                self.state.right = true;
            }
            Action::Jump => self.state.jump = true,
        }
    }

    pub fn release(&mut self, action: Action) {
        match action {
            Action::Left => self.state.left = false,
            Action::Right => self.state.right = false,
            Action::Jump => self.state.jump = false,
        }
    }

    /// Drop every held control (window blur, restart)
    pub fn clear(&mut self) {
        self.state = InputState::default();
    }

    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::Left => self.state.left,
            Action::Right => self.state.right,
            Action::Jump => self.state.jump,
        }
    }

    /// Snapshot the held state as of `now_ms`
    pub fn snapshot(&self, now_ms: f64) -> InputState {
        InputState {
            now_ms,
            ..self.state
        }
    }
}

/// Edge gate for the jump button
///
/// A held button fires at most once; it must be released before the latch
/// re-arms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JumpLatch {
    armed: bool,
}

impl Default for JumpLatch {
    fn default() -> Self {
        Self { armed: true }
    }
}

impl JumpLatch {
    /// Returns true when a jump should start this tick
    pub fn fire(&mut self, pressed: bool, on_ground: bool) -> bool {
        if !pressed {
            self.armed = true;
            return false;
        }
        if self.armed && on_ground {
            self.armed = false;
            return true;
        }
        false
    }

    #[cfg(test)]
    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }
}
