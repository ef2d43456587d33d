//! Forest Runner - An endless side-scrolling jump-and-run
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, spawning, collisions, session state)
//! - `platform`: Browser/native input mapping
//! - `tuning`: Data-driven game balance and theme presets

pub mod platform;
pub mod sim;
pub mod tuning;

pub use tuning::{ConfigError, Theme, Tuning};

/// Game configuration constants
pub mod consts {
    /// Reference frame length in milliseconds. Tuning values such as gravity
    /// and scroll speed are expressed per reference frame.
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per rendered frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// World units per displayed distance unit (meters on the HUD)
    pub const DISTANCE_UNIT: f32 = 10.0;
}
