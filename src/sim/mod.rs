//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time enters only through the `dt_ms` handed to [`tick`]
//! - Seeded RNG only
//! - Obstacles kept in spawn order
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod input;
pub mod kinematics;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod world;

pub use autopilot::Autopilot;
pub use collision::{Aabb, CollisionOutcome, hazard_box, resolve};
pub use input::{Action, InputState, InputTracker, JumpLatch};
pub use kinematics::{Jump, Motion, side_impulse};
pub use snapshot::{ObstacleView, PlayerView, SessionSnapshot};
pub use spawner::ObstacleSpawner;
pub use state::{
    AssetGate, DeathCause, GameEvent, GamePhase, Obstacle, ObstacleKind, Player, Session,
    SessionError,
};
pub use tick::{clamp_frame, tick};
pub use world::World;
