//! Session state and core simulation types
//!
//! All state that a tick reads or writes lives here, owned by [`Session`].

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision::Aabb;
use super::input::JumpLatch;
use super::snapshot::SessionSnapshot;
use super::world::World;
use crate::consts::DISTANCE_UNIT;
use crate::tuning::{ConfigError, Theme, Tuning};

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first start/reset
    NotStarted,
    /// Active gameplay
    Running,
    /// Run ended; only `reset` leaves this phase
    GameOver,
}

/// The player's runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner in screen space (y grows downward)
    pub pos: Vec2,
    pub vel: Vec2,
    /// Full bounding box size
    pub size: Vec2,
    pub on_ground: bool,
    /// Last facing direction (+1 right, -1 left)
    pub facing: i8,
}

impl Player {
    /// Fresh player standing on the ground at the spawn column
    pub fn spawn(tuning: &Tuning) -> Self {
        let size = tuning.player_size();
        Self {
            pos: Vec2::new(tuning.player_start_x, tuning.ground_y() - size.y),
            vel: Vec2::ZERO,
            size,
            on_ground: true,
            facing: 1,
        }
    }

    /// Screen-space y of the player's feet
    #[inline]
    pub fn feet(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Spike pit at the ground line
    Spikes,
    /// Lava pit at the ground line
    Lava,
    /// Floating enemy oscillating vertically
    Ghost,
}

impl ObstacleKind {
    /// Every kind, in the order the spawner draws from
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Spikes, ObstacleKind::Lava, ObstacleKind::Ghost];

    pub fn is_pit(&self) -> bool {
        matches!(self, ObstacleKind::Spikes | ObstacleKind::Lava)
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, ObstacleKind::Ghost)
    }
}

/// An obstacle in world space
///
/// `world_x` never changes after creation; the world scroll and (for ghosts)
/// the oscillation phase are the only things that move it on screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Left edge in world space
    pub world_x: f32,
    /// Top edge for pits, oscillation center for ghosts
    pub y: f32,
    pub size: Vec2,
    /// Simulation time (ms) the oscillation is measured from (ghosts only)
    pub phase_ms: f64,
}

impl Obstacle {
    pub fn pit(id: u32, kind: ObstacleKind, world_x: f32, tuning: &Tuning) -> Self {
        debug_assert!(kind.is_pit());
        Self {
            id,
            kind,
            world_x,
            y: tuning.ground_y() - tuning.pit_lip,
            size: tuning.pit_size(),
            phase_ms: 0.0,
        }
    }

    pub fn ghost(id: u32, world_x: f32, base_y: f32, phase_ms: f64, tuning: &Tuning) -> Self {
        Self {
            id,
            kind: ObstacleKind::Ghost,
            world_x,
            y: base_y,
            size: Vec2::splat(tuning.ghost_size),
            phase_ms,
        }
    }

    #[inline]
    pub fn screen_x(&self, distance: f32) -> f32 {
        self.world_x - distance
    }

    /// Screen-space top edge at simulation time `time_ms`
    ///
    /// Pure in `(time_ms, phase_ms)`; collision and rendering both consume
    /// the value computed once per tick by the world projection.
    pub fn screen_y(&self, time_ms: f64, tuning: &Tuning) -> f32 {
        if self.kind.is_floating() {
            let angle = (time_ms - self.phase_ms) * tuning.ghost_freq as f64;
            self.y - angle.sin() as f32 * tuning.ghost_amplitude
        } else {
            self.y
        }
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeathCause {
    Hazard { obstacle_id: u32, kind: ObstacleKind },
    /// Dropped below the viewport (free-fall variant)
    FellOut,
}

/// Things that happened during a tick, for shells to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Jumped { side_impulse: f32, vertical_impulse: f32 },
    Landed,
    Spawned { id: u32, kind: ObstacleKind, world_x: f32 },
    Pruned { count: usize },
    Died { cause: DeathCause },
}

/// Readiness gate for externally loaded resources
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AssetGate {
    pub required: u32,
    pub loaded: u32,
}

impl AssetGate {
    pub fn new(required: u32) -> Self {
        Self {
            required,
            loaded: 0,
        }
    }

    /// Count one more resource as ready
    pub fn report_loaded(&mut self) {
        self.loaded = (self.loaded + 1).min(self.required);
    }

    pub fn is_ready(&self) -> bool {
        self.loaded >= self.required
    }
}

/// Illegal session commands
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("cannot start a session in phase {0:?}")]
    IllegalTransition(GamePhase),
}

/// Complete session state
///
/// Owns the player and the world; nothing holds a reference back into it.
#[derive(Debug, Clone)]
pub struct Session {
    pub tuning: Tuning,
    /// Seed the obstacle RNG was created with
    pub seed: u64,
    /// Changed only through `start`, `reset` and the tick ending the run
    pub(crate) phase: GamePhase,
    pub player: Player,
    pub world: World,
    pub jump_latch: JumpLatch,
    /// Elapsed simulation time in milliseconds
    pub time_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub assets: AssetGate,
    /// Events produced by the most recent tick
    pub events: Vec<GameEvent>,
}

impl Session {
    /// Create a session; malformed tuning is rejected here, not mid-run
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self {
            player: Player::spawn(&tuning),
            world: World::new(&tuning, seed),
            tuning,
            seed,
            phase: GamePhase::NotStarted,
            jump_latch: JumpLatch::default(),
            time_ms: 0.0,
            time_ticks: 0,
            assets: AssetGate::default(),
            events: Vec::new(),
        })
    }

    pub fn with_theme(theme: Theme, seed: u64) -> Result<Self, ConfigError> {
        log::info!("Theme: {}", theme.as_str());
        Self::new(theme.tuning(), seed)
    }

    /// Hold ticks until `count` resources have been reported ready
    pub fn with_pending_assets(mut self, count: u32) -> Self {
        self.assets = AssetGate::new(count);
        self
    }

    pub fn report_asset_loaded(&mut self) {
        self.assets.report_loaded();
        if self.assets.is_ready() {
            log::info!("All {} assets ready", self.assets.required);
        }
    }

    /// First start of a fresh session
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != GamePhase::NotStarted {
            log::warn!("Ignoring start in phase {:?}", self.phase);
            return Err(SessionError::IllegalTransition(self.phase));
        }
        self.begin_run();
        Ok(())
    }

    /// Reinitialize player, world and spawner and begin a new run
    ///
    /// Legal from every phase. The obstacle RNG keeps its stream, so runs
    /// after a reset get a fresh layout.
    pub fn reset(&mut self) {
        self.player = Player::spawn(&self.tuning);
        self.world.reset(&self.tuning);
        self.jump_latch = JumpLatch::default();
        self.time_ms = 0.0;
        self.time_ticks = 0;
        self.begin_run();
    }

    fn begin_run(&mut self) {
        self.phase = GamePhase::Running;
        self.events.clear();
        self.events.push(GameEvent::Started);
        log::info!("Run started (seed {})", self.seed);
    }

    /// End the current run
    pub(crate) fn end_run(&mut self, cause: DeathCause) {
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::Died { cause });
        log::info!("Game over ({:?}) at {} m", cause, self.distance_m());
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_alive(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Cumulative scrolled distance in world units
    pub fn distance(&self) -> f32 {
        self.world.distance()
    }

    /// Distance in display units
    pub fn distance_m(&self) -> u32 {
        (self.world.distance() / DISTANCE_UNIT).floor() as u32
    }

    /// Render snapshot at the current simulation time without advancing it
    pub fn snapshot(&self) -> SessionSnapshot {
        let obstacles = self.world.project(self.time_ms, &self.tuning);
        SessionSnapshot::capture(self, obstacles)
    }
}
