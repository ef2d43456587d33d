//! Game balance and theme presets
//!
//! Every gameplay constant lives in [`Tuning`]. Values that describe motion
//! (gravity, scroll speed, impulses) are expressed per reference frame of
//! [`crate::consts::FRAME_MS`]; the tick scales them by the real frame length.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::FRAME_MS;

/// Visual/gameplay variant of the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Forest,
    Rooftop,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Forest => "Forest",
            Theme::Rooftop => "Rooftop",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "forest" | "forest-runner" => Some(Theme::Forest),
            "rooftop" | "rooftop-jumper" | "roof" => Some(Theme::Rooftop),
            _ => None,
        }
    }

    /// Balance preset for this theme
    pub fn tuning(&self) -> Tuning {
        match self {
            Theme::Forest => Tuning::default(),
            Theme::Rooftop => Tuning {
                gravity: 0.9,
                jump_power: 17.0,
                scroll_speed: 4.5,
                min_gap: 480.0,
                max_gap: 760.0,
                spawn_lead: 640.0,
                ghost_freq: 0.0022,
                ..Tuning::default()
            },
        }
    }
}

/// Configuration rejected at session construction
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    #[error("min_gap ({min}) must not exceed max_gap ({max})")]
    GapRange { min: f32, max: f32 },
    #[error("{field} must be > 0 (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be >= 0 (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("base_side_push ({base}) must not exceed max_side_push ({max})")]
    SidePushOrder { base: f32, max: f32 },
    #[error("air_friction must be in (0, 1) (got {0})")]
    AirFriction(f32),
    #[error("{field} leaves no hazard interior")]
    HazardInterior { field: &'static str },
    #[error("spawn_lead ({lead}) must not exceed max_gap ({max_gap})")]
    SpawnLead { lead: f32, max_gap: f32 },
    #[error("return_speed ({speed}) must not exceed scroll_speed ({scroll})")]
    ReturnSpeed { speed: f32, scroll: f32 },
    #[error("obstacles would spawn at x={arrival} inside the player's reach ({reach})")]
    SpawnInReach { reach: f32, arrival: f32 },
    #[error("tuning parse error")]
    Parse(#[from] serde_json::Error),
}

/// Data-driven game balance
///
/// Deserializing fills missing fields from [`Tuning::default`], so a JSON
/// file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Viewport ===
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Distance of the ground line above the bottom edge
    pub ground_offset: f32,
    /// When false the ground does not hold the player (free-fall variant)
    pub solid_ground: bool,

    // === Player ===
    pub player_start_x: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub player_visual_scale: f32,
    /// Horizontal containment margin on both viewport edges
    pub viewport_margin: f32,
    /// Furthest the player may drift right of `player_start_x`
    pub max_screen_drift: f32,
    /// Speed (px per reference frame) at which a grounded runner eases back
    /// to `player_start_x`
    pub return_speed: f32,

    // === Kinematics ===
    pub gravity: f32,
    pub jump_power: f32,
    /// Side impulse for a minimal arrow hold
    pub base_side_push: f32,
    /// Side impulse once the arrow has been held for `arrow_hold_for_max_ms`
    pub max_side_push: f32,
    pub arrow_hold_for_max_ms: f32,
    /// Airborne horizontal decay per reference frame
    pub air_friction: f32,
    /// Horizontal speed below which airborne drift stops
    pub side_snap: f32,
    /// Horizontal speed above which the world keeps scrolling without input
    pub motion_threshold: f32,

    // === World ===
    pub scroll_speed: f32,
    pub safe_start_distance: f32,
    pub min_gap: f32,
    pub max_gap: f32,
    /// How far ahead of the spawn threshold an obstacle is placed
    pub spawn_lead: f32,
    /// Obstacles this far behind the player are dropped
    pub prune_margin: f32,

    // === Pits (spikes, lava) ===
    pub pit_width: f32,
    pub pit_height: f32,
    /// Height of the pit rim above the ground line
    pub pit_lip: f32,
    pub trap_visual_scale: f32,
    pub pit_hazard_inset: f32,

    // === Ghosts ===
    pub ghost_size: f32,
    pub ghost_base_height: f32,
    pub ghost_height_band: f32,
    /// Oscillation speed in radians per millisecond
    pub ghost_freq: f32,
    pub ghost_amplitude: f32,
    pub ghost_phase_spread_ms: f32,
    pub ghost_hazard_inset: f32,

    // === Timing ===
    /// Longest frame the simulation integrates in one tick
    pub max_tick_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 720.0,
            ground_offset: 90.0,
            solid_ground: true,

            player_start_x: 160.0,
            player_width: 70.0,
            player_height: 90.0,
            player_visual_scale: 1.5,
            viewport_margin: 40.0,
            max_screen_drift: 240.0,
            return_speed: 3.0,

            gravity: 0.8,
            jump_power: 16.0, // tuned to clear a typical pit
            base_side_push: 7.0,
            max_side_push: 14.0,
            arrow_hold_for_max_ms: 450.0,
            air_friction: 0.9,
            side_snap: 0.2,
            motion_threshold: 0.1,

            scroll_speed: 4.0,
            safe_start_distance: 500.0,
            min_gap: 520.0,
            max_gap: 820.0,
            spawn_lead: 700.0,
            prune_margin: 400.0,

            pit_width: 260.0,
            pit_height: 70.0,
            pit_lip: 10.0,
            trap_visual_scale: 0.67,
            pit_hazard_inset: 20.0,

            ghost_size: 120.0,
            ghost_base_height: 260.0,
            ghost_height_band: 60.0,
            ghost_freq: 0.0018,
            ghost_amplitude: 220.0,
            ghost_phase_spread_ms: 10_000.0,
            ghost_hazard_inset: 10.0,

            max_tick_ms: 50.0,
        }
    }
}

impl Tuning {
    /// Parse a tuning override, filling absent fields from the defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Screen-space y of the ground line
    pub fn ground_y(&self) -> f32 {
        self.viewport_height - self.ground_offset
    }

    /// Player bounding box size after visual scaling
    pub fn player_size(&self) -> Vec2 {
        Vec2::new(
            (self.player_width * self.player_visual_scale).floor(),
            (self.player_height * self.player_visual_scale).floor(),
        )
    }

    /// Pit sprite size after visual scaling
    pub fn pit_size(&self) -> Vec2 {
        Vec2::new(
            (self.pit_width * self.trap_visual_scale).floor(),
            (self.pit_height * self.trap_visual_scale).floor(),
        )
    }

    /// Check every invariant the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("ground_offset", self.ground_offset),
            ("player_start_x", self.player_start_x),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("player_visual_scale", self.player_visual_scale),
            ("viewport_margin", self.viewport_margin),
            ("max_screen_drift", self.max_screen_drift),
            ("return_speed", self.return_speed),
            ("gravity", self.gravity),
            ("jump_power", self.jump_power),
            ("base_side_push", self.base_side_push),
            ("max_side_push", self.max_side_push),
            ("arrow_hold_for_max_ms", self.arrow_hold_for_max_ms),
            ("air_friction", self.air_friction),
            ("side_snap", self.side_snap),
            ("motion_threshold", self.motion_threshold),
            ("scroll_speed", self.scroll_speed),
            ("safe_start_distance", self.safe_start_distance),
            ("min_gap", self.min_gap),
            ("max_gap", self.max_gap),
            ("spawn_lead", self.spawn_lead),
            ("prune_margin", self.prune_margin),
            ("pit_width", self.pit_width),
            ("pit_height", self.pit_height),
            ("pit_lip", self.pit_lip),
            ("trap_visual_scale", self.trap_visual_scale),
            ("pit_hazard_inset", self.pit_hazard_inset),
            ("ghost_size", self.ghost_size),
            ("ghost_base_height", self.ghost_base_height),
            ("ghost_height_band", self.ghost_height_band),
            ("ghost_freq", self.ghost_freq),
            ("ghost_amplitude", self.ghost_amplitude),
            ("ghost_phase_spread_ms", self.ghost_phase_spread_ms),
            ("ghost_hazard_inset", self.ghost_hazard_inset),
            ("max_tick_ms", self.max_tick_ms),
        ];
        if let Some(&(field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFinite { field });
        }

        let positive = [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("player_visual_scale", self.player_visual_scale),
            ("jump_power", self.jump_power),
            ("arrow_hold_for_max_ms", self.arrow_hold_for_max_ms),
            ("min_gap", self.min_gap),
            ("pit_width", self.pit_width),
            ("pit_height", self.pit_height),
            ("trap_visual_scale", self.trap_visual_scale),
            ("ghost_size", self.ghost_size),
            ("max_tick_ms", self.max_tick_ms),
        ];
        if let Some(&(field, value)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(ConfigError::NonPositive { field, value });
        }

        let non_negative = [
            ("gravity", self.gravity),
            ("base_side_push", self.base_side_push),
            ("side_snap", self.side_snap),
            ("motion_threshold", self.motion_threshold),
            ("scroll_speed", self.scroll_speed),
            ("safe_start_distance", self.safe_start_distance),
            ("spawn_lead", self.spawn_lead),
            ("prune_margin", self.prune_margin),
            ("pit_lip", self.pit_lip),
            ("pit_hazard_inset", self.pit_hazard_inset),
            ("ghost_height_band", self.ghost_height_band),
            ("ghost_amplitude", self.ghost_amplitude),
            ("ghost_phase_spread_ms", self.ghost_phase_spread_ms),
            ("ghost_hazard_inset", self.ghost_hazard_inset),
            ("viewport_margin", self.viewport_margin),
            ("max_screen_drift", self.max_screen_drift),
            ("return_speed", self.return_speed),
        ];
        if let Some(&(field, value)) = non_negative.iter().find(|(_, v)| *v < 0.0) {
            return Err(ConfigError::Negative { field, value });
        }

        if self.min_gap > self.max_gap {
            return Err(ConfigError::GapRange {
                min: self.min_gap,
                max: self.max_gap,
            });
        }
        if self.base_side_push > self.max_side_push {
            return Err(ConfigError::SidePushOrder {
                base: self.base_side_push,
                max: self.max_side_push,
            });
        }
        if !(self.air_friction > 0.0 && self.air_friction < 1.0) {
            return Err(ConfigError::AirFriction(self.air_friction));
        }

        let pit = self.pit_size();
        if pit.x - 2.0 * self.pit_hazard_inset <= 0.0 || pit.y <= 0.0 {
            return Err(ConfigError::HazardInterior {
                field: "pit_hazard_inset",
            });
        }
        if self.ghost_size - 2.0 * self.ghost_hazard_inset <= 0.0 {
            return Err(ConfigError::HazardInterior {
                field: "ghost_hazard_inset",
            });
        }
        let player = self.player_size();
        if player.x <= 0.0 || player.y <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "player_size",
                value: player.x.min(player.y),
            });
        }

        if self.spawn_lead > self.max_gap {
            return Err(ConfigError::SpawnLead {
                lead: self.spawn_lead,
                max_gap: self.max_gap,
            });
        }
        if self.return_speed > self.scroll_speed {
            return Err(ConfigError::ReturnSpeed {
                speed: self.return_speed,
                scroll: self.scroll_speed,
            });
        }
        // A new obstacle must appear ahead of the furthest the player can drift,
        // even after the longest allowed frame scrolled it toward the player
        let reach = self.player_start_x + self.max_screen_drift + player.x;
        let arrival = self.spawn_lead - self.scroll_speed * (self.max_tick_ms / FRAME_MS);
        if reach >= arrival {
            return Err(ConfigError::SpawnInReach { reach, arrival });
        }

        Ok(())
    }
}
