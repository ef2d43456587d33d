//! Read-only views handed to rendering/UI shells

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::state::{GameEvent, GamePhase, ObstacleKind, Session};

/// Player as seen by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub size: Vec2,
    pub facing: i8,
    pub vel: Vec2,
    pub on_ground: bool,
}

impl PlayerView {
    /// -1 rising, +1 falling, 0 at rest (sprite selection)
    pub fn vertical_sign(&self) -> i8 {
        if self.vel.y < 0.0 {
            -1
        } else if self.vel.y > 0.0 {
            1
        } else {
            0
        }
    }
}

/// One obstacle projected into screen space for the current tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: u32,
    pub kind: ObstacleKind,
    pub world_x: f32,
    /// Current top edge; for ghosts this is the oscillated height
    pub screen_y: f32,
    /// Full sprite box
    pub sprite: Aabb,
    /// Lethal sub-region
    pub hazard: Aabb,
}

/// Everything a shell needs to draw a frame and update its HUD
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: GamePhase,
    pub alive: bool,
    pub distance: f32,
    /// Distance in display units
    pub distance_m: u32,
    pub time_ms: f64,
    pub player: PlayerView,
    pub obstacles: Vec<ObstacleView>,
    pub events: Vec<GameEvent>,
}

impl SessionSnapshot {
    /// Capture session state together with an already computed projection
    pub fn capture(session: &Session, obstacles: Vec<ObstacleView>) -> Self {
        let p = &session.player;
        Self {
            phase: session.phase,
            alive: session.is_alive(),
            distance: session.distance(),
            distance_m: session.distance_m(),
            time_ms: session.time_ms,
            player: PlayerView {
                pos: p.pos,
                size: p.size,
                facing: p.facing,
                vel: p.vel,
                on_ground: p.on_ground,
            },
            obstacles,
            events: session.events.clone(),
        }
    }

    /// Obstacles whose sprite intersects the horizontal range `[0, width]`
    /// widened by `margin` on both sides
    pub fn visible(&self, width: f32, margin: f32) -> impl Iterator<Item = &ObstacleView> {
        self.obstacles
            .iter()
            .filter(move |o| o.sprite.max().x >= -margin && o.sprite.min.x <= width + margin)
    }
}
