//! Collision detection between the player and hazards
//!
//! Everything here works on screen-space boxes. Obstacles are persisted in
//! world space and projected once per tick before they reach this module.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::snapshot::ObstacleView;
use super::state::ObstacleKind;
use crate::tuning::Tuning;

/// Axis-aligned box: top-left corner plus full size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    #[inline]
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Shrink by `dx` on the left and right and `top`/`bottom` vertically
    pub fn inset(&self, dx: f32, top: f32, bottom: f32) -> Self {
        Self::new(
            self.min + Vec2::new(dx, top),
            self.size - Vec2::new(2.0 * dx, top + bottom),
        )
    }

    /// Panics on boxes no caller should be able to build
    fn assert_valid(&self) {
        assert!(
            self.min.is_finite() && self.size.is_finite(),
            "non-finite collision box: {self:?}"
        );
        assert!(
            self.size.x >= 0.0 && self.size.y >= 0.0,
            "negative collision box size: {self:?}"
        );
    }

    /// Strict overlap on both axes; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.assert_valid();
        other.assert_valid();
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x && a_max.x > other.min.x && self.min.y < b_max.y && a_max.y > other.min.y
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, other: &Aabb) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && b_max.x <= a_max.x
            && b_max.y <= a_max.y
    }
}

/// The lethal part of an obstacle's sprite box
///
/// Pits only kill inside their interior, not on the rim; ghosts are shrunk
/// evenly so grazing the sprite edge is survivable.
pub fn hazard_box(kind: ObstacleKind, sprite: &Aabb, tuning: &Tuning) -> Aabb {
    if kind.is_pit() {
        sprite.inset(tuning.pit_hazard_inset, 0.0, 0.0)
    } else {
        let inset = tuning.ghost_hazard_inset;
        sprite.inset(inset, inset, inset)
    }
}

/// Outcome of one tick of collision resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollisionOutcome {
    Safe,
    /// Touched down on the ground this tick without hitting anything
    Landed,
    Fatal { obstacle_id: u32, kind: ObstacleKind },
}

/// Test the player against every projected obstacle
///
/// Linear scan in spawn order; the first overlapping hazard wins.
pub fn resolve(player: &Aabb, obstacles: &[ObstacleView], landed: bool) -> CollisionOutcome {
    if let Some(hit) = obstacles.iter().find(|o| player.overlaps(&o.hazard)) {
        return CollisionOutcome::Fatal {
            obstacle_id: hit.id,
            kind: hit.kind,
        };
    }
    if landed {
        CollisionOutcome::Landed
    } else {
        CollisionOutcome::Safe
    }
}
