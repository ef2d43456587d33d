//! Player motion integration
//!
//! Constant gravity, a jump impulse with a one-shot side push, geometric air
//! friction and ground clamping. `step` is the frame length in reference
//! frames (1.0 at 60 Hz).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::input::InputState;
use super::state::Player;
use crate::tuning::Tuning;

/// Impulses applied by a jump
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Jump {
    pub side_impulse: f32,
    pub vertical_impulse: f32,
}

/// What happened to the player during one integration step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion {
    pub jump: Option<Jump>,
    /// Touched down this step after being airborne
    pub landed: bool,
}

/// Side impulse for a jump taken with `input` held
///
/// Scales linearly from `base_side_push` at a zero-length hold to
/// `max_side_push` once the arrow has been down for `arrow_hold_for_max_ms`.
pub fn side_impulse(input: &InputState, tuning: &Tuning) -> f32 {
    let dir = input.direction();
    if dir == 0.0 {
        return 0.0;
    }
    let t = (input.hold_ms() / tuning.arrow_hold_for_max_ms).min(1.0);
    dir * (tuning.base_side_push + (tuning.max_side_push - tuning.base_side_push) * t)
}

/// Advance the player by one step
///
/// `jump` is the edge-gated jump decision for this tick; it is ignored while
/// airborne.
pub fn integrate(player: &mut Player, jump: bool, input: &InputState, tuning: &Tuning, step: f32) -> Motion {
    let mut motion = Motion::default();

    if jump && player.on_ground {
        let side = side_impulse(input, tuning);
        player.vel = Vec2::new(side, -tuning.jump_power);
        player.on_ground = false;
        if side != 0.0 {
            player.facing = side.signum() as i8;
        }
        motion.jump = Some(Jump {
            side_impulse: side,
            vertical_impulse: -tuning.jump_power,
        });
    } else if player.on_ground && input.direction() != 0.0 {
        player.facing = input.direction() as i8;
    }

    player.vel.y += tuning.gravity * step;
    player.pos.y += player.vel.y * step;

    if !player.on_ground && player.vel.x != 0.0 {
        player.pos.x += player.vel.x * step;
        player.vel.x *= tuning.air_friction.powf(step);
        if player.vel.x.abs() < tuning.side_snap {
            player.vel.x = 0.0;
        }
    }

    let ground = tuning.ground_y();
    if tuning.solid_ground && player.feet() >= ground {
        if !player.on_ground {
            // The side push lasts one arc only
            player.vel.x = 0.0;
            motion.landed = true;
        }
        player.pos.y = ground - player.size.y;
        player.vel.y = 0.0;
        player.on_ground = true;
    } else {
        player.on_ground = false;
    }

    // Running on the ground pulls the sprite back to its run column
    if player.on_ground && input.direction() != 0.0 {
        let pull = tuning.return_speed * step;
        player.pos.x += (tuning.player_start_x - player.pos.x).clamp(-pull, pull);
    }

    contain(player, tuning);
    motion
}

/// Keep the sprite inside the viewport margins and no further right than
/// `max_screen_drift` past the run column (screen space only)
pub fn contain(player: &mut Player, tuning: &Tuning) {
    let left = tuning.viewport_margin;
    let right = (tuning.viewport_width - tuning.viewport_margin - player.size.x)
        .min(tuning.player_start_x + tuning.max_screen_drift);
    player.pos.x = player.pos.x.min(right).max(left);
}
