//! Demo/idle mode - a simple bot that plays the game
//!
//! Holds right the whole run and jumps when a pit hazard is about to reach the
//! player's front edge. Waits in place while a low ghost is just ahead.

use super::input::{Action, InputState, InputTracker};
use super::snapshot::SessionSnapshot;

/// Gap (px) between the player's front edge and a pit hazard at which to jump
pub const JUMP_TRIGGER: f32 = 40.0;
/// Look-ahead (px) for ghosts worth waiting for
pub const GHOST_LOOKAHEAD: f32 = 80.0;

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    tracker: InputTracker,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide the input for the next tick from the latest snapshot
    pub fn input(&mut self, snapshot: &SessionSnapshot) -> InputState {
        let now = snapshot.time_ms;
        let player = &snapshot.player;
        let front = player.pos.x + player.size.x;

        let ghost_blocking = snapshot.obstacles.iter().any(|o| {
            let gap = o.hazard.min.x - front;
            o.kind.is_floating() && (0.0..=GHOST_LOOKAHEAD).contains(&gap) && o.hazard.max().y > player.pos.y
        });
        if ghost_blocking {
            self.tracker.release(Action::Right);
        } else if !self.tracker.is_held(Action::Right) {
            self.tracker.press(Action::Right, now);
        }

        let pit_close = snapshot.obstacles.iter().any(|o| {
            let gap = o.hazard.min.x - front;
            o.kind.is_pit() && (0.0..=JUMP_TRIGGER).contains(&gap)
        });
        // Release between jumps so the latch re-arms
        if pit_close && player.on_ground && !self.tracker.is_held(Action::Jump) {
            self.tracker.press(Action::Jump, now);
        } else {
            self.tracker.release(Action::Jump);
        }

        self.tracker.snapshot(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::sim::state::{GameEvent, Obstacle, ObstacleKind, Session};
    use crate::sim::tick;
    use crate::tuning::Tuning;

    #[test]
    fn test_autopilot_clears_a_pit() {
        let tuning = Tuning {
            safe_start_distance: 1.0e6,
            ..Default::default()
        };
        let mut session = Session::new(tuning.clone(), 1).unwrap();
        session.start().unwrap();
        session
            .world
            .push_obstacle(Obstacle::pit(1, ObstacleKind::Spikes, 600.0, &tuning));

        let mut pilot = Autopilot::new();
        let mut snapshot = session.snapshot();
        let mut jumps = 0;
        // Long enough to clear the pit, short enough that it is not pruned yet
        for _ in 0..200 {
            let input = pilot.input(&snapshot);
            snapshot = tick(&mut session, &input, FRAME_MS);
            jumps += snapshot
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::Jumped { .. }))
                .count();
        }

        assert!(snapshot.alive);
        assert_eq!(jumps, 1);
        let pit = &snapshot.obstacles[0];
        assert!(pit.hazard.max().x < snapshot.player.pos.x);
    }

    #[test]
    fn test_autopilot_holds_right_when_clear() {
        let session = Session::new(Tuning::default(), 1).unwrap();
        let mut pilot = Autopilot::new();
        let input = pilot.input(&session.snapshot());
        assert!(input.right);
        assert!(!input.jump);
    }
}
