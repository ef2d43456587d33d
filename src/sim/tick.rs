//! Simulation tick
//!
//! Advances one session by one rendered frame. Phases run in a fixed order:
//! input/jump gate, kinematics, world scroll + spawn, projection, collision,
//! pruning, outcome.

use super::collision::{self, CollisionOutcome};
use super::input::InputState;
use super::kinematics;
use super::snapshot::SessionSnapshot;
use super::state::{DeathCause, GameEvent, GamePhase, Session};
use crate::consts::FRAME_MS;

/// Clamp a frame length before integrating it
///
/// Negative and NaN frames become 0; anything past `max_ms` (tab
/// backgrounded, debugger pause) is cut down so a resumed session does not
/// take one huge unstable step.
pub fn clamp_frame(dt_ms: f32, max_ms: f32) -> f32 {
    if dt_ms.is_nan() {
        return 0.0;
    }
    if dt_ms > max_ms {
        log::debug!("Clamped {:.1} ms frame to {} ms", dt_ms, max_ms);
    }
    dt_ms.clamp(0.0, max_ms)
}

/// Advance the session by one frame of `dt_ms` milliseconds
///
/// Outside `Running`, or while assets are still pending, nothing is simulated
/// and the returned snapshot is render-only.
pub fn tick(session: &mut Session, input: &InputState, dt_ms: f32) -> SessionSnapshot {
    session.events.clear();
    if session.phase != GamePhase::Running || !session.assets.is_ready() {
        return session.snapshot();
    }

    let dt = clamp_frame(dt_ms, session.tuning.max_tick_ms);
    let step = dt / FRAME_MS;
    session.time_ms += dt as f64;
    session.time_ticks += 1;

    let Session {
        tuning,
        player,
        world,
        jump_latch,
        events,
        time_ms,
        ..
    } = session;

    // Player motion
    let jump = jump_latch.fire(input.jump, player.on_ground);
    let motion = kinematics::integrate(player, jump, input, tuning, step);
    if let Some(j) = motion.jump {
        events.push(GameEvent::Jumped {
            side_impulse: j.side_impulse,
            vertical_impulse: j.vertical_impulse,
        });
    }
    if motion.landed {
        events.push(GameEvent::Landed);
    }

    // World scroll follows effective horizontal motion
    let moving = input.direction() != 0.0 || player.vel.x.abs() > tuning.motion_threshold;
    if let Some(o) = world.advance(moving, step, *time_ms, tuning) {
        events.push(GameEvent::Spawned {
            id: o.id,
            kind: o.kind,
            world_x: o.world_x,
        });
    }

    // One projection per tick, shared by collision and the snapshot
    let mut obstacles = world.project(*time_ms, tuning);
    let outcome = collision::resolve(&player.bounds(), &obstacles, motion.landed);

    let cause = match outcome {
        CollisionOutcome::Fatal { obstacle_id, kind } => Some(DeathCause::Hazard { obstacle_id, kind }),
        _ if player.pos.y > tuning.viewport_height => Some(DeathCause::FellOut),
        _ => None,
    };

    // Pruned obstacles are a prefix of the world list and of the projection
    let pruned = world.prune(player.pos.x, tuning.prune_margin);
    if pruned > 0 {
        obstacles.drain(..pruned);
        events.push(GameEvent::Pruned { count: pruned });
        log::debug!("Pruned {} obstacles, {} active", pruned, world.obstacles().len());
    }

    if let Some(cause) = cause {
        session.end_run(cause);
    }

    SessionSnapshot::capture(session, obstacles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::{Action, InputTracker};
    use crate::sim::state::{Obstacle, ObstacleKind};
    use crate::tuning::Tuning;

    fn running(tuning: Tuning, seed: u64) -> Session {
        let mut session = Session::new(tuning, seed).unwrap();
        session.start().unwrap();
        session
    }

    fn jumps(snapshot: &SessionSnapshot) -> Vec<(f32, f32)> {
        snapshot
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Jumped {
                    side_impulse,
                    vertical_impulse,
                } => Some((*side_impulse, *vertical_impulse)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_idle_first_tick() {
        let mut session = running(Tuning::default(), 1);
        let snapshot = tick(&mut session, &InputState::default(), FRAME_MS);

        assert!(snapshot.alive);
        assert!(snapshot.player.on_ground);
        assert_eq!(snapshot.player.pos.y + snapshot.player.size.y, session.tuning.ground_y());
        assert_eq!(snapshot.distance, 0.0);
        assert!(snapshot.obstacles.is_empty());
        assert_eq!(session.time_ticks, 1);
    }

    #[test]
    fn test_long_hold_gives_max_side_push() {
        let tuning = Tuning::default();
        let mut session = running(tuning.clone(), 1);
        let mut tracker = InputTracker::new();
        tracker.press(Action::Right, 0.0);

        let mut now = 0.0;
        while now < 1000.0 {
            now += FRAME_MS as f64;
            let snapshot = tick(&mut session, &tracker.snapshot(now), FRAME_MS);
            assert!(jumps(&snapshot).is_empty());
        }

        tracker.press(Action::Jump, now);
        now += FRAME_MS as f64;
        let snapshot = tick(&mut session, &tracker.snapshot(now), FRAME_MS);
        assert_eq!(jumps(&snapshot), vec![(tuning.max_side_push, -tuning.jump_power)]);
        assert!(!snapshot.player.on_ground);
        assert_eq!(snapshot.player.facing, 1);
    }

    #[test]
    fn test_held_jump_fires_once() {
        let mut session = running(Tuning::default(), 1);
        let input = InputState {
            jump: true,
            ..Default::default()
        };

        let mut count = 0;
        let mut landed = false;
        for _ in 0..120 {
            let snapshot = tick(&mut session, &input, FRAME_MS);
            count += jumps(&snapshot).len();
            landed |= snapshot.events.contains(&GameEvent::Landed);
        }
        assert!(landed, "a jump should come back down within two seconds");
        assert_eq!(count, 1);

        // Release then press again re-arms the latch
        tick(&mut session, &InputState::default(), FRAME_MS);
        let snapshot = tick(&mut session, &input, FRAME_MS);
        assert_eq!(jumps(&snapshot).len(), 1);
    }

    #[test]
    fn test_first_spawn_after_safe_start() {
        let tuning = Tuning::default();
        let mut session = running(tuning.clone(), 77);
        let input = InputState {
            right: true,
            ..Default::default()
        };

        let mut first = None;
        for _ in 0..400 {
            let snapshot = tick(&mut session, &input, FRAME_MS);
            if snapshot.obstacles.is_empty() && first.is_none() {
                assert!(snapshot.distance < tuning.safe_start_distance);
            }
            let spawned = snapshot.events.iter().find_map(|e| match e {
                GameEvent::Spawned { world_x, .. } => Some((*world_x, snapshot.distance)),
                _ => None,
            });
            if spawned.is_some() {
                first = spawned;
                break;
            }
        }
        let (world_x, at_distance) = first.expect("an obstacle should spawn");
        assert!(at_distance >= tuning.safe_start_distance);
        assert!(world_x >= tuning.safe_start_distance);
        assert!(world_x <= tuning.safe_start_distance + tuning.max_gap);
    }

    #[test]
    fn test_spawns_stay_ahead_of_drifted_player() {
        let tuning = Tuning {
            safe_start_distance: 4000.0,
            ..Default::default()
        };
        let mut session = running(tuning.clone(), 5);
        let mut tracker = InputTracker::new();
        tracker.press(Action::Right, 0.0);

        let mut now = 0.0;
        let mut max_x: f32 = 0.0;
        let mut checked = 0;
        for i in 0..3000 {
            // Tap jump every other tick so each landing jumps straight again
            if i % 2 == 0 {
                tracker.press(Action::Jump, now);
            } else {
                tracker.release(Action::Jump);
            }
            now += FRAME_MS as f64;
            let snapshot = tick(&mut session, &tracker.snapshot(now), FRAME_MS);
            max_x = max_x.max(snapshot.player.pos.x);

            let front = snapshot.player.pos.x + snapshot.player.size.x;
            for event in &snapshot.events {
                if let GameEvent::Spawned { id, .. } = event {
                    let view = snapshot.obstacles.iter().find(|o| o.id == *id).unwrap();
                    assert!(
                        view.hazard.min.x > front,
                        "obstacle #{} spawned at {} behind player front {}",
                        id,
                        view.hazard.min.x,
                        front
                    );
                    checked += 1;
                }
            }
            if !snapshot.alive {
                break;
            }
        }

        assert_eq!(max_x, tuning.player_start_x + tuning.max_screen_drift);
        assert!(checked >= 1);
    }

    #[test]
    fn test_cleared_tracker_stops_scrolling() {
        let mut session = running(Tuning::default(), 1);
        let mut tracker = InputTracker::new();
        tracker.press(Action::Right, 0.0);
        let snapshot = tick(&mut session, &tracker.snapshot(FRAME_MS as f64), FRAME_MS);
        let scrolled = snapshot.distance;
        assert!(scrolled > 0.0);

        // Focus lost while the key was down: no key-up ever arrives
        tracker.clear();
        let snapshot = tick(&mut session, &tracker.snapshot(2.0 * FRAME_MS as f64), FRAME_MS);
        assert_eq!(snapshot.distance, scrolled);
        assert!(!tracker.is_held(Action::Right));
    }

    #[test]
    fn test_standing_in_pit_is_fatal() {
        let tuning = Tuning {
            player_width: 10.0,
            player_height: 10.0,
            player_visual_scale: 1.0,
            ..Default::default()
        };
        let mut session = running(tuning.clone(), 1);
        session
            .world
            .push_obstacle(Obstacle::pit(99, ObstacleKind::Spikes, 100.0, &tuning));

        let before = session.snapshot();
        assert!(before.obstacles[0].hazard.contains(&session.player.bounds()));

        let snapshot = tick(&mut session, &InputState::default(), FRAME_MS);
        assert_eq!(snapshot.phase, GamePhase::GameOver);
        assert!(!snapshot.alive);
        assert!(snapshot.events.contains(&GameEvent::Died {
            cause: DeathCause::Hazard {
                obstacle_id: 99,
                kind: ObstacleKind::Spikes
            }
        }));
    }

    #[test]
    fn test_jumping_over_pit_survives() {
        let tuning = Tuning::default();
        let mut session = running(tuning.clone(), 1);
        // Pit hazard starts right of the player's front edge
        session
            .world
            .push_obstacle(Obstacle::pit(1, ObstacleKind::Lava, 290.0, &tuning));

        let mut tracker = InputTracker::new();
        tracker.press(Action::Right, 0.0);
        tracker.press(Action::Jump, 500.0);
        let mut now = 500.0;
        for _ in 0..90 {
            now += FRAME_MS as f64;
            tick(&mut session, &tracker.snapshot(now), FRAME_MS);
            // Do not jump again after landing
            tracker.release(Action::Jump);
        }
        assert!(session.is_alive());
        assert!(session.player.on_ground);
    }

    #[test]
    fn test_game_over_freezes_simulation() {
        let tuning = Tuning {
            player_width: 10.0,
            player_height: 10.0,
            player_visual_scale: 1.0,
            ..Default::default()
        };
        let mut session = running(tuning.clone(), 1);
        session
            .world
            .push_obstacle(Obstacle::pit(1, ObstacleKind::Lava, 100.0, &tuning));
        tick(&mut session, &InputState::default(), FRAME_MS);
        assert_eq!(session.phase, GamePhase::GameOver);

        let ticks = session.time_ticks;
        let input = InputState {
            right: true,
            ..Default::default()
        };
        let snapshot = tick(&mut session, &input, FRAME_MS);
        assert_eq!(session.time_ticks, ticks);
        assert_eq!(snapshot.distance, 0.0);
        assert!(snapshot.events.is_empty());

        session.reset();
        assert!(session.world.obstacles().is_empty());
        let snapshot = tick(&mut session, &input, FRAME_MS);
        assert!(snapshot.alive);
        assert_eq!(snapshot.distance, tuning.scroll_speed);
    }

    #[test]
    fn test_not_started_is_render_only() {
        let mut session = Session::new(Tuning::default(), 1).unwrap();
        let input = InputState {
            right: true,
            ..Default::default()
        };
        let snapshot = tick(&mut session, &input, FRAME_MS);
        assert_eq!(snapshot.phase, GamePhase::NotStarted);
        assert_eq!(session.time_ticks, 0);
        assert_eq!(snapshot.distance, 0.0);
    }

    #[test]
    fn test_pending_assets_block_ticks() {
        let mut session = Session::new(Tuning::default(), 1)
            .unwrap()
            .with_pending_assets(2);
        session.start().unwrap();
        let input = InputState {
            right: true,
            ..Default::default()
        };

        tick(&mut session, &input, FRAME_MS);
        session.report_asset_loaded();
        tick(&mut session, &input, FRAME_MS);
        assert_eq!(session.distance(), 0.0);

        session.report_asset_loaded();
        tick(&mut session, &input, FRAME_MS);
        assert_eq!(session.distance(), session.tuning.scroll_speed);
    }

    #[test]
    fn test_stalled_frame_is_clamped() {
        let mut session = running(Tuning::default(), 1);
        tick(&mut session, &InputState::default(), 10_000.0);
        assert_eq!(session.time_ms, session.tuning.max_tick_ms as f64);

        tick(&mut session, &InputState::default(), f32::NAN);
        assert_eq!(session.time_ms, session.tuning.max_tick_ms as f64);
        assert_eq!(clamp_frame(-5.0, 50.0), 0.0);
        assert_eq!(clamp_frame(16.0, 50.0), 16.0);
    }

    #[test]
    fn test_half_rate_frames_scroll_double() {
        let mut session = running(Tuning::default(), 1);
        let input = InputState {
            right: true,
            ..Default::default()
        };
        tick(&mut session, &input, FRAME_MS * 2.0);
        assert!((session.distance() - 2.0 * session.tuning.scroll_speed).abs() < 1e-4);
    }

    #[test]
    fn test_free_fall_ends_run() {
        let tuning = Tuning {
            solid_ground: false,
            ..Default::default()
        };
        let mut session = running(tuning, 1);
        let mut cause = None;
        for _ in 0..200 {
            let snapshot = tick(&mut session, &InputState::default(), FRAME_MS);
            cause = snapshot.events.iter().find_map(|e| match e {
                GameEvent::Died { cause } => Some(*cause),
                _ => None,
            });
            if cause.is_some() {
                break;
            }
        }
        assert_eq!(cause, Some(DeathCause::FellOut));
        assert_eq!(session.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_determinism() {
        let inputs: Vec<InputState> = (0..600)
            .map(|i| InputState {
                right: i % 50 < 40,
                jump: i % 45 == 0,
                now_ms: i as f64 * FRAME_MS as f64,
                ..Default::default()
            })
            .collect();

        let mut a = running(Tuning::default(), 99_999);
        let mut b = running(Tuning::default(), 99_999);
        for input in &inputs {
            tick(&mut a, input, FRAME_MS);
            tick(&mut b, input, FRAME_MS);
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.distance(), b.distance());
        let xs = |s: &Session| s.world.obstacles().iter().map(|o| o.world_x).collect::<Vec<_>>();
        assert_eq!(xs(&a), xs(&b));
        assert_eq!(a.player.pos, b.player.pos);
    }
}
