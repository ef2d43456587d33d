//! Procedural obstacle generation
//!
//! A single threshold walks ahead of the scroll distance. Each time the
//! distance reaches it, one obstacle is placed `spawn_lead` beyond the
//! threshold and the threshold advances by a gap drawn from
//! `[min_gap, max_gap]`. Consecutive obstacles are therefore spaced by exactly
//! the drawn gap, and none sits before `safe_start_distance`.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Obstacle, ObstacleKind};
use crate::tuning::Tuning;

#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    rng: Pcg32,
    /// Distance at which the next obstacle is placed
    next_spawn_x: f32,
    /// World x of the most recently placed obstacle
    last_spawn_x: Option<f32>,
    next_id: u32,
}

impl ObstacleSpawner {
    pub fn new(tuning: &Tuning, seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            next_spawn_x: tuning.safe_start_distance,
            last_spawn_x: None,
            next_id: 1,
        }
    }

    /// Back to the safe runway; the RNG stream continues
    pub fn reset(&mut self, tuning: &Tuning) {
        self.next_spawn_x = tuning.safe_start_distance;
        self.last_spawn_x = None;
    }

    #[cfg(test)]
    pub(crate) fn next_spawn_x(&self) -> f32 {
        self.next_spawn_x
    }

    #[cfg(test)]
    pub(crate) fn last_spawn_x(&self) -> Option<f32> {
        self.last_spawn_x
    }

    /// Place at most one obstacle for the current scroll distance
    pub fn maybe_spawn(&mut self, distance: f32, time_ms: f64, tuning: &Tuning) -> Option<Obstacle> {
        if distance < self.next_spawn_x {
            return None;
        }

        let world_x = self.next_spawn_x + tuning.spawn_lead;
        if let Some(last) = self.last_spawn_x {
            assert!(world_x > last, "spawn x must strictly increase ({last} -> {world_x})");
        }

        let kind = ObstacleKind::ALL[self.rng.random_range(0..ObstacleKind::ALL.len())];
        let id = self.next_id;
        self.next_id += 1;

        let obstacle = if kind.is_floating() {
            let lift = tuning.ghost_base_height + self.rng.random::<f32>() * tuning.ghost_height_band;
            let phase = time_ms + (self.rng.random::<f32>() * tuning.ghost_phase_spread_ms) as f64;
            Obstacle::ghost(id, world_x, tuning.ground_y() - lift, phase, tuning)
        } else {
            Obstacle::pit(id, kind, world_x, tuning)
        };

        let gap = self.draw_gap(tuning);
        self.next_spawn_x += gap;
        self.last_spawn_x = Some(world_x);

        log::debug!(
            "Spawned {:?} #{} at x={:.0} (next threshold {:.0})",
            kind,
            id,
            world_x,
            self.next_spawn_x
        );
        Some(obstacle)
    }

    fn draw_gap(&mut self, tuning: &Tuning) -> f32 {
        if tuning.max_gap > tuning.min_gap {
            self.rng.random_range(tuning.min_gap..=tuning.max_gap)
        } else {
            tuning.min_gap
        }
    }
}
