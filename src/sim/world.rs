//! Scrolling world
//!
//! Persistent obstacle state is world space only. Screen-space boxes are a
//! per-tick projection (`screen_x = world_x - distance`) that is never stored.

use super::collision::{Aabb, hazard_box};
use super::snapshot::ObstacleView;
use super::spawner::ObstacleSpawner;
use super::state::Obstacle;
use crate::tuning::Tuning;

#[derive(Debug, Clone)]
pub struct World {
    /// Cumulative scrolled distance; never decreases
    distance: f32,
    /// Obstacles in spawn order (and therefore increasing world x)
    obstacles: Vec<Obstacle>,
    spawner: ObstacleSpawner,
}

impl World {
    pub fn new(tuning: &Tuning, seed: u64) -> Self {
        Self {
            distance: 0.0,
            obstacles: Vec::new(),
            spawner: ObstacleSpawner::new(tuning, seed),
        }
    }

    pub fn reset(&mut self, tuning: &Tuning) {
        self.distance = 0.0;
        self.obstacles.clear();
        self.spawner.reset(tuning);
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[cfg(test)]
    pub(crate) fn spawner(&self) -> &ObstacleSpawner {
        &self.spawner
    }

    /// Scroll forward if the player is moving, then give the spawner its chance
    ///
    /// Returns the obstacle spawned this tick, if any.
    pub fn advance(&mut self, moving: bool, step: f32, time_ms: f64, tuning: &Tuning) -> Option<&Obstacle> {
        if moving {
            self.distance += tuning.scroll_speed * step;
        }
        let obstacle = self.spawner.maybe_spawn(self.distance, time_ms, tuning)?;
        self.obstacles.push(obstacle);
        self.obstacles.last()
    }

    /// Screen-space view of every obstacle at `time_ms`
    ///
    /// Ghost heights are evaluated here exactly once per call; collision and
    /// rendering share the returned boxes.
    pub fn project(&self, time_ms: f64, tuning: &Tuning) -> Vec<ObstacleView> {
        self.obstacles
            .iter()
            .map(|o| {
                let screen_y = o.screen_y(time_ms, tuning);
                let sprite = Aabb::from_xywh(o.screen_x(self.distance), screen_y, o.size.x, o.size.y);
                ObstacleView {
                    id: o.id,
                    kind: o.kind,
                    world_x: o.world_x,
                    screen_y,
                    sprite,
                    hazard: hazard_box(o.kind, &sprite, tuning),
                }
            })
            .collect()
    }

    /// Drop obstacles whose right edge is more than `margin` behind `player_x`
    ///
    /// Returns how many were removed.
    pub fn prune(&mut self, player_x: f32, margin: f32) -> usize {
        let before = self.obstacles.len();
        let distance = self.distance;
        // Spawn order is world-x order, so the stale ones form a prefix
        let stale = self
            .obstacles
            .iter()
            .take_while(|o| o.screen_x(distance) + o.size.x < player_x - margin)
            .count();
        self.obstacles.drain(..stale);
        before - self.obstacles.len()
    }

    #[cfg(test)]
    pub(crate) fn push_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }
}
