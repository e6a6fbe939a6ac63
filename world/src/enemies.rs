//! Enemy state and per-tick route following.

use glam::Vec2;
use siege_grid_core::{CellCoord, EnemyId, EnemySnapshot};

/// Outcome of advancing a single enemy for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stride {
    /// The enemy is still on the grid.
    Walking,
    /// The enemy stepped past the last node of its route.
    ReachedEnd,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) position: Vec2,
    pub(crate) target_index: usize,
    pub(crate) hp: f32,
    pub(crate) max_hp: f32,
    pub(crate) speed: f32,
    base_speed: f32,
    pub(crate) is_slowed: bool,
    slow_timer: f32,
    path: Vec<CellCoord>,
    pub(crate) is_elite: bool,
    pub(crate) frozen: bool,
}

impl Enemy {
    pub(crate) fn spawn(
        id: EnemyId,
        hp: f32,
        base_speed: f32,
        path: Vec<CellCoord>,
        is_elite: bool,
    ) -> Self {
        let position = path.first().map_or(Vec2::ZERO, |cell| cell.to_point());
        Self {
            id,
            position,
            target_index: 0,
            hp,
            max_hp: hp,
            speed: base_speed,
            base_speed,
            is_slowed: false,
            slow_timer: 0.0,
            path,
            is_elite,
            frozen: false,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Moves the enemy along its route by `speed * dt`.
    ///
    /// Nodes within reach are snapped to rather than overshot, so an enemy
    /// advances at most one node per tick.
    pub(crate) fn advance(&mut self, dt: f32) -> Stride {
        if self.is_slowed {
            self.slow_timer -= dt;
            if self.slow_timer <= 0.0 {
                self.is_slowed = false;
                self.slow_timer = 0.0;
                self.speed = self.base_speed;
            }
        }

        if self.frozen {
            return Stride::Walking;
        }

        let Some(target) = self.path.get(self.target_index).copied() else {
            return Stride::Walking;
        };

        let target = target.to_point();
        let offset = target - self.position;
        let distance = offset.length();
        let travel = self.speed * dt;

        if distance <= travel {
            self.position = target;
            self.target_index += 1;
            if self.target_index >= self.path.len() {
                self.hp = 0.0;
                return Stride::ReachedEnd;
            }
        } else {
            self.position += offset / distance * travel;
        }

        Stride::Walking
    }

    pub(crate) fn apply_slow(&mut self, factor: f32, duration: f32) {
        self.is_slowed = true;
        self.slow_timer = duration;
        self.speed = self.base_speed * factor;
    }

    /// Replaces the route with one starting at the enemy's current cell.
    pub(crate) fn reroute(&mut self, path: Vec<CellCoord>) {
        self.path = path;
        self.target_index = 0;
        self.frozen = false;
    }

    pub(crate) fn path(&self) -> &[CellCoord] {
        &self.path
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            position: self.position,
            hp: self.hp,
            max_hp: self.max_hp,
            speed: self.speed,
            is_slowed: self.is_slowed,
            is_elite: self.is_elite,
            frozen: self.frozen,
            target_index: self.target_index,
        }
    }
}
