#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks targets for ready towers from world snapshots.

use glam::Vec2;
use siege_grid_core::{Command, EnemyId, EnemyView, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidates: Vec<Candidate>,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    id: EnemyId,
    position: Vec2,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a fire command for every ready tower with a live enemy in range.
    ///
    /// Each tower picks the first enemy in collection order whose Euclidean
    /// distance from the tower's cell does not exceed its range. Towers are
    /// visited in identifier order.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<Command>) {
        self.prepare_candidates(enemies);
        if self.candidates.is_empty() {
            return;
        }

        for tower in towers.iter().filter(|tower| tower.ready_to_fire()) {
            let origin = tower.cell.to_point();
            let target = self
                .candidates
                .iter()
                .find(|candidate| candidate.position.distance(origin) <= tower.range);

            if let Some(candidate) = target {
                out.push(Command::FireProjectile {
                    tower: tower.id,
                    target: candidate.id,
                });
            }
        }
    }

    fn prepare_candidates(&mut self, enemies: &EnemyView) {
        self.candidates.clear();
        self.candidates.reserve(enemies.len());
        self.candidates.extend(
            enemies
                .iter()
                .filter(|enemy| enemy.hp > 0.0)
                .map(|enemy| Candidate {
                    id: enemy.id,
                    position: enemy.position,
                }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siege_grid_core::{CellCoord, EnemySnapshot, TowerId, TowerKind, TowerSnapshot};

    fn enemy(id: u32, x: f32, y: f32, hp: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            position: Vec2::new(x, y),
            hp,
            max_hp: 100.0,
            speed: 2.0,
            is_slowed: false,
            is_elite: false,
            frozen: false,
            target_index: 0,
        }
    }

    fn tower(id: u32, kind: TowerKind, cell: CellCoord, last_fired: f32) -> TowerSnapshot {
        let stats = kind.stats();
        let weapon = stats.weapon;
        TowerSnapshot {
            id: TowerId::new(id),
            kind,
            cell,
            range: weapon.map_or(0.0, |weapon| weapon.range),
            damage: weapon.map_or(0.0, |weapon| weapon.damage),
            fire_rate: weapon.map_or(0.0, |weapon| weapon.fire_rate),
            last_fired,
            cost: stats.cost,
        }
    }

    #[test]
    fn first_enemy_in_collection_order_wins_over_nearest() {
        let towers = TowerView::from_snapshots(vec![tower(
            0,
            TowerKind::Primary,
            CellCoord::new(0, 0),
            5.0,
        )]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(4, 4.0, 0.0, 50.0),
            enemy(2, 1.0, 0.0, 50.0),
        ]);
        let mut targeting = TowerTargeting::new();
        let mut out = Vec::new();

        targeting.handle(&towers, &enemies, &mut out);

        assert_eq!(
            out,
            vec![Command::FireProjectile {
                tower: TowerId::new(0),
                target: EnemyId::new(4),
            }]
        );
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let towers = TowerView::from_snapshots(vec![tower(
            0,
            TowerKind::Slow,
            CellCoord::new(0, 0),
            5.0,
        )]);
        let inside = EnemyView::from_snapshots(vec![enemy(1, 4.0, 0.0, 50.0)]);
        let outside = EnemyView::from_snapshots(vec![enemy(1, 4.0, 0.5, 50.0)]);
        let mut targeting = TowerTargeting::new();
        let mut out = Vec::new();

        targeting.handle(&towers, &inside, &mut out);
        assert_eq!(out.len(), 1);

        out.clear();
        targeting.handle(&towers, &outside, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn cooling_towers_and_walls_hold_fire() {
        let towers = TowerView::from_snapshots(vec![
            tower(0, TowerKind::Primary, CellCoord::new(0, 0), 1.0),
            tower(1, TowerKind::Wall, CellCoord::new(1, 0), 100.0),
            tower(2, TowerKind::Area, CellCoord::new(2, 0), 1.0),
        ]);
        let enemies = EnemyView::from_snapshots(vec![enemy(7, 1.0, 1.0, 50.0)]);
        let mut targeting = TowerTargeting::new();
        let mut out = Vec::new();

        targeting.handle(&towers, &enemies, &mut out);

        assert_eq!(
            out,
            vec![Command::FireProjectile {
                tower: TowerId::new(2),
                target: EnemyId::new(7),
            }]
        );
    }

    #[test]
    fn dead_enemies_are_never_targeted() {
        let towers = TowerView::from_snapshots(vec![tower(
            0,
            TowerKind::Primary,
            CellCoord::new(0, 0),
            5.0,
        )]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(1, 0.0, 1.0, 0.0),
            enemy(2, 0.0, 2.0, 10.0),
        ]);
        let mut targeting = TowerTargeting::new();
        let mut out = Vec::new();

        targeting.handle(&towers, &enemies, &mut out);

        assert_eq!(
            out,
            vec![Command::FireProjectile {
                tower: TowerId::new(0),
                target: EnemyId::new(2),
            }]
        );
    }
}
