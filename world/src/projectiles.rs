//! Homing projectiles and impact resolution.

use glam::Vec2;
use siege_grid_core::{
    EnemyId, Event, ProjectileId, ProjectilePayload, ProjectileSnapshot, TowerKind,
};

use crate::enemies::Enemy;

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) position: Vec2,
    pub(crate) target: EnemyId,
    /// Zero once the projectile has resolved; spent projectiles are purged
    /// at the start of the next pass.
    pub(crate) damage: f32,
    pub(crate) speed: f32,
    pub(crate) kind: TowerKind,
    pub(crate) payload: ProjectilePayload,
}

impl Projectile {
    pub(crate) fn is_spent(&self) -> bool {
        self.damage <= 0.0
    }

    fn spend(&mut self) {
        self.damage = 0.0;
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            position: self.position,
            target: self.target,
            kind: self.kind,
            spent: self.is_spent(),
        }
    }
}

/// Moves every projectile toward its target and resolves impacts.
///
/// Returns the money earned from kills during the pass.
pub(crate) fn resolve(
    projectiles: &mut Vec<Projectile>,
    enemies: &mut [Enemy],
    dt: f32,
    kill_reward: u32,
    out_events: &mut Vec<Event>,
) -> u32 {
    projectiles.retain(|projectile| !projectile.is_spent());

    let mut earned: u32 = 0;
    for projectile in projectiles.iter_mut() {
        let Some(target_index) = enemies
            .iter()
            .position(|enemy| enemy.id == projectile.target && enemy.is_alive())
        else {
            projectile.spend();
            continue;
        };

        let target_position = enemies[target_index].position;
        let offset = target_position - projectile.position;
        let distance = offset.length();
        let travel = projectile.speed * dt;

        if distance > travel {
            projectile.position += offset / distance * travel;
            continue;
        }

        projectile.position = target_position;
        let damage = projectile.damage;
        match projectile.payload {
            ProjectilePayload::Splash { radius } => {
                for enemy in enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
                    if enemy.position.distance(target_position) <= radius {
                        enemy.hp -= damage;
                    }
                }
            }
            ProjectilePayload::Slow { factor, duration } => {
                let target = &mut enemies[target_index];
                target.hp -= damage;
                target.apply_slow(factor, duration);
            }
            ProjectilePayload::Single => {
                enemies[target_index].hp -= damage;
            }
        }

        let target = &enemies[target_index];
        if !target.is_alive() {
            earned = earned.saturating_add(kill_reward);
            out_events.push(Event::EnemyKilled {
                enemy: target.id,
                reward: kill_reward,
            });
        }

        projectile.spend();
    }

    earned
}

#[cfg(test)]
mod tests {
    use super::*;
    use siege_grid_core::CellCoord;

    fn enemy_at(id: u32, column: u32, hp: f32) -> Enemy {
        Enemy::spawn(
            EnemyId::new(id),
            hp,
            2.0,
            vec![CellCoord::new(column, 0), CellCoord::new(column, 1)],
            false,
        )
    }

    fn projectile(target: u32, payload: ProjectilePayload, damage: f32) -> Projectile {
        Projectile {
            id: ProjectileId::new(0),
            position: Vec2::new(0.0, 5.0),
            target: EnemyId::new(target),
            damage,
            speed: 10.0,
            kind: TowerKind::Primary,
            payload,
        }
    }

    #[test]
    fn missing_target_spends_projectile_without_effect() {
        let mut enemies = vec![enemy_at(1, 0, 30.0)];
        let mut projectiles = vec![projectile(9, ProjectilePayload::Single, 20.0)];
        let mut events = Vec::new();

        let earned = resolve(&mut projectiles, &mut enemies, 1.0, 10, &mut events);

        assert_eq!(earned, 0);
        assert!(projectiles[0].is_spent());
        assert_eq!(enemies[0].hp, 30.0);
        assert!(events.is_empty());
    }

    #[test]
    fn spent_projectiles_are_purged_next_pass() {
        let mut enemies = vec![enemy_at(1, 0, 30.0)];
        let mut projectiles = vec![projectile(9, ProjectilePayload::Single, 20.0)];
        let mut events = Vec::new();

        let _ = resolve(&mut projectiles, &mut enemies, 0.1, 10, &mut events);
        assert_eq!(projectiles.len(), 1);
        let _ = resolve(&mut projectiles, &mut enemies, 0.1, 10, &mut events);
        assert!(projectiles.is_empty());
    }

    #[test]
    fn projectile_homes_when_out_of_reach() {
        let mut enemies = vec![enemy_at(1, 0, 30.0)];
        let mut projectiles = vec![projectile(1, ProjectilePayload::Single, 20.0)];
        let mut events = Vec::new();

        let _ = resolve(&mut projectiles, &mut enemies, 0.1, 10, &mut events);

        assert!((projectiles[0].position.y - 4.0).abs() < 1e-5);
        assert!(!projectiles[0].is_spent());
        assert_eq!(enemies[0].hp, 30.0);
    }

    #[test]
    fn lethal_hit_grants_reward_once() {
        let mut enemies = vec![enemy_at(1, 0, 15.0)];
        let mut projectiles = vec![
            projectile(1, ProjectilePayload::Single, 20.0),
            projectile(1, ProjectilePayload::Single, 20.0),
        ];
        let mut events = Vec::new();

        let earned = resolve(&mut projectiles, &mut enemies, 1.0, 10, &mut events);

        assert_eq!(earned, 10);
        assert_eq!(
            events,
            vec![Event::EnemyKilled {
                enemy: EnemyId::new(1),
                reward: 10
            }]
        );
        assert!(projectiles.iter().all(Projectile::is_spent));
    }

    #[test]
    fn splash_hits_every_enemy_in_radius() {
        let mut enemies = vec![
            enemy_at(1, 0, 100.0),
            enemy_at(2, 2, 100.0),
            enemy_at(3, 3, 100.0),
        ];
        let mut projectiles = vec![projectile(1, ProjectilePayload::Splash { radius: 2.5 }, 15.0)];
        let mut events = Vec::new();

        let _ = resolve(&mut projectiles, &mut enemies, 1.0, 10, &mut events);

        assert_eq!(enemies[0].hp, 85.0);
        assert_eq!(enemies[1].hp, 85.0);
        assert_eq!(enemies[2].hp, 100.0);
    }

    #[test]
    fn slow_hit_damages_and_slows_target_only() {
        let mut enemies = vec![enemy_at(1, 0, 100.0), enemy_at(2, 0, 100.0)];
        let mut projectiles = vec![projectile(
            2,
            ProjectilePayload::Slow {
                factor: 0.6,
                duration: 1.5,
            },
            5.0,
        )];
        let mut events = Vec::new();

        let _ = resolve(&mut projectiles, &mut enemies, 1.0, 10, &mut events);

        assert_eq!(enemies[0].hp, 100.0);
        assert!(!enemies[0].is_slowed);
        assert_eq!(enemies[1].hp, 95.0);
        assert!(enemies[1].is_slowed);
        assert!((enemies[1].speed - 1.2).abs() < 1e-5);
    }
}
