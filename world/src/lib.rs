#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Siege Grid.
//!
//! The world owns the grid, the committed route, the live enemy, tower and
//! projectile collections, and the defender's money and lives. It changes
//! only through [`apply`]; everything else reads it through [`query`].

mod enemies;
mod grid;
mod projectiles;
mod towers;

use rand::Rng;
use siege_grid_core::{
    CellCoord, Command, EnemyId, Event, GameConfig, PlacementError, ProjectileId,
    RerouteFailurePolicy, TowerId, TowerKind,
};
use siege_grid_system_pathfinding::{PathError, PathPlanner};
use tracing::{debug, info, warn};

pub use grid::{Endpoints, Grid, LayoutError};

use enemies::{Enemy, Stride};
use projectiles::Projectile;
use towers::TowerRegistry;

/// Represents the authoritative Siege Grid world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    grid: Grid,
    planner: PathPlanner,
    route: Vec<CellCoord>,
    towers: TowerRegistry,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    money: u32,
    lives: u32,
    next_enemy_id: u32,
    next_projectile_id: u32,
}

impl World {
    /// Creates a world whose start and end are drawn from the configured ring.
    pub fn new<R>(config: GameConfig, rng: &mut R) -> Result<Self, LayoutError>
    where
        R: Rng + ?Sized,
    {
        let mut grid = Grid::new(config.grid_size);
        let _ = grid.place_endpoints(&config.layout, rng)?;
        Self::from_grid(config, grid)
    }

    /// Creates a world with explicit start and end cells.
    pub fn with_endpoints(
        config: GameConfig,
        start: CellCoord,
        end: CellCoord,
    ) -> Result<Self, LayoutError> {
        let mut grid = Grid::new(config.grid_size);
        grid.set_endpoints(start, end)?;
        Self::from_grid(config, grid)
    }

    fn from_grid(config: GameConfig, grid: Grid) -> Result<Self, LayoutError> {
        let mut world = Self {
            money: config.initial_money,
            lives: config.initial_lives,
            config,
            grid,
            planner: PathPlanner::new(),
            route: Vec::new(),
            towers: TowerRegistry::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            next_enemy_id: 0,
            next_projectile_id: 0,
        };

        let route = world.plan_main_route().map_err(LayoutError::NoRoute)?;
        world.grid.mark_route(&route);
        world.route = route;
        Ok(world)
    }

    fn plan_main_route(&mut self) -> Result<Vec<CellCoord>, PathError> {
        let Some(endpoints) = self.grid.endpoints() else {
            return Err(PathError::Unreachable);
        };
        self.planner
            .find_path(self.grid.wall_view(), endpoints.start, endpoints.end)
    }

    fn commit_route(&mut self, route: Vec<CellCoord>, out_events: &mut Vec<Event>) {
        self.grid.mark_route(&route);
        out_events.push(Event::RouteChanged {
            length: route.len(),
        });
        self.route = route;
    }

    fn reroute_enemies(&mut self, out_events: &mut Vec<Event>) {
        let Some(endpoints) = self.grid.endpoints() else {
            return;
        };
        let side = self.grid.side();
        let policy = self.config.reroute_failure;

        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
            let Some(cell) = CellCoord::nearest_to(enemy.position, side) else {
                continue;
            };

            match self
                .planner
                .find_path(self.grid.wall_view(), cell, endpoints.end)
            {
                Ok(path) => enemy.reroute(path),
                Err(error) => {
                    debug!(enemy = enemy.id.get(), ?cell, %error, "reroute failed");
                    if policy == RerouteFailurePolicy::Freeze {
                        enemy.frozen = true;
                    }
                    out_events.push(Event::EnemyRerouteFailed { enemy: enemy.id });
                }
            }
        }
    }

    fn try_place(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
    ) -> Result<(TowerId, Vec<CellCoord>), PlacementError> {
        if self.lives == 0 {
            return Err(PlacementError::GameOver);
        }
        if !self.grid.contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if self.grid.is_endpoint(cell) {
            return Err(PlacementError::ReservedCell);
        }
        if self.grid.is_wall(cell) {
            return Err(PlacementError::Occupied);
        }

        let cost = kind.cost();
        if self.money < cost {
            return Err(PlacementError::InsufficientFunds {
                required: cost,
                available: self.money,
            });
        }

        let _ = self.grid.set_wall(cell, true);
        let route = match self.plan_main_route() {
            Ok(route) => route,
            Err(error) => {
                let _ = self.grid.set_wall(cell, false);
                debug!(?cell, %error, "placement would sever the route");
                return Err(PlacementError::BlocksPath);
            }
        };

        let tower = self.towers.insert(kind, cell);
        let _ = self.grid.set_occupant(cell, tower);
        self.money -= cost;
        Ok((tower, route))
    }

    fn place_tower(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<TowerId, PlacementError> {
        match self.try_place(kind, cell) {
            Ok((tower, route)) => {
                out_events.push(Event::TowerPlaced { tower, kind, cell });
                self.commit_route(route, out_events);
                self.reroute_enemies(out_events);
                Ok(tower)
            }
            Err(reason) => {
                debug!(?kind, ?cell, %reason, "placement rejected");
                out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
                Err(reason)
            }
        }
    }

    fn remove_structure(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) -> Option<u32> {
        let tower_id = self.grid.occupant(cell)?;
        let tower = self.towers.remove(tower_id)?;

        let _ = self.grid.set_wall(cell, false);
        let refund = tower.kind.refund();
        self.money = self.money.saturating_add(refund);
        out_events.push(Event::StructureRemoved {
            tower: tower_id,
            kind: tower.kind,
            cell,
            refund,
        });

        match self.plan_main_route() {
            Ok(route) => {
                self.commit_route(route, out_events);
                self.reroute_enemies(out_events);
            }
            Err(error) => warn!(?cell, %error, "no route after removal"),
        }
        Some(refund)
    }

    fn spawn_enemy(&mut self, hp: f32, elite: bool, out_events: &mut Vec<Event>) {
        if self.route.is_empty() {
            warn!("cannot spawn enemy without a committed route");
            return;
        }

        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        self.enemies.push(Enemy::spawn(
            id,
            hp,
            self.config.enemy.base_speed,
            self.route.clone(),
            elite,
        ));
        debug!(enemy = id.get(), hp, elite, "enemy spawned");
        out_events.push(Event::EnemySpawned {
            enemy: id,
            hp,
            elite,
        });
    }

    fn advance_enemies(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let lives_before = self.lives;

        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
            if enemy.advance(dt) == Stride::ReachedEnd {
                self.lives = self.lives.saturating_sub(1);
                out_events.push(Event::EnemyReachedEnd {
                    enemy: enemy.id,
                    lives_remaining: self.lives,
                });
            }
        }

        self.enemies.retain(Enemy::is_alive);

        if lives_before > 0 && self.lives == 0 {
            info!("defender ran out of lives");
            out_events.push(Event::DefenderDefeated);
        }

        for tower in self.towers.iter_mut() {
            tower.last_fired += dt;
        }
    }

    fn fire_projectile(&mut self, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let Some(position) = self
            .enemies
            .iter()
            .find(|enemy| enemy.id == target && enemy.is_alive())
            .map(|enemy| enemy.position)
        else {
            debug!(tower = tower.get(), target = target.get(), "fire target missing");
            return;
        };

        let speed = self.config.projectile_speed;
        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        let Some(payload) = state.payload() else {
            return;
        };
        if state.last_fired < 1.0 / state.fire_rate {
            return;
        }
        if state.cell.to_point().distance(position) > state.range {
            return;
        }

        state.last_fired = 0.0;
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        self.projectiles.push(Projectile {
            id,
            position: state.cell.to_point(),
            target,
            damage: state.damage,
            speed,
            kind: state.kind,
            payload,
        });
        out_events.push(Event::ProjectileFired {
            projectile: id,
            tower,
            target,
        });
    }

    fn advance_projectiles(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let earned = projectiles::resolve(
            &mut self.projectiles,
            &mut self.enemies,
            dt,
            self.config.enemy.kill_reward,
            out_events,
        );
        self.money = self.money.saturating_add(earned);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.advance_enemies(dt.as_secs_f32(), out_events);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnEnemy { hp, elite } => world.spawn_enemy(hp, elite, out_events),
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::AdvanceProjectiles { dt } => {
            world.advance_projectiles(dt.as_secs_f32(), out_events);
        }
        Command::PlaceTower { kind, cell } => {
            let _ = world.place_tower(kind, cell, out_events);
        }
        Command::RemoveStructure { cell } => {
            let _ = world.remove_structure(cell, out_events);
        }
    }
}

/// Places a structure and reports the outcome directly.
///
/// Emits the same events as [`Command::PlaceTower`] passed to [`apply`].
pub fn place(
    world: &mut World,
    kind: TowerKind,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<TowerId, PlacementError> {
    world.place_tower(kind, cell, out_events)
}

/// Removes the structure on `cell` and returns its refund.
///
/// Emits the same events as [`Command::RemoveStructure`] passed to [`apply`].
/// Empty cells yield `None` and leave the world untouched.
pub fn remove(world: &mut World, cell: CellCoord, out_events: &mut Vec<Event>) -> Option<u32> {
    world.remove_structure(cell, out_events)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Endpoints, Grid, World};
    use siege_grid_core::{
        CellCoord, CellSnapshot, EnemyId, EnemyView, ProjectileSnapshot, TowerId, TowerView,
    };

    /// Provides read-only access to the grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Start and end cells of the layout.
    #[must_use]
    pub fn endpoints(world: &World) -> Option<Endpoints> {
        world.grid.endpoints()
    }

    /// Snapshot of every grid cell in row-major order.
    #[must_use]
    pub fn cells(world: &World) -> Vec<CellSnapshot> {
        world.grid.snapshot()
    }

    /// Committed start-to-end route handed to newly spawned enemies.
    #[must_use]
    pub fn route(world: &World) -> &[CellCoord] {
        &world.route
    }

    /// Route currently followed by a live enemy.
    #[must_use]
    pub fn enemy_route(world: &World, enemy: EnemyId) -> Option<&[CellCoord]> {
        world
            .enemies
            .iter()
            .find(|candidate| candidate.id == enemy)
            .map(|candidate| candidate.path())
    }

    /// Captures a read-only view of the live enemies in collection order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .filter(|enemy| enemy.is_alive())
                .map(|enemy| enemy.snapshot())
                .collect(),
        )
    }

    /// Number of enemies with hit points left.
    #[must_use]
    pub fn alive_enemies(world: &World) -> usize {
        world.enemies.iter().filter(|enemy| enemy.is_alive()).count()
    }

    /// Captures a read-only view of every placed structure.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Total damage per second of every deployed weapon.
    #[must_use]
    pub fn deployed_dps(world: &World) -> f32 {
        world.towers.deployed_dps()
    }

    /// Structure occupying the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.grid.occupant(cell)
    }

    /// Snapshots of every projectile, including those spent this tick.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Money held by the defender.
    #[must_use]
    pub fn money(world: &World) -> u32 {
        world.money
    }

    /// Lives held by the defender.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use std::time::Duration;

    fn world_with(start: CellCoord, end: CellCoord) -> World {
        World::with_endpoints(GameConfig::default(), start, end).expect("layout")
    }

    #[test]
    fn fresh_world_commits_shortest_route() {
        let world = world_with(CellCoord::new(1, 1), CellCoord::new(18, 18));

        assert_eq!(query::route(&world).len(), 35);
        assert!(query::grid(&world).is_path(CellCoord::new(1, 1)));
        assert_eq!(query::money(&world), 100);
        assert_eq!(query::lives(&world), 20);
    }

    #[test]
    fn spawned_enemy_follows_committed_route() {
        let mut world = world_with(CellCoord::new(1, 1), CellCoord::new(1, 5));
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnEnemy {
                hp: 50.0,
                elite: false,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );

        let view = query::enemy_view(&world);
        let enemy = view.iter().next().expect("enemy");
        assert_eq!(enemy.position, Vec2::new(1.0, 1.0));
        assert_eq!(enemy.target_index, 1);

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );
        let view = query::enemy_view(&world);
        let enemy = view.iter().next().expect("enemy");
        assert!((enemy.position.y - 1.5).abs() < 1e-5);
    }

    #[test]
    fn towers_accumulate_cooldown_each_tick() {
        let mut world = world_with(CellCoord::new(1, 1), CellCoord::new(1, 5));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Primary,
                cell: CellCoord::new(3, 3),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(500),
            },
            &mut events,
        );

        let tower = query::tower_view(&world).into_vec()[0];
        assert!((tower.last_fired - 0.5).abs() < 1e-5);
        assert!(!tower.ready_to_fire());
    }

    #[test]
    fn fire_ignores_towers_that_are_not_ready() {
        let mut world = world_with(CellCoord::new(1, 1), CellCoord::new(1, 5));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Primary,
                cell: CellCoord::new(2, 2),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                hp: 50.0,
                elite: false,
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::FireProjectile {
                tower: TowerId::new(0),
                target: EnemyId::new(0),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::projectiles(&world).is_empty());
    }
}
