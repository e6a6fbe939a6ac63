use std::time::Duration;

use glam::Vec2;
use siege_grid_core::{
    CellCoord, Command, EnemyId, Event, GameConfig, PlacementError, RerouteFailurePolicy, TowerId,
    TowerKind,
};
use siege_grid_world::{self as world, query, World};

fn column_world(config: GameConfig, end_row: u32) -> World {
    World::with_endpoints(config, CellCoord::new(1, 1), CellCoord::new(1, end_row)).expect("layout")
}

fn run(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn tick(millis: u64) -> Command {
    Command::Tick {
        dt: Duration::from_millis(millis),
    }
}

fn spawn(hp: f32) -> Command {
    Command::SpawnEnemy { hp, elite: false }
}

#[test]
fn escaping_enemy_costs_one_life() {
    let mut world = column_world(GameConfig::default(), 3);

    let events = run(&mut world, vec![spawn(50.0), tick(0), tick(500), tick(500)]);

    assert!(events.contains(&Event::EnemyReachedEnd {
        enemy: EnemyId::new(0),
        lives_remaining: 19,
    }));
    assert_eq!(query::lives(&world), 19);
    assert_eq!(query::alive_enemies(&world), 0);
    assert!(query::enemy_view(&world).is_empty());
}

#[test]
fn losing_the_last_life_defeats_the_defender() {
    let config = GameConfig {
        initial_lives: 1,
        ..GameConfig::default()
    };
    let mut world = column_world(config, 3);

    let events = run(
        &mut world,
        vec![spawn(50.0), spawn(50.0), tick(0), tick(500), tick(500)],
    );

    assert_eq!(query::lives(&world), 0);
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::DefenderDefeated))
            .count(),
        1
    );

    let events = run(
        &mut world,
        vec![Command::PlaceTower {
            kind: TowerKind::Wall,
            cell: CellCoord::new(5, 5),
        }],
    );
    assert!(events.contains(&Event::TowerPlacementRejected {
        kind: TowerKind::Wall,
        cell: CellCoord::new(5, 5),
        reason: PlacementError::GameOver,
    }));
}

#[test]
fn ready_tower_kills_enemy_and_earns_reward() {
    let mut world = column_world(GameConfig::default(), 5);
    let _ = run(
        &mut world,
        vec![
            Command::PlaceTower {
                kind: TowerKind::Primary,
                cell: CellCoord::new(2, 1),
            },
            tick(2_000),
            spawn(20.0),
        ],
    );
    assert_eq!(query::money(&world), 50);

    let events = run(
        &mut world,
        vec![
            Command::FireProjectile {
                tower: TowerId::new(0),
                target: EnemyId::new(0),
            },
            Command::AdvanceProjectiles {
                dt: Duration::from_millis(1_000),
            },
        ],
    );

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ProjectileFired { .. })));
    assert!(events.contains(&Event::EnemyKilled {
        enemy: EnemyId::new(0),
        reward: 10,
    }));
    assert_eq!(query::money(&world), 60);
    assert_eq!(query::alive_enemies(&world), 0);
    assert_eq!(query::tower_view(&world).into_vec()[0].last_fired, 0.0);

    let projectiles = query::projectiles(&world);
    assert_eq!(projectiles.len(), 1);
    assert!(projectiles[0].spent);

    let _ = run(
        &mut world,
        vec![Command::AdvanceProjectiles {
            dt: Duration::from_millis(16),
        }],
    );
    assert!(query::projectiles(&world).is_empty());
}

fn enclose_enemy(policy: RerouteFailurePolicy) -> (World, Vec<Event>) {
    let config = GameConfig {
        reroute_failure: policy,
        ..GameConfig::default()
    };
    let mut world = column_world(config, 10);
    let _ = run(&mut world, vec![spawn(50.0), tick(0), tick(500), tick(500)]);

    let enemy = query::enemy_view(&world).into_vec().remove(0);
    assert_eq!(enemy.position, Vec2::new(1.0, 3.0));

    let mut events = Vec::new();
    for cell in [
        CellCoord::new(0, 3),
        CellCoord::new(2, 3),
        CellCoord::new(1, 4),
        CellCoord::new(1, 2),
    ] {
        world::apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Wall,
                cell,
            },
            &mut events,
        );
    }
    (world, events)
}

#[test]
fn failed_reroute_keeps_previous_route_by_default() {
    let (mut world, events) = enclose_enemy(RerouteFailurePolicy::KeepRoute);

    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::EnemyRerouteFailed { .. }))
            .count(),
        1
    );
    assert!(events
        .iter()
        .all(|event| !matches!(event, Event::TowerPlacementRejected { .. })));

    let route = query::enemy_route(&world, EnemyId::new(0)).expect("route");
    assert_eq!(route.last(), Some(&CellCoord::new(1, 10)));

    let _ = run(&mut world, vec![tick(250), tick(250)]);
    let enemy = query::enemy_view(&world).into_vec().remove(0);
    assert!(!enemy.frozen);
    assert_ne!(enemy.position, Vec2::new(1.0, 3.0));
}

#[test]
fn failed_reroute_freezes_enemy_when_configured() {
    let (mut world, events) = enclose_enemy(RerouteFailurePolicy::Freeze);

    assert!(events.contains(&Event::EnemyRerouteFailed {
        enemy: EnemyId::new(0)
    }));

    let _ = run(&mut world, vec![tick(250), tick(250)]);
    let enemy = query::enemy_view(&world).into_vec().remove(0);
    assert!(enemy.frozen);
    assert_eq!(enemy.position, Vec2::new(1.0, 3.0));

    let _ = run(
        &mut world,
        vec![Command::RemoveStructure {
            cell: CellCoord::new(1, 4),
        }],
    );
    let enemy = query::enemy_view(&world).into_vec().remove(0);
    assert!(!enemy.frozen);
    assert_eq!(enemy.target_index, 0);
}

#[test]
fn successful_reroute_restarts_from_nearest_cell() {
    let mut world = column_world(GameConfig::default(), 10);
    let _ = run(
        &mut world,
        vec![
            spawn(50.0),
            tick(0),
            tick(500),
            tick(200),
            Command::PlaceTower {
                kind: TowerKind::Wall,
                cell: CellCoord::new(1, 5),
            },
        ],
    );

    let route = query::enemy_route(&world, EnemyId::new(0)).expect("route");
    assert_eq!(route.first(), Some(&CellCoord::new(1, 2)));
    assert_eq!(route.last(), Some(&CellCoord::new(1, 10)));
    assert!(!route.contains(&CellCoord::new(1, 5)));
    assert_eq!(query::enemy_view(&world).into_vec()[0].target_index, 0);
}
