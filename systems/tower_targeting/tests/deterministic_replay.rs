use std::time::Duration;

use bastion_core::{
    Command, EnemyId, EnemyKind, EnemyStats, Event, GameConfig, StructureKind, TileCoord,
    TowerId, TowerKind, TowerTarget,
};
use bastion_system_tower_targeting::TowerTargeting;
use bastion_world::{self as world, query, World};

#[test]
fn deterministic_replay_handles_equidistant_enemies() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.assignments.len(), scripted_commands().len());

    let spawned: Vec<_> = first
        .events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .collect();
    assert_eq!(spawned, vec![EnemyId::new(0), EnemyId::new(1)]);

    let before_wave = &first.assignments[0];
    assert!(before_wave.is_empty(), "build phase must not target");

    let after_both_spawns = &first.assignments[3];
    assert_eq!(after_both_spawns.len(), 1);
    assert_eq!(after_both_spawns[0].0, TowerId::new(0));
    assert_eq!(after_both_spawns[0].1, EnemyId::new(0));

    let after_first_resolved = &first.assignments[5];
    assert_eq!(after_first_resolved.len(), 1);
    assert_eq!(after_first_resolved[0].1, EnemyId::new(1));
}

#[test]
fn world_tracks_assigned_targets_for_display() {
    let mut world = World::new(config());
    let mut targeting = TowerTargeting::new();
    let mut targets: Vec<TowerTarget> = Vec::new();
    for command in scripted_commands().into_iter().take(4) {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
    }

    targeting.handle(
        query::phase(&world),
        &query::tower_view(&world),
        &query::enemy_view(&world),
        &mut targets,
    );
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::AssignTowerTargets {
            targets: targets.clone(),
        },
        &mut events,
    );

    let tower = query::tower_view(&world).into_vec()[0];
    assert_eq!(tower.target, Some(EnemyId::new(0)));
}

fn config() -> GameConfig {
    let mut config = GameConfig::default();
    config.grid.size = 10;
    config.grid.tile_length = 10.0;
    config
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new(config());
    let mut targeting = TowerTargeting::new();
    let mut current_targets = Vec::new();
    let mut assignments: Vec<Vec<(TowerId, EnemyId)>> = Vec::new();
    let mut events = Vec::new();

    for command in commands {
        world::apply(&mut world, command, &mut events);

        targeting.handle(
            query::phase(&world),
            &query::tower_view(&world),
            &query::enemy_view(&world),
            &mut current_targets,
        );

        assignments.push(
            current_targets
                .iter()
                .map(|target| (target.tower, target.enemy))
                .collect(),
        );
    }

    ReplayOutcome {
        events,
        assignments,
    }
}

fn scripted_commands() -> Vec<Command> {
    let stats = EnemyStats {
        health: 30,
        speed: 1.0,
        damage: 5,
    };
    vec![
        Command::PlaceStructure {
            kind: StructureKind::Tower(TowerKind::Basic),
            origin: TileCoord::new(4, 2),
        },
        Command::StartWave { enemy_quota: 2 },
        Command::SpawnEnemy {
            kind: EnemyKind::Light,
            tile: TileCoord::new(2, 2),
            stats,
        },
        Command::SpawnEnemy {
            kind: EnemyKind::Heavy,
            tile: TileCoord::new(6, 2),
            stats,
        },
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        Command::StrikeCore {
            enemy: EnemyId::new(0),
        },
    ]
}

#[derive(Clone, Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    assignments: Vec<Vec<(TowerId, EnemyId)>>,
}
