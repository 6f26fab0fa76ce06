use std::time::Duration;

use bastion_core::{
    Event, GameConfig, MineId, MineKind, Phase, StructureKind, TileCoord, TowerKind,
};
use bastion_session::GameSession;
use bastion_world::query;

const FRAME: Duration = Duration::from_millis(16);

/// Structures that reach the whole grid and kill anything in one hit, with
/// enemies spawning on consecutive frames.
fn overwhelming(quota: u32) -> GameConfig {
    let mut config = GameConfig::default();
    config.wave_scaling.base_enemy_count = quota;
    config.wave_scaling.base_spawn_interval = 0.0;
    config.wave_scaling.min_spawn_interval = 0.0;
    config.towers.basic.damage = 10_000;
    config.towers.basic.range_tiles = 1_000.0;
    config.mines.proximity.damage = 10_000;
    config.mines.proximity.radius_tiles = 1_000.0;
    config
}

fn frames(session: &mut GameSession, count: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..count {
        events.extend(session.update(FRAME));
        if session.phase() != Phase::Wave {
            break;
        }
    }
    events
}

#[test]
fn second_tower_keeps_its_shot_for_the_next_enemy() {
    let mut session = GameSession::new(overwhelming(2), 5).expect("valid config");
    for origin in [TileCoord::new(11, 9), TileCoord::new(11, 10)] {
        session
            .place_structure(StructureKind::Tower(TowerKind::Basic), origin)
            .expect("tower fits beside the core");
    }
    session.start_wave().expect("wave starts");

    let events = frames(&mut session, 2);
    let shots: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::TowerFired {
                tower,
                target,
                damage,
            } => Some((*tower, *target, *damage)),
            _ => None,
        })
        .collect();
    assert_eq!(shots.len(), 2, "one shot per spawned enemy: {shots:?}");
    assert!(shots.iter().all(|(_, _, damage)| *damage == 10_000));
    assert_ne!(shots[0].0, shots[1].0);
    assert_ne!(shots[0].1, shots[1].1);

    let kills = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyKilled { .. }))
        .count();
    assert_eq!(kills, 2);
    assert_eq!(session.phase(), Phase::WaveComplete);
    assert_eq!(query::wave_summary(session.world()).reached_core, 0);
}

#[test]
fn overlapping_mine_stays_armed_after_a_neighbour_clears_the_field() {
    let mut session = GameSession::new(overwhelming(1), 5).expect("valid config");
    for origin in [TileCoord::new(11, 9), TileCoord::new(11, 10)] {
        session
            .place_structure(StructureKind::Mine(MineKind::Proximity), origin)
            .expect("mine fits beside the core");
    }
    session.start_wave().expect("wave starts");

    let events = frames(&mut session, 1);
    let blasts: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::MineDetonated { mine, victims } => Some((*mine, *victims)),
            _ => None,
        })
        .collect();
    assert_eq!(blasts, vec![(MineId::new(0), 1)]);
    assert_eq!(session.phase(), Phase::WaveComplete);

    let armed: Vec<_> = query::mine_view(session.world())
        .iter()
        .filter(|mine| mine.armed)
        .map(|mine| mine.id)
        .collect();
    assert_eq!(armed, vec![MineId::new(1)]);
}
