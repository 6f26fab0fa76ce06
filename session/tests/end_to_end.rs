use std::time::Duration;

use bastion_core::{
    Event, GameConfig, Phase, RejectionReason, StructureKind, TileCoord, TowerKind,
};
use bastion_session::GameSession;
use bastion_world::{base_mining_reward, query};

const FRAME: Duration = Duration::from_millis(16);
const MAX_FRAMES: usize = 20_000;

fn run_until(session: &mut GameSession, phase: Phase) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..MAX_FRAMES {
        events.extend(session.update(FRAME));
        let core = query::energy_core(session.world());
        assert!(core.current_integrity() <= core.max_integrity());
        if session.phase() == phase {
            return events;
        }
    }
    panic!("session never reached {phase:?}");
}

fn instant_waves() -> GameConfig {
    let mut config = GameConfig::default();
    config.wave_scaling.base_enemy_count = 0;
    config.wave_scaling.enemy_count_growth = 0;
    config
}

#[test]
fn first_wave_from_build_to_reward() {
    let mut config = GameConfig::default();
    config.wave_scaling.base_enemy_count = 3;
    let loss = config.core.integrity_loss_per_wave;
    let tower_cost = config.towers.basic.cost;
    let starting = config.economy.starting_currency;
    let mut session = GameSession::new(config, 2024).expect("valid config");

    let original_max = query::energy_core(session.world()).max_integrity();
    session
        .place_structure(StructureKind::Tower(TowerKind::Basic), TileCoord::new(11, 9))
        .expect("tower fits beside the core");
    assert_eq!(session.energy(), starting - tower_cost);

    session.start_wave().expect("wave starts");
    assert_eq!(session.phase(), Phase::Wave);
    let events = run_until(&mut session, Phase::WaveComplete);

    let summary = query::wave_summary(session.world());
    assert_eq!(summary.spawned, 3);
    assert_eq!(summary.killed + summary.reached_core, 3);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::WaveCleared { .. })));

    let reward = query::pending_reward(session.world());
    assert_eq!(reward, 50);
    session.acknowledge_wave_complete().expect("acknowledged");

    assert_eq!(session.phase(), Phase::Build);
    assert_eq!(session.wave_number(), 2);
    assert_eq!(session.energy(), starting - tower_cost + reward);
    let core = query::energy_core(session.world());
    assert_eq!(core.max_integrity(), original_max - loss);
    assert!(core.current_integrity() <= core.max_integrity());
}

#[test]
fn halved_core_halves_the_mining_reward() {
    let mut config = instant_waves();
    config.core.max_integrity = 100;
    config.core.integrity_loss_per_wave = 50;
    let mining = config.core_mining.clone();
    let mut session = GameSession::new(config, 1).expect("valid config");

    session.start_wave().expect("wave one starts");
    let _ = run_until(&mut session, Phase::WaveComplete);
    assert_eq!(query::pending_reward(session.world()), 50);
    session.acknowledge_wave_complete().expect("acknowledged");

    let core = query::energy_core(session.world());
    assert_eq!(core.max_integrity() * 2, core.original_max_integrity());

    session.start_wave().expect("wave two starts");
    let _ = run_until(&mut session, Phase::WaveComplete);
    let base = base_mining_reward(&mining, 2);
    assert_eq!(base, 60);
    assert_eq!(query::pending_reward(session.world()), base / 2);
}

#[test]
fn zero_loss_keeps_the_core_intact_across_waves() {
    let mut config = instant_waves();
    config.core.integrity_loss_per_wave = 0;
    let mut session = GameSession::new(config, 1).expect("valid config");
    let max = query::energy_core(session.world()).max_integrity();

    for wave in 1..=3 {
        assert_eq!(session.wave_number(), wave);
        session.start_wave().expect("wave starts");
        let _ = run_until(&mut session, Phase::WaveComplete);
        session.acknowledge_wave_complete().expect("acknowledged");
        assert_eq!(query::energy_core(session.world()).max_integrity(), max);
    }
}

#[test]
fn fallen_core_ends_the_session() {
    let mut config = GameConfig::default();
    config.wave_scaling.base_enemy_count = 1;
    config.enemies.light.damage = 1_000;
    let mut session = GameSession::new(config, 8).expect("valid config");

    session.start_wave().expect("wave starts");
    let events = run_until(&mut session, Phase::GameOver);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::CoreDestroyed { wave: 1 })));
    assert!(query::energy_core(session.world()).is_destroyed());

    assert!(session.update(FRAME).is_empty());
    assert_eq!(session.start_wave(), Err(RejectionReason::SessionOver));
    assert_eq!(session.emergency_repair(), Err(RejectionReason::SessionOver));
}

#[test]
fn structures_are_locked_while_a_wave_runs() {
    let mut config = GameConfig::default();
    config.wave_scaling.base_enemy_count = 2;
    let mut session = GameSession::new(config, 5).expect("valid config");
    session
        .place_structure(StructureKind::Tower(TowerKind::Basic), TileCoord::new(11, 9))
        .expect("tower placed");
    session.start_wave().expect("wave starts");

    assert_eq!(
        session.place_structure(StructureKind::Tower(TowerKind::Basic), TileCoord::new(4, 4)),
        Err(RejectionReason::WrongPhase)
    );
    assert_eq!(
        session.sell_structure(TileCoord::new(11, 9)),
        Err(RejectionReason::WrongPhase)
    );
    assert!(!session.can_place(TowerKind::Basic, TileCoord::new(4, 4)));
}
