#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session that owns the world and drives every system once per frame.
//!
//! A frame runs a fixed pipeline: the clock advances and the wave director
//! spawns, enemies move, towers pick targets and fire, mines check their
//! triggers, and finally the world checks whether the wave is finished.
//! Every command flows through [`bastion_world::apply`], so the events a
//! session returns describe everything that happened.

mod messages;

use std::{collections::VecDeque, time::Duration};

use bastion_core::{
    Command, ConfigError, Event, GameConfig, MineKind, Phase, RejectionReason, StructureKind,
    TileCoord, TowerKind, TowerTarget,
};
use bastion_system_mines::MineTriggers;
use bastion_system_movement::Movement;
use bastion_system_tower_combat::TowerCombat;
use bastion_system_tower_targeting::TowerTargeting;
use bastion_system_wave_director::{WaveDirector, WavePreview};
use bastion_world::{self as world, query, World};
use log::info;

pub use messages::{Message, MessageBoard, MESSAGE_TTL};

/// Factor applied to the frame duration while fast-forward is on in the build
/// phase.
pub const FAST_FORWARD_MULTIPLIER: u32 = 2;

/// Single-player defence session.
#[derive(Debug)]
pub struct GameSession {
    world: World,
    director: WaveDirector,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    mines: MineTriggers,
    targets: Vec<TowerTarget>,
    messages: MessageBoard,
    paused: bool,
    fast_forward: bool,
}

impl GameSession {
    /// Validates the configuration and opens the build phase of wave one.
    ///
    /// All randomness derives from `seed`; equal configurations and seeds
    /// replay identically.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let director = WaveDirector::new(&config, seed);
        let mut session = Self {
            world: World::new(config),
            director,
            movement: Movement::default(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            mines: MineTriggers::new(),
            targets: Vec::new(),
            messages: MessageBoard::default(),
            paused: false,
            fast_forward: false,
        };

        let direction = session.director.roll_focus();
        let _ = session.execute(Command::SetWaveFocus { direction });
        Ok(session)
    }

    /// Advances the session by one frame of wall-clock time.
    ///
    /// Messages age even while paused. Nothing else moves while the session
    /// is paused or over.
    pub fn update(&mut self, dt: Duration) -> Vec<Event> {
        self.messages.tick(dt);
        if self.paused || self.phase().is_terminal() {
            return Vec::new();
        }

        let dt = if self.fast_forward && self.phase() == Phase::Build {
            dt.saturating_mul(FAST_FORWARD_MULTIPLIER)
        } else {
            dt
        };

        let mut events = self.execute(Command::Tick { dt });
        if self.phase() != Phase::Wave {
            return events;
        }

        let mut commands = Vec::new();
        self.movement.handle(
            &events,
            Phase::Wave,
            &query::enemy_view(&self.world),
            query::core_position(&self.world),
            &mut commands,
        );
        self.execute_all(commands, &mut events);
        if self.phase() != Phase::Wave {
            return events;
        }

        self.targeting.handle(
            Phase::Wave,
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.targets,
        );
        let targets = self.targets.clone();
        events.append(&mut self.execute(Command::AssignTowerTargets { targets }));

        let mut commands = Vec::new();
        self.combat.handle(
            Phase::Wave,
            &query::tower_view(&self.world),
            &self.targets,
            &mut commands,
        );
        self.execute_all(commands, &mut events);

        let mut commands = Vec::new();
        self.mines.handle(
            Phase::Wave,
            &query::mine_view(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        self.execute_all(commands, &mut events);

        events.append(&mut self.execute(Command::EvaluateWave));
        events
    }

    /// Commits to the next wave using the quota of the scaling table.
    pub fn start_wave(&mut self) -> Result<(), RejectionReason> {
        let quota = self
            .director
            .parameters(query::wave_number(&self.world))
            .enemy_count;
        self.act(Command::StartWave { enemy_quota: quota })
    }

    /// Places a tower or mine with its footprint anchored at `origin`.
    pub fn place_structure(
        &mut self,
        kind: StructureKind,
        origin: TileCoord,
    ) -> Result<(), RejectionReason> {
        self.act(Command::PlaceStructure { kind, origin })
    }

    /// Sells whichever structure covers `tile`.
    pub fn sell_structure(&mut self, tile: TileCoord) -> Result<(), RejectionReason> {
        self.act(Command::SellStructure { tile })
    }

    /// Collects the reward of a completed wave and reopens building.
    pub fn acknowledge_wave_complete(&mut self) -> Result<(), RejectionReason> {
        self.act(Command::AcknowledgeWave)
    }

    /// Spends currency on the one-time core repair.
    pub fn emergency_repair(&mut self) -> Result<(), RejectionReason> {
        self.act(Command::EmergencyRepair)
    }

    /// Suspends or resumes the simulation.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Enables or disables build-phase fast-forward.
    pub fn set_fast_forward(&mut self, enabled: bool) {
        self.fast_forward = enabled;
    }

    /// Reports whether the simulation is suspended.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Reports whether fast-forward is enabled.
    #[must_use]
    pub const fn is_fast_forward(&self) -> bool {
        self.fast_forward
    }

    /// Reports whether a tower could be placed at `origin` right now.
    #[must_use]
    pub fn can_place(&self, kind: TowerKind, origin: TileCoord) -> bool {
        query::can_place(&self.world, kind, origin)
    }

    /// Reports whether a mine could be placed at `origin` right now.
    #[must_use]
    pub fn can_place_mine(&self, kind: MineKind, origin: TileCoord) -> bool {
        query::can_place_mine(&self.world, kind, origin)
    }

    /// Read-only access to the world for renderers and the [`query`] module.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        query::phase(&self.world)
    }

    /// One-based number of the current or upcoming wave.
    #[must_use]
    pub fn wave_number(&self) -> u32 {
        query::wave_number(&self.world)
    }

    /// Currency available to the player.
    #[must_use]
    pub fn energy(&self) -> u32 {
        query::energy(&self.world)
    }

    /// Messages currently visible.
    #[must_use]
    pub const fn messages(&self) -> &MessageBoard {
        &self.messages
    }

    /// Numbers of the upcoming wave, or `None` when the preview is disabled
    /// or no wave is being prepared.
    #[must_use]
    pub fn next_wave_preview(&self) -> Option<WavePreview> {
        if !query::config(&self.world).preview.enabled || self.phase() != Phase::Build {
            return None;
        }
        Some(self.director.preview(
            query::wave_number(&self.world),
            query::wave_focus(&self.world),
        ))
    }

    fn act(&mut self, command: Command) -> Result<(), RejectionReason> {
        let events = self.execute(command);
        events
            .iter()
            .find_map(|event| match event {
                Event::ActionRejected { reason, .. } => Some(*reason),
                _ => None,
            })
            .map_or(Ok(()), Err)
    }

    fn execute_all(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            events.append(&mut self.execute(command));
        }
    }

    /// Applies a command and every command the wave director derives from
    /// the resulting events, in order.
    fn execute(&mut self, command: Command) -> Vec<Event> {
        let mut queue = VecDeque::from([command]);
        let mut emitted = Vec::new();
        let mut generated = Vec::new();

        while let Some(command) = queue.pop_front() {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);

            self.director
                .handle(&events, query::spawn_edges(&self.world), &mut generated);
            queue.extend(generated.drain(..));

            self.announce(&events);
            emitted.append(&mut events);
        }
        emitted
    }

    fn announce(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::ActionRejected { reason, .. } => {
                    self.messages.post(reason.to_string(), MESSAGE_TTL);
                }
                Event::WaveCleared { summary, reward } => {
                    let currency = &query::config(&self.world).economy.currency_name;
                    self.messages.post(
                        format!(
                            "Wave {} complete! Mining yields {reward} {currency}",
                            summary.wave
                        ),
                        MESSAGE_TTL,
                    );
                }
                Event::CoreRepaired { restored, .. } => {
                    self.messages
                        .post(format!("Core repaired (+{restored})"), MESSAGE_TTL);
                }
                Event::CoreDestroyed { wave } => {
                    info!("session over after {wave} wave(s)");
                    self.messages
                        .post("Core destroyed! Base abandoned.", MESSAGE_TTL);
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.wave_scaling.base_enemy_count = 0;
        config.wave_scaling.enemy_count_growth = 0;
        config
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut config = GameConfig::default();
        config.grid.size = 0;
        assert!(matches!(
            GameSession::new(config, 1),
            Err(ConfigError::EmptyGrid)
        ));
    }

    #[test]
    fn rejected_actions_surface_reason_and_message() {
        let mut config = GameConfig::default();
        config.economy.starting_currency = 10;
        let mut session = GameSession::new(config, 1).expect("valid config");

        let result =
            session.place_structure(StructureKind::Tower(TowerKind::Basic), TileCoord::new(5, 5));
        assert_eq!(result, Err(RejectionReason::InsufficientFunds));
        assert_eq!(
            session.messages().latest().map(Message::text),
            Some("Not enough energy")
        );
    }

    #[test]
    fn messages_expire_while_paused() {
        let mut session = GameSession::new(GameConfig::default(), 1).expect("valid config");
        assert!(session.sell_structure(TileCoord::new(4, 4)).is_err());
        session.set_paused(true);

        let _ = session.update(Duration::from_millis(1_999));
        assert!(!session.messages().is_empty());
        let _ = session.update(Duration::from_millis(1));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn pause_freezes_the_countdown() {
        let mut config = quick_config();
        config.countdown.enabled = true;
        config.countdown.duration_secs = 1.0;
        let mut session = GameSession::new(config, 1).expect("valid config");
        session.start_wave().expect("wave starts");
        assert_eq!(session.phase(), Phase::Countdown);

        session.set_paused(true);
        for _ in 0..4 {
            assert!(session.update(Duration::from_millis(500)).is_empty());
        }
        assert_eq!(
            query::countdown_remaining(session.world()),
            Some(Duration::from_secs(1))
        );

        session.set_paused(false);
        let _ = session.update(Duration::from_secs(1));
        assert_ne!(session.phase(), Phase::Countdown);
    }

    #[test]
    fn fast_forward_scales_only_the_build_phase() {
        let mut config = quick_config();
        config.wave_scaling.base_enemy_count = 1;
        let mut session = GameSession::new(config, 1).expect("valid config");
        session.set_fast_forward(true);

        let events = session.update(Duration::from_millis(100));
        assert!(events.contains(&Event::TimeAdvanced {
            dt: Duration::from_millis(200)
        }));

        session.start_wave().expect("wave starts");
        let events = session.update(Duration::from_millis(100));
        assert!(events.contains(&Event::TimeAdvanced {
            dt: Duration::from_millis(100)
        }));
    }

    #[test]
    fn preview_describes_the_upcoming_wave() {
        let mut session = GameSession::new(GameConfig::default(), 3).expect("valid config");
        let preview = session.next_wave_preview().expect("preview enabled");
        assert_eq!(preview.parameters.wave, 1);
        assert_eq!(preview.parameters.enemy_count, 5);

        session.start_wave().expect("wave starts");
        assert_eq!(session.next_wave_preview(), None);
    }

    #[test]
    fn start_wave_uses_the_scaled_quota() {
        let mut config = quick_config();
        config.wave_scaling.base_enemy_count = 4;
        let mut session = GameSession::new(config, 3).expect("valid config");
        session.start_wave().expect("wave starts");
        assert_eq!(query::enemy_quota(session.world()), 4);
        assert_eq!(session.start_wave(), Err(RejectionReason::WrongPhase));
    }
}
