#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Bastion.
//!
//! The world owns the grid, the energy core, every enemy and structure, the
//! currency and the phase machine. It changes only through [`apply`], which
//! executes a single [`Command`] and reports the outcome as [`Event`]s.

mod economy;
mod enemies;
mod energy_core;
mod grid;
mod mines;
mod towers;

use std::time::Duration;

use bastion_core::{
    Command, Direction, EnemyId, EnemyKind, EnemyStats, Event, GameConfig, MineId, Occupant,
    Phase, PlayerAction, RejectionReason, StructureId, StructureKind, TileCoord, TileRect,
    TowerId, WaveSummary,
};
use glam::Vec2;
use log::{debug, info, warn};

pub use economy::{base_mining_reward, mining_reward, sell_refund};
pub use energy_core::EnergyCore;
pub use grid::{Grid, TileState};

use enemies::Enemy;
use mines::MineRegistry;
use towers::TowerRegistry;

/// Represents the authoritative Bastion world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    grid: Grid,
    core: EnergyCore,
    enemies: Vec<Enemy>,
    towers: TowerRegistry,
    mines: MineRegistry,
    phase: Phase,
    wave_number: u32,
    energy: u32,
    wave_focus: Option<Direction>,
    countdown: Option<Duration>,
    enemy_quota: u32,
    summary: WaveSummary,
    pending_reward: u32,
    repair_used: bool,
    next_enemy_id: EnemyId,
    tick_index: u64,
}

impl World {
    /// Creates a world in the build phase of wave one.
    ///
    /// The core is centred on the grid and its footprint tiles are claimed
    /// before any structure can be placed.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let mut grid = Grid::new(&config.grid);
        let footprint = config.core.footprint();
        let origin = TileCoord::new(
            config.grid.size.saturating_sub(footprint.width()) / 2,
            config.grid.size.saturating_sub(footprint.height()) / 2,
        );
        let region = TileRect::from_origin_and_size(origin, footprint);
        grid.occupy(region, Occupant::Core);
        let core = EnergyCore::new(&config.core, region, grid.tile_length());

        Self {
            energy: config.economy.starting_currency,
            grid,
            core,
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            mines: MineRegistry::new(),
            phase: Phase::Build,
            wave_number: 1,
            wave_focus: None,
            countdown: None,
            enemy_quota: 0,
            summary: WaveSummary {
                wave: 1,
                ..WaveSummary::default()
            },
            pending_reward: 0,
            repair_used: false,
            next_enemy_id: EnemyId::new(0),
            tick_index: 0,
            config,
        }
    }

    fn enter_phase(&mut self, phase: Phase, out_events: &mut Vec<Event>) {
        if self.phase == phase {
            return;
        }
        info!(
            "wave {}: {} -> {}",
            self.wave_number,
            self.phase.label(),
            phase.label()
        );
        self.phase = phase;
        out_events.push(Event::PhaseChanged { phase });
    }

    fn reject(&self, action: PlayerAction, reason: RejectionReason, out_events: &mut Vec<Event>) {
        debug!("{action:?} rejected: {reason}");
        out_events.push(Event::ActionRejected { action, reason });
    }

    fn enemy_mut(&mut self, enemy: EnemyId) -> Option<&mut Enemy> {
        self.enemies
            .binary_search_by_key(&enemy, |candidate| candidate.id)
            .ok()
            .map(|index| &mut self.enemies[index])
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);

        match self.phase {
            Phase::Countdown => {
                let remaining = self.countdown.unwrap_or_default().saturating_sub(dt);
                if remaining.is_zero() {
                    self.countdown = None;
                    self.begin_wave(out_events);
                } else {
                    self.countdown = Some(remaining);
                }
            }
            Phase::Wave => self.towers.cool_down(dt),
            Phase::Build | Phase::WaveComplete | Phase::GameOver => {}
        }

        for mine in self.mines.advance_detonations(dt) {
            self.grid
                .release(mine.region, Occupant::Structure(StructureId::Mine(mine.id)));
            debug!("mine {} consumed", mine.id.get());
            out_events.push(Event::MineConsumed {
                mine: mine.id,
                region: mine.region,
            });
        }

        out_events.push(Event::TimeAdvanced { dt });
    }

    fn set_wave_focus(&mut self, direction: Option<Direction>, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Build {
            warn!("wave focus change ignored outside the build phase");
            return;
        }
        self.wave_focus = direction;
        out_events.push(Event::WaveFocusChanged { direction });
    }

    fn start_wave(&mut self, enemy_quota: u32, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.start_check() {
            self.reject(PlayerAction::StartWave, reason, out_events);
            return;
        }

        self.enemies.clear();
        self.enemy_quota = enemy_quota;
        self.summary = WaveSummary {
            wave: self.wave_number,
            ..WaveSummary::default()
        };
        out_events.push(Event::WaveCommitted {
            wave: self.wave_number,
            enemy_quota,
            focus: self.wave_focus,
        });

        let countdown = self.config.countdown.duration();
        if self.config.countdown.enabled && !countdown.is_zero() {
            self.countdown = Some(countdown);
            self.enter_phase(Phase::Countdown, out_events);
        } else {
            self.begin_wave(out_events);
        }
    }

    fn start_check(&self) -> Result<(), RejectionReason> {
        if self.phase != Phase::Build {
            return Err(RejectionReason::WrongPhase);
        }
        if self.config.economy.require_tower_before_wave && self.towers.is_empty() {
            return Err(RejectionReason::TowerRequired);
        }
        Ok(())
    }

    fn begin_wave(&mut self, out_events: &mut Vec<Event>) {
        self.enter_phase(Phase::Wave, out_events);
        out_events.push(Event::WaveStarted {
            wave: self.wave_number,
        });
    }

    fn spawn_enemy(
        &mut self,
        kind: EnemyKind,
        tile: TileCoord,
        stats: EnemyStats,
        out_events: &mut Vec<Event>,
    ) {
        if self.phase != Phase::Wave {
            warn!("spawn of {} ignored outside a wave", kind.tag());
            return;
        }
        if self.summary.spawned >= self.enemy_quota {
            warn!(
                "spawn of {} ignored: quota of {} already met",
                kind.tag(),
                self.enemy_quota
            );
            return;
        }
        if self.grid.tile_state(tile).is_none() {
            warn!(
                "spawn of {} ignored: tile ({}, {}) is off the grid",
                kind.tag(),
                tile.column(),
                tile.row()
            );
            return;
        }

        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        let position = self.grid.tile_center(tile);
        let template = self.config.enemies.template(kind);
        self.enemies
            .push(Enemy::spawn(id, kind, position, stats, template));
        self.summary.spawned += 1;
        debug!(
            "enemy {} ({}) spawned at ({}, {}) with {} health",
            id.get(),
            kind.tag(),
            tile.column(),
            tile.row(),
            stats.health
        );
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            tile,
        });
    }

    fn strike_core(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let Some(damage) = self.enemy_mut(enemy).and_then(Enemy::arrive) else {
            return;
        };
        self.core.take_damage(damage);
        self.summary.reached_core += 1;
        debug!(
            "enemy {} reached the core for {} damage ({}/{})",
            enemy.get(),
            damage,
            self.core.current_integrity(),
            self.core.max_integrity()
        );
        out_events.push(Event::EnemyReachedCore { enemy, damage });

        if self.core.is_destroyed() {
            self.fall(out_events);
        }
    }

    fn fall(&mut self, out_events: &mut Vec<Event>) {
        self.towers.clear_targets();
        self.enter_phase(Phase::GameOver, out_events);
        info!("core destroyed during wave {}", self.wave_number);
        out_events.push(Event::CoreDestroyed {
            wave: self.wave_number,
        });
    }

    fn record_kill(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        self.summary.killed += 1;
        debug!("enemy {} killed", enemy.get());
        out_events.push(Event::EnemyKilled { enemy });
    }

    /// Living enemy nearest to `center` strictly inside `range`, lower
    /// identifier first on equal distances.
    fn nearest_alive_within(&self, center: Vec2, range: f32) -> Option<EnemyId> {
        let mut best: Option<(f32, EnemyId)> = None;
        for enemy in self.enemies.iter().filter(|enemy| enemy.alive) {
            let distance = enemy.body.distance_to_point(center);
            if distance >= range {
                continue;
            }
            if best.map_or(true, |(nearest, _)| distance < nearest) {
                best = Some((distance, enemy.id));
            }
        }
        best.map(|(_, enemy)| enemy)
    }

    fn fire_tower(&mut self, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Wave {
            return;
        }
        let Some((center, range, damage, cooldown)) = self
            .towers
            .get_mut(tower)
            .filter(|state| state.ready_in.is_zero())
            .map(|state| (state.center, state.range, state.damage, state.cooldown))
        else {
            return;
        };

        // An earlier shot this tick may have killed the assigned target.
        let still_alive = self.enemy_mut(target).is_some_and(|enemy| enemy.alive);
        let target = if still_alive {
            target
        } else {
            match self.nearest_alive_within(center, range) {
                Some(enemy) => enemy,
                None => return,
            }
        };
        let Some(enemy) = self.enemy_mut(target) else {
            return;
        };
        let killed = enemy.take_damage(damage);

        if let Some(state) = self.towers.get_mut(tower) {
            state.ready_in = cooldown;
            state.target = Some(target);
        }
        out_events.push(Event::TowerFired {
            tower,
            target,
            damage,
        });
        if killed {
            self.record_kill(target, out_events);
        }
    }

    fn detonate_mine(&mut self, mine: MineId, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Wave {
            return;
        }
        let Some((center, radius, damage)) = self
            .mines
            .get(mine)
            .filter(|state| state.armed)
            .map(|state| (state.center, state.radius, state.damage))
        else {
            return;
        };
        let in_reach =
            |enemy: &Enemy| enemy.alive && enemy.body.distance_to_point(center) <= radius;

        // Stay armed when an earlier blast this tick cleared the radius.
        if !self.enemies.iter().any(|enemy| in_reach(enemy)) {
            return;
        }
        if !self
            .mines
            .get_mut(mine)
            .is_some_and(|state| state.detonate())
        {
            return;
        }

        let mut victims = 0;
        let mut killed = Vec::new();
        for enemy in self.enemies.iter_mut().filter(|enemy| in_reach(enemy)) {
            victims += 1;
            if enemy.take_damage(damage) {
                killed.push(enemy.id);
            }
        }

        debug!("mine {} detonated, {} caught", mine.get(), victims);
        out_events.push(Event::MineDetonated { mine, victims });
        for enemy in killed {
            self.record_kill(enemy, out_events);
        }
    }

    fn evaluate_wave(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Wave {
            return;
        }
        let quota_met = self.summary.spawned >= self.enemy_quota;
        if !quota_met || self.enemies.iter().any(|enemy| enemy.alive) {
            return;
        }

        let reward = mining_reward(
            &self.config.core_mining,
            self.wave_number,
            self.core.mining_efficiency(),
        );
        self.pending_reward = reward;
        self.towers.clear_targets();
        self.enter_phase(Phase::WaveComplete, out_events);
        info!(
            "wave {} cleared: {} spawned, {} killed, {} reached the core, reward {}",
            self.summary.wave,
            self.summary.spawned,
            self.summary.killed,
            self.summary.reached_core,
            reward
        );
        out_events.push(Event::WaveCleared {
            summary: self.summary,
            reward,
        });
    }

    fn placement_check(
        &self,
        kind: StructureKind,
        origin: TileCoord,
    ) -> Result<(TileRect, u32), RejectionReason> {
        if !self.phase.allows_building() {
            return Err(RejectionReason::WrongPhase);
        }
        let (footprint, cost) = match kind {
            StructureKind::Tower(kind) => {
                let stats = self.config.towers.stats(kind);
                (stats.footprint(), stats.cost)
            }
            StructureKind::Mine(kind) => {
                let stats = self.config.mines.stats(kind);
                (stats.footprint(), stats.cost)
            }
        };
        let region = TileRect::from_origin_and_size(origin, footprint);
        self.grid.check_footprint(region)?;
        if self.energy < cost {
            return Err(RejectionReason::InsufficientFunds);
        }
        Ok((region, cost))
    }

    fn place_structure(
        &mut self,
        kind: StructureKind,
        origin: TileCoord,
        out_events: &mut Vec<Event>,
    ) {
        let (region, cost) = match self.placement_check(kind, origin) {
            Ok(placement) => placement,
            Err(reason) => {
                self.reject(PlayerAction::PlaceStructure, reason, out_events);
                return;
            }
        };

        let tile_length = self.grid.tile_length();
        let structure = match kind {
            StructureKind::Tower(kind) => StructureId::Tower(self.towers.insert(
                kind,
                region,
                self.config.towers.stats(kind),
                tile_length,
            )),
            StructureKind::Mine(kind) => StructureId::Mine(self.mines.insert(
                kind,
                region,
                self.config.mines.stats(kind),
                tile_length,
            )),
        };
        self.grid.occupy(region, Occupant::Structure(structure));
        self.energy -= cost;
        debug!(
            "{structure:?} placed at ({}, {}) for {cost}",
            origin.column(),
            origin.row()
        );
        out_events.push(Event::StructurePlaced {
            structure,
            kind,
            region,
            cost,
        });
    }

    fn sell_structure(&mut self, tile: TileCoord, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Build {
            self.reject(PlayerAction::SellStructure, RejectionReason::WrongPhase, out_events);
            return;
        }
        let structure = match self.grid.occupant(tile) {
            Some(Occupant::Structure(structure)) => structure,
            Some(Occupant::Core) | None => {
                self.reject(
                    PlayerAction::SellStructure,
                    RejectionReason::NothingToSell,
                    out_events,
                );
                return;
            }
        };

        let removed = match structure {
            StructureId::Tower(id) => self.towers.remove(id).map(|tower| (tower.region, tower.cost)),
            StructureId::Mine(id) => {
                let sellable = self.mines.get(id).is_some_and(|mine| mine.armed);
                if sellable {
                    self.mines.remove(id).map(|mine| (mine.region, mine.cost))
                } else {
                    None
                }
            }
        };
        let Some((region, cost)) = removed else {
            self.reject(
                PlayerAction::SellStructure,
                RejectionReason::NothingToSell,
                out_events,
            );
            return;
        };

        self.grid.release(region, Occupant::Structure(structure));
        let refund = sell_refund(cost, self.config.economy.sell_refund_pct);
        self.energy = self.energy.saturating_add(refund);
        debug!("{structure:?} sold for {refund}");
        out_events.push(Event::StructureSold {
            structure,
            region,
            refund,
        });
    }

    fn acknowledge_wave(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != Phase::WaveComplete {
            self.reject(PlayerAction::AcknowledgeWave, RejectionReason::WrongPhase, out_events);
            return;
        }

        let completed = self.wave_number;
        let reward = std::mem::take(&mut self.pending_reward);
        self.energy = self.energy.saturating_add(reward);
        self.core.degrade_after_wave();
        self.enemies.clear();
        self.wave_focus = None;
        info!(
            "wave {completed} acknowledged: +{reward}, core max integrity now {}",
            self.core.max_integrity()
        );
        out_events.push(Event::WaveRewarded {
            wave: completed,
            reward,
            max_integrity: self.core.max_integrity(),
        });

        if self.core.is_destroyed() {
            self.fall(out_events);
            return;
        }

        self.wave_number = self.wave_number.saturating_add(1);
        self.enemy_quota = 0;
        self.summary = WaveSummary {
            wave: self.wave_number,
            ..WaveSummary::default()
        };
        self.enter_phase(Phase::Build, out_events);
        out_events.push(Event::BuildPhaseStarted {
            wave: self.wave_number,
        });
    }

    fn emergency_repair(&mut self, out_events: &mut Vec<Event>) {
        let repair = &self.config.repair;
        let check = if !repair.enabled {
            Err(RejectionReason::RepairUnavailable)
        } else if self.phase != Phase::Build {
            Err(RejectionReason::WrongPhase)
        } else if self.repair_used {
            Err(RejectionReason::RepairAlreadyUsed)
        } else if self.energy < repair.cost {
            Err(RejectionReason::RepairInsufficientFunds)
        } else {
            Ok((repair.cost, repair.amount))
        };

        match check {
            Ok((cost, amount)) => {
                self.energy -= cost;
                self.repair_used = true;
                let restored = self.core.repair(amount);
                info!("emergency repair restored {restored} integrity for {cost}");
                out_events.push(Event::CoreRepaired { restored, cost });
            }
            Err(reason) => self.reject(PlayerAction::EmergencyRepair, reason, out_events),
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the core has fallen, player actions are rejected with
/// [`RejectionReason::SessionOver`] and simulation commands are ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.phase.is_terminal() {
        if let Some(action) = player_action(&command) {
            world.reject(action, RejectionReason::SessionOver, out_events);
        }
        return;
    }

    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SetWaveFocus { direction } => world.set_wave_focus(direction, out_events),
        Command::StartWave { enemy_quota } => world.start_wave(enemy_quota, out_events),
        Command::SpawnEnemy { kind, tile, stats } => {
            world.spawn_enemy(kind, tile, stats, out_events);
        }
        Command::AdvanceEnemy { enemy, position } => {
            if world.phase != Phase::Wave {
                return;
            }
            if let Some(enemy) = world.enemy_mut(enemy).filter(|enemy| enemy.alive) {
                enemy.body.position = position;
            }
        }
        Command::StrikeCore { enemy } => {
            if world.phase == Phase::Wave {
                world.strike_core(enemy, out_events);
            }
        }
        Command::AssignTowerTargets { targets } => {
            world
                .towers
                .retarget(targets.into_iter().map(|target| (target.tower, target.enemy)));
        }
        Command::FireTower { tower, target } => world.fire_tower(tower, target, out_events),
        Command::DetonateMine { mine } => world.detonate_mine(mine, out_events),
        Command::EvaluateWave => world.evaluate_wave(out_events),
        Command::PlaceStructure { kind, origin } => {
            world.place_structure(kind, origin, out_events);
        }
        Command::SellStructure { tile } => world.sell_structure(tile, out_events),
        Command::AcknowledgeWave => world.acknowledge_wave(out_events),
        Command::EmergencyRepair => world.emergency_repair(out_events),
    }
}

fn player_action(command: &Command) -> Option<PlayerAction> {
    match command {
        Command::StartWave { .. } => Some(PlayerAction::StartWave),
        Command::PlaceStructure { .. } => Some(PlayerAction::PlaceStructure),
        Command::SellStructure { .. } => Some(PlayerAction::SellStructure),
        Command::AcknowledgeWave => Some(PlayerAction::AcknowledgeWave),
        Command::EmergencyRepair => Some(PlayerAction::EmergencyRepair),
        _ => None,
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{EnergyCore, Grid, World};
    use bastion_core::{
        Direction, EnemyView, GameConfig, MineKind, MineView, Phase, RejectionReason,
        SpawnEdges, StructureId, StructureKind, TileCoord, TileRect, TowerKind, TowerView,
        WaveSummary,
    };
    use glam::Vec2;

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Current phase of the session.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Wave that is being prepared, fought or acknowledged.
    #[must_use]
    pub fn wave_number(world: &World) -> u32 {
        world.wave_number
    }

    /// Currency available to the player.
    #[must_use]
    pub fn energy(world: &World) -> u32 {
        world.energy
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Edge tiles enemies may spawn on.
    #[must_use]
    pub fn spawn_edges(world: &World) -> &SpawnEdges {
        world.grid.spawn_edges()
    }

    /// Provides read-only access to the energy core.
    #[must_use]
    pub fn energy_core(world: &World) -> &EnergyCore {
        &world.core
    }

    /// Point every enemy walks toward.
    #[must_use]
    pub fn core_position(world: &World) -> Vec2 {
        world.core.position()
    }

    /// Captures the enemies of the current wave, including resolved ones.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures every standing tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures every mine that is still in play.
    #[must_use]
    pub fn mine_view(world: &World) -> MineView {
        MineView::from_snapshots(world.mines.iter().map(|mine| mine.snapshot()).collect())
    }

    /// Favoured edge of the upcoming or active wave.
    #[must_use]
    pub fn wave_focus(world: &World) -> Option<Direction> {
        world.wave_focus
    }

    /// Time left before enemies start spawning, while counting down.
    #[must_use]
    pub fn countdown_remaining(world: &World) -> Option<Duration> {
        world.countdown
    }

    /// Number of enemies the active wave must spawn.
    #[must_use]
    pub fn enemy_quota(world: &World) -> u32 {
        world.enemy_quota
    }

    /// Counters of the active or most recently cleared wave.
    #[must_use]
    pub fn wave_summary(world: &World) -> WaveSummary {
        world.summary
    }

    /// Reward that acknowledging the cleared wave will pay out.
    #[must_use]
    pub fn pending_reward(world: &World) -> u32 {
        world.pending_reward
    }

    /// Reports whether the emergency repair was spent.
    #[must_use]
    pub fn repair_used(world: &World) -> bool {
        world.repair_used
    }

    /// Structure covering the tile, if any.
    #[must_use]
    pub fn structure_at(world: &World, tile: TileCoord) -> Option<StructureId> {
        match world.grid.occupant(tile) {
            Some(bastion_core::Occupant::Structure(structure)) => Some(structure),
            _ => None,
        }
    }

    /// Checks a placement without mutating the world and returns the
    /// footprint it would cover.
    pub fn placement_check(
        world: &World,
        kind: StructureKind,
        origin: TileCoord,
    ) -> Result<TileRect, RejectionReason> {
        world.placement_check(kind, origin).map(|(region, _)| region)
    }

    /// Reports whether a tower could be placed at the origin right now.
    #[must_use]
    pub fn can_place(world: &World, kind: TowerKind, origin: TileCoord) -> bool {
        placement_check(world, StructureKind::Tower(kind), origin).is_ok()
    }

    /// Reports whether a mine could be placed at the origin right now.
    #[must_use]
    pub fn can_place_mine(world: &World, kind: MineKind, origin: TileCoord) -> bool {
        placement_check(world, StructureKind::Mine(kind), origin).is_ok()
    }

    /// Checks whether a wave could be started right now.
    pub fn start_check(world: &World) -> Result<(), RejectionReason> {
        world.start_check()
    }
}
