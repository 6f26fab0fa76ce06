#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave director that plans waves and emits spawn commands.
//!
//! The director reacts to world events. A committed wave is turned into a
//! plan holding a shuffled sequence of enemy kinds and, when wave focus is
//! enabled, a shuffled sequence of focus flags. Once the wave starts, one
//! enemy spawns per tick whenever the accumulated simulated time since the
//! previous spawn reaches the wave's spawn interval. The first enemy spawns
//! on the first tick of the wave.

use std::time::Duration;

use bastion_core::{
    scaled_stats, share_of, Command, Direction, EnemyKind, EnemyStats, EnemyTable, Event,
    GameConfig, SpawnEdges, TileCoord, WaveFocusConfig, WaveParameters, WaveScaling,
};
use log::{debug, warn};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Numbers describing an upcoming wave, computed without touching any state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WavePreview {
    /// Wave parameters derived from the scaling table.
    pub parameters: WaveParameters,
    /// Wave-scaled light enemy stats.
    pub light: EnemyStats,
    /// Wave-scaled heavy enemy stats.
    pub heavy: EnemyStats,
    /// Favoured edge of the wave, if any.
    pub focus: Option<Direction>,
}

/// Pure system that schedules wave spawns from a seeded random source.
#[derive(Debug)]
pub struct WaveDirector {
    scaling: WaveScaling,
    enemies: EnemyTable,
    focus: WaveFocusConfig,
    rng: ChaCha8Rng,
    plan: Option<WavePlan>,
}

#[derive(Debug)]
struct WavePlan {
    wave: u32,
    quota: u32,
    spawn_interval: Duration,
    kinds: Vec<EnemyKind>,
    focus: Option<Direction>,
    focus_flags: Vec<bool>,
    spawned: u32,
    armed: bool,
    since_last_spawn: Option<Duration>,
}

impl WaveDirector {
    /// Creates a director for the provided configuration and seed.
    #[must_use]
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        Self {
            scaling: config.wave_scaling.clone(),
            enemies: config.enemies.clone(),
            focus: config.wave_focus.clone(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            plan: None,
        }
    }

    /// Computes the parameters of a wave.
    #[must_use]
    pub fn parameters(&self, wave: u32) -> WaveParameters {
        WaveParameters::for_wave(&self.scaling, wave)
    }

    /// Computes the preview of a wave without consuming randomness.
    #[must_use]
    pub fn preview(&self, wave: u32, focus: Option<Direction>) -> WavePreview {
        WavePreview {
            parameters: self.parameters(wave),
            light: scaled_stats(self.enemies.template(EnemyKind::Light), &self.scaling, wave),
            heavy: scaled_stats(self.enemies.template(EnemyKind::Heavy), &self.scaling, wave),
            focus,
        }
    }

    /// Picks the favoured edge of the next wave, or `None` when the mechanic
    /// is disabled.
    pub fn roll_focus(&mut self) -> Option<Direction> {
        if !self.focus.enabled {
            return None;
        }
        Direction::ALL.choose(&mut self.rng).copied()
    }

    /// Enemies spawned so far in the active wave.
    #[must_use]
    pub fn spawned(&self) -> u32 {
        self.plan.as_ref().map_or(0, |plan| plan.spawned)
    }

    /// Consumes world events and emits focus and spawn commands.
    pub fn handle(&mut self, events: &[Event], edges: &SpawnEdges, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::BuildPhaseStarted { .. } => {
                    self.plan = None;
                    out.push(Command::SetWaveFocus {
                        direction: self.roll_focus(),
                    });
                }
                Event::WaveCommitted {
                    wave,
                    enemy_quota,
                    focus,
                } => self.prepare(*wave, *enemy_quota, *focus),
                Event::WaveStarted { wave } => match self.plan.as_mut() {
                    Some(plan) if plan.wave == *wave => {
                        plan.armed = true;
                        plan.since_last_spawn = None;
                    }
                    _ => warn!("wave {wave} started without a committed plan"),
                },
                Event::WaveCleared { .. } | Event::CoreDestroyed { .. } => {
                    if let Some(plan) = self.plan.as_mut() {
                        plan.armed = false;
                    }
                }
                Event::TimeAdvanced { dt } => self.advance(*dt, edges, out),
                _ => {}
            }
        }
    }

    fn prepare(&mut self, wave: u32, quota: u32, focus: Option<Direction>) {
        let parameters = self.parameters(wave);
        let heavy_count = share_of(quota, parameters.heavy_ratio);

        let mut kinds = Vec::with_capacity(quota as usize);
        kinds.extend(std::iter::repeat(EnemyKind::Heavy).take(heavy_count as usize));
        kinds.extend(std::iter::repeat(EnemyKind::Light).take((quota - heavy_count) as usize));
        kinds.shuffle(&mut self.rng);

        let mut focus_flags = Vec::new();
        if focus.is_some() {
            let focused = share_of(quota, self.focus.majority);
            focus_flags.extend(std::iter::repeat(true).take(focused as usize));
            focus_flags.extend(std::iter::repeat(false).take((quota - focused) as usize));
            focus_flags.shuffle(&mut self.rng);
        }

        debug!(
            "wave {wave} planned: {quota} enemies ({heavy_count} heavy), every {:?}, focus {focus:?}",
            parameters.spawn_interval
        );
        self.plan = Some(WavePlan {
            wave,
            quota,
            spawn_interval: parameters.spawn_interval,
            kinds,
            focus,
            focus_flags,
            spawned: 0,
            armed: false,
            since_last_spawn: None,
        });
    }

    fn advance(&mut self, dt: Duration, edges: &SpawnEdges, out: &mut Vec<Command>) {
        let Some(plan) = self.plan.as_mut() else {
            return;
        };
        if !plan.armed || plan.spawned >= plan.quota {
            return;
        }

        let due = match plan.since_last_spawn {
            None => true,
            Some(elapsed) => {
                let elapsed = elapsed.saturating_add(dt);
                plan.since_last_spawn = Some(elapsed);
                elapsed >= plan.spawn_interval
            }
        };
        if !due {
            return;
        }

        let index = plan.spawned as usize;
        let kind = plan.kinds.get(index).copied().unwrap_or(EnemyKind::Light);
        let focused = plan.focus_flags.get(index).copied().unwrap_or(false);
        let Some(tile) = choose_spawn_tile(&mut self.rng, edges, plan.focus, focused) else {
            warn!("wave {} has no edge tiles to spawn on", plan.wave);
            return;
        };

        plan.spawned += 1;
        plan.since_last_spawn = Some(Duration::ZERO);
        let stats = scaled_stats(self.enemies.template(kind), &self.scaling, plan.wave);
        out.push(Command::SpawnEnemy { kind, tile, stats });
    }
}

fn choose_spawn_tile(
    rng: &mut ChaCha8Rng,
    edges: &SpawnEdges,
    focus: Option<Direction>,
    focused: bool,
) -> Option<TileCoord> {
    let candidates = match focus {
        Some(direction) if focused => edges.edge(direction).to_vec(),
        Some(direction) => edges.excluding(direction),
        None => Vec::new(),
    };
    candidates
        .choose(rng)
        .or_else(|| edges.perimeter().choose(rng))
        .copied()
}
