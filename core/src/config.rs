//! Immutable session configuration.
//!
//! Every section falls back to the shipped tuning when omitted, so adapters may
//! deserialize partial documents. The session receives a [`GameConfig`] once
//! at construction and never mutates it.

use std::time::Duration;

use serde::Deserialize;

use crate::{Color, EnemyKind, MineKind, TileCoord, TileRectSize, TowerKind};

/// Complete configuration consumed by the session.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Grid dimensions and terrain.
    pub grid: GridConfig,
    /// Energy core statistics.
    pub core: CoreConfig,
    /// Currency and selling rules.
    pub economy: EconomyConfig,
    /// Tower stat table.
    pub towers: TowerTable,
    /// Mine stat table.
    pub mines: MineTable,
    /// Enemy stat table.
    pub enemies: EnemyTable,
    /// Per-wave scaling coefficients.
    pub wave_scaling: WaveScaling,
    /// Reward paid for every defended wave.
    pub core_mining: CoreMining,
    /// Optional directional spawn bias.
    pub wave_focus: WaveFocusConfig,
    /// Optional warning period before each wave.
    pub countdown: CountdownConfig,
    /// Optional one-time core repair.
    pub repair: RepairConfig,
    /// Optional next-wave preview.
    pub preview: PreviewConfig,
}

/// Grid dimensions and terrain.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of tiles along each side of the square grid.
    pub size: u32,
    /// Edge length of a tile in world units.
    pub tile_length: f32,
    /// Tiles that can never be built on. `None` blocks three tiles per corner.
    pub blocked_tiles: Option<Vec<TileCoord>>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 20,
            tile_length: 32.0,
            blocked_tiles: None,
        }
    }
}

/// Energy core statistics.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Integrity the core starts with.
    pub max_integrity: u32,
    /// Maximum integrity permanently lost after every defended wave.
    pub integrity_loss_per_wave: u32,
    /// Footprint width in tiles.
    pub footprint_width: u32,
    /// Footprint height in tiles.
    pub footprint_height: u32,
    /// Display radius in world units.
    pub size: f32,
    /// Display colour.
    pub color: Color,
}

impl CoreConfig {
    /// Footprint of the core in tiles.
    #[must_use]
    pub const fn footprint(&self) -> TileRectSize {
        TileRectSize::new(self.footprint_width, self.footprint_height)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_integrity: 100,
            integrity_loss_per_wave: 10,
            footprint_width: 2,
            footprint_height: 2,
            size: 20.0,
            color: Color::from_rgb(0x00, 0xc8, 0xff),
        }
    }
}

/// Currency and selling rules.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Display name of the currency.
    pub currency_name: String,
    /// Currency available when the session starts.
    pub starting_currency: u32,
    /// Fraction of the cost refunded when selling, truncated to whole units.
    pub sell_refund_pct: f64,
    /// Rejects wave starts while no tower stands.
    pub require_tower_before_wave: bool,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            currency_name: String::from("Energy"),
            starting_currency: 100,
            sell_refund_pct: 0.5,
            require_tower_before_wave: false,
        }
    }
}

/// Statistics of a tower type.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TowerStats {
    /// Purchase price.
    pub cost: u32,
    /// Damage per attack.
    pub damage: u32,
    /// Targeting range in tiles.
    pub range_tiles: f32,
    /// Seconds between attacks.
    pub cooldown_secs: f32,
    /// Footprint width in tiles.
    pub footprint_width: u32,
    /// Footprint height in tiles.
    pub footprint_height: u32,
    /// Display radius in world units.
    pub size: f32,
    /// Display colour.
    pub color: Color,
}

impl TowerStats {
    /// Footprint of the tower in tiles.
    #[must_use]
    pub const fn footprint(&self) -> TileRectSize {
        TileRectSize::new(self.footprint_width, self.footprint_height)
    }

    /// Time between attacks.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        seconds(f64::from(self.cooldown_secs))
    }
}

impl Default for TowerStats {
    fn default() -> Self {
        Self {
            cost: 25,
            damage: 10,
            range_tiles: 3.0,
            cooldown_secs: 0.5,
            footprint_width: 1,
            footprint_height: 1,
            size: 12.0,
            color: Color::from_rgb(0x4c, 0xaf, 0x50),
        }
    }
}

/// Tower stat table keyed by [`TowerKind`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TowerTable {
    /// Statistics of [`TowerKind::Basic`].
    pub basic: TowerStats,
}

impl TowerTable {
    /// Statistics of the provided tower kind.
    #[must_use]
    pub const fn stats(&self, kind: TowerKind) -> &TowerStats {
        match kind {
            TowerKind::Basic => &self.basic,
        }
    }
}

/// Statistics of a mine type.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MineStats {
    /// Purchase price.
    pub cost: u32,
    /// Damage applied to every enemy inside the blast.
    pub damage: u32,
    /// Trigger and blast radius in tiles.
    pub radius_tiles: f32,
    /// Footprint width in tiles.
    pub footprint_width: u32,
    /// Footprint height in tiles.
    pub footprint_height: u32,
    /// Seconds a detonated mine lingers before it leaves play.
    pub detonation_secs: f32,
    /// Display radius in world units.
    pub size: f32,
    /// Display colour.
    pub color: Color,
}

impl MineStats {
    /// Footprint of the mine in tiles.
    #[must_use]
    pub const fn footprint(&self) -> TileRectSize {
        TileRectSize::new(self.footprint_width, self.footprint_height)
    }

    /// Time a detonated mine lingers.
    #[must_use]
    pub fn detonation_duration(&self) -> Duration {
        seconds(f64::from(self.detonation_secs))
    }
}

impl Default for MineStats {
    fn default() -> Self {
        Self {
            cost: 15,
            damage: 40,
            radius_tiles: 1.5,
            footprint_width: 1,
            footprint_height: 1,
            detonation_secs: 0.3,
            size: 8.0,
            color: Color::from_rgb(0xff, 0x98, 0x00),
        }
    }
}

/// Mine stat table keyed by [`MineKind`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MineTable {
    /// Statistics of [`MineKind::Proximity`].
    pub proximity: MineStats,
}

impl MineTable {
    /// Statistics of the provided mine kind.
    #[must_use]
    pub const fn stats(&self, kind: MineKind) -> &MineStats {
        match kind {
            MineKind::Proximity => &self.proximity,
        }
    }
}

/// Wave-one statistics of an enemy archetype.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EnemyTemplate {
    /// Health before wave scaling.
    pub health: u32,
    /// Speed in world units per normalised frame before wave scaling.
    pub speed: f32,
    /// Core damage before wave scaling.
    pub damage: u32,
    /// Display radius in world units.
    pub size: f32,
    /// Display colour.
    pub color: Color,
}

/// Enemy stat table keyed by [`EnemyKind`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnemyTable {
    /// Statistics of [`EnemyKind::Light`].
    pub light: EnemyTemplate,
    /// Statistics of [`EnemyKind::Heavy`].
    pub heavy: EnemyTemplate,
}

impl EnemyTable {
    /// Statistics of the provided enemy kind.
    #[must_use]
    pub const fn template(&self, kind: EnemyKind) -> &EnemyTemplate {
        match kind {
            EnemyKind::Light => &self.light,
            EnemyKind::Heavy => &self.heavy,
        }
    }
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            light: EnemyTemplate {
                health: 30,
                speed: 1.0,
                damage: 5,
                size: 8.0,
                color: Color::from_rgb(0xe5, 0x39, 0x35),
            },
            heavy: EnemyTemplate {
                health: 90,
                speed: 0.6,
                damage: 15,
                size: 12.0,
                color: Color::from_rgb(0x8e, 0x24, 0xaa),
            },
        }
    }
}

/// Per-wave scaling coefficients. Wave `n` applies `n - 1` growth steps.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveScaling {
    /// Enemies in wave one.
    pub base_enemy_count: u32,
    /// Additional enemies per wave.
    pub enemy_count_growth: u32,
    /// Seconds between spawns in wave one.
    pub base_spawn_interval: f64,
    /// Seconds removed from the interval per wave.
    pub spawn_interval_decay: f64,
    /// Lower bound on the spawn interval.
    pub min_spawn_interval: f64,
    /// Heavy share of wave one.
    pub heavy_ratio_base: f64,
    /// Heavy share added per wave.
    pub heavy_ratio_growth: f64,
    /// Upper bound on the heavy share.
    pub heavy_ratio_max: f64,
    /// Health multiplier compounded per wave.
    pub enemy_hp_multiplier_per_wave: f64,
    /// Speed multiplier compounded per wave.
    pub enemy_speed_multiplier_per_wave: f64,
    /// Damage multiplier compounded per wave.
    pub enemy_damage_multiplier_per_wave: f64,
}

impl Default for WaveScaling {
    fn default() -> Self {
        Self {
            base_enemy_count: 5,
            enemy_count_growth: 2,
            base_spawn_interval: 1.0,
            spawn_interval_decay: 0.05,
            min_spawn_interval: 0.3,
            heavy_ratio_base: 0.0,
            heavy_ratio_growth: 0.1,
            heavy_ratio_max: 0.5,
            enemy_hp_multiplier_per_wave: 1.15,
            enemy_speed_multiplier_per_wave: 1.03,
            enemy_damage_multiplier_per_wave: 1.1,
        }
    }
}

/// Reward paid for every defended wave.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoreMining {
    /// Reward for wave one.
    pub reward_base: u32,
    /// Reward added per wave.
    pub reward_growth: u32,
    /// Optional multiplier compounded per wave.
    pub reward_multiplier_per_wave: Option<f64>,
}

impl Default for CoreMining {
    fn default() -> Self {
        Self {
            reward_base: 50,
            reward_growth: 10,
            reward_multiplier_per_wave: None,
        }
    }
}

/// Optional directional spawn bias.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveFocusConfig {
    /// Enables the mechanic.
    pub enabled: bool,
    /// Fraction of each wave constrained to the favoured edge.
    pub majority: f64,
    /// Number of warning arrows the renderer draws on the favoured edge.
    pub arrow_count: u32,
}

impl Default for WaveFocusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            majority: 0.7,
            arrow_count: 3,
        }
    }
}

/// Optional warning period before each wave.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// Enables the countdown phase.
    pub enabled: bool,
    /// Length of the countdown in seconds.
    pub duration_secs: f32,
}

impl CountdownConfig {
    /// Length of the countdown.
    #[must_use]
    pub fn duration(&self) -> Duration {
        seconds(f64::from(self.duration_secs))
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            duration_secs: 3.0,
        }
    }
}

/// Optional one-time core repair.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Enables the action.
    pub enabled: bool,
    /// Currency spent.
    pub cost: u32,
    /// Integrity restored, capped at the current maximum.
    pub amount: u32,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cost: 50,
            amount: 25,
        }
    }
}

/// Optional next-wave preview.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Enables the preview.
    pub enabled: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Problems detected while validating a [`GameConfig`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The grid has no tiles.
    #[error("grid size must be positive")]
    EmptyGrid,
    /// Tiles have no extent.
    #[error("tile length must be positive, got {0}")]
    NonPositiveTileLength(f32),
    /// A footprint has a zero dimension.
    #[error("{0} footprint must cover at least one tile")]
    EmptyFootprint(&'static str),
    /// A footprint does not fit inside the grid.
    #[error("{structure} footprint {width}x{height} exceeds the {grid}x{grid} grid")]
    FootprintTooLarge {
        /// Structure whose footprint is too large.
        structure: &'static str,
        /// Footprint width in tiles.
        width: u32,
        /// Footprint height in tiles.
        height: u32,
        /// Grid side length in tiles.
        grid: u32,
    },
    /// A fraction lies outside `0.0..=1.0`.
    #[error("{field} must lie within 0.0..=1.0, got {value}")]
    FractionOutOfRange {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A duration or multiplier is negative.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
}

impl GameConfig {
    /// Checks the invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = self.grid.size;
        if grid == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.grid.tile_length <= 0.0 {
            return Err(ConfigError::NonPositiveTileLength(self.grid.tile_length));
        }

        check_footprint("core", self.core.footprint(), grid)?;
        check_footprint("tower", self.towers.basic.footprint(), grid)?;
        check_footprint("mine", self.mines.proximity.footprint(), grid)?;

        check_fraction("economy.sell_refund_pct", self.economy.sell_refund_pct)?;
        check_fraction("wave_focus.majority", self.wave_focus.majority)?;
        check_fraction("wave_scaling.heavy_ratio_base", self.wave_scaling.heavy_ratio_base)?;
        check_fraction("wave_scaling.heavy_ratio_max", self.wave_scaling.heavy_ratio_max)?;

        let scaling = &self.wave_scaling;
        for (field, value) in [
            ("wave_scaling.min_spawn_interval", scaling.min_spawn_interval),
            ("wave_scaling.base_spawn_interval", scaling.base_spawn_interval),
            ("wave_scaling.heavy_ratio_growth", scaling.heavy_ratio_growth),
            (
                "wave_scaling.enemy_hp_multiplier_per_wave",
                scaling.enemy_hp_multiplier_per_wave,
            ),
            (
                "wave_scaling.enemy_speed_multiplier_per_wave",
                scaling.enemy_speed_multiplier_per_wave,
            ),
            (
                "wave_scaling.enemy_damage_multiplier_per_wave",
                scaling.enemy_damage_multiplier_per_wave,
            ),
            (
                "towers.basic.cooldown_secs",
                f64::from(self.towers.basic.cooldown_secs),
            ),
            (
                "mines.proximity.detonation_secs",
                f64::from(self.mines.proximity.detonation_secs),
            ),
            ("countdown.duration_secs", f64::from(self.countdown.duration_secs)),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        Ok(())
    }
}

/// Converts configured seconds to a duration rounded to whole microseconds.
///
/// Rounding keeps decimal tunings such as `0.3` exact when compared against
/// sums of millisecond ticks.
pub(crate) fn seconds(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_micros((secs * 1_000_000.0).round() as u64)
    } else {
        Duration::ZERO
    }
}

fn check_footprint(
    structure: &'static str,
    footprint: TileRectSize,
    grid: u32,
) -> Result<(), ConfigError> {
    if footprint.is_empty() {
        return Err(ConfigError::EmptyFootprint(structure));
    }
    if footprint.width() > grid || footprint.height() > grid {
        return Err(ConfigError::FootprintTooLarge {
            structure,
            width: footprint.width(),
            height: footprint.height(),
            grid,
        });
    }
    Ok(())
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_tuning_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn oversized_core_footprint_is_rejected() {
        let mut config = GameConfig::default();
        config.grid.size = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FootprintTooLarge {
                structure: "core",
                ..
            })
        ));
    }

    #[test]
    fn focus_majority_must_be_a_fraction() {
        let mut config = GameConfig::default();
        config.wave_focus.majority = 1.5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::FractionOutOfRange {
                field: "wave_focus.majority",
                value: 1.5,
            })
        );
    }

    #[test]
    fn partial_documents_fall_back_to_shipped_tuning() {
        let config: GameConfig = toml::from_str(
            r#"
            [grid]
            size = 12

            [enemies.heavy]
            health = 200
            speed = 0.5
            damage = 20
            size = 10.0
            color = [1, 2, 3]
            "#,
        )
        .expect("partial config parses");

        assert_eq!(config.grid.size, 12);
        assert_eq!(config.grid.tile_length, GridConfig::default().tile_length);
        assert_eq!(config.enemies.heavy.health, 200);
        assert_eq!(config.enemies.heavy.color, Color::from_rgb(1, 2, 3));
        assert_eq!(config.enemies.light, EnemyTable::default().light);
        assert_eq!(config.core_mining, CoreMining::default());
    }

    #[test]
    fn cooldown_converts_to_duration() {
        let stats = TowerStats {
            cooldown_secs: 0.25,
            ..TowerStats::default()
        };
        assert_eq!(stats.cooldown(), Duration::from_millis(250));
    }

    #[test]
    fn single_precision_tunings_round_to_whole_microseconds() {
        let stats = MineStats {
            detonation_secs: 0.3,
            ..MineStats::default()
        };
        assert_eq!(stats.detonation_duration(), Duration::from_millis(300));
        assert_eq!(seconds(-1.0), Duration::ZERO);
    }
}
