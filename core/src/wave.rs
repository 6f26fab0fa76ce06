//! Per-wave scaling formulas shared by the director, the world and previews.

use std::time::Duration;

use crate::{config::seconds, EnemyStats, EnemyTemplate, WaveScaling};

/// Parameters of a single wave derived from the scaling table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveParameters {
    /// One-based wave number.
    pub wave: u32,
    /// Enemies the wave spawns in total.
    pub enemy_count: u32,
    /// Simulated time between consecutive spawns.
    pub spawn_interval: Duration,
    /// Share of heavy enemies after clamping.
    pub heavy_ratio: f64,
    /// Heavy enemies in the wave.
    pub heavy_count: u32,
    /// Light enemies in the wave.
    pub light_count: u32,
}

impl WaveParameters {
    /// Computes the parameters of the given wave without side effects.
    #[must_use]
    pub fn for_wave(scaling: &WaveScaling, wave: u32) -> Self {
        let steps = wave.saturating_sub(1);
        let enemy_count = scaling
            .base_enemy_count
            .saturating_add(steps.saturating_mul(scaling.enemy_count_growth));

        let interval = (scaling.base_spawn_interval - f64::from(steps) * scaling.spawn_interval_decay)
            .max(scaling.min_spawn_interval);

        let heavy_ratio = (scaling.heavy_ratio_base + f64::from(steps) * scaling.heavy_ratio_growth)
            .min(scaling.heavy_ratio_max)
            .clamp(0.0, 1.0);
        let heavy_count = share_of(enemy_count, heavy_ratio);

        Self {
            wave,
            enemy_count,
            spawn_interval: seconds(interval),
            heavy_ratio,
            heavy_count,
            light_count: enemy_count - heavy_count,
        }
    }
}

/// Whole number of spawns out of `quota` at the given share, rounded half to
/// even. Used for the heavy split and for the focused majority.
#[must_use]
pub fn share_of(quota: u32, share: f64) -> u32 {
    round_to_u32(f64::from(quota) * share.clamp(0.0, 1.0)).min(quota)
}

/// Applies the compounding per-wave multipliers to an enemy template.
#[must_use]
pub fn scaled_stats(template: &EnemyTemplate, scaling: &WaveScaling, wave: u32) -> EnemyStats {
    let exponent = i32::try_from(wave.saturating_sub(1)).unwrap_or(i32::MAX);
    let health = f64::from(template.health) * scaling.enemy_hp_multiplier_per_wave.powi(exponent);
    let speed = f64::from(template.speed) * scaling.enemy_speed_multiplier_per_wave.powi(exponent);
    let damage =
        f64::from(template.damage) * scaling.enemy_damage_multiplier_per_wave.powi(exponent);

    EnemyStats {
        health: round_to_u32(health),
        speed: speed as f32,
        damage: round_to_u32(damage),
    }
}

/// Rounds half to even, saturating at the `u32` range.
fn round_to_u32(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round_ties_even().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
