//! Integrity bookkeeping for the defended structure.

use bastion_core::{Body, CoreConfig, TileRect};
use glam::Vec2;

/// The structure every wave converges on.
///
/// Integrity never exceeds the current maximum and both values floor at
/// zero. Once either value reaches zero the core stays destroyed for the
/// rest of the session.
#[derive(Clone, Debug)]
pub struct EnergyCore {
    body: Body,
    footprint: TileRect,
    max_integrity: u32,
    current_integrity: u32,
    original_max_integrity: u32,
    integrity_loss_per_wave: u32,
    destroyed: bool,
}

impl EnergyCore {
    /// Creates a core at full integrity covering the provided footprint.
    #[must_use]
    pub fn new(config: &CoreConfig, footprint: TileRect, tile_length: f32) -> Self {
        let body = Body::new(footprint.center(tile_length), config.size, config.color);
        Self {
            body,
            footprint,
            max_integrity: config.max_integrity,
            current_integrity: config.max_integrity,
            original_max_integrity: config.max_integrity,
            integrity_loss_per_wave: config.integrity_loss_per_wave,
            destroyed: config.max_integrity == 0,
        }
    }

    /// Positional state of the core.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// World-space centre that enemies walk toward.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Tiles covered by the core.
    #[must_use]
    pub const fn footprint(&self) -> TileRect {
        self.footprint
    }

    /// Current maximum integrity.
    #[must_use]
    pub const fn max_integrity(&self) -> u32 {
        self.max_integrity
    }

    /// Remaining integrity.
    #[must_use]
    pub const fn current_integrity(&self) -> u32 {
        self.current_integrity
    }

    /// Maximum integrity at session start.
    #[must_use]
    pub const fn original_max_integrity(&self) -> u32 {
        self.original_max_integrity
    }

    /// Maximum integrity lost after every defended wave.
    #[must_use]
    pub const fn integrity_loss_per_wave(&self) -> u32 {
        self.integrity_loss_per_wave
    }

    /// Subtracts damage from the current integrity, flooring at zero.
    pub fn take_damage(&mut self, damage: u32) {
        self.current_integrity = self.current_integrity.saturating_sub(damage);
        self.latch_destruction();
    }

    /// Permanently lowers the maximum integrity by the per-wave loss.
    pub fn degrade_after_wave(&mut self) {
        self.max_integrity = self
            .max_integrity
            .saturating_sub(self.integrity_loss_per_wave);
        self.current_integrity = self.current_integrity.min(self.max_integrity);
        self.latch_destruction();
    }

    /// Restores integrity up to the current maximum and reports the amount
    /// actually restored.
    pub fn repair(&mut self, amount: u32) -> u32 {
        if self.destroyed {
            return 0;
        }
        let repaired = self
            .current_integrity
            .saturating_add(amount)
            .min(self.max_integrity);
        let restored = repaired - self.current_integrity;
        self.current_integrity = repaired;
        restored
    }

    /// Reports whether the core has fallen.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Current integrity as a fraction of the current maximum.
    #[must_use]
    pub fn integrity_percentage(&self) -> f32 {
        if self.max_integrity == 0 {
            0.0
        } else {
            self.current_integrity as f32 / self.max_integrity as f32
        }
    }

    /// Current maximum as a fraction of the original maximum.
    #[must_use]
    pub fn mining_efficiency(&self) -> f64 {
        if self.original_max_integrity == 0 {
            0.0
        } else {
            f64::from(self.max_integrity) / f64::from(self.original_max_integrity)
        }
    }

    fn latch_destruction(&mut self) {
        if self.current_integrity == 0 || self.max_integrity == 0 {
            self.destroyed = true;
        }
    }
}
