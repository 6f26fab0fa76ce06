//! Proximity mine state and its detonation lifecycle.

use std::{collections::BTreeMap, time::Duration};

use bastion_core::{MineId, MineKind, MineSnapshot, MineStats, TileRect};
use glam::Vec2;

/// Mine stored inside the world.
///
/// Lifecycle: armed, then detonated with a running timer, then consumed once
/// the timer reaches the detonation duration. A mine never re-arms.
#[derive(Clone, Debug)]
pub(crate) struct MineState {
    pub(crate) id: MineId,
    pub(crate) kind: MineKind,
    pub(crate) region: TileRect,
    pub(crate) center: Vec2,
    pub(crate) radius: f32,
    pub(crate) damage: u32,
    pub(crate) cost: u32,
    pub(crate) armed: bool,
    pub(crate) detonated: bool,
    pub(crate) detonated_for: Duration,
    pub(crate) detonation_duration: Duration,
}

impl MineState {
    /// Switches the mine from armed to detonated. Returns `false` when the
    /// mine was not armed.
    pub(crate) fn detonate(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        self.armed = false;
        self.detonated = true;
        self.detonated_for = Duration::ZERO;
        true
    }

    fn is_consumed(&self) -> bool {
        self.detonated && self.detonated_for >= self.detonation_duration
    }

    pub(crate) fn snapshot(&self) -> MineSnapshot {
        MineSnapshot {
            id: self.id,
            kind: self.kind,
            region: self.region,
            center: self.center,
            radius: self.radius,
            damage: self.damage,
            armed: self.armed,
            detonated: self.detonated,
            detonated_for: self.detonated_for,
        }
    }
}

/// Registry that stores mines and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct MineRegistry {
    entries: BTreeMap<MineId, MineState>,
    next_mine_id: MineId,
}

impl MineRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_mine_id: MineId::new(0),
        }
    }

    /// Lays an armed mine over the region and returns its identifier.
    pub(crate) fn insert(
        &mut self,
        kind: MineKind,
        region: TileRect,
        stats: &MineStats,
        tile_length: f32,
    ) -> MineId {
        let id = self.next_mine_id;
        self.next_mine_id = MineId::new(id.get().saturating_add(1));
        let state = MineState {
            id,
            kind,
            region,
            center: region.center(tile_length),
            radius: stats.radius_tiles * tile_length,
            damage: stats.damage,
            cost: stats.cost,
            armed: true,
            detonated: false,
            detonated_for: Duration::ZERO,
            detonation_duration: stats.detonation_duration(),
        };
        let _ = self.entries.insert(id, state);
        id
    }

    pub(crate) fn get(&self, id: MineId) -> Option<&MineState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: MineId) -> Option<&mut MineState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: MineId) -> Option<MineState> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &MineState> {
        self.entries.values()
    }

    /// Advances every detonation timer and removes the mines whose timer ran
    /// out, returning them in identifier order.
    pub(crate) fn advance_detonations(&mut self, dt: Duration) -> Vec<MineState> {
        for mine in self.entries.values_mut().filter(|mine| mine.detonated) {
            mine.detonated_for = mine.detonated_for.saturating_add(dt);
        }

        let consumed: Vec<MineId> = self
            .entries
            .values()
            .filter(|mine| mine.is_consumed())
            .map(|mine| mine.id)
            .collect();

        consumed
            .into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect()
    }
}
