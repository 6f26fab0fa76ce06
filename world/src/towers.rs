//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use bastion_core::{EnemyId, TileRect, TowerId, TowerKind, TowerSnapshot, TowerStats};
use glam::Vec2;

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Region of tiles occupied by the tower.
    pub(crate) region: TileRect,
    /// Footprint centre that range is measured from.
    pub(crate) center: Vec2,
    pub(crate) range: f32,
    pub(crate) damage: u32,
    pub(crate) cost: u32,
    pub(crate) cooldown: Duration,
    /// Time left until the tower may fire again.
    pub(crate) ready_in: Duration,
    /// Enemy tracked during the latest tick, re-resolved every tick.
    pub(crate) target: Option<EnemyId>,
}

impl TowerState {
    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            region: self.region,
            center: self.center,
            range: self.range,
            damage: self.damage,
            ready_in: self.ready_in,
            target: self.target,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Builds a ready tower over the region and returns its identifier.
    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        region: TileRect,
        stats: &TowerStats,
        tile_length: f32,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let state = TowerState {
            id,
            kind,
            region,
            center: region.center(tile_length),
            range: stats.range_tiles * tile_length,
            damage: stats.damage,
            cost: stats.cost,
            cooldown: stats.cooldown(),
            ready_in: Duration::ZERO,
            target: None,
        };
        let _ = self.entries.insert(id, state);
        id
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    /// Counts every cooldown down by the elapsed time, stopping at zero.
    pub(crate) fn cool_down(&mut self, dt: Duration) {
        for tower in self.entries.values_mut() {
            tower.ready_in = tower.ready_in.saturating_sub(dt);
        }
    }

    /// Replaces every tracked target, clearing towers that are not listed.
    pub(crate) fn retarget(&mut self, targets: impl IntoIterator<Item = (TowerId, EnemyId)>) {
        self.clear_targets();
        for (tower, enemy) in targets {
            if let Some(state) = self.entries.get_mut(&tower) {
                state.target = Some(enemy);
            }
        }
    }

    pub(crate) fn clear_targets(&mut self) {
        for tower in self.entries.values_mut() {
            tower.target = None;
        }
    }
}
