//! Enemy state stored inside the world.

use bastion_core::{Body, EnemyId, EnemyKind, EnemySnapshot, EnemyStats, EnemyTemplate};
use glam::Vec2;

/// Enemy tracked by the world.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) body: Body,
    pub(crate) max_health: u32,
    pub(crate) health: u32,
    pub(crate) speed: f32,
    pub(crate) damage: u32,
    pub(crate) alive: bool,
}

impl Enemy {
    /// Creates a living enemy with wave-scaled stats at the provided position.
    pub(crate) fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        position: Vec2,
        stats: EnemyStats,
        template: &EnemyTemplate,
    ) -> Self {
        Self {
            id,
            kind,
            body: Body::new(position, template.size, template.color),
            max_health: stats.health,
            health: stats.health,
            speed: stats.speed,
            damage: stats.damage,
            alive: stats.health > 0,
        }
    }

    /// Applies combat damage and reports whether this hit killed the enemy.
    pub(crate) fn take_damage(&mut self, amount: u32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.alive = false;
            return true;
        }
        false
    }

    /// Removes the enemy from play after it reached the core and returns the
    /// damage it delivers.
    pub(crate) fn arrive(&mut self) -> Option<u32> {
        if !self.alive {
            return None;
        }
        self.alive = false;
        Some(self.damage)
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            body: self.body,
            health: self.health,
            max_health: self.max_health,
            speed: self.speed,
            damage: self.damage,
            alive: self.alive,
        }
    }
}
