#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that detects when an armed mine should detonate.
//!
//! A mine triggers on the first living enemy, in identifier order, whose
//! position lies within the blast radius. The boundary is inclusive. The
//! world applies the blast itself so that every enemy inside the radius at
//! the detonation instant is hit exactly once.

use bastion_core::{Command, EnemyView, MineView, Phase};

/// Mine trigger system that queues detonation commands.
#[derive(Debug, Default)]
pub struct MineTriggers {
    scratch: Vec<Command>,
}

impl MineTriggers {
    /// Creates a new trigger system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::DetonateMine` for every armed mine with a living enemy
    /// inside its radius.
    pub fn handle(
        &mut self,
        phase: Phase,
        mines: &MineView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        if phase != Phase::Wave {
            return;
        }

        self.scratch.clear();
        for mine in mines.iter().filter(|mine| mine.armed) {
            let triggered = enemies
                .alive()
                .any(|enemy| enemy.body.distance_to_point(mine.center) <= mine.radius);
            if triggered {
                self.scratch.push(Command::DetonateMine { mine: mine.id });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{
        Body, Color, EnemyId, EnemyKind, EnemySnapshot, MineId, MineKind, MineSnapshot, TileCoord,
        TileRect, TileRectSize,
    };
    use glam::Vec2;
    use std::time::Duration;

    fn mine(id: u32, center: Vec2, armed: bool) -> MineSnapshot {
        MineSnapshot {
            id: MineId::new(id),
            kind: MineKind::Proximity,
            region: TileRect::from_origin_and_size(TileCoord::new(0, 0), TileRectSize::new(1, 1)),
            center,
            radius: 15.0,
            damage: 40,
            armed,
            detonated: !armed,
            detonated_for: Duration::ZERO,
        }
    }

    fn enemy(id: u32, position: Vec2, alive: bool) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Heavy,
            body: Body::new(position, 12.0, Color::from_rgb(90, 0, 0)),
            health: 90,
            max_health: 90,
            speed: 0.6,
            damage: 15,
            alive,
        }
    }

    fn run(phase: Phase, mines: Vec<MineSnapshot>, enemies: Vec<EnemySnapshot>) -> Vec<Command> {
        let mut system = MineTriggers::new();
        let mut out = Vec::new();
        system.handle(
            phase,
            &MineView::from_snapshots(mines),
            &EnemyView::from_snapshots(enemies),
            &mut out,
        );
        out
    }

    #[test]
    fn enemy_on_the_boundary_triggers() {
        let out = run(
            Phase::Wave,
            vec![mine(1, Vec2::ZERO, true)],
            vec![enemy(1, Vec2::new(9.0, 12.0), true)],
        );
        assert_eq!(
            out,
            vec![Command::DetonateMine {
                mine: MineId::new(1)
            }]
        );
    }

    #[test]
    fn distant_or_resolved_enemies_do_not_trigger() {
        let out = run(
            Phase::Wave,
            vec![mine(1, Vec2::ZERO, true)],
            vec![
                enemy(1, Vec2::new(16.0, 0.0), true),
                enemy(2, Vec2::new(1.0, 0.0), false),
            ],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn detonated_mines_never_trigger_again() {
        let out = run(
            Phase::Wave,
            vec![mine(1, Vec2::ZERO, false), mine(2, Vec2::new(100.0, 0.0), true)],
            vec![
                enemy(1, Vec2::new(1.0, 0.0), true),
                enemy(2, Vec2::new(101.0, 0.0), true),
            ],
        );
        assert_eq!(
            out,
            vec![Command::DetonateMine {
                mine: MineId::new(2)
            }]
        );
    }

    #[test]
    fn mines_sleep_outside_waves() {
        let out = run(
            Phase::WaveComplete,
            vec![mine(1, Vec2::ZERO, true)],
            vec![enemy(1, Vec2::ZERO, true)],
        );
        assert!(out.is_empty());
    }
}
