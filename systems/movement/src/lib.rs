#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that walks enemies straight at the core.
//!
//! Enemies ignore terrain and each other. Every tick an enemy covers
//! `speed * dt * FRAME_RATE_NORMALIZATION` world units along the vector to the
//! core centre; when that step would reach or pass the core the enemy strikes
//! it instead of moving.

use std::time::Duration;

use bastion_core::{Command, EnemyView, Event, Phase};
use glam::Vec2;

/// Converts per-frame speeds tuned at 60 frames per second into per-second
/// distances.
pub const FRAME_RATE_NORMALIZATION: f32 = 60.0;

/// Pure system that reacts to elapsed time and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement {
    scratch: Vec<Command>,
}

impl Movement {
    /// Consumes world events and the enemy snapshot to emit movement commands.
    ///
    /// Nothing happens unless the batch contains `Event::TimeAdvanced` while a
    /// wave is running.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: Phase,
        enemies: &EnemyView,
        core_position: Vec2,
        out: &mut Vec<Command>,
    ) {
        if phase != Phase::Wave {
            return;
        }

        let elapsed = elapsed_time(events);
        if elapsed.is_zero() {
            return;
        }
        let seconds = elapsed.as_secs_f32();

        self.scratch.clear();
        for enemy in enemies.alive() {
            let position = enemy.body.position;
            let remaining = position.distance(core_position);
            let step = enemy.speed * seconds * FRAME_RATE_NORMALIZATION;

            if step >= remaining {
                self.scratch.push(Command::StrikeCore { enemy: enemy.id });
            } else {
                let heading = (core_position - position) / remaining;
                self.scratch.push(Command::AdvanceEnemy {
                    enemy: enemy.id,
                    position: position + heading * step,
                });
            }
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn elapsed_time(events: &[Event]) -> Duration {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(*dt),
            _ => None,
        })
        .fold(Duration::ZERO, Duration::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{Body, Color, EnemyId, EnemyKind, EnemySnapshot};

    fn enemy(id: u32, position: Vec2, speed: f32, alive: bool) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Light,
            body: Body::new(position, 8.0, Color::from_rgb(200, 40, 40)),
            health: 10,
            max_health: 10,
            speed,
            damage: 5,
            alive,
        }
    }

    fn tick(millis: u64) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }]
    }

    #[test]
    fn enemies_advance_along_straight_line() {
        let mut movement = Movement::default();
        let enemies = EnemyView::from_snapshots(vec![enemy(1, Vec2::new(0.0, 0.0), 1.0, true)]);
        let mut out = Vec::new();

        movement.handle(
            &tick(500),
            Phase::Wave,
            &enemies,
            Vec2::new(300.0, 400.0),
            &mut out,
        );

        match out.as_slice() {
            [Command::AdvanceEnemy { enemy, position }] => {
                assert_eq!(*enemy, EnemyId::new(1));
                assert!((position.x - 18.0).abs() < 1e-3);
                assert!((position.y - 24.0).abs() < 1e-3);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn reaching_the_core_strikes_instead_of_moving() {
        let mut movement = Movement::default();
        let enemies = EnemyView::from_snapshots(vec![
            enemy(1, Vec2::new(90.0, 100.0), 1.0, true),
            enemy(2, Vec2::new(100.0, 100.0), 0.0, true),
        ]);
        let mut out = Vec::new();

        movement.handle(
            &tick(1000),
            Phase::Wave,
            &enemies,
            Vec2::new(100.0, 100.0),
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::StrikeCore {
                    enemy: EnemyId::new(1)
                },
                Command::StrikeCore {
                    enemy: EnemyId::new(2)
                },
            ]
        );
    }

    #[test]
    fn resolved_enemies_stay_put() {
        let mut movement = Movement::default();
        let enemies = EnemyView::from_snapshots(vec![enemy(1, Vec2::ZERO, 1.0, false)]);
        let mut out = Vec::new();

        movement.handle(
            &tick(16),
            Phase::Wave,
            &enemies,
            Vec2::new(50.0, 0.0),
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn silent_without_time_or_outside_waves() {
        let mut movement = Movement::default();
        let enemies = EnemyView::from_snapshots(vec![enemy(1, Vec2::ZERO, 1.0, true)]);
        let mut out = Vec::new();

        movement.handle(&[], Phase::Wave, &enemies, Vec2::new(50.0, 0.0), &mut out);
        movement.handle(
            &tick(16),
            Phase::Build,
            &enemies,
            Vec2::new(50.0, 0.0),
            &mut out,
        );
        movement.handle(
            &tick(16),
            Phase::Countdown,
            &enemies,
            Vec2::new(50.0, 0.0),
            &mut out,
        );

        assert!(out.is_empty());
    }
}
