#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use bastion_core::{EnemyId, EnemyView, Phase, TowerId, TowerTarget, TowerView};
use glam::Vec2;

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Each tower picks the living enemy nearest to its footprint centre that
    /// lies strictly inside its range. Equal distances resolve to the lower
    /// enemy identifier. The output buffer is cleared before populating it
    /// with the latest assignments.
    pub fn handle(
        &mut self,
        phase: Phase,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if phase != Phase::Wave {
            return;
        }

        self.prepare_tower_workspace(towers);
        if self.tower_workspace.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);
        if self.enemy_workspace.is_empty() {
            return;
        }

        for tower in &self.tower_workspace {
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                let distance = tower.center.distance(candidate.position);
                if distance >= tower.range {
                    continue;
                }

                let current = BestCandidate {
                    distance,
                    enemy: candidate.id,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                    distance: best_candidate.distance,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        self.tower_workspace.extend(
            towers
                .iter()
                .filter(|tower| tower.range > 0.0)
                .map(|tower| TowerWorkspace {
                    id: tower.id,
                    center: tower.center,
                    range: tower.range,
                }),
        );
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace
            .extend(enemies.alive().map(|enemy| EnemyCandidate {
                id: enemy.id,
                position: enemy.body.position,
            }));
    }
}

#[derive(Clone, Copy, Debug)]
struct TowerWorkspace {
    id: TowerId,
    center: Vec2,
    range: f32,
}

#[derive(Clone, Copy, Debug)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
}

#[derive(Clone, Copy, Debug)]
struct BestCandidate {
    distance: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance != other.distance {
            return self.distance < other.distance;
        }

        self.enemy < other.enemy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{
        Body, Color, EnemyKind, EnemySnapshot, TileCoord, TileRect, TileRectSize, TowerKind,
        TowerSnapshot,
    };
    use std::time::Duration;

    fn tower_snapshot(id: u32, center: (f32, f32), range: f32) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKind::Basic,
            region: TileRect::from_origin_and_size(TileCoord::new(0, 0), TileRectSize::new(1, 1)),
            center: Vec2::new(center.0, center.1),
            range,
            damage: 10,
            ready_in: Duration::ZERO,
            target: None,
        }
    }

    fn enemy_snapshot(id: u32, position: (f32, f32), alive: bool) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Light,
            body: Body::new(
                Vec2::new(position.0, position.1),
                8.0,
                Color::from_rgb(255, 0, 0),
            ),
            health: 10,
            max_health: 10,
            speed: 1.0,
            damage: 5,
            alive,
        }
    }

    fn run(towers: Vec<TowerSnapshot>, enemies: Vec<EnemySnapshot>) -> Vec<TowerTarget> {
        let mut system = TowerTargeting::new();
        let mut out = Vec::new();
        system.handle(
            Phase::Wave,
            &TowerView::from_snapshots(towers),
            &EnemyView::from_snapshots(enemies),
            &mut out,
        );
        out
    }

    #[test]
    fn nearest_enemy_within_range_is_selected() {
        let out = run(
            vec![tower_snapshot(1, (0.0, 0.0), 100.0)],
            vec![
                enemy_snapshot(1, (60.0, 0.0), true),
                enemy_snapshot(2, (0.0, 30.0), true),
                enemy_snapshot(3, (40.0, 0.0), true),
            ],
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].tower, TowerId::new(1));
        assert_eq!(out[0].enemy, EnemyId::new(2));
        assert!((out[0].distance - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn range_boundary_is_exclusive() {
        let out = run(
            vec![tower_snapshot(1, (0.0, 0.0), 50.0)],
            vec![enemy_snapshot(1, (30.0, 40.0), true)],
        );
        assert!(out.is_empty());

        let out = run(
            vec![tower_snapshot(1, (0.0, 0.0), 50.5)],
            vec![enemy_snapshot(1, (30.0, 40.0), true)],
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn smaller_enemy_id_is_preferred_when_distances_match() {
        let out = run(
            vec![tower_snapshot(1, (50.0, 50.0), 100.0)],
            vec![
                enemy_snapshot(20, (70.0, 50.0), true),
                enemy_snapshot(10, (30.0, 50.0), true),
            ],
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(10));
    }

    #[test]
    fn resolved_enemies_are_never_targeted() {
        let out = run(
            vec![tower_snapshot(1, (0.0, 0.0), 100.0)],
            vec![
                enemy_snapshot(1, (10.0, 0.0), false),
                enemy_snapshot(2, (90.0, 0.0), true),
            ],
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(2));
    }

    #[test]
    fn each_tower_picks_independently() {
        let out = run(
            vec![
                tower_snapshot(2, (100.0, 0.0), 30.0),
                tower_snapshot(1, (0.0, 0.0), 30.0),
            ],
            vec![
                enemy_snapshot(1, (10.0, 0.0), true),
                enemy_snapshot(2, (95.0, 0.0), true),
            ],
        );

        assert_eq!(
            out.iter()
                .map(|target| (target.tower, target.enemy))
                .collect::<Vec<_>>(),
            vec![
                (TowerId::new(1), EnemyId::new(1)),
                (TowerId::new(2), EnemyId::new(2)),
            ]
        );
    }

    #[test]
    fn build_phase_clears_output() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(1, (0.0, 0.0), 100.0)]);
        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(1, (1.0, 1.0), true)]);

        let mut out = vec![TowerTarget {
            tower: TowerId::new(99),
            enemy: EnemyId::new(99),
            distance: 0.0,
        }];

        system.handle(Phase::Build, &towers, &enemies, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn empty_collections_produce_no_targets() {
        let mut system = TowerTargeting::new();
        let mut out = Vec::new();

        system.handle(
            Phase::Wave,
            &TowerView::default(),
            &EnemyView::from_snapshots(vec![enemy_snapshot(1, (1.0, 1.0), true)]),
            &mut out,
        );
        assert!(out.is_empty());

        system.handle(
            Phase::Wave,
            &TowerView::from_snapshots(vec![tower_snapshot(1, (0.0, 0.0), 100.0)]),
            &EnemyView::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }
}
