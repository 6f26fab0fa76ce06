use bastion_core::{MineKind, StructureKind, TileCoord, TileRect, TowerKind};
use bastion_session::GameSession;
use bastion_world::query;
use log::debug;

/// Scripted builder that rings the core with towers and a sparse minefield.
#[derive(Debug)]
pub(crate) struct Autopilot {
    tower_sites: Vec<TileCoord>,
    mine_sites: Vec<TileCoord>,
}

impl Autopilot {
    /// Plans build sites around the core of the session's world.
    pub(crate) fn around_core(session: &GameSession) -> Self {
        let world = session.world();
        let footprint = query::energy_core(world).footprint();
        let size = query::grid(world).size();
        Self {
            tower_sites: ring(footprint, 1, size),
            mine_sites: ring(footprint, 4, size)
                .into_iter()
                .step_by(3)
                .collect(),
        }
    }

    /// Spends the available currency, towers first, keeping `reserve` aside.
    /// Returns the number of structures placed.
    pub(crate) fn build(&self, session: &mut GameSession, reserve: u32) -> u32 {
        let config = query::config(session.world());
        let tower_cost = config.towers.basic.cost;
        let mine_cost = config.mines.proximity.cost;

        let mut placed = 0;
        let sites = self
            .tower_sites
            .iter()
            .map(|site| (StructureKind::Tower(TowerKind::Basic), tower_cost, *site))
            .chain(
                self.mine_sites
                    .iter()
                    .map(|site| (StructureKind::Mine(MineKind::Proximity), mine_cost, *site)),
            );
        for (kind, cost, site) in sites {
            if session.energy() < cost.saturating_add(reserve) {
                continue;
            }
            let free = match kind {
                StructureKind::Tower(tower) => session.can_place(tower, site),
                StructureKind::Mine(mine) => session.can_place_mine(mine, site),
            };
            if free && session.place_structure(kind, site).is_ok() {
                debug!("placed {kind:?} at ({}, {})", site.column(), site.row());
                placed += 1;
            }
        }
        placed
    }
}

/// Tiles at Chebyshev distance `distance` from the footprint, in row-major
/// order, clipped to the grid.
fn ring(footprint: TileRect, distance: u32, grid_size: u32) -> Vec<TileCoord> {
    let distance = i64::from(distance);
    let origin = footprint.origin();
    let left = i64::from(origin.column()) - distance;
    let top = i64::from(origin.row()) - distance;
    let right = i64::from(origin.column()) + i64::from(footprint.size().width()) - 1 + distance;
    let bottom = i64::from(origin.row()) + i64::from(footprint.size().height()) - 1 + distance;
    let limit = i64::from(grid_size);

    let mut tiles = Vec::new();
    for row in top..=bottom {
        for column in left..=right {
            let on_border = row == top || row == bottom || column == left || column == right;
            let inside = (0..limit).contains(&row) && (0..limit).contains(&column);
            if on_border && inside {
                if let (Ok(column), Ok(row)) = (u32::try_from(column), u32::try_from(row)) {
                    tiles.push(TileCoord::new(column, row));
                }
            }
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{GameConfig, TileRectSize};

    #[test]
    fn ring_surrounds_the_footprint() {
        let footprint =
            TileRect::from_origin_and_size(TileCoord::new(9, 9), TileRectSize::new(2, 2));
        let tiles = ring(footprint, 1, 20);
        assert_eq!(tiles.len(), 12);
        assert_eq!(tiles.first(), Some(&TileCoord::new(8, 8)));
        assert_eq!(tiles.last(), Some(&TileCoord::new(11, 11)));
        assert!(tiles.iter().all(|tile| !footprint.contains(*tile)));
    }

    #[test]
    fn ring_is_clipped_to_the_grid() {
        let footprint =
            TileRect::from_origin_and_size(TileCoord::new(0, 0), TileRectSize::new(1, 1));
        assert_eq!(
            ring(footprint, 1, 5),
            vec![
                TileCoord::new(1, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1)
            ]
        );
    }

    #[test]
    fn build_spends_down_to_the_reserve() {
        let mut session = GameSession::new(GameConfig::default(), 1).expect("valid config");
        let autopilot = Autopilot::around_core(&session);

        let placed = autopilot.build(&mut session, 50);
        assert_eq!(placed, 2);
        assert_eq!(session.energy(), 50);
        assert_eq!(query::tower_view(session.world()).iter().count(), 2);
    }
}
