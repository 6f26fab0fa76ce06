//! Tile terrain, occupancy and spawn-edge geometry.

use bastion_core::{GridConfig, Occupant, RejectionReason, SpawnEdges, TileCoord, TileRect};
use glam::Vec2;

/// Build state of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileState {
    /// Covered by the core or a structure footprint.
    Occupied,
    /// Free terrain that accepts structures.
    Buildable,
    /// Terrain that never accepts structures. Enemies still cross it.
    Blocked,
}

/// Square tile grid with a parallel occupancy map.
///
/// Every tile is owned by at most one occupant. Footprints are written and
/// released as a whole so the terrain layer and the occupancy map never
/// disagree.
#[derive(Clone, Debug)]
pub struct Grid {
    size: u32,
    tile_length: f32,
    tiles: Vec<TileState>,
    occupants: Vec<Option<Occupant>>,
    spawn_edges: SpawnEdges,
}

impl Grid {
    /// Creates a grid with the configured terrain.
    #[must_use]
    pub fn new(config: &GridConfig) -> Self {
        let size = config.size;
        let capacity_u64 = u64::from(size) * u64::from(size);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut grid = Self {
            size,
            tile_length: config.tile_length,
            tiles: vec![TileState::Buildable; capacity],
            occupants: vec![None; capacity],
            spawn_edges: SpawnEdges::for_square_grid(size),
        };

        let blocked = match &config.blocked_tiles {
            Some(tiles) => tiles.clone(),
            None => corner_terrain(size),
        };
        for tile in blocked {
            if let Some(index) = grid.index(tile) {
                grid.tiles[index] = TileState::Blocked;
            }
        }

        grid
    }

    /// Number of tiles along each side.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Edge length of a tile in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// World-space centre of the tile.
    #[must_use]
    pub fn tile_center(&self, tile: TileCoord) -> Vec2 {
        tile.center(self.tile_length)
    }

    /// Build state of the tile, or `None` outside the grid.
    #[must_use]
    pub fn tile_state(&self, tile: TileCoord) -> Option<TileState> {
        self.index(tile).map(|index| self.tiles[index])
    }

    /// Occupant owning the tile, if any.
    #[must_use]
    pub fn occupant(&self, tile: TileCoord) -> Option<Occupant> {
        self.index(tile).and_then(|index| self.occupants[index])
    }

    /// Reports whether a structure could cover the tile.
    #[must_use]
    pub fn is_buildable(&self, tile: TileCoord) -> bool {
        self.tile_state(tile) == Some(TileState::Buildable)
    }

    /// Edge tiles grouped by side.
    #[must_use]
    pub const fn spawn_edges(&self) -> &SpawnEdges {
        &self.spawn_edges
    }

    /// Iterates every tile with its state and occupant in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, TileState, Option<Occupant>)> + '_ {
        let size = self.size;
        self.tiles
            .iter()
            .zip(self.occupants.iter())
            .enumerate()
            .map(move |(index, (state, occupant))| {
                let index = index as u32;
                (
                    TileCoord::new(index % size, index / size),
                    *state,
                    *occupant,
                )
            })
    }

    /// Checks that every tile of the footprint lies on free, buildable terrain.
    pub fn check_footprint(&self, region: TileRect) -> Result<(), RejectionReason> {
        let size = region.size();
        if size.is_empty() {
            return Err(RejectionReason::TileNotBuildable);
        }

        let origin = region.origin();
        let fits_columns = u64::from(origin.column()) + u64::from(size.width()) <= u64::from(self.size);
        let fits_rows = u64::from(origin.row()) + u64::from(size.height()) <= u64::from(self.size);
        if !fits_columns || !fits_rows {
            return Err(RejectionReason::TileNotBuildable);
        }

        if region.tiles().any(|tile| self.occupant(tile).is_some()) {
            return Err(RejectionReason::TileOccupied);
        }

        if !region.tiles().all(|tile| self.is_buildable(tile)) {
            return Err(RejectionReason::TileNotBuildable);
        }

        Ok(())
    }

    /// Marks every tile of the footprint as owned by the occupant.
    ///
    /// Callers validate the footprint with [`Grid::check_footprint`] first.
    pub(crate) fn occupy(&mut self, region: TileRect, occupant: Occupant) {
        for tile in region.tiles() {
            if let Some(index) = self.index(tile) {
                self.tiles[index] = TileState::Occupied;
                self.occupants[index] = Some(occupant);
            }
        }
    }

    /// Frees every tile of the footprint owned by the occupant.
    pub(crate) fn release(&mut self, region: TileRect, occupant: Occupant) {
        for tile in region.tiles() {
            if let Some(index) = self.index(tile) {
                if self.occupants[index] == Some(occupant) {
                    self.occupants[index] = None;
                    self.tiles[index] = TileState::Buildable;
                }
            }
        }
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.column() < self.size && tile.row() < self.size {
            let row = usize::try_from(tile.row()).ok()?;
            let column = usize::try_from(tile.column()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Default terrain: three blocked tiles hugging each corner.
fn corner_terrain(size: u32) -> Vec<TileCoord> {
    if size < 2 {
        return Vec::new();
    }

    let last = size - 1;
    vec![
        TileCoord::new(0, 0),
        TileCoord::new(0, 1),
        TileCoord::new(1, 0),
        TileCoord::new(last, 0),
        TileCoord::new(last - 1, 0),
        TileCoord::new(last, 1),
        TileCoord::new(0, last),
        TileCoord::new(0, last - 1),
        TileCoord::new(1, last),
        TileCoord::new(last, last),
        TileCoord::new(last, last - 1),
        TileCoord::new(last - 1, last),
    ]
}
