#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bastion engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The session submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod config;
mod wave;

pub use config::{
    ConfigError, CoreConfig, CoreMining, CountdownConfig, EconomyConfig, EnemyTable,
    EnemyTemplate, GameConfig, GridConfig, MineStats, MineTable, PreviewConfig, RepairConfig,
    TowerStats, TowerTable, WaveFocusConfig, WaveScaling,
};
pub use wave::{scaled_stats, share_of, WaveParameters};

/// Phase of the defence loop the session is currently in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Structures may be placed and sold; no combat takes place.
    Build,
    /// Warning period between committing to a wave and the first spawn.
    Countdown,
    /// Enemies spawn, move and fight.
    Wave,
    /// Every enemy of the wave is resolved and the reward awaits acknowledgement.
    WaveComplete,
    /// The energy core was destroyed; the session accepts no further actions.
    GameOver,
}

impl Phase {
    /// Reports whether structures may be placed or sold in this phase.
    #[must_use]
    pub const fn allows_building(self) -> bool {
        matches!(self, Self::Build)
    }

    /// Reports whether the phase is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver)
    }

    /// Human readable label suitable for status panels.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Build => "Build",
            Self::Countdown => "Countdown",
            Self::Wave => "Wave",
            Self::WaveComplete => "Wave Complete",
            Self::GameOver => "Game Over",
        }
    }
}

/// Cardinal edges of the map, used to bias spawn locations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Edge with row index zero.
    North,
    /// Edge with the highest column index.
    East,
    /// Edge with the highest row index.
    South,
    /// Edge with column index zero.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];
}

/// Unique identifier assigned to an enemy. Identifiers grow with spawn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a mine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MineId(u32);

impl MineId {
    /// Creates a new mine identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the mine identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new grid tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// World-space centre of the tile for the provided tile edge length.
    #[must_use]
    pub fn center(self, tile_length: f32) -> Vec2 {
        Vec2::new(
            (self.column as f32 + 0.5) * tile_length,
            (self.row as f32 + 0.5) * tile_length,
        )
    }
}

/// Axis-aligned rectangle expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    origin: TileCoord,
    size: TileRectSize,
}

impl TileRect {
    /// Constructs a rectangle from an origin tile and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: TileCoord, size: TileRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left tile that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> TileCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole tiles.
    #[must_use]
    pub const fn size(&self) -> TileRectSize {
        self.size
    }

    /// Reports whether the tile lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.column >= self.origin.column
            && tile.row >= self.origin.row
            && tile.column - self.origin.column < self.size.width
            && tile.row - self.origin.row < self.size.height
    }

    /// Iterates every tile covered by the rectangle in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> {
        let origin = self.origin;
        let width = self.size.width;
        (0..self.size.height).flat_map(move |dy| {
            (0..width).map(move |dx| TileCoord::new(origin.column + dx, origin.row + dy))
        })
    }

    /// World-space centre of the footprint, which is not the origin tile centre
    /// for footprints larger than one tile.
    #[must_use]
    pub fn center(&self, tile_length: f32) -> Vec2 {
        Vec2::new(
            (self.origin.column as f32 + self.size.width as f32 / 2.0) * tile_length,
            (self.origin.row as f32 + self.size.height as f32 / 2.0) * tile_length,
        )
    }
}

/// Size of a [`TileRect`] measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRectSize {
    width: u32,
    height: u32,
}

impl TileRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Display colour carried by simulated objects. Opaque to simulation logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

impl From<[u8; 3]> for Color {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self::from_rgb(red, green, blue)
    }
}

impl From<Color> for [u8; 3] {
    fn from(color: Color) -> Self {
        [color.red, color.green, color.blue]
    }
}

/// Positional state shared by every simulated object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// World-space centre of the object.
    pub position: Vec2,
    /// Display radius of the object in world units.
    pub radius: f32,
    /// Display colour of the object.
    pub color: Color,
}

impl Body {
    /// Creates a new body at the provided position.
    #[must_use]
    pub const fn new(position: Vec2, radius: f32, color: Color) -> Self {
        Self {
            position,
            radius,
            color,
        }
    }

    /// Euclidean distance between the centres of two bodies.
    #[must_use]
    pub fn distance_to(&self, other: &Body) -> f32 {
        self.position.distance(other.position)
    }

    /// Euclidean distance between the body centre and an arbitrary point.
    #[must_use]
    pub fn distance_to_point(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }
}

/// Enemy archetypes mixed into every wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Fast, fragile enemy that makes up the bulk of early waves.
    Light,
    /// Slow, durable enemy whose share grows every wave.
    Heavy,
}

impl EnemyKind {
    /// Lower-case tag used in logs and status panels.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Heavy => "heavy",
        }
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Basic tower with default attack parameters.
    Basic,
}

/// Types of mines that can be laid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MineKind {
    /// Single-shot mine that detonates when an enemy enters its radius.
    Proximity,
}

/// Any structure the player can place during the build phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// Auto-targeting tower.
    Tower(TowerKind),
    /// Proximity mine.
    Mine(MineKind),
}

/// Identity of a placed structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StructureId {
    /// Identifier of a tower.
    Tower(TowerId),
    /// Identifier of a mine.
    Mine(MineId),
}

/// Owner of a grid tile within the occupancy map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Occupant {
    /// Tile covered by the energy core footprint.
    Core,
    /// Tile covered by a structure footprint.
    Structure(StructureId),
}

/// Wave-scaled statistics assigned to an enemy at spawn time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Starting and maximum health.
    pub health: u32,
    /// Movement speed in world units per normalised frame.
    pub speed: f32,
    /// Damage dealt to the core on arrival.
    pub damage: u32,
}

/// Player-facing actions that may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    /// Committing to the next wave.
    StartWave,
    /// Placing a tower or mine.
    PlaceStructure,
    /// Selling a tower or mine.
    SellStructure,
    /// Acknowledging a completed wave.
    AcknowledgeWave,
    /// Spending currency on the one-time core repair.
    EmergencyRepair,
}

/// Reasons a player action may be rejected. `Display` yields the user-facing text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum RejectionReason {
    /// Currency does not cover the structure cost.
    #[error("Not enough energy")]
    InsufficientFunds,
    /// The footprint leaves the grid or covers blocked terrain.
    #[error("Can't build here")]
    TileNotBuildable,
    /// The footprint overlaps the core or another structure.
    #[error("Tile already occupied")]
    TileOccupied,
    /// The action is not allowed in the current phase.
    #[error("Not allowed during this phase")]
    WrongPhase,
    /// No sellable structure covers the tile.
    #[error("Nothing to sell here")]
    NothingToSell,
    /// The one-time repair was already spent.
    #[error("Emergency repair already used")]
    RepairAlreadyUsed,
    /// Currency does not cover the repair cost.
    #[error("Not enough energy for repair")]
    RepairInsufficientFunds,
    /// Emergency repair is disabled by configuration.
    #[error("Emergency repair unavailable")]
    RepairUnavailable,
    /// Configuration requires a tower before the first wave may start.
    #[error("Place at least one tower first")]
    TowerRequired,
    /// The core was destroyed and the session has ended.
    #[error("The core has fallen")]
    SessionOver,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Records the edge that the next wave will favour.
    SetWaveFocus {
        /// Favoured edge, or `None` when spawns are unbiased.
        direction: Option<Direction>,
    },
    /// Commits to the next wave with the provided spawn quota.
    StartWave {
        /// Number of enemies that must spawn before the wave may complete.
        enemy_quota: u32,
    },
    /// Requests that an enemy spawn on the provided edge tile.
    SpawnEnemy {
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Edge tile whose centre becomes the spawn position.
        tile: TileCoord,
        /// Wave-scaled statistics of the enemy.
        stats: EnemyStats,
    },
    /// Moves an enemy to a new world-space position.
    AdvanceEnemy {
        /// Identifier of the moving enemy.
        enemy: EnemyId,
        /// Destination of the move.
        position: Vec2,
    },
    /// Reports that an enemy reached the core and delivers its damage.
    StrikeCore {
        /// Identifier of the arriving enemy.
        enemy: EnemyId,
    },
    /// Replaces every tower's tracked target.
    AssignTowerTargets {
        /// Targets selected for this tick; towers not listed track nothing.
        targets: Vec<TowerTarget>,
    },
    /// Fires a ready tower at its target. If the target has already fallen
    /// the tower picks the nearest living enemy in range, or holds its shot.
    FireTower {
        /// Identifier of the firing tower.
        tower: TowerId,
        /// Identifier of the enemy being shot.
        target: EnemyId,
    },
    /// Detonates an armed mine, damaging every living enemy within its radius.
    /// The mine stays armed when no living enemy is within reach.
    DetonateMine {
        /// Identifier of the triggered mine.
        mine: MineId,
    },
    /// Checks whether the active wave is finished.
    EvaluateWave,
    /// Requests placement of a structure anchored at the provided origin tile.
    PlaceStructure {
        /// Kind of structure to construct.
        kind: StructureKind,
        /// Upper-left tile of the footprint.
        origin: TileCoord,
    },
    /// Requests the sale of whichever structure covers the tile.
    SellStructure {
        /// Any tile inside the structure footprint.
        tile: TileCoord,
    },
    /// Acknowledges a completed wave, paying out and degrading the core.
    AcknowledgeWave,
    /// Spends currency on the one-time core repair.
    EmergencyRepair,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the session entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
    },
    /// Announces that a build phase opened ahead of the given wave.
    BuildPhaseStarted {
        /// Wave that the build phase prepares for.
        wave: u32,
    },
    /// Confirms the favoured edge of the upcoming wave.
    WaveFocusChanged {
        /// Favoured edge, or `None` when spawns are unbiased.
        direction: Option<Direction>,
    },
    /// Confirms that the player committed to a wave.
    WaveCommitted {
        /// Number of the committed wave.
        wave: u32,
        /// Number of enemies the wave must spawn.
        enemy_quota: u32,
        /// Favoured edge of the wave.
        focus: Option<Direction>,
    },
    /// Announces that enemies may now spawn.
    WaveStarted {
        /// Number of the wave.
        wave: u32,
    },
    /// Confirms that an enemy entered the field.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Edge tile the enemy spawned on.
        tile: TileCoord,
    },
    /// Reports that an enemy died to tower or mine damage.
    EnemyKilled {
        /// Identifier of the slain enemy.
        enemy: EnemyId,
    },
    /// Reports that an enemy reached the core and damaged it.
    EnemyReachedCore {
        /// Identifier of the arriving enemy.
        enemy: EnemyId,
        /// Damage delivered to the core.
        damage: u32,
    },
    /// Confirms that a tower attacked.
    TowerFired {
        /// Identifier of the firing tower.
        tower: TowerId,
        /// Identifier of the targeted enemy.
        target: EnemyId,
        /// Damage applied.
        damage: u32,
    },
    /// Confirms that a mine detonated.
    MineDetonated {
        /// Identifier of the mine.
        mine: MineId,
        /// Number of enemies caught in the blast.
        victims: u32,
    },
    /// Confirms that a detonated mine finished and left play.
    MineConsumed {
        /// Identifier of the mine.
        mine: MineId,
        /// Tiles released by the mine.
        region: TileRect,
    },
    /// Confirms that a structure was placed.
    StructurePlaced {
        /// Identity assigned to the structure.
        structure: StructureId,
        /// Kind of structure placed.
        kind: StructureKind,
        /// Tiles covered by the structure.
        region: TileRect,
        /// Currency spent.
        cost: u32,
    },
    /// Confirms that a structure was sold.
    StructureSold {
        /// Identity of the sold structure.
        structure: StructureId,
        /// Tiles released by the sale.
        region: TileRect,
        /// Currency refunded.
        refund: u32,
    },
    /// Reports that a player action was rejected.
    ActionRejected {
        /// Action that was attempted.
        action: PlayerAction,
        /// Reason the action failed.
        reason: RejectionReason,
    },
    /// Reports that every enemy of the wave is resolved.
    WaveCleared {
        /// Counters describing the wave.
        summary: WaveSummary,
        /// Reward that acknowledgement will pay out.
        reward: u32,
    },
    /// Confirms that a completed wave was acknowledged.
    WaveRewarded {
        /// Number of the acknowledged wave.
        wave: u32,
        /// Currency paid out.
        reward: u32,
        /// Core maximum integrity after degradation.
        max_integrity: u32,
    },
    /// Confirms the emergency repair.
    CoreRepaired {
        /// Integrity actually restored.
        restored: u32,
        /// Currency spent.
        cost: u32,
    },
    /// Announces that the core fell and the session ended.
    CoreDestroyed {
        /// Wave during which the core fell.
        wave: u32,
    },
}

/// Counters describing the outcome of a single wave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaveSummary {
    /// Number of the wave.
    pub wave: u32,
    /// Enemies that entered the field.
    pub spawned: u32,
    /// Enemies slain by towers or mines.
    pub killed: u32,
    /// Enemies that reached the core.
    pub reached_core: u32,
}

/// Tower-to-enemy assignment computed by the targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Distance between the tower centre and the enemy.
    pub distance: f32,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Position, size and colour of the enemy.
    pub body: Body,
    /// Remaining health.
    pub health: u32,
    /// Health at spawn time.
    pub max_health: u32,
    /// Movement speed in world units per normalised frame.
    pub speed: f32,
    /// Damage dealt to the core on arrival.
    pub damage: u32,
    /// Indicates whether the enemy is still active.
    pub alive: bool,
}

impl EnemySnapshot {
    /// Remaining health as a fraction of the spawn health, for health bars.
    #[must_use]
    pub fn health_percentage(&self) -> f32 {
        if self.max_health == 0 {
            0.0
        } else {
            self.health as f32 / self.max_health as f32
        }
    }
}

/// Read-only snapshot describing every enemy of the current wave.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the living enemies in spawn order.
    pub fn alive(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter().filter(|snapshot| snapshot.alive)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Tiles occupied by the tower.
    pub region: TileRect,
    /// World-space centre of the footprint.
    pub center: Vec2,
    /// Targeting range in world units.
    pub range: f32,
    /// Damage applied per attack.
    pub damage: u32,
    /// Time remaining before the tower may fire again.
    pub ready_in: Duration,
    /// Enemy tracked during the last tick, if any.
    pub target: Option<EnemyId>,
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Locates the snapshot for the provided tower.
    #[must_use]
    pub fn get(&self, tower: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single mine's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MineSnapshot {
    /// Identifier allocated to the mine by the world.
    pub id: MineId,
    /// Kind of mine that was laid.
    pub kind: MineKind,
    /// Tiles occupied by the mine.
    pub region: TileRect,
    /// World-space centre of the footprint.
    pub center: Vec2,
    /// Blast radius in world units.
    pub radius: f32,
    /// Damage applied to every enemy caught in the blast.
    pub damage: u32,
    /// Indicates whether the mine still waits for a trigger.
    pub armed: bool,
    /// Indicates whether the mine already detonated.
    pub detonated: bool,
    /// Time elapsed since detonation.
    pub detonated_for: Duration,
}

/// Read-only snapshot describing all mines in play.
#[derive(Clone, Debug, Default)]
pub struct MineView {
    snapshots: Vec<MineSnapshot>,
}

impl MineView {
    /// Creates a new mine view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MineSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured mine snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &MineSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MineSnapshot> {
        self.snapshots
    }
}

/// Edge tiles of the map grouped by the side they lie on.
///
/// Corner tiles belong to both of their edges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpawnEdges {
    north: Vec<TileCoord>,
    east: Vec<TileCoord>,
    south: Vec<TileCoord>,
    west: Vec<TileCoord>,
    perimeter: Vec<TileCoord>,
}

impl SpawnEdges {
    /// Builds the edge sets of a square grid with `size` tiles per side.
    #[must_use]
    pub fn for_square_grid(size: u32) -> Self {
        if size == 0 {
            return Self::default();
        }

        let last = size - 1;
        let north: Vec<TileCoord> = (0..size).map(|column| TileCoord::new(column, 0)).collect();
        let south: Vec<TileCoord> = (0..size)
            .map(|column| TileCoord::new(column, last))
            .collect();
        let west: Vec<TileCoord> = (0..size).map(|row| TileCoord::new(0, row)).collect();
        let east: Vec<TileCoord> = (0..size).map(|row| TileCoord::new(last, row)).collect();

        let mut perimeter = Vec::with_capacity(north.len() * 4);
        perimeter.extend_from_slice(&north);
        for tile in south.iter().chain(&west).chain(&east) {
            if !perimeter.contains(tile) {
                perimeter.push(*tile);
            }
        }

        Self {
            north,
            east,
            south,
            west,
            perimeter,
        }
    }

    /// Tiles along the provided edge.
    #[must_use]
    pub fn edge(&self, direction: Direction) -> &[TileCoord] {
        match direction {
            Direction::North => &self.north,
            Direction::East => &self.east,
            Direction::South => &self.south,
            Direction::West => &self.west,
        }
    }

    /// Every edge tile exactly once.
    #[must_use]
    pub fn perimeter(&self) -> &[TileCoord] {
        &self.perimeter
    }

    /// Edge tiles not lying on the provided edge.
    #[must_use]
    pub fn excluding(&self, direction: Direction) -> Vec<TileCoord> {
        let edge = self.edge(direction);
        self.perimeter
            .iter()
            .copied()
            .filter(|tile| !edge.contains(tile))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footprint_center_differs_from_origin_tile_center() {
        let rect = TileRect::from_origin_and_size(TileCoord::new(2, 3), TileRectSize::new(2, 2));
        assert_eq!(rect.center(10.0), Vec2::new(30.0, 40.0));
        assert_eq!(rect.origin().center(10.0), Vec2::new(25.0, 35.0));
    }

    #[test]
    fn rect_tiles_cover_the_footprint_exactly() {
        let rect = TileRect::from_origin_and_size(TileCoord::new(1, 1), TileRectSize::new(2, 3));
        let tiles: Vec<_> = rect.tiles().collect();
        assert_eq!(tiles.len(), 6);
        assert!(tiles.iter().all(|tile| rect.contains(*tile)));
        assert!(!rect.contains(TileCoord::new(3, 1)));
        assert!(!rect.contains(TileCoord::new(0, 1)));
        assert!(!rect.contains(TileCoord::new(1, 4)));
    }

    #[test]
    fn body_distance_is_euclidean() {
        let color = Color::from_rgb(0, 0, 0);
        let first = Body::new(Vec2::new(0.0, 0.0), 1.0, color);
        let second = Body::new(Vec2::new(3.0, 4.0), 1.0, color);
        assert!((first.distance_to(&second) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn perimeter_lists_each_edge_tile_once() {
        let edges = SpawnEdges::for_square_grid(5);
        assert_eq!(edges.perimeter().len(), 16);
        assert_eq!(edges.edge(Direction::North).len(), 5);
        assert!(edges.edge(Direction::East).contains(&TileCoord::new(4, 0)));
        assert!(edges.edge(Direction::North).contains(&TileCoord::new(4, 0)));
    }

    #[test]
    fn excluding_an_edge_drops_its_corners() {
        let edges = SpawnEdges::for_square_grid(4);
        let rest = edges.excluding(Direction::West);
        assert_eq!(rest.len(), 12 - 4);
        assert!(rest.iter().all(|tile| tile.column() != 0));
    }

    #[test]
    fn rejection_reasons_render_user_facing_text() {
        assert_eq!(
            RejectionReason::InsufficientFunds.to_string(),
            "Not enough energy"
        );
        assert_eq!(
            RejectionReason::RepairAlreadyUsed.to_string(),
            "Emergency repair already used"
        );
    }

    #[test]
    fn health_percentage_tolerates_zero_maximum() {
        let mut enemy = EnemySnapshot {
            id: EnemyId::new(0),
            kind: EnemyKind::Light,
            body: Body::new(Vec2::ZERO, 8.0, Color::from_rgb(0, 0, 0)),
            health: 15,
            max_health: 60,
            speed: 1.0,
            damage: 5,
            alive: true,
        };
        assert!((enemy.health_percentage() - 0.25).abs() < f32::EPSILON);
        enemy.max_health = 0;
        assert_eq!(enemy.health_percentage(), 0.0);
    }

    #[test]
    fn only_build_phase_allows_building() {
        assert!(Phase::Build.allows_building());
        for phase in [
            Phase::Countdown,
            Phase::Wave,
            Phase::WaveComplete,
            Phase::GameOver,
        ] {
            assert!(!phase.allows_building(), "{phase:?} must reject building");
        }
    }
}
