use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Surface layers a ground probe can report.
pub mod layers {
    pub const NONE: u32 = 0;
    pub const GROUND: u32 = 1 << 0;
    pub const STRUCTURE: u32 = 1 << 1;
    pub const WATER: u32 = 1 << 2;
    pub const WALKABLE: u32 = GROUND | STRUCTURE;
    pub const ALL: u32 = u32::MAX;
}

/// Bitmask of surface layers accepted by a ground probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceMask(pub u32);

impl SurfaceMask {
    pub const WALKABLE: Self = Self(layers::WALKABLE);
    pub const ALL: Self = Self(layers::ALL);

    #[inline]
    pub fn accepts(self, layer: u32) -> bool {
        self.0 & layer != 0
    }
}

impl Default for SurfaceMask {
    fn default() -> Self {
        Self::WALKABLE
    }
}

/// First walkable surface found below a probe origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundHit {
    pub point: Vec3,
    pub normal: Vec3,
}

/// Dense index of a node inside its [`NavGraph`](super::NavGraph).
///
/// Ids are assigned in sampling order and never change after the graph is
/// built, so they double as keys for per-search records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// (column, row) address of a sampled cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub column: usize,
    pub row: usize,
}

impl GridCell {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    /// Rows with an even index are sampled half a cell to the right.
    #[inline]
    pub fn is_shifted(self) -> bool {
        self.row % 2 == 0
    }
}

/// A sampled walkable point plus its outgoing edges.
///
/// Position and neighbors are fixed once the graph is built; all search
/// bookkeeping lives in per-search records, never on the node.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub cell: GridCell,
    pub position: Vec3,
    pub normal: Vec3,
    pub neighbors: SmallVec<[NodeId; 8]>,
}

/// How a search loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Goal dequeued, or the score threshold was beaten.
    Found,
    /// Step budget spent first.
    Exhausted,
    /// Frontier emptied before the goal or the budget.
    Starved,
}
