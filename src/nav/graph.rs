use bevy::prelude::*;

use super::error::{NavError, NavResult};
use super::types::{GridCell, Node, NodeId};

/// Walkable-surface graph over a brick-offset grid.
///
/// Cells are stored row-major; a cell is `None` when the ground probe found
/// nothing walkable under it. Shape and adjacency never change after
/// [`build_graph`](super::build_graph) returns, so a shared `&NavGraph` is
/// safe for any number of concurrent readers.
#[derive(Clone, Debug, Default)]
pub struct NavGraph {
    pub(super) columns: usize,
    pub(super) rows: usize,
    pub(super) spacing: f32,
    pub(super) origin: Vec2,
    pub(super) cells: Vec<Option<NodeId>>,
    pub(super) nodes: Vec<Node>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub cells: usize,
    pub nodes: usize,
    pub holes: usize,
    pub edges: usize,
}

impl NavGraph {
    pub(super) fn with_shape(columns: usize, rows: usize, spacing: f32, origin: Vec2) -> Self {
        Self {
            columns,
            rows,
            spacing,
            origin,
            cells: vec![None; columns * rows],
            nodes: Vec::new(),
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn position(&self, id: NodeId) -> Vec3 {
        self.nodes[id.index()].position
    }

    #[inline]
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].neighbors
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    #[inline]
    pub(super) fn cell_index(&self, cell: GridCell) -> usize {
        cell.row * self.columns + cell.column
    }

    /// Node sampled at `cell`, `None` for holes and out-of-range cells.
    pub fn node_at(&self, cell: GridCell) -> Option<NodeId> {
        if cell.column >= self.columns || cell.row >= self.rows {
            return None;
        }
        self.cells[self.cell_index(cell)]
    }

    /// Cell containing a world position. Only x and z are considered; the
    /// half-cell shift of even rows is ignored, as during sampling.
    pub fn cell_for(&self, position: Vec3) -> NavResult<GridCell> {
        let local = Vec2::new(position.x, position.z) - self.origin;
        if !local.is_finite() || local.x < 0.0 || local.y < 0.0 {
            return Err(NavError::OutOfBounds { position });
        }

        let column = (local.x / self.spacing) as usize;
        let row = (local.y / self.spacing) as usize;
        if column >= self.columns || row >= self.rows {
            return Err(NavError::OutOfBounds { position });
        }
        Ok(GridCell::new(column, row))
    }

    /// Node for the cell containing `position`.
    pub fn locate(&self, position: Vec3) -> NavResult<NodeId> {
        let cell = self.cell_for(position)?;
        self.cells[self.cell_index(cell)].ok_or(NavError::EmptyCell {
            column: cell.column,
            row: cell.row,
        })
    }

    pub fn nearest_node(&self, position: Vec3) -> Option<NodeId> {
        self.locate(position).ok()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.neighbors.len()).sum()
    }

    pub fn stats(&self) -> GraphStats {
        let cells = self.cells.len();
        GraphStats {
            cells,
            nodes: self.nodes.len(),
            holes: cells - self.nodes.len(),
            edges: self.edge_count(),
        }
    }
}
