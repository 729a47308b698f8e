use bevy::prelude::*;
use smallvec::SmallVec;

use super::config::{AdjacencyBounds, NavConfig};
use super::graph::NavGraph;
use super::types::{GridCell, GroundHit, Node, NodeId, SurfaceMask};

/// Downward ray cast against world geometry, supplied by the host.
///
/// Returns the first surface accepted by `mask` within `max_distance` below
/// `origin`, or `None` when there is nothing walkable there.
pub trait GroundProbe {
    fn probe_ground(&self, origin: Vec3, max_distance: f32, mask: SurfaceMask) -> Option<GroundHit>;
}

impl<F> GroundProbe for F
where
    F: Fn(Vec3, f32, SurfaceMask) -> Option<GroundHit>,
{
    fn probe_ground(&self, origin: Vec3, max_distance: f32, mask: SurfaceMask) -> Option<GroundHit> {
        self(origin, max_distance, mask)
    }
}

/// Sample the configured region and wire adjacency.
///
/// One probe per cell, cast from `probe_height`. Even rows are shifted half a
/// cell along x. Cells without walkable ground stay empty for the lifetime
/// of the graph.
pub fn build_graph<P: GroundProbe + ?Sized>(config: &NavConfig, probe: &P) -> NavGraph {
    let build_start = std::time::Instant::now();
    let columns = config.columns();
    let rows = config.rows();
    let mut graph = NavGraph::with_shape(columns, rows, config.spacing, config.origin);

    info!("[GRID] Sampling {} x {} cells at spacing {}", columns, rows, config.spacing);

    let shift = config.spacing / 2.0;
    for column in 0..columns {
        for row in 0..rows {
            let cell = GridCell::new(column, row);
            let ray_origin = Vec3::new(
                config.origin.x + column as f32 * config.spacing + if cell.is_shifted() { shift } else { 0.0 },
                config.probe_height,
                config.origin.y + row as f32 * config.spacing,
            );

            if let Some(hit) = probe.probe_ground(ray_origin, config.probe_distance, config.walkable_mask) {
                let id = NodeId(graph.nodes.len() as u32);
                graph.nodes.push(Node {
                    id,
                    cell,
                    position: hit.point,
                    normal: hit.normal,
                    neighbors: SmallVec::new(),
                });
                let index = graph.cell_index(cell);
                graph.cells[index] = Some(id);
            }
        }
    }

    connect_neighbors(&mut graph, config.max_height_diff, config.adjacency_bounds);

    let stats = graph.stats();
    info!(
        "[GRID] Built nav graph in {:?}: {} nodes, {} holes, {} edges",
        build_start.elapsed(),
        stats.nodes,
        stats.holes,
        stats.edges
    );
    if stats.nodes == 0 {
        warn!("[GRID] No walkable ground found in the sampled region");
    }

    graph
}

fn connect_neighbors(graph: &mut NavGraph, max_height_diff: f32, bounds: AdjacencyBounds) {
    for index in 0..graph.nodes.len() {
        let cell = graph.nodes[index].cell;
        let height = graph.nodes[index].position.y;

        let neighbors: SmallVec<[NodeId; 8]> = neighbor_cells(cell, graph.columns, graph.rows, bounds)
            .into_iter()
            .filter_map(|candidate| graph.cells[graph.cell_index(candidate)])
            .filter(|&id| (graph.position(id).y - height).abs() < max_height_diff)
            .collect();

        graph.nodes[index].neighbors = neighbors;
    }
}

/// Candidate cells linked from `cell`, in link order: the four axial cells,
/// the two same-column cells two rows away, then two diagonals whose column
/// side depends on whether the row is shifted.
pub(crate) fn neighbor_cells(
    cell: GridCell,
    columns: usize,
    rows: usize,
    bounds: AdjacencyBounds,
) -> SmallVec<[GridCell; 8]> {
    let (w, h) = (cell.column, cell.row);
    // Lowest index a "- 1" / "- 2" link may come from.
    let (min_minus_one, min_minus_two) = match bounds {
        AdjacencyBounds::Strict => (1, 2),
        AdjacencyBounds::Legacy => (2, 3),
    };

    let mut out = SmallVec::new();
    if h >= min_minus_one {
        out.push(GridCell::new(w, h - 1));
    }
    if h + 1 < rows {
        out.push(GridCell::new(w, h + 1));
    }
    if w >= min_minus_one {
        out.push(GridCell::new(w - 1, h));
    }
    if w + 1 < columns {
        out.push(GridCell::new(w + 1, h));
    }
    if h + 2 < rows {
        out.push(GridCell::new(w, h + 2));
    }
    if h >= min_minus_two {
        out.push(GridCell::new(w, h - 2));
    }

    if cell.is_shifted() {
        if w + 1 < columns && h > 0 {
            out.push(GridCell::new(w + 1, h - 1));
        }
        if w + 1 < columns && h + 1 < rows {
            out.push(GridCell::new(w + 1, h + 1));
        }
    } else {
        if w > 0 && h > 0 {
            out.push(GridCell::new(w - 1, h - 1));
        }
        if bounds == AdjacencyBounds::Strict && w > 0 && h + 1 < rows {
            out.push(GridCell::new(w - 1, h + 1));
        }
    }

    out
}
