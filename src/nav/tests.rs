/// Tests for graph construction, path search, the flow field and fleeing.
///
/// Most graphs here are built from a heightfield with snapped hits, so node
/// (column, row) sits exactly at world (column, height, row) and expected
/// directions can be written down by hand.

use super::*;
use super::grid_build::neighbor_cells;
use crate::terrain::{Heightfield, Sample};
use std::collections::VecDeque;

fn lattice_config(columns: usize, rows: usize) -> NavConfig {
    NavConfig {
        origin: Vec2::ZERO,
        size: Vec2::new(columns as f32, rows as f32),
        spacing: 1.0,
        step_cost: 0.0,
        ..default()
    }
}

fn lattice_with(
    config: &NavConfig,
    sample: impl FnMut(usize, usize) -> Option<Sample>,
) -> NavGraph {
    let field = Heightfield::from_fn(config.origin, config.spacing, config.columns(), config.rows(), sample)
        .with_snapped_hits(true);
    build_graph(config, &field)
}

fn flat_lattice(columns: usize, rows: usize) -> NavGraph {
    lattice_with(&lattice_config(columns, rows), |_, _| Some(Sample::ground(0.0)))
}

fn at(column: usize, row: usize) -> Vec3 {
    Vec3::new(column as f32, 0.0, row as f32)
}

fn id(graph: &NavGraph, column: usize, row: usize) -> NodeId {
    graph
        .node_at(GridCell::new(column, row))
        .unwrap_or_else(|| panic!("no node at ({column}, {row})"))
}

fn cells_of(graph: &NavGraph, ids: &[NodeId]) -> Vec<(usize, usize)> {
    ids.iter()
        .map(|&n| {
            let cell = graph.node(n).cell;
            (cell.column, cell.row)
        })
        .collect()
}

/// Hop distance from `source` to every node, `None` when unreachable.
fn hop_distances(graph: &NavGraph, source: NodeId) -> Vec<Option<usize>> {
    let mut hops = vec![None; graph.len()];
    let mut queue = VecDeque::new();
    hops[source.index()] = Some(0);
    queue.push_back(source);
    while let Some(current) = queue.pop_front() {
        let next = hops[current.index()].map(|h| h + 1);
        for &neighbor in graph.neighbors(current) {
            if hops[neighbor.index()].is_none() {
                hops[neighbor.index()] = next;
                queue.push_back(neighbor);
            }
        }
    }
    hops
}

fn assert_close(actual: Vec3, expected: Vec3, tolerance: f32) {
    assert!(
        (actual - expected).abs().max_element() < tolerance,
        "expected {expected} (±{tolerance}), got {actual}"
    );
}

// ============================================================================
// Grid build
// ============================================================================

#[test]
fn test_every_edge_respects_height_limit() {
    let config = lattice_config(24, 24);
    let mut rng = fastrand::Rng::with_seed(42);
    let graph = lattice_with(&config, |_, _| {
        if rng.u8(..) < 20 {
            None
        } else {
            Some(Sample::ground(rng.f32() * 2.0))
        }
    });

    assert!(!graph.is_empty());
    for node in graph.nodes() {
        for &neighbor in &node.neighbors {
            let dy = (graph.position(neighbor).y - node.position.y).abs();
            assert!(
                dy < config.max_height_diff,
                "edge {:?} -> {:?} climbs {dy}",
                node.cell,
                graph.node(neighbor).cell
            );
        }
    }
}

#[test]
fn test_strict_adjacency_is_symmetric() {
    let config = lattice_config(16, 16);
    let mut rng = fastrand::Rng::with_seed(7);
    let graph = lattice_with(&config, |_, _| Some(Sample::ground(rng.f32())));

    for node in graph.nodes() {
        for &neighbor in &node.neighbors {
            assert!(
                graph.neighbors(neighbor).contains(&node.id),
                "{:?} links {:?} but not back",
                node.cell,
                graph.node(neighbor).cell
            );
        }
    }
}

#[test]
fn test_equal_heights_never_link_with_zero_limit() {
    let config = NavConfig {
        max_height_diff: 0.0,
        ..lattice_config(4, 4)
    };
    let graph = lattice_with(&config, |_, _| Some(Sample::ground(0.0)));

    assert_eq!(graph.len(), 16);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_holes_have_no_node_and_no_edges() {
    let graph = lattice_with(&lattice_config(5, 5), |x, z| {
        if (x, z) == (2, 2) { None } else { Some(Sample::ground(0.0)) }
    });

    let stats = graph.stats();
    assert_eq!(stats.cells, 25);
    assert_eq!(stats.nodes, 24);
    assert_eq!(stats.holes, 1);
    assert!(graph.node_at(GridCell::new(2, 2)).is_none());

    for node in graph.nodes() {
        assert_ne!(node.cell, GridCell::new(2, 2));
        for &neighbor in &node.neighbors {
            assert_ne!(graph.node(neighbor).cell, GridCell::new(2, 2));
        }
    }
}

#[test]
fn test_non_walkable_layer_is_a_hole() {
    let graph = lattice_with(&lattice_config(3, 3), |x, z| {
        if (x, z) == (0, 0) {
            Some(Sample { height: 0.0, layer: layers::WATER })
        } else {
            Some(Sample::ground(0.0))
        }
    });

    assert_eq!(graph.len(), 8);
    assert!(graph.node_at(GridCell::new(0, 0)).is_none());
}

#[test]
fn test_strict_neighbor_order_and_bounds() {
    let graph = flat_lattice(3, 3);

    assert_eq!(
        cells_of(&graph, graph.neighbors(id(&graph, 0, 0))),
        vec![(0, 1), (1, 0), (0, 2), (1, 1)]
    );
    assert_eq!(
        cells_of(&graph, graph.neighbors(id(&graph, 1, 1))),
        vec![(1, 0), (1, 2), (0, 1), (2, 1), (0, 0), (0, 2)]
    );
    assert_eq!(
        cells_of(&graph, graph.neighbors(id(&graph, 2, 2))),
        vec![(2, 1), (1, 2), (2, 0)]
    );
}

#[test]
fn test_legacy_bounds_drop_low_index_links() {
    let strict = neighbor_cells(GridCell::new(1, 1), 3, 3, AdjacencyBounds::Strict);
    let legacy = neighbor_cells(GridCell::new(1, 1), 3, 3, AdjacencyBounds::Legacy);

    assert_eq!(strict.len(), 6);
    assert_eq!(
        legacy.as_slice(),
        &[GridCell::new(1, 2), GridCell::new(2, 1), GridCell::new(0, 0)]
    );

    // Row - 2 needs index 3 under the historical bounds.
    let strict = neighbor_cells(GridCell::new(0, 2), 1, 5, AdjacencyBounds::Strict);
    let legacy = neighbor_cells(GridCell::new(0, 2), 1, 5, AdjacencyBounds::Legacy);
    assert!(strict.contains(&GridCell::new(0, 0)));
    assert!(!legacy.contains(&GridCell::new(0, 0)));
}

#[test]
fn test_legacy_graph_has_fewer_edges() {
    let strict = flat_lattice(6, 6);
    let legacy = lattice_with(
        &NavConfig {
            adjacency_bounds: AdjacencyBounds::Legacy,
            ..lattice_config(6, 6)
        },
        |_, _| Some(Sample::ground(0.0)),
    );

    assert_eq!(strict.len(), legacy.len());
    assert!(legacy.edge_count() < strict.edge_count());
}

#[test]
fn test_even_rows_are_sampled_half_a_cell_right() {
    let config = lattice_config(4, 2);
    let field = Heightfield::flat(Vec2::ZERO, 1.0, 8, 8, 0.0);
    let graph = build_graph(&config, &field);

    assert_eq!(graph.position(id(&graph, 1, 0)).x, 1.5);
    assert_eq!(graph.position(id(&graph, 1, 1)).x, 1.0);
}

#[test]
fn test_locate_reports_out_of_bounds_and_empty_cells() {
    let graph = lattice_with(&lattice_config(4, 4), |x, z| {
        if (x, z) == (1, 1) { None } else { Some(Sample::ground(0.0)) }
    });

    assert!(matches!(graph.locate(Vec3::new(-0.5, 0.0, 1.0)), Err(NavError::OutOfBounds { .. })));
    assert!(matches!(graph.locate(Vec3::new(1.0, 0.0, 4.0)), Err(NavError::OutOfBounds { .. })));
    assert!(matches!(graph.locate(Vec3::new(f32::NAN, 0.0, 1.0)), Err(NavError::OutOfBounds { .. })));
    assert_eq!(
        graph.locate(Vec3::new(1.2, 0.0, 1.7)),
        Err(NavError::EmptyCell { column: 1, row: 1 })
    );
    assert_eq!(graph.locate(Vec3::new(3.9, 7.0, 0.1)), Ok(id(&graph, 3, 0)));
    assert_eq!(graph.nearest_node(Vec3::new(1.2, 0.0, 1.7)), None);
}

#[test]
fn test_empty_graph_resolves_nothing() {
    let graph = NavGraph::default();
    assert!(graph.is_empty());
    assert!(graph.locate(Vec3::ZERO).is_err());
}

// ============================================================================
// Path search
// ============================================================================

#[test]
fn test_corner_to_corner_points_diagonally() {
    let graph = flat_lattice(3, 3);
    let limits = SearchLimits { max_search_size: 1000, step_cost: 0.0 };

    let path = search_path(&graph, limits, at(0, 0), at(2, 2)).unwrap();
    assert_eq!(path.outcome, SearchOutcome::Found);
    assert_eq!(path.hops, 3);
    assert!(path.direction.x > 0.0 && path.direction.z > 0.0);
    assert!((path.direction.length() - 1.0).abs() < 1e-4);
    assert_close(path.direction, Vec3::new(1.0, 0.0, 1.0).normalize(), 0.1);
}

#[test]
fn test_straight_corridor_points_along_axis() {
    let graph = flat_lattice(5, 5);
    let limits = SearchLimits { max_search_size: 1000, step_cost: 0.5 };

    let path = search_path(&graph, limits, at(0, 0), at(4, 0)).unwrap();
    assert_eq!(path.outcome, SearchOutcome::Found);
    assert_close(path.direction, Vec3::X, 0.01);
}

#[test]
fn test_zero_budget_gives_up_immediately() {
    let graph = flat_lattice(3, 3);
    let limits = SearchLimits { max_search_size: 0, step_cost: 0.1 };

    let path = search_path(&graph, limits, at(0, 0), at(2, 2)).unwrap();
    assert_eq!(path.outcome, SearchOutcome::Exhausted);
    assert_eq!(path.direction, Vec3::ZERO);
    assert_eq!(path.expansions, 0);
}

#[test]
fn test_start_equals_goal_is_found_with_zero_direction() {
    let graph = flat_lattice(3, 3);
    let limits = SearchLimits { max_search_size: 10, step_cost: 0.1 };

    let path = search_path(&graph, limits, at(1, 1), at(1, 1)).unwrap();
    assert_eq!(path.outcome, SearchOutcome::Found);
    assert_eq!(path.direction, Vec3::ZERO);
    assert_eq!(path.hops, 0);
}

#[test]
fn test_disconnected_goal_starves_the_frontier() {
    // Column 2 removed: no link spans two columns.
    let graph = lattice_with(&lattice_config(5, 5), |x, _| {
        if x == 2 { None } else { Some(Sample::ground(0.0)) }
    });
    let limits = SearchLimits { max_search_size: 1000, step_cost: 0.1 };

    let path = search_path(&graph, limits, at(0, 0), at(4, 0)).unwrap();
    assert_eq!(path.outcome, SearchOutcome::Starved);
    assert_eq!(path.direction, Vec3::ZERO);
    assert_eq!(path.expansions, 10);
}

#[test]
fn test_search_path_rejects_off_graph_endpoints() {
    let graph = flat_lattice(3, 3);
    let limits = SearchLimits { max_search_size: 10, step_cost: 0.1 };

    assert!(search_path(&graph, limits, at(0, 0), Vec3::new(50.0, 0.0, 0.0)).is_err());
    assert!(search_path(&graph, limits, Vec3::new(-1.0, 0.0, 0.0), at(0, 0)).is_err());
}

#[test]
fn test_concurrent_searches_are_independent() {
    let graph = flat_lattice(12, 12);
    let limits = SearchLimits { max_search_size: 1000, step_cost: 0.1 };
    let queries = [(at(0, 0), at(11, 11)), (at(11, 0), at(0, 11)), (at(5, 5), at(0, 0)), (at(3, 9), at(10, 2))];

    let sequential: Vec<PathDirection> = queries
        .iter()
        .map(|&(start, goal)| search_path(&graph, limits, start, goal).unwrap())
        .collect();

    let concurrent: Vec<PathDirection> = std::thread::scope(|scope| {
        let handles: Vec<_> = queries
            .iter()
            .map(|&(start, goal)| {
                let graph = &graph;
                scope.spawn(move || search_path(graph, limits, start, goal).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}

// ============================================================================
// Flow field
// ============================================================================

/// Every reached node points at a neighbor one hop closer to the goal.
fn assert_descends_hop_distance(graph: &NavGraph, field: &FlowField, goal: NodeId) {
    let hops = hop_distances(graph, goal);
    for node in graph.nodes() {
        let Some(distance) = hops[node.id.index()] else {
            assert!(!field.is_reached(node.id));
            assert_eq!(field.direction(node.id), Vec3::ZERO);
            continue;
        };
        assert!(field.is_reached(node.id), "{:?} should be reached", node.cell);
        if distance == 0 {
            assert_eq!(field.direction(node.id), Vec3::ZERO);
            continue;
        }

        let direction = field.direction(node.id);
        let descends = node.neighbors.iter().any(|&neighbor| {
            hops[neighbor.index()] == Some(distance - 1)
                && (graph.position(neighbor) - node.position).normalize_or_zero().distance(direction) < 1e-5
        });
        assert!(descends, "{:?} at hop {distance} points at {direction}", node.cell);
    }
}

#[test]
fn test_flow_field_descends_toward_goal() {
    let mut rng = fastrand::Rng::with_seed(3);
    let graph = lattice_with(&lattice_config(20, 20), |_, _| {
        (rng.u8(..) > 30).then(|| Sample::ground(0.0))
    });
    let goal = graph.nodes().nth(graph.len() / 2).unwrap().id;
    let mut field = FlowField::new(&graph);

    let reached = field.recompute(&graph, graph.position(goal)).unwrap();
    assert_eq!(field.goal(), Some(goal));
    assert_eq!(reached, hop_distances(&graph, goal).iter().flatten().count());
    assert_descends_hop_distance(&graph, &field, goal);
}

#[test]
fn test_flow_field_recompute_is_idempotent() {
    let graph = flat_lattice(8, 8);
    let mut field = FlowField::new(&graph);

    field.recompute(&graph, at(3, 4)).unwrap();
    let first: Vec<Vec3> = graph.nodes().map(|n| field.direction(n.id)).collect();
    field.recompute(&graph, at(3, 4)).unwrap();
    let second: Vec<Vec3> = graph.nodes().map(|n| field.direction(n.id)).collect();

    assert_eq!(first, second);
    assert_eq!(field.generation(), 2);
}

#[test]
fn test_retarget_forgets_previous_sweep() {
    // Two islands split by an empty column.
    let graph = lattice_with(&lattice_config(7, 5), |x, _| {
        if x == 3 { None } else { Some(Sample::ground(0.0)) }
    });
    let mut field = FlowField::new(&graph);

    field.recompute(&graph, at(0, 0)).unwrap();
    assert!(field.is_reached(id(&graph, 1, 2)));

    // Bounce between islands over several generations.
    for goal in [at(6, 4), at(0, 0), at(6, 4)] {
        field.recompute(&graph, goal).unwrap();
    }
    let goal = id(&graph, 6, 4);
    assert_eq!(field.reached_count(), 15);
    assert!(!field.is_reached(id(&graph, 1, 2)));
    assert_eq!(field.direction(id(&graph, 1, 2)), Vec3::ZERO);
    assert_descends_hop_distance(&graph, &field, goal);
}

#[test]
fn test_goal_off_graph_clears_every_direction() {
    let graph = flat_lattice(4, 4);
    let mut field = FlowField::new(&graph);

    field.recompute(&graph, at(0, 0)).unwrap();
    assert!(field.recompute(&graph, Vec3::new(100.0, 0.0, 100.0)).is_err());

    assert_eq!(field.goal(), None);
    assert_eq!(field.reached_count(), 0);
    assert!(graph.nodes().all(|n| field.direction(n.id) == Vec3::ZERO));
}

#[test]
fn test_unswept_field_reads_zero() {
    let graph = flat_lattice(3, 3);
    let field = FlowField::new(&graph);
    assert_eq!(field.direction_at(&graph, at(1, 1)), Ok(Vec3::ZERO));
    assert!(field.direction_at(&graph, Vec3::splat(-5.0)).is_err());
}

// ============================================================================
// Heuristics and fleeing
// ============================================================================

#[test]
fn test_heuristic_terms() {
    let input = HeuristicInput {
        candidate: Vec3::new(3.0, 0.0, 4.0),
        reference: Vec3::ZERO,
        steps: 5,
    };

    assert_eq!(HeuristicTerm::MaximizeDistance.score(&input), 5.0);
    assert_eq!(HeuristicTerm::MaximizeDistanceClamped { max: 2.0 }.score(&input), 2.0);
    assert_eq!(HeuristicTerm::MaximizeDistanceClamped { max: 9.0 }.score(&input), 5.0);
    assert_eq!(HeuristicTerm::MinimizeDistance { max: 8.0 }.score(&input), 3.0);
    assert!((HeuristicTerm::StepCost { cost_per_step: 0.1 }.score(&input) + 0.5).abs() < 1e-6);

    let spec = HeuristicSpec::default()
        .with_term(HeuristicTerm::MaximizeDistance, 2.0)
        .with_term(HeuristicTerm::StepCost { cost_per_step: 1.0 }, 0.5);
    assert_eq!(spec.evaluate(&input), 7.5);
    assert_eq!(HeuristicSpec::default().evaluate(&input), 0.0);
}

#[test]
fn test_flee_spec_shapes() {
    assert_eq!(HeuristicSpec::flee(None, 0.1).terms().len(), 1);
    let bounded = HeuristicSpec::flee(Some(4.0), 0.1);
    assert_eq!(
        bounded.terms()[0].term,
        HeuristicTerm::MaximizeDistanceClamped { max: 4.0 }
    );
    assert_eq!(bounded.terms()[1].term, HeuristicTerm::StepCost { cost_per_step: 0.1 });
}

#[test]
fn test_score_threshold_stops_search() {
    let graph = flat_lattice(7, 1);
    let spec = HeuristicSpec::single(HeuristicTerm::MaximizeDistance);

    let search = best_first_search(&graph, id(&graph, 0, 0), at(0, 0), &spec, 1000, Some(2.5));
    assert_eq!(search.outcome, SearchOutcome::Found);
    assert_eq!(search.best, id(&graph, 3, 0));
    assert_eq!(search.expansions, 4);
}

#[test]
fn test_best_first_starves_on_small_graph() {
    let graph = flat_lattice(7, 1);
    let spec = HeuristicSpec::single(HeuristicTerm::MaximizeDistance);

    let search = best_first_search(&graph, id(&graph, 3, 0), at(0, 0), &spec, 1000, None);
    assert_eq!(search.outcome, SearchOutcome::Starved);
    assert_eq!(search.best, id(&graph, 6, 0));
    assert_eq!(search.score, 6.0);
}

#[test]
fn test_settle_walks_past_budget_into_frontier() {
    let graph = flat_lattice(7, 1);
    let spec = HeuristicSpec::single(HeuristicTerm::MaximizeDistance);

    let search = best_first_search(&graph, id(&graph, 0, 0), at(0, 0), &spec, 2, None);
    assert_eq!(search.outcome, SearchOutcome::Exhausted);
    assert_eq!(search.best, id(&graph, 1, 0));
    assert_eq!(search.record(id(&graph, 1, 0)).and_then(|r| r.next), Some(id(&graph, 2, 0)));

    assert_eq!(search.settle(0), id(&graph, 1, 0));
    assert_eq!(search.settle(1), id(&graph, 2, 0));
    assert_eq!(search.settle(5), id(&graph, 2, 0));
}

#[test]
fn test_zero_budget_refuge_is_the_source() {
    let graph = flat_lattice(7, 1);
    let spec = HeuristicSpec::single(HeuristicTerm::MaximizeDistance);

    let search = best_first_search(&graph, id(&graph, 2, 0), at(0, 0), &spec, 0, None);
    assert_eq!(search.best, id(&graph, 2, 0));
    assert_eq!(search.settle(4), id(&graph, 2, 0));
}

#[test]
fn test_unbounded_flee_reaches_farthest_node() {
    let graph = flat_lattice(7, 1);
    let limits = SearchLimits { max_search_size: 1000, step_cost: 0.1 };

    let refuge = find_refuge(&graph, limits, 4, at(3, 0), at(0, 0), None).unwrap();
    assert_eq!(refuge, id(&graph, 6, 0));

    // A negative range also means unbounded.
    let refuge = find_refuge(&graph, limits, 4, at(3, 0), at(0, 0), Some(-1.0)).unwrap();
    assert_eq!(refuge, id(&graph, 6, 0));

    let path = flee_path(&graph, limits, 4, at(3, 0), at(0, 0), None).unwrap();
    assert_close(path.direction, Vec3::X, 1e-4);
}

#[test]
fn test_bounded_flee_stops_at_range() {
    let graph = flat_lattice(7, 1);
    let limits = SearchLimits { max_search_size: 1000, step_cost: 0.1 };

    let refuge = find_refuge(&graph, limits, 4, at(1, 0), at(0, 0), Some(2.0)).unwrap();
    assert_eq!(refuge, id(&graph, 2, 0));
}

#[test]
fn test_threat_off_graph_is_scored_from_raw_position() {
    let graph = flat_lattice(7, 1);
    let limits = SearchLimits { max_search_size: 1000, step_cost: 0.1 };

    let refuge = find_refuge(&graph, limits, 4, at(3, 0), Vec3::new(20.0, 0.0, 0.0), None).unwrap();
    assert_eq!(refuge, id(&graph, 0, 0));
}

#[test]
fn test_flee_from_off_graph_agent_fails() {
    let graph = flat_lattice(7, 1);
    let limits = SearchLimits { max_search_size: 1000, step_cost: 0.1 };
    assert!(find_refuge(&graph, limits, 4, Vec3::new(0.0, 0.0, -3.0), at(0, 0), None).is_err());
}

// ============================================================================
// Navigator surface
// ============================================================================

#[test]
fn test_navigator_degrades_to_zero() {
    let config = lattice_config(5, 5);
    let navigator = Navigator::new(flat_lattice(5, 5), &config);
    let outside = Vec3::new(-10.0, 0.0, -10.0);

    assert_eq!(navigator.direction_toward(outside, at(1, 1)), Vec3::ZERO);
    assert_eq!(navigator.direction_toward(at(1, 1), outside), Vec3::ZERO);
    assert_eq!(navigator.flow_direction_at(at(1, 1)), Vec3::ZERO);
    assert_eq!(navigator.flee_direction(outside, at(1, 1), None), Vec3::ZERO);

    let empty = Navigator::new(NavGraph::default(), &config);
    assert_eq!(empty.direction_toward(at(0, 0), at(1, 1)), Vec3::ZERO);
}

#[test]
fn test_navigator_flow_follows_target() {
    let config = lattice_config(5, 5);
    let mut navigator = Navigator::new(flat_lattice(5, 5), &config);

    assert_eq!(navigator.update_flow_field(at(4, 1)), 25);
    assert_close(navigator.flow_direction_at(at(3, 1)), Vec3::X, 1e-5);
    assert_eq!(navigator.flow_direction_at(at(4, 1)), Vec3::ZERO);

    assert_eq!(navigator.update_flow_field(Vec3::splat(99.0)), 0);
    assert_eq!(navigator.flow_direction_at(at(3, 1)), Vec3::ZERO);
}
