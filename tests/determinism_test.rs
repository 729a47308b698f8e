use bevy::prelude::*;
use waymark::nav::{build_graph, NavConfig, NavGraph, Navigator};
use waymark::terrain::Heightfield;

fn build(seed: u64) -> (NavConfig, NavGraph) {
    let config = NavConfig::default();
    let terrain = Heightfield::generate(seed, config.origin, 1.0, 64, 64);
    let graph = build_graph(&config, &terrain);
    (config, graph)
}

fn snapshot(graph: &NavGraph) -> Vec<(Vec3, Vec<u32>)> {
    graph
        .nodes()
        .map(|n| (n.position, n.neighbors.iter().map(|id| id.0).collect()))
        .collect()
}

#[test]
fn test_graph_build_is_deterministic() {
    let (_, a) = build(99);
    let (_, b) = build(99);
    assert_eq!(snapshot(&a), snapshot(&b));

    let (_, c) = build(100);
    assert_ne!(snapshot(&a), snapshot(&c), "different seeds should give different terrain");
}

#[test]
fn test_queries_are_repeatable() {
    let (config, graph) = build(5);
    let mut navigator = Navigator::new(graph, &config);

    // Pick real nodes so every query has something to chew on.
    let positions: Vec<Vec3> = navigator.graph().nodes().step_by(97).map(|n| n.position).collect();
    assert!(positions.len() > 4);
    let goal = positions[positions.len() / 2];
    navigator.update_flow_field(goal);

    let run = |navigator: &Navigator| -> Vec<(Vec3, Vec3, Vec3, Vec3)> {
        positions
            .iter()
            .map(|&p| {
                (
                    navigator.direction_toward(p, goal),
                    navigator.flow_direction_at(p),
                    navigator.flee_direction(p, goal, None),
                    navigator.flee_direction(p, goal, Some(8.0)),
                )
            })
            .collect()
    };

    let first = run(&navigator);
    let second = run(&navigator);
    assert_eq!(first, second);

    // Rebuilding the field toward the same goal changes nothing.
    navigator.update_flow_field(goal);
    assert_eq!(first, run(&navigator));
}

#[test]
fn test_flow_field_survives_many_generations() {
    let (config, graph) = build(21);
    let mut navigator = Navigator::new(graph, &config);
    let nodes: Vec<Vec3> = navigator.graph().nodes().step_by(31).map(|n| n.position).collect();

    let goal = nodes[0];
    navigator.update_flow_field(goal);
    let reference: Vec<Vec3> = nodes.iter().map(|&p| navigator.flow_direction_at(p)).collect();

    for round in 0..50 {
        navigator.update_flow_field(nodes[(round * 7) % nodes.len()]);
    }
    navigator.update_flow_field(goal);

    let again: Vec<Vec3> = nodes.iter().map(|&p| navigator.flow_direction_at(p)).collect();
    assert_eq!(reference, again);
}
