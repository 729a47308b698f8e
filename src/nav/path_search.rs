use bevy::prelude::*;

use crate::collections::PriorityQueue;
use super::error::NavResult;
use super::graph::NavGraph;
use super::search::{SearchLimits, SearchRecord, SearchState};
use super::types::{NodeId, SearchOutcome};

/// Weight kept from the running direction at each smoothing step.
const SMOOTHING_CARRY: f32 = 0.4;
/// Weight given to the step being folded in.
const SMOOTHING_STEP: f32 = 0.6;

/// Result of a best-first search toward a goal, reduced to a steering vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathDirection {
    /// Unit vector, or zero when no route was found or start equals goal.
    pub direction: Vec3,
    pub outcome: SearchOutcome,
    pub expansions: usize,
    /// Hops on the found route, 0 unless `outcome` is `Found`.
    pub hops: usize,
}

/// Search from the node under `start` toward the node under `goal`.
///
/// Fails only when either position does not resolve to a node; an
/// unsuccessful search is reported through [`PathDirection::outcome`].
pub fn search_path(graph: &NavGraph, limits: SearchLimits, start: Vec3, goal: Vec3) -> NavResult<PathDirection> {
    let start_node = graph.locate(start)?;
    let goal_node = graph.locate(goal)?;
    Ok(search_between(graph, limits, start_node, goal_node))
}

/// Best-first search between two nodes.
///
/// A neighbor's priority re-biases its parent's estimate by the change in
/// straight-line distance to the goal, plus `step_cost`. Nodes are never
/// expanded twice. The search stops when the goal is dequeued, the frontier
/// empties, or `max_search_size` expansions have been spent.
pub fn search_between(graph: &NavGraph, limits: SearchLimits, start: NodeId, goal: NodeId) -> PathDirection {
    let goal_position = graph.position(goal);
    let mut state = SearchState::new(graph.len(), limits.max_search_size);
    let mut frontier = PriorityQueue::with_capacity(limits.max_search_size.min(graph.len()));

    state.visit(start, SearchRecord::default());
    frontier.enqueue(start, 0.0);

    let mut expansions = 0;
    let outcome = loop {
        if expansions >= limits.max_search_size {
            break SearchOutcome::Exhausted;
        }
        let Some(current) = frontier.dequeue() else {
            break SearchOutcome::Starved;
        };
        if current == goal {
            break SearchOutcome::Found;
        }

        let parent = state.record(current).copied().unwrap_or_default();
        let parent_to_goal = graph.position(current).distance(goal_position);

        for &neighbor in graph.neighbors(current) {
            if state.is_visited(neighbor) {
                continue;
            }
            let estimate = parent.value - parent_to_goal
                + graph.position(neighbor).distance(goal_position)
                + limits.step_cost;
            state.visit(
                neighbor,
                SearchRecord {
                    value: estimate,
                    rank: parent.rank + 1,
                    previous: Some(current),
                    next: None,
                },
            );
            frontier.enqueue(neighbor, estimate);
        }
        expansions += 1;
    };

    match outcome {
        SearchOutcome::Found => {
            let (direction, hops) = smoothed_direction(graph, &state, goal);
            PathDirection { direction, outcome, expansions, hops }
        }
        SearchOutcome::Exhausted => {
            info!("[NAV] Unable to find a path in {} steps", limits.max_search_size);
            PathDirection { direction: Vec3::ZERO, outcome, expansions, hops: 0 }
        }
        SearchOutcome::Starved => {
            debug!("[NAV] Frontier emptied after {} expansions, goal unreachable", expansions);
            PathDirection { direction: Vec3::ZERO, outcome, expansions, hops: 0 }
        }
    }
}

/// Fold the route into one direction, walking from the goal back to the
/// start. Each step vector points toward the goal.
fn smoothed_direction(graph: &NavGraph, state: &SearchState, goal: NodeId) -> (Vec3, usize) {
    let mut direction = Vec3::ZERO;
    let mut hops = 0;

    let chain: Vec<NodeId> = state.previous_chain(goal).collect();
    for pair in chain.windows(2) {
        let step = (graph.position(pair[0]) - graph.position(pair[1])).normalize_or_zero();
        direction = (direction * SMOOTHING_CARRY + step * SMOOTHING_STEP).normalize_or_zero();
        hops += 1;
    }

    (direction, hops)
}
