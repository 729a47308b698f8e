use bevy::prelude::*;

use crate::collections::PriorityQueue;
use super::error::NavResult;
use super::graph::NavGraph;
use super::heuristic::{HeuristicInput, HeuristicSpec};
use super::path_search::{search_between, PathDirection};
use super::search::{SearchLimits, SearchRecord, SearchState};
use super::types::{NodeId, SearchOutcome};

/// Result of a score-maximizing best-first search.
#[derive(Clone, Debug)]
pub struct BestFirst {
    /// Highest-scoring node dequeued. Starts as the source.
    pub best: NodeId,
    pub score: f32,
    pub outcome: SearchOutcome,
    pub expansions: usize,
    state: SearchState,
}

impl BestFirst {
    pub fn record(&self, id: NodeId) -> Option<&SearchRecord> {
        self.state.record(id)
    }

    /// Follow `next` links from `best` for at most `depth` hops.
    ///
    /// A node's `next` is its highest-scoring child that outscored it. The
    /// budget can run out with such children still queued, so the walk can
    /// move past `best` into the unexpanded frontier.
    pub fn settle(&self, depth: usize) -> NodeId {
        let mut destination = self.best;
        for _ in 0..depth {
            match self.state.record(destination).and_then(|r| r.next) {
                Some(next) => destination = next,
                None => break,
            }
        }
        destination
    }
}

/// Expand outward from `source`, always taking the highest-scoring frontier
/// node next, and keep the best node seen.
///
/// Stops when the budget is spent, the frontier empties, or a dequeued node
/// scores above `score_threshold`.
pub fn best_first_search(
    graph: &NavGraph,
    source: NodeId,
    reference: Vec3,
    spec: &HeuristicSpec,
    max_search_size: usize,
    score_threshold: Option<f32>,
) -> BestFirst {
    let mut state = SearchState::new(graph.len(), max_search_size);
    let mut frontier = PriorityQueue::with_capacity(max_search_size.min(graph.len()));

    let source_score = spec.evaluate(&HeuristicInput {
        candidate: graph.position(source),
        reference,
        steps: 0,
    });
    state.visit(
        source,
        SearchRecord {
            value: source_score,
            ..default()
        },
    );
    frontier.enqueue(source, 0.0);

    let mut best = source;
    let mut best_score = source_score;
    let mut expansions = 0;
    let mut outcome = SearchOutcome::Exhausted;

    for _ in 0..max_search_size {
        let Some(current) = frontier.dequeue() else {
            outcome = SearchOutcome::Starved;
            break;
        };
        expansions += 1;

        let parent = state.record(current).copied().unwrap_or_default();
        if parent.value > best_score {
            best = current;
            best_score = parent.value;
        }
        if score_threshold.is_some_and(|threshold| parent.value > threshold) {
            outcome = SearchOutcome::Found;
            break;
        }

        let mut best_child: Option<(NodeId, f32)> = None;
        for &neighbor in graph.neighbors(current) {
            if state.is_visited(neighbor) {
                continue;
            }
            let steps = parent.rank + 1;
            let score = spec.evaluate(&HeuristicInput {
                candidate: graph.position(neighbor),
                reference,
                steps,
            });
            state.visit(
                neighbor,
                SearchRecord {
                    value: score,
                    rank: steps,
                    previous: Some(current),
                    next: None,
                },
            );
            frontier.enqueue(neighbor, -score);

            if score > parent.value && best_child.map_or(true, |(_, s)| score > s) {
                best_child = Some((neighbor, score));
            }
        }
        if let Some((child, _)) = best_child {
            if let Some(record) = state.record_mut(current) {
                record.next = Some(child);
            }
        }
    }

    BestFirst {
        best,
        score: best_score,
        outcome,
        expansions,
        state,
    }
}

/// Node an agent at `agent` should head for to get away from `threat`.
///
/// `range` caps the useful distance; `None` or a negative range means
/// unbounded. The threat is scored from its node when it stands on the
/// graph, otherwise from its raw position.
pub fn find_refuge(
    graph: &NavGraph,
    limits: SearchLimits,
    depth: usize,
    agent: Vec3,
    threat: Vec3,
    range: Option<f32>,
) -> NavResult<NodeId> {
    let source = graph.locate(agent)?;
    let reference = graph
        .nearest_node(threat)
        .map_or(threat, |id| graph.position(id));
    let range = range.filter(|r| *r >= 0.0);

    let spec = HeuristicSpec::flee(range, limits.step_cost);
    let search = best_first_search(graph, source, reference, &spec, limits.max_search_size, None);
    let refuge = search.settle(depth);

    debug!(
        "[NAV] Refuge {:?} (best {:?}, score {:.2}, {:?} after {} expansions)",
        refuge, search.best, search.score, search.outcome, search.expansions
    );
    Ok(refuge)
}

/// Direction along the route from `agent` to its refuge from `threat`.
pub fn flee_path(
    graph: &NavGraph,
    limits: SearchLimits,
    depth: usize,
    agent: Vec3,
    threat: Vec3,
    range: Option<f32>,
) -> NavResult<PathDirection> {
    let refuge = find_refuge(graph, limits, depth, agent, threat, range)?;
    let start = graph.locate(agent)?;
    Ok(search_between(graph, limits, start, refuge))
}
