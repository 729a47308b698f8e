use bevy::prelude::*;
use std::collections::VecDeque;

use super::error::NavResult;
use super::graph::NavGraph;
use super::types::NodeId;

/// Per-node direction toward a single moving goal.
///
/// Rebuilt every tick by a breadth-first sweep outward from the goal's node:
/// each newly reached node points at the node it was reached from, so
/// following the field walks the hop-shortest route one edge at a time.
///
/// # Generations
///
/// Instead of clearing a visited flag on every node each tick, every sweep
/// bumps `generation` and stamps the nodes it reaches. A node counts as
/// reached iff its stamp equals the current generation. Directions of nodes
/// the latest sweep did not reach read as zero.
///
/// # Performance
///
/// - **Recompute:** O(nodes + edges), the per-tick cost center of navigation
/// - **Query:** O(1) cell lookup
#[derive(Clone, Debug, Default)]
pub struct FlowField {
    generation: u32,
    stamps: Vec<u32>,
    directions: Vec<Vec3>,
    goal: Option<NodeId>,
    reached: usize,
    queue: VecDeque<NodeId>,
}

impl FlowField {
    pub fn new(graph: &NavGraph) -> Self {
        Self {
            generation: 0,
            stamps: vec![0; graph.len()],
            directions: vec![Vec3::ZERO; graph.len()],
            goal: None,
            reached: 0,
            queue: VecDeque::with_capacity(graph.len()),
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Goal node of the latest sweep, `None` if it did not resolve.
    pub fn goal(&self) -> Option<NodeId> {
        self.goal
    }

    /// Nodes reached by the latest sweep, the goal included.
    pub fn reached_count(&self) -> usize {
        self.reached
    }

    /// Sweep outward from the node under `goal_position`.
    ///
    /// Starts a new generation even when the goal does not resolve, so a
    /// goal that leaves the graph leaves every direction reading zero.
    pub fn recompute(&mut self, graph: &NavGraph, goal_position: Vec3) -> NavResult<usize> {
        if self.stamps.len() != graph.len() {
            self.stamps = vec![0; graph.len()];
            self.directions = vec![Vec3::ZERO; graph.len()];
            self.generation = 0;
        }
        self.advance_generation();
        self.goal = None;
        self.reached = 0;

        let start = graph.locate(goal_position)?;
        let generation = self.generation;

        self.goal = Some(start);
        self.stamps[start.index()] = generation;
        self.directions[start.index()] = Vec3::ZERO;
        self.reached = 1;

        self.queue.clear();
        self.queue.push_back(start);

        while let Some(current) = self.queue.pop_front() {
            let current_position = graph.position(current);
            for &neighbor in graph.neighbors(current) {
                let slot = neighbor.index();
                if self.stamps[slot] == generation {
                    continue;
                }
                self.stamps[slot] = generation;
                self.directions[slot] = (current_position - graph.position(neighbor)).normalize_or_zero();
                self.reached += 1;
                self.queue.push_back(neighbor);
            }
        }

        Ok(self.reached)
    }

    fn advance_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Stamp 0 means "never reached"; reset once per 2^32 sweeps.
            self.stamps.fill(0);
            self.generation = 1;
        }
    }

    #[inline]
    pub fn is_reached(&self, id: NodeId) -> bool {
        self.generation != 0 && self.stamps.get(id.index()) == Some(&self.generation)
    }

    /// Cached direction at a node, zero if the latest sweep missed it.
    pub fn direction(&self, id: NodeId) -> Vec3 {
        if self.is_reached(id) {
            self.directions[id.index()]
        } else {
            Vec3::ZERO
        }
    }

    pub fn direction_at(&self, graph: &NavGraph, position: Vec3) -> NavResult<Vec3> {
        Ok(self.direction(graph.locate(position)?))
    }
}
