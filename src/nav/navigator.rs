use bevy::prelude::*;

use super::avoidance::flee_path;
use super::config::NavConfig;
use super::flow_field::FlowField;
use super::graph::NavGraph;
use super::grid_build::{build_graph, GroundProbe};
use super::path_search::search_path;
use super::search::SearchLimits;

/// Navigation core handed to everything that steers agents.
///
/// Owns the graph and the flow field. All queries take `&self` and keep
/// their search state local, so systems can share it through `Res`; only
/// [`update_flow_field`](Self::update_flow_field) needs `ResMut`.
///
/// Query methods never fail: an unresolvable position or an unsuccessful
/// search yields `Vec3::ZERO`, meaning "stay put this tick".
#[derive(Resource, Clone, Debug)]
pub struct Navigator {
    graph: NavGraph,
    flow_field: FlowField,
    limits: SearchLimits,
    avoidance_depth: usize,
}

impl Navigator {
    pub fn new(graph: NavGraph, config: &NavConfig) -> Self {
        let flow_field = FlowField::new(&graph);
        Self {
            graph,
            flow_field,
            limits: SearchLimits::from(config),
            avoidance_depth: config.avoidance_depth,
        }
    }

    pub fn build<P: GroundProbe + ?Sized>(config: &NavConfig, probe: &P) -> Self {
        Self::new(build_graph(config, probe), config)
    }

    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    pub fn flow_field(&self) -> &FlowField {
        &self.flow_field
    }

    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    pub fn avoidance_depth(&self) -> usize {
        self.avoidance_depth
    }

    /// Re-label the flow field toward `goal`. Returns the number of nodes
    /// reached, 0 when the goal is off the graph.
    pub fn update_flow_field(&mut self, goal: Vec3) -> usize {
        match self.flow_field.recompute(&self.graph, goal) {
            Ok(reached) => reached,
            Err(e) => {
                debug!("[FLOW] {}", e);
                0
            }
        }
    }

    pub fn direction_toward(&self, agent: Vec3, goal: Vec3) -> Vec3 {
        match search_path(&self.graph, self.limits, agent, goal) {
            Ok(path) => path.direction,
            Err(e) => {
                debug!("[NAV] direction_toward: {}", e);
                Vec3::ZERO
            }
        }
    }

    pub fn flow_direction_at(&self, agent: Vec3) -> Vec3 {
        match self.flow_field.direction_at(&self.graph, agent) {
            Ok(direction) => direction,
            Err(e) => {
                debug!("[FLOW] flow_direction_at: {}", e);
                Vec3::ZERO
            }
        }
    }

    /// `range` caps how far away is worth running; `None` means unbounded.
    pub fn flee_direction(&self, agent: Vec3, threat: Vec3, range: Option<f32>) -> Vec3 {
        match flee_path(&self.graph, self.limits, self.avoidance_depth, agent, threat, range) {
            Ok(path) => path.direction,
            Err(e) => {
                debug!("[NAV] flee_direction: {}", e);
                Vec3::ZERO
            }
        }
    }
}
