//! Navigation over a sampled walkable surface.
//!
//! # Pipeline
//!
//! 1. **Grid build (startup):** probe the ground once per brick-offset cell,
//!    then link each node to up to eight neighbors within a height limit.
//! 2. **Flow field (every tick):** breadth-first sweep from the primary
//!    target, labelling each reachable node with a direction one hop closer.
//! 3. **Queries (on demand):** best-first path search reduced to a smoothed
//!    steering vector, and a score-maximizing search used for fleeing.
//!
//! Every query degrades to a zero vector instead of failing, so an agent
//! that cannot be routed simply stands still for the tick.

mod avoidance;
mod components;
mod config;
mod error;
mod flow_field;
mod graph;
mod grid_build;
mod heuristic;
mod navigator;
mod path_search;
mod search;
mod systems;
mod types;

#[cfg(test)]
mod tests;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use avoidance::{best_first_search, find_refuge, flee_path, BestFirst};
pub use components::{GroundProbeSource, NavAgent, NavTarget, NavTick, SteeringBehavior, SteeringDirection};
pub use config::{AdjacencyBounds, NavConfig, DEFAULT_CONFIG_PATH};
pub use error::{ConfigError, NavError, NavResult};
pub use flow_field::FlowField;
pub use graph::{GraphStats, NavGraph};
pub use grid_build::{build_graph, GroundProbe};
pub use heuristic::{HeuristicInput, HeuristicSpec, HeuristicTerm, WeightedTerm};
pub use navigator::Navigator;
pub use path_search::{search_between, search_path, PathDirection};
pub use search::{SearchLimits, SearchRecord, SearchState};
pub use systems::{increment_nav_tick, steer_agents, update_flow_field};
pub use types::{layers, GridCell, GroundHit, Node, NodeId, SearchOutcome, SurfaceMask};

use bevy::prelude::*;

/// Ordering of the per-tick navigation work inside `FixedUpdate`.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum NavSet {
    Tick,
    Field,
    Steering,
}

/// Builds the graph at startup and keeps the flow field and agent
/// steering current every fixed tick.
///
/// The host supplies a [`GroundProbeSource`] (and optionally a
/// [`NavConfig`]; otherwise `assets/nav_config.ron` is loaded) before
/// `Startup` runs, and applies [`SteeringDirection`] to its own transforms
/// in a set ordered after [`NavSet::Steering`].
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavTick>();

        app.configure_sets(FixedUpdate, (
            NavSet::Tick,
            NavSet::Field,
            NavSet::Steering,
        ).chain());

        app.add_systems(Startup, (
            config::load_nav_config,
            systems::build_navigator,
        ).chain());

        app.add_systems(FixedUpdate, (
            systems::increment_nav_tick.in_set(NavSet::Tick),
            systems::update_flow_field.in_set(NavSet::Field),
            systems::steer_agents.in_set(NavSet::Steering),
        ));
    }
}
