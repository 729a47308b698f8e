use bevy::prelude::*;

use crate::profile_log;
use crate::profiling::profile;
use super::components::{GroundProbeSource, NavAgent, NavTarget, NavTick, SteeringBehavior, SteeringDirection};
use super::config::NavConfig;
use super::graph::NavGraph;
use super::navigator::Navigator;

/// Increment the navigation tick. Runs before every other nav system.
pub fn increment_nav_tick(mut tick: ResMut<NavTick>) {
    tick.increment();
}

/// Sample the world and insert the [`Navigator`]. Runs once at startup,
/// blocking that frame.
pub(crate) fn build_navigator(
    mut commands: Commands,
    config: Res<NavConfig>,
    probe: Option<Res<GroundProbeSource>>,
    fixed_time: Option<ResMut<Time<Fixed>>>,
) {
    if let Some(mut fixed_time) = fixed_time {
        fixed_time.set_timestep_hz(config.tick_rate);
    }

    if let Err(e) = config.validate() {
        error!("[NAV] {}", e);
        error!("[NAV] Navigation disabled: every query will return a zero direction");
        commands.insert_resource(Navigator::new(NavGraph::default(), &config));
        return;
    }

    let Some(probe) = probe else {
        error!("[NAV] No GroundProbeSource resource, building an empty navigation graph");
        commands.insert_resource(Navigator::new(NavGraph::default(), &config));
        return;
    };

    let navigator = Navigator::build(&*config, probe.0.as_ref());
    commands.insert_resource(navigator);
}

/// Re-run the flow field sweep toward the primary target.
#[profile(2)]
pub fn update_flow_field(
    navigator: Option<ResMut<Navigator>>,
    targets: Query<&Transform, With<NavTarget>>,
    #[allow(unused_variables)] tick: Res<NavTick>,
) {
    let Some(mut navigator) = navigator else { return };
    let Some(target) = targets.iter().next() else {
        return;
    };

    let reached = navigator.update_flow_field(target.translation);
    if reached == 0 {
        debug!("[FLOW] Target at {} is off the graph, flow field cleared", target.translation);
    }
    profile_log!(tick, "[FLOW] tick {}: {} of {} nodes reached", tick.0, reached, navigator.graph().len());
}

/// Compute each agent's [`SteeringDirection`] for this tick.
#[profile]
pub fn steer_agents(
    navigator: Option<Res<Navigator>>,
    targets: Query<&Transform, With<NavTarget>>,
    mut agents: Query<(&Transform, &NavAgent, &mut SteeringDirection)>,
    #[allow(unused_variables)] tick: Res<NavTick>,
) {
    let Some(navigator) = navigator else { return };
    let target = targets.iter().next().map(|t| t.translation);

    for (transform, agent, mut steering) in agents.iter_mut() {
        let position = transform.translation;
        let direction = match (agent.behavior, target) {
            (SteeringBehavior::FollowFlow, _) => navigator.flow_direction_at(position),
            (SteeringBehavior::Seek { goal }, _) => navigator.direction_toward(position, goal),
            (SteeringBehavior::Flee { range }, Some(threat)) => navigator.flee_direction(position, threat, range),
            (SteeringBehavior::Flee { .. }, None) => Vec3::ZERO,
        };
        steering.0 = direction;
    }

    profile_log!(
        tick,
        "[NAV] tick {}: {} of {} agents without a direction",
        tick.0,
        agents.iter().filter(|(_, _, steering)| steering.0 == Vec3::ZERO).count(),
        agents.iter().count()
    );
}
