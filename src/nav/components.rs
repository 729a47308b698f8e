use bevy::prelude::*;

use super::grid_build::GroundProbe;

/// Navigation tick counter, incremented first thing in every FixedUpdate.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavTick(pub u64);

impl NavTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Ground probe used to sample the world when the graph is built.
#[derive(Resource)]
pub struct GroundProbeSource(pub Box<dyn GroundProbe + Send + Sync>);

impl GroundProbeSource {
    pub fn new(probe: impl GroundProbe + Send + Sync + 'static) -> Self {
        Self(Box::new(probe))
    }
}

/// Marks the primary target. The flow field follows the first one found.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct NavTarget;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SteeringBehavior {
    /// Follow the flow field toward the primary target.
    FollowFlow,
    /// Path search toward a fixed point.
    Seek { goal: Vec3 },
    /// Get away from the primary target. `range: None` is unbounded.
    Flee { range: Option<f32> },
}

/// An entity the navigation systems steer.
#[derive(Component, Debug, Clone, Copy)]
#[require(SteeringDirection)]
pub struct NavAgent {
    pub behavior: SteeringBehavior,
}

impl NavAgent {
    pub fn new(behavior: SteeringBehavior) -> Self {
        Self { behavior }
    }
}

/// Unit direction computed for this tick, zero for "don't move".
/// The host decides how to apply it.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct SteeringDirection(pub Vec3);
