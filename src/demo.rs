//! Headless demo scene: a target orbiting over generated terrain, chased by
//! flow-field followers, watched by a seeker and avoided by fleeing agents.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::nav::{GroundProbeSource, NavAgent, NavSet, NavTarget, NavTick, SteeringBehavior, SteeringDirection};
use crate::terrain::Heightfield;

const TERRAIN_ORIGIN: Vec2 = Vec2::new(-32.0, -32.0);
const TERRAIN_CELL: f32 = 1.0;
const TERRAIN_CELLS: usize = 64;
const REPORT_INTERVAL: u64 = 60;

#[derive(Clone, Debug)]
pub struct DemoPlugin {
    pub seed: u64,
    /// Exit after this many navigation ticks, 0 runs forever.
    pub run_ticks: u64,
    pub chasers: usize,
}

impl Default for DemoPlugin {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            run_ticks: 600,
            chasers: 24,
        }
    }
}

#[derive(Resource, Clone, Debug)]
struct DemoSettings {
    seed: u64,
    run_ticks: u64,
    chasers: usize,
}

/// Circles the scene origin.
#[derive(Component, Debug, Clone, Copy)]
pub struct Orbit {
    pub radius: f32,
    pub angular_speed: f32,
    pub angle: f32,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct MoveSpeed(pub f32);

impl Plugin for DemoPlugin {
    fn build(&self, app: &mut App) {
        let terrain = Heightfield::generate(self.seed, TERRAIN_ORIGIN, TERRAIN_CELL, TERRAIN_CELLS, TERRAIN_CELLS);

        app.insert_resource(GroundProbeSource::new(terrain.clone()))
            .insert_resource(terrain)
            .insert_resource(DemoSettings {
                seed: self.seed,
                run_ticks: self.run_ticks,
                chasers: self.chasers,
            })
            .add_systems(Startup, spawn_scene)
            .add_systems(FixedUpdate, (
                move_target.after(NavSet::Tick).before(NavSet::Field),
                (apply_steering, report_progress, exit_after_ticks)
                    .chain()
                    .after(NavSet::Steering),
            ));
    }
}

fn ground_point(terrain: &Heightfield, x: f32, z: f32) -> Vec3 {
    Vec3::new(x, terrain.height_at(Vec2::new(x, z)).unwrap_or(0.0), z)
}

fn spawn_scene(mut commands: Commands, terrain: Res<Heightfield>, settings: Res<DemoSettings>) {
    let mut rng = StdRng::seed_from_u64(settings.seed.wrapping_add(1));
    let half = TERRAIN_CELLS as f32 * TERRAIN_CELL / 2.0 - 2.0;

    commands.spawn((
        NavTarget,
        Orbit { radius: 14.0, angular_speed: 0.25, angle: 0.0 },
        Transform::from_translation(ground_point(&terrain, 14.0, 0.0)),
    ));

    for _ in 0..settings.chasers {
        let x = rng.random_range(-half..half);
        let z = rng.random_range(-half..half);
        commands.spawn((
            NavAgent::new(SteeringBehavior::FollowFlow),
            MoveSpeed(rng.random_range(2.0..4.0)),
            Transform::from_translation(ground_point(&terrain, x, z)),
        ));
    }

    commands.spawn((
        NavAgent::new(SteeringBehavior::Seek { goal: ground_point(&terrain, -20.0, -20.0) }),
        MoveSpeed(3.0),
        Transform::from_translation(ground_point(&terrain, 20.0, 20.0)),
    ));

    for (x, z, range) in [(2.0, 2.0, Some(12.0)), (-3.0, 4.0, None)] {
        commands.spawn((
            NavAgent::new(SteeringBehavior::Flee { range }),
            MoveSpeed(3.5),
            Transform::from_translation(ground_point(&terrain, x, z)),
        ));
    }

    info!("[DEMO] Spawned {} chasers, 1 seeker, 2 fleeing agents (seed {})", settings.chasers, settings.seed);
}

fn move_target(time: Res<Time>, terrain: Res<Heightfield>, mut targets: Query<(&mut Transform, &mut Orbit)>) {
    for (mut transform, mut orbit) in targets.iter_mut() {
        orbit.angle += orbit.angular_speed * time.delta_secs();
        let (sin, cos) = orbit.angle.sin_cos();
        transform.translation = ground_point(&terrain, cos * orbit.radius, sin * orbit.radius);
    }
}

fn apply_steering(
    time: Res<Time>,
    terrain: Res<Heightfield>,
    mut agents: Query<(&mut Transform, &SteeringDirection, &MoveSpeed)>,
) {
    let dt = time.delta_secs();
    for (mut transform, steering, speed) in agents.iter_mut() {
        if steering.0 == Vec3::ZERO {
            continue;
        }
        let step = Vec2::new(steering.0.x, steering.0.z).normalize_or_zero() * speed.0 * dt;
        let next = Vec2::new(transform.translation.x, transform.translation.z) + step;
        // Stay put rather than walk off the terrain or into a pit.
        if let Some(height) = terrain.height_at(next) {
            transform.translation = Vec3::new(next.x, height, next.y);
        }
    }
}

fn report_progress(
    tick: Res<NavTick>,
    targets: Query<&Transform, With<NavTarget>>,
    agents: Query<(&Transform, &NavAgent, &SteeringDirection)>,
) {
    if tick.0 % REPORT_INTERVAL != 0 {
        return;
    }
    let Some(target) = targets.iter().next() else { return };

    let mut chasers = 0;
    let mut total_distance = 0.0;
    let mut stalled = 0;
    for (transform, agent, steering) in agents.iter() {
        if steering.0 == Vec3::ZERO {
            stalled += 1;
        }
        if agent.behavior == SteeringBehavior::FollowFlow {
            chasers += 1;
            total_distance += transform.translation.distance(target.translation);
        }
    }

    let mean = if chasers > 0 { total_distance / chasers as f32 } else { 0.0 };
    info!(
        "[DEMO] tick {}: mean chaser distance {:.2}, {} of {} agents stalled",
        tick.0,
        mean,
        stalled,
        agents.iter().count()
    );
}

fn exit_after_ticks(tick: Res<NavTick>, settings: Res<DemoSettings>, mut exit: MessageWriter<AppExit>) {
    if settings.run_ticks > 0 && tick.0 >= settings.run_ticks {
        info!("[DEMO] Finished after {} ticks", tick.0);
        exit.write(AppExit::Success);
    }
}
