//! Heightfield terrain that answers ground probes.
//!
//! Hosts with a physics engine implement [`GroundProbe`] over their ray
//! casts. This module covers headless runs: the demo scene and the tests
//! probe a regular grid of height samples instead.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::nav::{layers, GroundHit, GroundProbe, SurfaceMask};

/// Surface at one sample cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub height: f32,
    pub layer: u32,
}

impl Sample {
    pub fn ground(height: f32) -> Self {
        Self { height, layer: layers::GROUND }
    }
}

/// Regular grid of optional samples over the x/z plane. `None` is a hole:
/// probes fall straight through it.
#[derive(Resource, Clone, Debug)]
pub struct Heightfield {
    origin: Vec2,
    cell_size: f32,
    width: usize,
    depth: usize,
    samples: Vec<Option<Sample>>,
    snap_hits: bool,
}

impl Heightfield {
    pub fn from_fn(
        origin: Vec2,
        cell_size: f32,
        width: usize,
        depth: usize,
        mut sample: impl FnMut(usize, usize) -> Option<Sample>,
    ) -> Self {
        let mut samples = Vec::with_capacity(width * depth);
        for z in 0..depth {
            for x in 0..width {
                samples.push(sample(x, z));
            }
        }
        Self {
            origin,
            cell_size,
            width,
            depth,
            samples,
            snap_hits: false,
        }
    }

    pub fn flat(origin: Vec2, cell_size: f32, width: usize, depth: usize, height: f32) -> Self {
        Self::from_fn(origin, cell_size, width, depth, |_, _| Some(Sample::ground(height)))
    }

    /// Report hits at the sample cell's corner instead of under the ray.
    /// Turns the brick-offset sampling back into a square lattice, which
    /// keeps expected directions in tests exact.
    pub fn with_snapped_hits(mut self, snap: bool) -> Self {
        self.snap_hits = snap;
        self
    }

    /// Rolling hills with pits, a raised plateau and a pond.
    pub fn generate(seed: u64, origin: Vec2, cell_size: f32, width: usize, depth: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let waves: Vec<(f32, f32, f32, f32)> = (0..3)
            .map(|_| {
                (
                    rng.random_range(0.05..0.35),
                    rng.random_range(0.04..0.12),
                    rng.random_range(0.04..0.12),
                    rng.random_range(0.0..std::f32::consts::TAU),
                )
            })
            .collect();

        let pits: Vec<(Vec2, f32)> = (0..rng.random_range(2..5))
            .map(|_| {
                let center = Vec2::new(
                    rng.random_range(0.0..width as f32),
                    rng.random_range(0.0..depth as f32),
                );
                (center, rng.random_range(1.5..3.5))
            })
            .collect();

        let plateau_min = Vec2::new(width as f32 * 0.6, depth as f32 * 0.15);
        let plateau_max = plateau_min + Vec2::new(width as f32 * 0.2, depth as f32 * 0.2);
        let pond = (
            Vec2::new(width as f32 * 0.25, depth as f32 * 0.7),
            rng.random_range(2.0..4.0),
        );

        Self::from_fn(origin, cell_size, width, depth, |x, z| {
            let p = Vec2::new(x as f32, z as f32);
            if pits.iter().any(|(center, radius)| p.distance(*center) < *radius) {
                return None;
            }

            let mut height: f32 = waves
                .iter()
                .map(|(amplitude, fx, fz, phase)| amplitude * (p.x * fx + p.y * fz + phase).sin())
                .sum();

            if p.cmpge(plateau_min).all() && p.cmplt(plateau_max).all() {
                height += 2.0;
            }
            if p.distance(pond.0) < pond.1 {
                return Some(Sample { height: -0.2, layer: layers::WATER });
            }
            Some(Sample::ground(height))
        })
    }

    pub fn set(&mut self, x: usize, z: usize, sample: Option<Sample>) {
        if x < self.width && z < self.depth {
            self.samples[z * self.width + x] = sample;
        }
    }

    fn sample_index(&self, point: Vec2) -> Option<(usize, usize)> {
        let local = (point - self.origin) / self.cell_size;
        if !local.is_finite() || local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (x, z) = (local.x as usize, local.y as usize);
        (x < self.width && z < self.depth).then_some((x, z))
    }

    pub fn sample_at(&self, point: Vec2) -> Option<Sample> {
        let (x, z) = self.sample_index(point)?;
        self.samples[z * self.width + x]
    }

    pub fn height_at(&self, point: Vec2) -> Option<f32> {
        self.sample_at(point).map(|s| s.height)
    }

    fn normal_at(&self, x: usize, z: usize, height: f32) -> Vec3 {
        let at = |dx: isize, dz: isize| -> f32 {
            let nx = x as isize + dx;
            let nz = z as isize + dz;
            if nx < 0 || nz < 0 || nx as usize >= self.width || nz as usize >= self.depth {
                return height;
            }
            self.samples[nz as usize * self.width + nx as usize].map_or(height, |s| s.height)
        };
        let slope_x = (at(1, 0) - at(-1, 0)) / (2.0 * self.cell_size);
        let slope_z = (at(0, 1) - at(0, -1)) / (2.0 * self.cell_size);
        Vec3::new(-slope_x, 1.0, -slope_z).normalize_or(Vec3::Y)
    }
}

impl GroundProbe for Heightfield {
    fn probe_ground(&self, origin: Vec3, max_distance: f32, mask: SurfaceMask) -> Option<GroundHit> {
        let (x, z) = self.sample_index(Vec2::new(origin.x, origin.z))?;
        let sample = self.samples[z * self.width + x]?;
        if !mask.accepts(sample.layer) {
            return None;
        }

        let drop = origin.y - sample.height;
        if drop < 0.0 || drop > max_distance {
            return None;
        }

        let (hit_x, hit_z) = if self.snap_hits {
            (
                self.origin.x + x as f32 * self.cell_size,
                self.origin.y + z as f32 * self.cell_size,
            )
        } else {
            (origin.x, origin.z)
        };

        Some(GroundHit {
            point: Vec3::new(hit_x, sample.height, hit_z),
            normal: self.normal_at(x, z, sample.height),
        })
    }
}
