use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::ConfigError;
use super::types::SurfaceMask;

pub const DEFAULT_CONFIG_PATH: &str = "assets/nav_config.ron";

/// Which index bounds the adjacency pass checks before linking a neighbor.
///
/// `Legacy` reproduces the historical checks: row/column `- 1` and row `- 2`
/// links require an index strictly above zero, and the second diagonal of
/// odd rows is never linked. `Strict` uses the intended `>= 0` bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjacencyBounds {
    #[default]
    Strict,
    Legacy,
}

/// Navigation parameters, fixed once the graph is built.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NavConfig {
    // Sampled region (x, z)
    pub origin: Vec2,
    pub size: Vec2,
    pub spacing: f32,
    pub max_height_diff: f32,

    // Ground probe
    pub probe_height: f32,
    pub probe_distance: f32,
    pub walkable_mask: SurfaceMask,

    // Searches
    pub max_search_size: usize,
    pub step_cost: f32,
    pub avoidance_depth: usize,
    pub adjacency_bounds: AdjacencyBounds,

    // Scheduling
    pub tick_rate: f64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            origin: Vec2::new(-32.0, -32.0),
            size: Vec2::new(64.0, 64.0),
            spacing: 1.0,
            max_height_diff: 0.6,
            probe_height: 50.0,
            probe_distance: 100.0,
            walkable_mask: SurfaceMask::WALKABLE,
            max_search_size: 1000,
            step_cost: 0.1,
            avoidance_depth: 4,
            adjacency_bounds: AdjacencyBounds::Strict,
            tick_rate: 30.0,
        }
    }
}

impl NavConfig {
    pub fn columns(&self) -> usize {
        (self.size.x / self.spacing) as usize
    }

    pub fn rows(&self) -> usize {
        (self.size.y / self.spacing) as usize
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        let config: NavConfig = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spacing > 0.0) {
            return Err(invalid("spacing", format!("must be positive, got {}", self.spacing)));
        }
        if self.columns() == 0 || self.rows() == 0 {
            return Err(invalid(
                "size",
                format!("{:?} holds no cells at spacing {}", self.size, self.spacing),
            ));
        }
        if !(self.probe_distance > 0.0) {
            return Err(invalid(
                "probe_distance",
                format!("must be positive, got {}", self.probe_distance),
            ));
        }
        if self.max_height_diff < 0.0 {
            return Err(invalid(
                "max_height_diff",
                format!("must not be negative, got {}", self.max_height_diff),
            ));
        }
        if !(self.tick_rate > 0.0) {
            return Err(invalid("tick_rate", format!("must be positive, got {}", self.tick_rate)));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

/// Load the navigation config synchronously at startup.
///
/// Skipped when the host already inserted a `NavConfig`. A missing or broken
/// file is logged and replaced by the defaults.
pub(crate) fn load_nav_config(mut commands: Commands, existing: Option<Res<NavConfig>>) {
    if existing.is_some() {
        info!("[NAV] Using NavConfig supplied by the host");
        return;
    }

    match NavConfig::load(DEFAULT_CONFIG_PATH) {
        Ok(config) => {
            info!("[NAV] Loaded navigation config from {}", DEFAULT_CONFIG_PATH);
            commands.insert_resource(config);
        }
        Err(e) => {
            error!("[NAV] {}", e);
            error!("[NAV] Using default NavConfig");
            commands.insert_resource(NavConfig::default());
        }
    }
}
