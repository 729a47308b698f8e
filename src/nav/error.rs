use bevy::prelude::Vec3;
use thiserror::Error;

/// Recoverable navigation failures. Callers on the agent surface turn
/// these into a zero direction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavError {
    #[error("position {position} lies outside the sampled region")]
    OutOfBounds { position: Vec3 },

    #[error("cell ({column}, {row}) has no walkable ground")]
    EmptyCell { column: usize, row: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read navigation config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse navigation config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid navigation config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type NavResult<T> = Result<T, NavError>;
