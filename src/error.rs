//! Error types for engine construction, asset loading and tuning data

use thiserror::Error;

use crate::tuning::Difficulty;

/// Fatal engine construction failures
#[derive(Debug, Error)]
pub enum EngineError {
    /// The host surface could not provide a 2D drawing context
    #[error("2D drawing context unavailable")]
    ContextUnavailable,
    #[error(transparent)]
    Assets(#[from] AssetError),
    #[error(transparent)]
    Tuning(#[from] TuningError),
}

/// Asset bundle loading failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("failed to load image: {path}")]
    Load { path: String },
    #[error("asset bundle has no asteroid sprites")]
    MissingAsteroidSprites,
    #[error("failed to extract sprite from {path}")]
    Extraction { path: String },
}

/// Invalid difficulty tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{tier:?} profile has an invalid {field}")]
    InvalidProfile {
        tier: Difficulty,
        field: &'static str,
    },
}
