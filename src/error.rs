use thiserror::Error;

/// Failures of the terrain synthesis pipeline.  Every variant aborts the call
/// that raised it; no partial height field or mesh is returned.
#[derive(Debug, Error, PartialEq)]
pub enum TerrainError {
    #[error("invalid grid dimensions {width}x{depth}: both must be at least 1")]
    InvalidDimension { width: usize, depth: usize },

    #[error("invalid grid size {0}: must be a positive, finite spacing")]
    InvalidGridSize(f32),

    #[error("invalid generation parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("colour palette is empty")]
    EmptyPalette,
}

pub type Result<T> = std::result::Result<T, TerrainError>;
