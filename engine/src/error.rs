//! Error types
//!
//! Only construction and loading paths can fail. Per-tick simulation is
//! infallible: degenerate triangles and off-map bodies are handled locally.

use thiserror::Error;

/// Errors raised while building a heightfield or terrain.
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("heightmap source has no CPU-readable pixel data, cannot construct a terrain")]
    MissingPixelData,
    #[error("heightmap grid is empty ({width}x{height})")]
    EmptyGrid { width: u32, height: u32 },
    #[error("heightmap needs at least 3 channels per pixel, got {0}")]
    TooFewChannels(u8),
    #[error("expected {expected} samples for the heightmap grid, got {actual}")]
    PixelCountMismatch { expected: usize, actual: usize },
    #[error("terrain scale must be finite and positive on every axis, got {0}")]
    InvalidScale(glam::Vec3),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors raised while loading tuning configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors raised while assembling a stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Terrain(#[from] TerrainError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
