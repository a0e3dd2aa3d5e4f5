//! Stage Configuration
//!
//! Top-level tuning for a stage: terrain placement, spawn point, respawn
//! threshold and the racer/camera sections. Loadable from JSON; missing
//! fields keep their defaults.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CameraConfig, RacerConfig};
use crate::error::ConfigError;
use crate::world::NoiseParams;

/// Stage-wide configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// World size of the terrain (x, z extents; y = height of a full-white pixel)
    pub terrain_scale: Vec3,
    /// Procedural heightmap size when no image is supplied
    pub heightmap_size: u32,
    /// Procedural heightmap parameters
    pub noise: NoiseParams,
    /// Where racers (re)spawn
    pub spawn_position: Vec3,
    /// Racers below this Y are reported as fallen
    pub respawn_depth: f32,
    pub racer: RacerConfig,
    pub camera: CameraConfig,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            terrain_scale: Vec3::new(64.0, 32.0, 64.0),
            heightmap_size: 64,
            noise: NoiseParams::default(),
            spawn_position: Vec3::new(0.0001, 32.0, 0.0001),
            respawn_depth: -16.0,
            racer: RacerConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl StageConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading stage config");
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects values the integrators cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut bad = self.racer.non_positive_fields();
        bad.extend(self.camera.non_positive_fields());

        if !self.terrain_scale.is_finite() || self.terrain_scale.cmple(Vec3::ZERO).any() {
            bad.push("terrain_scale");
        }
        if self.heightmap_size == 0 {
            bad.push("heightmap_size");
        }
        if !self.spawn_position.is_finite() {
            bad.push("spawn_position");
        }

        if bad.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "must be finite and positive: {}",
                bad.join(", ")
            )))
        }
    }
}
