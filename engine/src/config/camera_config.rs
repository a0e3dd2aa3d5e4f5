//! Chase Camera Configuration

use serde::{Deserialize, Serialize};

/// Chase camera follow and smoothing parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance behind the racer at standstill
    pub base_distance: f32,
    /// Extra distance per unit of the racer's horizontal target speed
    pub speed_distance: f32,
    /// Distance step per tick
    pub distance_step: f32,
    /// Divisor of the direction convergence step (same law as racer poses)
    pub direction_smoothing: f32,
    /// Vertical offset above the look-at point, scaled by the racer's pose up.y
    pub vertical_offset: f32,
    /// Divisor of the remaining vertical gap closed per tick
    pub vertical_smoothing: f32,
    /// Minimum clearance kept above the terrain
    pub height_offset: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            base_distance: 12.0,
            speed_distance: 20.0,
            distance_step: 0.1,
            direction_smoothing: 8.0,
            vertical_offset: 8.0,
            vertical_smoothing: 8.0,
            height_offset: 1.0,
        }
    }
}

impl CameraConfig {
    pub(crate) fn non_positive_fields(&self) -> Vec<&'static str> {
        [
            ("camera.base_distance", self.base_distance),
            ("camera.distance_step", self.distance_step),
            ("camera.direction_smoothing", self.direction_smoothing),
            ("camera.vertical_smoothing", self.vertical_smoothing),
        ]
        .into_iter()
        .filter(|(_, v)| !(v.is_finite() && *v > 0.0))
        .map(|(name, _)| name)
        .collect()
    }
}
