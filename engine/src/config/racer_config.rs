//! Racer Configuration
//!
//! Tuning values for racer control and integration. All speeds are world
//! units per tick and all steps are per tick at `time_scale = 1.0`.

use serde::{Deserialize, Serialize};

/// Racer physics tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RacerConfig {
    // Body
    /// Distance between the contact surface and the racer origin
    pub height_offset: f32,

    // Linear motion
    /// Target speed when driving forward
    pub forward_speed: f32,
    /// Reverse target speed as a fraction of `forward_speed`
    pub reverse_ratio: f32,
    /// Base velocity step toward the target
    pub acceleration: f32,
    /// Velocity step while the velocity still opposes the target
    pub brake_deceleration: f32,
    /// How quickly grounded forward acceleration fades with speed;
    /// the step is `acceleration / sqrt(exp(speed * falloff))`
    pub acceleration_falloff: f32,

    // Turning
    /// Angular target at standstill (radians per tick)
    pub turn_speed: f32,
    /// Extra angular target per unit of horizontal speed
    pub turn_speed_gain: f32,
    /// Angular velocity step toward the angular target
    pub turn_acceleration: f32,

    // Vertical motion
    /// Terminal vertical velocity (negative = down)
    pub gravity: f32,
    /// Vertical velocity step toward `gravity`
    pub gravity_step: f32,
    /// Speed along the jump direction while a jump is active
    pub jump_speed: f32,
    /// Jump duration in ticks
    pub jump_time: f32,

    // Presentation
    /// Divisor of the pose-vector convergence step (larger = slower)
    pub pose_smoothing: f32,
    /// Height above ground at which the drop shadow disappears
    pub shadow_fade_height: f32,
}

impl Default for RacerConfig {
    fn default() -> Self {
        Self {
            height_offset: 0.0,

            forward_speed: 0.15,
            reverse_ratio: 0.5,
            acceleration: 0.01,
            brake_deceleration: 0.02,
            acceleration_falloff: 10.0,

            turn_speed: 0.03,
            turn_speed_gain: 0.15,
            turn_acceleration: 0.005,

            gravity: -0.6,
            gravity_step: 0.015,
            jump_speed: 0.3,
            jump_time: 12.0,

            pose_smoothing: 8.0,
            shadow_fade_height: 8.0,
        }
    }
}

impl RacerConfig {
    /// Reverse target speed.
    #[inline]
    pub fn reverse_speed(&self) -> f32 {
        self.forward_speed * self.reverse_ratio
    }

    /// Names of values that must be strictly positive but are not.
    pub(crate) fn non_positive_fields(&self) -> Vec<&'static str> {
        [
            ("racer.forward_speed", self.forward_speed),
            ("racer.acceleration", self.acceleration),
            ("racer.brake_deceleration", self.brake_deceleration),
            ("racer.turn_acceleration", self.turn_acceleration),
            ("racer.gravity_step", self.gravity_step),
            ("racer.pose_smoothing", self.pose_smoothing),
            ("racer.shadow_fade_height", self.shadow_fade_height),
        ]
        .into_iter()
        .filter(|(_, v)| !(v.is_finite() && *v > 0.0))
        .map(|(name, _)| name)
        .collect()
    }
}
