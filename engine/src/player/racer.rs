//! Racer
//!
//! A [`Body`] with yaw steering, a slope-aligned orientation basis and a
//! timed jump. Each tick runs in two halves:
//!
//! - [`Racer::update`]: control (manual racers only), then integration.
//!   Integration clears the ground flag and resets `up` to world up.
//! - The terrain query, which fires [`OrientationResponder::on_ground_contact`]
//!   when the racer is supported. That snaps it onto the surface, tilts the
//!   basis to the contact normal and sets the ground flag again.
//!
//! The physics basis snaps; the pose basis used for drawing converges
//! toward it a little every tick.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RacerConfig;
use crate::input::RacerIntents;
use crate::physics::{
    Body, GroundContact, OrientationResponder, approach, approach_vec3, horizontal, neg_mod,
    normalize_or, normalize_or_up,
};

/// Jump ticks left after a press and release inside the same tick.
pub const MIN_JUMP_TICKS: f32 = 1.0;

/// Who produces the racer's targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlMode {
    /// Targets come from intents via [`Racer::control`]
    #[default]
    Manual,
    /// Targets are set externally with [`Racer::set_ai_targets`] and kept until changed
    Ai,
}

/// Orthonormal orientation basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationBasis {
    pub front: Vec3,
    pub left: Vec3,
    pub up: Vec3,
}

impl OrientationBasis {
    /// Level basis facing yaw `angle` (0 faces +Z, left is +X).
    pub fn from_yaw(angle: f32) -> Self {
        let front = Vec3::new(angle.sin(), 0.0, angle.cos());
        Self {
            front,
            left: Vec3::Y.cross(front),
            up: Vec3::Y,
        }
    }
}

impl Default for OrientationBasis {
    fn default() -> Self {
        Self::from_yaw(0.0)
    }
}

/// Read-only per-frame view of a racer for drawing and cameras.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RacerSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Magnitude of the horizontal target velocity
    pub target_speed: f32,
    pub angle: f32,
    /// Physics basis, orthonormal
    pub basis: OrientationBasis,
    /// Smoothed basis for drawing. Each vector is unit length, but while the
    /// pose is still converging they are not exactly orthogonal.
    pub pose: OrientationBasis,
    /// Point on the ground below the racer where the drop shadow sits
    pub shadow_anchor: Vec3,
    /// Drop shadow size in [0, 1]
    pub shadow_scale: f32,
    pub grounded: bool,
}

/// A racer driving over the terrain.
#[derive(Debug, Clone)]
pub struct Racer {
    body: Body,
    config: RacerConfig,
    mode: ControlMode,

    angle: f32,
    angle_speed: f32,
    angle_target: f32,

    basis: OrientationBasis,
    pose: OrientationBasis,

    jump_timer: f32,
    jump_dir: Vec3,

    grounded: bool,
    was_grounded: bool,
    shadow: Vec3,
}

impl Racer {
    pub fn new(position: Vec3, config: RacerConfig, mode: ControlMode) -> Self {
        let height_offset = config.height_offset;
        Self {
            body: Body::with_height_offset(position, height_offset),
            config,
            mode,
            angle: 0.0,
            angle_speed: 0.0,
            angle_target: 0.0,
            basis: OrientationBasis::default(),
            pose: OrientationBasis::default(),
            jump_timer: 0.0,
            jump_dir: Vec3::Y,
            grounded: false,
            was_grounded: false,
            shadow: Vec3::new(position.x, position.y - height_offset, position.z),
        }
    }

    /// Puts the racer back at `position` at rest, keeping config and mode.
    pub fn respawn(&mut self, position: Vec3) {
        *self = Self::new(position, self.config.clone(), self.mode);
    }

    /// Sets targets for an AI-driven racer; ignored by [`Racer::control`].
    ///
    /// Only the horizontal part of `target_velocity` is used.
    pub fn set_ai_targets(&mut self, target_velocity: Vec3, angle_target: f32) {
        self.body.target.x = target_velocity.x;
        self.body.target.z = target_velocity.z;
        self.angle_target = angle_target;
    }

    /// Maps intents to targets. AI racers keep their targets untouched.
    pub fn control(&mut self, intents: &RacerIntents) {
        if self.mode == ControlMode::Ai {
            return;
        }

        let h_speed = horizontal(self.body.velocity).length();

        // Faster racers turn tighter
        self.angle_target =
            intents.turn_axis() * (self.config.turn_speed + self.config.turn_speed_gain * h_speed);

        let drive = intents.drive_axis();
        let speed = if drive > 0.0 {
            self.config.forward_speed
        } else if drive < 0.0 {
            -self.config.reverse_speed()
        } else {
            0.0
        };
        let facing = OrientationBasis::from_yaw(self.angle).front;
        self.body.target.x = facing.x * speed;
        self.body.target.z = facing.z * speed;

        if intents.jump_pressed && self.grounded {
            let h_dir = horizontal(self.body.velocity).normalize_or_zero();
            self.jump_dir = normalize_or_up(self.basis.up + h_dir);
            self.jump_timer = self.config.jump_time;
            debug!(dir = ?self.jump_dir, "jump armed");
        }

        if intents.jump_released && !intents.jump_held && self.jump_timer > 0.0 {
            // A tap inside one tick keeps the shortest jump
            let remaining = if intents.jump_pressed {
                self.jump_timer.min(MIN_JUMP_TICKS)
            } else {
                0.0
            };
            debug!(from = self.jump_timer, to = remaining, "jump cut short");
            self.jump_timer = remaining;
        }
    }

    /// Advances velocity, position, yaw and both bases by one tick.
    pub fn integrate(&mut self, time_scale: f32) {
        let cfg = &self.config;
        let on_ground = self.grounded;
        self.was_grounded = on_ground;
        self.grounded = false;

        // Horizontal speed
        let velocity = horizontal(self.body.velocity);
        let target = horizontal(self.body.target);
        let front = self.basis.front;
        let accel = if velocity.dot(target) < 0.0 {
            cfg.brake_deceleration
        } else if on_ground && velocity.dot(front) > 0.0 && target.dot(front) > 0.0 {
            // Soft top speed
            let speed = velocity.length();
            cfg.acceleration / (speed * cfg.acceleration_falloff).exp().sqrt()
        } else {
            cfg.acceleration
        };
        let step = accel * time_scale;
        self.body.velocity.x = approach(self.body.velocity.x, target.x, step);
        self.body.velocity.z = approach(self.body.velocity.z, target.z, step);

        // Vertical speed, or the jump override
        if self.jump_timer > 0.0 {
            self.body.velocity = self.jump_dir * cfg.jump_speed;
            self.jump_timer = (self.jump_timer - time_scale).max(0.0);
        } else {
            self.body.velocity.y =
                approach(self.body.velocity.y, cfg.gravity, cfg.gravity_step * time_scale);
        }

        // Turning
        self.angle_speed =
            approach(self.angle_speed, self.angle_target, cfg.turn_acceleration * time_scale);
        self.angle = neg_mod(self.angle + self.angle_speed * time_scale, TAU);

        self.body.position += self.body.velocity * time_scale;

        // The pose chases last tick's contact basis before it is reset
        let pose_step = time_scale / cfg.pose_smoothing;
        let smooth = |pose: Vec3, raw: Vec3| normalize_or(approach_vec3(pose, raw, pose_step), raw);
        self.pose = OrientationBasis {
            front: smooth(self.pose.front, self.basis.front),
            left: smooth(self.pose.left, self.basis.left),
            up: smooth(self.pose.up, self.basis.up),
        };

        self.basis = OrientationBasis::from_yaw(self.angle);
    }

    /// One simulation tick before the terrain query.
    pub fn update(&mut self, intents: &RacerIntents, time_scale: f32) {
        self.control(intents);
        self.integrate(time_scale);
    }

    /// Moves the drop shadow under the racer at ground height `ground_y`.
    pub fn set_shadow_ground(&mut self, ground_y: f32) {
        let p = self.body.position;
        self.shadow = Vec3::new(p.x, ground_y, p.z);
    }

    /// Drop shadow size: 1 on the ground, shrinking linearly to 0 at
    /// `shadow_fade_height` above it.
    pub fn shadow_scale(&self) -> f32 {
        let above = self.body.position.y - self.body.height_offset - self.shadow.y;
        (1.0 - above / self.config.shadow_fade_height).clamp(0.0, 1.0)
    }

    pub fn snapshot(&self) -> RacerSnapshot {
        RacerSnapshot {
            position: self.body.position,
            velocity: self.body.velocity,
            target_speed: self.target_speed(),
            angle: self.angle,
            basis: self.basis,
            pose: self.pose,
            shadow_anchor: self.shadow,
            shadow_scale: self.shadow_scale(),
            grounded: self.grounded,
        }
    }

    /// Whether this tick's terrain query found support.
    pub fn can_jump(&self) -> bool {
        self.grounded
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.body.velocity
    }

    /// Magnitude of the horizontal target velocity.
    pub fn target_speed(&self) -> f32 {
        horizontal(self.body.target).length()
    }

    /// Yaw in `[0, 2π)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn angle_speed(&self) -> f32 {
        self.angle_speed
    }

    /// Physics basis.
    pub fn basis(&self) -> OrientationBasis {
        self.basis
    }

    /// Smoothed basis.
    pub fn pose(&self) -> OrientationBasis {
        self.pose
    }

    pub fn jump_timer(&self) -> f32 {
        self.jump_timer
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn config(&self) -> &RacerConfig {
        &self.config
    }
}

impl OrientationResponder for Racer {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn on_ground_contact(&mut self, contact: &GroundContact) {
        self.body.position.y = contact.height + self.body.height_offset;
        if self.body.velocity.y < 0.0 {
            self.body.velocity.y = 0.0;
        }

        let up = contact.normal;
        let front = normalize_or(
            self.basis.front - up * self.basis.front.dot(up),
            self.basis.front,
        );
        self.basis = OrientationBasis {
            front,
            left: normalize_or(up.cross(front), self.basis.left),
            up,
        };

        if !self.was_grounded && !self.grounded {
            debug!(height = contact.height, "racer landed");
        }
        self.grounded = true;
        self.set_shadow_ground(contact.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ControlLevels, IntentTracker};
    use crate::world::{HeightField, Terrain};

    fn flat_terrain() -> Terrain {
        Terrain::new(
            HeightField::flat(64, 64, 0.5).unwrap(),
            Vec3::new(64.0, 32.0, 64.0),
        )
        .unwrap()
    }

    fn forward() -> RacerIntents {
        RacerIntents {
            move_forward: true,
            ..Default::default()
        }
    }

    fn grounded_racer(terrain: &Terrain) -> Racer {
        let mut racer = Racer::new(Vec3::new(0.0, 16.0, 0.0), RacerConfig::default(), ControlMode::Manual);
        racer.update(&RacerIntents::default(), 1.0);
        assert!(terrain.get_collisions(&mut racer));
        racer
    }

    #[test]
    fn test_ground_flag_resets_every_tick() {
        let terrain = flat_terrain();
        let mut racer = grounded_racer(&terrain);
        assert!(racer.can_jump());

        racer.update(&RacerIntents::default(), 1.0);
        assert!(!racer.can_jump());
        assert!(!racer.is_grounded());
    }

    #[test]
    fn test_forward_speed_is_bounded() {
        let terrain = flat_terrain();
        let mut racer = grounded_racer(&terrain);
        let limit = racer.config().forward_speed;

        let mut last = 0.0;
        for tick in 0..600 {
            // Keep the racer on the map
            if racer.position().z > 20.0 {
                racer.body_mut().position.z = -20.0;
            }
            racer.update(&forward(), 1.0);
            terrain.get_collisions(&mut racer);

            let speed = horizontal(racer.velocity()).length();
            assert!(speed <= limit + 1e-6, "tick {tick}: {speed}");
            assert!(speed + 1e-6 >= last, "speed must not drop while accelerating");
            last = speed;
        }
        assert!((last - limit).abs() < 1e-4);
    }

    #[test]
    fn test_acceleration_fades_with_speed() {
        let terrain = flat_terrain();
        let mut racer = grounded_racer(&terrain);

        let mut gains = Vec::new();
        for _ in 0..10 {
            let before = horizontal(racer.velocity()).length();
            racer.update(&forward(), 1.0);
            terrain.get_collisions(&mut racer);
            gains.push(horizontal(racer.velocity()).length() - before);
        }
        // First tick starts from rest at full acceleration
        assert!((gains[0] - racer.config().acceleration).abs() < 1e-6);
        assert!(gains.windows(2).skip(1).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_reverse_brakes_then_backs_up() {
        let terrain = flat_terrain();
        let mut racer = grounded_racer(&terrain);
        for _ in 0..30 {
            racer.update(&forward(), 1.0);
            terrain.get_collisions(&mut racer);
        }
        let v0 = racer.velocity().z;
        assert!(v0 > 0.0);

        let back = RacerIntents {
            move_backward: true,
            ..Default::default()
        };
        racer.update(&back, 1.0);
        terrain.get_collisions(&mut racer);
        let braked = v0 - racer.velocity().z;
        assert!((braked - racer.config().brake_deceleration).abs() < 1e-6);

        for _ in 0..60 {
            racer.update(&back, 1.0);
            terrain.get_collisions(&mut racer);
        }
        let reverse = racer.config().reverse_speed();
        assert!((racer.velocity().z + reverse).abs() < 1e-5);
    }

    #[test]
    fn test_jump_arms_and_release_truncates() {
        let terrain = flat_terrain();
        let mut racer = grounded_racer(&terrain);

        let press = RacerIntents {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        };
        racer.update(&press, 1.0);
        assert!(racer.jump_timer() > 0.0);
        assert!(racer.velocity().y > 0.0);
        assert!(!terrain.get_collisions(&mut racer), "racer left the ground");

        let held = RacerIntents {
            jump_held: true,
            ..Default::default()
        };
        racer.update(&held, 1.0);
        assert!(racer.jump_timer() > 0.0);

        let release = RacerIntents {
            jump_released: true,
            ..Default::default()
        };
        racer.control(&release);
        assert_eq!(racer.jump_timer(), 0.0);
    }

    #[test]
    fn test_no_jump_while_airborne() {
        let mut racer = Racer::new(Vec3::new(0.0, 30.0, 0.0), RacerConfig::default(), ControlMode::Manual);
        racer.update(
            &RacerIntents {
                jump_pressed: true,
                jump_held: true,
                ..Default::default()
            },
            1.0,
        );
        assert_eq!(racer.jump_timer(), 0.0);
        assert!(racer.velocity().y < 0.0);
    }

    #[test]
    fn test_jump_direction_carries_momentum() {
        let terrain = flat_terrain();
        let mut racer = grounded_racer(&terrain);
        for _ in 0..40 {
            racer.update(&forward(), 1.0);
            terrain.get_collisions(&mut racer);
        }
        racer.update(
            &RacerIntents {
                move_forward: true,
                jump_pressed: true,
                jump_held: true,
                ..Default::default()
            },
            1.0,
        );
        let v = racer.velocity();
        assert!(v.y > 0.0 && v.z > 0.0);
        assert!((v.length() - racer.config().jump_speed).abs() < 1e-5);
    }

    #[test]
    fn test_jump_direction_at_part_speed_is_up_plus_move_direction() {
        let terrain = flat_terrain();
        let mut racer = grounded_racer(&terrain);
        for _ in 0..5 {
            racer.update(&forward(), 1.0);
            terrain.get_collisions(&mut racer);
        }
        assert!(horizontal(racer.velocity()).length() < racer.config().forward_speed * 0.5);

        racer.update(
            &RacerIntents {
                move_forward: true,
                jump_pressed: true,
                jump_held: true,
                ..Default::default()
            },
            1.0,
        );
        let dir = racer.velocity() / racer.config().jump_speed;
        let expected = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert!((dir - expected).length() < 1e-5, "{dir:?}");
    }

    /// Highest point above the ground for a jump held `hold` ticks
    /// (0 = pressed and released inside one tick).
    fn jump_peak(hold: u32) -> f32 {
        let terrain = flat_terrain();
        let mut racer = grounded_racer(&terrain);
        let ground = racer.position().y;
        let mut input = IntentTracker::new();

        input.set_levels(ControlLevels {
            jump: true,
            ..Default::default()
        });
        if hold == 0 {
            input.set_levels(ControlLevels::default());
        }

        let mut peak = ground;
        for tick in 0..400 {
            if tick == hold && hold > 0 {
                input.set_levels(ControlLevels::default());
            }
            racer.update(&input.tick(), 1.0);
            terrain.get_collisions(&mut racer);
            peak = peak.max(racer.position().y);
        }
        assert!(racer.is_grounded());
        peak - ground
    }

    #[test]
    fn test_jump_height_grows_with_hold_time() {
        let holds = [0, 1, 2, 4, 8, 12, 30];
        let peaks: Vec<f32> = holds.iter().map(|&h| jump_peak(h)).collect();

        assert!(peaks[0] > 0.0, "a tap still jumps");
        for (w, h) in peaks.windows(2).zip(holds.windows(2)) {
            assert!(w[1] + 1e-5 >= w[0], "hold {} peaked lower than hold {}", h[1], h[0]);
        }
        assert!(peaks[6] > peaks[0] * 1.5, "a full hold jumps clearly higher than a tap");
        // Holding past the jump time changes nothing
        assert!((peaks[5] - peaks[6]).abs() < 1e-5);
    }

    #[test]
    fn test_gravity_step_is_bounded() {
        let mut racer = Racer::new(Vec3::new(0.0, 100.0, 0.0), RacerConfig::default(), ControlMode::Manual);
        let cfg = racer.config().clone();
        let mut prev = 0.0;
        for _ in 0..100 {
            racer.integrate(1.0);
            let vy = racer.velocity().y;
            assert!(prev - vy <= cfg.gravity_step + 1e-6);
            assert!(vy >= cfg.gravity);
            prev = vy;
        }
        assert_eq!(prev, cfg.gravity);
    }

    #[test]
    fn test_yaw_stays_in_range() {
        let mut racer = Racer::new(Vec3::ZERO, RacerConfig::default(), ControlMode::Ai);
        racer.set_ai_targets(Vec3::ZERO, -0.7);
        for _ in 0..500 {
            racer.integrate(2.5);
            assert!((0.0..TAU).contains(&racer.angle()));
        }
        racer.set_ai_targets(Vec3::ZERO, 0.9);
        for _ in 0..500 {
            racer.integrate(3.0);
            assert!((0.0..TAU).contains(&racer.angle()));
        }
    }

    #[test]
    fn test_ai_racer_ignores_intents() {
        let mut racer = Racer::new(Vec3::ZERO, RacerConfig::default(), ControlMode::Ai);
        racer.set_ai_targets(Vec3::new(0.1, 5.0, 0.0), 0.02);
        racer.update(&forward(), 1.0);
        assert_eq!(racer.body().target, Vec3::new(0.1, 0.0, 0.0));
        assert!(racer.velocity().x > 0.0);
        assert!(racer.angle_speed() > 0.0);
    }

    #[test]
    fn test_turning_left_rotates_front_toward_left() {
        let terrain = flat_terrain();
        let mut racer = grounded_racer(&terrain);
        let left0 = racer.basis().left;
        let turn = RacerIntents {
            turn_left: true,
            ..Default::default()
        };
        for _ in 0..20 {
            racer.update(&turn, 1.0);
            terrain.get_collisions(&mut racer);
        }
        assert!(racer.basis().front.dot(left0) > 0.0);
    }

    #[test]
    fn test_slope_contact_tilts_basis_and_pose_follows() {
        let mut racer = Racer::new(Vec3::new(1.0, 0.0, -1.0), RacerConfig::default(), ControlMode::Manual);
        // Plane rising toward +x
        let (a, b, c) = (
            Vec3::new(-10.0, -5.0, -10.0),
            Vec3::new(10.0, 5.0, -10.0),
            Vec3::new(10.0, 5.0, 10.0),
        );

        let mut prev_gap = f32::MAX;
        for _ in 0..40 {
            racer.integrate(1.0);
            racer.body_mut().position.y = 0.0;
            assert!(crate::physics::apply_plane_collision(&mut racer, a, b, c));

            let basis = racer.basis();
            assert!((basis.up.length() - 1.0).abs() < 1e-5);
            assert!(basis.front.dot(basis.up).abs() < 1e-5);
            assert!(basis.left.dot(basis.up).abs() < 1e-5);
            assert!(basis.up.x < 0.0);

            let gap = (racer.pose().up - basis.up).length();
            assert!(gap <= prev_gap + 1e-6);
            prev_gap = gap;
        }
        assert!(prev_gap < 0.05);
    }

    #[test]
    fn test_snapshot_basis_is_orthonormal_while_pose_converges() {
        let mut racer = Racer::new(Vec3::new(1.0, 0.0, -1.0), RacerConfig::default(), ControlMode::Manual);
        let (a, b, c) = (
            Vec3::new(-10.0, -5.0, -10.0),
            Vec3::new(10.0, 5.0, -10.0),
            Vec3::new(10.0, 5.0, 10.0),
        );
        racer.integrate(1.0);
        racer.body_mut().position.y = 0.0;
        assert!(crate::physics::apply_plane_collision(&mut racer, a, b, c));

        let snap = racer.snapshot();
        let OrientationBasis { front, left, up } = snap.basis;
        for v in [front, left, up] {
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
        assert!(front.dot(left).abs() < 1e-5);
        assert!(front.dot(up).abs() < 1e-5);
        assert!(left.dot(up).abs() < 1e-5);

        // Pose still lags the tilted basis
        assert!((snap.pose.up - up).length() > 1e-3);
    }

    #[test]
    fn test_shadow_scale_shrinks_with_height() {
        let terrain = flat_terrain();
        let mut racer = grounded_racer(&terrain);
        assert_eq!(racer.shadow_scale(), 1.0);

        racer.body_mut().position.y += 4.0;
        assert!((racer.shadow_scale() - 0.5).abs() < 1e-6);

        racer.body_mut().position.y += 40.0;
        assert_eq!(racer.shadow_scale(), 0.0);

        let snap = racer.snapshot();
        assert_eq!(snap.shadow_anchor, Vec3::new(0.0, 16.0, 0.0));
    }

    #[test]
    fn test_respawn_resets_motion() {
        let terrain = flat_terrain();
        let mut racer = grounded_racer(&terrain);
        for _ in 0..20 {
            racer.update(&forward(), 1.0);
        }
        racer.respawn(Vec3::new(1.0, 20.0, 1.0));
        assert_eq!(racer.position(), Vec3::new(1.0, 20.0, 1.0));
        assert_eq!(racer.velocity(), Vec3::ZERO);
        assert_eq!(racer.angle(), 0.0);
        assert!(!racer.is_grounded());
    }
}
