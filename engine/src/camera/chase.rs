//! Chase Camera
//!
//! Third-person camera trailing a racer. [`ChaseCamera::follow_racer`] sets
//! targets once per tick and [`ChaseCamera::update_animation`] eases toward
//! them:
//!
//! - distance: fixed step per tick
//! - direction: same divisor-based step as racer poses
//! - vertical offset: step proportional to the remaining gap (ease-out)
//!
//! The camera is a [`Body`], so the terrain query keeps it above ground.

use glam::Vec3;

use crate::config::CameraConfig;
use crate::physics::{Body, OrientationResponder, approach, approach_vec3, normalize_or};
use crate::player::{Racer, RacerSnapshot};

#[derive(Debug, Clone)]
pub struct ChaseCamera {
    body: Body,
    config: CameraConfig,

    look_at: Vec3,

    direction: Vec3,
    target_direction: Vec3,
    distance: f32,
    target_distance: f32,
    vertical: f32,
    target_vertical: f32,
}

impl ChaseCamera {
    /// Camera looking at `look_at` from its rest distance, facing +Z.
    pub fn new(look_at: Vec3, config: CameraConfig) -> Self {
        let direction = Vec3::Z;
        let distance = config.base_distance;
        let vertical = config.vertical_offset;
        let position = look_at - direction * distance + Vec3::Y * vertical;

        Self {
            body: Body::with_height_offset(position, config.height_offset),
            config,
            look_at,
            direction,
            target_direction: direction,
            distance,
            target_distance: distance,
            vertical,
            target_vertical: vertical,
        }
    }

    /// Camera already settled behind `racer`.
    pub fn behind(racer: &Racer, config: CameraConfig) -> Self {
        let mut camera = Self::new(racer.position(), config);
        camera.follow_racer(racer);
        camera.snap_to_targets();
        camera
    }

    pub fn follow_racer(&mut self, racer: &Racer) {
        self.follow(&racer.snapshot());
    }

    /// Records new targets from a racer snapshot.
    ///
    /// The camera backs off along the racer's pose front, rises with the
    /// pose up and pulls back as the target speed grows.
    pub fn follow(&mut self, racer: &RacerSnapshot) {
        self.look_at = racer.position;
        self.target_direction = normalize_or(racer.pose.front, self.target_direction);
        self.target_vertical = self.config.vertical_offset * racer.pose.up.y;
        self.target_distance =
            self.config.base_distance + self.config.speed_distance * racer.target_speed;
    }

    /// Eases toward the targets and places the camera.
    pub fn update_animation(&mut self, time_scale: f32) {
        let cfg = &self.config;

        self.distance = approach(
            self.distance,
            self.target_distance,
            cfg.distance_step * time_scale,
        );

        self.direction = normalize_or(
            approach_vec3(
                self.direction,
                self.target_direction,
                time_scale / cfg.direction_smoothing,
            ),
            self.target_direction,
        );

        let gap = (self.vertical - self.target_vertical).abs();
        self.vertical = approach(
            self.vertical,
            self.target_vertical,
            gap / cfg.vertical_smoothing * time_scale,
        );

        self.place();
    }

    /// Jumps straight to the targets.
    pub fn snap_to_targets(&mut self) {
        self.direction = self.target_direction;
        self.distance = self.target_distance;
        self.vertical = self.target_vertical;
        self.place();
    }

    fn place(&mut self) {
        self.body.position =
            self.look_at - self.direction * self.distance + Vec3::Y * self.vertical;
    }

    /// Eye position.
    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn vertical_offset(&self) -> f32 {
        self.vertical
    }

    pub fn target_direction(&self) -> Vec3 {
        self.target_direction
    }

    pub fn target_distance(&self) -> f32 {
        self.target_distance
    }

    pub fn target_vertical_offset(&self) -> f32 {
        self.target_vertical
    }
}

impl OrientationResponder for ChaseCamera {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
