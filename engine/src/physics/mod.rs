//! Physics module
//!
//! Hand-written terrain physics for racers and the chase camera. No external
//! physics engine: bodies are points with a height offset that collide with
//! the terrain one triangle at a time.
//!
//! # Unit System
//!
//! Distances are world units; velocities are world units per tick. Every
//! integrator takes a `time_scale` multiplier (1.0 = one 60 Hz tick).
//!
//! # Submodules
//!
//! - [`types`] - Vector types re-exported from glam plus scalar helpers
//! - [`collision`] - Body state, plane collision and the ground-contact hook

pub mod collision;
pub mod types;

pub use collision::{
    Body, CONTACT_TOLERANCE, GroundContact, MIN_NORMAL_Y, OrientationResponder,
    apply_plane_collision, ground_plane, plane_height, point_in_triangle_xz,
};
pub use types::{
    Vec2, Vec3, approach, approach_vec3, horizontal, neg_mod, neg_mod_i32, normalize_or,
    normalize_or_up,
};
