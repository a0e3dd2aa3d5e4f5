//! Camera Module
//!
//! Chase camera state and smoothing. Projection and view matrices belong to
//! whoever draws the scene.

pub mod chase;

pub use chase::ChaseCamera;
