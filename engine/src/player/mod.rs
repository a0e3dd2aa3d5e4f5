//! Player Module
//!
//! Racers: steering, slope-aware orientation and jumping.
//!
//! # Components
//!
//! - [`Racer`] - Body with yaw control, ground-aligned basis and smoothed pose
//! - [`ControlMode`] - Manual (intent-driven) or AI (externally targeted)
//! - [`RacerSnapshot`] - Per-frame read-only view for drawing and cameras

pub mod racer;

pub use racer::{ControlMode, OrientationBasis, Racer, RacerSnapshot};
