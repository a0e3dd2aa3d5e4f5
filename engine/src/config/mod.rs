//! Config Module
//!
//! Centralized tuning for the stage, racers and chase camera. `Default`
//! returns the stock handling; JSON files override individual values.

pub mod camera_config;
pub mod racer_config;
pub mod stage_config;

pub use camera_config::CameraConfig;
pub use racer_config::RacerConfig;
pub use stage_config::StageConfig;
