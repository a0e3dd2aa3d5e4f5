//! Slope Racer Engine
//!
//! Terrain collision and physics integration for racers driving over a
//! heightmap terrain, plus the chase camera that follows them.
//!
//! # Modules
//!
//! - [`physics`] - Vector helpers, bodies and plane collision
//! - [`world`] - Heightfields, terrain mesh and collision query, the stage
//! - [`player`] - Racer control and integration
//! - [`camera`] - Chase camera smoothing
//! - [`input`] - Per-tick racer intents
//! - [`config`] - Tuning values, loadable from JSON
//!
//! # Example
//!
//! ```ignore
//! use slope_racer_engine::config::StageConfig;
//! use slope_racer_engine::input::RacerIntents;
//! use slope_racer_engine::world::Stage;
//!
//! let mut stage = Stage::procedural(StageConfig::default())?;
//! let intents = RacerIntents { move_forward: true, ..Default::default() };
//!
//! // Fixed step, called zero or more times per rendered frame
//! stage.update(&intents, 1.0);
//! stage.respawn_fallen();
//!
//! let snapshot = stage.player().snapshot();
//! let mesh = stage.terrain().mesh();
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod physics;
pub mod player;
pub mod world;

pub use camera::ChaseCamera;
pub use config::{CameraConfig, RacerConfig, StageConfig};
pub use error::{ConfigError, StageError, TerrainError};
pub use input::{IntentTracker, RacerIntents};
pub use physics::{Body, GroundContact, OrientationResponder};
pub use player::{ControlMode, Racer, RacerSnapshot};
pub use world::{HeightField, PixelGrid, Stage, Terrain, TerrainMesh};
