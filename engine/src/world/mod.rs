//! World Module
//!
//! Heightmap terrain and the stage that runs racers over it.
//!
//! The terrain occupies a rectangle centered on the origin; walking off one
//! edge of the height grid continues from the opposite edge when sampling,
//! but bodies outside the rectangle get no ground.

pub mod heightfield;
pub mod stage;
pub mod terrain;
pub mod terrain_mesh;

pub use heightfield::{HeightField, PixelGrid};
pub use stage::{PLAYER, Stage};
pub use terrain::Terrain;
pub use terrain_mesh::{NoiseParams, TerrainMesh, TerrainVertex, generate_heightmap_pixels};
