//! Terrain
//!
//! A [`HeightField`] placed in the world: centered at the origin, spanning
//! `scale.x` by `scale.z`, with heights multiplied by `scale.y`. The terrain
//! answers collision queries for any [`OrientationResponder`] but never owns
//! the bodies it is queried with.

use glam::{Vec2, Vec3, Vec3Swizzles};
use tracing::info;

use crate::error::TerrainError;
use crate::physics::{
    OrientationResponder, apply_plane_collision, ground_plane, plane_height, point_in_triangle_xz,
};
use crate::world::heightfield::{HeightField, PixelGrid};
use crate::world::terrain_mesh::TerrainMesh;

/// Heightmap terrain with its render mesh.
#[derive(Clone, Debug)]
pub struct Terrain {
    field: HeightField,
    scale: Vec3,
    mesh: TerrainMesh,
}

impl Terrain {
    /// Places `field` in the world with the given non-uniform scale.
    pub fn new(field: HeightField, scale: Vec3) -> Result<Self, TerrainError> {
        if !scale.is_finite() || scale.cmple(Vec3::ZERO).any() {
            return Err(TerrainError::InvalidScale(scale));
        }

        let mesh = TerrainMesh::from_heightfield(&field);
        info!(
            width = field.width(),
            height = field.height(),
            scale = ?scale,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "terrain built"
        );

        Ok(Self { field, scale, mesh })
    }

    /// Builds a terrain straight from heightmap pixels.
    pub fn from_pixels(grid: &PixelGrid, scale: Vec3) -> Result<Self, TerrainError> {
        Self::new(HeightField::from_pixels(grid)?, scale)
    }

    /// Replaces the whole terrain with one built from `grid`.
    ///
    /// On error the current terrain is left untouched.
    pub fn rebuild(&mut self, grid: &PixelGrid) -> Result<(), TerrainError> {
        *self = Self::from_pixels(grid, self.scale)?;
        Ok(())
    }

    pub fn heightfield(&self) -> &HeightField {
        &self.field
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Render geometry in unit space; the renderer applies `scale` and the
    /// `(-0.5, 0, -0.5)` centering offset.
    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    /// World-space size of one grid cell in X and Z.
    pub fn cell_size(&self) -> Vec2 {
        Vec2::new(
            self.scale.x / self.field.width() as f32,
            self.scale.z / self.field.height() as f32,
        )
    }

    /// Grid cell under world `(x, z)`, or `None` off the map.
    pub fn cell_at(&self, x: f32, z: f32) -> Option<(i32, i32)> {
        let step = self.cell_size();
        let fx = ((x + self.scale.x * 0.5) / step.x).floor();
        let fz = ((z + self.scale.z * 0.5) / step.y).floor();

        // NaN fails both comparisons
        let in_x = fx >= 0.0 && fx < self.field.width() as f32;
        let in_z = fz >= 0.0 && fz < self.field.height() as f32;
        if in_x && in_z {
            Some((fx as i32, fz as i32))
        } else {
            None
        }
    }

    /// Whether world `(x, z)` lies over the terrain.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        self.cell_at(x, z).is_some()
    }

    /// World-space corners of cell `(tx, tz)`: top-left, top-right,
    /// bottom-right, bottom-left. Heights past the last row/column wrap.
    pub fn cell_corners(&self, tx: i32, tz: i32) -> [Vec3; 4] {
        let step = self.cell_size();
        let px = tx as f32 * step.x - self.scale.x * 0.5;
        let pz = tz as f32 * step.y - self.scale.z * 0.5;
        let y = |x, z| self.field.get(x, z) * self.scale.y;

        [
            Vec3::new(px, y(tx, tz), pz),
            Vec3::new(px + step.x, y(tx + 1, tz), pz),
            Vec3::new(px + step.x, y(tx + 1, tz + 1), pz + step.y),
            Vec3::new(px, y(tx, tz + 1), pz + step.y),
        ]
    }

    /// Resolves ground contact for `body` against the cell beneath it.
    ///
    /// Off-map bodies are skipped. Of the cell's two triangles the first one
    /// that accepts wins. Returns `true` if the body's contact hook fired.
    pub fn get_collisions<R: OrientationResponder + ?Sized>(&self, body: &mut R) -> bool {
        let p = body.body().position;
        let Some((tx, tz)) = self.cell_at(p.x, p.z) else {
            return false;
        };

        let [tl, tr, br, bl] = self.cell_corners(tx, tz);
        apply_plane_collision(body, tl, tr, br) || apply_plane_collision(body, br, bl, tl)
    }

    /// Surface height at world `(x, z)`, or `None` off the map.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let (tx, tz) = self.cell_at(x, z)?;
        let [tl, tr, br, bl] = self.cell_corners(tx, tz);
        let p = Vec2::new(x, z);

        [(tl, tr, br), (br, bl, tl)]
            .into_iter()
            .filter(|(a, b, c)| point_in_triangle_xz(p, a.xz(), b.xz(), c.xz()))
            .find_map(|(a, b, c)| ground_plane(a, b, c))
            .map(|(n, d)| plane_height(n, d, x, z))
    }
}
