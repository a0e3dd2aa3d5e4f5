//! Terrain Mesh Generator
//!
//! Builds the renderable surface for a [`HeightField`] and, when no heightmap
//! asset is at hand, generates one procedurally.
//!
//! Mesh layout:
//! - Shared-vertex grid of `(W + 1) x (H + 1)` vertices over the unit square
//!   in XZ, Y = normalized height. The last row/column samples the wrapped
//!   first row/column, so the mesh agrees with the toroidal collision query.
//! - One triangle pair per cell, split along the top-left/bottom-right diagonal
//!   (the same split the collision query uses), wound counter-clockwise seen
//!   from above.
//! - Texture coordinates are grid indices, for a tiling ground texture.
//! - Interior normals average the adjacent face normals. Boundary vertices copy
//!   their nearest interior neighbour's normal; this is an approximation at the
//!   wrap seam, not an exact normal.

use glam::{IVec2, Vec2, Vec3};

use crate::physics::normalize_or_up;
use crate::world::heightfield::{HeightField, PixelGrid};

/// Interleaved vertex for GPU upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 32]);

/// Generated terrain geometry. Built once, never mutated afterwards.
#[derive(Clone, Debug)]
pub struct TerrainMesh {
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl TerrainMesh {
    /// Triangulates `field` over the unit square.
    pub fn from_heightfield(field: &HeightField) -> Self {
        let w = field.width() as usize;
        let h = field.height() as usize;
        let row = w + 1;
        let vertex_count = row * (h + 1);

        let mut positions = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);
        for z in 0..=h {
            for x in 0..=w {
                positions.push(Vec3::new(
                    x as f32 / w as f32,
                    field.get(x as i32, z as i32),
                    z as f32 / h as f32,
                ));
                uvs.push([x as f32, z as f32]);
            }
        }

        let mut indices = Vec::with_capacity(w * h * 6);
        let mut accum = vec![Vec3::ZERO; vertex_count];
        for z in 0..h {
            for x in 0..w {
                let tl = z * row + x;
                let tr = tl + 1;
                let bl = tl + row;
                let br = bl + 1;

                for tri in [[tl, br, tr], [br, tl, bl]] {
                    let n = face_normal(positions[tri[0]], positions[tri[1]], positions[tri[2]]);
                    for &i in &tri {
                        accum[i] += n;
                    }
                    indices.extend(tri.iter().map(|&i| i as u32));
                }
            }
        }

        let mut normals: Vec<Vec3> = accum.into_iter().map(normalize_or_up).collect();

        // Boundary vertices take their nearest interior neighbour's normal
        if w >= 2 && h >= 2 {
            for z in 0..=h {
                for x in 0..=w {
                    let cx = x.clamp(1, w - 1);
                    let cz = z.clamp(1, h - 1);
                    if cx != x || cz != z {
                        normals[z * row + x] = normals[cz * row + cx];
                    }
                }
            }
        }

        Self {
            positions: positions.into_iter().map(Into::into).collect(),
            uvs,
            normals: normals.into_iter().map(Into::into).collect(),
            indices,
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaved copy of the vertex arrays, ready for a vertex buffer.
    pub fn interleaved(&self) -> Vec<TerrainVertex> {
        self.positions
            .iter()
            .zip(&self.uvs)
            .zip(&self.normals)
            .map(|((&position, &uv), &normal)| TerrainVertex {
                position,
                uv,
                normal,
            })
            .collect()
    }
}

/// Upward-facing unit normal of a triangle, world up if degenerate.
fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let n = normalize_or_up((b - a).cross(c - a));
    if n.y < 0.0 { -n } else { n }
}

// ============================================================================
// Procedural heightmaps
// ============================================================================

/// Parameters for procedural heightmap generation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Offsets the noise lattice; different seeds give different terrain
    pub seed: u32,
    /// Number of fbm octaves
    pub octaves: u32,
    /// Lattice cells across the map at the first octave
    pub frequency: u32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 1,
            octaves: 5,
            frequency: 4,
        }
    }
}

fn hash21(p: Vec2) -> f32 {
    let p3 = Vec3::new(p.x, p.y, p.x) * 0.1031;
    let p3 = p3 - p3.floor();
    let p3 = p3 + Vec3::splat(p3.dot(Vec3::new(p3.y, p3.z, p3.x) + Vec3::splat(33.33)));
    ((p3.x + p3.y) * p3.z).fract()
}

/// Value noise whose lattice repeats every `period` cells.
fn periodic_noise2d(p: Vec2, period: IVec2, seed: u32) -> f32 {
    let i = p.floor();
    let f = p - i;
    let u = f * f * (Vec2::splat(3.0) - f * 2.0);

    let offset = Vec2::new((seed % 1013) as f32 * 7.31, (seed / 1013 % 1013) as f32 * 3.17);
    let corner = |dx: i32, dz: i32| {
        let cx = (i.x as i32 + dx).rem_euclid(period.x);
        let cz = (i.y as i32 + dz).rem_euclid(period.y);
        hash21(Vec2::new(cx as f32, cz as f32) + offset)
    };

    let a = corner(0, 0);
    let b = corner(1, 0);
    let c = corner(0, 1);
    let d = corner(1, 1);

    let ab = a + (b - a) * u.x;
    let cd = c + (d - c) * u.x;
    ab + (cd - ab) * u.y
}

/// Tileable fbm over the unit square, normalized to roughly `[0, 1]`.
fn periodic_fbm(uv: Vec2, params: &NoiseParams) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut total = 0.0;
    let mut period = params.frequency.max(1) as i32;

    for octave in 0..params.octaves.max(1) {
        let p = uv * period as f32;
        value += amplitude * periodic_noise2d(p, IVec2::splat(period), params.seed.wrapping_add(octave));
        total += amplitude;
        period *= 2;
        amplitude *= 0.5;
    }

    value / total
}

/// Generates a grayscale RGBA heightmap that tiles seamlessly, matching the
/// heightfield's toroidal lookup.
pub fn generate_heightmap_pixels(width: u32, height: u32, params: &NoiseParams) -> PixelGrid {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for z in 0..height {
        for x in 0..width {
            let uv = Vec2::new(x as f32 / width as f32, z as f32 / height as f32);
            let v = (periodic_fbm(uv, params).clamp(0.0, 1.0) * 255.0).round() as u8;
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    PixelGrid::new(width, height, 4, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_field(w: u32, h: u32) -> HeightField {
        HeightField::from_pixels(&generate_heightmap_pixels(w, h, &NoiseParams::default())).unwrap()
    }

    #[test]
    fn test_mesh_sizes() {
        let field = HeightField::flat(8, 6, 0.5).unwrap();
        let mesh = TerrainMesh::from_heightfield(&field);
        assert_eq!(mesh.vertex_count(), 9 * 7);
        assert_eq!(mesh.uvs().len(), mesh.vertex_count());
        assert_eq!(mesh.normals().len(), mesh.vertex_count());
        assert_eq!(mesh.triangle_count(), 8 * 6 * 2);
        assert!(mesh.indices().iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_mesh_covers_unit_square() {
        let mesh = TerrainMesh::from_heightfield(&noisy_field(16, 16));
        let first = mesh.positions()[0];
        let last = *mesh.positions().last().unwrap();
        assert_eq!((first[0], first[2]), (0.0, 0.0));
        assert_eq!((last[0], last[2]), (1.0, 1.0));
        // Seam vertices sample the wrapped first row
        assert_eq!(last[1], first[1]);
    }

    #[test]
    fn test_normals_are_unit_and_finite() {
        let mesh = TerrainMesh::from_heightfield(&noisy_field(24, 17));
        for n in mesh.normals() {
            let v = Vec3::from(*n);
            assert!(v.is_finite());
            assert!((v.length() - 1.0).abs() < 1e-4);
            assert!(v.y > 0.0);
        }
    }

    #[test]
    fn test_flat_field_normals_point_up() {
        let mesh = TerrainMesh::from_heightfield(&HeightField::flat(4, 4, 0.3).unwrap());
        for n in mesh.normals() {
            assert!(Vec3::from(*n).abs_diff_eq(Vec3::Y, 1e-6));
        }
    }

    #[test]
    fn test_boundary_normals_duplicate_interior() {
        let mesh = TerrainMesh::from_heightfield(&noisy_field(8, 8));
        let row = 9;
        assert_eq!(mesh.normals()[0], mesh.normals()[row + 1]);
        assert_eq!(mesh.normals()[8 * row + 8], mesh.normals()[7 * row + 7]);
    }

    #[test]
    fn test_triangles_face_up() {
        let mesh = TerrainMesh::from_heightfield(&noisy_field(10, 10));
        let p = mesh.positions();
        for tri in mesh.indices().chunks_exact(3) {
            let a = Vec3::from(p[tri[0] as usize]);
            let b = Vec3::from(p[tri[1] as usize]);
            let c = Vec3::from(p[tri[2] as usize]);
            assert!((b - a).cross(c - a).y > 0.0);
        }
    }

    #[test]
    fn test_single_cell_field() {
        let mesh = TerrainMesh::from_heightfield(&HeightField::flat(1, 1, 0.0).unwrap());
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.normals().iter().all(|n| Vec3::from(*n).is_finite()));
    }

    #[test]
    fn test_interleaved_matches_arrays() {
        let mesh = TerrainMesh::from_heightfield(&noisy_field(4, 4));
        let verts = mesh.interleaved();
        assert_eq!(verts.len(), mesh.vertex_count());
        assert_eq!(verts[7].position, mesh.positions()[7]);
        assert_eq!(verts[7].normal, mesh.normals()[7]);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&verts).len(), verts.len() * 32);
    }

    #[test]
    fn test_procedural_heightmap_is_deterministic_and_tiles() {
        let params = NoiseParams::default();
        let a = generate_heightmap_pixels(32, 32, &params);
        let b = generate_heightmap_pixels(32, 32, &params);
        assert_eq!(a.pixels, b.pixels);

        // Wrapping the uv by a full period lands on the same noise value
        let v0 = periodic_fbm(Vec2::new(0.0, 0.3), &params);
        let v1 = periodic_fbm(Vec2::new(1.0, 0.3), &params);
        assert!((v0 - v1).abs() < 1e-4);
    }

    #[test]
    fn test_seed_changes_terrain() {
        let a = generate_heightmap_pixels(16, 16, &NoiseParams { seed: 1, ..Default::default() });
        let b = generate_heightmap_pixels(16, 16, &NoiseParams { seed: 2, ..Default::default() });
        assert_ne!(a.pixels, b.pixels);
    }
}
