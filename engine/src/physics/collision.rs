//! Body-versus-plane collision
//!
//! Every moving object on the terrain (racers, the chase camera) shares the
//! [`Body`] state and resolves ground contact one triangle at a time:
//!
//! 1. Cheap 2D point-in-triangle test on the XZ projection.
//! 2. Plane normal from the triangle edges, rejecting near-vertical planes.
//! 3. Solve the plane equation for the surface height below the body.
//! 4. If the body's base is at or below the surface, hand a [`GroundContact`]
//!    to the body's [`OrientationResponder`].
//!
//! # Example
//!
//! ```ignore
//! use slope_racer_engine::physics::{Body, Vec3, apply_plane_collision};
//!
//! let mut body = Body::new(Vec3::new(0.2, 0.5, 0.2));
//! let hit = apply_plane_collision(
//!     &mut body,
//!     Vec3::new(0.0, 1.0, 0.0),
//!     Vec3::new(1.0, 1.0, 0.0),
//!     Vec3::new(1.0, 1.0, 1.0),
//! );
//! assert!(hit);
//! assert_eq!(body.position.y, 1.0);
//! ```

use glam::{Vec2, Vec3, Vec3Swizzles};

/// Minimum |normal.y| of a unit plane normal for the plane to count as ground.
pub const MIN_NORMAL_Y: f32 = 1e-4;

/// How far above the surface a body may float and still be caught as touching it.
pub const CONTACT_TOLERANCE: f32 = 0.01;

/// Twice-area threshold under which a projected triangle is degenerate.
const DEGENERATE_AREA: f32 = 1e-10;

/// Result of an accepted plane collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundContact {
    /// Surface height directly below the body
    pub height: f32,
    /// Unit plane normal, always pointing up (normal.y > 0)
    pub normal: Vec3,
    /// Plane constant `d` in `n·p + d = 0`
    pub plane_d: f32,
    /// Signed distance from the body position to the plane
    pub distance: f32,
}

/// Shared physics state of anything that collides with the terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// World-space position of the body's visual origin
    pub position: Vec3,
    /// Current velocity in world units per tick
    pub velocity: Vec3,
    /// Velocity the integrator converges toward
    pub target: Vec3,
    /// Distance kept between the contact surface and `position`
    pub height_offset: f32,
}

impl Body {
    /// Creates a body at rest with no height offset.
    pub fn new(position: Vec3) -> Self {
        Self::with_height_offset(position, 0.0)
    }

    pub fn with_height_offset(position: Vec3, height_offset: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            target: Vec3::ZERO,
            height_offset,
        }
    }

    /// Tests the body against triangle `a, b, c` without touching any state.
    ///
    /// Returns the contact when the body is inside the triangle's XZ projection,
    /// the triangle is not near-vertical, and the body's base (`y - height_offset`)
    /// is below the plane plus [`CONTACT_TOLERANCE`].
    pub fn plane_collision(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<GroundContact> {
        let p = self.position;

        if !point_in_triangle_xz(p.xz(), a.xz(), b.xz(), c.xz()) {
            return None;
        }

        let (normal, plane_d) = ground_plane(a, b, c)?;

        let height = plane_height(normal, plane_d, p.x, p.z);
        if p.y - self.height_offset >= height + CONTACT_TOLERANCE {
            return None;
        }

        Some(GroundContact {
            height,
            normal,
            plane_d,
            distance: normal.dot(p) + plane_d,
        })
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

/// Capability of reacting to ground contact.
///
/// The default reaction snaps the body onto the surface, keeping its height
/// offset. Racers override it to derive their orientation from the slope.
pub trait OrientationResponder {
    fn body(&self) -> &Body;

    fn body_mut(&mut self) -> &mut Body;

    fn on_ground_contact(&mut self, contact: &GroundContact) {
        let body = self.body_mut();
        body.position.y = contact.height + body.height_offset;
    }
}

impl OrientationResponder for Body {
    fn body(&self) -> &Body {
        self
    }

    fn body_mut(&mut self) -> &mut Body {
        self
    }
}

/// Runs the plane collision for `responder` and applies an accepted contact.
///
/// Returns `true` if the responder's contact hook fired.
pub fn apply_plane_collision<R: OrientationResponder + ?Sized>(
    responder: &mut R,
    a: Vec3,
    b: Vec3,
    c: Vec3,
) -> bool {
    match responder.body().plane_collision(a, b, c) {
        Some(contact) => {
            responder.on_ground_contact(&contact);
            true
        }
        None => false,
    }
}

/// Whether `p` lies inside (or on the edge of) triangle `a, b, c`.
///
/// Uses the signs of three edge cross products. Zero-area triangles never
/// contain anything.
pub fn point_in_triangle_xz(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    if edge_function(c, a, b).abs() <= DEGENERATE_AREA {
        return false;
    }

    let d1 = edge_function(p, a, b);
    let d2 = edge_function(p, b, c);
    let d3 = edge_function(p, c, a);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    !(has_neg && has_pos)
}

/// Upward unit normal and plane constant of triangle `a, b, c`.
///
/// `None` for zero-area or near-vertical triangles, so callers never divide
/// by a vanishing `normal.y`.
pub fn ground_plane(a: Vec3, b: Vec3, c: Vec3) -> Option<(Vec3, f32)> {
    let n = (b - a).cross(c - a).try_normalize()?;
    if n.y.abs() < MIN_NORMAL_Y {
        return None;
    }
    let n = if n.y < 0.0 { -n } else { n };
    Some((n, -n.dot(a)))
}

/// Height of the plane `n·p + d = 0` at `(x, z)`. Requires `n.y != 0`.
#[inline]
pub fn plane_height(normal: Vec3, plane_d: f32, x: f32, z: f32) -> f32 {
    -(normal.x * x + normal.z * z + plane_d) / normal.y
}

#[inline]
fn edge_function(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
