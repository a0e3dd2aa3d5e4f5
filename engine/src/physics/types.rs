//! Physics math types and scalar helpers
//!
//! Vector types are re-exported from glam. The helpers here are the small
//! numeric building blocks the integrators share: negative-safe modulo,
//! bounded-step convergence and a normalize that never yields NaN.

pub use glam::{Vec2, Vec3};

/// Squared length below which a vector is treated as zero.
pub const NORMALIZE_EPSILON: f32 = 1e-12;

/// Modulo that never returns a negative remainder.
///
/// `neg_mod(m, n)` lies in `[0, n)` for any finite `m` and positive `n`.
#[inline]
pub fn neg_mod(m: f32, n: f32) -> f32 {
    let r = m % n;
    let r = if r < 0.0 { r + n } else { r };
    // r + n can round up to exactly n for tiny negative r
    if r >= n { 0.0 } else { r }
}

/// Integer variant of [`neg_mod`], used for toroidal grid lookups.
#[inline]
pub fn neg_mod_i32(m: i32, n: i32) -> i32 {
    m.rem_euclid(n)
}

/// Bounded-step convergence: moves `current` toward `target` by at most `step`.
///
/// Never overshoots. A non-positive step leaves `current` unchanged.
#[inline]
pub fn approach(current: f32, target: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return current;
    }
    if current < target {
        (current + step).min(target)
    } else if current > target {
        (current - step).max(target)
    } else {
        current
    }
}

/// Component-wise [`approach`].
#[inline]
pub fn approach_vec3(current: Vec3, target: Vec3, step: f32) -> Vec3 {
    Vec3::new(
        approach(current.x, target.x, step),
        approach(current.y, target.y, step),
        approach(current.z, target.z, step),
    )
}

/// Normalize `v`, falling back to world up for zero-length or non-finite input.
#[inline]
pub fn normalize_or_up(v: Vec3) -> Vec3 {
    normalize_or(v, Vec3::Y)
}

/// Normalize `v`, returning `fallback` when `v` cannot be normalized.
#[inline]
pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    let len_sq = v.length_squared();
    if !len_sq.is_finite() || len_sq <= NORMALIZE_EPSILON {
        fallback
    } else {
        v / len_sq.sqrt()
    }
}

/// Horizontal (XZ) part of a vector.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
