//! Checking and recalculating face normals.
//!
//! Many STL writers don't bother to store proper normals: it's common to find
//! zero vectors or values that are only roughly normalized. Instead of
//! rejecting those files, readers replace such normals with one calculated
//! from the triangle's corners.

use cgmath::{prelude::*, Vector3};
use log::trace;

use crate::Vec3;


/// Calculates the normal of the face defined by the three vertices in CCW
/// order, that is `normalize((b - a) × (c - a))`.
///
/// For degenerate triangles (collinear or coinciding corners) the cross
/// product is the zero vector which can't be normalized. In that case, the
/// zero vector is returned. The same happens for corners with infinite or NaN
/// coordinates: the result is always finite.
pub fn calc_normal([a, b, c]: [Vec3; 3]) -> Vec3 {
    let a = Vector3::from(a);
    let b = Vector3::from(b);
    let c = Vector3::from(c);

    // Scaling doesn't change the direction, but keeps the squared components
    // of tiny and huge triangles representable as `f32`.
    let cross = scale_down(b - a).cross(scale_down(c - a));
    if cross == Vector3::new(0.0, 0.0, 0.0) {
        return [0.0; 3];
    }

    let normal = scale_down(cross).normalize();
    if normal.x.is_finite() && normal.y.is_finite() && normal.z.is_finite() {
        normal.into()
    } else {
        [0.0; 3]
    }
}

/// Divides `v` by its largest absolute component, if that is not zero.
fn scale_down(v: Vector3<f32>) -> Vector3<f32> {
    let max = v.x.abs().max(v.y.abs()).max(v.z.abs());
    if max > 0.0 {
        v / max
    } else {
        v
    }
}

/// Returns `true` if `normal` can be kept as it is: it's not the zero vector
/// and its length differs from 1 by at most `tolerance`.
pub fn is_valid_normal(normal: Vec3, tolerance: f32) -> bool {
    if normal == [0.0; 3] {
        return false;
    }

    // Written this way so that a NaN length is invalid, too.
    (Vector3::from(normal).magnitude() - 1.0).abs() <= tolerance
}

/// Returns `normal` if it is valid (see [`is_valid_normal`]) or the
/// recalculated normal of the triangle (see [`calc_normal`]) otherwise.
///
/// A valid normal is returned unchanged, bit for bit.
pub fn rectify_normal(normal: Vec3, vertices: [Vec3; 3], tolerance: f32) -> Vec3 {
    if is_valid_normal(normal, tolerance) {
        normal
    } else {
        let fixed = calc_normal(vertices);
        trace!("replacing invalid facet normal {:?} with {:?}", normal, fixed);
        fixed
    }
}
