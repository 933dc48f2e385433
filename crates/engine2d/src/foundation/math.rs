//! Math utilities and types
//!
//! Provides the 2D math types used by the scene graph. Transforms are stored
//! as 3x3 homogeneous matrices; draw submissions widen them to 4x4.

pub use nalgebra::{Matrix3, Matrix4, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// 3x3 matrix type (2D homogeneous transform)
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type (draw submission)
pub type Mat4 = Matrix4<f32>;

/// Convert degrees to radians
#[inline]
#[must_use]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees.to_radians()
}

/// Convert radians to degrees
#[inline]
#[must_use]
pub fn rad_to_deg(radians: f32) -> f32 {
    radians.to_degrees()
}

/// Homogeneous translation matrix
#[inline]
#[must_use]
pub fn translation(offset: Vec2) -> Mat3 {
    Mat3::new_translation(&offset)
}

/// Homogeneous counter-clockwise rotation matrix, angle in degrees
#[inline]
#[must_use]
pub fn rotation_degrees(degrees: f32) -> Mat3 {
    Mat3::new_rotation(deg_to_rad(degrees))
}

/// Homogeneous non-uniform scaling matrix
#[inline]
#[must_use]
pub fn scaling(scale: Vec2) -> Mat3 {
    Mat3::new_nonuniform_scaling(&scale)
}

/// Inverse of [`scaling`], or `None` when either axis is zero.
///
/// A zero axis has no inverse; callers skip the step instead of letting
/// infinities turn into NaN further down the chain.
#[must_use]
pub fn inverse_scaling(scale: Vec2) -> Option<Mat3> {
    if scale.x == 0.0 || scale.y == 0.0 {
        return None;
    }
    Some(Mat3::new_nonuniform_scaling(&Vec2::new(1.0 / scale.x, 1.0 / scale.y)))
}

/// Apply a homogeneous transform to a point
#[inline]
#[must_use]
pub fn transform_point(matrix: &Mat3, point: Vec2) -> Vec2 {
    matrix.transform_point(&Point2::from(point)).coords
}

/// Apply a homogeneous transform to a direction (translation ignored)
#[inline]
#[must_use]
pub fn transform_vector(matrix: &Mat3, vector: Vec2) -> Vec2 {
    matrix.transform_vector(&vector)
}

/// Embed a 2D affine transform into a 4x4 matrix acting on the XY plane
#[must_use]
#[rustfmt::skip]
pub fn to_mat4(m: &Mat3) -> Mat4 {
    Mat4::new(
        m[(0, 0)], m[(0, 1)], 0.0, m[(0, 2)],
        m[(1, 0)], m[(1, 1)], 0.0, m[(1, 2)],
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Angle in degrees of a direction, measured counter-clockwise from +X
#[must_use]
pub fn direction_angle_degrees(direction: Vec2) -> f32 {
    rad_to_deg(direction.y.atan2(direction.x))
}
