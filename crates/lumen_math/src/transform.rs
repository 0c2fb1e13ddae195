// Helpers on top of glam::Mat4. glam already provides transform_point3 and
// transform_vector3 (no translation); these cover normals and bounds.

use glam::{Mat3, Mat4, Vec3};
use crate::Aabb;

/// Extension trait for affine transforms used when placing geometry.
pub trait Mat4Ext {
    /// Transform a surface normal with the inverse transpose of the linear
    /// part, so normals stay perpendicular under non-uniform scale.
    fn transform_normal3(&self, normal: Vec3) -> Vec3;

    /// Bounds of the eight transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;

    /// Largest stretch the transform applies along any basis axis.
    fn max_axis_scale(&self) -> f32;
}

impl Mat4Ext for Mat4 {
    fn transform_normal3(&self, normal: Vec3) -> Vec3 {
        let linear = Mat3::from_mat4(*self);
        (linear.inverse().transpose() * normal).normalize_or_zero()
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let (lo, hi) = (aabb.min(), aabb.max());
        let corners: Vec<Vec3> = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { lo.x } else { hi.x },
                    if i & 2 == 0 { lo.y } else { hi.y },
                    if i & 4 == 0 { lo.z } else { hi.z },
                )
            })
            .map(|corner| self.transform_point3(corner))
            .collect();
        Aabb::enclosing(&corners)
    }

    fn max_axis_scale(&self) -> f32 {
        [Vec3::X, Vec3::Y, Vec3::Z]
            .into_iter()
            .map(|axis| self.transform_vector3(axis).length())
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_normal_survives_non_uniform_scale() {
        // Plane x + y = 0 squashed along x: the normal must tilt towards x.
        let mat = Mat4::from_scale(Vec3::new(0.5, 1.0, 1.0));
        let normal = mat.transform_normal3(Vec3::new(1.0, 1.0, 0.0).normalize());
        let tangent = mat.transform_vector3(Vec3::new(1.0, -1.0, 0.0));

        assert!(normal.dot(tangent).abs() < 1e-5);
        assert!((normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_transform_aabb_rotation() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0));
        let rotated = Mat4::from_rotation_z(FRAC_PI_2).transform_aabb(&aabb);

        assert!((rotated.x.min + 1.0).abs() < 1e-4);
        assert!((rotated.y.max - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_max_axis_scale() {
        let mat = Mat4::from_scale_rotation_translation(
            Vec3::new(1.0, 3.0, 2.0),
            glam::Quat::from_rotation_x(0.3),
            Vec3::new(5.0, 5.0, 5.0),
        );
        assert!((mat.max_axis_scale() - 3.0).abs() < 1e-5);
    }
}
