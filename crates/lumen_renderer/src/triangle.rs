//! Triangle primitive.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use lumen_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable, Surface};

/// A world-space triangle. The normal follows counter-clockwise winding.
pub struct Triangle {
    v0: Vec3,
    /// `v1 - v0`, precomputed for the intersection test.
    edge1: Vec3,
    /// `v2 - v0`.
    edge2: Vec3,
    /// Unit geometric normal, `edge1 x edge2`.
    normal: Vec3,
    surface: Arc<Surface>,
    bbox: Aabb,
}

impl Triangle {
    /// Returns `None` for zero-area triangles, which can never be hit.
    pub fn new(vertices: [Vec3; 3], surface: Arc<Surface>) -> Option<Self> {
        let [v0, v1, v2] = vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let normal = edge1.cross(edge2).try_normalize()?;

        Some(Self {
            v0,
            edge1,
            edge2,
            normal,
            surface,
            bbox: Aabb::enclosing(&vertices),
        })
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Hittable for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let h = ray.direction.cross(self.edge2);
        let a = self.edge1.dot(h);

        // Parallel to the plane.
        if a.abs() < 1e-8 {
            return None;
        }

        // First barycentric coordinate
        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        // Second barycentric coordinate
        let q = s.cross(self.edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        // Distance along the ray to the plane hit
        let t = f * self.edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, &self.surface))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
