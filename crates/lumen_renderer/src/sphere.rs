//! Sphere primitive.

use std::sync::Arc;

use lumen_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable, Surface};

/// A world-space sphere.
pub struct Sphere {
    center: Vec3,
    /// Never negative.
    radius: f32,
    surface: Arc<Surface>,
    /// Cached bounds, padded by `Aabb::from_points` for tiny radii.
    bbox: Aabb,
}

impl Sphere {
    /// Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32, surface: Arc<Surface>) -> Self {
        let radius = radius.max(0.0);
        let extent = Vec3::splat(radius);
        Self {
            center,
            radius,
            surface,
            bbox: Aabb::from_points(center - extent, center + extent),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        // Solve |origin + t*dir - center|^2 = r^2 using the half-b form:
        // a*t^2 - 2h*t + c = 0 with h = dir . (center - origin).
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        // Ray misses the sphere entirely
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        // Nearest root inside the accepted range.
        let root = [(h - sqrtd) / a, (h + sqrtd) / a]
            .into_iter()
            .find(|t| ray_t.surrounds(*t))?;

        // Dividing by the radius normalises the normal without a sqrt.
        let outward = (ray.at(root) - self.center) / self.radius;
        Some(HitRecord::new(ray, root, outward, &self.surface))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
