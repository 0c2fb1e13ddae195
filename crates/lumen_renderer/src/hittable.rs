//! Ray-primitive intersection.

use std::sync::Arc;

use lumen_math::{Aabb, Interval, Mat4, Ray, Vec3};

use crate::shader::SurfaceShader;

/// Shading data shared by every primitive placed from one scene node.
pub struct Surface {
    pub shader: Arc<dyn SurfaceShader>,
    /// World to the owning node's local space.
    pub to_local: Mat4,
}

impl Surface {
    pub fn new(shader: Arc<dyn SurfaceShader>, to_local: Mat4) -> Self {
        Self { shader, to_local }
    }
}

/// Closest intersection found along a ray.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Ray parameter of the hit.
    pub t: f32,
    pub point: Vec3,
    /// Unit outward geometric normal.
    pub normal: Vec3,
    /// The ray struck the back of the surface.
    pub exiting: bool,
    pub surface: &'a Surface,
}

impl<'a> HitRecord<'a> {
    /// Build a record, working out which face the ray hit.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, surface: &'a Surface) -> Self {
        Self {
            t,
            point: ray.at(t),
            normal: outward_normal,
            exiting: ray.direction.dot(outward_normal) > 0.0,
            surface,
        }
    }

    /// Normal on the side the ray arrived from.
    pub fn facing_normal(&self) -> Vec3 {
        if self.exiting {
            -self.normal
        } else {
            self.normal
        }
    }
}

/// Objects that rays can hit.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` strictly inside `ray_t`, if any.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>>;

    fn bounding_box(&self) -> Aabb;
}
