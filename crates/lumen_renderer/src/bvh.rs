//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree built by median split on the longest centroid axis.

use lumen_math::{Aabb, Interval, Ray};

use crate::hittable::{HitRecord, Hittable};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

pub type Primitive = Box<dyn Hittable>;

/// BVH node - either a branch with two children or a leaf with primitives.
///
/// An enum keeps traversal free of dynamic dispatch until a leaf is reached.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with at most `LEAF_MAX_SIZE` primitives.
    Leaf {
        objects: Vec<Primitive>,
        bbox: Aabb,
    },
    /// Nothing to hit.
    Empty,
}

impl BvhNode {
    /// Create a BVH from a list of primitives.
    pub fn new(objects: Vec<Primitive>) -> Self {
        if objects.is_empty() {
            return BvhNode::Empty;
        }
        Self::build(objects)
    }

    /// Recursive construction: sort by centroid along the axis where the
    /// centroids spread furthest, split at the median, recurse.
    fn build(mut objects: Vec<Primitive>) -> Self {
        let n = objects.len();

        // Compute bounding box of all objects
        let bounds = objects
            .iter()
            .fold(Aabb::EMPTY, |acc, o| Aabb::surrounding(&acc, &o.bounding_box()));

        // Create leaf for small sets
        if n <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                objects,
                bbox: bounds,
            };
        }

        // Choose split axis based on centroid spread
        let centroid_bounds = objects.iter().fold(Aabb::EMPTY, |acc, obj| {
            let c = obj.bounding_box().centroid();
            Aabb::surrounding(&acc, &Aabb::from_points(c, c))
        });
        let axis = centroid_bounds.longest_axis();

        // Sort objects by centroid on chosen axis
        objects.sort_unstable_by(|a, b| {
            let a_val = a.bounding_box().centroid()[axis];
            let b_val = b.bounding_box().centroid()[axis];
            a_val.total_cmp(&b_val)
        });

        // Split at midpoint
        let right_objects = objects.split_off(n / 2);
        let left = Self::build(objects);
        let right = Self::build(right_objects);

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox: bounds,
        }
    }

    /// Number of primitives stored below this node.
    pub fn len(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { objects, .. } => objects.len(),
            BvhNode::Branch { left, right, .. } => left.len() + right.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { objects, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                // Shrink the search range as closer hits are found.
                let mut closest = None;
                let mut max = ray_t.max;
                for obj in objects {
                    if let Some(rec) = obj.hit(ray, Interval::new(ray_t.min, max)) {
                        max = rec.t;
                        closest = Some(rec);
                    }
                }
                closest
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t);

                // Only check right up to closest hit
                let right_max = hit_left.map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(ray, Interval::new(ray_t.min, right_max));

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::Surface;
    use crate::shader::Emitter;
    use crate::sphere::Sphere;
    use lumen_core::ConstantSF;
    use lumen_math::{Mat4, Vec3};
    use std::sync::Arc;

    fn surface() -> Arc<Surface> {
        Arc::new(Surface::new(
            Arc::new(Emitter::new(Arc::new(ConstantSF(1.0)), 1.0)),
            Mat4::IDENTITY,
        ))
    }

    fn sphere_row(count: usize) -> Vec<Primitive> {
        let surface = surface();
        (0..count)
            .map(|i| {
                let center = Vec3::new(i as f32 * 3.0, 0.0, 10.0);
                Box::new(Sphere::new(center, 1.0, surface.clone())) as Primitive
            })
            .collect()
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = BvhNode::new(vec![]);
        assert!(matches!(bvh, BvhNode::Empty));
        assert!(bvh.hit(&Ray::new(Vec3::ZERO, Vec3::Z), Interval::UNIVERSE).is_none());
    }

    #[test]
    fn test_bvh_single_sphere() {
        let bvh = BvhNode::new(sphere_row(1));
        assert!(matches!(bvh, BvhNode::Leaf { .. }));

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(bvh.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_some());
    }

    #[test]
    fn test_bvh_many_spheres() {
        let bvh = BvhNode::new(sphere_row(20));
        assert!(matches!(bvh, BvhNode::Branch { .. }));
        assert_eq!(bvh.len(), 20);

        // Each sphere is reachable from straight in front of it.
        for i in 0..20 {
            let ray = Ray::new(Vec3::new(i as f32 * 3.0, 0.0, 0.0), Vec3::Z);
            let hit = bvh.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
            assert!((hit.t - 9.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_bvh_returns_closest() {
        let surface = surface();
        let objects: Vec<Primitive> = (0..8)
            .map(|i| {
                let center = Vec3::new(0.0, 0.0, 5.0 + i as f32 * 3.0);
                Box::new(Sphere::new(center, 1.0, surface.clone())) as Primitive
            })
            .collect();
        let bvh = BvhNode::new(objects);

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let hit = bvh.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-4);
    }
}
