//! Built-in tracer: primitives placed under scene nodes, traced through a BVH.

use std::sync::Arc;

use lumen_core::{Mesh, NodeId, SceneError, SceneGraph, SpectralFunction, Transform};
use lumen_math::{Interval, Mat4Ext, Vec3};

use crate::bvh::{BvhNode, Primitive};
use crate::error::TracingError;
use crate::hittable::{Hittable, Surface};
use crate::ray::{SpectralRay, SpectralSamples, Traced, Tracer};
use crate::shader::{HitContext, SurfaceShader, SURFACE_EPSILON};
use crate::sphere::Sphere;
use crate::triangle::Triangle;

/// Collects scene nodes and primitives, then freezes them into a `World`.
pub struct WorldBuilder {
    graph: SceneGraph,
    objects: Vec<Primitive>,
    background: Option<Arc<dyn SpectralFunction>>,
}

impl Default for WorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self {
            graph: SceneGraph::new(),
            objects: Vec::new(),
            background: None,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn root(&self) -> NodeId {
        self.graph.root()
    }

    pub fn add_node(
        &mut self,
        parent: NodeId,
        transform: &Transform,
        name: impl Into<String>,
    ) -> Result<NodeId, SceneError> {
        self.graph.add_node(parent, transform, name)
    }

    /// Radiance returned by rays that escape the scene. Black by default.
    pub fn with_background(mut self, spectrum: Arc<dyn SpectralFunction>) -> Self {
        self.background = Some(spectrum);
        self
    }

    /// Place a sphere given in `node`'s local space.
    ///
    /// Non-uniform scales are approximated by the largest axis scale.
    pub fn add_sphere(
        &mut self,
        node: NodeId,
        center: Vec3,
        radius: f32,
        shader: Arc<dyn SurfaceShader>,
    ) -> Result<(), SceneError> {
        let to_world = self.graph.to_root(node)?;
        let surface = Arc::new(Surface::new(shader, self.graph.to_local(node)?));

        let sphere = Sphere::new(
            to_world.transform_point3(center),
            radius * to_world.max_axis_scale(),
            surface,
        );
        self.objects.push(Box::new(sphere));
        Ok(())
    }

    /// Place every triangle of `mesh` under `node`. Returns how many were
    /// added; degenerate faces are skipped.
    pub fn add_mesh(
        &mut self,
        node: NodeId,
        mesh: &Mesh,
        shader: Arc<dyn SurfaceShader>,
    ) -> Result<usize, SceneError> {
        let to_world = self.graph.to_root(node)?;
        let surface = Arc::new(Surface::new(shader, self.graph.to_local(node)?));

        let mut added = 0;
        for (i, &triangle) in mesh.triangles().iter().enumerate() {
            let vertices = triangle.map(|v| to_world.transform_point3(v));
            match Triangle::new(vertices, surface.clone()) {
                Some(triangle) => {
                    self.objects.push(Box::new(triangle));
                    added += 1;
                }
                None => log::warn!("Mesh '{}': skipping degenerate triangle {}", mesh.name(), i),
            }
        }
        Ok(added)
    }

    pub fn build(self) -> World {
        log::debug!(
            "Building world: {} primitives, {} scene nodes",
            self.objects.len(),
            self.graph.len()
        );
        World {
            graph: self.graph,
            bvh: BvhNode::new(self.objects),
            background: self.background,
        }
    }
}

/// Immutable scene ready for tracing.
pub struct World {
    graph: SceneGraph,
    bvh: BvhNode,
    background: Option<Arc<dyn SpectralFunction>>,
}

impl World {
    pub fn primitive_count(&self) -> usize {
        self.bvh.len()
    }
}

impl Tracer for World {
    fn scene_graph(&self) -> &SceneGraph {
        &self.graph
    }

    fn trace(&self, ray: &SpectralRay) -> Result<Traced, TracingError> {
        let direction = ray.direction;
        if !direction.is_finite() || direction.length_squared() == 0.0 {
            return Err(TracingError::InvalidDirection(direction));
        }

        let mut paths = PathState::new(self);
        let samples = paths.trace(ray, 0)?;
        Ok(Traced {
            samples,
            ray_count: paths.ray_count(),
        })
    }
}

/// Per camera ray bookkeeping shared by every bounce of one light path.
pub struct PathState<'w> {
    world: &'w World,
    ray_count: u64,
}

impl<'w> PathState<'w> {
    pub fn new(world: &'w World) -> Self {
        Self { world, ray_count: 0 }
    }

    /// Rays cast so far along this path.
    pub fn ray_count(&self) -> u64 {
        self.ray_count
    }

    /// Radiance arriving along `ray`, which sits `depth` bounces from the
    /// camera. Rays at or past the depth limit are not cast and carry nothing.
    pub fn trace(&mut self, ray: &SpectralRay, depth: u32) -> Result<SpectralSamples, TracingError> {
        if depth >= ray.max_depth {
            return Ok(ray.zero_samples());
        }
        self.ray_count += 1;

        let world = self.world;
        let geometry = ray.geometry();
        let Some(rec) = world.bvh.hit(&geometry, Interval::new(SURFACE_EPSILON, f32::INFINITY)) else {
            return Ok(match &world.background {
                Some(background) => {
                    background.sample_multiple(ray.min_wavelength, ray.max_wavelength, ray.num_samples)
                }
                None => ray.zero_samples(),
            });
        };

        let context = HitContext {
            ray,
            depth,
            point: rec.point,
            normal: rec.normal,
            exiting: rec.exiting,
            to_local: &rec.surface.to_local,
        };
        let samples = rec.surface.shader.evaluate(&context, self)?;
        if samples.len() != ray.num_samples {
            return Err(TracingError::SampleCountMismatch {
                expected: ray.num_samples,
                actual: samples.len(),
            });
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{DebugLight, Emitter, Mirror};
    use lumen_core::ConstantSF;
    use lumen_math::Quat;

    fn emitter(level: f64) -> Arc<dyn SurfaceShader> {
        Arc::new(Emitter::new(Arc::new(ConstantSF(level)), 1.0))
    }

    fn forward_ray(depth: u32) -> SpectralRay {
        SpectralRay::new(400.0, 700.0, 3, depth)
    }

    #[test]
    fn test_empty_world_is_black() {
        let world = WorldBuilder::new().build();
        let traced = world.trace(&forward_ray(5)).unwrap();

        assert_eq!(traced.samples, vec![0.0; 3]);
        assert_eq!(traced.ray_count, 1);
    }

    #[test]
    fn test_background_on_miss() {
        let world = WorldBuilder::new()
            .with_background(Arc::new(ConstantSF(0.5)))
            .build();
        let traced = world.trace(&forward_ray(5)).unwrap();
        assert_eq!(traced.samples, vec![0.5; 3]);
    }

    #[test]
    fn test_sphere_under_translated_node() {
        let mut builder = WorldBuilder::new();
        let node = builder
            .add_node(builder.root(), &Transform::from_translation(Vec3::new(0.0, 0.0, 10.0)), "ball")
            .unwrap();
        builder.add_sphere(node, Vec3::ZERO, 1.0, emitter(2.0)).unwrap();
        let world = builder.build();

        assert_eq!(world.primitive_count(), 1);
        assert_eq!(world.trace(&forward_ray(5)).unwrap().samples, vec![2.0; 3]);

        let mut aside = forward_ray(5);
        aside.origin = Vec3::new(5.0, 0.0, 0.0);
        assert_eq!(world.trace(&aside).unwrap().samples, vec![0.0; 3]);
    }

    #[test]
    fn test_scaled_node_scales_radius() {
        let mut builder = WorldBuilder::new();
        let transform = Transform {
            translation: Vec3::new(0.0, 0.0, 10.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(3.0),
        };
        let node = builder.add_node(builder.root(), &transform, "big").unwrap();
        builder.add_sphere(node, Vec3::ZERO, 1.0, emitter(1.0)).unwrap();
        let world = builder.build();

        // Radius 3 after scaling, so a ray offset by 2 still hits.
        let mut ray = forward_ray(5);
        ray.origin = Vec3::new(2.0, 0.0, 0.0);
        assert_eq!(world.trace(&ray).unwrap().samples, vec![1.0; 3]);
    }

    #[test]
    fn test_mesh_skips_degenerate_faces() {
        let mesh = Mesh::new(
            "quad",
            vec![
                [Vec3::new(-1.0, -1.0, 4.0), Vec3::new(0.0, 1.0, 4.0), Vec3::new(1.0, -1.0, 4.0)],
                [Vec3::ZERO, Vec3::X, Vec3::X * 2.0],
            ],
        );
        let mut builder = WorldBuilder::new();
        let added = builder.add_mesh(builder.root(), &mesh, emitter(1.0)).unwrap();
        let world = builder.build();

        assert_eq!(added, 1);
        assert_eq!(world.trace(&forward_ray(5)).unwrap().samples, vec![1.0; 3]);
    }

    #[test]
    fn test_unknown_node_rejected() {
        let mut builder = WorldBuilder::new();
        let mut other = SceneGraph::new();
        let stranger = other
            .add_node(other.root(), &Transform::default(), "a")
            .unwrap();

        let result = builder.add_sphere(stranger, Vec3::ZERO, 1.0, emitter(1.0));
        assert!(matches!(result, Err(SceneError::UnknownNode(_))));
    }

    #[test]
    fn test_invalid_direction() {
        let world = WorldBuilder::new().build();
        let mut ray = forward_ray(5);
        ray.direction = Vec3::ZERO;
        assert!(matches!(world.trace(&ray), Err(TracingError::InvalidDirection(_))));

        ray.direction = Vec3::new(f32::NAN, 0.0, 1.0);
        assert!(matches!(world.trace(&ray), Err(TracingError::InvalidDirection(_))));
    }

    #[test]
    fn test_mirrors_respect_depth_limit() {
        // Two facing mirrors bounce forever without the depth limit.
        let mirror: Arc<dyn SurfaceShader> = Arc::new(Mirror::new(Arc::new(ConstantSF(1.0))));
        let mut builder = WorldBuilder::new();
        let root = builder.root();
        builder.add_sphere(root, Vec3::new(0.0, 0.0, 1002.0), 1000.0, mirror.clone()).unwrap();
        builder.add_sphere(root, Vec3::new(0.0, 0.0, -1002.0), 1000.0, mirror).unwrap();
        let world = builder.build();

        let traced = world.trace(&forward_ray(6)).unwrap();
        assert_eq!(traced.samples, vec![0.0; 3]);
        assert_eq!(traced.ray_count, 6);

        let none = world.trace(&forward_ray(0)).unwrap();
        assert_eq!(none.ray_count, 0);
    }

    #[test]
    fn test_mirror_sees_lit_sphere() {
        let mut builder = WorldBuilder::new();
        let root = builder.root();
        builder
            .add_sphere(root, Vec3::new(0.0, 0.0, 5.0), 1.0, Arc::new(Mirror::new(Arc::new(ConstantSF(0.5)))))
            .unwrap();
        // Behind the camera, seen in the mirror.
        let light = DebugLight::new(-Vec3::Z, 1.0).with_spectrum(Arc::new(ConstantSF(1.0)));
        builder
            .add_sphere(root, Vec3::new(0.0, 0.0, -5.0), 1.0, Arc::new(light))
            .unwrap();
        let world = builder.build();

        let traced = world.trace(&forward_ray(5)).unwrap();
        assert_eq!(traced.ray_count, 2);
        for sample in traced.samples {
            assert!((sample - 0.5).abs() < 1e-4);
        }
    }
}
