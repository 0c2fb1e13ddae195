//! The demo scene rendered by the `lumen` binary.

use std::sync::Arc;

use anyhow::Result;
use lumen_core::{d65_white, ConstantSF, InterpolatedSF, Mesh, NodeId, Transform};
use lumen_math::{Quat, Vec3};
use lumen_renderer::{DebugLight, Emitter, Mirror, World, WorldBuilder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const GRID_SIZE: i32 = 5;
const GRID_SPACING: f32 = 1.2;

/// Built world plus the node the camera should hang from.
pub struct DemoScene {
    pub world: World,
    pub camera_node: NodeId,
}

/// A grid of lit spheres with a mirror ball, a tetrahedron and a lamp.
pub fn build(seed: u64) -> Result<DemoScene> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = WorldBuilder::new().with_background(Arc::new(d65_white().scaled(0.02)));
    let root = builder.root();

    let camera_node = builder.add_node(
        root,
        &Transform::looking_at(Vec3::new(0.0, 3.5, -9.0), Vec3::new(0.0, 0.5, 0.0), Vec3::Y),
        "camera",
    )?;

    // Sphere grid lit from above and to the left.
    let key_light = Arc::new(DebugLight::new(Vec3::new(1.0, -2.0, 1.0), 1.0));
    let grid = builder.add_node(root, &Transform::default(), "grid")?;
    let offset = (GRID_SIZE - 1) as f32 * GRID_SPACING * 0.5;
    for row in 0..GRID_SIZE {
        for column in 0..GRID_SIZE {
            let jitter = Vec3::new(rng.gen_range(-0.2..0.2), 0.0, rng.gen_range(-0.2..0.2));
            let radius = rng.gen_range(0.25..0.45);
            let center = Vec3::new(
                column as f32 * GRID_SPACING - offset,
                radius,
                row as f32 * GRID_SPACING - offset,
            ) + jitter;
            builder.add_sphere(grid, center, radius, key_light.clone())?;
        }
    }

    // Large floor sphere.
    builder.add_sphere(root, Vec3::new(0.0, -1000.0, 0.0), 1000.0, key_light.clone())?;

    // Mirror ball that is slightly more reflective towards red.
    let reflectance = InterpolatedSF::new(vec![375.0, 740.0], vec![0.6, 0.9])?;
    let mirror = builder.add_node(root, &Transform::from_translation(Vec3::new(-1.8, 1.6, 3.2)), "mirror")?;
    builder.add_sphere(mirror, Vec3::ZERO, 1.2, Arc::new(Mirror::new(Arc::new(reflectance))))?;

    // Tetrahedron, spun about Y; the duplicated face is cleaned away.
    let mut tetra = Mesh::from_indexed(
        "tetrahedron",
        &[
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(-0.8, 0.0, -0.5),
            Vec3::new(0.8, 0.0, -0.5),
            Vec3::new(0.0, 0.0, 0.9),
        ],
        &[0, 2, 1, 0, 3, 2, 0, 1, 3, 1, 2, 3, 1, 2, 3],
    );
    let duplicates = tetra.remove_duplicate_polygons();
    let empty = tetra.remove_empty_areas();
    log::debug!("Tetrahedron: removed {} duplicate and {} empty faces", duplicates, empty);

    let spin = Transform {
        translation: Vec3::new(2.2, 0.0, 2.6),
        rotation: Quat::from_rotation_y(0.6),
        scale: Vec3::splat(1.3),
    };
    let tetra_node = builder.add_node(root, &spin, "tetrahedron")?;
    let tetra_light = DebugLight::new(Vec3::new(-1.0, -1.0, 0.5), 0.8)
        .with_spectrum(Arc::new(InterpolatedSF::new(vec![375.0, 550.0, 740.0], vec![0.2, 0.6, 1.4])?));
    builder.add_mesh(tetra_node, &tetra, Arc::new(tetra_light))?;

    // Small lamp, bright enough to clip.
    let lamp = Emitter::new(Arc::new(ConstantSF(1.0)), 0.015);
    builder.add_sphere(root, Vec3::new(1.5, 2.8, -0.5), 0.3, Arc::new(lamp))?;

    Ok(DemoScene {
        world: builder.build(),
        camera_node,
    })
}
