//! Triangle soup geometry with derived per-face attributes.
//!
//! Face normals, areas and unit normals are recomputed eagerly by every
//! method that changes vertex data, so readers never see stale attributes.

use lumen_math::{Aabb, Mat4, Vec3};

/// Faces with an area at or below this are considered empty.
pub const AREA_SIZE_THRESHOLD: f32 = 0.0;

/// A list of independent triangles.
///
/// Winding is counter-clockwise when viewed from the side the normal
/// points to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    name: String,
    triangles: Vec<[Vec3; 3]>,
    /// Unnormalised face normals, `(v1 - v0) x (v2 - v0)`.
    normals: Vec<Vec3>,
    areas: Vec<f32>,
    units: Vec<Vec3>,
    bounds: Aabb,
}

impl Mesh {
    pub fn new(name: impl Into<String>, triangles: Vec<[Vec3; 3]>) -> Self {
        let mut mesh = Self {
            name: name.into(),
            triangles,
            ..Default::default()
        };
        mesh.update_derived();
        mesh
    }

    /// Build from shared positions and a flat triangle index list.
    ///
    /// Triangles that reference missing vertices are skipped.
    pub fn from_indexed(name: impl Into<String>, positions: &[Vec3], indices: &[u32]) -> Self {
        let name = name.into();
        let triangles = indices
            .chunks_exact(3)
            .filter_map(|face| {
                let fetch = |i: u32| positions.get(i as usize).copied();
                match (fetch(face[0]), fetch(face[1]), fetch(face[2])) {
                    (Some(a), Some(b), Some(c)) => Some([a, b, c]),
                    _ => {
                        log::warn!(
                            "Mesh {}: dropping face {:?}, only {} vertices",
                            name,
                            face,
                            positions.len()
                        );
                        None
                    }
                }
            })
            .collect();
        Self::new(name, triangles)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn triangles(&self) -> &[[Vec3; 3]] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn areas(&self) -> &[f32] {
        &self.areas
    }

    /// Unit-length face normals; zero for degenerate faces.
    pub fn units(&self) -> &[Vec3] {
        &self.units
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn total_area(&self) -> f32 {
        self.areas.iter().sum()
    }

    /// Replace every triangle.
    pub fn set_triangles(&mut self, triangles: Vec<[Vec3; 3]>) {
        self.triangles = triangles;
        self.update_derived();
    }

    /// Apply an affine transform to every vertex.
    pub fn transform(&mut self, matrix: &Mat4) {
        for vertex in self.triangles.iter_mut().flatten() {
            *vertex = matrix.transform_point3(*vertex);
        }
        self.update_derived();
    }

    /// Drop faces whose area does not exceed `AREA_SIZE_THRESHOLD`.
    pub fn remove_empty_areas(&mut self) -> usize {
        let before = self.triangles.len();
        let areas = std::mem::take(&mut self.areas);
        let mut keep = areas.iter().map(|a| *a > AREA_SIZE_THRESHOLD);
        self.triangles.retain(|_| keep.next().unwrap_or(false));
        self.update_derived();
        before - self.triangles.len()
    }

    /// Drop faces that repeat an earlier face's vertices in any order.
    pub fn remove_duplicate_polygons(&mut self) -> usize {
        let before = self.triangles.len();
        let mut seen: Vec<[[u32; 3]; 3]> = Vec::with_capacity(before);
        self.triangles.retain(|triangle| {
            let mut key = triangle.map(|v| v.to_array().map(f32::to_bits));
            key.sort_unstable();
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });
        self.update_derived();
        before - self.triangles.len()
    }

    fn update_derived(&mut self) {
        self.normals = self
            .triangles
            .iter()
            .map(|[v0, v1, v2]| (*v1 - *v0).cross(*v2 - *v0))
            .collect();
        self.areas = self.normals.iter().map(|n| 0.5 * n.length()).collect();
        self.units = self.normals.iter().map(|n| n.normalize_or_zero()).collect();

        let vertices: Vec<Vec3> = self.triangles.iter().flatten().copied().collect();
        self.bounds = Aabb::enclosing(&vertices);
    }
}
