//! Surface shaders: what a ray sees when it lands on a primitive.
//!
//! Each shader is an independent implementation of `SurfaceShader`;
//! primitives hold them as trait objects.

use std::sync::Arc;

use lumen_core::{d65_white, SpectralFunction};
use lumen_math::{Mat4, Mat4Ext, Vec3};

use crate::error::TracingError;
use crate::ray::{SpectralRay, SpectralSamples};
use crate::world::PathState;

/// Offset applied to secondary ray origins to escape the surface.
pub const SURFACE_EPSILON: f32 = 1e-4;

/// Everything a shader may look at for one hit.
pub struct HitContext<'a> {
    /// The ray that produced the hit.
    pub ray: &'a SpectralRay,
    /// Bounce depth of `ray`; primary rays are depth 0.
    pub depth: u32,
    pub point: Vec3,
    /// Unit outward normal in world space.
    pub normal: Vec3,
    pub exiting: bool,
    /// World to the primitive's local space.
    pub to_local: &'a Mat4,
}

impl HitContext<'_> {
    /// Normal on the side the ray arrived from.
    pub fn facing_normal(&self) -> Vec3 {
        if self.exiting {
            -self.normal
        } else {
            self.normal
        }
    }
}

/// Computes outgoing spectral radiance at a hit point.
///
/// Shaders that need more light paths trace them through `paths`, which
/// enforces the depth limit and counts every ray cast.
pub trait SurfaceShader: Send + Sync {
    fn evaluate(&self, hit: &HitContext<'_>, paths: &mut PathState<'_>) -> Result<SpectralSamples, TracingError>;
}

/// Lambertian surface lit by a distant light. Meant for debugging scenes.
pub struct DebugLight {
    /// Direction the light travels, world space, unit length.
    light_direction: Vec3,
    intensity: f64,
    spectrum: Arc<dyn SpectralFunction>,
}

impl DebugLight {
    /// Light from `light_direction` with a D65 white spectrum.
    ///
    /// Negative intensities are treated as zero.
    pub fn new(light_direction: Vec3, intensity: f64) -> Self {
        Self {
            light_direction: light_direction.normalize_or_zero(),
            intensity: intensity.max(0.0),
            spectrum: Arc::new(d65_white()),
        }
    }

    pub fn with_spectrum(mut self, spectrum: Arc<dyn SpectralFunction>) -> Self {
        self.spectrum = spectrum;
        self
    }
}

impl SurfaceShader for DebugLight {
    fn evaluate(&self, hit: &HitContext<'_>, _paths: &mut PathState<'_>) -> Result<SpectralSamples, TracingError> {
        if self.intensity == 0.0 {
            return Ok(hit.ray.zero_samples());
        }

        // Shade in the primitive's own space.
        let light = hit.to_local.transform_vector3(self.light_direction).normalize_or_zero();
        let normal = hit.to_local.transform_normal3(hit.normal);
        let diffuse = self.intensity * f64::from((-light.dot(normal)).max(0.0));

        let ray = hit.ray;
        Ok(self
            .spectrum
            .sample_multiple(ray.min_wavelength, ray.max_wavelength, ray.num_samples)
            .into_iter()
            .map(|s| s * diffuse)
            .collect())
    }
}

/// Surface that emits a fixed spectrum from both faces and reflects nothing.
pub struct Emitter {
    spectrum: Arc<dyn SpectralFunction>,
    scale: f64,
}

impl Emitter {
    pub fn new(spectrum: Arc<dyn SpectralFunction>, scale: f64) -> Self {
        Self { spectrum, scale }
    }
}

impl SurfaceShader for Emitter {
    fn evaluate(&self, hit: &HitContext<'_>, _paths: &mut PathState<'_>) -> Result<SpectralSamples, TracingError> {
        let ray = hit.ray;
        Ok(self
            .spectrum
            .sample_multiple(ray.min_wavelength, ray.max_wavelength, ray.num_samples)
            .into_iter()
            .map(|s| s * self.scale)
            .collect())
    }
}

/// Perfect specular reflector with a wavelength-dependent reflectance.
pub struct Mirror {
    reflectance: Arc<dyn SpectralFunction>,
}

impl Mirror {
    pub fn new(reflectance: Arc<dyn SpectralFunction>) -> Self {
        Self { reflectance }
    }
}

impl SurfaceShader for Mirror {
    fn evaluate(&self, hit: &HitContext<'_>, paths: &mut PathState<'_>) -> Result<SpectralSamples, TracingError> {
        let normal = hit.facing_normal();
        let incoming = hit.ray.direction.normalize_or_zero();
        let reflected = incoming - 2.0 * incoming.dot(normal) * normal;
        let origin = hit.point + normal * SURFACE_EPSILON;

        let bounce = hit.ray.spawn(origin, reflected);
        let incoming_light = paths.trace(&bounce, hit.depth + 1)?;

        let ray = hit.ray;
        let reflectance = self
            .reflectance
            .sample_multiple(ray.min_wavelength, ray.max_wavelength, ray.num_samples);
        Ok(incoming_light
            .iter()
            .zip(reflectance)
            .map(|(light, r)| light * r)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldBuilder;
    use lumen_core::ConstantSF;

    fn context<'a>(ray: &'a SpectralRay, normal: Vec3, to_local: &'a Mat4) -> HitContext<'a> {
        HitContext {
            ray,
            depth: 0,
            point: Vec3::ZERO,
            normal,
            exiting: false,
            to_local,
        }
    }

    #[test]
    fn test_debug_light_cosine_falloff() {
        let world = WorldBuilder::new().build();
        let mut paths = PathState::new(&world);
        let ray = SpectralRay::new(400.0, 700.0, 3, 5);
        let identity = Mat4::IDENTITY;
        let light = DebugLight::new(Vec3::new(0.0, -1.0, 0.0), 2.0)
            .with_spectrum(Arc::new(ConstantSF(1.0)));

        let facing = light.evaluate(&context(&ray, Vec3::Y, &identity), &mut paths).unwrap();
        assert_eq!(facing, vec![2.0; 3]);

        let tilted_normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let tilted = light.evaluate(&context(&ray, tilted_normal, &identity), &mut paths).unwrap();
        assert!((tilted[0] - 2.0 * std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-5);

        let away = light.evaluate(&context(&ray, -Vec3::Y, &identity), &mut paths).unwrap();
        assert_eq!(away, vec![0.0; 3]);
        assert_eq!(paths.ray_count(), 0);
    }

    #[test]
    fn test_debug_light_uses_local_space() {
        let world = WorldBuilder::new().build();
        let mut paths = PathState::new(&world);
        let ray = SpectralRay::new(400.0, 700.0, 2, 5);
        // A rigid rotation must not change the shading.
        let to_local = Mat4::from_rotation_x(0.7);
        let light = DebugLight::new(Vec3::new(0.0, -1.0, 0.0), 1.0)
            .with_spectrum(Arc::new(ConstantSF(1.0)));

        let samples = light.evaluate(&context(&ray, Vec3::Y, &to_local), &mut paths).unwrap();
        assert!((samples[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_negative_intensity_is_dark() {
        let world = WorldBuilder::new().build();
        let mut paths = PathState::new(&world);
        let ray = SpectralRay::new(400.0, 700.0, 4, 5);
        let identity = Mat4::IDENTITY;
        let light = DebugLight::new(-Vec3::Y, -3.0);

        let samples = light.evaluate(&context(&ray, Vec3::Y, &identity), &mut paths).unwrap();
        assert_eq!(samples, vec![0.0; 4]);
    }

    #[test]
    fn test_emitter_scales_spectrum() {
        let world = WorldBuilder::new().build();
        let mut paths = PathState::new(&world);
        let ray = SpectralRay::new(400.0, 700.0, 2, 5);
        let identity = Mat4::IDENTITY;
        let emitter = Emitter::new(Arc::new(ConstantSF(0.25)), 4.0);

        let samples = emitter.evaluate(&context(&ray, Vec3::Z, &identity), &mut paths).unwrap();
        assert_eq!(samples, vec![1.0, 1.0]);
    }

    #[test]
    fn test_mirror_into_empty_world_is_black_but_counted() {
        let world = WorldBuilder::new().build();
        let mut paths = PathState::new(&world);
        let ray = SpectralRay::new(400.0, 700.0, 2, 5);
        let identity = Mat4::IDENTITY;
        let mirror = Mirror::new(Arc::new(ConstantSF(0.9)));

        let samples = mirror.evaluate(&context(&ray, -Vec3::Z, &identity), &mut paths).unwrap();
        assert_eq!(samples, vec![0.0, 0.0]);
        assert_eq!(paths.ray_count(), 1);
    }
}
