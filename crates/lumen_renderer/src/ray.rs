//! Wavelength-resolved rays and the tracer contract the camera drives.

use lumen_core::{SceneGraph, Spectrum, SpectrumError};
use lumen_math::{Ray, Vec3};

use crate::error::TracingError;
use crate::partition::WavelengthChannel;

/// Radiance samples returned by a trace, one per spectral bin.
pub type SpectralSamples = Vec<f64>;

/// A ray carrying the wavelength band it samples.
///
/// The camera builds one per channel and re-aims it for every pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralRay {
    pub origin: Vec3,
    pub direction: Vec3,
    pub min_wavelength: f64,
    pub max_wavelength: f64,
    pub num_samples: usize,
    /// Bounce limit; rays spawned at this depth contribute nothing.
    pub max_depth: u32,
}

impl SpectralRay {
    pub fn new(min_wavelength: f64, max_wavelength: f64, num_samples: usize, max_depth: u32) -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::Z,
            min_wavelength,
            max_wavelength,
            num_samples,
            max_depth,
        }
    }

    /// Template ray for a wavelength channel.
    pub fn for_channel(channel: &WavelengthChannel, max_depth: u32) -> Self {
        Self::new(channel.lower, channel.upper, channel.samples, max_depth)
    }

    pub fn aim(&mut self, ray: Ray) {
        self.origin = ray.origin;
        self.direction = ray.direction;
    }

    /// Secondary ray with the same spectral band.
    pub fn spawn(&self, origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            ..self.clone()
        }
    }

    pub fn geometry(&self) -> Ray {
        Ray::new(self.origin, self.direction)
    }

    /// Zeroed spectrum binned like this ray's samples.
    pub fn new_spectrum(&self) -> Result<Spectrum, SpectrumError> {
        Spectrum::new(self.min_wavelength, self.max_wavelength, self.num_samples)
    }

    pub fn zero_samples(&self) -> SpectralSamples {
        vec![0.0; self.num_samples]
    }
}

/// Result of tracing one camera ray.
#[derive(Debug, Clone, PartialEq)]
pub struct Traced {
    pub samples: SpectralSamples,
    /// Primitive ray casts performed, secondaries included.
    pub ray_count: u64,
}

/// Computes spectral radiance along camera rays.
///
/// The scene graph is the one cameras attach to; a camera whose parent node
/// is not in it cannot render against this tracer.
pub trait Tracer {
    fn scene_graph(&self) -> &SceneGraph;

    /// Trace `ray` and return exactly `ray.num_samples` radiance values.
    fn trace(&self, ray: &SpectralRay) -> Result<Traced, TracingError>;
}
