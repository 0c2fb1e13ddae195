//! Error types for configuration, tracing, display and frame output.

use std::path::PathBuf;

use lumen_core::{NodeId, SceneError, SpectrumError};
use lumen_math::Vec3;
use thiserror::Error;

/// Invalid camera or display settings. Raised before any tracing starts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("pixel dimensions must both be positive, got {width}x{height}")]
    InvalidPixels { width: u32, height: u32 },

    #[error("field of view must be between 0 and 180 degrees (exclusive), got {0}")]
    InvalidFieldOfView(f64),

    #[error("at least one spectral sample per channel is required")]
    NoSpectralSamples,

    #[error("at least one wavelength channel is required")]
    NoChannels,

    #[error("{channels} channels of {samples} spectral samples is too many")]
    TooManySamples { channels: usize, samples: usize },

    #[error("invalid wavelength range: {min} nm to {max} nm")]
    InvalidWavelengthRange { min: f64, max: f64 },

    #[error("display refresh interval must be a positive number of seconds, got {0}")]
    InvalidDisplayInterval(f64),

    #[error("camera is not attached to a scene graph")]
    Detached,

    #[error("camera parent {0} is not part of the scene being rendered")]
    UnknownParent(NodeId),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),
}

/// Failure reported by a tracer. Aborts the render that triggered it.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("ray direction {0} is not a finite, non-zero vector")]
    InvalidDirection(Vec3),

    #[error("expected {expected} spectral samples, got {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("{0}")]
    Failed(String),
}

/// The display frame could not be written to an image file.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("failed to write {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// A display surface failed to present the frame.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("display surface unavailable: {0}")]
    Unavailable(String),
}

/// Everything `PinholeCamera::render` can fail with.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("tracing failed: {0}")]
    Tracing(#[from] TracingError),

    #[error("display refresh failed: {0}")]
    Display(#[from] DisplayError),
}
