//! Lumen Renderer - progressive spectral pinhole rendering
//!
//! A pinhole camera splits its wavelength range into channels and traces
//! every pixel once per channel, accumulating CIE XYZ and keeping an sRGB
//! display frame current while it goes.
//!
//! Any `Tracer` can be rendered; `World` is the built-in one, tracing
//! spheres and triangles placed under scene-graph nodes.

mod bvh;
mod camera;
mod config;
mod display;
mod error;
mod frame;
mod hittable;
mod partition;
mod progress;
mod ray;
mod renderer;
mod shader;
mod sphere;
mod triangle;
mod world;

pub use bvh::BvhNode;
pub use camera::ImagePlane;
pub use config::{
    CameraConfig, DisplaySettings, RenderSettings, DEFAULT_CHANNELS, DEFAULT_DISPLAY_INTERVAL,
    DEFAULT_FOV, DEFAULT_MAX_DEPTH, DEFAULT_MAX_WAVELENGTH, DEFAULT_MIN_WAVELENGTH, DEFAULT_PIXELS,
    DEFAULT_SPECTRAL_SAMPLES, MAX_TOTAL_SAMPLES,
};
pub use display::{DisplaySurface, LogDisplay, PreviewImage};
pub use error::{ConfigurationError, DisplayError, FrameError, RenderError, TracingError};
pub use frame::{Frame, FrameStore};
pub use hittable::{HitRecord, Hittable, Surface};
pub use partition::{partition, WavelengthChannel};
pub use progress::{Position, ProgressReporter, Throttle, STATS_PERIOD};
pub use ray::{SpectralRay, SpectralSamples, Traced, Tracer};
pub use renderer::{PinholeCamera, RenderSummary};
pub use shader::{DebugLight, Emitter, HitContext, Mirror, SurfaceShader, SURFACE_EPSILON};
pub use sphere::Sphere;
pub use triangle::Triangle;
pub use world::{PathState, World, WorldBuilder};
