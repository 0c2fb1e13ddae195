//! The progressive spectral render loop.
//!
//! A `PinholeCamera` renders one wavelength channel over the whole image at
//! a time, so the picture builds up in coloured passes. Each pass adds its
//! CIE XYZ contribution to the tristimulus frame and the display frame is
//! kept current pixel by pixel.

use std::path::Path;
use std::time::{Duration, Instant};

use lumen_core::{resample_ciexyz, spectrum_to_ciexyz, NodeId, Spectrum, Transform};
use lumen_math::Mat4;

use crate::camera::ImagePlane;
use crate::config::{CameraConfig, DisplaySettings};
use crate::display::DisplaySurface;
use crate::error::{ConfigurationError, FrameError, RenderError, TracingError};
use crate::frame::FrameStore;
use crate::partition::partition;
use crate::progress::{Position, ProgressReporter};
use crate::ray::{SpectralRay, Tracer};

/// What a finished render did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSummary {
    pub elapsed: Duration,
    /// Primitive ray casts reported by the tracer.
    pub rays: u64,
    /// Pixels traced, summed over channels.
    pub work_units: u64,
}

/// A pinhole camera attached to a scene node.
pub struct PinholeCamera {
    config: CameraConfig,
    display: DisplaySettings,
    parent: Option<NodeId>,
    /// Camera placement relative to `parent`.
    local: Mat4,
    frame: FrameStore,
}

impl PinholeCamera {
    pub fn new(config: CameraConfig) -> Self {
        let (width, height) = config.pixels();
        Self {
            config,
            display: DisplaySettings::default(),
            parent: None,
            local: Mat4::IDENTITY,
            frame: FrameStore::new(width, height),
        }
    }

    pub fn with_display(mut self, display: DisplaySettings) -> Self {
        self.display = display;
        self
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Edits go through the validating setters on `CameraConfig`.
    pub fn config_mut(&mut self) -> &mut CameraConfig {
        &mut self.config
    }

    pub fn display_settings(&self) -> &DisplaySettings {
        &self.display
    }

    pub fn set_display_settings(&mut self, display: DisplaySettings) {
        self.display = display;
    }

    /// Place the camera under `parent`. The camera looks down its local +Z.
    pub fn attach(&mut self, parent: NodeId, transform: &Transform) {
        self.parent = Some(parent);
        self.local = transform.to_matrix();
    }

    pub fn detach(&mut self) {
        self.parent = None;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Frames from the most recent render.
    pub fn frame(&self) -> &FrameStore {
        &self.frame
    }

    /// Write the display frame to `path`.
    pub fn save(&self, path: &Path) -> Result<(), FrameError> {
        self.frame.save(path)
    }

    /// Camera to world for the scene `tracer` traces.
    fn to_world<T: Tracer + ?Sized>(&self, tracer: &T) -> Result<Mat4, ConfigurationError> {
        let parent = self.parent.ok_or(ConfigurationError::Detached)?;
        let graph = tracer.scene_graph();
        if !graph.contains(parent) {
            return Err(ConfigurationError::UnknownParent(parent));
        }
        Ok(graph.to_root(parent)? * self.local)
    }

    /// Render the scene seen through `tracer`.
    ///
    /// Configuration is checked before the tracer is called. Both frames are
    /// cleared first; after an error they keep whatever was accumulated.
    pub fn render<T: Tracer + ?Sized>(
        &mut self,
        tracer: &T,
        surface: &mut dyn DisplaySurface,
    ) -> Result<RenderSummary, RenderError> {
        self.config.validate()?;
        let to_world = self.to_world(tracer)?;

        let (width, height) = self.config.pixels();
        let (min_wavelength, max_wavelength) = self.config.wavelength_range();
        let samples = self.config.spectral_samples();
        let channels = partition(min_wavelength, max_wavelength, self.config.channels(), samples)?;
        let table = resample_ciexyz(min_wavelength, max_wavelength, self.config.total_samples())
            .map_err(ConfigurationError::from)?;
        let mut spectrum = Spectrum::new(min_wavelength, max_wavelength, self.config.total_samples())
            .map_err(ConfigurationError::from)?;
        let plane = ImagePlane::new(width, height, self.config.fov());

        self.frame.reset(width, height);

        let start = Instant::now();
        let display_interval = self.display.enabled.then(|| self.display.interval());
        let mut progress = ProgressReporter::new(channels.len(), width, height, display_interval, start);

        log::info!(
            "Rendering {}x{}, {} channel(s) of {} samples over {}-{} nm",
            width,
            height,
            channels.len(),
            samples,
            min_wavelength,
            max_wavelength
        );

        if self.display.enabled {
            self.refresh(surface)?;
        }

        for channel in &channels {
            let mut ray = SpectralRay::for_channel(channel, self.config.max_depth());
            let range = channel.sample_range();
            let cmf = table.slice(range.clone());

            for y in 0..height {
                for x in 0..width {
                    ray.aim(plane.world_ray(x, y, &to_world));
                    let traced = tracer.trace(&ray)?;
                    if traced.samples.len() != channel.samples {
                        return Err(TracingError::SampleCountMismatch {
                            expected: channel.samples,
                            actual: traced.samples.len(),
                        }
                        .into());
                    }

                    spectrum.clear();
                    let slice = &mut spectrum.samples_mut()[range.clone()];
                    slice.copy_from_slice(&traced.samples);
                    let xyz = spectrum_to_ciexyz(slice, cmf, table.delta());
                    self.frame.accumulate(x, y, xyz);

                    progress.record_rays(traced.ray_count);
                    let now = Instant::now();
                    let at = Position {
                        channel: channel.index,
                        row: y,
                        column: x,
                    };
                    if let Some(line) = progress.poll_stats(at, now) {
                        log::info!("{}", line);
                    }
                    if progress.display_due(now) {
                        self.refresh(surface)?;
                    }
                }
            }
        }

        let elapsed = start.elapsed();
        log::info!("Render complete - time elapsed {:.3}s", elapsed.as_secs_f64());

        if self.display.enabled {
            self.refresh(surface)?;
        }

        Ok(RenderSummary {
            elapsed,
            rays: progress.total_rays(),
            work_units: progress.work_units(),
        })
    }

    fn refresh(&self, surface: &mut dyn DisplaySurface) -> Result<(), RenderError> {
        log::debug!("Refreshing display");
        surface.refresh(self.frame.display())?;
        Ok(())
    }
}
