//! Camera and display configuration.
//!
//! `CameraConfig` is validated on construction and on every edit; an edit
//! that would make it invalid is rejected and leaves the previous values in
//! place. `RenderSettings` is the flat, deserializable form used by the
//! command line and settings files.

use std::path::PathBuf;
use std::time::Duration;

use lumen_core::spectrum::check_range;
use serde::Deserialize;

use crate::error::ConfigurationError;

pub const DEFAULT_PIXELS: (u32, u32) = (640, 480);
pub const DEFAULT_FOV: f64 = 40.0;
pub const DEFAULT_SPECTRAL_SAMPLES: usize = 20;
pub const DEFAULT_CHANNELS: usize = 1;
pub const DEFAULT_MIN_WAVELENGTH: f64 = 375.0;
pub const DEFAULT_MAX_WAVELENGTH: f64 = 740.0;
pub const DEFAULT_MAX_DEPTH: u32 = 15;
pub const DEFAULT_DISPLAY_INTERVAL: f64 = 10.0;
/// Upper bound on spectral samples summed over all channels.
pub const MAX_TOTAL_SAMPLES: usize = 1 << 20;

/// Pinhole camera parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    width: u32,
    height: u32,
    fov: f64,
    spectral_samples: usize,
    channels: usize,
    min_wavelength: f64,
    max_wavelength: f64,
    max_depth: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_PIXELS.0,
            height: DEFAULT_PIXELS.1,
            fov: DEFAULT_FOV,
            spectral_samples: DEFAULT_SPECTRAL_SAMPLES,
            channels: DEFAULT_CHANNELS,
            min_wavelength: DEFAULT_MIN_WAVELENGTH,
            max_wavelength: DEFAULT_MAX_WAVELENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CameraConfig {
    /// Defaults with the given resolution and field of view.
    pub fn new(width: u32, height: u32, fov: f64) -> Result<Self, ConfigurationError> {
        let config = Self {
            width,
            height,
            fov,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_pixels(mut self, width: u32, height: u32) -> Result<Self, ConfigurationError> {
        self.set_pixels(width, height)?;
        Ok(self)
    }

    pub fn with_fov(mut self, fov: f64) -> Result<Self, ConfigurationError> {
        self.set_fov(fov)?;
        Ok(self)
    }

    pub fn with_spectral_samples(mut self, samples: usize) -> Result<Self, ConfigurationError> {
        self.set_spectral_samples(samples)?;
        Ok(self)
    }

    pub fn with_channels(mut self, channels: usize) -> Result<Self, ConfigurationError> {
        self.set_channels(channels)?;
        Ok(self)
    }

    pub fn with_wavelength_range(mut self, min: f64, max: f64) -> Result<Self, ConfigurationError> {
        self.set_wavelength_range(min, max)?;
        Ok(self)
    }

    /// Never fails; returns `Result` so it chains with the other builders.
    pub fn with_max_depth(mut self, max_depth: u32) -> Result<Self, ConfigurationError> {
        self.set_max_depth(max_depth);
        Ok(self)
    }

    pub fn set_pixels(&mut self, width: u32, height: u32) -> Result<(), ConfigurationError> {
        self.edit(|c| {
            c.width = width;
            c.height = height;
        })
    }

    pub fn set_fov(&mut self, fov: f64) -> Result<(), ConfigurationError> {
        self.edit(|c| c.fov = fov)
    }

    pub fn set_spectral_samples(&mut self, samples: usize) -> Result<(), ConfigurationError> {
        self.edit(|c| c.spectral_samples = samples)
    }

    pub fn set_channels(&mut self, channels: usize) -> Result<(), ConfigurationError> {
        self.edit(|c| c.channels = channels)
    }

    pub fn set_wavelength_range(&mut self, min: f64, max: f64) -> Result<(), ConfigurationError> {
        self.edit(|c| {
            c.min_wavelength = min;
            c.max_wavelength = max;
        })
    }

    /// Any depth is valid; zero makes every ray return black.
    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.max_depth = max_depth;
    }

    /// Apply an edit to a copy and keep it only if it validates.
    fn edit(&mut self, change: impl FnOnce(&mut Self)) -> Result<(), ConfigurationError> {
        let mut candidate = self.clone();
        change(&mut candidate);
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigurationError::InvalidPixels {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(ConfigurationError::InvalidFieldOfView(self.fov));
        }
        if self.spectral_samples == 0 {
            return Err(ConfigurationError::NoSpectralSamples);
        }
        if self.channels == 0 {
            return Err(ConfigurationError::NoChannels);
        }
        match self.channels.checked_mul(self.spectral_samples) {
            Some(total) if total <= MAX_TOTAL_SAMPLES => {}
            _ => {
                return Err(ConfigurationError::TooManySamples {
                    channels: self.channels,
                    samples: self.spectral_samples,
                })
            }
        }
        check_range(self.min_wavelength, self.max_wavelength).map_err(|_| {
            ConfigurationError::InvalidWavelengthRange {
                min: self.min_wavelength,
                max: self.max_wavelength,
            }
        })
    }

    /// `(width, height)` in pixels.
    pub fn pixels(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn fov(&self) -> f64 {
        self.fov
    }

    pub fn spectral_samples(&self) -> usize {
        self.spectral_samples
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Samples across all channels. Never above `MAX_TOTAL_SAMPLES` once
    /// validated.
    pub fn total_samples(&self) -> usize {
        self.channels.saturating_mul(self.spectral_samples)
    }

    pub fn wavelength_range(&self) -> (f64, f64) {
        (self.min_wavelength, self.max_wavelength)
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}

/// Live display behaviour during a render.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub enabled: bool,
    interval: Duration,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs_f64(DEFAULT_DISPLAY_INTERVAL),
        }
    }
}

impl DisplaySettings {
    pub fn new(enabled: bool, interval_secs: f64) -> Result<Self, ConfigurationError> {
        if !(interval_secs.is_finite() && interval_secs > 0.0) {
            return Err(ConfigurationError::InvalidDisplayInterval(interval_secs));
        }
        Ok(Self {
            enabled,
            interval: Duration::from_secs_f64(interval_secs),
        })
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Every user-facing render option, as read from a settings file.
///
/// Missing fields fall back to the camera defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub pixels: (u32, u32),
    pub fov: f64,
    /// Number of wavelength channels (rays per pixel).
    pub rays: usize,
    pub spectral_samples: usize,
    pub min_wavelength: f64,
    pub max_wavelength: f64,
    pub max_depth: u32,
    pub display_progress: bool,
    pub display_update_time: f64,
    pub preview: PathBuf,
    pub output: PathBuf,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            pixels: DEFAULT_PIXELS,
            fov: DEFAULT_FOV,
            rays: DEFAULT_CHANNELS,
            spectral_samples: DEFAULT_SPECTRAL_SAMPLES,
            min_wavelength: DEFAULT_MIN_WAVELENGTH,
            max_wavelength: DEFAULT_MAX_WAVELENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
            display_progress: true,
            display_update_time: DEFAULT_DISPLAY_INTERVAL,
            preview: PathBuf::from("preview.png"),
            output: PathBuf::from("render.png"),
        }
    }
}

impl RenderSettings {
    pub fn camera_config(&self) -> Result<CameraConfig, ConfigurationError> {
        CameraConfig::new(self.pixels.0, self.pixels.1, self.fov)?
            .with_spectral_samples(self.spectral_samples)?
            .with_channels(self.rays)?
            .with_wavelength_range(self.min_wavelength, self.max_wavelength)?
            .with_max_depth(self.max_depth)
    }

    pub fn display_settings(&self) -> Result<DisplaySettings, ConfigurationError> {
        DisplaySettings::new(self.display_progress, self.display_update_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = CameraConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pixels(), (640, 480));
        assert_eq!(config.total_samples(), 20);
        assert_eq!(config.wavelength_range(), (375.0, 740.0));
    }

    #[test]
    fn test_rejects_zero_pixels() {
        assert_eq!(
            CameraConfig::new(0, 480, 40.0),
            Err(ConfigurationError::InvalidPixels { width: 0, height: 480 })
        );
    }

    #[test]
    fn test_rejects_bad_fov() {
        assert_eq!(
            CameraConfig::new(640, 480, 0.0),
            Err(ConfigurationError::InvalidFieldOfView(0.0))
        );
        assert!(CameraConfig::new(640, 480, -10.0).is_err());
        assert!(CameraConfig::new(640, 480, 180.0).is_err());
        assert!(CameraConfig::new(640, 480, f64::NAN).is_err());
    }

    #[test]
    fn test_rejected_edit_keeps_previous_values() {
        let mut config = CameraConfig::new(320, 240, 60.0).unwrap();

        assert!(config.set_pixels(0, 240).is_err());
        assert!(config.set_fov(0.0).is_err());
        assert!(config.set_wavelength_range(700.0, 400.0).is_err());
        assert!(config.set_channels(0).is_err());
        assert!(config.set_spectral_samples(0).is_err());

        assert_eq!(config.pixels(), (320, 240));
        assert_eq!(config.fov(), 60.0);
        assert_eq!(config.wavelength_range(), (375.0, 740.0));
        assert_eq!(config.channels(), 1);
    }

    #[test]
    fn test_rejects_sample_overflow() {
        let huge = usize::MAX / 2 + 1;
        let result = CameraConfig::new(1, 1, 40.0)
            .and_then(|c| c.with_channels(2))
            .and_then(|c| c.with_spectral_samples(huge));
        assert_eq!(
            result,
            Err(ConfigurationError::TooManySamples { channels: 2, samples: huge })
        );

        let mut config = CameraConfig::new(1, 1, 40.0).unwrap();
        assert!(config.set_channels(MAX_TOTAL_SAMPLES / 20 + 1).is_err());
        assert_eq!(config.channels(), 1);

        config.set_spectral_samples(MAX_TOTAL_SAMPLES).unwrap();
        assert_eq!(config.total_samples(), MAX_TOTAL_SAMPLES);
        assert!(config.set_channels(2).is_err());
    }

    #[test]
    fn test_builder_chain() {
        let config = CameraConfig::default()
            .with_pixels(64, 32)
            .and_then(|c| c.with_channels(4))
            .and_then(|c| c.with_spectral_samples(5))
            .unwrap();
        assert_eq!(config.total_samples(), 20);
        assert_eq!(config.pixel_count(), 2048);
    }

    #[test]
    fn test_display_interval_must_be_positive() {
        assert!(DisplaySettings::new(true, 0.0).is_err());
        assert!(DisplaySettings::new(true, f64::INFINITY).is_err());
        let settings = DisplaySettings::new(false, 2.5).unwrap();
        assert!(!settings.enabled);
        assert_eq!(settings.interval(), Duration::from_millis(2500));
    }

    #[test]
    fn test_render_settings_into_config() {
        let settings = RenderSettings {
            pixels: (16, 8),
            rays: 3,
            spectral_samples: 7,
            ..Default::default()
        };
        let config = settings.camera_config().unwrap();
        assert_eq!(config.pixels(), (16, 8));
        assert_eq!(config.total_samples(), 21);
        assert!(settings.display_settings().unwrap().enabled);
    }
}
