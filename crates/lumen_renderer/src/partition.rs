//! Splitting the camera's wavelength range into per-ray channels.

use std::ops::Range;

use lumen_core::spectrum::check_range;

use crate::error::ConfigurationError;

/// One wavelength sub-band traced as its own ray pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavelengthChannel {
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
    /// Spectral samples this channel contributes.
    pub samples: usize,
}

impl WavelengthChannel {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Indices of this channel's samples in the full-spectrum buffer.
    pub fn sample_range(&self) -> Range<usize> {
        self.samples * self.index..self.samples * (self.index + 1)
    }
}

/// Partition `[min, max]` into `count` equal, ascending channels.
///
/// Each boundary is computed directly from its index, so neighbouring
/// channels share bit-identical edges and the last channel ends exactly on
/// `max`.
pub fn partition(
    min_wavelength: f64,
    max_wavelength: f64,
    count: usize,
    samples_per_channel: usize,
) -> Result<Vec<WavelengthChannel>, ConfigurationError> {
    if count == 0 {
        return Err(ConfigurationError::NoChannels);
    }
    if samples_per_channel == 0 {
        return Err(ConfigurationError::NoSpectralSamples);
    }
    check_range(min_wavelength, max_wavelength).map_err(|_| ConfigurationError::InvalidWavelengthRange {
        min: min_wavelength,
        max: max_wavelength,
    })?;

    let width = max_wavelength - min_wavelength;
    let boundary = |k: usize| {
        if k == count {
            max_wavelength
        } else {
            min_wavelength + width * k as f64 / count as f64
        }
    };

    Ok((0..count)
        .map(|index| WavelengthChannel {
            index,
            lower: boundary(index),
            upper: boundary(index + 1),
            samples: samples_per_channel,
        })
        .collect())
}
