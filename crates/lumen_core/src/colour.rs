//! Colour science: CIE 1931 matching functions, XYZ integration and sRGB.
//!
//! The matching functions use the multi-lobe Gaussian fit of Wyman, Sloan
//! and Shirley (2013), which tracks the tabulated 2-degree observer closely
//! across the visible range without shipping the full table.

use std::ops::Range;

use glam::DVec3;

use crate::spectrum::{check_range, InterpolatedSF, SpectrumError};

/// Sub-samples per bin when averaging the matching functions.
const BIN_SUBSAMPLES: usize = 16;

#[inline]
fn lobe(wavelength: f64, mean: f64, sigma_low: f64, sigma_high: f64) -> f64 {
    let sigma = if wavelength < mean { sigma_low } else { sigma_high };
    let t = (wavelength - mean) / sigma;
    (-0.5 * t * t).exp()
}

/// CIE 1931 x-bar.
pub fn cie_x(wavelength: f64) -> f64 {
    1.056 * lobe(wavelength, 599.8, 37.9, 31.0) + 0.362 * lobe(wavelength, 442.0, 16.0, 26.7)
        - 0.065 * lobe(wavelength, 501.1, 20.4, 26.2)
}

/// CIE 1931 y-bar (photopic luminosity).
pub fn cie_y(wavelength: f64) -> f64 {
    0.821 * lobe(wavelength, 568.8, 46.9, 40.5) + 0.286 * lobe(wavelength, 530.9, 16.3, 31.1)
}

/// CIE 1931 z-bar.
pub fn cie_z(wavelength: f64) -> f64 {
    1.217 * lobe(wavelength, 437.0, 11.8, 36.0) + 0.681 * lobe(wavelength, 459.0, 26.0, 13.8)
}

/// All three matching functions at one wavelength.
pub fn ciexyz(wavelength: f64) -> DVec3 {
    DVec3::new(cie_x(wavelength), cie_y(wavelength), cie_z(wavelength))
}

/// Matching functions averaged over the bins of a wavelength range.
///
/// Entry `i` covers the same bin as sample `i` of a `Spectrum` with the same
/// range and sample count. Entries depend only on their own bin, so a slice
/// of the table is valid for a spectrum covering just those bins.
#[derive(Debug, Clone, PartialEq)]
pub struct XyzTable {
    min_wavelength: f64,
    max_wavelength: f64,
    entries: Vec<DVec3>,
}

impl XyzTable {
    pub fn min_wavelength(&self) -> f64 {
        self.min_wavelength
    }

    pub fn max_wavelength(&self) -> f64 {
        self.max_wavelength
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bin width in nanometres.
    pub fn delta(&self) -> f64 {
        (self.max_wavelength - self.min_wavelength) / self.entries.len() as f64
    }

    pub fn entries(&self) -> &[DVec3] {
        &self.entries
    }

    /// Entries for a run of global sample indices.
    pub fn slice(&self, indices: Range<usize>) -> &[DVec3] {
        &self.entries[indices]
    }
}

/// Resample the matching functions into `num_samples` bins over `[min, max]`.
///
/// Bin averages are clamped at zero so non-negative spectra always give
/// non-negative tristimulus values.
pub fn resample_ciexyz(min_wavelength: f64, max_wavelength: f64, num_samples: usize) -> Result<XyzTable, SpectrumError> {
    check_range(min_wavelength, max_wavelength)?;
    if num_samples == 0 {
        return Err(SpectrumError::NoSamples);
    }

    let width = max_wavelength - min_wavelength;
    let n = num_samples as f64;
    let entries = (0..num_samples)
        .map(|i| {
            let lower = min_wavelength + width * i as f64 / n;
            let upper = min_wavelength + width * (i + 1) as f64 / n;
            let step = (upper - lower) / BIN_SUBSAMPLES as f64;
            let sum: DVec3 = (0..BIN_SUBSAMPLES)
                .map(|k| ciexyz(lower + (k as f64 + 0.5) * step))
                .sum();
            (sum / BIN_SUBSAMPLES as f64).max(DVec3::ZERO)
        })
        .collect();

    Ok(XyzTable {
        min_wavelength,
        max_wavelength,
        entries,
    })
}

/// Integrate spectral samples against matching-function entries.
///
/// `samples` and `table` must describe the same bins; `delta` is the bin
/// width in nanometres.
pub fn spectrum_to_ciexyz(samples: &[f64], table: &[DVec3], delta: f64) -> DVec3 {
    debug_assert_eq!(samples.len(), table.len());
    samples
        .iter()
        .zip(table)
        .map(|(sample, cmf)| *cmf * (*sample * delta))
        .sum()
}

/// CIE XYZ to linear sRGB (D65 white).
pub fn ciexyz_to_linear_srgb(xyz: DVec3) -> DVec3 {
    DVec3::new(
        3.2404542 * xyz.x - 1.5371385 * xyz.y - 0.4985314 * xyz.z,
        -0.9692660 * xyz.x + 1.8760108 * xyz.y + 0.0415560 * xyz.z,
        0.0556434 * xyz.x - 0.2040259 * xyz.y + 1.0572252 * xyz.z,
    )
}

/// sRGB transfer curve for a linear value in `[0, 1]`.
#[inline]
pub fn srgb_transfer(linear: f64) -> f64 {
    if linear <= 0.0031308 {
        12.92 * linear
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// CIE XYZ to display-ready sRGB.
///
/// Out-of-gamut values are clipped to `[0, 1]` before the transfer curve;
/// NaN inputs map to zero so the result is always displayable.
pub fn ciexyz_to_srgb(xyz: DVec3) -> DVec3 {
    let linear = ciexyz_to_linear_srgb(xyz);
    let clip = |v: f64| srgb_transfer(v.max(0.0).min(1.0));
    DVec3::new(clip(linear.x), clip(linear.y), clip(linear.z))
}

/// CIE standard illuminant D65, 10 nm steps from 300 nm to 780 nm.
const D65_START: f64 = 300.0;
const D65_STEP: f64 = 10.0;
const D65_VALUES: [f64; 49] = [
    0.0341, 3.2945, 20.236, 37.0535, 39.9488, 44.9117, 46.6383, 52.0891, 49.9755, 54.6482,
    82.7549, 91.486, 93.4318, 86.6823, 104.865, 117.008, 117.812, 114.861, 115.923, 108.811,
    109.354, 107.802, 104.79, 107.689, 104.405, 104.046, 100.0, 96.3342, 95.788, 88.6856,
    90.0062, 89.5991, 87.6987, 83.6992, 83.6987, 80.2146, 80.2146, 82.2778, 78.2842, 69.7213,
    71.6091, 74.349, 61.604, 69.8856, 75.087, 63.5927, 46.4182, 66.8054, 63.3828,
];

/// D65 white, scaled so its CIE Y over 360-830 nm is exactly 1.
pub fn d65_white() -> InterpolatedSF {
    let wavelengths = (0..D65_VALUES.len())
        .map(|i| D65_START + D65_STEP * i as f64)
        .collect();
    let raw = InterpolatedSF::from_sorted(wavelengths, D65_VALUES.to_vec());

    let luminance: f64 = (360..830)
        .map(|nm| {
            let wavelength = nm as f64 + 0.5;
            raw.evaluate(wavelength) * cie_y(wavelength)
        })
        .sum();
    raw.scaled(1.0 / luminance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::{ConstantSF, SpectralFunction, Spectrum};

    #[test]
    fn test_luminosity_peak() {
        assert!((cie_y(555.0) - 1.0).abs() < 0.02);
        assert!(cie_y(400.0) < 0.01);
        assert!(cie_y(700.0) < 0.01);
    }

    #[test]
    fn test_resample_bins_match_spectrum_bins() {
        let table = resample_ciexyz(375.0, 740.0, 40).unwrap();
        let spectrum = Spectrum::new(375.0, 740.0, 40).unwrap();

        assert_eq!(table.len(), 40);
        assert!((table.delta() - spectrum.delta_wavelength()).abs() < 1e-12);
        assert!(table.entries().iter().all(|e| e.min_element() >= 0.0));
    }

    #[test]
    fn test_table_slices_are_independent_of_range_split() {
        let whole = resample_ciexyz(400.0, 700.0, 20).unwrap();
        let left = resample_ciexyz(400.0, 550.0, 10).unwrap();
        let right = resample_ciexyz(550.0, 700.0, 10).unwrap();

        for (a, b) in whole.slice(0..10).iter().zip(left.entries()) {
            assert!((*a - *b).length() < 1e-9);
        }
        for (a, b) in whole.slice(10..20).iter().zip(right.entries()) {
            assert!((*a - *b).length() < 1e-9);
        }
    }

    #[test]
    fn test_d65_is_white() {
        let d65 = d65_white();
        let table = resample_ciexyz(360.0, 830.0, 470).unwrap();
        let samples = d65.sample_multiple(360.0, 830.0, 470);
        let xyz = spectrum_to_ciexyz(&samples, table.entries(), table.delta());

        assert!((xyz.y - 1.0).abs() < 0.01, "Y = {}", xyz.y);
        let linear = ciexyz_to_linear_srgb(xyz);
        for channel in linear.to_array() {
            assert!((channel - 1.0).abs() < 0.08, "linear sRGB = {:?}", linear);
        }
    }

    #[test]
    fn test_integration_is_additive() {
        let table = resample_ciexyz(400.0, 700.0, 30).unwrap();
        let samples = ConstantSF(0.5).sample_multiple(400.0, 700.0, 30);

        let whole = spectrum_to_ciexyz(&samples, table.entries(), table.delta());
        let parts = spectrum_to_ciexyz(&samples[..12], table.slice(0..12), table.delta())
            + spectrum_to_ciexyz(&samples[12..], table.slice(12..30), table.delta());

        assert!((whole - parts).length() < 1e-12);
    }

    #[test]
    fn test_srgb_mapping_is_clipped_and_finite() {
        assert_eq!(ciexyz_to_srgb(DVec3::ZERO), DVec3::ZERO);
        let hot = ciexyz_to_srgb(DVec3::splat(50.0));
        assert!(hot.max_element() <= 1.0);
        let nan = ciexyz_to_srgb(DVec3::new(f64::NAN, 0.2, 0.1));
        assert!(nan.is_finite());
    }

    #[test]
    fn test_transfer_curve() {
        assert_eq!(srgb_transfer(0.0), 0.0);
        assert!((srgb_transfer(1.0) - 1.0).abs() < 1e-9);
        // The two pieces meet at the threshold.
        let below = 12.92 * 0.0031308;
        let above = 1.055 * 0.0031308f64.powf(1.0 / 2.4) - 0.055;
        assert!((below - above).abs() < 1e-6);
    }
}
