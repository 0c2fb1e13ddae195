//! Spectral sample buffers and the functions they are sampled from.
//!
//! Wavelengths are in nanometres. A spectrum over `[min, max]` with `n`
//! samples divides the range into `n` equal bins; sample `i` holds the
//! average radiance over bin `i`, not a point value at its centre.

use thiserror::Error;

/// Errors raised while building spectra or spectral tables.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpectrumError {
    #[error("invalid wavelength range: {min} nm to {max} nm")]
    InvalidRange { min: f64, max: f64 },

    #[error("a spectrum needs at least one sample")]
    NoSamples,

    #[error("invalid spectral table: {0}")]
    InvalidTable(String),
}

/// Check that `[min, max]` is a usable wavelength range.
pub fn check_range(min: f64, max: f64) -> Result<(), SpectrumError> {
    if min.is_finite() && max.is_finite() && min > 0.0 && min < max {
        Ok(())
    } else {
        Err(SpectrumError::InvalidRange { min, max })
    }
}

/// Radiance samples over an evenly binned wavelength range.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    min_wavelength: f64,
    max_wavelength: f64,
    samples: Vec<f64>,
}

impl Spectrum {
    /// Create a zeroed spectrum.
    pub fn new(min_wavelength: f64, max_wavelength: f64, num_samples: usize) -> Result<Self, SpectrumError> {
        check_range(min_wavelength, max_wavelength)?;
        if num_samples == 0 {
            return Err(SpectrumError::NoSamples);
        }
        Ok(Self {
            min_wavelength,
            max_wavelength,
            samples: vec![0.0; num_samples],
        })
    }

    /// Sample a spectral function into a new spectrum.
    pub fn from_function(
        function: &dyn SpectralFunction,
        min_wavelength: f64,
        max_wavelength: f64,
        num_samples: usize,
    ) -> Result<Self, SpectrumError> {
        let mut spectrum = Self::new(min_wavelength, max_wavelength, num_samples)?;
        spectrum.samples = function.sample_multiple(min_wavelength, max_wavelength, num_samples);
        Ok(spectrum)
    }

    pub fn min_wavelength(&self) -> f64 {
        self.min_wavelength
    }

    pub fn max_wavelength(&self) -> f64 {
        self.max_wavelength
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// Width of one bin.
    pub fn delta_wavelength(&self) -> f64 {
        (self.max_wavelength - self.min_wavelength) / self.samples.len() as f64
    }

    /// Centre wavelength of bin `index`.
    pub fn wavelength(&self, index: usize) -> f64 {
        self.min_wavelength + (index as f64 + 0.5) * self.delta_wavelength()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [f64] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Reset every sample to zero, keeping the binning.
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
    }

    pub fn is_zero(&self) -> bool {
        self.samples.iter().all(|s| *s == 0.0)
    }

    /// Radiance integrated over the whole range.
    pub fn total(&self) -> f64 {
        self.samples.iter().sum::<f64>() * self.delta_wavelength()
    }
}

/// Anything that can be averaged over a wavelength interval.
pub trait SpectralFunction: Send + Sync {
    /// Mean value over `[min, max]`.
    fn average(&self, min_wavelength: f64, max_wavelength: f64) -> f64;

    /// Bin averages for `num_samples` equal bins spanning `[min, max]`.
    ///
    /// Bin edges are computed from the range directly so adjacent ranges
    /// with matching bin widths produce identical bins.
    fn sample_multiple(&self, min_wavelength: f64, max_wavelength: f64, num_samples: usize) -> Vec<f64> {
        let width = max_wavelength - min_wavelength;
        let n = num_samples as f64;
        (0..num_samples)
            .map(|i| {
                let lower = min_wavelength + width * i as f64 / n;
                let upper = min_wavelength + width * (i + 1) as f64 / n;
                self.average(lower, upper)
            })
            .collect()
    }
}

/// The same value at every wavelength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSF(pub f64);

impl SpectralFunction for ConstantSF {
    fn average(&self, _min_wavelength: f64, _max_wavelength: f64) -> f64 {
        self.0
    }
}

/// Piecewise-linear interpolation of a tabulated spectrum.
///
/// Outside the table the end values are held constant. Averages are exact
/// integrals of the interpolant.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedSF {
    wavelengths: Vec<f64>,
    values: Vec<f64>,
}

impl InterpolatedSF {
    pub fn new(wavelengths: Vec<f64>, values: Vec<f64>) -> Result<Self, SpectrumError> {
        if wavelengths.is_empty() {
            return Err(SpectrumError::NoSamples);
        }
        if wavelengths.len() != values.len() {
            return Err(SpectrumError::InvalidTable(format!(
                "{} wavelengths but {} values",
                wavelengths.len(),
                values.len()
            )));
        }
        if wavelengths.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(SpectrumError::InvalidTable(
                "wavelengths must be strictly ascending".to_string(),
            ));
        }
        Ok(Self { wavelengths, values })
    }

    /// Build from a table already known to be ascending and complete.
    pub(crate) fn from_sorted(wavelengths: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert!(wavelengths.len() == values.len() && !wavelengths.is_empty());
        Self { wavelengths, values }
    }

    /// Scale every tabulated value.
    pub fn scaled(mut self, factor: f64) -> Self {
        self.values.iter_mut().for_each(|v| *v *= factor);
        self
    }

    /// Interpolated value at a single wavelength.
    pub fn evaluate(&self, wavelength: f64) -> f64 {
        let xs = &self.wavelengths;
        let ys = &self.values;
        let last = xs.len() - 1;

        if wavelength <= xs[0] {
            return ys[0];
        }
        if wavelength >= xs[last] {
            return ys[last];
        }

        // First index whose wavelength exceeds the query; always in 1..=last here.
        let upper = xs.partition_point(|x| *x <= wavelength);
        let lower = upper - 1;
        let t = (wavelength - xs[lower]) / (xs[upper] - xs[lower]);
        ys[lower] + t * (ys[upper] - ys[lower])
    }

    /// Exact integral of the interpolant over `[a, b]`, `a <= b`.
    fn integrate(&self, a: f64, b: f64) -> f64 {
        let xs = &self.wavelengths;
        let ys = &self.values;
        let first = xs[0];
        let last = xs[xs.len() - 1];
        let mut total = 0.0;

        if a < first {
            total += ys[0] * (b.min(first) - a);
        }
        if b > last {
            total += ys[ys.len() - 1] * (b - a.max(last));
        }

        let lo = a.max(first);
        let hi = b.min(last);
        if lo < hi {
            for segment in xs.windows(2) {
                let start = lo.max(segment[0]);
                let end = hi.min(segment[1]);
                if start < end {
                    total += 0.5 * (self.evaluate(start) + self.evaluate(end)) * (end - start);
                }
            }
        }

        total
    }
}

impl SpectralFunction for InterpolatedSF {
    fn average(&self, min_wavelength: f64, max_wavelength: f64) -> f64 {
        if max_wavelength > min_wavelength {
            self.integrate(min_wavelength, max_wavelength) / (max_wavelength - min_wavelength)
        } else {
            self.evaluate(min_wavelength)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrum_binning() {
        let spectrum = Spectrum::new(400.0, 500.0, 4).unwrap();
        assert_eq!(spectrum.num_samples(), 4);
        assert!((spectrum.delta_wavelength() - 25.0).abs() < 1e-12);
        assert!((spectrum.wavelength(0) - 412.5).abs() < 1e-12);
        assert!((spectrum.wavelength(3) - 487.5).abs() < 1e-12);
        assert!(spectrum.is_zero());
    }

    #[test]
    fn test_spectrum_rejects_bad_input() {
        assert_eq!(
            Spectrum::new(500.0, 400.0, 4),
            Err(SpectrumError::InvalidRange { min: 500.0, max: 400.0 })
        );
        assert_eq!(Spectrum::new(400.0, 500.0, 0), Err(SpectrumError::NoSamples));
        assert!(Spectrum::new(0.0, 500.0, 4).is_err());
    }

    #[test]
    fn test_constant_total() {
        let spectrum = Spectrum::from_function(&ConstantSF(2.0), 400.0, 700.0, 30).unwrap();
        assert!(spectrum.samples().iter().all(|s| *s == 2.0));
        assert!((spectrum.total() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolated_evaluate() {
        let sf = InterpolatedSF::new(vec![400.0, 500.0, 600.0], vec![0.0, 1.0, 3.0]).unwrap();
        assert_eq!(sf.evaluate(300.0), 0.0);
        assert!((sf.evaluate(450.0) - 0.5).abs() < 1e-12);
        assert!((sf.evaluate(550.0) - 2.0).abs() < 1e-12);
        assert_eq!(sf.evaluate(900.0), 3.0);
    }

    #[test]
    fn test_interpolated_average_is_exact() {
        let sf = InterpolatedSF::new(vec![400.0, 500.0], vec![0.0, 1.0]).unwrap();

        // Linear ramp: mean over [400, 500] is 0.5.
        assert!((sf.average(400.0, 500.0) - 0.5).abs() < 1e-12);
        // Half below the table (held at 0), half on the ramp up to 0.5.
        assert!((sf.average(350.0, 450.0) - 0.125).abs() < 1e-12);
        // Entirely above the table.
        assert!((sf.average(600.0, 700.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_multiple_adjacent_ranges_agree() {
        let sf = InterpolatedSF::new(vec![380.0, 520.0, 700.0], vec![0.2, 1.4, 0.7]).unwrap();
        let whole = sf.sample_multiple(400.0, 600.0, 10);
        let mut halves = sf.sample_multiple(400.0, 500.0, 5);
        halves.extend(sf.sample_multiple(500.0, 600.0, 5));

        for (a, b) in whole.iter().zip(&halves) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_interpolated_rejects_unsorted() {
        assert!(InterpolatedSF::new(vec![500.0, 400.0], vec![1.0, 1.0]).is_err());
        assert!(InterpolatedSF::new(vec![400.0], vec![1.0, 2.0]).is_err());
        assert_eq!(InterpolatedSF::new(vec![], vec![]), Err(SpectrumError::NoSamples));
    }
}
