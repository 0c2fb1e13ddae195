//! Image buffers owned by the camera.
//!
//! The tristimulus frame accumulates CIE XYZ across channels; the display
//! frame holds the gamma-encoded sRGB view of it, kept in step pixel by pixel.

use std::path::Path;

use glam::DVec3;
use lumen_core::ciexyz_to_srgb;

use crate::error::FrameError;

/// Row-major grid of colour triples.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<DVec3>,
}

impl Frame {
    /// Create a new frame filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![DVec3::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[DVec3] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> DVec3 {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, value: DVec3) {
        let i = self.index(x, y);
        self.pixels[i] = value;
    }

    /// Add to the pixel at (x, y) and return the new value.
    pub fn add(&mut self, x: u32, y: u32, value: DVec3) -> DVec3 {
        let i = self.index(x, y);
        self.pixels[i] += value;
        self.pixels[i]
    }

    /// Zero every pixel, resizing to `width` x `height` first if needed.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize, DVec3::ZERO);
    }

    pub fn is_finite(&self) -> bool {
        self.pixels.iter().all(|p| p.is_finite())
    }

    /// Quantise [0, 1] components to 8-bit RGB bytes.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for pixel in &self.pixels {
            for c in pixel.to_array() {
                bytes.push((255.0 * c.clamp(0.0, 1.0)).round() as u8);
            }
        }
        bytes
    }

    /// Encode as 8-bit RGB; the format follows the file extension.
    pub fn save(&self, path: &Path) -> Result<(), FrameError> {
        let encode_error = |source| FrameError::Encode {
            path: path.to_path_buf(),
            source,
        };
        let image = image::RgbImage::from_raw(self.width, self.height, self.to_rgb8()).ok_or_else(|| {
            encode_error(image::ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            )))
        })?;
        image.save(path).map_err(encode_error)
    }
}

/// The camera's pair of frames.
#[derive(Debug, Clone)]
pub struct FrameStore {
    tristimulus: Frame,
    display: Frame,
}

impl FrameStore {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            tristimulus: Frame::new(width, height),
            display: Frame::new(width, height),
        }
    }

    /// Zero both frames at the given size.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.tristimulus.reset(width, height);
        self.display.reset(width, height);
    }

    /// Add an XYZ contribution and refresh that pixel's display value.
    pub fn accumulate(&mut self, x: u32, y: u32, xyz: DVec3) {
        let total = self.tristimulus.add(x, y, xyz);
        self.display.set(x, y, ciexyz_to_srgb(total));
    }

    /// Accumulated CIE XYZ.
    pub fn tristimulus(&self) -> &Frame {
        &self.tristimulus
    }

    /// Gamma-encoded sRGB in [0, 1].
    pub fn display(&self) -> &Frame {
        &self.display
    }

    pub fn snapshot(&self) -> Frame {
        self.display.clone()
    }

    pub fn save(&self, path: &Path) -> Result<(), FrameError> {
        self.display.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_add_and_reset() {
        let mut frame = Frame::new(4, 3);
        assert_eq!(frame.pixels().len(), 12);

        frame.add(3, 2, DVec3::ONE);
        let total = frame.add(3, 2, DVec3::ONE);
        assert_eq!(total, DVec3::splat(2.0));
        assert_eq!(frame.get(3, 2), DVec3::splat(2.0));
        assert_eq!(frame.get(0, 0), DVec3::ZERO);

        frame.reset(2, 2);
        assert_eq!((frame.width(), frame.height()), (2, 2));
        assert!(frame.pixels().iter().all(|p| *p == DVec3::ZERO));
    }

    #[test]
    fn test_rgb8_quantisation() {
        let mut frame = Frame::new(2, 1);
        frame.set(0, 0, DVec3::new(1.0, 0.5, 0.0));
        frame.set(1, 0, DVec3::new(2.0, -1.0, 0.2));

        assert_eq!(frame.to_rgb8(), vec![255, 128, 0, 255, 0, 51]);
    }

    #[test]
    fn test_accumulate_updates_display() {
        let mut store = FrameStore::new(2, 2);
        let white = DVec3::new(0.9505, 1.0, 1.089);

        store.accumulate(1, 0, white * 0.5);
        store.accumulate(1, 0, white * 0.5);

        assert!((store.tristimulus().get(1, 0) - white).length() < 1e-12);
        let rgb = store.display().get(1, 0);
        assert!((rgb - DVec3::ONE).abs().max_element() < 0.01);
        assert_eq!(store.display().get(0, 0), DVec3::ZERO);
        assert_eq!(store.snapshot(), *store.display());
    }

    #[test]
    fn test_save_png() {
        let mut store = FrameStore::new(3, 2);
        store.accumulate(0, 0, DVec3::new(0.2, 0.3, 0.1));

        let path = std::env::temp_dir().join(format!("lumen_frame_{}.png", std::process::id()));
        store.save(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.into_raw(), store.display().to_rgb8());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_unknown_extension_fails() {
        let store = FrameStore::new(1, 1);
        let path = std::env::temp_dir().join("lumen_frame.not_an_image");
        assert!(matches!(store.save(&path), Err(FrameError::Encode { .. })));
    }
}
