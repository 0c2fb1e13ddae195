//! Pinhole ray generation.
//!
//! The image plane sits at unit distance along camera +Z. The field of view
//! spans the longer image axis, pixel centres sit `delta` apart, and the
//! pixel grid is centred on the optical axis.
//!
//! The scan starts on the first pixel centre, so pixel centres (not pixel
//! edges) are symmetric about the axis and the outermost centres lie exactly
//! on the field of view.

use lumen_math::{DVec3, Mat4, Ray, Vec3};

/// Pixel-to-direction mapping for one frame size and field of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlane {
    width: u32,
    height: u32,
    delta: f64,
    start_x: f64,
    start_y: f64,
}

impl ImagePlane {
    pub fn new(width: u32, height: u32, fov_degrees: f64) -> Self {
        let longest = width.max(height);

        // A single pixel fires one ray straight down the axis.
        let delta = if longest > 1 {
            let half_width = (0.5 * fov_degrees).to_radians().tan();
            2.0 * half_width / (longest - 1) as f64
        } else {
            0.0
        };

        Self {
            width,
            height,
            delta,
            start_x: 0.5 * width.saturating_sub(1) as f64 * delta,
            start_y: 0.5 * height.saturating_sub(1) as f64 * delta,
        }
    }

    /// Spacing between neighbouring pixel centres on the image plane.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Unit camera-space direction through the centre of pixel `(x, y)`.
    ///
    /// Pixel `(0, 0)` is the top-left of the image and sees `+x, +y`.
    pub fn direction(&self, x: u32, y: u32) -> Vec3 {
        DVec3::new(
            self.start_x - self.delta * x as f64,
            self.start_y - self.delta * y as f64,
            1.0,
        )
        .normalize()
        .as_vec3()
    }

    /// World-space ray through pixel `(x, y)` for a camera placed by
    /// `to_world`.
    pub fn world_ray(&self, x: u32, y: u32, to_world: &Mat4) -> Ray {
        Ray::new(Vec3::ZERO, self.direction(x, y)).transform(to_world)
    }
}
