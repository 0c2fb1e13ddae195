//! Lumen math types.
//!
//! Geometry is single precision and built on glam; spectral quantities live
//! in `lumen_core` and use `f64`.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Mat4Ext;
