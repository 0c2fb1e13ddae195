//! Lumen Core - spectra, colour science, scene graph and mesh geometry.
//!
//! This crate provides:
//!
//! - **Spectra**: `Spectrum` sample buffers and `SpectralFunction` sources
//! - **Colour**: CIE 1931 matching functions, XYZ resampling, sRGB mapping
//! - **Scene graph**: `SceneGraph` nodes with `Transform`s
//! - **Mesh**: triangle soups with eagerly maintained normals and areas
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::colour::{ciexyz_to_srgb, resample_ciexyz, spectrum_to_ciexyz};
//!
//! let table = resample_ciexyz(375.0, 740.0, 20)?;
//! let xyz = spectrum_to_ciexyz(spectrum.samples(), table.entries(), table.delta());
//! let rgb = ciexyz_to_srgb(xyz);
//! ```

pub mod colour;
pub mod mesh;
pub mod scene;
pub mod spectrum;

// Re-export commonly used types
pub use colour::{ciexyz_to_srgb, d65_white, resample_ciexyz, spectrum_to_ciexyz, XyzTable};
pub use mesh::Mesh;
pub use scene::{NodeId, SceneError, SceneGraph, Transform};
pub use spectrum::{ConstantSF, InterpolatedSF, SpectralFunction, Spectrum, SpectrumError};
