use std::path::PathBuf;

use clap::Parser;

/// Render the built-in demo scene with a progressive spectral camera.
#[derive(Parser, Debug)]
#[command(name = "lumen", version, about)]
pub struct Cli {
    /// JSON settings file; flags below override its values.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Field of view across the longer image axis, in degrees.
    #[arg(long)]
    pub fov: Option<f64>,

    /// Number of wavelength channels traced per pixel.
    #[arg(long)]
    pub rays: Option<usize>,

    /// Spectral samples per channel.
    #[arg(long)]
    pub samples: Option<usize>,

    #[arg(long)]
    pub min_wavelength: Option<f64>,

    #[arg(long)]
    pub max_wavelength: Option<f64>,

    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Skip preview refreshes while rendering.
    #[arg(long)]
    pub no_display: bool,

    /// Seconds between preview refreshes.
    #[arg(long)]
    pub display_interval: Option<f64>,

    /// Preview image rewritten during the render.
    #[arg(long)]
    pub preview: Option<PathBuf>,

    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Seed for the demo scene layout.
    #[arg(long, default_value_t = 7)]
    pub seed: u64,
}
