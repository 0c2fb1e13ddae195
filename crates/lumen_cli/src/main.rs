//! `lumen` - render the demo scene with a progressive spectral camera.

mod cli;
mod scene;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::Transform;
use lumen_renderer::{DisplaySurface, LogDisplay, PinholeCamera, PreviewImage, RenderSettings};

use crate::cli::Cli;

fn load_settings(cli: &Cli) -> Result<RenderSettings> {
    let mut settings = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse settings file {}", path.display()))?
        }
        None => RenderSettings::default(),
    };

    if let Some(width) = cli.width {
        settings.pixels.0 = width;
    }
    if let Some(height) = cli.height {
        settings.pixels.1 = height;
    }
    if let Some(fov) = cli.fov {
        settings.fov = fov;
    }
    if let Some(rays) = cli.rays {
        settings.rays = rays;
    }
    if let Some(samples) = cli.samples {
        settings.spectral_samples = samples;
    }
    if let Some(min) = cli.min_wavelength {
        settings.min_wavelength = min;
    }
    if let Some(max) = cli.max_wavelength {
        settings.max_wavelength = max;
    }
    if let Some(depth) = cli.max_depth {
        settings.max_depth = depth;
    }
    if cli.no_display {
        settings.display_progress = false;
    }
    if let Some(interval) = cli.display_interval {
        settings.display_update_time = interval;
    }
    if let Some(preview) = &cli.preview {
        settings.preview = preview.clone();
    }
    if let Some(output) = &cli.output {
        settings.output = output.clone();
    }

    Ok(settings)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    let config = settings.camera_config().context("Invalid camera settings")?;
    let display = settings.display_settings().context("Invalid display settings")?;

    log::info!("Building demo scene (seed {})", cli.seed);
    let scene = scene::build(cli.seed).context("Failed to build demo scene")?;

    let mut camera = PinholeCamera::new(config).with_display(display);
    camera.attach(scene.camera_node, &Transform::default());

    let mut surface: Box<dyn DisplaySurface> = if settings.display_progress {
        log::info!("Preview will be written to {}", settings.preview.display());
        Box::new(PreviewImage::new(&settings.preview))
    } else {
        Box::new(LogDisplay::new())
    };

    let summary = camera
        .render(&scene.world, surface.as_mut())
        .context("Render failed")?;
    log::info!(
        "Traced {} rays for {} pixel passes",
        summary.rays,
        summary.work_units
    );

    camera
        .save(&settings.output)
        .with_context(|| format!("Failed to save {}", settings.output.display()))?;
    log::info!("Saved {}", settings.output.display());

    Ok(())
}
