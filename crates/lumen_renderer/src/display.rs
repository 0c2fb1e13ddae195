//! Surfaces that present the display frame while a render is running.

use std::path::{Path, PathBuf};

use crate::error::DisplayError;
use crate::frame::Frame;

/// Receives the display frame at each progress refresh.
pub trait DisplaySurface {
    fn refresh(&mut self, frame: &Frame) -> Result<(), DisplayError>;
}

/// Rewrites an image file on every refresh.
#[derive(Debug, Clone)]
pub struct PreviewImage {
    path: PathBuf,
}

impl PreviewImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DisplaySurface for PreviewImage {
    fn refresh(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        frame.save(&self.path)?;
        log::debug!("Preview written to {}", self.path.display());
        Ok(())
    }
}

/// Logs refreshes without presenting anything.
#[derive(Debug, Default, Clone)]
pub struct LogDisplay {
    refreshes: usize,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes
    }
}

impl DisplaySurface for LogDisplay {
    fn refresh(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        self.refreshes += 1;
        log::debug!("Display refresh {} ({}x{})", self.refreshes, frame.width(), frame.height());
        Ok(())
    }
}
