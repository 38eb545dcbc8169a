use std::time::Duration;

use crate::error::{Result, ViewerError};

#[derive(Debug, Clone)]
pub struct ViewerSettings {
    pub width: u32,
    pub height: u32,
    /// Milliseconds shown per viewport width, as a multiple of the width in pixels.
    pub page_multiplier: f32,
    /// Inset applied on every side of a note rectangle, in pixels.
    pub padding: f32,
    pub update_interval: Duration,
    pub tick_interval_ms: f32,
    pub accent_every: usize,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            width: 730,
            height: 410,
            page_multiplier: 10.0,
            padding: 0.5,
            update_interval: Duration::from_millis(9),
            tick_interval_ms: 1000.0,
            accent_every: 5,
        }
    }
}

impl ViewerSettings {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(ViewerError::Configuration(format!(
                "viewport must be at least 1x1 pixels, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
            ..Default::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ViewerError::Configuration(format!(
                "viewport must be at least 1x1 pixels, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.page_multiplier.is_finite() && self.page_multiplier > 0.0) {
            return Err(ViewerError::Configuration(format!(
                "page multiplier must be positive, got {}",
                self.page_multiplier
            )));
        }
        if !(self.tick_interval_ms.is_finite() && self.tick_interval_ms > 0.0) {
            return Err(ViewerError::Configuration(format!(
                "tick interval must be positive, got {}",
                self.tick_interval_ms
            )));
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) || self.accent_every == 0 {
            return Err(ViewerError::Configuration("padding and accent interval must be non-negative".to_string()));
        }
        Ok(())
    }

    pub fn width_f(&self) -> f32 {
        self.width as f32
    }

    pub fn height_f(&self) -> f32 {
        self.height as f32
    }

    pub fn page_window_ms(&self) -> f64 {
        self.width as f64 * self.page_multiplier as f64
    }
}
