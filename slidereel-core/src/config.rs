use serde::Serialize;

use crate::error::{Result, SlideshowError};

pub const OUTPUT_WIDTH: u32 = 1920;
pub const OUTPUT_HEIGHT: u32 = 1080;
pub const FRAME_RATE: u32 = 25;

pub const DEFAULT_IMAGE_DURATION_SECS: u32 = 5;
pub const DEFAULT_FADE_DURATION_SECS: f64 = 1.0;
/// Shortest non-zero fade; fades are written with millisecond precision
pub const MIN_FADE_DURATION_SECS: f64 = 0.001;

/// Render settings for a single run.
///
/// Built once from the command line and passed down by reference. Frame counts
/// derive from `image_duration_secs * frame_rate`, which is always integral
/// because both factors are whole numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderConfig {
    pub output_width: u32,
    pub output_height: u32,
    pub frame_rate: u32,
    pub image_duration_secs: u32,
    pub fade_duration_secs: f64,
    pub ken_burns: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_width: OUTPUT_WIDTH,
            output_height: OUTPUT_HEIGHT,
            frame_rate: FRAME_RATE,
            image_duration_secs: DEFAULT_IMAGE_DURATION_SECS,
            fade_duration_secs: DEFAULT_FADE_DURATION_SECS,
            ken_burns: true,
        }
    }
}

impl RenderConfig {
    pub fn image_duration(mut self, seconds: u32) -> Self {
        self.image_duration_secs = seconds;
        self
    }

    pub fn fade_duration(mut self, seconds: f64) -> Self {
        self.fade_duration_secs = seconds;
        self
    }

    pub fn ken_burns(mut self, enabled: bool) -> Self {
        self.ken_burns = enabled;
        self
    }

    /// Number of frames each image is shown for.
    ///
    /// Only meaningful after [`RenderConfig::validate`], which rejects
    /// durations whose frame count does not fit in a `u32`.
    pub fn frame_count(&self) -> u32 {
        self.image_duration_secs * self.frame_rate
    }

    /// A fade of zero disables crossfading
    pub fn crossfade_enabled(&self) -> bool {
        self.fade_duration_secs > 0.0
    }

    /// Per-input duration on the crossfade path, long enough for both sides of a fade
    pub fn extended_input_duration_secs(&self) -> f64 {
        f64::from(self.image_duration_secs) + self.fade_duration_secs
    }

    /// Check settings that apply to every render path
    pub fn validate(&self) -> Result<()> {
        if self.image_duration_secs == 0 {
            return Err(SlideshowError::invalid_config(
                "image duration must be at least 1 second",
            ));
        }
        if self
            .image_duration_secs
            .checked_mul(self.frame_rate)
            .is_none()
        {
            return Err(SlideshowError::invalid_config(format!(
                "image duration of {}s is too long at {} fps",
                self.image_duration_secs, self.frame_rate
            )));
        }
        if !self.fade_duration_secs.is_finite() || self.fade_duration_secs < 0.0 {
            return Err(SlideshowError::invalid_config(format!(
                "fade duration must be a non-negative number, got {}",
                self.fade_duration_secs
            )));
        }
        if self.crossfade_enabled() && self.fade_duration_secs < MIN_FADE_DURATION_SECS {
            return Err(SlideshowError::invalid_config(format!(
                "fade duration must be 0 or at least {MIN_FADE_DURATION_SECS}s, got {}",
                self.fade_duration_secs
            )));
        }
        Ok(())
    }

    /// Check settings the crossfade offset chain depends on.
    ///
    /// Offsets are multiples of `image - fade`, so the fade must be strictly
    /// shorter than the image duration.
    pub fn validate_crossfade(&self) -> Result<()> {
        self.validate()?;
        if self.fade_duration_secs >= f64::from(self.image_duration_secs) {
            return Err(SlideshowError::invalid_config(format!(
                "fade duration ({:.2}s) must be shorter than image duration ({}s)",
                self.fade_duration_secs, self.image_duration_secs
            )));
        }
        Ok(())
    }
}
