//! Mapping between seconds, frame indices and pixel offsets
//!
//! The main view is laid out at `pixels_per_second * device_pixel_ratio`
//! physical pixels per second of audio. Frame-indexed series (the per-frame
//! probability curves) share the same time base at a fixed frame rate.

use crate::error::{VizError, VizResult};

/// Default zoom factor in CSS pixels per second
pub const DEFAULT_PIXELS_PER_SECOND: f64 = 120.0;

/// Pixel offset of `time_secs` on a timeline drawn at the given scale
///
/// Negative or non-finite times clamp to pixel 0. A non-positive scale
/// collapses the whole timeline onto pixel 0.
pub fn pixel_of(time_secs: f64, pixels_per_second: f64, device_pixel_ratio: f64) -> u64 {
    let scale = pixels_per_second * device_pixel_ratio;
    if !time_secs.is_finite() || time_secs <= 0.0 || !(scale > 0.0) {
        return 0;
    }
    (time_secs * scale).round() as u64
}

/// Time in seconds at pixel offset `px`, inverse of [`pixel_of`] up to rounding
pub fn time_of(px: f64, pixels_per_second: f64, device_pixel_ratio: f64) -> f64 {
    let scale = pixels_per_second * device_pixel_ratio;
    if !px.is_finite() || px <= 0.0 || !(scale > 0.0) {
        return 0.0;
    }
    px / scale
}

/// Immutable time/pixel/frame mapping for one zoom level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pixels_per_second: f64,
    device_pixel_ratio: f64,
}

impl TimeAxis {
    /// Create an axis, rejecting non-positive or non-finite scales
    pub fn new(pixels_per_second: f64, device_pixel_ratio: f64) -> VizResult<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(pixels_per_second) || !valid(device_pixel_ratio) {
            return Err(VizError::InvalidScale {
                pixels_per_second,
                device_pixel_ratio,
            });
        }
        Ok(Self {
            pixels_per_second,
            device_pixel_ratio,
        })
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Physical pixels per second of audio
    pub fn scale(&self) -> f64 {
        self.pixels_per_second * self.device_pixel_ratio
    }

    /// Same axis at a different zoom factor
    pub fn with_zoom(&self, pixels_per_second: f64) -> VizResult<Self> {
        Self::new(pixels_per_second, self.device_pixel_ratio)
    }

    pub fn pixel_of(&self, time_secs: f64) -> u64 {
        pixel_of(time_secs, self.pixels_per_second, self.device_pixel_ratio)
    }

    pub fn time_of(&self, px: f64) -> f64 {
        time_of(px, self.pixels_per_second, self.device_pixel_ratio)
    }

    /// Total content width for a recording of `duration_secs`
    pub fn content_width(&self, duration_secs: f64) -> u64 {
        self.pixel_of(duration_secs)
    }

    /// Frame index nearest to `time_secs` for a series sampled at `frame_rate`
    pub fn frame_of(time_secs: f64, frame_rate: f64) -> usize {
        if !time_secs.is_finite() || time_secs <= 0.0 || !(frame_rate > 0.0) {
            return 0;
        }
        (time_secs * frame_rate).round() as usize
    }

    /// Start time of frame `index`
    pub fn time_of_frame(index: usize, frame_rate: f64) -> f64 {
        if !(frame_rate > 0.0) {
            return 0.0;
        }
        index as f64 / frame_rate
    }
}

impl Default for TimeAxis {
    fn default() -> Self {
        Self {
            pixels_per_second: DEFAULT_PIXELS_PER_SECOND,
            device_pixel_ratio: 1.0,
        }
    }
}
