//! Fixed-rate discrete series
//!
//! A series is loaded once per session and replaced wholesale when a new
//! session is selected, so samples live behind an `Arc` and clones are cheap.

use std::sync::Arc;

use crate::time_axis::TimeAxis;

/// Default frame rate of model output (frames per second)
pub const DEFAULT_FRAME_RATE: f64 = 50.0;

/// Immutable fixed-rate sequence of samples
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    samples: Arc<[f32]>,
    frame_rate: f64,
}

impl Series {
    /// Create a series sampled at `frame_rate` frames per second
    ///
    /// Non-positive frame rates fall back to [`DEFAULT_FRAME_RATE`].
    pub fn new(samples: Vec<f32>, frame_rate: f64) -> Self {
        Self::from_shared(samples.into(), frame_rate)
    }

    /// Create a series spread evenly across `duration_secs` of audio
    ///
    /// The frame rate is derived as `len / duration`. Used once the playback
    /// engine reports the real audio duration.
    pub fn fitted(samples: Vec<f32>, duration_secs: f64) -> Self {
        Self::fitted_shared(samples.into(), duration_secs)
    }

    fn fitted_shared(samples: Arc<[f32]>, duration_secs: f64) -> Self {
        let frame_rate = if duration_secs > 0.0 && !samples.is_empty() {
            samples.len() as f64 / duration_secs
        } else {
            DEFAULT_FRAME_RATE
        };
        Self::from_shared(samples, frame_rate)
    }

    fn from_shared(samples: Arc<[f32]>, frame_rate: f64) -> Self {
        let frame_rate = if frame_rate.is_finite() && frame_rate > 0.0 {
            frame_rate
        } else {
            DEFAULT_FRAME_RATE
        };
        Self {
            samples,
            frame_rate,
        }
    }

    /// Single constant sample, used to blank a surface while loading
    pub fn flat(value: f32) -> Self {
        Self::new(vec![value], DEFAULT_FRAME_RATE)
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), DEFAULT_FRAME_RATE)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Duration covered by the series (`len / frame_rate`)
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.frame_rate
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.samples.get(index).copied()
    }

    /// Sample nearest to `time_secs`, clamped to the last frame
    pub fn value_at_time(&self, time_secs: f64) -> Option<f32> {
        let last = self.samples.len().checked_sub(1)?;
        let index = TimeAxis::frame_of(time_secs, self.frame_rate).min(last);
        self.get(index)
    }

    /// Same samples re-timed to span `duration_secs`
    pub fn refit(&self, duration_secs: f64) -> Self {
        Self::fitted_shared(self.samples.clone(), duration_secs)
    }
}

impl Default for Series {
    fn default() -> Self {
        Self::empty()
    }
}
