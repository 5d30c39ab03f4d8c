//! Visualizer configuration
//!
//! Configuration is stored as YAML in the user's config directory.
//! Default location: ~/.config/vap-viz/config.yaml
//!
//! # Usage
//!
//! ```ignore
//! use vap_core::config::{default_config_path, load_config, VisualizerConfig};
//!
//! let config: VisualizerConfig = load_config(&default_config_path());
//! ```

mod io;
mod theme;

pub use io::{default_config_path, load_config, parse_config};
pub use theme::{ColorParseError, PartyColors, Rgba, Theme};

use serde::{Deserialize, Serialize};

use crate::series::DEFAULT_FRAME_RATE;
use crate::time_axis::DEFAULT_PIXELS_PER_SECOND;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Layout and timing
    pub display: DisplayConfig,
    /// Colors
    pub theme: Theme,
    /// Ranked-candidate panel
    pub topk: TopkConfig,
}

/// Display configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Initial zoom factor (CSS pixels per second of audio)
    pub pixels_per_second: f64,
    /// Physical pixels per CSS pixel
    pub device_pixel_ratio: f64,
    /// Height of each probability track in pixels
    pub track_height: u32,
    /// Height of the overview strip in pixels
    pub overview_height: u32,
    /// Keep the playback cursor centered in the main view
    pub auto_center: bool,
    /// Widest raster kept per track; larger timelines are drawn in windows
    pub max_canvas_width: u32,
    /// Quiet period before a burst of resize notifications is applied
    pub resize_debounce_ms: u64,
    /// Frame rate assumed for series before the audio duration is known
    pub frame_rate: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            pixels_per_second: DEFAULT_PIXELS_PER_SECOND,
            device_pixel_ratio: 1.0,
            track_height: 100,
            overview_height: 50,
            auto_center: true,
            max_canvas_width: 4000,
            resize_debounce_ms: 150,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

/// Top-k panel configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopkConfig {
    /// Number of ranked candidates exposed for display (0 hides the panel)
    pub visible: usize,
}

/// Choices offered by the top-k toggle
pub const TOPK_OPTIONS: [usize; 3] = [0, 5, 10];

impl Default for TopkConfig {
    fn default() -> Self {
        Self { visible: 5 }
    }
}
