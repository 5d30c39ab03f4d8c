//! Error types for the visualization engine
//!
//! Only precondition violations are errors. Degenerate data (empty series,
//! zero duration) has defined fallback behavior and never reaches this type.

use thiserror::Error;

/// Errors raised when a caller breaks a drawing or geometry precondition
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VizError {
    /// Raster surface has no drawable area
    #[error("Invalid raster surface {width}x{height}: both dimensions must be positive")]
    InvalidSurface { width: u32, height: u32 },

    /// Zoom factor or pixel density is not a positive finite number
    #[error(
        "Invalid time scale: {pixels_per_second} px/s at device pixel ratio {device_pixel_ratio}"
    )]
    InvalidScale {
        pixels_per_second: f64,
        device_pixel_ratio: f64,
    },

    /// Overview surface width must be positive
    #[error("Invalid overview width {0}: must be positive")]
    InvalidOverviewWidth(f64),

    /// Raster window does not fit inside the content it is drawn from
    #[error("Raster window {start}..{end} lies outside content width {content_width}")]
    InvalidWindow {
        start: u32,
        end: u32,
        content_width: u32,
    },
}

/// Result alias for engine operations
pub type VizResult<T> = Result<T, VizError>;
