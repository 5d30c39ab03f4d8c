//! VAP Core - Timeline engine for turn-taking probability visualization
//!
//! Keeps a zoomed main view, an overview strip, per-track bar rasters and the
//! ranked-candidate panel consistent with one moving playback position.
//! Toolkit independent: drawing goes through the [`render::Surface`] trait.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod overview;
pub mod render;
pub mod selector;
pub mod series;
pub mod session;
pub mod time_axis;
pub mod viewport;

pub use coordinator::{PlaybackEngine, RenderCoordinator, TrackFrame, TrackRaster};
pub use error::{VizError, VizResult};
pub use series::Series;
pub use session::{RankedSnapshot, SessionData, SessionError, TrackKind};
pub use time_axis::TimeAxis;
