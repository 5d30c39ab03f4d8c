//! Timeline display state
//!
//! Pure data captured from a [`RenderCoordinator`] after each update. View
//! functions borrow it, so drawing never touches the coordinator's cells.

use vap_core::config::{DisplayConfig, Theme};
use vap_core::overview::OverviewIndicator;
use vap_core::viewport::Viewport;
use vap_core::{RankedSnapshot, RenderCoordinator, TrackFrame, TrackKind};

/// Track the overview thumbnail is drawn from
pub const OVERVIEW_TRACK: TrackKind = TrackKind::NowA;

/// Everything the timeline widgets draw
#[derive(Debug, Clone)]
pub struct TimelineState {
    /// Track rasters (voice activity already blended in) and thumbnails
    pub tracks: Vec<TrackFrame>,
    pub viewport: Viewport,
    /// Content wider than the main view
    pub scrollable: bool,
    pub indicator: OverviewIndicator,
    /// Width the overview controller lays out against
    pub overview_width: f64,
    pub duration_secs: f64,
    pub loading: bool,
    pub playing: bool,
    pub theme: Theme,
    pub display: DisplayConfig,
    /// Ranked candidates at the playback position
    pub snapshot: Option<RankedSnapshot>,
}

impl TimelineState {
    pub fn capture(coordinator: &RenderCoordinator) -> Self {
        Self {
            tracks: coordinator.track_frames(),
            viewport: coordinator.viewport(),
            scrollable: coordinator.is_scrollable(),
            indicator: coordinator.indicator(),
            overview_width: coordinator.overview_width(),
            duration_secs: coordinator.duration_secs(),
            loading: coordinator.is_loading(),
            playing: coordinator.is_playing(),
            theme: coordinator.theme(),
            display: coordinator.display(),
            snapshot: coordinator.current_snapshot(),
        }
    }

    pub fn track(&self, kind: TrackKind) -> Option<&TrackFrame> {
        self.tracks.iter().find(|track| track.kind == kind)
    }

    /// Track shown in the overview, falling back to the first one
    pub fn overview_track(&self) -> Option<&TrackFrame> {
        self.track(OVERVIEW_TRACK).or_else(|| self.tracks.first())
    }

    /// Playback position as a fraction of the recording
    pub fn progress(&self) -> f64 {
        self.viewport.progress_fraction()
    }
}
