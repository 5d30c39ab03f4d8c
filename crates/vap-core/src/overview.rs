//! Overview strip and viewport indicator
//!
//! The overview shows the whole timeline in a fixed width. The indicator is
//! the main view's visible window scaled down by
//! `ratio = main total width / overview width`.
//!
//! Two directions, never both at once:
//! - main to overview (`sync_from_main`) runs only when no drag is active
//! - overview to main (`drag_to`) runs only during a drag, and hands the
//!   caller a main-view position instead of writing it

use crate::error::{VizError, VizResult};
use crate::viewport::Viewport;

/// Pointer travel below which a press/release pair counts as a click
pub const CLICK_TOLERANCE_PX: f64 = 0.5;

/// Indicator rectangle in overview pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverviewIndicator {
    pub position_px: f64,
    pub width_px: f64,
}

/// Result of releasing the pointer over the overview
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    /// Pointer did not move: seek to this fraction of the recording
    Seek(f64),
    /// An indicator drag finished
    DragEnded,
    /// No gesture was in progress
    Ignored,
}

/// Pointer gesture in progress
#[derive(Debug, Clone, Copy, PartialEq)]
struct Gesture {
    press_x: f64,
    /// Pointer offset inside the indicator; `None` when the press missed it
    grab_offset: Option<f64>,
}

/// Owns the indicator and the overview/main ratio
#[derive(Debug, Clone)]
pub struct OverviewController {
    overview_width: f64,
    ratio: f64,
    indicator: OverviewIndicator,
    gesture: Option<Gesture>,
    /// Indicator moves caused by the main view
    sync_count: u64,
}

impl OverviewController {
    pub fn new(overview_width: f64) -> VizResult<Self> {
        validate_width(overview_width)?;
        Ok(Self {
            overview_width,
            ratio: 1.0,
            indicator: OverviewIndicator {
                position_px: 0.0,
                width_px: overview_width,
            },
            gesture: None,
            sync_count: 0,
        })
    }

    pub fn overview_width(&self) -> f64 {
        self.overview_width
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn indicator(&self) -> &OverviewIndicator {
        &self.indicator
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some_and(|g| g.grab_offset.is_some())
    }

    pub fn sync_count(&self) -> u64 {
        self.sync_count
    }

    /// Overview surface changed width
    pub fn resize(&mut self, overview_width: f64, main: &Viewport) -> VizResult<()> {
        validate_width(overview_width)?;
        self.overview_width = overview_width;
        self.relayout(main);
        Ok(())
    }

    /// Recompute ratio and indicator width after a main-view geometry change
    pub fn relayout(&mut self, main: &Viewport) {
        self.ratio = if main.total_width_px > 0 {
            main.total_width_px as f64 / self.overview_width
        } else {
            1.0
        };
        self.indicator.width_px = (main.visible_width_px as f64 / self.ratio).min(self.overview_width);
        let position = if self.is_dragging() {
            self.indicator.position_px
        } else {
            main.visible_start_px as f64 / self.ratio
        };
        self.move_indicator(position);
        log::debug!(
            "OverviewController: ratio={:.3} indicator={:.1}px@{:.1}",
            self.ratio,
            self.indicator.width_px,
            self.indicator.position_px
        );
    }

    /// Follow the main view's scroll position
    ///
    /// Returns false without touching the indicator while a drag owns it.
    pub fn sync_from_main(&mut self, main: &Viewport) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.move_indicator(main.visible_start_px as f64 / self.ratio);
        self.sync_count += 1;
        true
    }

    fn move_indicator(&mut self, position_px: f64) {
        let max = (self.overview_width - self.indicator.width_px).max(0.0);
        self.indicator.position_px = if position_px.is_finite() {
            position_px.clamp(0.0, max)
        } else {
            0.0
        };
    }

    /// Main-view start for the current indicator position
    pub fn main_start_px(&self) -> u32 {
        (self.indicator.position_px * self.ratio).round().max(0.0) as u32
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.indicator.position_px && x <= self.indicator.position_px + self.indicator.width_px
    }

    // =========================================================================
    // Pointer gestures
    // =========================================================================

    /// Pointer pressed. Returns true if this started an indicator drag.
    pub fn press(&mut self, x: f64) -> bool {
        let grab_offset = self
            .contains(x)
            .then(|| x - self.indicator.position_px);
        self.gesture = Some(Gesture {
            press_x: x,
            grab_offset,
        });
        grab_offset.is_some()
    }

    /// Pointer moved
    ///
    /// During a drag, moves the indicator and returns the main-view start the
    /// caller should apply. Otherwise returns `None`.
    pub fn drag_to(&mut self, x: f64) -> Option<u32> {
        let grab_offset = self.gesture?.grab_offset?;
        self.move_indicator(x - grab_offset);
        Some(self.main_start_px())
    }

    /// Pointer released
    ///
    /// An indicator drag ends without seeking unless the pointer stayed
    /// within `CLICK_TOLERANCE_PX` of the press. A press that missed the
    /// indicator always seeks to the release position.
    pub fn release(&mut self, x: f64) -> ReleaseOutcome {
        let Some(gesture) = self.gesture.take() else {
            return ReleaseOutcome::Ignored;
        };
        let is_click = (x - gesture.press_x).abs() < CLICK_TOLERANCE_PX;
        if gesture.grab_offset.is_some() && !is_click {
            return ReleaseOutcome::DragEnded;
        }
        let fraction = (x / self.overview_width).clamp(0.0, 1.0);
        ReleaseOutcome::Seek(if fraction.is_finite() { fraction } else { 0.0 })
    }

    /// Pointer left the overview; abandon the gesture without seeking
    pub fn cancel_drag(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.gesture = None;
        was_dragging
    }
}

fn validate_width(overview_width: f64) -> VizResult<()> {
    if !(overview_width.is_finite() && overview_width > 0.0) {
        return Err(VizError::InvalidOverviewWidth(overview_width));
    }
    Ok(())
}
