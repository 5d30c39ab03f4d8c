//! Main view scroll state
//!
//! The main view shows a window of `visible_width_px` pixels into a timeline
//! of `total_width_px` pixels. `ViewportController` is the only writer of the
//! window position; the overview reads it and, during a drag, asks the
//! controller to move it.
//!
//! Writers per transition:
//! - playback time update: auto-center (skipped while dragging, or when the
//!   user scrolled in the same coordinator pass)
//! - user scroll: direct position
//! - overview drag: direct position, only while `Dragging`
//! - zoom / resize / duration: geometry, then clamp

use crate::error::VizResult;
use crate::render::fit_width;
use crate::time_axis::TimeAxis;

/// Interaction state of the main view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewportMode {
    /// Following playback
    #[default]
    Idle,
    /// Last position came from a user scroll
    Scrolling,
    /// Overview indicator drag owns the position
    Dragging,
}

/// Visible window of the main view
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// First visible content pixel
    pub visible_start_px: u32,
    /// Width of the visible window
    pub visible_width_px: u32,
    /// Width of the whole rendered timeline
    pub total_width_px: u32,
    pub pixels_per_second: f64,
    pub device_pixel_ratio: f64,
    /// Content pixel of the playback cursor
    pub cursor_px: u32,
}

impl Viewport {
    /// Largest valid `visible_start_px`
    pub fn max_start(&self) -> u32 {
        self.total_width_px.saturating_sub(self.visible_width_px)
    }

    pub fn visible_end_px(&self) -> u32 {
        (self.visible_start_px + self.visible_width_px).min(self.total_width_px)
    }

    /// Played portion of the timeline in `[0, 1]`
    pub fn progress_fraction(&self) -> f64 {
        if self.total_width_px == 0 {
            return 0.0;
        }
        (self.cursor_px as f64 / self.total_width_px as f64).clamp(0.0, 1.0)
    }

    /// Cursor position relative to the visible window, if it is on screen
    pub fn cursor_in_window(&self) -> Option<u32> {
        (self.cursor_px >= self.visible_start_px && self.cursor_px < self.visible_end_px())
            .then(|| self.cursor_px - self.visible_start_px)
    }
}

/// What an operation changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportChange {
    /// `visible_start_px` moved
    pub scrolled: bool,
    /// Content geometry changed; cached rasters are stale
    pub geometry: bool,
    /// Cursor pixel moved
    pub cursor: bool,
}

impl ViewportChange {
    pub fn any(&self) -> bool {
        self.scrolled || self.geometry || self.cursor
    }
}

/// Owns the main view's scroll position and geometry
#[derive(Debug, Clone)]
pub struct ViewportController {
    viewport: Viewport,
    axis: TimeAxis,
    /// Width of the view on screen, independent of content
    view_width_px: u32,
    /// Content width at the current zoom before stretching
    natural_width_px: u32,
    scrollable: bool,
    duration_secs: f64,
    current_time_secs: f64,
    auto_center: bool,
    mode: ViewportMode,
    /// Coordinator pass of the most recent user scroll
    user_scroll_pass: Option<u64>,
}

impl ViewportController {
    pub fn new(axis: TimeAxis, view_width_px: u32, auto_center: bool) -> Self {
        let mut controller = Self {
            viewport: Viewport {
                pixels_per_second: axis.pixels_per_second(),
                device_pixel_ratio: axis.device_pixel_ratio(),
                ..Viewport::default()
            },
            axis,
            view_width_px,
            natural_width_px: 0,
            scrollable: false,
            duration_secs: 0.0,
            current_time_secs: 0.0,
            auto_center,
            mode: ViewportMode::Idle,
            user_scroll_pass: None,
        };
        controller.relayout();
        controller
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    pub fn mode(&self) -> ViewportMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.mode == ViewportMode::Dragging
    }

    /// False when the content is stretched to fit the view
    pub fn is_scrollable(&self) -> bool {
        self.scrollable
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn current_time_secs(&self) -> f64 {
        self.current_time_secs
    }

    pub fn view_width_px(&self) -> u32 {
        self.view_width_px
    }

    pub fn auto_center(&self) -> bool {
        self.auto_center
    }

    pub fn set_auto_center(&mut self, auto_center: bool) {
        self.auto_center = auto_center;
    }

    /// Time under a content pixel
    pub fn time_at_px(&self, px: u32) -> f64 {
        if self.viewport.total_width_px == 0 || self.duration_secs <= 0.0 {
            return 0.0;
        }
        let fraction = (px as f64 / self.viewport.total_width_px as f64).min(1.0);
        fraction * self.duration_secs
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Recompute content width and clamp the window
    fn relayout(&mut self) {
        self.natural_width_px = clamp_u32(self.axis.content_width(self.duration_secs));
        let (total, scrollable) = fit_width(self.natural_width_px, self.view_width_px);
        self.scrollable = scrollable;
        self.viewport.total_width_px = total;
        self.viewport.visible_width_px = self.view_width_px.min(total);
        self.viewport.pixels_per_second = self.axis.pixels_per_second();
        self.viewport.device_pixel_ratio = self.axis.device_pixel_ratio();
        self.viewport.cursor_px = self.cursor_px_for(self.current_time_secs);
        self.viewport.visible_start_px = self.viewport.visible_start_px.min(self.viewport.max_start());
        log::debug!(
            "ViewportController: total={}px visible={}px scrollable={}",
            total,
            self.viewport.visible_width_px,
            scrollable
        );
    }

    fn cursor_px_for(&self, time_secs: f64) -> u32 {
        let total = self.viewport.total_width_px;
        if self.natural_width_px == total {
            clamp_u32(self.axis.pixel_of(time_secs)).min(total)
        } else if self.duration_secs > 0.0 && time_secs > 0.0 {
            // Stretched content: map by fraction of the recording
            ((time_secs / self.duration_secs).min(1.0) * total as f64).round() as u32
        } else {
            0
        }
    }

    /// Move the window start, clamped. Returns true if it moved.
    fn scroll_to(&mut self, start_px: u32) -> bool {
        let start = start_px.min(self.viewport.max_start());
        let moved = start != self.viewport.visible_start_px;
        self.viewport.visible_start_px = start;
        moved
    }

    fn center_on_cursor(&mut self) -> bool {
        let start = self
            .viewport
            .cursor_px
            .saturating_sub(self.viewport.visible_width_px / 2);
        self.scroll_to(start)
    }

    fn geometry_change<F: FnOnce(&mut Self)>(&mut self, apply: F) -> ViewportChange {
        let before = self.viewport;
        apply(self);
        self.relayout();
        if self.auto_center && self.mode != ViewportMode::Dragging {
            self.center_on_cursor();
        }
        ViewportChange {
            scrolled: before.visible_start_px != self.viewport.visible_start_px,
            geometry: before.total_width_px != self.viewport.total_width_px
                || before.visible_width_px != self.viewport.visible_width_px
                || before.pixels_per_second != self.viewport.pixels_per_second,
            cursor: before.cursor_px != self.viewport.cursor_px,
        }
    }

    /// Set the recording length once the engine reports it
    pub fn set_duration(&mut self, duration_secs: f64) -> ViewportChange {
        let duration = if duration_secs.is_finite() && duration_secs > 0.0 {
            duration_secs
        } else {
            0.0
        };
        self.geometry_change(|c| c.duration_secs = duration)
    }

    /// Change the zoom factor
    ///
    /// Without auto-center the time at the left edge stays put.
    pub fn set_zoom(&mut self, pixels_per_second: f64) -> VizResult<ViewportChange> {
        let axis = self.axis.with_zoom(pixels_per_second)?;
        let left_time = self.time_at_px(self.viewport.visible_start_px);
        Ok(self.geometry_change(|c| {
            c.axis = axis;
            c.viewport.visible_start_px = clamp_u32(axis.pixel_of(left_time));
        }))
    }

    /// The view itself changed width
    pub fn resize(&mut self, view_width_px: u32) -> ViewportChange {
        if view_width_px == self.view_width_px {
            return ViewportChange::default();
        }
        self.geometry_change(|c| c.view_width_px = view_width_px)
    }

    // =========================================================================
    // Position
    // =========================================================================

    /// Playback moved
    ///
    /// Always moves the cursor. Re-centers only when auto-center is on, no
    /// drag is active, and no user scroll happened in the same `pass`.
    pub fn on_time_update(&mut self, time_secs: f64, pass: u64) -> ViewportChange {
        self.current_time_secs = time_secs.max(0.0);
        let cursor_px = self.cursor_px_for(self.current_time_secs);
        let cursor = cursor_px != self.viewport.cursor_px;
        self.viewport.cursor_px = cursor_px;

        let mut scrolled = false;
        if self.auto_center && self.scrollable && self.mode != ViewportMode::Dragging {
            if self.user_scroll_pass == Some(pass) {
                log::trace!("ViewportController: pass {} has a user scroll, not re-centering", pass);
            } else {
                scrolled = self.center_on_cursor();
                self.mode = ViewportMode::Idle;
            }
        }
        ViewportChange {
            scrolled,
            geometry: false,
            cursor,
        }
    }

    /// User scrolled the main view
    ///
    /// Ignored while an overview drag owns the position.
    pub fn on_user_scroll(&mut self, start_px: u32, pass: u64) -> ViewportChange {
        if self.mode == ViewportMode::Dragging {
            log::trace!("ViewportController: scroll to {} ignored during drag", start_px);
            return ViewportChange::default();
        }
        self.mode = ViewportMode::Scrolling;
        self.user_scroll_pass = Some(pass);
        ViewportChange {
            scrolled: self.scroll_to(start_px),
            ..ViewportChange::default()
        }
    }

    /// Overview drag started
    pub fn begin_drag(&mut self) {
        self.mode = ViewportMode::Dragging;
    }

    /// Position pushed from the overview indicator during a drag
    pub fn apply_drag(&mut self, start_px: u32) -> ViewportChange {
        if self.mode != ViewportMode::Dragging {
            return ViewportChange::default();
        }
        ViewportChange {
            scrolled: self.scroll_to(start_px),
            ..ViewportChange::default()
        }
    }

    /// Overview drag finished or was cancelled
    pub fn end_drag(&mut self) {
        if self.mode == ViewportMode::Dragging {
            self.mode = ViewportMode::Idle;
        }
    }

    /// Jump to a fraction of the recording and center the view on it
    ///
    /// Centers regardless of the auto-center setting. Returns the new time.
    pub fn seek_and_center(&mut self, fraction: f64) -> (f64, ViewportChange) {
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        let time = fraction * self.duration_secs;
        self.current_time_secs = time;
        let cursor_px = self.cursor_px_for(time);
        let cursor = cursor_px != self.viewport.cursor_px;
        self.viewport.cursor_px = cursor_px;
        self.mode = ViewportMode::Idle;
        let scrolled = self.center_on_cursor();
        (
            time,
            ViewportChange {
                scrolled,
                geometry: false,
                cursor,
            },
        )
    }
}

fn clamp_u32(px: u64) -> u32 {
    px.min(u32::MAX as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 100 px/s, 1000 px view
    fn controller(duration: f64) -> ViewportController {
        let mut c = ViewportController::new(TimeAxis::new(100.0, 1.0).unwrap(), 1000, true);
        c.set_duration(duration);
        c
    }

    #[test]
    fn test_geometry_from_duration() {
        let c = controller(60.0);
        assert_eq!(c.viewport().total_width_px, 6000);
        assert_eq!(c.viewport().visible_width_px, 1000);
        assert!(c.is_scrollable());
    }

    #[test]
    fn test_short_recording_is_stretched() {
        let c = controller(4.0);
        assert_eq!(c.viewport().total_width_px, 1000, "400 px stretched to the view");
        assert!(!c.is_scrollable());
        assert_eq!(c.viewport().max_start(), 0);
    }

    #[test]
    fn test_stretched_cursor_maps_by_fraction() {
        let mut c = controller(4.0);
        c.on_time_update(2.0, 1);
        assert_eq!(c.viewport().cursor_px, 500);
        assert!((c.viewport().progress_fraction() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_time_update_centers_cursor() {
        let mut c = controller(60.0);
        let change = c.on_time_update(30.0, 1);
        assert!(change.scrolled && change.cursor);
        assert_eq!(c.viewport().cursor_px, 3000);
        assert_eq!(c.viewport().visible_start_px, 2500);
        assert_eq!(c.viewport().cursor_in_window(), Some(500));
    }

    #[test]
    fn test_time_update_clamps_at_edges() {
        let mut c = controller(60.0);
        c.on_time_update(1.0, 1);
        assert_eq!(c.viewport().visible_start_px, 0);
        c.on_time_update(59.9, 2);
        assert_eq!(c.viewport().visible_start_px, 5000);
        c.on_time_update(1000.0, 3);
        assert_eq!(c.viewport().cursor_px, 6000, "cursor clamps to content");
    }

    #[test]
    fn test_no_auto_center_leaves_window() {
        let mut c = ViewportController::new(TimeAxis::new(100.0, 1.0).unwrap(), 1000, false);
        c.set_duration(60.0);
        let change = c.on_time_update(30.0, 1);
        assert!(!change.scrolled);
        assert_eq!(c.viewport().visible_start_px, 0);
    }

    #[test]
    fn test_user_scroll_wins_within_pass() {
        let mut c = controller(60.0);
        c.on_user_scroll(4000, 7);
        assert_eq!(c.mode(), ViewportMode::Scrolling);

        // Same pass: cursor moves, window stays
        let change = c.on_time_update(10.0, 7);
        assert!(!change.scrolled);
        assert_eq!(c.viewport().visible_start_px, 4000);

        // Next pass: playback takes over again
        c.on_time_update(10.0, 8);
        assert_eq!(c.viewport().visible_start_px, 500);
        assert_eq!(c.mode(), ViewportMode::Idle);
    }

    #[test]
    fn test_user_scroll_clamps() {
        let mut c = controller(60.0);
        c.on_user_scroll(99_999, 1);
        assert_eq!(c.viewport().visible_start_px, 5000);
    }

    #[test]
    fn test_drag_owns_position() {
        let mut c = controller(60.0);
        assert!(!c.apply_drag(2000).scrolled, "no drag active");

        c.begin_drag();
        assert!(c.apply_drag(2000).scrolled);
        assert!(!c.on_user_scroll(100, 1).scrolled, "scroll echo ignored");
        assert!(!c.on_time_update(50.0, 2).scrolled, "playback does not re-center");
        assert_eq!(c.viewport().visible_start_px, 2000);

        c.end_drag();
        assert_eq!(c.mode(), ViewportMode::Idle);
    }

    #[test]
    fn test_zoom_rescales_geometry() {
        let mut c = controller(60.0);
        c.on_time_update(30.0, 1);
        let change = c.set_zoom(200.0).unwrap();
        assert!(change.geometry);
        assert_eq!(c.viewport().total_width_px, 12000);
        assert_eq!(c.viewport().cursor_px, 6000);
        assert_eq!(c.viewport().visible_start_px, 5500, "re-centered on the cursor");

        assert!(c.set_zoom(0.0).is_err());
        assert_eq!(c.viewport().pixels_per_second, 200.0, "failed zoom keeps state");
    }

    #[test]
    fn test_zoom_without_auto_center_keeps_left_edge() {
        let mut c = ViewportController::new(TimeAxis::new(100.0, 1.0).unwrap(), 1000, false);
        c.set_duration(60.0);
        c.on_user_scroll(1000, 1);
        c.set_zoom(50.0).unwrap();
        assert_eq!(c.viewport().visible_start_px, 500, "10 s stays at the left edge");
    }

    #[test]
    fn test_resize_same_width_is_noop() {
        let mut c = controller(60.0);
        assert!(!c.resize(1000).any());

        let change = c.resize(2000);
        assert!(change.geometry);
        assert_eq!(c.viewport().visible_width_px, 2000);
        assert_eq!(c.viewport().max_start(), 4000);
    }

    #[test]
    fn test_seek_and_center() {
        let mut c = ViewportController::new(TimeAxis::new(100.0, 1.0).unwrap(), 1000, false);
        c.set_duration(60.0);
        let (time, change) = c.seek_and_center(1.0);
        assert_eq!(time, 60.0);
        assert!(change.scrolled);
        assert_eq!(c.viewport().visible_start_px, 5000);

        let (time, _) = c.seek_and_center(0.0);
        assert_eq!(time, 0.0);
        assert_eq!(c.viewport().visible_start_px, 0);
    }

    #[test]
    fn test_zero_duration_is_safe() {
        let mut c = controller(0.0);
        assert_eq!(c.viewport().total_width_px, 1000);
        c.on_time_update(5.0, 1);
        assert_eq!(c.viewport().cursor_px, 0);
        assert_eq!(c.time_at_px(500), 0.0);
    }
}
