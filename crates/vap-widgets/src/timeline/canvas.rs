//! Canvas Program implementations for the timeline
//!
//! The track canvas shows the coordinator's cached rasters for the visible
//! window and turns wheel input into user scrolls. The overview canvas draws
//! the whole recording with the viewport indicator and reports pointer
//! gestures.

use std::cell::Cell;

use iced::widget::canvas::{self, Event, Frame, Geometry, Path, Program, Stroke};
use iced::{mouse, Point, Rectangle, Size, Theme};
use vap_core::overview::OverviewIndicator;
use vap_core::render::{BarLayout, SeriesRenderer, Surface};
use vap_core::viewport::Viewport;
use vap_core::{TrackFrame, TrackRaster};

use crate::color::to_iced;
use crate::surface::FrameSurface;

/// Pixels scrolled per wheel line
pub const SCROLL_LINE_PX: f32 = 40.0;

/// Width of the playback cursor line
const CURSOR_WIDTH: f32 = 2.0;

// =============================================================================
// Canvas Interaction States
// =============================================================================

/// Canvas state for a track: bar geometry cached until the raster or the
/// window changes
#[derive(Default)]
pub struct TrackInteraction {
    cache: canvas::Cache,
    drawn: Cell<Option<DrawKey>>,
}

/// Inputs the cached bar geometry was built from
#[derive(Debug, Clone, PartialEq)]
struct DrawKey {
    revision: u64,
    slices: Vec<RasterSlice>,
    size: (u32, u32),
}

/// Canvas state for the overview pointer gesture
#[derive(Debug, Clone, Copy, Default)]
pub struct OverviewInteraction {
    /// Left button went down inside the overview and has not been released
    pub is_pressed: bool,
}

/// Pointer gesture on the overview, in overview pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverviewGesture {
    Press(f64),
    Drag(f64),
    Release(f64),
    /// Pointer left the overview mid-gesture
    Cancel,
}

// =============================================================================
// Geometry helpers
// =============================================================================

/// Window of the content currently shown by the main view
pub fn visible_layout(viewport: &Viewport) -> Option<BarLayout> {
    BarLayout::new(
        viewport.total_width_px,
        viewport.visible_start_px,
        viewport.visible_end_px(),
    )
    .ok()
}

/// Run of raster columns copied to the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterSlice {
    /// Taken from the played-color raster
    pub played: bool,
    pub src_start: u32,
    pub src_end: u32,
    /// Destination column relative to the visible window
    pub dest_x: u32,
}

/// Raster columns for the visible window, played part first
///
/// Empty when the cached window does not cover the view.
pub fn raster_slices(raster: &TrackRaster, viewport: &Viewport) -> Vec<RasterSlice> {
    let start = viewport.visible_start_px;
    let end = viewport.visible_end_px();
    let Some(column) = raster.column_of(start, end) else {
        return Vec::new();
    };
    let width = end - start;
    let played = viewport.cursor_px.clamp(start, end) - start;
    [(true, 0, played), (false, played, width)]
        .into_iter()
        .filter(|&(_, from, to)| to > from)
        .map(|(played, from, to)| RasterSlice {
            played,
            src_start: column + from,
            src_end: column + to,
            dest_x: from,
        })
        .collect()
}

/// New scroll position after a wheel movement of `delta` pixels
///
/// Positive deltas move towards the start, as wheel-up does.
pub fn scroll_target(start_px: u32, max_start: u32, delta: f32) -> u32 {
    let target = (start_px as f64 - delta as f64).round();
    target.clamp(0.0, max_start as f64) as u32
}

/// Dominant axis of a wheel movement, in pixels
pub fn wheel_delta(delta: &mouse::ScrollDelta) -> f32 {
    let (x, y) = match *delta {
        mouse::ScrollDelta::Lines { x, y } => (x * SCROLL_LINE_PX, y * SCROLL_LINE_PX),
        mouse::ScrollDelta::Pixels { x, y } => (x, y),
    };
    if x.abs() > y.abs() {
        x
    } else {
        y
    }
}

/// Map a position inside the widget to overview controller pixels
pub fn to_overview_x(x: f32, widget_width: f32, overview_width: f64) -> f64 {
    if widget_width <= 0.0 {
        return 0.0;
    }
    (x as f64 / widget_width as f64 * overview_width).clamp(0.0, overview_width)
}

// =============================================================================
// Track Canvas Program
// =============================================================================

/// Canvas program for one track of the main view
///
/// Takes a callback `on_scroll` that is called with the requested left edge
/// (content pixels) when the wheel moves over a scrollable timeline.
pub struct TrackCanvas<'a, Message, F>
where
    F: Fn(u32) -> Message,
{
    pub track: &'a TrackFrame,
    pub viewport: Viewport,
    pub scrollable: bool,
    pub theme: &'a vap_core::config::Theme,
    pub on_scroll: F,
}

impl<'a, Message, F> TrackCanvas<'a, Message, F>
where
    F: Fn(u32) -> Message,
{
    fn draw_bars(&self, frame: &mut Frame, slices: &[RasterSlice], bounds: Rectangle) {
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), to_iced(self.theme.background));

        let raster = &self.track.raster;
        for slice in slices {
            let source = if slice.played { &raster.progress } else { &raster.pixels };
            let mut surface = FrameSurface::new(frame, slice.dest_x, slice.src_end - slice.src_start, source.height())
                .with_device_pixel_ratio(self.viewport.device_pixel_ratio)
                .fit_height(bounds.height);
            for (rect, color) in source.rects(slice.src_start, slice.src_end) {
                surface.fill_rect(rect, color);
            }
        }
    }
}

impl<'a, Message, F> Program<Message> for TrackCanvas<'a, Message, F>
where
    Message: Clone,
    F: Fn(u32) -> Message,
{
    type State = TrackInteraction;

    fn update(
        &self,
        _interaction: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        if !self.scrollable || !cursor.is_over(bounds) {
            return None;
        }
        if let Event::Mouse(mouse::Event::WheelScrolled { delta }) = event {
            let start = self.viewport.visible_start_px;
            let target = scroll_target(start, self.viewport.max_start(), wheel_delta(delta));
            if target != start {
                return Some(canvas::Action::publish((self.on_scroll)(target)).and_capture());
            }
        }
        None
    }

    fn draw(
        &self,
        interaction: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let slices = raster_slices(&self.track.raster, &self.viewport);
        let key = DrawKey {
            revision: self.track.revision,
            slices,
            size: (bounds.width.to_bits(), bounds.height.to_bits()),
        };
        if interaction.drawn.replace(Some(key.clone())).as_ref() != Some(&key) {
            log::trace!(
                "TrackCanvas: {} rebuilt (rev {})",
                self.track.kind.name(),
                self.track.revision
            );
            interaction.cache.clear();
        }
        let bars = interaction
            .cache
            .draw(renderer, bounds.size(), |frame| self.draw_bars(frame, &key.slices, bounds));

        let mut overlay = Frame::new(renderer, bounds.size());
        if let Some(x) = self.viewport.cursor_in_window() {
            let x = (x as f64 / self.viewport.device_pixel_ratio) as f32;
            overlay.stroke(
                &Path::line(Point::new(x, 0.0), Point::new(x, bounds.height)),
                Stroke::default()
                    .with_color(to_iced(self.theme.cursor))
                    .with_width(CURSOR_WIDTH),
            );
        }

        vec![bars, overlay.into_geometry()]
    }
}

// =============================================================================
// Overview Canvas Program
// =============================================================================

/// Canvas program for the overview strip
///
/// Takes a callback `on_gesture` that receives pointer gestures in the
/// overview controller's pixel space.
pub struct OverviewCanvas<'a, Message, F>
where
    F: Fn(OverviewGesture) -> Message,
{
    pub track: Option<&'a TrackFrame>,
    pub indicator: OverviewIndicator,
    pub overview_width: f64,
    /// Playback position as a fraction of the recording
    pub progress: f64,
    pub theme: &'a vap_core::config::Theme,
    pub on_gesture: F,
}

impl<'a, Message, F> Program<Message> for OverviewCanvas<'a, Message, F>
where
    Message: Clone,
    F: Fn(OverviewGesture) -> Message,
{
    type State = OverviewInteraction;

    fn update(
        &self,
        interaction: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let to_x = |position: Point| to_overview_x(position.x, bounds.width, self.overview_width);

        if let Some(position) = cursor.position_in(bounds) {
            match event {
                Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                    interaction.is_pressed = true;
                    let gesture = OverviewGesture::Press(to_x(position));
                    return Some(canvas::Action::publish((self.on_gesture)(gesture)));
                }
                Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                    if interaction.is_pressed {
                        interaction.is_pressed = false;
                        let gesture = OverviewGesture::Release(to_x(position));
                        return Some(canvas::Action::publish((self.on_gesture)(gesture)));
                    }
                }
                Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                    if interaction.is_pressed {
                        let gesture = OverviewGesture::Drag(to_x(position));
                        return Some(canvas::Action::publish((self.on_gesture)(gesture)));
                    }
                }
                _ => {}
            }
        } else if interaction.is_pressed
            && matches!(
                event,
                Event::Mouse(mouse::Event::CursorMoved { .. })
                    | Event::Mouse(mouse::Event::CursorLeft)
                    | Event::Mouse(mouse::Event::ButtonReleased(_))
            )
        {
            interaction.is_pressed = false;
            return Some(canvas::Action::publish((self.on_gesture)(OverviewGesture::Cancel)));
        }

        None
    }

    fn mouse_interaction(
        &self,
        interaction: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if interaction.is_pressed {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }

    fn draw(
        &self,
        _interaction: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), to_iced(self.theme.background));

        let width = bounds.width;
        let height = bounds.height;
        let pixel_width = width.round().max(0.0) as u32;

        // Whole recording squeezed to the strip
        if let (Some(track), Ok(layout)) = (self.track, BarLayout::full(pixel_width)) {
            let mut surface = FrameSurface::new(&mut frame, 0, pixel_width, bounds.height.round().max(0.0) as u32);
            if let Err(e) = track.renderer.render(&track.series, &layout, &mut surface) {
                log::warn!("OverviewCanvas: thumbnail not drawn: {}", e);
            }
        }

        // Played portion
        let played_x = (self.progress.clamp(0.0, 1.0) * width as f64) as f32;
        frame.fill_rectangle(
            Point::ORIGIN,
            Size::new(played_x, height),
            to_iced(self.theme.overview_overlay),
        );

        // Viewport indicator
        let scale = if self.overview_width > 0.0 {
            width as f64 / self.overview_width
        } else {
            0.0
        };
        let left = (self.indicator.position_px * scale) as f32;
        let indicator_width = (self.indicator.width_px * scale) as f32;
        if indicator_width > 0.0 {
            frame.fill_rectangle(
                Point::new(left, 0.0),
                Size::new(indicator_width, height),
                to_iced(self.theme.indicator_fill),
            );
            frame.stroke(
                &Path::rectangle(Point::new(left, 0.0), Size::new(indicator_width, height)),
                Stroke::default()
                    .with_color(to_iced(self.theme.indicator_border))
                    .with_width(1.0),
            );
        }

        frame.stroke(
            &Path::line(Point::new(played_x, 0.0), Point::new(played_x, height)),
            Stroke::default()
                .with_color(to_iced(self.theme.cursor))
                .with_width(CURSOR_WIDTH),
        );

        vec![frame.into_geometry()]
    }
}
