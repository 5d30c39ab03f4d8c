//! Bar chart rasterization
//!
//! A series of `N` samples is spread over `content_width` pixels. Sample `i`
//! owns the columns `[round(i * scale), round((i + 1) * scale))` with
//! `scale = content_width / N`. When the series is denser than the pixels,
//! samples whose range is empty are skipped, so each column is painted by
//! exactly one sample and no column is left blank.

use super::surface::{PixelRect, Surface};
use super::{ensure_drawable, SeriesRenderer};
use crate::config::Rgba;
use crate::error::{VizError, VizResult};
use crate::series::Series;

// =============================================================================
// Layout
// =============================================================================

/// Window of content pixels that one raster pass covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarLayout {
    /// Width of the whole rendered timeline
    content_width: u32,
    /// First content pixel drawn (inclusive)
    window_start: u32,
    /// Last content pixel drawn (exclusive)
    window_end: u32,
}

/// Columns painted by one sample, in window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpan {
    pub index: usize,
    pub x: u32,
    pub width: u32,
}

impl BarLayout {
    pub fn new(content_width: u32, window_start: u32, window_end: u32) -> VizResult<Self> {
        if window_start >= window_end || window_end > content_width {
            return Err(VizError::InvalidWindow {
                start: window_start,
                end: window_end,
                content_width,
            });
        }
        Ok(Self {
            content_width,
            window_start,
            window_end,
        })
    }

    /// Whole timeline in one window
    pub fn full(content_width: u32) -> VizResult<Self> {
        Self::new(content_width, 0, content_width)
    }

    /// Whole timeline, stretched to the viewport when it is narrower
    pub fn fit(natural_width: u32, viewport_width: u32) -> VizResult<Self> {
        Self::full(fit_width(natural_width, viewport_width).0)
    }

    pub fn content_width(&self) -> u32 {
        self.content_width
    }

    pub fn window_start(&self) -> u32 {
        self.window_start
    }

    pub fn window_end(&self) -> u32 {
        self.window_end
    }

    pub fn window_width(&self) -> u32 {
        self.window_end - self.window_start
    }

    pub fn contains(&self, start: u32, end: u32) -> bool {
        start >= self.window_start && end <= self.window_end
    }

    /// Split at content pixel `px` into the parts before and after it
    pub fn split_at(&self, px: u32) -> (Option<BarLayout>, Option<BarLayout>) {
        let px = px.clamp(self.window_start, self.window_end);
        let before = Self::new(self.content_width, self.window_start, px).ok();
        let after = Self::new(self.content_width, px, self.window_end).ok();
        (before, after)
    }

    /// Content pixel of a time, for a timeline spanning `duration_secs`
    pub fn pixel_of_time(&self, time_secs: f64, duration_secs: f64) -> u32 {
        if !(duration_secs > 0.0) || !(time_secs > 0.0) {
            return 0;
        }
        let fraction = (time_secs / duration_secs).min(1.0);
        (fraction * self.content_width as f64).round() as u32
    }

    /// Which sample paints which columns of this window
    pub fn spans(&self, len: usize) -> Vec<ColumnSpan> {
        if len == 0 {
            return Vec::new();
        }

        let scale = self.content_width as f64 / len as f64;
        let boundary = |i: usize| ((i as f64 * scale).round() as u32).min(self.content_width);

        // Samples before `first` end at or before the window start
        let first = ((self.window_start as f64 / scale).floor() as usize)
            .saturating_sub(1)
            .min(len - 1);

        let mut spans = Vec::new();
        let mut prev = boundary(first);
        for index in first..len {
            let x = boundary(index + 1);
            if x <= prev {
                continue;
            }
            let x0 = prev.max(self.window_start);
            let x1 = x.min(self.window_end);
            if x1 > x0 {
                spans.push(ColumnSpan {
                    index,
                    x: x0 - self.window_start,
                    width: x1 - x0,
                });
            }
            prev = x;
            if prev >= self.window_end {
                break;
            }
        }
        spans
    }
}

/// Content width for a timeline shown in a viewport
///
/// Returns `(width, scrollable)`. Content narrower than the viewport is
/// stretched to fill it and cannot scroll.
pub fn fit_width(natural_width: u32, viewport_width: u32) -> (u32, bool) {
    if natural_width < viewport_width {
        (viewport_width, false)
    } else {
        (natural_width, natural_width > viewport_width)
    }
}

/// Bar length for a value in `[0, max_value]`
pub(crate) fn bar_size(value: f32, max_value: f32, height: u32) -> u32 {
    if !value.is_finite() || !(max_value > 0.0) {
        return 0;
    }
    let normalized = (value / max_value).clamp(0.0, 1.0) as f64;
    ((normalized * height as f64).round() as u32).min(height)
}

// =============================================================================
// Single-color bars
// =============================================================================

/// Which edge the bars grow from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarOrientation {
    /// Bars rise from the bottom edge
    #[default]
    Up,
    /// Bars hang from the top edge
    Down,
}

/// Colors and value range for a single-color lane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarStyle {
    pub color: Rgba,
    pub background: Rgba,
    /// Value drawn at full height
    pub max_value: f32,
}

/// Draws one series as single-color bars
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeriesRenderer {
    style: BarStyle,
    orientation: BarOrientation,
}

impl BarSeriesRenderer {
    pub fn new(style: BarStyle, orientation: BarOrientation) -> Self {
        Self { style, orientation }
    }

    pub fn style(&self) -> &BarStyle {
        &self.style
    }

    pub fn orientation(&self) -> BarOrientation {
        self.orientation
    }

    /// Same geometry with a different bar color
    pub fn with_color(&self, color: Rgba) -> Self {
        Self {
            style: BarStyle { color, ..self.style },
            orientation: self.orientation,
        }
    }
}

impl SeriesRenderer for BarSeriesRenderer {
    fn render(&self, series: &Series, layout: &BarLayout, surface: &mut dyn Surface) -> VizResult<()> {
        ensure_drawable(surface)?;
        surface.clear(self.style.background);

        let height = surface.height();
        for span in layout.spans(series.len()) {
            let value = series.samples()[span.index];
            let size = bar_size(value, self.style.max_value, height);
            if size == 0 {
                continue;
            }
            let y = match self.orientation {
                BarOrientation::Up => height - size,
                BarOrientation::Down => 0,
            };
            surface.fill_rect(PixelRect::new(span.x, y, span.width, size), self.style.color);
        }
        Ok(())
    }

    fn placeholder_value(&self) -> f32 {
        0.0
    }
}
