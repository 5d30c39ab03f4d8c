//! Series rendering
//!
//! Renderers are pure: given a series, a layout and a surface they paint the
//! surface and hold no state between calls. Colors come in at construction.

mod bars;
mod regions;
mod surface;
mod threshold;

pub use bars::{fit_width, BarLayout, BarOrientation, BarSeriesRenderer, BarStyle, ColumnSpan};
pub use regions::{region_spans, RegionOverlay, RegionSpan};
pub use surface::{PixelBuffer, PixelRect, Surface};
pub use threshold::{ThresholdBarRenderer, THRESHOLD};

use crate::config::{Rgba, Theme};
use crate::error::{VizError, VizResult};
use crate::series::Series;
use crate::session::TrackKind;

/// Entropy of a distribution over the 256 projection-window states, in bits
const MAX_ENTROPY_BITS: f32 = 8.0;

/// Draws a series into a surface
pub trait SeriesRenderer {
    /// Paint the layout's window of `series` into `surface`
    ///
    /// The surface is cleared first. An empty series leaves it blank.
    fn render(&self, series: &Series, layout: &BarLayout, surface: &mut dyn Surface) -> VizResult<()>;

    /// Sample value that paints no bars, used to blank a track while loading
    fn placeholder_value(&self) -> f32;
}

pub(crate) fn ensure_drawable(surface: &dyn Surface) -> VizResult<()> {
    if surface.width() == 0 || surface.height() == 0 {
        return Err(VizError::InvalidSurface {
            width: surface.width(),
            height: surface.height(),
        });
    }
    Ok(())
}

/// Renderer attached to a timeline track
#[derive(Debug, Clone, PartialEq)]
pub enum TrackRenderer {
    Bars(BarSeriesRenderer),
    Threshold(ThresholdBarRenderer),
}

impl TrackRenderer {
    /// Renderer for a session track, styled from the theme
    ///
    /// Turn-taking probabilities use the two-party layout. Backchannel
    /// lanes are single-color, party B hanging from the top so the pair
    /// reads as a mirror image.
    pub fn for_track(kind: TrackKind, theme: &Theme) -> Self {
        let bars = |color: Rgba, max_value: f32, orientation: BarOrientation| {
            TrackRenderer::Bars(BarSeriesRenderer::new(
                BarStyle {
                    color,
                    background: theme.background,
                    max_value,
                },
                orientation,
            ))
        };
        match kind {
            TrackKind::NowA | TrackKind::NowB | TrackKind::FutureA | TrackKind::FutureB => {
                TrackRenderer::Threshold(ThresholdBarRenderer::new(theme.bars, theme.background))
            }
            TrackKind::BackchannelA => bars(theme.bars.party_a, 1.0, BarOrientation::Up),
            TrackKind::BackchannelB => bars(theme.bars.party_b, 1.0, BarOrientation::Down),
            TrackKind::Entropy => bars(theme.neutral, MAX_ENTROPY_BITS, BarOrientation::Up),
        }
    }

    /// Variant used for the already-played part of the track
    pub fn played(&self, theme: &Theme) -> Self {
        match self {
            TrackRenderer::Threshold(r) => TrackRenderer::Threshold(r.with_colors(theme.progress)),
            TrackRenderer::Bars(r) => {
                let color = if r.style().color == theme.bars.party_b {
                    theme.progress.party_b
                } else if r.style().color == theme.bars.party_a {
                    theme.progress.party_a
                } else {
                    r.style().color
                };
                TrackRenderer::Bars(r.with_color(color))
            }
        }
    }
}

impl SeriesRenderer for TrackRenderer {
    fn render(&self, series: &Series, layout: &BarLayout, surface: &mut dyn Surface) -> VizResult<()> {
        match self {
            TrackRenderer::Bars(r) => r.render(series, layout, surface),
            TrackRenderer::Threshold(r) => r.render(series, layout, surface),
        }
    }

    fn placeholder_value(&self) -> f32 {
        match self {
            TrackRenderer::Bars(r) => r.placeholder_value(),
            TrackRenderer::Threshold(r) => r.placeholder_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_track_picks_layout() {
        let theme = Theme::default();
        assert!(matches!(
            TrackRenderer::for_track(TrackKind::FutureB, &theme),
            TrackRenderer::Threshold(_)
        ));
        match TrackRenderer::for_track(TrackKind::BackchannelB, &theme) {
            TrackRenderer::Bars(r) => assert_eq!(r.orientation(), BarOrientation::Down),
            other => panic!("expected bars, got {other:?}"),
        }
    }

    #[test]
    fn test_played_variant_uses_progress_colors() {
        let theme = Theme::default();
        match TrackRenderer::for_track(TrackKind::NowA, &theme).played(&theme) {
            TrackRenderer::Threshold(r) => assert_eq!(*r.colors(), theme.progress),
            other => panic!("expected threshold, got {other:?}"),
        }
        match TrackRenderer::for_track(TrackKind::BackchannelA, &theme).played(&theme) {
            TrackRenderer::Bars(r) => assert_eq!(r.style().color, theme.progress.party_a),
            other => panic!("expected bars, got {other:?}"),
        }
    }

    #[test]
    fn test_placeholder_values() {
        let theme = Theme::default();
        assert_eq!(TrackRenderer::for_track(TrackKind::NowA, &theme).placeholder_value(), 0.5);
        assert_eq!(TrackRenderer::for_track(TrackKind::Entropy, &theme).placeholder_value(), 0.0);
    }
}
