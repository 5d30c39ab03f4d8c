//! Voice activity overlay
//!
//! Each audio channel gets an equal horizontal band of the surface. Regions
//! are given in seconds and drawn as translucent fills on top of whatever the
//! bar renderer left behind.

use super::bars::BarLayout;
use super::surface::{PixelRect, Surface};
use crate::config::Theme;
use crate::session::Region;

/// Pixel span of one region inside a raster window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSpan {
    pub channel: usize,
    pub x: u32,
    pub width: u32,
}

/// Project regions onto the window, dropping those that fall outside it
pub fn region_spans(
    channels: &[Vec<Region>],
    duration_secs: f64,
    layout: &BarLayout,
) -> Vec<RegionSpan> {
    let mut spans = Vec::new();
    for (channel, regions) in channels.iter().enumerate() {
        for &[start, end] in regions {
            let x0 = layout
                .pixel_of_time(start, duration_secs)
                .max(layout.window_start());
            let x1 = layout
                .pixel_of_time(end, duration_secs)
                .min(layout.window_end());
            if x1 > x0 {
                spans.push(RegionSpan {
                    channel,
                    x: x0 - layout.window_start(),
                    width: x1 - x0,
                });
            }
        }
    }
    spans
}

/// Fills voice activity regions, one band per channel
#[derive(Debug, Clone, PartialEq)]
pub struct RegionOverlay {
    theme: Theme,
}

impl RegionOverlay {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn render(
        &self,
        channels: &[Vec<Region>],
        duration_secs: f64,
        layout: &BarLayout,
        surface: &mut dyn Surface,
    ) {
        if channels.is_empty() || surface.height() == 0 {
            return;
        }
        let band = surface.height() / channels.len() as u32;
        if band == 0 {
            return;
        }
        for span in region_spans(channels, duration_secs, layout) {
            let rect = PixelRect::new(span.x, span.channel as u32 * band, span.width, band);
            surface.fill_rect(rect, self.theme.region_color(span.channel));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rgba;
    use crate::render::PixelBuffer;

    #[test]
    fn test_spans_are_clipped_to_window() {
        // 10 s over 1000 px, window 200..600
        let layout = BarLayout::new(1000, 200, 600).unwrap();
        let channels = vec![vec![[0.0, 1.0], [1.5, 3.0], [5.0, 9.0]], vec![[2.5, 4.0]]];
        let spans = region_spans(&channels, 10.0, &layout);

        assert_eq!(
            spans,
            vec![
                RegionSpan { channel: 0, x: 0, width: 100 },
                RegionSpan { channel: 0, x: 300, width: 100 },
                RegionSpan { channel: 1, x: 50, width: 150 },
            ]
        );
    }

    #[test]
    fn test_overlay_uses_channel_bands() {
        let theme = Theme {
            regions: [Rgba::rgb(255, 0, 0), Rgba::rgb(0, 0, 255)],
            ..Theme::default()
        };
        let layout = BarLayout::full(10).unwrap();
        let mut buffer = PixelBuffer::new(10, 4);
        buffer.clear(Rgba::WHITE);
        RegionOverlay::new(theme).render(
            &[vec![[0.0, 5.0]], vec![[5.0, 10.0]]],
            10.0,
            &layout,
            &mut buffer,
        );

        assert_eq!(buffer.pixel(0, 0), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(buffer.pixel(0, 2), Some(Rgba::WHITE));
        assert_eq!(buffer.pixel(9, 3), Some(Rgba::rgb(0, 0, 255)));
        assert_eq!(buffer.pixel(9, 0), Some(Rgba::WHITE));
    }

    #[test]
    fn test_zero_duration_draws_nothing() {
        let layout = BarLayout::full(10).unwrap();
        assert!(region_spans(&[vec![[0.0, 5.0]]], 0.0, &layout).is_empty());
    }
}
