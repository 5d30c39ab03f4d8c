//! Two-party probability bars
//!
//! Values at or above 0.5 belong to party A and grow upward from the center
//! line; values below belong to party B and grow downward from it. A value of
//! 0.5 draws nothing, 1.0 fills the upper half and 0.0 fills the lower half.

use super::bars::{bar_size, BarLayout};
use super::surface::{PixelRect, Surface};
use super::{ensure_drawable, SeriesRenderer};
use crate::config::{PartyColors, Rgba};
use crate::error::VizResult;
use crate::series::Series;

/// Party boundary
pub const THRESHOLD: f32 = 0.5;

/// Draws a two-party probability series mirrored around the center line
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdBarRenderer {
    colors: PartyColors,
    background: Rgba,
}

impl ThresholdBarRenderer {
    pub fn new(colors: PartyColors, background: Rgba) -> Self {
        Self { colors, background }
    }

    pub fn colors(&self) -> &PartyColors {
        &self.colors
    }

    pub fn with_colors(&self, colors: PartyColors) -> Self {
        Self {
            colors,
            background: self.background,
        }
    }

    /// Vertical extent and color of one bar, `None` when it has no height
    ///
    /// The center line sits at `height / 2` exactly; a row belongs to a bar
    /// when its center lies inside the bar.
    fn bar(&self, value: f32, height: u32) -> Option<(u32, u32, Rgba)> {
        let half = height as f64 / 2.0;
        let edge = (height - bar_size(value, 1.0, height)) as f64;
        let (top, bottom, color) = if value >= THRESHOLD {
            (edge, half, self.colors.party_a)
        } else {
            (half, edge, self.colors.party_b)
        };
        let (y0, y1) = (center_row(top), center_row(bottom));
        (y1 > y0).then(|| (y0, y1 - y0, color))
    }
}

/// First row whose center is at or below `y`
fn center_row(y: f64) -> u32 {
    (y - 0.5).ceil().max(0.0) as u32
}

impl SeriesRenderer for ThresholdBarRenderer {
    fn render(&self, series: &Series, layout: &BarLayout, surface: &mut dyn Surface) -> VizResult<()> {
        ensure_drawable(surface)?;
        surface.clear(self.background);

        let height = surface.height();
        for span in layout.spans(series.len()) {
            if let Some((y, bar_height, color)) = self.bar(series.samples()[span.index], height) {
                surface.fill_rect(PixelRect::new(span.x, y, span.width, bar_height), color);
            }
        }
        Ok(())
    }

    fn placeholder_value(&self) -> f32 {
        THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PixelBuffer;

    const BLUE: Rgba = Rgba::rgb(0x32, 0x8D, 0xE1);
    const ORANGE: Rgba = Rgba::rgb(0xFD, 0xA2, 0x30);

    fn renderer() -> ThresholdBarRenderer {
        ThresholdBarRenderer::new(
            PartyColors {
                party_a: BLUE,
                party_b: ORANGE,
            },
            Rgba::WHITE,
        )
    }

    fn column_colors(buffer: &PixelBuffer, x: u32) -> Vec<Rgba> {
        let mut colors = buffer.column(x);
        colors.dedup();
        colors
    }

    #[test]
    fn test_four_samples_in_400_pixels() {
        // 4 s at 100 px/s in a 400 px viewport
        let series = Series::fitted(vec![0.1, 0.6, 0.9, 0.2], 4.0);
        let layout = BarLayout::fit(400, 400).unwrap();
        let mut buffer = PixelBuffer::new(400, 100);
        renderer().render(&series, &layout, &mut buffer).unwrap();

        for (index, party) in [(0, ORANGE), (1, BLUE), (2, BLUE), (3, ORANGE)] {
            for x in index * 100..(index + 1) * 100 {
                assert!(
                    buffer.column(x).contains(&party),
                    "column {x} belongs to sample {index}"
                );
                let other = if party == BLUE { ORANGE } else { BLUE };
                assert!(!buffer.column(x).contains(&other));
            }
            // Whole 100 px column is identical
            assert_eq!(buffer.column(index * 100), buffer.column(index * 100 + 99));
        }
    }

    #[test]
    fn test_bar_geometry() {
        let series = Series::new(vec![0.9, 0.1, 0.5, 1.0, 0.0], 1.0);
        let mut buffer = PixelBuffer::new(5, 100);
        renderer()
            .render(&series, &BarLayout::full(5).unwrap(), &mut buffer)
            .unwrap();

        // 0.9: party A from 10 down to the center line
        assert_eq!(buffer.pixel(0, 9), Some(Rgba::WHITE));
        assert_eq!(buffer.pixel(0, 10), Some(BLUE));
        assert_eq!(buffer.pixel(0, 49), Some(BLUE));
        assert_eq!(buffer.pixel(0, 50), Some(Rgba::WHITE));

        // 0.1: party B from the center line down to 90
        assert_eq!(buffer.pixel(1, 49), Some(Rgba::WHITE));
        assert_eq!(buffer.pixel(1, 50), Some(ORANGE));
        assert_eq!(buffer.pixel(1, 89), Some(ORANGE));
        assert_eq!(buffer.pixel(1, 90), Some(Rgba::WHITE));

        assert_eq!(column_colors(&buffer, 2), vec![Rgba::WHITE], "0.5 draws nothing");
        assert_eq!(column_colors(&buffer, 3), vec![BLUE, Rgba::WHITE]);
        assert_eq!(column_colors(&buffer, 4), vec![Rgba::WHITE, ORANGE]);
    }

    #[test]
    fn test_odd_height_splits_at_true_center() {
        let series = Series::new(vec![1.0, 0.0, 0.8, 0.2], 1.0);
        let mut buffer = PixelBuffer::new(4, 5);
        renderer()
            .render(&series, &BarLayout::full(4).unwrap(), &mut buffer)
            .unwrap();

        let w = Rgba::WHITE;
        assert_eq!(buffer.column(0), vec![BLUE, BLUE, w, w, w]);
        assert_eq!(buffer.column(1), vec![w, w, ORANGE, ORANGE, ORANGE]);
        // 0.8 and 0.2 both reach 1.5 rows from the center
        assert_eq!(buffer.column(2), vec![w, BLUE, w, w, w]);
        assert_eq!(buffer.column(3), vec![w, w, ORANGE, ORANGE, w]);
    }

    #[test]
    fn test_windowed_render_matches_full() {
        let series = Series::new((0..50).map(|i| i as f32 / 49.0).collect::<Vec<_>>(), 10.0);

        let mut full = PixelBuffer::new(500, 20);
        renderer()
            .render(&series, &BarLayout::full(500).unwrap(), &mut full)
            .unwrap();

        let mut window = PixelBuffer::new(120, 20);
        renderer()
            .render(&series, &BarLayout::new(500, 200, 320).unwrap(), &mut window)
            .unwrap();

        for x in 0..120 {
            assert_eq!(window.column(x), full.column(x + 200), "column {x}");
        }
    }

    #[test]
    fn test_placeholder_is_blank() {
        let r = renderer();
        let mut buffer = PixelBuffer::new(10, 10);
        r.render(&Series::flat(r.placeholder_value()), &BarLayout::full(10).unwrap(), &mut buffer)
            .unwrap();
        assert!(buffer.pixels().iter().all(|&p| p == Rgba::WHITE));
    }
}
