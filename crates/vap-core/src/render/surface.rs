//! Raster surfaces
//!
//! Renderers only ever fill axis-aligned rectangles, so a surface is anything
//! that can do that. `PixelBuffer` is the in-memory implementation used for
//! cached track rasters; GUI adapters implement the trait over their own
//! drawing contexts.

use crate::config::Rgba;

/// Axis-aligned rectangle in surface pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection with a `width` x `height` surface
    pub fn clip(&self, width: u32, height: u32) -> Option<PixelRect> {
        let x1 = self.x.saturating_add(self.width).min(width);
        let y1 = self.y.saturating_add(self.height).min(height);
        if self.x >= x1 || self.y >= y1 {
            return None;
        }
        Some(PixelRect::new(self.x, self.y, x1 - self.x, y1 - self.y))
    }
}

/// Drawing target for series renderers
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Fill the whole surface with `color`
    fn clear(&mut self, color: Rgba);

    /// Fill `rect` with `color`; parts outside the surface are ignored
    fn fill_rect(&mut self, rect: PixelRect, color: Rgba);
}

/// Owned RGBA raster
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    /// Transparent buffer of the given size (zero-sized buffers are allowed)
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Reallocate to a new size, discarding contents
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![Rgba::TRANSPARENT; width as usize * height as usize];
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// One column of pixels, top to bottom
    pub fn column(&self, x: u32) -> Vec<Rgba> {
        (0..self.height).filter_map(|y| self.pixel(x, y)).collect()
    }

    /// True when every pixel in column `x` equals `color`
    pub fn column_is(&self, x: u32, color: Rgba) -> bool {
        (0..self.height).all(|y| self.pixel(x, y) == Some(color))
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Vertical runs of equal color in column `x` as `(y, height, color)`
    fn column_runs(&self, x: u32) -> Vec<(u32, u32, Rgba)> {
        let mut runs: Vec<(u32, u32, Rgba)> = Vec::new();
        for y in 0..self.height {
            let Some(color) = self.pixel(x, y) else {
                break;
            };
            match runs.last_mut() {
                Some((_, height, last)) if *last == color => *height += 1,
                _ => runs.push((y, 1, color)),
            }
        }
        runs
    }

    /// Rectangles that reproduce columns `x0..x1`, positioned relative to `x0`
    ///
    /// Neighbouring identical columns share one rectangle per run and fully
    /// transparent runs are left out, so a bar raster becomes a handful of
    /// fills per bar instead of one per pixel.
    pub fn rects(&self, x0: u32, x1: u32) -> Vec<(PixelRect, Rgba)> {
        let x1 = x1.min(self.width);
        let mut rects = Vec::new();
        // (first column, width, runs shared by those columns)
        let mut group: Option<(u32, u32, Vec<(u32, u32, Rgba)>)> = None;

        for x in x0..x1 {
            let runs = self.column_runs(x);
            let same = matches!(&group, Some((_, _, current)) if *current == runs);
            if same {
                if let Some((_, width, _)) = group.as_mut() {
                    *width += 1;
                }
            } else if let Some(done) = group.replace((x, 1, runs)) {
                push_group(&mut rects, x0, done);
            }
        }
        if let Some(done) = group {
            push_group(&mut rects, x0, done);
        }
        rects
    }
}

fn push_group(rects: &mut Vec<(PixelRect, Rgba)>, x0: u32, (x, width, runs): (u32, u32, Vec<(u32, u32, Rgba)>)) {
    rects.extend(
        runs.into_iter()
            .filter(|&(_, _, color)| color.a > 0)
            .map(|(y, height, color)| (PixelRect::new(x - x0, y, width, height), color)),
    );
}

impl Surface for PixelBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgba) {
        let Some(rect) = rect.clip(self.width, self.height) else {
            return;
        };
        let stride = self.width as usize;
        for y in rect.y..rect.y + rect.height {
            let row = y as usize * stride;
            let span = &mut self.pixels[row + rect.x as usize..row + (rect.x + rect.width) as usize];
            if color.a == 255 {
                span.fill(color);
            } else {
                for px in span.iter_mut() {
                    *px = color.over(*px);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_clips() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.fill_rect(PixelRect::new(2, 2, 10, 10), Rgba::BLACK);

        assert_eq!(buffer.pixel(3, 3), Some(Rgba::BLACK));
        assert_eq!(buffer.pixel(1, 1), Some(Rgba::TRANSPARENT));
        assert_eq!(buffer.pixel(4, 0), None, "outside the buffer");
    }

    #[test]
    fn test_fill_rect_outside_is_noop() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.fill_rect(PixelRect::new(8, 0, 2, 2), Rgba::BLACK);
        buffer.fill_rect(PixelRect::new(0, 0, 0, 4), Rgba::BLACK);
        assert!(buffer.pixels().iter().all(|&p| p == Rgba::TRANSPARENT));
    }

    #[test]
    fn test_translucent_fill_blends() {
        let mut buffer = PixelBuffer::new(2, 1);
        buffer.clear(Rgba::WHITE);
        buffer.fill_rect(PixelRect::new(0, 0, 1, 1), Rgba::new(0, 0, 0, 128));
        let blended = buffer.pixel(0, 0).unwrap();
        assert!(blended.r < 255 && blended.r > 0);
        assert_eq!(buffer.pixel(1, 0), Some(Rgba::WHITE));
    }

    #[test]
    fn test_rects_merge_identical_columns() {
        let mut buffer = PixelBuffer::new(6, 4);
        buffer.clear(Rgba::WHITE);
        buffer.fill_rect(PixelRect::new(1, 2, 3, 2), Rgba::BLACK);

        assert_eq!(
            buffer.rects(0, 6),
            vec![
                (PixelRect::new(0, 0, 1, 4), Rgba::WHITE),
                (PixelRect::new(1, 0, 3, 2), Rgba::WHITE),
                (PixelRect::new(1, 2, 3, 2), Rgba::BLACK),
                (PixelRect::new(4, 0, 2, 4), Rgba::WHITE),
            ]
        );
    }

    #[test]
    fn test_rects_reproduce_a_window() {
        let mut buffer = PixelBuffer::new(8, 3);
        buffer.fill_rect(PixelRect::new(2, 1, 1, 2), Rgba::BLACK);
        buffer.fill_rect(PixelRect::new(5, 0, 2, 1), Rgba::rgb(9, 9, 9));

        let mut copy = PixelBuffer::new(5, 3);
        for (rect, color) in buffer.rects(2, 7) {
            copy.fill_rect(rect, color);
        }
        for x in 0..5 {
            assert_eq!(copy.column(x), buffer.column(x + 2), "column {x}");
        }
        assert!(buffer.rects(3, 5).is_empty(), "transparent columns need no fills");
        assert!(buffer.rects(6, 20).len() == 1, "clamped to the buffer");
    }

    #[test]
    fn test_resize_discards_contents() {
        let mut buffer = PixelBuffer::new(2, 2);
        buffer.clear(Rgba::BLACK);
        buffer.resize(3, 1);
        assert_eq!(buffer.width(), 3);
        assert_eq!(buffer.pixels().len(), 3);
        assert!(buffer.column_is(0, Rgba::TRANSPARENT));
    }
}
