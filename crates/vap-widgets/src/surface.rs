//! Canvas frame adapter for core renderers
//!
//! Core renderers paint through [`Surface`]; this maps their pixel rectangles
//! onto a horizontal slice of an iced [`Frame`]. Slices let the played and
//! unplayed rasters of one track be drawn side by side.

use iced::widget::canvas::Frame;
use iced::{Point, Size};
use vap_core::config::Rgba;
use vap_core::render::{PixelRect, Surface};

use crate::color::to_iced;

/// Horizontal slice of a canvas frame, in surface pixels
pub struct FrameSurface<'f> {
    frame: &'f mut Frame,
    /// Left edge of the slice within the frame
    origin_x: u32,
    width: u32,
    height: u32,
    /// Logical units per surface pixel, per axis
    scale_x: f32,
    scale_y: f32,
}

impl<'f> FrameSurface<'f> {
    pub fn new(frame: &'f mut Frame, origin_x: u32, width: u32, height: u32) -> Self {
        Self {
            frame,
            origin_x,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Surface columns are physical pixels at `device_pixel_ratio`
    pub fn with_device_pixel_ratio(mut self, device_pixel_ratio: f64) -> Self {
        if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            self.scale_x = (1.0 / device_pixel_ratio) as f32;
        }
        self
    }

    /// Stretch the surface's rows to `target_height` logical units
    pub fn fit_height(mut self, target_height: f32) -> Self {
        if self.height > 0 && target_height.is_finite() && target_height > 0.0 {
            self.scale_y = target_height / self.height as f32;
        }
        self
    }

    fn fill(&mut self, rect: PixelRect, color: Rgba) {
        let top_left = Point::new(
            (self.origin_x + rect.x) as f32 * self.scale_x,
            rect.y as f32 * self.scale_y,
        );
        let size = Size::new(rect.width as f32 * self.scale_x, rect.height as f32 * self.scale_y);
        self.frame.fill_rectangle(top_left, size, to_iced(color));
    }
}

impl Surface for FrameSurface<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Rgba) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        self.fill(PixelRect::new(0, 0, self.width, self.height), color);
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgba) {
        if let Some(rect) = rect.clip(self.width, self.height) {
            self.fill(rect, color);
        }
    }
}
