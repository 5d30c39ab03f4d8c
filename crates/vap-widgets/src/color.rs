//! Conversion from core colors to iced colors

use iced::Color;
use vap_core::config::Rgba;

/// Convert a theme color for use in a canvas frame
pub fn to_iced(color: Rgba) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, f32::from(color.a) / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_map_to_unit_range() {
        let color = to_iced(Rgba::new(255, 0, 51, 255));
        assert!((color.r - 1.0).abs() < 1e-6);
        assert_eq!(color.g, 0.0);
        assert!((color.b - 0.2).abs() < 1e-6);
        assert!((color.a - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_alpha_is_kept() {
        let color = to_iced(Rgba::new(0, 0, 0, 0));
        assert_eq!(color.a, 0.0);
    }
}
