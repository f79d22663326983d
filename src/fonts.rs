//! Monospaced font faces shared by text measurement and the raster backend.
//!
//! Cell fonts are mapped onto the embedded-graphics ASCII mono fonts by size
//! and weight, so measured widths match what [`RasterSurface`] draws.
//!
//! [`RasterSurface`]: crate::render::RasterSurface

use embedded_graphics::mono_font::ascii::{
    FONT_10X20, FONT_6X13_BOLD, FONT_6X13_ITALIC, FONT_6X9, FONT_7X13_ITALIC, FONT_7X14,
    FONT_7X14_BOLD, FONT_8X13, FONT_8X13_BOLD, FONT_8X13_ITALIC, FONT_9X15_BOLD, FONT_9X18,
    FONT_9X18_BOLD,
};
use embedded_graphics::mono_font::MonoFont;

use crate::layout::{FontMetrics, TextMetricsBackend};
use crate::types::Font;

/// Pick the mono face closest to a font's point size and style.
pub fn mono_font_for(font: &Font) -> &'static MonoFont<'static> {
    let bold = font.bold;
    let italic = font.italic && !bold;
    match font.size {
        s if s < 9.0 => match (bold, italic) {
            (true, _) => &FONT_6X13_BOLD,
            (_, true) => &FONT_6X13_ITALIC,
            _ => &FONT_6X9,
        },
        s if s < 11.0 => match (bold, italic) {
            (true, _) => &FONT_7X14_BOLD,
            (_, true) => &FONT_7X13_ITALIC,
            _ => &FONT_7X14,
        },
        s if s < 14.0 => match (bold, italic) {
            (true, _) => &FONT_8X13_BOLD,
            (_, true) => &FONT_8X13_ITALIC,
            _ => &FONT_8X13,
        },
        s if s < 18.0 => match (bold, italic) {
            (true, _) => &FONT_9X15_BOLD,
            _ => &FONT_9X18,
        },
        _ => {
            if bold {
                &FONT_9X18_BOLD
            } else {
                &FONT_10X20
            }
        }
    }
}

/// Whether the ASCII mono faces have a glyph for every character.
pub fn has_glyphs(text: &str) -> bool {
    text.chars().all(|c| c == ' ' || c.is_ascii_graphic())
}

/// A face dimension in points for `font`.
///
/// Fonts taller than their face are measured at `size / face height`, so
/// large text reserves its real height. Faces are never shrunk.
fn face_points(value: u32, font: &Font, face: &MonoFont<'_>) -> f64 {
    let nominal = f64::from(face.character_size.height);
    let value = f64::from(value);
    if nominal > 0.0 && font.size > nominal {
        value * font.size / nominal
    } else {
        value
    }
}

/// Measurement backend backed by the mono faces.
///
/// Text with characters outside printable ASCII has no glyphs; those
/// measurements report unavailable so the measurer approximates them.
/// Sizes past the largest face scale its metrics up; the raster backend
/// still draws the unscaled face inside the reserved box.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoFontMetrics;

impl TextMetricsBackend for MonoFontMetrics {
    fn font_metrics(&self, font: &Font) -> Option<FontMetrics> {
        let face = mono_font_for(font);
        let height = face_points(face.character_size.height, font, face);
        let ascent = face_points(face.baseline, font, face);
        Some(FontMetrics {
            ascent,
            descent: (height - ascent).max(0.0),
            height,
            max_advance_width: face_points(
                face.character_size.width + face.character_spacing,
                font,
                face,
            ),
            approximate: false,
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, font: &Font, text: &str) -> Option<f64> {
        if !has_glyphs(text) {
            return None;
        }
        let face = mono_font_for(font);
        let n = text.chars().count();
        if n == 0 {
            return Some(0.0);
        }
        let glyph = face_points(face.character_size.width, font, face);
        let spacing = face_points(face.character_spacing, font, face);
        Some(n as f64 * glyph + (n - 1) as f64 * spacing)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_face_selection_by_size() {
        let small = Font::default().with_size(8.0);
        let body = Font::default();
        let large = Font::default().with_size(24.0);
        assert_eq!(mono_font_for(&small).character_size.width, 6);
        assert_eq!(mono_font_for(&body).character_size.width, 8);
        assert_eq!(mono_font_for(&large).character_size.width, 10);
        assert_eq!(mono_font_for(&body.clone().bold()).character_size.width, 8);
    }

    #[test]
    fn test_mono_widths() {
        let font = Font::default();
        let m = MonoFontMetrics;
        assert_eq!(m.text_width(&font, "").unwrap(), 0.0);
        assert_eq!(m.text_width(&font, "abcd").unwrap(), 32.0);
        assert!(m.text_width(&font, "naïve").is_none());
        let metrics = m.font_metrics(&font).unwrap();
        assert_eq!(metrics.height, 13.0);
        assert!(!metrics.approximate);
    }

    #[test]
    fn test_sizes_past_largest_face_scale_up() {
        let m = MonoFontMetrics;
        let title = Font::default().with_size(48.0);
        let metrics = m.font_metrics(&title).unwrap();
        assert_eq!(metrics.height, 48.0);
        // 10x20 face at 48 / 20.
        assert_eq!(m.text_width(&title, "ab").unwrap(), 48.0);
        let at_face = Font::default().with_size(20.0);
        assert_eq!(m.font_metrics(&at_face).unwrap().height, 20.0);
        assert_eq!(m.font_metrics(&Font::default().with_size(16.0)).unwrap().height, 18.0);
    }
}
