//! Cell text: automatic color, wrapping and block alignment.

use super::context::RenderContext;
use super::surface::DrawingSurface;
use crate::color::Rgb;
use crate::layout::{Measurer, Rect, LINE_SPACING};
use crate::types::{Alignment, CellStyle, Font, HAlign, VAlign};
use crate::units::POINTS_PER_CHARACTER;

/// Gap kept between text and the cell edge it is aligned to, before scaling.
pub const TEXT_PADDING: f64 = 2.0;

/// What a text-drawing stage did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextOutcome {
    pub drawn: bool,
    /// Placement used approximate metrics, or the surface cannot draw text.
    pub degraded: bool,
}

/// Top-left corner of a `width` x `height` text block aligned inside `rect`.
///
/// `General` alignment puts numbers on the right and everything else on the
/// left. Justify-like modes fall back to the rectangle's left or top edge.
pub fn align_block(
    rect: Rect,
    width: f64,
    height: f64,
    alignment: &Alignment,
    numeric: bool,
    padding: f64,
) -> (f64, f64) {
    let horizontal = match alignment.horizontal {
        HAlign::General if numeric => HAlign::Right,
        HAlign::General => HAlign::Left,
        other => other,
    };
    let x = match horizontal {
        HAlign::Left | HAlign::General => rect.left() + padding,
        HAlign::Center | HAlign::CenterContinuous => rect.center().0 - width / 2.0,
        HAlign::Right => rect.right() - width - padding,
        HAlign::Fill | HAlign::Justify | HAlign::Distributed => rect.left(),
    };
    let y = match alignment.vertical {
        VAlign::Top => rect.top() + padding,
        VAlign::Center => rect.center().1 - height / 2.0,
        VAlign::Bottom => rect.bottom() - height - padding,
        VAlign::Justify | VAlign::Distributed => rect.top(),
    };
    (x, y)
}

/// `rect` narrowed on both sides by the alignment's indent, matching the
/// padding layout reserves for it.
fn indented(rect: Rect, alignment: &Alignment, scale: f64) -> Rect {
    let inset = (f64::from(alignment.indent) * POINTS_PER_CHARACTER * scale).min(rect.width / 2.0);
    Rect::new(rect.x + inset, rect.y, rect.width - 2.0 * inset, rect.height)
}

/// Explicit font color, or black/white picked against the fill.
pub fn resolve_text_color(style: &CellStyle) -> Rgb {
    style.font.color.unwrap_or_else(|| {
        style
            .fill
            .background_color()
            .unwrap_or(Rgb::WHITE)
            .contrast_color()
    })
}

/// Draws a cell's display text.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer<'m> {
    measurer: &'m Measurer,
}

impl<'m> TextRenderer<'m> {
    pub fn new(measurer: &'m Measurer) -> Self {
        Self { measurer }
    }

    pub fn render(&self, ctx: &RenderContext<'_>, surface: &mut dyn DrawingSurface) -> TextOutcome {
        let cell = ctx.cell;
        if cell.is_blank() {
            return TextOutcome::default();
        }
        let text = cell.display_text();
        if text.trim().is_empty() {
            return TextOutcome::default();
        }
        if !surface.supports_text() {
            log::trace!("({}, {}): surface has no text support", ctx.row, ctx.col);
            return TextOutcome {
                drawn: false,
                degraded: true,
            };
        }

        let style = ctx.style();
        let font = style.font.scaled(ctx.scale);
        let color = resolve_text_color(style);
        let numeric = cell.numeric_value().is_some();
        let padding = TEXT_PADDING * ctx.scale;
        let rect = indented(ctx.rect, &style.alignment, ctx.scale);

        if style.alignment.wrap_text {
            self.draw_wrapped(ctx, rect, surface, &text, &font, color, numeric, padding)
        } else {
            let extent = self.measurer.measure_extent(&font, &text);
            let (x, y) = align_block(
                rect,
                extent.width,
                extent.height,
                &style.alignment,
                numeric,
                padding,
            );
            surface.draw_text(x, y, &text, &font, color);
            TextOutcome {
                drawn: true,
                degraded: extent.approximate,
            }
        }
    }

    #[allow(clippy::too_many_arguments, clippy::cast_precision_loss)]
    fn draw_wrapped(
        &self,
        ctx: &RenderContext<'_>,
        rect: Rect,
        surface: &mut dyn DrawingSurface,
        text: &str,
        font: &Font,
        color: Rgb,
        numeric: bool,
        padding: f64,
    ) -> TextOutcome {
        let lines = self.measurer.wrap(font, text, rect.width);
        if lines.is_empty() {
            return TextOutcome::default();
        }

        let probe = self.measurer.measure_extent(font, "M");
        let line_height = probe.height * LINE_SPACING;
        let mut degraded = probe.approximate;
        let mut block_width: f64 = 0.0;
        for line in &lines {
            let extent = self.measurer.measure_extent(font, line);
            degraded |= extent.approximate;
            block_width = block_width.max(extent.width);
        }
        let block_height = lines.len() as f64 * line_height;

        let (x, y) = align_block(
            rect,
            block_width,
            block_height,
            &ctx.style().alignment,
            numeric,
            padding,
        );
        surface.draw_multiline_text(x, y, &lines.join("\n"), line_height, font, color);
        TextOutcome {
            drawn: true,
            degraded,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::Fill;

    fn alignment(horizontal: HAlign, vertical: VAlign) -> Alignment {
        Alignment {
            horizontal,
            vertical,
            ..Alignment::default()
        }
    }

    #[test]
    fn test_align_block_positions() {
        let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
        let at = |h, v| align_block(rect, 40.0, 10.0, &alignment(h, v), false, 2.0);
        assert_eq!(at(HAlign::Left, VAlign::Top), (2.0, 2.0));
        assert_eq!(at(HAlign::Center, VAlign::Center), (30.0, 5.0));
        assert_eq!(at(HAlign::Right, VAlign::Bottom), (58.0, 8.0));
        assert_eq!(at(HAlign::Justify, VAlign::Distributed), (0.0, 0.0));
        assert_eq!(at(HAlign::CenterContinuous, VAlign::Justify), (30.0, 0.0));
    }

    #[test]
    fn test_general_alignment_depends_on_type() {
        let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
        let general = Alignment::default();
        assert_eq!(align_block(rect, 40.0, 10.0, &general, true, 2.0).0, 58.0);
        assert_eq!(align_block(rect, 40.0, 10.0, &general, false, 2.0).0, 2.0);
    }

    #[test]
    fn test_automatic_color_contrasts_with_fill() {
        let mut style = CellStyle::default();
        assert_eq!(resolve_text_color(&style), Rgb::BLACK);
        style.fill = Fill::solid(Rgb::new(0x20, 0x20, 0x60));
        assert_eq!(resolve_text_color(&style), Rgb::WHITE);
        style.font.color = Some(Rgb::RED);
        assert_eq!(resolve_text_color(&style), Rgb::RED);
    }
}
