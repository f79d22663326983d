//! Formula cells show their formula text, never a computed value.

use super::context::RenderContext;
use super::surface::DrawingSurface;
use super::text::{align_block, TextOutcome, TEXT_PADDING};
use crate::color::Rgb;
use crate::layout::Measurer;

/// Draws the literal formula in an accent color, on a single line.
#[derive(Debug, Clone, Copy)]
pub struct FormulaRenderer<'m> {
    measurer: &'m Measurer,
    color: Rgb,
}

impl<'m> FormulaRenderer<'m> {
    pub fn new(measurer: &'m Measurer, color: Rgb) -> Self {
        Self { measurer, color }
    }

    pub fn render(&self, ctx: &RenderContext<'_>, surface: &mut dyn DrawingSurface) -> TextOutcome {
        let Some(formula) = ctx.cell.formula() else {
            return TextOutcome::default();
        };
        if !surface.supports_text() {
            return TextOutcome {
                drawn: false,
                degraded: true,
            };
        }

        let style = ctx.style();
        let font = style.font.scaled(ctx.scale);
        let width = self.measurer.measure_extent(&font, formula);
        let line = self.measurer.measure_extent(&font, "M");
        let (x, y) = align_block(
            ctx.rect,
            width.width,
            line.height,
            &style.alignment,
            false,
            TEXT_PADDING * ctx.scale,
        );
        surface.draw_text(x, y, formula, &font, self.color);
        TextOutcome {
            drawn: true,
            degraded: width.approximate || line.approximate,
        }
    }
}
