//! Per-cell orchestration of the sub-renderers.

use super::background::BackgroundRenderer;
use super::border::BorderRenderer;
use super::conditional::ConditionalRenderer;
use super::context::RenderContext;
use super::formula::FormulaRenderer;
use super::surface::DrawingSurface;
use super::text::TextRenderer;
use crate::color::Rgb;
use crate::layout::Measurer;

/// Which stages ran for one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderedLayers {
    /// Non-anchor member of a merged range; nothing was drawn.
    pub skipped: bool,
    /// The fill painted something.
    pub background: bool,
    /// At least one border side was stroked.
    pub border: bool,
    pub text: bool,
    pub formula: bool,
    /// Number of conditional-format overlays painted.
    pub conditional: usize,
    /// Text was placed with approximate metrics or could not be drawn.
    pub degraded_text: bool,
}

/// Renders one cell: background, border, formula or text, then overlays.
///
/// Later stages paint over earlier ones. Merged cells paint only at their
/// anchor, whose context rectangle must already span the merged block.
#[derive(Debug, Clone, Copy)]
pub struct CellRenderer<'m> {
    text: TextRenderer<'m>,
    formula: FormulaRenderer<'m>,
}

impl<'m> CellRenderer<'m> {
    pub fn new(measurer: &'m Measurer) -> Self {
        Self::with_formula_color(measurer, Rgb::RED)
    }

    pub fn with_formula_color(measurer: &'m Measurer, formula_color: Rgb) -> Self {
        Self {
            text: TextRenderer::new(measurer),
            formula: FormulaRenderer::new(measurer, formula_color),
        }
    }

    pub fn render(&self, ctx: &RenderContext<'_>, surface: &mut dyn DrawingSurface) -> RenderedLayers {
        let (row, col) = (ctx.row, ctx.col);
        if ctx.worksheet.is_merged(row, col) && !ctx.worksheet.is_merged_parent(row, col) {
            log::trace!("({row}, {col}): merged member, skipped");
            return RenderedLayers {
                skipped: true,
                ..RenderedLayers::default()
            };
        }

        let mut layers = RenderedLayers {
            background: BackgroundRenderer.render(ctx, surface),
            border: BorderRenderer.render(ctx, surface),
            ..RenderedLayers::default()
        };

        if ctx.cell.is_formula() {
            let outcome = self.formula.render(ctx, surface);
            layers.formula = outcome.drawn;
            layers.degraded_text = outcome.degraded;
        } else if !ctx.cell.is_blank() {
            let outcome = self.text.render(ctx, surface);
            layers.text = outcome.drawn;
            layers.degraded_text = outcome.degraded;
        }

        layers.conditional = ConditionalRenderer.render(ctx, surface);

        log::trace!("({row}, {col}): {layers:?}");
        layers
    }
}
