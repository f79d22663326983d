//! Conditional-format overlays: data bars, color scales and icon sets.
//!
//! Only numeric cell values are evaluated; text, booleans and formulas are
//! left alone by every overlay kind.

use super::context::RenderContext;
use super::surface::{fill, DrawingSurface};
use crate::color::Rgb;
use crate::layout::Rect;
use crate::types::{ColorStop, ConditionalRule, IconRule};

/// Share of the smaller cell dimension an icon occupies.
const ICON_SCALE: f64 = 0.6;

/// Fraction of the cell width a data bar covers. A degenerate `min == max`
/// range fills the whole cell.
pub fn data_bar_ratio(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span.abs() < f64::EPSILON {
        return 1.0;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

/// Color for `value` on a scale spanning `min..=max`.
///
/// The value is normalized into `0..=1` (0.5 for an empty span), then
/// interpolated between the two stops bracketing it. Outside every bracket it
/// takes the nearest end stop's color.
pub fn color_scale_color(value: f64, min: f64, max: f64, stops: &[ColorStop]) -> Option<Rgb> {
    let mut sorted = stops.to_vec();
    sorted.sort_by(|a, b| a.position.total_cmp(&b.position));
    let (first, last) = (sorted.first()?, sorted.last()?);

    let span = max - min;
    let t = if span <= 0.0 {
        0.5
    } else {
        ((value - min) / span).clamp(0.0, 1.0)
    };

    if t <= first.position {
        return Some(first.color);
    }
    if t >= last.position {
        return Some(last.color);
    }
    for pair in sorted.windows(2) {
        if let [lo, hi] = pair {
            if t >= lo.position && t <= hi.position {
                let width = hi.position - lo.position;
                let local = if width > 0.0 {
                    (t - lo.position) / width
                } else {
                    0.0
                };
                return Some(lo.color.lerp(hi.color, local));
            }
        }
    }
    Some(last.color)
}

/// The icon of the highest threshold that `value` meets or exceeds.
pub fn icon_for_value(value: f64, icons: &[IconRule]) -> Option<&IconRule> {
    let mut ordered: Vec<&IconRule> = icons.iter().collect();
    ordered.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));
    ordered.into_iter().find(|icon| value >= icon.threshold)
}

/// Paints every conditional format covering the cell, in declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalRenderer;

impl ConditionalRenderer {
    /// Returns how many overlays were painted.
    pub fn render(&self, ctx: &RenderContext<'_>, surface: &mut dyn DrawingSurface) -> usize {
        let Some(value) = ctx.cell.numeric_value() else {
            return 0;
        };
        ctx.worksheet
            .conditional_formats_at(ctx.row, ctx.col)
            .filter(|cf| self.apply(&cf.rule, value, ctx, surface))
            .count()
    }

    fn apply(
        &self,
        rule: &ConditionalRule,
        value: f64,
        ctx: &RenderContext<'_>,
        surface: &mut dyn DrawingSurface,
    ) -> bool {
        let rect = ctx.rect;
        match rule {
            ConditionalRule::DataBar { min, max, color } => {
                let ratio = data_bar_ratio(value, *min, *max);
                let bar_height = rect.height / 2.0;
                let bar = Rect::new(
                    rect.x,
                    rect.center().1 - bar_height / 2.0,
                    rect.width * ratio,
                    bar_height,
                );
                fill(surface, bar, *color);
                true
            }
            ConditionalRule::ColorScale { min, max, stops } => {
                match color_scale_color(value, *min, *max, stops) {
                    Some(color) => {
                        fill(surface, rect, color);
                        true
                    }
                    None => false,
                }
            }
            ConditionalRule::IconSet { icons } => {
                let Some(icon) = icon_for_value(value, icons) else {
                    return false;
                };
                if !surface.supports_text() {
                    return false;
                }
                let size = rect.width.min(rect.height) * ICON_SCALE;
                let (cx, cy) = rect.center();
                let font = ctx.style().font.clone().with_size(size);
                surface.draw_text(
                    cx - size / 2.0,
                    cy - size / 2.0,
                    &icon.symbol,
                    &font,
                    icon.color.unwrap_or(Rgb::BLACK),
                );
                true
            }
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

    #[test]
    fn test_data_bar_ratio() {
        assert_eq!(data_bar_ratio(50.0, 0.0, 100.0), 0.5);
        assert_eq!(data_bar_ratio(-5.0, 0.0, 100.0), 0.0);
        assert_eq!(data_bar_ratio(500.0, 0.0, 100.0), 1.0);
        assert_eq!(data_bar_ratio(3.0, 7.0, 7.0), 1.0);
    }

    #[test]
    fn test_color_scale_interpolates_between_brackets() {
        let stops = [
            ColorStop::new(1.0, Rgb::WHITE),
            ColorStop::new(0.0, Rgb::BLACK),
        ];
        assert_eq!(color_scale_color(0.0, 0.0, 10.0, &stops), Some(Rgb::BLACK));
        assert_eq!(color_scale_color(10.0, 0.0, 10.0, &stops), Some(Rgb::WHITE));
        assert_eq!(
            color_scale_color(5.0, 0.0, 10.0, &stops),
            Some(Rgb::new(128, 128, 128))
        );
        assert_eq!(color_scale_color(99.0, 0.0, 10.0, &stops), Some(Rgb::WHITE));
        assert!(color_scale_color(1.0, 0.0, 1.0, &[]).is_none());
    }

    #[test]
    fn test_color_scale_outside_stop_range_uses_nearest_end() {
        let red = Rgb::new(255, 0, 0);
        let green = Rgb::new(0, 255, 0);
        let stops = [ColorStop::new(0.25, red), ColorStop::new(0.75, green)];
        assert_eq!(color_scale_color(0.0, 0.0, 100.0, &stops), Some(red));
        assert_eq!(color_scale_color(100.0, 0.0, 100.0, &stops), Some(green));
    }

    #[test]
    fn test_icon_selection_checks_highest_threshold_first() {
        let icons = vec![
            IconRule::new(0.0, "v"),
            IconRule::new(67.0, "^"),
            IconRule::new(33.0, ">"),
        ];
        assert_eq!(icon_for_value(80.0, &icons).unwrap().symbol, "^");
        assert_eq!(icon_for_value(67.0, &icons).unwrap().symbol, "^");
        assert_eq!(icon_for_value(50.0, &icons).unwrap().symbol, ">");
        assert_eq!(icon_for_value(1.0, &icons).unwrap().symbol, "v");
        assert!(icon_for_value(-1.0, &icons).is_none());
    }
}
