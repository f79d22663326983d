//! Cell backgrounds: solid, pattern and gradient fills.

use super::context::RenderContext;
use super::surface::{fill, DrawingSurface};
use crate::color::Rgb;
use crate::layout::Rect;
use crate::types::{Fill, GradientFill, GradientKind, PatternType};

/// Pattern tile edge before scaling.
const PATTERN_TILE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hatch {
    Horizontal,
    Vertical,
    /// Top-left to bottom-right
    Down,
    /// Bottom-left to top-right
    Up,
}

/// Fraction of foreground ink in the gray patterns.
fn gray_density(pattern: PatternType) -> Option<f64> {
    match pattern {
        PatternType::Gray0625 => Some(0.0625),
        PatternType::Gray125 => Some(0.125),
        PatternType::LightGray => Some(0.25),
        PatternType::MediumGray => Some(0.5),
        PatternType::DarkGray => Some(0.75),
        _ => None,
    }
}

/// Hatch directions and stroke width of the line patterns.
fn hatches(pattern: PatternType) -> Option<(&'static [Hatch], f64)> {
    use Hatch::{Down, Horizontal, Up, Vertical};
    let out: (&'static [Hatch], f64) = match pattern {
        PatternType::DarkHorizontal => (&[Horizontal], 2.0),
        PatternType::DarkVertical => (&[Vertical], 2.0),
        PatternType::DarkDown => (&[Down], 2.0),
        PatternType::DarkUp => (&[Up], 2.0),
        PatternType::DarkGrid => (&[Horizontal, Vertical], 2.0),
        PatternType::DarkTrellis => (&[Down, Up], 2.0),
        PatternType::LightHorizontal => (&[Horizontal], 1.0),
        PatternType::LightVertical => (&[Vertical], 1.0),
        PatternType::LightDown => (&[Down], 1.0),
        PatternType::LightUp => (&[Up], 1.0),
        PatternType::LightGrid => (&[Horizontal, Vertical], 1.0),
        PatternType::LightTrellis => (&[Down, Up], 1.0),
        _ => return None,
    };
    Some(out)
}

/// Paints the cell's fill. Returns whether anything was drawn.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundRenderer;

impl BackgroundRenderer {
    pub fn render(&self, ctx: &RenderContext<'_>, surface: &mut dyn DrawingSurface) -> bool {
        let rect = ctx.rect;
        if rect.is_empty() {
            return false;
        }
        match &ctx.style().fill {
            Fill::None => false,
            Fill::Solid { color } => {
                fill(surface, rect, *color);
                true
            }
            Fill::Pattern { pattern, fg, bg } => {
                paint_pattern(surface, rect, *pattern, *fg, *bg, ctx.scale)
            }
            Fill::Gradient(gradient) => paint_gradient(surface, rect, gradient),
        }
    }
}

fn paint_pattern(
    surface: &mut dyn DrawingSurface,
    rect: Rect,
    pattern: PatternType,
    fg: Rgb,
    bg: Rgb,
    scale: f64,
) -> bool {
    match pattern {
        PatternType::None => return false,
        PatternType::Solid => {
            fill(surface, rect, fg);
            return true;
        }
        _ => {}
    }

    if let Some(density) = gray_density(pattern) {
        fill(surface, rect, bg.lerp(fg, density));
        return true;
    }

    fill(surface, rect, bg);
    let tile = PATTERN_TILE * scale;
    if let Some((directions, width)) = hatches(pattern) {
        if tile > 0.0 {
            surface.set_line_color(fg);
            surface.set_line_width(width * scale);
            for &direction in directions {
                hatch(surface, rect, direction, tile);
            }
        }
    }
    true
}

/// Parallel fg lines across `rect`, one per tile, clipped to the rectangle.
fn hatch(surface: &mut dyn DrawingSurface, rect: Rect, direction: Hatch, tile: f64) {
    let (left, top, right, bottom) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    let (w, h) = (rect.width, rect.height);

    match direction {
        Hatch::Horizontal => {
            let mut y = top + tile / 2.0;
            while y < bottom {
                surface.draw_line(left, y, right, y);
                y += tile;
            }
        }
        Hatch::Vertical => {
            let mut x = left + tile / 2.0;
            while x < right {
                surface.draw_line(x, top, x, bottom);
                x += tile;
            }
        }
        Hatch::Down | Hatch::Up => {
            // Each line starts at (left + k, top|bottom) and runs at 45 degrees.
            let mut k = tile / 2.0 - (h / tile).ceil() * tile;
            while k < w {
                let t0 = (-k).max(0.0);
                let t1 = h.min(w - k);
                if t1 > t0 {
                    let (x0, x1) = (left + k + t0, left + k + t1);
                    if direction == Hatch::Down {
                        surface.draw_line(x0, top + t0, x1, top + t1);
                    } else {
                        surface.draw_line(x0, bottom - t0, x1, bottom - t1);
                    }
                }
                k += tile;
            }
        }
    }
}

fn paint_gradient(surface: &mut dyn DrawingSurface, rect: Rect, gradient: &GradientFill) -> bool {
    let stops = gradient.sorted_stops();
    if stops.is_empty() {
        return false;
    }

    match gradient.kind {
        GradientKind::Linear => {
            if let [only] = stops.as_slice() {
                fill(surface, rect, only.color);
                return true;
            }
            // Banded: each stretch takes the color of the stop that opens it.
            for pair in stops.windows(2) {
                if let [from, to] = pair {
                    let y1 = rect.y + from.position.clamp(0.0, 1.0) * rect.height;
                    let y2 = rect.y + to.position.clamp(0.0, 1.0) * rect.height;
                    fill(surface, Rect::new(rect.x, y1, rect.width, y2 - y1), from.color);
                }
            }
        }
        GradientKind::Path => {
            let (cx, cy) = rect.center();
            let max_radius = rect.width.min(rect.height) / 2.0;
            for stop in stops.iter().rev() {
                let r = stop.position.clamp(0.0, 1.0) * max_radius;
                fill(surface, Rect::new(cx - r, cy - r, r * 2.0, r * 2.0), stop.color);
            }
        }
    }
    true
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
    use crate::render::document::{DocumentSurface, DrawCommand};
    use crate::types::{Cell, CellStyle, ColorStop, Worksheet};

    fn paint(fill: Fill, rect: Rect) -> Vec<DrawCommand> {
        let ws = Worksheet::new("S");
        let cell = Cell::default().with_style(CellStyle {
            fill,
            ..CellStyle::default()
        });
        let ctx = RenderContext::new(&ws, 1, 1, &cell, rect, 1.0);
        let mut surface = DocumentSurface::new();
        BackgroundRenderer.render(&ctx, &mut surface);
        surface.commands().to_vec()
    }

    fn fills(commands: &[DrawCommand]) -> Vec<(Rect, Rgb)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_no_fill_draws_nothing() {
        assert!(paint(Fill::None, Rect::new(0.0, 0.0, 10.0, 10.0)).is_empty());
    }

    #[test]
    fn test_gray_pattern_blends() {
        let cmds = paint(
            Fill::Pattern {
                pattern: PatternType::MediumGray,
                fg: Rgb::BLACK,
                bg: Rgb::WHITE,
            },
            Rect::new(0.0, 0.0, 10.0, 10.0),
        );
        let f = fills(&cmds);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].1, Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_horizontal_hatch_lines() {
        let cmds = paint(
            Fill::Pattern {
                pattern: PatternType::LightHorizontal,
                fg: Rgb::BLACK,
                bg: Rgb::WHITE,
            },
            Rect::new(0.0, 0.0, 64.0, 20.0),
        );
        let lines = cmds
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count();
        // y = 4 and y = 12
        assert_eq!(lines, 2);
    }

    #[test]
    fn test_diagonal_hatch_stays_inside() {
        let rect = Rect::new(10.0, 10.0, 30.0, 20.0);
        let cmds = paint(
            Fill::Pattern {
                pattern: PatternType::DarkTrellis,
                fg: Rgb::BLACK,
                bg: Rgb::WHITE,
            },
            rect,
        );
        let mut count = 0;
        for c in &cmds {
            if let DrawCommand::Line { x1, y1, x2, y2, .. } = c {
                count += 1;
                for (x, y) in [(*x1, *y1), (*x2, *y2)] {
                    assert!(x >= rect.left() - 1e-9 && x <= rect.right() + 1e-9);
                    assert!(y >= rect.top() - 1e-9 && y <= rect.bottom() + 1e-9);
                }
            }
        }
        assert!(count > 0);
    }

    #[test]
    fn test_linear_gradient_bands_use_earlier_stop() {
        let red = Rgb::new(255, 0, 0);
        let blue = Rgb::new(0, 0, 255);
        let cmds = paint(
            Fill::Gradient(GradientFill {
                kind: GradientKind::Linear,
                stops: vec![ColorStop::new(1.0, blue), ColorStop::new(0.0, red)],
            }),
            Rect::new(0.0, 0.0, 10.0, 40.0),
        );
        let f = fills(&cmds);
        assert_eq!(f, vec![(Rect::new(0.0, 0.0, 10.0, 40.0), red)]);
    }

    #[test]
    fn test_path_gradient_paints_largest_first() {
        let cmds = paint(
            Fill::Gradient(GradientFill {
                kind: GradientKind::Path,
                stops: vec![
                    ColorStop::new(0.5, Rgb::WHITE),
                    ColorStop::new(1.0, Rgb::BLACK),
                ],
            }),
            Rect::new(0.0, 0.0, 40.0, 20.0),
        );
        let f = fills(&cmds);
        assert_eq!(f.len(), 2);
        assert_eq!(f[0], (Rect::new(10.0, 0.0, 20.0, 20.0), Rgb::BLACK));
        assert_eq!(f[1], (Rect::new(15.0, 5.0, 10.0, 10.0), Rgb::WHITE));
    }
}
