//! Cell borders: solid, dashed, dotted, double and dash-dot strokes.
//!
//! Patterned styles are broken into plain line segments along the stroke's
//! unit direction, so every backend draws them identically.

use super::context::RenderContext;
use super::surface::DrawingSurface;
use crate::color::Rgb;
use crate::types::{BorderSide, BorderStyle};

/// A straight stroke `(x1, y1, x2, y2)`.
pub type Segment = (f64, f64, f64, f64);

/// Offset of each stroke of a double border from the center line.
const DOUBLE_OFFSET: f64 = 1.0;

/// `(on, off)` cycle of a patterned style; `None` for solid strokes.
///
/// Slanted dash-dot has no cycle and is stroked solid.
fn dash_cycle(style: BorderStyle) -> Option<&'static [(f64, f64)]> {
    match style {
        BorderStyle::Dashed | BorderStyle::MediumDashed => Some(&[(5.0, 3.0)]),
        BorderStyle::Dotted | BorderStyle::Hair => Some(&[(0.5, 2.5)]),
        BorderStyle::DashDot | BorderStyle::MediumDashDot => Some(&[(5.0, 2.0), (2.0, 2.0)]),
        BorderStyle::DashDotDot | BorderStyle::MediumDashDotDot => {
            Some(&[(5.0, 2.0), (2.0, 2.0), (2.0, 2.0)])
        }
        _ => None,
    }
}

/// The segments that make up one border stroke from `(x1, y1)` to `(x2, y2)`.
///
/// Pattern lengths are multiplied by `scale`. A zero-length stroke yields
/// nothing; a solid style yields the whole stroke.
pub fn dash_segments(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    style: BorderStyle,
    scale: f64,
) -> Vec<Segment> {
    let length = (x2 - x1).hypot(y2 - y1);
    if length <= 0.0 || style.is_none() {
        return Vec::new();
    }
    let Some(cycle) = dash_cycle(style) else {
        return vec![(x1, y1, x2, y2)];
    };
    let scale = if scale > 0.0 { scale } else { 1.0 };
    let (dx, dy) = ((x2 - x1) / length, (y2 - y1) / length);

    let mut out = Vec::new();
    let mut pos = 0.0;
    'stroke: loop {
        for &(on, off) in cycle {
            if pos >= length {
                break 'stroke;
            }
            let end = (pos + on * scale).min(length);
            out.push((x1 + dx * pos, y1 + dy * pos, x1 + dx * end, y1 + dy * end));
            pos = end + off * scale;
        }
    }
    out
}

/// Paints the four sides and any diagonals of a cell's border.
#[derive(Debug, Clone, Copy, Default)]
pub struct BorderRenderer;

impl BorderRenderer {
    /// Returns whether any side was drawn.
    pub fn render(&self, ctx: &RenderContext<'_>, surface: &mut dyn DrawingSurface) -> bool {
        let border = &ctx.style().border;
        let r = ctx.rect;
        let (left, top, right, bottom) = (r.left(), r.top(), r.right(), r.bottom());
        let scale = ctx.scale;

        let mut drew = false;
        drew |= draw_side(surface, &border.left, (left, top, left, bottom), scale);
        drew |= draw_side(surface, &border.right, (right, top, right, bottom), scale);
        drew |= draw_side(surface, &border.top, (left, top, right, top), scale);
        drew |= draw_side(surface, &border.bottom, (left, bottom, right, bottom), scale);

        if border.diagonal_up {
            drew |= draw_side(surface, &border.diagonal, (left, bottom, right, top), scale);
        }
        if border.diagonal_down {
            drew |= draw_side(surface, &border.diagonal, (left, top, right, bottom), scale);
        }
        drew
    }
}

fn draw_side(surface: &mut dyn DrawingSurface, side: &BorderSide, line: Segment, scale: f64) -> bool {
    let (x1, y1, x2, y2) = line;
    let length = (x2 - x1).hypot(y2 - y1);
    if side.style.is_none() || length <= 0.0 {
        return false;
    }

    surface.set_line_color(side.color.unwrap_or(Rgb::BLACK));
    surface.set_line_width(side.style.width() * scale);

    if side.style == BorderStyle::Double {
        let (nx, ny) = (-(y2 - y1) / length, (x2 - x1) / length);
        let offset = DOUBLE_OFFSET * scale;
        surface.draw_line(x1 + nx * offset, y1 + ny * offset, x2 + nx * offset, y2 + ny * offset);
        surface.draw_line(x1 - nx * offset, y1 - ny * offset, x2 - nx * offset, y2 - ny * offset);
        return true;
    }

    for (sx1, sy1, sx2, sy2) in dash_segments(x1, y1, x2, y2, side.style, scale) {
        surface.draw_line(sx1, sy1, sx2, sy2);
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

    fn covered(segments: &[Segment]) -> f64 {
        segments
            .iter()
            .map(|&(x1, y1, x2, y2)| (x2 - x1).hypot(y2 - y1))
            .sum()
    }

    #[test]
    fn test_dashed_100_units() {
        let segs = dash_segments(0.0, 0.0, 100.0, 0.0, BorderStyle::Dashed, 1.0);
        assert_eq!(segs.len(), 13);
        assert_eq!(segs[0], (0.0, 0.0, 5.0, 0.0));
        assert_eq!(segs[1].0, 8.0);
        assert!((covered(&segs) - 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_dotted_marks_every_three_units() {
        let segs = dash_segments(0.0, 0.0, 0.0, 30.0, BorderStyle::Dotted, 1.0);
        assert_eq!(segs.len(), 10);
        assert!(segs.iter().all(|s| (s.3 - s.1 - 0.5).abs() < 1e-9));
        assert_eq!(segs[1].1, 3.0);
    }

    #[test]
    fn test_dash_dot_dot_cycle() {
        let segs = dash_segments(0.0, 0.0, 17.0, 0.0, BorderStyle::DashDotDot, 1.0);
        let starts: Vec<f64> = segs.iter().map(|s| s.0).collect();
        assert_eq!(starts, vec![0.0, 7.0, 11.0, 15.0]);
    }

    #[test]
    fn test_solid_and_zero_length() {
        assert_eq!(
            dash_segments(0.0, 0.0, 10.0, 0.0, BorderStyle::Thin, 1.0),
            vec![(0.0, 0.0, 10.0, 0.0)]
        );
        assert!(dash_segments(5.0, 5.0, 5.0, 5.0, BorderStyle::Dashed, 1.0).is_empty());
        assert!(dash_segments(0.0, 0.0, 10.0, 0.0, BorderStyle::None, 1.0).is_empty());
    }

    #[test]
    fn test_diagonal_dash_follows_direction() {
        let segs = dash_segments(0.0, 0.0, 30.0, 40.0, BorderStyle::Dashed, 1.0);
        let (x1, y1, x2, y2) = segs[0];
        assert_eq!((x1, y1), (0.0, 0.0));
        assert!((x2 - 3.0).abs() < 1e-9 && (y2 - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_scaled_pattern() {
        let segs = dash_segments(0.0, 0.0, 100.0, 0.0, BorderStyle::Dashed, 2.0);
        assert_eq!(segs[0].2, 10.0);
        assert_eq!(segs[1].0, 16.0);
    }
}
