//! Fill tests: solid, gray and hatch patterns, banded and path gradients.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use test_case::test_case;
use xlrender::render::{BackgroundRenderer, DrawCommand};
use xlrender::{
    Cell, CellStyle, ColorStop, DocumentSurface, Fill, GradientFill, GradientKind, PatternType,
    Rect, RenderContext, Rgb, Worksheet,
};

fn paint(fill: Fill, rect: Rect, scale: f64) -> Vec<DrawCommand> {
    let ws = Worksheet::new("S");
    let cell = Cell::default().with_style(common::filled(fill));
    let ctx = RenderContext::new(&ws, 1, 1, &cell, rect, scale);
    let mut surface = DocumentSurface::new();
    BackgroundRenderer.render(&ctx, &mut surface);
    surface.commands().to_vec()
}

fn pattern(pattern: PatternType) -> Fill {
    Fill::Pattern {
        pattern,
        fg: Rgb::BLACK,
        bg: Rgb::WHITE,
    }
}

const CELL: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 64.0,
    height: 20.0,
};

#[test]
fn test_solid_fill_covers_cell() {
    let cmds = paint(Fill::solid(Rgb::new(1, 2, 3)), CELL, 1.0);
    assert_eq!(common::fill_rects(&cmds), vec![(CELL, Rgb::new(1, 2, 3))]);
}

#[test]
fn test_none_and_pattern_none_paint_nothing() {
    assert!(paint(Fill::None, CELL, 1.0).is_empty());
    assert!(paint(pattern(PatternType::None), CELL, 1.0).is_empty());
}

#[test]
fn test_solid_pattern_uses_foreground() {
    let cmds = paint(
        Fill::Pattern {
            pattern: PatternType::Solid,
            fg: Rgb::RED,
            bg: Rgb::WHITE,
        },
        CELL,
        1.0,
    );
    assert_eq!(common::fill_rects(&cmds), vec![(CELL, Rgb::RED)]);
}

#[test_case(PatternType::Gray0625, 239 ; "gray 0625")]
#[test_case(PatternType::Gray125, 223 ; "gray 125")]
#[test_case(PatternType::LightGray, 191 ; "light gray")]
#[test_case(PatternType::MediumGray, 128 ; "medium gray")]
#[test_case(PatternType::DarkGray, 64 ; "dark gray")]
fn test_gray_patterns_blend_at_density(pattern_type: PatternType, level: u8) {
    let cmds = paint(pattern(pattern_type), CELL, 1.0);
    let fills = common::fill_rects(&cmds);
    assert_eq!(fills, vec![(CELL, Rgb::new(level, level, level))]);
    assert_eq!(common::line_count(&cmds), 0);
}

#[test_case(PatternType::LightHorizontal, 3 ; "light horizontal")]
#[test_case(PatternType::DarkHorizontal, 3 ; "dark horizontal")]
#[test_case(PatternType::LightVertical, 8 ; "light vertical")]
#[test_case(PatternType::LightGrid, 11 ; "light grid")]
fn test_hatch_line_counts(pattern_type: PatternType, lines: usize) {
    let cmds = paint(pattern(pattern_type), Rect::new(0.0, 0.0, 64.0, 24.0), 1.0);
    // Background first, then the hatch.
    assert!(matches!(cmds[0], DrawCommand::FillRect { color, .. } if color == Rgb::WHITE));
    assert_eq!(common::line_count(&cmds), lines);
}

#[test_case(PatternType::LightHorizontal, 1.0 ; "light")]
#[test_case(PatternType::DarkVertical, 2.0 ; "dark")]
fn test_hatch_width_scales(pattern_type: PatternType, width: f64) {
    let cmds = paint(pattern(pattern_type), CELL, 2.0);
    for cmd in &cmds[1..] {
        match cmd {
            DrawCommand::Line { width: w, color, .. } => {
                assert_eq!(*w, width * 2.0);
                assert_eq!(*color, Rgb::BLACK);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

#[test_case(PatternType::LightDown ; "down")]
#[test_case(PatternType::DarkUp ; "up")]
#[test_case(PatternType::LightTrellis ; "trellis")]
fn test_diagonal_hatches_are_45_degrees_and_clipped(pattern_type: PatternType) {
    let rect = Rect::new(5.0, 7.0, 40.0, 30.0);
    let cmds = paint(pattern(pattern_type), rect, 1.0);
    let mut seen = 0;
    for cmd in &cmds {
        if let DrawCommand::Line { x1, y1, x2, y2, .. } = cmd {
            seen += 1;
            assert!(common::approx((x2 - x1).abs(), (y2 - y1).abs()));
            for (x, y) in [(*x1, *y1), (*x2, *y2)] {
                assert!(x >= rect.left() - 1e-9 && x <= rect.right() + 1e-9);
                assert!(y >= rect.top() - 1e-9 && y <= rect.bottom() + 1e-9);
            }
        }
    }
    assert!(seen > 2);
}

#[test]
fn test_linear_gradient_is_banded_by_earlier_stop() {
    let (a, b, c) = (Rgb::new(255, 0, 0), Rgb::new(0, 255, 0), Rgb::new(0, 0, 255));
    let gradient = Fill::Gradient(GradientFill {
        kind: GradientKind::Linear,
        stops: vec![
            ColorStop::new(1.0, c),
            ColorStop::new(0.0, a),
            ColorStop::new(0.25, b),
        ],
    });
    let rect = Rect::new(0.0, 0.0, 64.0, 40.0);
    let fills = common::fill_rects(&paint(gradient, rect, 1.0));
    assert_eq!(
        fills,
        vec![
            (Rect::new(0.0, 0.0, 64.0, 10.0), a),
            (Rect::new(0.0, 10.0, 64.0, 30.0), b),
        ]
    );
}

#[test]
fn test_single_stop_gradient_is_solid() {
    let gradient = Fill::Gradient(GradientFill {
        kind: GradientKind::Linear,
        stops: vec![ColorStop::new(0.3, Rgb::RED)],
    });
    assert_eq!(
        common::fill_rects(&paint(gradient, CELL, 1.0)),
        vec![(CELL, Rgb::RED)]
    );
    let empty = Fill::Gradient(GradientFill::default());
    assert!(paint(empty, CELL, 1.0).is_empty());
}

#[test]
fn test_path_gradient_paints_concentric_squares_outside_in() {
    let gradient = Fill::Gradient(GradientFill {
        kind: GradientKind::Path,
        stops: vec![
            ColorStop::new(0.0, Rgb::WHITE),
            ColorStop::new(1.0, Rgb::BLACK),
            ColorStop::new(0.5, Rgb::RED),
        ],
    });
    let rect = Rect::new(0.0, 0.0, 60.0, 20.0);
    let fills = common::fill_rects(&paint(gradient, rect, 1.0));
    // The zero-radius center square is empty and dropped by the surface.
    assert_eq!(
        fills,
        vec![
            (Rect::new(20.0, 0.0, 20.0, 20.0), Rgb::BLACK),
            (Rect::new(25.0, 5.0, 10.0, 10.0), Rgb::RED),
        ]
    );
}

#[test]
fn test_fill_json_is_tagged() {
    let style: CellStyle = serde_json::from_str(
        r##"{"fill": {"type": "pattern", "pattern": "darkTrellis", "fg": "#112233"}}"##,
    )
    .unwrap();
    assert_eq!(
        style.fill,
        Fill::Pattern {
            pattern: PatternType::DarkTrellis,
            fg: Rgb::new(0x11, 0x22, 0x33),
            bg: Rgb::WHITE,
        }
    );
    let gradient: Fill = serde_json::from_str(
        r##"{"type": "gradient", "kind": "path", "stops": [{"position": 0.0, "color": "#000000"}]}"##,
    )
    .unwrap();
    assert!(matches!(gradient, Fill::Gradient(GradientFill { kind: GradientKind::Path, .. })));
}

#[test]
fn test_dark_fill_flips_automatic_text_to_white() {
    let mut ws = Worksheet::new("S");
    ws.set_value(1, 1, "on dark");
    ws.set_style(1, 1, common::filled(Fill::solid(Rgb::new(0x10, 0x10, 0x40))));
    ws.set_value(1, 2, "on light");
    ws.set_style(1, 2, common::filled(Fill::solid(Rgb::new(0xF0, 0xF0, 0xC0))));
    let doc = common::record(&ws);
    let colors: Vec<Rgb> = doc
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text { color, .. } => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(colors, vec![Rgb::WHITE, Rgb::BLACK]);
}
