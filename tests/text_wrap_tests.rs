//! Text tests: wrapping, wrap idempotence, alignment and rendered line stacks.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use test_case::test_case;
use xlrender::layout::LINE_SPACING;
use xlrender::render::{align_block, DrawCommand, TextRenderer, TEXT_PADDING};
use xlrender::{
    Alignment, Cell, CellStyle, DocumentSurface, Font, HAlign, Measurer, Rect, RenderContext,
    VAlign, Worksheet,
};

const SAMPLES: &[&str] = &[
    "The quick brown fox jumps over the lazy dog",
    "short",
    "Supercalifragilisticexpialidocious is a long word",
    "  leading and   repeated   spaces  ",
    "one\ttab separated\nand a newline",
];

#[test_case(40.0 ; "narrow")]
#[test_case(100.0 ; "default")]
#[test_case(250.0 ; "wide")]
fn test_wrap_is_idempotent(width: f64) {
    let measurer = Measurer::default();
    let font = Font::default();
    for text in SAMPLES {
        let once = measurer.wrap(&font, text, width);
        let again = measurer.wrap(&font, &once.join(" "), width);
        assert_eq!(once, again, "{text:?} at {width}");
    }
}

#[test]
fn test_wrapped_lines_fit_unless_single_word() {
    let measurer = Measurer::default();
    let font = Font::default();
    for text in SAMPLES {
        for line in measurer.wrap(&font, text, 100.0) {
            let (w, _) = measurer.measure(&font, &line);
            assert!(w <= 100.0 || !line.contains(' '), "{line:?} is {w} wide");
        }
    }
}

#[test]
fn test_wrap_of_blank_text_is_empty() {
    let measurer = Measurer::default();
    assert!(measurer.wrap(&Font::default(), "   ", 50.0).is_empty());
    assert!(measurer.wrap(&Font::default(), "", 50.0).is_empty());
}

#[test]
fn test_wrap_results_are_cached_and_clearable() {
    let measurer = Measurer::default();
    let font = Font::default();
    let a = measurer.wrap(&font, SAMPLES[0], 80.0);
    let b = measurer.wrap(&font, SAMPLES[0], 80.0);
    assert_eq!(a, b);
    measurer.clear();
    assert_eq!(measurer.wrap(&font, SAMPLES[0], 80.0), a);
}

fn render_text(style: CellStyle, value: &str, rect: Rect) -> Vec<DrawCommand> {
    let ws = Worksheet::new("S");
    let mut cell = Cell::default().with_style(style);
    cell.value = value.into();
    let measurer = Measurer::default();
    let ctx = RenderContext::new(&ws, 1, 1, &cell, rect, 1.0);
    let mut surface = DocumentSurface::new();
    TextRenderer::new(&measurer).render(&ctx, &mut surface);
    surface.commands().to_vec()
}

#[test]
fn test_wrapped_text_stacks_lines_at_line_spacing() {
    let style = CellStyle {
        alignment: Alignment {
            wrap_text: true,
            vertical: VAlign::Top,
            ..Alignment::default()
        },
        ..CellStyle::default()
    };
    let text = "alpha beta gamma delta epsilon";
    let rect = Rect::new(0.0, 0.0, 90.0, 100.0);
    let cmds = render_text(style, text, rect);

    let measurer = Measurer::default();
    let expected = measurer.wrap(&Font::default(), text, 90.0);
    let mut ys = Vec::new();
    let mut lines = Vec::new();
    for cmd in &cmds {
        if let DrawCommand::Text { y, text, .. } = cmd {
            ys.push(*y);
            lines.push(text.clone());
        }
    }
    assert_eq!(lines, expected);
    assert!(lines.len() > 1);
    let step = measurer.font_metrics(&Font::default()).height * LINE_SPACING;
    for pair in ys.windows(2) {
        assert!(common::approx(pair[1] - pair[0], step));
    }
    assert_eq!(ys[0], TEXT_PADDING);
}

#[test]
fn test_whitespace_only_text_draws_nothing() {
    let cmds = render_text(CellStyle::default(), "   ", Rect::new(0.0, 0.0, 64.0, 20.0));
    assert!(cmds.is_empty());
}

#[test_case(HAlign::Left, VAlign::Top, (2.0, 2.0) ; "left top")]
#[test_case(HAlign::Center, VAlign::Center, (30.0, 15.0) ; "center center")]
#[test_case(HAlign::Right, VAlign::Bottom, (58.0, 28.0) ; "right bottom")]
#[test_case(HAlign::Fill, VAlign::Justify, (0.0, 0.0) ; "fill falls back to edges")]
#[test_case(HAlign::Distributed, VAlign::Distributed, (0.0, 0.0) ; "distributed")]
#[test_case(HAlign::CenterContinuous, VAlign::Top, (30.0, 2.0) ; "center across")]
fn test_alignment_offsets(h: HAlign, v: VAlign, expected: (f64, f64)) {
    let alignment = Alignment {
        horizontal: h,
        vertical: v,
        ..Alignment::default()
    };
    let rect = Rect::new(0.0, 0.0, 100.0, 40.0);
    assert_eq!(align_block(rect, 40.0, 10.0, &alignment, false, 2.0), expected);
}

#[test]
fn test_default_vertical_alignment_is_bottom() {
    assert_eq!(Alignment::default().vertical, VAlign::Bottom);
    let cmds = render_text(CellStyle::default(), "Hello", Rect::new(0.0, 0.0, 64.0, 20.0));
    match &cmds[..] {
        // 20 high cell, 13 high text, 2 padding.
        [DrawCommand::Text { x, y, .. }] => assert_eq!((*x, *y), (2.0, 5.0)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test_case(HAlign::Left, 0, 2.0 ; "left without indent")]
#[test_case(HAlign::Left, 2, 17.0 ; "left indented two steps")]
#[test_case(HAlign::Right, 1, 200.0 - 7.5 - 40.0 - 2.0 ; "right indented")]
#[test_case(HAlign::Center, 3, 80.0 ; "center ignores indent")]
fn test_indent_shifts_text_from_aligned_edge(h: HAlign, indent: u32, x: f64) {
    let style = CellStyle {
        alignment: Alignment {
            horizontal: h,
            indent,
            ..Alignment::default()
        },
        ..CellStyle::default()
    };
    let cmds = render_text(style, "Hello", Rect::new(0.0, 0.0, 200.0, 20.0));
    match &cmds[..] {
        [DrawCommand::Text { x: drawn, .. }] => assert_eq!(*drawn, x),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_booleans_display_upper_case() {
    let mut ws = Worksheet::new("S");
    ws.set_value(1, 1, true);
    ws.set_value(1, 2, false);
    let doc = common::record(&ws);
    assert_eq!(
        common::texts(doc.commands()),
        vec!["TRUE".to_string(), "FALSE".to_string()]
    );
}

#[test]
fn test_number_formats_apply_to_display() {
    let mut ws = Worksheet::new("S");
    ws.set_value(1, 1, 0.256).style.number_format = "0.0%".to_string();
    ws.set_value(1, 2, 1234.5).style.number_format = "#,##0.00".to_string();
    let doc = common::record(&ws);
    assert_eq!(
        common::texts(doc.commands()),
        vec!["25.6%".to_string(), "1,234.50".to_string()]
    );
}
