//! Layout tests: column widths, row heights, wrapping and merged geometry.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_lossless
)]

mod common;

use common::approx;
use test_case::test_case;
use xlrender::layout::{LINE_SPACING, MIN_COLUMN_WIDTH, MIN_ROW_HEIGHT};
use xlrender::render::DrawCommand;
use xlrender::{
    Alignment, CellStyle, Font, LayoutCache, LayoutCalculator, Measurer, Worksheet,
    XlrenderError,
};

fn wrapped() -> CellStyle {
    CellStyle {
        alignment: Alignment {
            wrap_text: true,
            ..Alignment::default()
        },
        ..CellStyle::default()
    }
}

#[test]
fn test_empty_rows_and_columns_get_minimum_floors() {
    let ws = Worksheet::new("Empty");
    let measurer = Measurer::default();
    let mut cache = LayoutCache::new();
    let mut calc = LayoutCalculator::new(&ws, &measurer, &mut cache);
    for i in [1, 2, 50, 16_384] {
        assert_eq!(calc.column_width(i), MIN_COLUMN_WIDTH);
        assert_eq!(calc.row_height(i), MIN_ROW_HEIGHT);
    }
    assert_eq!(calc.worksheet_size(), (0.0, 0.0));
}

#[test]
fn test_long_text_widens_its_column_only() {
    let mut ws = Worksheet::new("S");
    let label = "A fairly long label for one column";
    ws.set_value(1, 1, label);
    ws.set_value(1, 2, "short");
    let measurer = Measurer::default();
    let expected = measurer.measure(&xlrender::Font::default(), label).0;
    let mut cache = LayoutCache::new();
    let mut calc = LayoutCalculator::new(&ws, &measurer, &mut cache);
    assert!(expected > MIN_COLUMN_WIDTH);
    assert_eq!(calc.column_width(1), expected);
    assert_eq!(calc.column_width(2), MIN_COLUMN_WIDTH);
}

#[test]
fn test_configured_dimensions_win_when_larger() {
    let mut ws = Worksheet::new("S");
    ws.set_value(1, 1, "x");
    ws.set_column_width(1, 20.0);
    ws.set_row_height(1, 42.0);
    ws.set_row_height(2, 5.0);
    let measurer = Measurer::default();
    let mut cache = LayoutCache::new();
    let mut calc = LayoutCalculator::new(&ws, &measurer, &mut cache);
    assert_eq!(calc.column_width(1), 150.0);
    assert_eq!(calc.row_height(1), 42.0);
    assert_eq!(calc.row_height(2), MIN_ROW_HEIGHT);
}

#[test]
fn test_layout_is_stable_across_calls_and_cache_clears() {
    let ws = common::grid(10, 6);
    let measurer = Measurer::default();
    let mut cache = LayoutCache::new();
    let mut calc = LayoutCalculator::new(&ws, &measurer, &mut cache);
    let first: Vec<f64> = (1..=6).map(|c| calc.column_width(c)).collect();
    let heights: Vec<f64> = (1..=10).map(|r| calc.row_height(r)).collect();
    let second: Vec<f64> = (1..=6).map(|c| calc.column_width(c)).collect();
    assert_eq!(first, second);
    calc.clear_cache();
    let after_clear: Vec<f64> = (1..=10).map(|r| calc.row_height(r)).collect();
    assert_eq!(heights, after_clear);
}

#[test]
fn test_cache_is_caller_owned() {
    let ws = common::grid(3, 3);
    let measurer = Measurer::default();
    let mut cache = LayoutCache::new();
    {
        let mut calc = LayoutCalculator::new(&ws, &measurer, &mut cache);
        calc.worksheet_size();
    }
    assert!(!cache.is_empty());
    assert_eq!(cache.cached_column_widths(), 3);
    assert_eq!(cache.cached_row_heights(), 3);
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_wrapped_text_grows_row_height() {
    let mut ws = Worksheet::new("S");
    let text = "one two three four five six seven eight nine ten";
    ws.set_value(1, 1, text).style = wrapped();
    let measurer = Measurer::default();
    let font = xlrender::Font::default();
    let lines = measurer.wrap(&font, text, 100.0);
    assert!(lines.len() > 1);

    let mut cache = LayoutCache::new();
    let mut calc = LayoutCalculator::new(&ws, &measurer, &mut cache);
    let expected = lines.len() as f64 * measurer.font_metrics(&font).height * LINE_SPACING;
    assert!(approx(calc.cell_size(1, 1).1, expected));
    assert!(approx(calc.row_height(1), expected.max(MIN_ROW_HEIGHT)));
    let widest = lines
        .iter()
        .map(|l| measurer.measure(&font, l).0)
        .fold(0.0, f64::max);
    assert!(widest <= 100.0);
}

#[test_case(0, 0.0 ; "no indent")]
#[test_case(1, 15.0 ; "one level")]
#[test_case(3, 45.0 ; "three levels")]
fn test_indent_pads_content_width(indent: u32, padding: f64) {
    let mut ws = Worksheet::new("S");
    let cell = ws.set_value(1, 1, "abc");
    cell.style.alignment.indent = indent;
    let measurer = Measurer::default();
    let text_width = measurer.measure(&xlrender::Font::default(), "abc").0;
    let mut cache = LayoutCache::new();
    let mut calc = LayoutCalculator::new(&ws, &measurer, &mut cache);
    assert_eq!(calc.cell_size(1, 1).0, text_width + padding);
}

#[test]
fn test_merged_cells_do_not_drive_their_columns() {
    let mut ws = Worksheet::new("S");
    ws.set_value(1, 1, "This label is far wider than one column");
    ws.merge_cells("A1:C1").unwrap();
    let measurer = Measurer::default();
    let mut cache = LayoutCache::new();
    let mut calc = LayoutCalculator::new(&ws, &measurer, &mut cache);
    assert_eq!(calc.column_width(1), MIN_COLUMN_WIDTH);
    let regions = calc.merged_region_geometry().unwrap();
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].width, 3.0 * MIN_COLUMN_WIDTH);
    assert_eq!(regions[0].height, MIN_ROW_HEIGHT);
}

#[test]
fn test_geometry_matches_calculator() {
    let mut ws = common::grid(4, 3);
    ws.set_value(2, 2, "A much wider value in the middle");
    ws.merge_cells("A3:B4").unwrap();
    let measurer = Measurer::default();
    let mut cache = LayoutCache::new();
    let mut calc = LayoutCalculator::new(&ws, &measurer, &mut cache);
    let geometry = calc.geometry().unwrap();

    for row in 1..=4 {
        for col in 1..=3 {
            let rect = calc.cell_rect(row, col);
            assert_eq!(geometry.cell_rect(row, col), rect);
        }
    }
    let (w, h) = calc.worksheet_size();
    assert!(approx(geometry.total_width(), w));
    assert!(approx(geometry.total_height(), h));

    let anchor = geometry.render_rect(3, 1).unwrap();
    assert!(approx(anchor.width, calc.column_width(1) + calc.column_width(2)));
    assert!(approx(anchor.height, calc.row_height(3) + calc.row_height(4)));
    assert!(geometry.render_rect(4, 2).is_none());
    assert_eq!(geometry.merged_rect(4, 2), Some(anchor));
}

#[test]
fn test_hit_testing_round_trips_cell_positions() {
    let ws = common::grid(5, 5);
    let measurer = Measurer::default();
    let mut cache = LayoutCache::new();
    let geometry = LayoutCalculator::new(&ws, &measurer, &mut cache)
        .geometry()
        .unwrap();
    for row in 1..=5 {
        for col in 1..=5 {
            let (cx, cy) = geometry.cell_rect(row, col).center();
            assert_eq!(geometry.row_at_y(cy), Some(row));
            assert_eq!(geometry.col_at_x(cx), Some(col));
        }
    }
    assert_eq!(geometry.row_at_y(-1.0), None);
    assert_eq!(geometry.col_at_x(geometry.total_width() + 1.0), None);
}

#[test]
fn test_merge_outside_extent_is_fatal() {
    let json = r#"{
        "name": "Broken",
        "cells": [],
        "mergedRanges": [{"startRow": 1, "startCol": 0, "endRow": 2, "endCol": 2}]
    }"#;
    let ws: Worksheet = serde_json::from_str(json).unwrap();
    let measurer = Measurer::default();
    let mut cache = LayoutCache::new();
    let mut calc = LayoutCalculator::new(&ws, &measurer, &mut cache);
    let err = calc.geometry().unwrap_err();
    assert!(matches!(err, XlrenderError::OutOfBounds { col: 0, .. }));
}

#[test_case(24.0 ; "just past the largest face")]
#[test_case(48.0 ; "title")]
#[test_case(72.0 ; "banner")]
fn test_large_fonts_reserve_their_height(size: f64) {
    let mut ws = Worksheet::new("S");
    ws.set_value(1, 1, "Title").style.font = Font::default().with_size(size);
    ws.set_value(2, 1, "below");
    let measurer = Measurer::default();
    let mut cache = LayoutCache::new();
    let mut calc = LayoutCalculator::new(&ws, &measurer, &mut cache);

    let (w, h) = calc.cell_size(1, 1);
    assert!(h >= size, "height {h} for {size}pt");
    assert!(w >= 2.0 * size, "width {w} for {size}pt");
    assert!(calc.row_height(1) >= size);
    let next_row_top = calc.cell_position(2, 1).1;

    // The drawn glyph box stays inside its own row.
    let doc = common::record(&ws);
    let title = doc
        .commands()
        .iter()
        .find_map(|c| match c {
            DrawCommand::Text { y, text, font, .. } if text == "Title" => Some(y + font.size),
            _ => None,
        })
        .unwrap();
    assert!(title <= next_row_top, "{title} > {next_row_top}");
}

#[test]
fn test_loaded_overlapping_merges_fail_to_load() {
    let json = r#"{
        "name": "Overlap",
        "mergedRanges": [
            {"startRow": 1, "startCol": 1, "endRow": 2, "endCol": 2},
            {"startRow": 2, "startCol": 2, "endRow": 3, "endCol": 3}
        ]
    }"#;
    assert!(serde_json::from_str::<Worksheet>(json).is_err());
}

#[test]
fn test_loaded_inverted_merge_fails_to_load() {
    let json = r#"{
        "name": "Inverted",
        "mergedRanges": [{"startRow": 3, "startCol": 3, "endRow": 1, "endCol": 1}]
    }"#;
    let err = serde_json::from_str::<Worksheet>(json).unwrap_err();
    assert!(err.to_string().contains("ends before it starts"), "{err}");
}
