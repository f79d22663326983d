//! Shared worksheet builders and assertion helpers for integration tests.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use xlrender::render::DrawCommand;
use xlrender::{
    Border, BorderSide, BorderStyle, CellStyle, DocumentSurface, Fill, LayoutCache,
    LayoutCalculator, Measurer, Page, Paginator, Rect, Rgb, SheetRenderer, Worksheet,
};

/// A sheet filled with `rows` x `cols` short labels.
pub fn grid(rows: u32, cols: u32) -> Worksheet {
    let mut ws = Worksheet::new("Grid");
    for row in 1..=rows {
        for col in 1..=cols {
            ws.set_value(row, col, format!("r{row}c{col}"));
        }
    }
    ws
}

pub fn bordered(style: BorderStyle) -> CellStyle {
    CellStyle {
        border: Border::all(BorderSide::new(style)),
        ..CellStyle::default()
    }
}

pub fn filled(fill: Fill) -> CellStyle {
    CellStyle {
        fill,
        ..CellStyle::default()
    }
}

/// Paginate with a fresh cache.
pub fn paginate(ws: &Worksheet) -> Vec<Page> {
    let measurer = Measurer::default();
    let mut cache = LayoutCache::new();
    let mut calc = LayoutCalculator::new(ws, &measurer, &mut cache);
    Paginator::for_worksheet(ws).paginate(&mut calc).unwrap()
}

/// Render the whole sheet into a recording surface.
pub fn record(ws: &Worksheet) -> DocumentSurface {
    let measurer = Measurer::default();
    let mut renderer = SheetRenderer::new(ws, &measurer);
    let mut doc = DocumentSurface::new();
    renderer.render_sheet(&mut doc).unwrap();
    doc
}

pub fn fill_rects(commands: &[DrawCommand]) -> Vec<(Rect, Rgb)> {
    commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillRect { rect, color } => Some((*rect, *color)),
            _ => None,
        })
        .collect()
}

pub fn texts(commands: &[DrawCommand]) -> Vec<String> {
    commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub fn line_count(commands: &[DrawCommand]) -> usize {
    commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Line { .. }))
        .count()
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
