//! Content-driven column widths, row heights and merged geometry.
//!
//! Every query is memoised in the caller-owned [`LayoutCache`]. The
//! calculator never clears the cache on its own; a mutated worksheet needs a
//! cleared (or new) cache.

use std::collections::HashMap;

use super::cache::{LayoutCache, MergedRegion};
use super::geometry::{Rect, SheetGeometry};
use super::measurer::Measurer;
use crate::error::{Result, XlrenderError};
use crate::types::{Cell, Worksheet};
use crate::units::{characters_to_points, POINTS_PER_CHARACTER};

/// Narrowest a column can resolve to, in points.
pub const MIN_COLUMN_WIDTH: f64 = 64.0;
/// Shortest a row can resolve to, in points.
pub const MIN_ROW_HEIGHT: f64 = 20.0;
/// Wrap budget for a wrapping cell whose column has no configured width.
pub const DEFAULT_WRAP_WIDTH: f64 = 100.0;
/// Multiplier applied to font height for stacked lines.
pub const LINE_SPACING: f64 = 1.2;

/// Computes sheet geometry from cell content.
pub struct LayoutCalculator<'a> {
    worksheet: &'a Worksheet,
    measurer: &'a Measurer,
    cache: &'a mut LayoutCache,
}

impl<'a> LayoutCalculator<'a> {
    pub fn new(worksheet: &'a Worksheet, measurer: &'a Measurer, cache: &'a mut LayoutCache) -> Self {
        Self {
            worksheet,
            measurer,
            cache,
        }
    }

    pub fn worksheet(&self) -> &'a Worksheet {
        self.worksheet
    }

    pub fn measurer(&self) -> &'a Measurer {
        self.measurer
    }

    /// Content size of a cell including indent padding. Blank or absent cells are `(0, 0)`.
    pub fn cell_size(&mut self, row: u32, col: u32) -> (f64, f64) {
        if let Some(&size) = self.cache.cell_sizes.get(&(row, col)) {
            return size;
        }
        let size = match self.worksheet.cell(row, col) {
            Some(cell) if !cell.is_blank() => self.measure_cell(col, cell),
            _ => (0.0, 0.0),
        };
        self.cache.cell_sizes.insert((row, col), size);
        size
    }

    #[allow(clippy::cast_precision_loss)]
    fn measure_cell(&self, col: u32, cell: &Cell) -> (f64, f64) {
        let font = &cell.style.font;
        let alignment = &cell.style.alignment;
        let text = cell.display_text();

        let (width, height) = if alignment.wrap_text {
            let wrap_width = self
                .worksheet
                .column_config(col)
                .and_then(|c| c.width)
                .map_or(DEFAULT_WRAP_WIDTH, characters_to_points);
            let lines = self.measurer.wrap(font, &text, wrap_width);
            if lines.is_empty() {
                self.measurer.measure(font, &text)
            } else {
                let line_height = self.measurer.font_metrics(font).height;
                let widest = lines
                    .iter()
                    .map(|l| self.measurer.measure(font, l).0)
                    .fold(0.0, f64::max);
                (widest, lines.len() as f64 * line_height * LINE_SPACING)
            }
        } else {
            self.measurer.measure(font, &text)
        };

        let padding = f64::from(alignment.indent) * POINTS_PER_CHARACTER * 2.0;
        (width + padding, height)
    }

    /// Rows with an unmerged cell in `col`. The index is built once per cache.
    fn column_rows(&mut self, col: u32) -> Vec<u32> {
        let worksheet = self.worksheet;
        let members = self.cache.column_members.get_or_insert_with(|| {
            let mut members: HashMap<u32, Vec<u32>> = HashMap::new();
            for ((r, c), _) in worksheet.cells() {
                if !worksheet.is_merged(r, c) {
                    members.entry(c).or_default().push(r);
                }
            }
            members
        });
        members.get(&col).cloned().unwrap_or_default()
    }

    /// Resolved width of a column in points, never below [`MIN_COLUMN_WIDTH`].
    pub fn column_width(&mut self, col: u32) -> f64 {
        if let Some(&w) = self.cache.column_widths.get(&col) {
            return w;
        }
        let content = self
            .column_rows(col)
            .into_iter()
            .map(|r| self.cell_size(r, col).0)
            .fold(0.0, f64::max);
        let configured = self
            .worksheet
            .column_config(col)
            .and_then(|c| c.width)
            .map_or(0.0, characters_to_points);
        let width = content.max(configured).max(MIN_COLUMN_WIDTH);
        self.cache.column_widths.insert(col, width);
        width
    }

    /// Resolved height of a row in points, never below [`MIN_ROW_HEIGHT`].
    pub fn row_height(&mut self, row: u32) -> f64 {
        if let Some(&h) = self.cache.row_heights.get(&row) {
            return h;
        }
        let worksheet = self.worksheet;
        let mut content: f64 = 0.0;
        for (col, _) in worksheet.cells_in_row(row) {
            if !worksheet.is_merged(row, col) {
                content = content.max(self.cell_size(row, col).1);
            }
        }
        let configured = worksheet
            .row_config(row)
            .and_then(|r| r.height)
            .unwrap_or(0.0);
        let height = content.max(configured).max(MIN_ROW_HEIGHT);
        self.cache.row_heights.insert(row, height);
        height
    }

    /// Width and height of every merged block, computed once per cache.
    ///
    /// # Errors
    /// Returns [`XlrenderError::Range`] for an inverted or overlapping merge,
    /// and [`XlrenderError::OutOfBounds`] for a merge touching row or
    /// column 0, or extending past the worksheet extent.
    pub fn merged_region_geometry(&mut self) -> Result<&[MergedRegion]> {
        if self.cache.merged.is_none() {
            let worksheet = self.worksheet;
            worksheet.validate_merges()?;
            let (max_row, max_col) = (worksheet.max_row(), worksheet.max_col());
            let mut regions = Vec::with_capacity(worksheet.merged_ranges().len());

            for range in worksheet.merged_ranges() {
                let bad = if range.start_row == 0 || range.start_col == 0 {
                    Some((range.start_row, range.start_col))
                } else if range.end_row > max_row || range.end_col > max_col {
                    Some((range.end_row, range.end_col))
                } else {
                    None
                };
                if let Some((row, col)) = bad {
                    return Err(XlrenderError::OutOfBounds {
                        row,
                        col,
                        max_row,
                        max_col,
                    });
                }

                let width = (range.start_col..=range.end_col)
                    .map(|c| self.column_width(c))
                    .sum();
                let height = (range.start_row..=range.end_row)
                    .map(|r| self.row_height(r))
                    .sum();
                regions.push(MergedRegion {
                    range: *range,
                    width,
                    height,
                });
            }
            log::trace!("resolved {} merged regions", regions.len());
            self.cache.merged = Some(regions);
        }
        Ok(self.cache.merged.as_deref().unwrap_or(&[]))
    }

    /// Total `(width, height)` of columns and rows 1 through the sheet extent.
    pub fn worksheet_size(&mut self) -> (f64, f64) {
        let width = (1..=self.worksheet.max_col())
            .map(|c| self.column_width(c))
            .sum();
        let height = (1..=self.worksheet.max_row())
            .map(|r| self.row_height(r))
            .sum();
        (width, height)
    }

    /// Top-left corner of a cell: the widths before `col` and heights before `row`.
    pub fn cell_position(&mut self, row: u32, col: u32) -> (f64, f64) {
        let x = (1..col).map(|c| self.column_width(c)).sum();
        let y = (1..row).map(|r| self.row_height(r)).sum();
        (x, y)
    }

    /// The cell's own column/row rectangle. Merges are not applied.
    pub fn cell_rect(&mut self, row: u32, col: u32) -> Rect {
        let (x, y) = self.cell_position(row, col);
        Rect::new(x, y, self.column_width(col), self.row_height(row))
    }

    /// Drop everything memoised so far.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Resolve every column, row and merge into an immutable [`SheetGeometry`].
    ///
    /// # Errors
    /// Fails when a merged range lies outside the worksheet.
    pub fn geometry(&mut self) -> Result<SheetGeometry> {
        self.merged_region_geometry()?;
        let widths: Vec<f64> = (1..=self.worksheet.max_col())
            .map(|c| self.column_width(c))
            .collect();
        let heights: Vec<f64> = (1..=self.worksheet.max_row())
            .map(|r| self.row_height(r))
            .collect();
        Ok(SheetGeometry::new(
            &widths,
            &heights,
            self.worksheet.merged_ranges(),
        ))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]
mod tests {
    use super::*;
    use crate::cell_ref::CellRange;
    use crate::types::{Alignment, CellStyle, Font};

    fn wrapping() -> CellStyle {
        CellStyle {
            alignment: Alignment {
                wrap_text: true,
                ..Alignment::default()
            },
            ..CellStyle::default()
        }
    }

    #[test]
    fn test_empty_sheet_is_zero_sized() {
        let ws = Worksheet::new("Empty");
        let m = Measurer::default();
        let mut cache = LayoutCache::new();
        let mut calc = LayoutCalculator::new(&ws, &m, &mut cache);
        assert_eq!(calc.worksheet_size(), (0.0, 0.0));
        assert!(calc.merged_region_geometry().unwrap().is_empty());
        let g = calc.geometry().unwrap();
        assert_eq!(g.max_row(), 0);
    }

    #[test]
    fn test_floors_apply_to_empty_columns() {
        let mut ws = Worksheet::new("S");
        ws.set_value(3, 3, "x");
        let m = Measurer::default();
        let mut cache = LayoutCache::new();
        let mut calc = LayoutCalculator::new(&ws, &m, &mut cache);
        assert_eq!(calc.column_width(1), MIN_COLUMN_WIDTH);
        assert_eq!(calc.row_height(2), MIN_ROW_HEIGHT);
        assert_eq!(calc.worksheet_size(), (192.0, 60.0));
    }

    #[test]
    fn test_content_widens_column() {
        let mut ws = Worksheet::new("S");
        ws.set_value(1, 1, "twenty characters...");
        let m = Measurer::default();
        let mut cache = LayoutCache::new();
        let mut calc = LayoutCalculator::new(&ws, &m, &mut cache);
        // 8px mono glyphs at the default font size.
        assert_eq!(calc.cell_size(1, 1), (160.0, 13.0));
        assert_eq!(calc.column_width(1), 160.0);
        assert_eq!(calc.row_height(1), MIN_ROW_HEIGHT);
    }

    #[test]
    fn test_configured_sizes() {
        let mut ws = Worksheet::new("S");
        ws.set_value(1, 1, "a");
        ws.set_column_width(1, 20.0);
        ws.set_row_height(1, 33.0);
        let m = Measurer::default();
        let mut cache = LayoutCache::new();
        let mut calc = LayoutCalculator::new(&ws, &m, &mut cache);
        assert_eq!(calc.column_width(1), 150.0);
        assert_eq!(calc.row_height(1), 33.0);
    }

    #[test]
    fn test_indent_padding() {
        let mut ws = Worksheet::new("S");
        let mut style = CellStyle::default();
        style.alignment.indent = 2;
        ws.set_value(1, 1, "ab").style = style;
        let m = Measurer::default();
        let mut cache = LayoutCache::new();
        let mut calc = LayoutCalculator::new(&ws, &m, &mut cache);
        assert_eq!(calc.cell_size(1, 1).0, 16.0 + 30.0);
    }

    #[test]
    fn test_wrapped_cell_grows_row() {
        let mut ws = Worksheet::new("S");
        ws.set_value(1, 1, "one two three four five six").style = wrapping();
        let m = Measurer::default();
        let mut cache = LayoutCache::new();
        let mut calc = LayoutCalculator::new(&ws, &m, &mut cache);
        let (w, h) = calc.cell_size(1, 1);
        assert!(w <= DEFAULT_WRAP_WIDTH);
        let lines = m.wrap(&Font::default(), "one two three four five six", DEFAULT_WRAP_WIDTH);
        assert!(lines.len() > 1);
        assert!((h - lines.len() as f64 * 13.0 * LINE_SPACING).abs() < 1e-9);
        assert_eq!(calc.row_height(1), h.max(MIN_ROW_HEIGHT));
    }

    #[test]
    fn test_merged_cells_ignored_for_sizing() {
        let mut ws = Worksheet::new("S");
        ws.set_value(1, 1, "a very long title that should not widen column A");
        ws.merge_cells("A1:C1").unwrap();
        let m = Measurer::default();
        let mut cache = LayoutCache::new();
        let mut calc = LayoutCalculator::new(&ws, &m, &mut cache);
        assert_eq!(calc.column_width(1), MIN_COLUMN_WIDTH);
        let regions = calc.merged_region_geometry().unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].width, 3.0 * MIN_COLUMN_WIDTH);
        assert_eq!(regions[0].height, MIN_ROW_HEIGHT);
    }

    #[test]
    fn test_out_of_bounds_merge_is_fatal() {
        let json = r#"{"name":"Bad","cells":[{"row":1,"col":1,"value":{"type":"text","value":"x"}}],
            "mergedRanges":[{"startRow":0,"startCol":1,"endRow":1,"endCol":2}]}"#;
        let ws: Worksheet = serde_json::from_str(json).unwrap();
        let m = Measurer::default();
        let mut cache = LayoutCache::new();
        let mut calc = LayoutCalculator::new(&ws, &m, &mut cache);
        match calc.merged_region_geometry() {
            Err(XlrenderError::OutOfBounds { row, .. }) => assert_eq!(row, 0),
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
        assert!(calc.geometry().is_err());
    }

    #[test]
    fn test_cache_stability_and_clear() {
        let mut ws = Worksheet::new("S");
        ws.set_value(1, 1, "Hello");
        ws.set_value(1, 2, 42);
        let m = Measurer::default();
        let mut cache = LayoutCache::new();
        {
            let mut calc = LayoutCalculator::new(&ws, &m, &mut cache);
            let first = calc.column_width(1);
            assert_eq!(calc.column_width(1), first);
            assert_eq!(calc.row_height(1), calc.row_height(1));
        }
        assert_eq!(cache.cached_column_widths(), 1);
        let mut calc = LayoutCalculator::new(&ws, &m, &mut cache);
        calc.clear_cache();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_positions_match_geometry() {
        let mut ws = Worksheet::new("S");
        ws.set_value(4, 3, "wide wide wide wide");
        ws.set_row_height(2, 40.0);
        ws.merge_range(CellRange::new(1, 1, 2, 2)).unwrap();
        let m = Measurer::default();
        let mut cache = LayoutCache::new();
        let mut calc = LayoutCalculator::new(&ws, &m, &mut cache);
        let g = calc.geometry().unwrap();
        for row in 1..=4 {
            for col in 1..=3 {
                assert_eq!(calc.cell_rect(row, col), g.cell_rect(row, col));
            }
        }
        assert_eq!(calc.cell_position(3, 2), (64.0, 60.0));
    }
}
