//! Rectangles and pre-computed sheet geometry.
//!
//! [`SheetGeometry`] is the immutable result of a layout pass: prefix sums of
//! column widths and row heights plus a merge lookup, giving O(1) cell
//! rectangles and O(log n) hit testing. It is `Send + Sync`, so page renderers
//! can read it from several threads at once.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cell_ref::CellRange;

/// Axis-aligned rectangle in points. Width and height are never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Negative sizes are clamped to zero.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Offset by `(dx, dy)`, then scale position and size about the origin.
    pub fn translate_scale(&self, dx: f64, dy: f64, scale: f64) -> Rect {
        Rect::new(
            (self.x + dx) * scale,
            (self.y + dy) * scale,
            self.width * scale,
            self.height * scale,
        )
    }
}

/// Information about a merged cell region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeInfo {
    /// True if this cell is the top-left origin of the merge
    pub is_origin: bool,
    pub origin_row: u32,
    pub origin_col: u32,
    pub row_span: u32,
    pub col_span: u32,
}

/// Pre-computed positions for a sheet. Rows and columns are 1-indexed.
#[derive(Debug, Clone, Default)]
pub struct SheetGeometry {
    /// `col_positions[k]` = x of column `k + 1`'s left edge; the last entry is the total width.
    col_positions: Vec<f64>,
    /// `row_positions[k]` = y of row `k + 1`'s top edge; the last entry is the total height.
    row_positions: Vec<f64>,
    merges: HashMap<(u32, u32), MergeInfo>,
}

fn prefix_sums(sizes: &[f64]) -> Vec<f64> {
    let mut positions = Vec::with_capacity(sizes.len() + 1);
    let mut acc = 0.0;
    positions.push(acc);
    for size in sizes {
        acc += size;
        positions.push(acc);
    }
    positions
}

impl SheetGeometry {
    /// Build from resolved sizes, where `col_widths[0]` is column 1.
    pub fn new(col_widths: &[f64], row_heights: &[f64], merge_ranges: &[CellRange]) -> Self {
        let mut merges = HashMap::new();
        for range in merge_ranges {
            for r in range.start_row..=range.end_row {
                for c in range.start_col..=range.end_col {
                    merges.insert(
                        (r, c),
                        MergeInfo {
                            is_origin: range.is_anchor(r, c),
                            origin_row: range.start_row,
                            origin_col: range.start_col,
                            row_span: range.row_span(),
                            col_span: range.col_span(),
                        },
                    );
                }
            }
        }

        Self {
            col_positions: prefix_sums(col_widths),
            row_positions: prefix_sums(row_heights),
            merges,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn max_col(&self) -> u32 {
        self.col_positions.len().saturating_sub(1) as u32
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn max_row(&self) -> u32 {
        self.row_positions.len().saturating_sub(1) as u32
    }

    pub fn total_width(&self) -> f64 {
        self.col_positions.last().copied().unwrap_or(0.0)
    }

    pub fn total_height(&self) -> f64 {
        self.row_positions.last().copied().unwrap_or(0.0)
    }

    /// Left edge of a column; past the last column this is the total width.
    pub fn column_x(&self, col: u32) -> f64 {
        let idx = col.saturating_sub(1) as usize;
        self.col_positions
            .get(idx)
            .or(self.col_positions.last())
            .copied()
            .unwrap_or(0.0)
    }

    /// Top edge of a row; past the last row this is the total height.
    pub fn row_y(&self, row: u32) -> f64 {
        let idx = row.saturating_sub(1) as usize;
        self.row_positions
            .get(idx)
            .or(self.row_positions.last())
            .copied()
            .unwrap_or(0.0)
    }

    /// Total width of columns `start..=end`.
    pub fn span_width(&self, start: u32, end: u32) -> f64 {
        self.column_x(end.saturating_add(1)) - self.column_x(start)
    }

    /// Total height of rows `start..=end`.
    pub fn span_height(&self, start: u32, end: u32) -> f64 {
        self.row_y(end.saturating_add(1)) - self.row_y(start)
    }

    pub fn column_width(&self, col: u32) -> f64 {
        self.span_width(col, col)
    }

    pub fn row_height(&self, row: u32) -> f64 {
        self.span_height(row, row)
    }

    /// The cell's own column/row rectangle, ignoring merges.
    pub fn cell_rect(&self, row: u32, col: u32) -> Rect {
        Rect::new(
            self.column_x(col),
            self.row_y(row),
            self.column_width(col),
            self.row_height(row),
        )
    }

    /// Where a cell paints: the merged block for an anchor, `None` for other
    /// merged members, the cell's own rectangle otherwise.
    pub fn render_rect(&self, row: u32, col: u32) -> Option<Rect> {
        match self.merges.get(&(row, col)) {
            Some(m) if !m.is_origin => None,
            Some(m) => Some(Rect::new(
                self.column_x(col),
                self.row_y(row),
                self.span_width(col, col + m.col_span - 1),
                self.span_height(row, row + m.row_span - 1),
            )),
            None => Some(self.cell_rect(row, col)),
        }
    }

    /// The whole merged block containing a cell, if it is merged.
    pub fn merged_rect(&self, row: u32, col: u32) -> Option<Rect> {
        let m = self.merges.get(&(row, col))?;
        self.render_rect(m.origin_row, m.origin_col)
    }

    pub fn merge_at(&self, row: u32, col: u32) -> Option<&MergeInfo> {
        self.merges.get(&(row, col))
    }

    /// Row containing `y`, if inside the sheet.
    pub fn row_at_y(&self, y: f64) -> Option<u32> {
        index_at(&self.row_positions, y)
    }

    /// Column containing `x`, if inside the sheet.
    pub fn col_at_x(&self, x: f64) -> Option<u32> {
        index_at(&self.col_positions, x)
    }
}

/// Binary search a prefix-sum table for the 1-indexed slot containing `v`.
fn index_at(positions: &[f64], v: f64) -> Option<u32> {
    let total = positions.last().copied()?;
    if v < 0.0 || v >= total {
        return None;
    }
    let i = positions.partition_point(|&p| p <= v);
    u32::try_from(i).ok()
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

    fn uniform(cols: usize, rows: usize) -> SheetGeometry {
        SheetGeometry::new(&vec![64.0; cols], &vec![20.0; rows], &[])
    }

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), (25.0, 40.0));
        assert_eq!(Rect::new(0.0, 0.0, -5.0, 3.0).width, 0.0);
        assert!(Rect::new(0.0, 0.0, 0.0, 3.0).is_empty());
    }

    #[test]
    fn test_translate_scale() {
        let r = Rect::new(100.0, 50.0, 10.0, 20.0).translate_scale(-100.0, -40.0, 2.0);
        assert_eq!(r, Rect::new(0.0, 20.0, 20.0, 40.0));
    }

    #[test]
    fn test_basic_geometry() {
        let g = uniform(5, 10);
        assert_eq!(g.max_col(), 5);
        assert_eq!(g.max_row(), 10);
        assert_eq!(g.total_width(), 320.0);
        assert_eq!(g.total_height(), 200.0);
        assert_eq!(g.cell_rect(1, 1), Rect::new(0.0, 0.0, 64.0, 20.0));
        assert_eq!(g.cell_rect(2, 3), Rect::new(128.0, 20.0, 64.0, 20.0));
    }

    #[test]
    fn test_merged_render_rect() {
        let g = SheetGeometry::new(&[64.0, 80.0, 64.0], &[20.0, 30.0, 20.0], &[CellRange::new(1, 1, 2, 2)]);
        let anchor = g.render_rect(1, 1).unwrap();
        assert_eq!(anchor.width, 144.0);
        assert_eq!(anchor.height, 50.0);
        assert!(g.render_rect(1, 2).is_none());
        assert!(g.render_rect(2, 1).is_none());
        assert!(g.render_rect(2, 2).is_none());
        assert_eq!(g.render_rect(3, 3).unwrap(), g.cell_rect(3, 3));
        assert!(g.merge_at(2, 2).is_some_and(|m| !m.is_origin && m.col_span == 2));
        assert_eq!(g.merged_rect(2, 2), Some(anchor));
        assert!(g.merged_rect(3, 3).is_none());
    }

    #[test]
    fn test_hit_testing() {
        let g = uniform(5, 10);
        assert_eq!(g.row_at_y(0.0), Some(1));
        assert_eq!(g.row_at_y(19.9), Some(1));
        assert_eq!(g.row_at_y(20.0), Some(2));
        assert_eq!(g.row_at_y(199.0), Some(10));
        assert_eq!(g.row_at_y(200.0), None);
        assert_eq!(g.row_at_y(-1.0), None);
        assert_eq!(g.col_at_x(64.0 * 2.5), Some(3));
    }

    #[test]
    fn test_empty_geometry() {
        let g = SheetGeometry::new(&[], &[], &[]);
        assert_eq!(g.max_row(), 0);
        assert_eq!(g.total_width(), 0.0);
        assert_eq!(g.row_at_y(0.0), None);
    }
}
