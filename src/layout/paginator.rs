//! Splitting a worksheet into printable pages.
//!
//! Rows and columns are grouped into bands that fit the printable area; every
//! (row band, column band) pair becomes one [`Page`]. The first row or column
//! of a band is always taken, so oversized rows and columns get a page of
//! their own instead of stalling pagination.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::calculator::LayoutCalculator;
use crate::error::Result;
use crate::types::{PageMargins, PageOrder, PageSetup, Worksheet};

/// One printed page: an inclusive block of rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based position in print order
    pub page_number: usize,
    pub row_start: u32,
    pub row_end: u32,
    pub col_start: u32,
    pub col_end: u32,
    /// Layout x of `col_start`
    pub x_offset: f64,
    /// Layout y of `row_start`
    pub y_offset: f64,
    /// Sum of the page's column widths
    pub width: f64,
    /// Sum of the page's row heights
    pub height: f64,
}

impl Page {
    pub fn rows(&self) -> RangeInclusive<u32> {
        self.row_start..=self.row_end
    }

    pub fn cols(&self) -> RangeInclusive<u32> {
        self.col_start..=self.col_end
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.rows().contains(&row) && self.cols().contains(&col)
    }

    pub fn cell_count(&self) -> u64 {
        let rows = u64::from(self.row_end.saturating_sub(self.row_start)) + 1;
        let cols = u64::from(self.col_end.saturating_sub(self.col_start)) + 1;
        rows * cols
    }
}

/// A run of consecutive rows or columns that fits one page.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Band {
    start: u32,
    end: u32,
    offset: f64,
    size: f64,
}

/// Greedy band fill over items `1..=count`.
fn bands(count: u32, budget: f64, mut size_of: impl FnMut(u32) -> f64) -> Vec<Band> {
    let mut out = Vec::new();
    let mut offset = 0.0;
    let mut next = 1;

    while next <= count {
        let start = next;
        let mut used = 0.0;
        while next <= count {
            let size = size_of(next);
            if next > start && used + size > budget {
                break;
            }
            used += size;
            next += 1;
        }
        out.push(Band {
            start,
            end: next - 1,
            offset,
            size: used,
        });
        offset += used;
    }
    out
}

/// Page-fitting over a worksheet's extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paginator {
    paper_width: f64,
    paper_height: f64,
    margins: PageMargins,
    order: PageOrder,
}

impl Paginator {
    pub fn new(setup: &PageSetup, margins: &PageMargins) -> Self {
        let (paper_width, paper_height) = setup.paper_dimensions();
        Self {
            paper_width,
            paper_height,
            margins: *margins,
            order: setup.page_order,
        }
    }

    /// Uses the worksheet's own page setup and margins.
    pub fn for_worksheet(worksheet: &Worksheet) -> Self {
        Self::new(&worksheet.page_setup, &worksheet.page_margins)
    }

    /// Paper size in points, after orientation.
    pub fn paper_size(&self) -> (f64, f64) {
        (self.paper_width, self.paper_height)
    }

    /// Paper minus margins; the height also loses the header and footer.
    pub fn printable_area(&self) -> (f64, f64) {
        (
            (self.paper_width - self.margins.horizontal_points()).max(0.0),
            (self.paper_height - self.margins.vertical_points()).max(0.0),
        )
    }

    /// Split the worksheet into pages that exactly tile `[1, max_row] x [1, max_col]`.
    ///
    /// An empty worksheet yields no pages.
    ///
    /// # Errors
    /// Fails when a merged range lies outside the worksheet.
    pub fn paginate(&self, calc: &mut LayoutCalculator<'_>) -> Result<Vec<Page>> {
        calc.merged_region_geometry()?;

        let worksheet = calc.worksheet();
        let (max_row, max_col) = (worksheet.max_row(), worksheet.max_col());
        if max_row == 0 || max_col == 0 {
            log::debug!("'{}' is empty; no pages", worksheet.name);
            return Ok(Vec::new());
        }

        let (budget_w, budget_h) = self.printable_area();
        let row_bands = bands(max_row, budget_h, |r| calc.row_height(r));
        let col_bands = bands(max_col, budget_w, |c| calc.column_width(c));

        let mut pages = Vec::with_capacity(row_bands.len() * col_bands.len());
        let mut push = |rows: &Band, cols: &Band| {
            pages.push(Page {
                page_number: pages.len() + 1,
                row_start: rows.start,
                row_end: rows.end,
                col_start: cols.start,
                col_end: cols.end,
                x_offset: cols.offset,
                y_offset: rows.offset,
                width: cols.size,
                height: rows.size,
            });
        };

        match self.order {
            PageOrder::OverThenDown => {
                for rows in &row_bands {
                    for cols in &col_bands {
                        push(rows, cols);
                    }
                }
            }
            PageOrder::DownThenOver => {
                for cols in &col_bands {
                    for rows in &row_bands {
                        push(rows, cols);
                    }
                }
            }
        }

        log::debug!(
            "paginated '{}': {} row band(s) x {} column band(s) = {} page(s)",
            worksheet.name,
            row_bands.len(),
            col_bands.len(),
            pages.len()
        );
        Ok(pages)
    }

    /// The page that prints a cell.
    pub fn page_for_cell(pages: &[Page], row: u32, col: u32) -> Option<&Page> {
        pages.iter().find(|p| p.contains(row, col))
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
    use crate::layout::{LayoutCache, Measurer};

    #[test]
    fn test_bands_take_oversized_item_alone() {
        let sizes = [10.0, 500.0, 10.0, 10.0];
        let out = bands(4, 100.0, |i| sizes[(i - 1) as usize]);
        let spans: Vec<(u32, u32)> = out.iter().map(|b| (b.start, b.end)).collect();
        assert_eq!(spans, vec![(1, 1), (2, 2), (3, 4)]);
        assert_eq!(out[2].offset, 510.0);
    }

    #[test]
    fn test_bands_with_zero_budget_still_progress() {
        let out = bands(3, 0.0, |_| 20.0);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_printable_area_a4_portrait() {
        let p = Paginator::new(&PageSetup::default(), &PageMargins::default());
        let (w, h) = p.printable_area();
        assert!((w - (595.28 - 108.0)).abs() < 1e-9);
        assert!((h - (841.89 - 216.0)).abs() < 1e-9);
    }

    #[test]
    fn test_small_sheet_is_one_page() {
        let mut ws = Worksheet::new("S");
        ws.set_value(1, 1, "Hello");
        ws.set_value(1, 2, 42);
        let m = Measurer::default();
        let mut cache = LayoutCache::new();
        let mut calc = LayoutCalculator::new(&ws, &m, &mut cache);
        let pages = Paginator::for_worksheet(&ws).paginate(&mut calc).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].rows(), 1..=1);
        assert_eq!(pages[0].cols(), 1..=2);
        assert_eq!(pages[0].width, 128.0);
        assert!(Paginator::page_for_cell(&pages, 1, 2).is_some());
        assert!(Paginator::page_for_cell(&pages, 2, 1).is_none());
    }
}
