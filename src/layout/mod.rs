//! Layout engine: text measurement, content-driven sizing and pagination.
//!
//! This module handles:
//! - Measuring and wrapping text with cached font metrics
//! - Resolving column widths, row heights and merged-region geometry
//! - Pre-computing cell positions for O(1) rectangles and binary-search hit testing
//! - Splitting the sheet into printable pages

mod cache;
mod calculator;
mod geometry;
mod measurer;
mod paginator;

pub use cache::{LayoutCache, LruCache, MergedRegion};
pub use calculator::{
    LayoutCalculator, DEFAULT_WRAP_WIDTH, LINE_SPACING, MIN_COLUMN_WIDTH, MIN_ROW_HEIGHT,
};
pub use geometry::{MergeInfo, Rect, SheetGeometry};
pub use measurer::{FontKey, FontMetrics, Measurer, TextExtent, TextMetricsBackend};
pub use paginator::{Page, Paginator};
