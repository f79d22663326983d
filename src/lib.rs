//! xlrender - spreadsheet layout, pagination and rendering
//!
//! Turns a read-only worksheet model into drawing calls:
//! - Content-driven column widths and row heights with minimum floors
//! - Merged regions painted once, at their anchor, over the whole block
//! - Page splitting against paper size, orientation and margins
//! - Fills, borders, text, formulas and conditional formats (data bars, color scales, icons)
//! - Raster (PNG) and paged vector (SVG / JSON) backends behind one drawing contract
//!
//! # Usage
//!
//! ```no_run
//! use xlrender::{Measurer, SheetRenderer, Worksheet};
//!
//! let mut sheet = Worksheet::new("Sheet1");
//! sheet.set_value(1, 1, "Hello");
//! sheet.set_value(1, 2, 42.0);
//!
//! let measurer = Measurer::default();
//! let mut renderer = SheetRenderer::new(&sheet, &measurer);
//! let (document, _reports) = renderer.render_document()?;
//! println!("{}", document.to_svg(0).unwrap_or_default());
//! # Ok::<(), xlrender::XlrenderError>(())
//! ```

pub mod cell_ref;
pub mod color;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod numfmt;
pub mod render;
pub mod types;
pub mod units;

pub use cell_ref::CellRange;
pub use color::Rgb;
pub use error::{Result, XlrenderError};
pub use layout::{LayoutCache, LayoutCalculator, Measurer, Page, Paginator, Rect, SheetGeometry};
pub use render::{
    CancelFlag, CellRenderer, DocumentSurface, DrawingSurface, PageReport, RasterSurface,
    RenderContext, RenderOptions, SheetRenderer,
};
pub use types::*;

/// Get the library version
#[must_use]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
