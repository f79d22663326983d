//! Spreadsheet model types read by layout and rendering.

mod cell;
mod formatting;
mod page;
mod sheet_image;
mod style;
mod workbook;
mod worksheet;

pub use cell::*;
pub use formatting::*;
pub use page::*;
pub use sheet_image::*;
pub use style::*;
pub use workbook::*;
pub use worksheet::*;
