//! Rendering engine with pluggable backends.
//!
//! This module provides:
//! - The [`DrawingSurface`] contract every backend implements
//! - Per-cell sub-renderers (background, border, text, formula, conditional overlays)
//! - A raster backend (embedded-graphics over an RGB buffer) and a paged vector backend
//! - [`SheetRenderer`], the page pipeline tying layout, pagination and cells together

mod background;
mod border;
mod cell;
mod conditional;
mod context;
mod document;
mod formula;
mod pipeline;
mod raster;
mod surface;
mod text;

pub use background::BackgroundRenderer;
pub use border::{dash_segments, BorderRenderer, Segment};
pub use cell::{CellRenderer, RenderedLayers};
pub use conditional::{color_scale_color, data_bar_ratio, icon_for_value, ConditionalRenderer};
pub use context::RenderContext;
pub use document::{DocumentPage, DocumentSurface, DrawCommand};
pub use formula::FormulaRenderer;
pub use pipeline::{CancelFlag, PageReport, RenderOptions, SheetRenderer};
pub use raster::{RasterSurface, MAX_RASTER_EDGE};
pub use surface::{DrawingSurface, SurfaceCapabilities};
pub use text::{align_block, resolve_text_color, TextOutcome, TextRenderer, TEXT_PADDING};
