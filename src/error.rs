//! Structured error types for xlrender.
//!
//! Reference and range parsing fails fast, model inconsistencies are fatal,
//! and backend degradation is never an error (see `Measurer::is_approximate`).

/// All errors that can occur while laying out, paginating or rendering a sheet.
#[derive(Debug, thiserror::Error)]
pub enum XlrenderError {
    /// Malformed A1-style cell reference.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),

    /// Malformed cell range (e.g. "A1:", ":B2", "A1:B2:C3").
    #[error("Invalid range: {0}")]
    Range(String),

    /// A page or merge range points outside the worksheet extent.
    #[error("Cell ({row}, {col}) is outside the worksheet bounds ({max_row} rows x {max_col} columns)")]
    OutOfBounds {
        row: u32,
        col: u32,
        max_row: u32,
        max_col: u32,
    },

    /// Malformed hex color.
    #[error("Invalid color: {0}")]
    Color(String),

    /// Rendering error.
    #[error("Render error: {0}")]
    Render(String),

    /// A multi-page render was aborted between pages.
    #[error("Render cancelled after {completed_pages} page(s)")]
    Cancelled { completed_pages: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Image decoding/encoding error.
    #[error("Image: {0}")]
    Image(#[from] image::ImageError),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlrenderError>;

impl From<String> for XlrenderError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for XlrenderError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}
