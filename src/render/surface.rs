//! Drawing surface contract.
//!
//! The render pipeline only ever issues these primitive calls. Concrete
//! backends live in [`raster`](super::raster) (pixels) and
//! [`document`](super::document) (page-oriented vector display list).

use crate::color::Rgb;
use crate::layout::Rect;
use crate::types::{Font, ImageData};

/// What a backend can actually draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    pub text: bool,
    pub images: bool,
}

impl Default for SurfaceCapabilities {
    fn default() -> Self {
        Self {
            text: true,
            images: true,
        }
    }
}

/// Sink for primitive paint operations.
///
/// Calls are synchronous and visible to later calls on the same surface.
/// Text positions are the top-left corner of the text box.
pub trait DrawingSurface {
    fn set_fill_color(&mut self, color: Rgb);

    fn set_line_color(&mut self, color: Rgb);

    fn set_line_width(&mut self, width: f64);

    /// Fill with the current fill color.
    fn fill_rect(&mut self, rect: Rect);

    /// Stroke with the current line color and width.
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);

    fn draw_text(&mut self, x: f64, y: f64, text: &str, font: &Font, color: Rgb);

    /// One `draw_text` per `\n`-separated line, `line_height` apart.
    #[allow(clippy::cast_precision_loss)]
    fn draw_multiline_text(
        &mut self,
        x: f64,
        y: f64,
        text: &str,
        line_height: f64,
        font: &Font,
        color: Rgb,
    ) {
        for (i, line) in text.split('\n').enumerate() {
            self.draw_text(x, y + i as f64 * line_height, line, font, color);
        }
    }

    /// Draw an image at `(x, y)`, scaled to `width` x `height` when given.
    fn draw_image(
        &mut self,
        x: f64,
        y: f64,
        image: &ImageData,
        width: Option<f64>,
        height: Option<f64>,
    );

    fn capabilities(&self) -> SurfaceCapabilities {
        SurfaceCapabilities::default()
    }

    fn supports_text(&self) -> bool {
        self.capabilities().text
    }

    fn supports_images(&self) -> bool {
        self.capabilities().images
    }
}

/// Paint `rect` in a single color.
pub(crate) fn fill(surface: &mut dyn DrawingSurface, rect: Rect, color: Rgb) {
    surface.set_fill_color(color);
    surface.fill_rect(rect);
}
