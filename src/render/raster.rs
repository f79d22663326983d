//! Pixel backend: an RGB buffer painted through embedded-graphics.
//!
//! Coordinates are pixels. Fills and line endpoints round to the nearest
//! pixel, strokes are at least one pixel wide, and text uses the same mono
//! faces the default [`Measurer`](crate::layout::Measurer) measures with.

use std::convert::Infallible;
use std::path::Path;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbImage};

use super::surface::DrawingSurface;
use crate::color::Rgb;
use crate::error::Result;
use crate::fonts::{has_glyphs, mono_font_for};
use crate::layout::Rect;
use crate::types::{Font, ImageData};

/// Largest raster edge in pixels.
pub const MAX_RASTER_EDGE: u32 = 16_384;

/// `RgbImage` as an embedded-graphics draw target; out-of-bounds pixels are dropped.
struct Canvas {
    image: RgbImage,
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> std::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if let Some(px) = self.image.get_pixel_mut_checked(x, y) {
                *px = image::Rgb([color.r(), color.g(), color.b()]);
            }
        }
        Ok(())
    }
}

fn rgb888(c: Rgb) -> Rgb888 {
    Rgb888::new(c.r, c.g, c.b)
}

/// Nearest pixel coordinate.
#[allow(clippy::cast_possible_truncation)]
fn px(v: f64) -> i32 {
    v.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Nearest non-negative pixel length.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn px_len(v: f64) -> u32 {
    v.round().clamp(0.0, f64::from(MAX_RASTER_EDGE)) as u32
}

fn draw<D>(canvas: &mut Canvas, item: &D)
where
    D: Drawable<Color = Rgb888>,
{
    match item.draw(canvas) {
        Ok(_) => {}
        Err(never) => match never {},
    }
}

/// A raster page or sheet image.
pub struct RasterSurface {
    canvas: Canvas,
    fill: Rgb,
    line: Rgb,
    line_width: f64,
}

impl RasterSurface {
    /// A `width` x `height` pixel surface cleared to `background`.
    /// Sizes are capped at [`MAX_RASTER_EDGE`].
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        let (w, h) = (width.min(MAX_RASTER_EDGE), height.min(MAX_RASTER_EDGE));
        let bg = image::Rgb([background.r, background.g, background.b]);
        Self {
            canvas: Canvas {
                image: RgbImage::from_pixel(w, h, bg),
            },
            fill: Rgb::BLACK,
            line: Rgb::BLACK,
            line_width: 1.0,
        }
    }

    /// A surface covering `width` x `height` units, rounded up to whole pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn for_extent(width: f64, height: f64, background: Rgb) -> Self {
        let w = width.ceil().clamp(1.0, f64::from(MAX_RASTER_EDGE)) as u32;
        let h = height.ceil().clamp(1.0, f64::from(MAX_RASTER_EDGE)) as u32;
        Self::new(w, h, background)
    }

    pub fn width(&self) -> u32 {
        self.canvas.image.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.canvas.image
    }

    pub fn into_image(self) -> RgbImage {
        self.canvas.image
    }

    /// Color at a pixel, if inside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        self.canvas
            .image
            .get_pixel_checked(x, y)
            .map(|p| Rgb::new(p.0[0], p.0[1], p.0[2]))
    }

    /// # Errors
    /// Fails if the file cannot be written or encoded.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.canvas
            .image
            .save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

impl DrawingSurface for RasterSurface {
    fn set_fill_color(&mut self, color: Rgb) {
        self.fill = color;
    }

    fn set_line_color(&mut self, color: Rgb) {
        self.line = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn fill_rect(&mut self, rect: Rect) {
        let (x0, y0) = (px(rect.left()), px(rect.top()));
        let (x1, y1) = (px(rect.right()), px(rect.bottom()));
        let (Ok(w), Ok(h)) = (u32::try_from(x1 - x0), u32::try_from(y1 - y0)) else {
            return;
        };
        if w == 0 || h == 0 {
            return;
        }
        let shape = Rectangle::new(Point::new(x0, y0), Size::new(w, h))
            .into_styled(PrimitiveStyle::with_fill(rgb888(self.fill)));
        draw(&mut self.canvas, &shape);
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let width = px_len(self.line_width).max(1);
        let line = Line::new(Point::new(px(x1), px(y1)), Point::new(px(x2), px(y2)))
            .into_styled(PrimitiveStyle::with_stroke(rgb888(self.line), width));
        draw(&mut self.canvas, &line);
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, font: &Font, color: Rgb) {
        let style = MonoTextStyle::new(mono_font_for(font), rgb888(color));
        let origin = Point::new(px(x), px(y));
        if has_glyphs(text) {
            draw(
                &mut self.canvas,
                &Text::with_baseline(text, origin, style, Baseline::Top),
            );
        } else {
            let printable: String = text
                .chars()
                .map(|c| if c == ' ' || c.is_ascii_graphic() { c } else { '?' })
                .collect();
            draw(
                &mut self.canvas,
                &Text::with_baseline(&printable, origin, style, Baseline::Top),
            );
        }
    }

    fn draw_image(
        &mut self,
        x: f64,
        y: f64,
        image: &ImageData,
        width: Option<f64>,
        height: Option<f64>,
    ) {
        let target_w = width.map_or(image.width(), px_len);
        let target_h = height.map_or(image.height(), px_len);
        if target_w == 0 || target_h == 0 {
            log::warn!("skipping image with empty target size {target_w}x{target_h}");
            return;
        }
        let scaled = if (target_w, target_h) == (image.width(), image.height()) {
            image.pixels().clone()
        } else {
            imageops::resize(image.pixels(), target_w, target_h, FilterType::Nearest)
        };

        let (ox, oy) = (i64::from(px(x)), i64::from(px(y)));
        for (sx, sy, src) in scaled.enumerate_pixels() {
            let [r, g, b, a] = src.0;
            if a == 0 {
                continue;
            }
            let (Ok(dx), Ok(dy)) = (
                u32::try_from(ox + i64::from(sx)),
                u32::try_from(oy + i64::from(sy)),
            ) else {
                continue;
            };
            let Some(dst) = self.canvas.image.get_pixel_mut_checked(dx, dy) else {
                continue;
            };
            let alpha = f64::from(a) / 255.0;
            let over = Rgb::new(dst.0[0], dst.0[1], dst.0[2]).lerp(Rgb::new(r, g, b), alpha);
            *dst = image::Rgb([over.r, over.g, over.b]);
        }
    }
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
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
    use image::RgbaImage;

    #[test]
    fn test_fill_rect_paints_pixels() {
        let mut s = RasterSurface::new(20, 10, Rgb::WHITE);
        s.set_fill_color(Rgb::RED);
        s.fill_rect(Rect::new(5.0, 2.0, 4.0, 4.0));
        assert_eq!(s.pixel(5, 2), Some(Rgb::RED));
        assert_eq!(s.pixel(8, 5), Some(Rgb::RED));
        assert_eq!(s.pixel(9, 2), Some(Rgb::WHITE));
        assert_eq!(s.pixel(0, 0), Some(Rgb::WHITE));
    }

    #[test]
    fn test_out_of_bounds_drawing_is_clipped() {
        let mut s = RasterSurface::new(10, 10, Rgb::WHITE);
        s.set_fill_color(Rgb::BLACK);
        s.fill_rect(Rect::new(-5.0, -5.0, 100.0, 100.0));
        s.draw_line(-50.0, 5.0, 50.0, 5.0);
        assert_eq!(s.pixel(9, 9), Some(Rgb::BLACK));
        assert!(s.pixel(10, 10).is_none());
    }

    #[test]
    fn test_hairline_is_at_least_one_pixel() {
        let mut s = RasterSurface::new(10, 10, Rgb::WHITE);
        s.set_line_color(Rgb::BLACK);
        s.set_line_width(0.25);
        s.draw_line(0.0, 4.0, 9.0, 4.0);
        assert_eq!(s.pixel(3, 4), Some(Rgb::BLACK));
    }

    #[test]
    fn test_text_leaves_ink() {
        let mut s = RasterSurface::new(60, 20, Rgb::WHITE);
        s.draw_text(2.0, 2.0, "Hi", &Font::default(), Rgb::BLACK);
        let inked = s.image().pixels().any(|p| p.0 == [0, 0, 0]);
        assert!(inked);
    }

    #[test]
    fn test_image_alpha_blend_and_scale() {
        let mut pixels = RgbaImage::new(2, 2);
        for p in pixels.pixels_mut() {
            p.0 = [0, 0, 255, 255];
        }
        pixels.get_pixel_mut(1, 1).0 = [0, 0, 0, 0];
        let img = ImageData::new(pixels);

        let mut s = RasterSurface::new(10, 10, Rgb::WHITE);
        s.draw_image(1.0, 1.0, &img, Some(4.0), Some(4.0));
        assert_eq!(s.pixel(1, 1), Some(Rgb::new(0, 0, 255)));
        // Transparent quadrant keeps the background.
        assert_eq!(s.pixel(4, 4), Some(Rgb::WHITE));
        assert_eq!(s.pixel(6, 6), Some(Rgb::WHITE));
    }

    #[test]
    fn test_for_extent_rounds_up() {
        let s = RasterSurface::for_extent(10.2, 0.0, Rgb::WHITE);
        assert_eq!((s.width(), s.height()), (11, 1));
    }
}
