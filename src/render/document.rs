//! Page-oriented vector backend.
//!
//! Records every primitive as a [`DrawCommand`] on the current page. The
//! display list can be serialized to JSON or emitted as one SVG per page.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::surface::DrawingSurface;
use crate::color::Rgb;
use crate::error::Result;
use crate::layout::Rect;
use crate::types::{Font, ImageData};

/// One recorded paint operation, in page units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Rgb,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Rgb,
        width: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        font: Font,
        color: Rgb,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: ImageData,
    },
}

/// A page and its display list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPage {
    /// Zero when the page was opened implicitly; the SVG then uses the drawn extent.
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl DocumentPage {
    fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Right and bottom edge of everything drawn.
    fn drawn_extent(&self) -> (f64, f64) {
        self.commands
            .iter()
            .fold((0.0_f64, 0.0_f64), |(w, h), cmd| match cmd {
                DrawCommand::FillRect { rect, .. } => (w.max(rect.right()), h.max(rect.bottom())),
                DrawCommand::Line { x1, y1, x2, y2, .. } => {
                    (w.max(x1.max(*x2)), h.max(y1.max(*y2)))
                }
                DrawCommand::Text { x, y, font, .. } => (w.max(*x), h.max(y + font.size)),
                DrawCommand::Image {
                    x,
                    y,
                    width,
                    height,
                    ..
                } => (w.max(x + width), h.max(y + height)),
            })
    }

    fn svg_size(&self) -> (f64, f64) {
        if self.width > 0.0 && self.height > 0.0 {
            (self.width, self.height)
        } else {
            self.drawn_extent()
        }
    }
}

/// Recording surface for paged output.
#[derive(Debug, Clone)]
pub struct DocumentSurface {
    pages: Vec<DocumentPage>,
    fill: Rgb,
    line: Rgb,
    line_width: f64,
}

impl Default for DocumentSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSurface {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            fill: Rgb::BLACK,
            line: Rgb::BLACK,
            line_width: 1.0,
        }
    }

    /// Start a new page; later commands go to it.
    pub fn begin_page(&mut self, width: f64, height: f64) {
        self.pages.push(DocumentPage::new(width, height));
    }

    /// Commands on the current page.
    pub fn commands(&self) -> &[DrawCommand] {
        self.pages.last().map_or(&[], |p| p.commands.as_slice())
    }

    pub fn pages(&self) -> &[DocumentPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn into_pages(self) -> Vec<DocumentPage> {
        self.pages
    }

    fn push(&mut self, command: DrawCommand) {
        if self.pages.is_empty() {
            self.pages.push(DocumentPage::new(0.0, 0.0));
        }
        if let Some(page) = self.pages.last_mut() {
            page.commands.push(command);
        }
    }

    /// The display list of every page as JSON.
    ///
    /// # Errors
    /// Fails if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.pages)?)
    }

    /// Standalone SVG for one page, or `None` past the last page.
    pub fn to_svg(&self, page_index: usize) -> Option<String> {
        let page = self.pages.get(page_index)?;
        let (width, height) = page.svg_size();
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        for cmd in &page.commands {
            write_svg_command(&mut out, cmd);
        }
        out.push_str("</svg>\n");
        Some(out)
    }
}

fn write_svg_command(out: &mut String, cmd: &DrawCommand) {
    match cmd {
        DrawCommand::FillRect { rect, color } => {
            let _ = writeln!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{color}"/>"#,
                rect.x, rect.y, rect.width, rect.height
            );
        }
        DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        } => {
            let _ = writeln!(
                out,
                r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{color}" stroke-width="{width}"/>"#
            );
        }
        DrawCommand::Text {
            x,
            y,
            text,
            font,
            color,
        } => {
            let weight = if font.bold { "bold" } else { "normal" };
            let style = if font.italic { "italic" } else { "normal" };
            let _ = writeln!(
                out,
                r#"<text x="{x}" y="{y}" font-family="{}" font-size="{}" font-weight="{weight}" font-style="{style}" fill="{color}" dominant-baseline="hanging" xml:space="preserve">{}</text>"#,
                escape_xml(&font.name),
                font.size,
                escape_xml(text)
            );
        }
        DrawCommand::Image {
            x,
            y,
            width,
            height,
            image,
        } => match image.to_base64_png() {
            Ok(data) => {
                let _ = writeln!(
                    out,
                    r#"<image x="{x}" y="{y}" width="{width}" height="{height}" preserveAspectRatio="none" href="data:image/png;base64,{data}"/>"#
                );
            }
            Err(e) => log::warn!("dropping image from SVG: {e}"),
        },
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

impl DrawingSurface for DocumentSurface {
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
        if rect.is_empty() {
            return;
        }
        self.push(DrawCommand::FillRect {
            rect,
            color: self.fill,
        });
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.push(DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            color: self.line,
            width: self.line_width,
        });
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, font: &Font, color: Rgb) {
        self.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            font: font.clone(),
            color,
        });
    }

    fn draw_image(
        &mut self,
        x: f64,
        y: f64,
        image: &ImageData,
        width: Option<f64>,
        height: Option<f64>,
    ) {
        self.push(DrawCommand::Image {
            x,
            y,
            width: width.unwrap_or_else(|| f64::from(image.width())),
            height: height.unwrap_or_else(|| f64::from(image.height())),
            image: image.clone(),
        });
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

    #[test]
    fn test_commands_follow_current_page() {
        let mut doc = DocumentSurface::new();
        assert!(doc.commands().is_empty());
        doc.begin_page(100.0, 50.0);
        doc.set_fill_color(Rgb::RED);
        doc.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        doc.begin_page(100.0, 50.0);
        assert!(doc.commands().is_empty());
        doc.draw_line(0.0, 0.0, 5.0, 5.0);
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages()[0].commands.len(), 1);
        assert_eq!(doc.commands().len(), 1);
    }

    #[test]
    fn test_implicit_page_and_empty_rects() {
        let mut doc = DocumentSurface::new();
        doc.fill_rect(Rect::new(0.0, 0.0, 0.0, 10.0));
        assert_eq!(doc.page_count(), 0);
        doc.draw_text(1.0, 2.0, "x", &Font::default(), Rgb::BLACK);
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_line_records_pen_state() {
        let mut doc = DocumentSurface::new();
        doc.set_line_color(Rgb::RED);
        doc.set_line_width(3.0);
        doc.draw_line(1.0, 2.0, 3.0, 4.0);
        assert_eq!(
            doc.commands()[0],
            DrawCommand::Line {
                x1: 1.0,
                y1: 2.0,
                x2: 3.0,
                y2: 4.0,
                color: Rgb::RED,
                width: 3.0,
            }
        );
    }

    #[test]
    fn test_svg_escapes_text_and_sizes_implicit_page() {
        let mut doc = DocumentSurface::new();
        doc.set_fill_color(Rgb::WHITE);
        doc.fill_rect(Rect::new(0.0, 0.0, 40.0, 30.0));
        doc.draw_text(2.0, 2.0, "a<b & c", &Font::default(), Rgb::BLACK);
        let svg = doc.to_svg(0).unwrap();
        assert!(svg.contains(r#"width="40" height="30""#));
        assert!(svg.contains("a&lt;b &amp; c"));
        assert!(svg.contains(r##"fill="#FFFFFF""##));
        assert!(doc.to_svg(1).is_none());
    }

    #[test]
    fn test_json_is_tagged() {
        let mut doc = DocumentSurface::new();
        doc.begin_page(10.0, 10.0);
        doc.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        let json = doc.to_json().unwrap();
        assert!(json.contains(r#""op":"fillRect""#));
        let pages: Vec<DocumentPage> = serde_json::from_str(&json).unwrap();
        assert_eq!(pages, doc.pages());
    }
}
