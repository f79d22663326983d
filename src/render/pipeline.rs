//! Page pipeline: layout, pagination and per-cell rendering onto surfaces.
//!
//! [`SheetRenderer`] owns the layout cache for one worksheet snapshot. Every
//! render call first resolves an immutable [`SheetGeometry`], then walks the
//! requested block of cells in row-major order and hands each one to a
//! [`CellRenderer`]. Images anchored inside the block are drawn last.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::cell::CellRenderer;
use super::context::RenderContext;
use super::document::DocumentSurface;
use super::raster::{RasterSurface, MAX_RASTER_EDGE};
use super::surface::DrawingSurface;
use crate::color::Rgb;
use crate::error::{Result, XlrenderError};
use crate::layout::{LayoutCache, LayoutCalculator, Measurer, Page, Paginator, Rect, SheetGeometry};
use crate::types::Worksheet;
use crate::units::POINTS_PER_INCH;

/// Output settings shared by every render call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Multiplier applied to every position, size and font size.
    pub scale: f64,
    /// Raster resolution; points map to `dpi / 72` pixels.
    pub dpi: f64,
    pub formula_color: Rgb,
    /// Clear color for raster surfaces.
    pub background: Rgb,
    pub draw_images: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            dpi: 96.0,
            formula_color: Rgb::RED,
            background: Rgb::WHITE,
            draw_images: true,
        }
    }
}

impl RenderOptions {
    /// Pixels per layout point on raster output.
    pub fn pixel_scale(&self) -> f64 {
        self.scale * self.dpi / POINTS_PER_INCH
    }
}

/// Cooperative cancellation for multi-page renders, checked before each page.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What happened while rendering one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport {
    pub page_number: usize,
    /// Cells handed to the cell renderer and not skipped.
    pub cells_rendered: usize,
    /// Merged members skipped because their anchor paints the block.
    pub merged_skipped: usize,
    pub images_drawn: usize,
    /// Some text used approximate metrics or could not be drawn at all.
    pub degraded_text: bool,
}

/// Where a block of cells lands on a surface.
#[derive(Debug, Clone, Copy)]
struct Placement {
    scale: f64,
    /// Surface position of the block's top-left corner.
    origin: (f64, f64),
    page_number: Option<usize>,
    total_pages: Option<usize>,
}

impl Placement {
    fn place(&self, rect: Rect, page: &Page) -> Rect {
        let r = rect.translate_scale(-page.x_offset, -page.y_offset, self.scale);
        Rect::new(r.x + self.origin.0, r.y + self.origin.1, r.width, r.height)
    }
}

/// Renders one worksheet, paging it according to its own page setup.
pub struct SheetRenderer<'a> {
    worksheet: &'a Worksheet,
    measurer: &'a Measurer,
    options: RenderOptions,
    cache: LayoutCache,
}

impl<'a> SheetRenderer<'a> {
    pub fn new(worksheet: &'a Worksheet, measurer: &'a Measurer) -> Self {
        Self::with_options(worksheet, measurer, RenderOptions::default())
    }

    pub fn with_options(
        worksheet: &'a Worksheet,
        measurer: &'a Measurer,
        options: RenderOptions,
    ) -> Self {
        Self {
            worksheet,
            measurer,
            options,
            cache: LayoutCache::new(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    fn calculator(&mut self) -> LayoutCalculator<'_> {
        LayoutCalculator::new(self.worksheet, self.measurer, &mut self.cache)
    }

    /// Unscaled `(width, height)` of the whole sheet in points.
    pub fn calculate_worksheet_size(&mut self) -> (f64, f64) {
        self.calculator().worksheet_size()
    }

    /// # Errors
    /// Fails when a merged range lies outside the worksheet.
    pub fn paginate(&mut self) -> Result<Vec<Page>> {
        let paginator = Paginator::for_worksheet(self.worksheet);
        paginator.paginate(&mut self.calculator())
    }

    /// # Errors
    /// Fails when a merged range lies outside the worksheet.
    pub fn geometry(&mut self) -> Result<SheetGeometry> {
        self.calculator().geometry()
    }

    /// The whole sheet onto one surface, at `options.scale`, from the origin.
    ///
    /// # Errors
    /// Fails when a merged range lies outside the worksheet.
    pub fn render_sheet(&mut self, surface: &mut dyn DrawingSurface) -> Result<PageReport> {
        let geometry = self.geometry()?;
        let Some(page) = whole_sheet(&geometry) else {
            return Ok(PageReport::default());
        };
        let placement = Placement {
            scale: self.options.scale,
            origin: (0.0, 0.0),
            page_number: None,
            total_pages: None,
        };
        Ok(paint_page(
            self.worksheet,
            self.measurer,
            &self.options,
            &geometry,
            &page,
            placement,
            surface,
        ))
    }

    /// One page onto a surface, page-relative: the page's first cell lands at the origin.
    ///
    /// # Errors
    /// Returns [`XlrenderError::OutOfBounds`] if the page reaches outside the
    /// worksheet, or a merge error from layout.
    pub fn render_page(
        &mut self,
        page: &Page,
        total_pages: usize,
        surface: &mut dyn DrawingSurface,
    ) -> Result<PageReport> {
        let geometry = self.geometry()?;
        check_page(&geometry, page)?;
        let placement = Placement {
            scale: self.options.scale,
            origin: (0.0, 0.0),
            page_number: Some(page.page_number),
            total_pages: Some(total_pages),
        };
        Ok(paint_page(
            self.worksheet,
            self.measurer,
            &self.options,
            &geometry,
            page,
            placement,
            surface,
        ))
    }

    /// Every page onto its own surface from `factory`, in print order.
    ///
    /// # Errors
    /// Returns [`XlrenderError::Cancelled`] when `cancel` is raised before a
    /// page starts; pages already rendered are discarded.
    pub fn render_pages<S, F>(
        &mut self,
        mut factory: F,
        cancel: Option<&CancelFlag>,
    ) -> Result<Vec<(S, PageReport)>>
    where
        S: DrawingSurface,
        F: FnMut(&Page) -> S,
    {
        let pages = self.paginate()?;
        let geometry = self.geometry()?;
        let scale = self.options.scale;
        self.render_each(&pages, &geometry, cancel, |page| {
            let surface = factory(page);
            (surface, scale, (0.0, 0.0))
        })
    }

    /// A paged document: one document page per [`Page`], sized to the paper,
    /// with cells offset by the left and top margins.
    ///
    /// # Errors
    /// Fails when a merged range lies outside the worksheet.
    pub fn render_document(&mut self) -> Result<(DocumentSurface, Vec<PageReport>)> {
        let pages = self.paginate()?;
        let geometry = self.geometry()?;
        let scale = self.options.scale;
        let (paper_w, paper_h) = Paginator::for_worksheet(self.worksheet).paper_size();
        let (left, top) = self.worksheet.page_margins.origin_points();

        let mut document = DocumentSurface::new();
        let mut reports = Vec::with_capacity(pages.len());
        for page in &pages {
            document.begin_page(paper_w * scale, paper_h * scale);
            let placement = Placement {
                scale,
                origin: (left * scale, top * scale),
                page_number: Some(page.page_number),
                total_pages: Some(pages.len()),
            };
            reports.push(paint_page(
                self.worksheet,
                self.measurer,
                &self.options,
                &geometry,
                page,
                placement,
                &mut document,
            ));
        }
        Ok((document, reports))
    }

    /// The whole sheet as one image at `options.pixel_scale()`.
    ///
    /// # Errors
    /// Fails when a merged range lies outside the worksheet, or when the
    /// image would be wider or taller than [`MAX_RASTER_EDGE`] pixels.
    pub fn raster_sheet(&mut self) -> Result<(RasterSurface, PageReport)> {
        let geometry = self.geometry()?;
        let px = self.options.pixel_scale();
        let (width, height) = (geometry.total_width() * px, geometry.total_height() * px);
        let limit = f64::from(MAX_RASTER_EDGE);
        if width > limit || height > limit {
            return Err(XlrenderError::Render(format!(
                "sheet is {}x{} px, over the {MAX_RASTER_EDGE} px raster limit; render pages instead",
                width.ceil(),
                height.ceil()
            )));
        }
        let mut surface = RasterSurface::for_extent(width, height, self.options.background);
        let Some(page) = whole_sheet(&geometry) else {
            return Ok((surface, PageReport::default()));
        };
        let placement = Placement {
            scale: px,
            origin: (0.0, 0.0),
            page_number: None,
            total_pages: None,
        };
        let report = paint_page(
            self.worksheet,
            self.measurer,
            &self.options,
            &geometry,
            &page,
            placement,
            &mut surface,
        );
        Ok((surface, report))
    }

    /// One image per page, each sized to the page's cells.
    ///
    /// # Errors
    /// Fails on cancellation or when a merged range lies outside the worksheet.
    pub fn raster_pages(
        &mut self,
        cancel: Option<&CancelFlag>,
    ) -> Result<Vec<(RasterSurface, PageReport)>> {
        let pages = self.paginate()?;
        let geometry = self.geometry()?;
        let px = self.options.pixel_scale();
        let background = self.options.background;
        self.render_each(&pages, &geometry, cancel, |page| {
            let surface =
                RasterSurface::for_extent(page.width * px, page.height * px, background);
            (surface, px, (0.0, 0.0))
        })
    }

    fn render_each<S, F>(
        &self,
        pages: &[Page],
        geometry: &SheetGeometry,
        cancel: Option<&CancelFlag>,
        mut setup: F,
    ) -> Result<Vec<(S, PageReport)>>
    where
        S: DrawingSurface,
        F: FnMut(&Page) -> (S, f64, (f64, f64)),
    {
        let mut out = Vec::with_capacity(pages.len());
        for page in pages {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                log::debug!("render cancelled before page {}", page.page_number);
                return Err(XlrenderError::Cancelled {
                    completed_pages: out.len(),
                });
            }
            let (mut surface, scale, origin) = setup(page);
            let placement = Placement {
                scale,
                origin,
                page_number: Some(page.page_number),
                total_pages: Some(pages.len()),
            };
            let report = paint_page(
                self.worksheet,
                self.measurer,
                &self.options,
                geometry,
                page,
                placement,
                &mut surface,
            );
            out.push((surface, report));
        }
        Ok(out)
    }

    /// [`render_pages`](Self::render_pages) with pages painted concurrently.
    ///
    /// Geometry is resolved once up front; workers only read it. Results keep
    /// print order.
    ///
    /// # Errors
    /// Returns [`XlrenderError::Cancelled`] if any page saw the flag raised
    /// before starting.
    #[cfg(feature = "parallel")]
    pub fn render_pages_parallel<S, F>(
        &mut self,
        factory: F,
        cancel: Option<&CancelFlag>,
    ) -> Result<Vec<(S, PageReport)>>
    where
        S: DrawingSurface + Send,
        F: Fn(&Page) -> S + Sync,
    {
        use rayon::prelude::*;

        let pages = self.paginate()?;
        let geometry = self.geometry()?;
        let total = pages.len();
        let (worksheet, measurer, options) = (self.worksheet, self.measurer, &self.options);

        let rendered: Vec<Option<(S, PageReport)>> = pages
            .par_iter()
            .map(|page| {
                if cancel.is_some_and(CancelFlag::is_cancelled) {
                    return None;
                }
                let mut surface = factory(page);
                let placement = Placement {
                    scale: options.scale,
                    origin: (0.0, 0.0),
                    page_number: Some(page.page_number),
                    total_pages: Some(total),
                };
                let report = paint_page(
                    worksheet,
                    measurer,
                    options,
                    &geometry,
                    page,
                    placement,
                    &mut surface,
                );
                Some((surface, report))
            })
            .collect();

        let completed = rendered.iter().filter(|r| r.is_some()).count();
        if completed < total {
            return Err(XlrenderError::Cancelled {
                completed_pages: completed,
            });
        }
        Ok(rendered.into_iter().flatten().collect())
    }
}

/// A synthetic page covering the whole sheet, or `None` when it is empty.
fn whole_sheet(geometry: &SheetGeometry) -> Option<Page> {
    let (max_row, max_col) = (geometry.max_row(), geometry.max_col());
    if max_row == 0 || max_col == 0 {
        return None;
    }
    Some(Page {
        page_number: 1,
        row_start: 1,
        row_end: max_row,
        col_start: 1,
        col_end: max_col,
        x_offset: 0.0,
        y_offset: 0.0,
        width: geometry.total_width(),
        height: geometry.total_height(),
    })
}

fn check_page(geometry: &SheetGeometry, page: &Page) -> Result<()> {
    let (max_row, max_col) = (geometry.max_row(), geometry.max_col());
    let bad = if page.row_start == 0 || page.col_start == 0 {
        Some((page.row_start, page.col_start))
    } else if page.row_end > max_row || page.col_end > max_col {
        Some((page.row_end, page.col_end))
    } else {
        None
    };
    match bad {
        Some((row, col)) => Err(XlrenderError::OutOfBounds {
            row,
            col,
            max_row,
            max_col,
        }),
        None => Ok(()),
    }
}

fn paint_page(
    worksheet: &Worksheet,
    measurer: &Measurer,
    options: &RenderOptions,
    geometry: &SheetGeometry,
    page: &Page,
    placement: Placement,
    surface: &mut dyn DrawingSurface,
) -> PageReport {
    log::debug!(
        "rendering page {} of '{}': rows {}..={}, cols {}..={}",
        page.page_number,
        worksheet.name,
        page.row_start,
        page.row_end,
        page.col_start,
        page.col_end
    );
    let renderer = CellRenderer::with_formula_color(measurer, options.formula_color);
    let mut report = PageReport {
        page_number: placement.page_number.unwrap_or(page.page_number),
        ..PageReport::default()
    };

    for row in page.rows() {
        for col in page.cols() {
            let Some(cell) = worksheet.cell(row, col) else {
                continue;
            };
            let layout_rect = geometry
                .render_rect(row, col)
                .unwrap_or_else(|| geometry.cell_rect(row, col));
            let mut ctx = RenderContext::new(
                worksheet,
                row,
                col,
                cell,
                placement.place(layout_rect, page),
                placement.scale,
            );
            if let (Some(n), Some(total)) = (placement.page_number, placement.total_pages) {
                ctx = ctx.with_page(n, total);
            }

            let layers = renderer.render(&ctx, surface);
            if layers.skipped {
                report.merged_skipped += 1;
            } else {
                report.cells_rendered += 1;
            }
            report.degraded_text |= layers.degraded_text;
        }
    }

    if options.draw_images && surface.supports_images() {
        for anchored in worksheet
            .images()
            .iter()
            .filter(|img| page.contains(img.row, img.col))
        {
            let width = anchored
                .width
                .unwrap_or_else(|| f64::from(anchored.image.width()));
            let height = anchored
                .height
                .unwrap_or_else(|| f64::from(anchored.image.height()));
            let at = placement.place(
                Rect::new(
                    geometry.column_x(anchored.col),
                    geometry.row_y(anchored.row),
                    width,
                    height,
                ),
                page,
            );
            surface.draw_image(at.x, at.y, &anchored.image, Some(at.width), Some(at.height));
            report.images_drawn += 1;
        }
    }

    log::debug!("page {} done: {report:?}", report.page_number);
    report
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
    use crate::render::document::DrawCommand;
    use crate::types::{CellStyle, Fill};

    fn measurer() -> Measurer {
        Measurer::default()
    }

    #[test]
    fn test_render_sheet_counts_cells() {
        let mut ws = Worksheet::new("S");
        ws.set_value(1, 1, "Hello");
        ws.set_value(1, 2, 42.0);
        let m = measurer();
        let mut renderer = SheetRenderer::new(&ws, &m);
        let mut doc = DocumentSurface::new();
        let report = renderer.render_sheet(&mut doc).unwrap();
        assert_eq!(report.cells_rendered, 2);
        assert_eq!(report.merged_skipped, 0);
        let texts = doc
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { .. }))
            .count();
        assert_eq!(texts, 2);
    }

    #[test]
    fn test_render_page_is_page_relative() {
        let mut ws = Worksheet::new("S");
        ws.set_value(3, 2, "x");
        ws.set_style(
            3,
            2,
            CellStyle {
                fill: Fill::solid(Rgb::RED),
                ..CellStyle::default()
            },
        );
        let m = measurer();
        let mut renderer = SheetRenderer::new(&ws, &m);
        let page = Page {
            page_number: 1,
            row_start: 3,
            row_end: 3,
            col_start: 2,
            col_end: 2,
            x_offset: 64.0,
            y_offset: 40.0,
            width: 64.0,
            height: 20.0,
        };
        let mut doc = DocumentSurface::new();
        renderer.render_page(&page, 1, &mut doc).unwrap();
        match &doc.commands()[0] {
            DrawCommand::FillRect { rect, color } => {
                assert_eq!(*color, Rgb::RED);
                assert_eq!((rect.x, rect.y), (0.0, 0.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_render_page_outside_sheet_is_fatal() {
        let mut ws = Worksheet::new("S");
        ws.set_value(1, 1, 1.0);
        let m = measurer();
        let mut renderer = SheetRenderer::new(&ws, &m);
        let page = Page {
            page_number: 1,
            row_start: 1,
            row_end: 5,
            col_start: 1,
            col_end: 1,
            x_offset: 0.0,
            y_offset: 0.0,
            width: 64.0,
            height: 100.0,
        };
        let err = renderer
            .render_page(&page, 1, &mut DocumentSurface::new())
            .unwrap_err();
        assert!(matches!(err, XlrenderError::OutOfBounds { row: 5, .. }));
    }

    #[test]
    fn test_cancel_before_first_page() {
        let mut ws = Worksheet::new("S");
        ws.set_value(1, 1, "a");
        let m = measurer();
        let mut renderer = SheetRenderer::new(&ws, &m);
        let flag = CancelFlag::new();
        flag.cancel();
        let err = renderer
            .render_pages(|_| DocumentSurface::new(), Some(&flag))
            .unwrap_err();
        assert!(matches!(err, XlrenderError::Cancelled { completed_pages: 0 }));
    }

    #[test]
    fn test_document_pages_use_paper_and_margins() {
        let mut ws = Worksheet::new("S");
        ws.set_value(1, 1, "a");
        let m = measurer();
        let mut renderer = SheetRenderer::new(&ws, &m);
        let (doc, reports) = renderer.render_document().unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(reports.len(), 1);
        let page = &doc.pages()[0];
        let (w, h) = ws.page_setup.paper_dimensions();
        assert_eq!((page.width, page.height), (w, h));
        let (left, top) = ws.page_margins.origin_points();
        match &page.commands[0] {
            DrawCommand::Text { x, y, .. } => {
                assert!(*x >= left);
                assert!(*y >= top);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_sheet_renders_nothing() {
        let ws = Worksheet::new("Empty");
        let m = measurer();
        let mut renderer = SheetRenderer::new(&ws, &m);
        assert!(renderer.paginate().unwrap().is_empty());
        let (doc, reports) = renderer.render_document().unwrap();
        assert_eq!(doc.page_count(), 0);
        assert!(reports.is_empty());
        let (raster, report) = renderer.raster_sheet().unwrap();
        assert_eq!((raster.width(), raster.height()), (1, 1));
        assert_eq!(report, PageReport::default());
    }

    #[test]
    fn test_oversized_sheet_raster_is_refused() {
        let mut ws = Worksheet::new("S");
        ws.set_value(1, 1, "a");
        ws.set_value(1, 300, "b");
        let measurer = Measurer::default();
        let mut renderer = SheetRenderer::new(&ws, &measurer);
        // 300 columns x 64pt x 96/72 is past the edge limit.
        let err = renderer.raster_sheet().unwrap_err();
        assert!(matches!(err, XlrenderError::Render(_)), "{err}");
        // Seven default columns per A4 page.
        assert_eq!(renderer.raster_pages(None).unwrap().len(), 43);
    }

    #[test]
    fn test_pixel_scale() {
        let opts = RenderOptions {
            scale: 2.0,
            dpi: 72.0,
            ..RenderOptions::default()
        };
        assert_eq!(opts.pixel_scale(), 2.0);
        assert_eq!(RenderOptions::default().pixel_scale(), 96.0 / 72.0);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: RenderOptions = serde_json::from_str(r##"{"scale": 1.5, "formulaColor": "#0000FF"}"##).unwrap();
        assert_eq!(opts.scale, 1.5);
        assert_eq!(opts.formula_color, Rgb::new(0, 0, 255));
        assert!(opts.draw_images);
    }
}
