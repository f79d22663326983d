use crate::layout::Rect;
use crate::types::{Cell, CellStyle, Worksheet};

/// Everything a sub-renderer needs to paint one cell.
///
/// Built fresh for each cell; `rect` is already positioned and scaled for
/// the target surface, and for a merged anchor it spans the whole block.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub row: u32,
    pub col: u32,
    pub cell: &'a Cell,
    pub rect: Rect,
    pub scale: f64,
    pub worksheet: &'a Worksheet,
    pub page_number: Option<usize>,
    pub total_pages: Option<usize>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        worksheet: &'a Worksheet,
        row: u32,
        col: u32,
        cell: &'a Cell,
        rect: Rect,
        scale: f64,
    ) -> Self {
        Self {
            row,
            col,
            cell,
            rect,
            scale,
            worksheet,
            page_number: None,
            total_pages: None,
        }
    }

    pub fn with_page(mut self, page_number: usize, total_pages: usize) -> Self {
        self.page_number = Some(page_number);
        self.total_pages = Some(total_pages);
        self
    }

    pub fn style(&self) -> &'a CellStyle {
        &self.cell.style
    }
}
