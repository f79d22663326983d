use serde::{Deserialize, Serialize};

use crate::units::inches_to_points;

/// Page margins in inches, as stored in worksheet XML.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMargins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub header: f64,
    pub footer: f64,
}

impl Default for PageMargins {
    /// Excel's "Normal" margins.
    fn default() -> Self {
        Self {
            left: 0.75,
            right: 0.75,
            top: 1.0,
            bottom: 1.0,
            header: 0.5,
            footer: 0.5,
        }
    }
}

impl PageMargins {
    /// All margins set to zero.
    pub fn none() -> Self {
        Self {
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
            header: 0.0,
            footer: 0.0,
        }
    }

    pub fn horizontal_points(&self) -> f64 {
        inches_to_points(self.left + self.right)
    }

    /// Top and bottom plus the header/footer reservation.
    pub fn vertical_points(&self) -> f64 {
        inches_to_points(self.top + self.bottom + self.header + self.footer)
    }

    /// Top-left corner of the printable area on the paper, in points.
    pub fn origin_points(&self) -> (f64, f64) {
        (
            inches_to_points(self.left),
            inches_to_points(self.top + self.header),
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    Letter,
    Legal,
}

impl PaperSize {
    /// Portrait (width, height) in points.
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            PaperSize::A3 => (841.89, 1190.55),
            PaperSize::A4 => (595.28, 841.89),
            PaperSize::Letter => (612.0, 792.0),
            PaperSize::Legal => (612.0, 1008.0),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Order in which page tiles are numbered.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PageOrder {
    /// Across each row band first, then down.
    #[default]
    OverThenDown,
    /// Down each column band first, then across.
    DownThenOver,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PageSetup {
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub page_order: PageOrder,
}

impl PageSetup {
    /// Paper (width, height) in points after applying orientation.
    pub fn paper_dimensions(&self) -> (f64, f64) {
        let (w, h) = self.paper_size.dimensions();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}
