use serde::{Deserialize, Serialize};

use super::ColorStop;
use crate::cell_ref::CellRange;
use crate::color::Rgb;

/// Default data bar color (Excel's blue).
pub const DEFAULT_DATA_BAR_COLOR: Rgb = Rgb::new(0x63, 0x8E, 0xC6);

fn default_data_bar_color() -> Rgb {
    DEFAULT_DATA_BAR_COLOR
}

/// A conditional format applied to every cell in `range`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalFormat {
    pub range: CellRange,
    pub rule: ConditionalRule,
}

/// Overlay kinds. Each only applies to numeric cell values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ConditionalRule {
    /// Bar whose length is the value's fraction of `min..=max`.
    DataBar {
        min: f64,
        max: f64,
        #[serde(default = "default_data_bar_color")]
        color: Rgb,
    },
    /// Background interpolated between stops after normalizing into `min..=max`.
    ColorScale { min: f64, max: f64, stops: Vec<ColorStop> },
    /// Symbol of the highest threshold the value reaches.
    IconSet { icons: Vec<IconRule> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconRule {
    pub threshold: f64,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

impl IconRule {
    pub fn new(threshold: f64, symbol: impl Into<String>) -> Self {
        Self {
            threshold,
            symbol: symbol.into(),
            color: None,
        }
    }
}

impl ConditionalRule {
    pub fn data_bar(min: f64, max: f64) -> Self {
        ConditionalRule::DataBar {
            min,
            max,
            color: DEFAULT_DATA_BAR_COLOR,
        }
    }

    /// Three-stop red/yellow/green scale.
    pub fn traffic_light_scale(min: f64, max: f64) -> Self {
        ConditionalRule::ColorScale {
            min,
            max,
            stops: vec![
                ColorStop::new(0.0, Rgb::new(0xF8, 0x69, 0x6B)),
                ColorStop::new(0.5, Rgb::new(0xFF, 0xEB, 0x84)),
                ColorStop::new(1.0, Rgb::new(0x63, 0xBE, 0x7B)),
            ],
        }
    }
}
