use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Resolved cell style
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CellStyle {
    pub font: Font,
    pub alignment: Alignment,
    pub border: Border,
    pub fill: Fill,
    /// Excel number format code applied to numeric values.
    pub number_format: String,
}

impl CellStyle {
    /// The number format, treating an empty code as General.
    pub fn number_format(&self) -> &str {
        if self.number_format.is_empty() {
            "General"
        } else {
            &self.number_format
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Font {
    pub name: String,
    /// Size in points
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    /// `None` means automatic: black or white, whichever contrasts with the fill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

pub const DEFAULT_FONT_NAME: &str = "Calibri";
pub const DEFAULT_FONT_SIZE: f64 = 11.0;

impl Default for Font {
    fn default() -> Self {
        Self {
            name: DEFAULT_FONT_NAME.to_string(),
            size: DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
            color: None,
        }
    }
}

impl Font {
    /// A copy of this font with its size multiplied by `scale`.
    pub fn scaled(&self, scale: f64) -> Font {
        Font {
            size: self.size * scale,
            ..self.clone()
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum HAlign {
    /// Numbers right, everything else left.
    #[default]
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VAlign {
    Top,
    Center,
    #[default]
    Bottom,
    Justify,
    Distributed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Alignment {
    pub horizontal: HAlign,
    pub vertical: VAlign,
    pub wrap_text: bool,
    /// Indent level; each step is one character width.
    pub indent: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderStyle {
    /// Stroke width in points.
    pub fn width(self) -> f64 {
        match self {
            BorderStyle::None => 0.0,
            BorderStyle::Hair => 0.5,
            BorderStyle::Thin | BorderStyle::Dashed | BorderStyle::Dotted => 1.0,
            BorderStyle::DashDot | BorderStyle::DashDotDot => 1.0,
            BorderStyle::Medium | BorderStyle::MediumDashed => 2.0,
            BorderStyle::MediumDashDot | BorderStyle::MediumDashDotDot => 2.0,
            BorderStyle::SlantDashDot => 2.0,
            BorderStyle::Thick | BorderStyle::Double => 3.0,
        }
    }

    pub fn is_none(self) -> bool {
        self == BorderStyle::None
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BorderSide {
    pub style: BorderStyle,
    /// Defaults to black when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

impl BorderSide {
    pub fn new(style: BorderStyle) -> Self {
        Self { style, color: None }
    }

    pub fn with_color(style: BorderStyle, color: Rgb) -> Self {
        Self {
            style,
            color: Some(color),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Border {
    pub left: BorderSide,
    pub right: BorderSide,
    pub top: BorderSide,
    pub bottom: BorderSide,
    pub diagonal: BorderSide,
    /// Diagonal from bottom-left to top-right
    pub diagonal_up: bool,
    /// Diagonal from top-left to bottom-right
    pub diagonal_down: bool,
}

impl Border {
    /// The same side on all four edges.
    pub fn all(side: BorderSide) -> Self {
        Self {
            left: side,
            right: side,
            top: side,
            bottom: side,
            ..Self::default()
        }
    }
}

/// Pattern fill types from ECMA-376 Part 1, Section 18.18.55
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PatternType {
    None,
    Solid,
    Gray125,
    Gray0625,
    DarkGray,
    MediumGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
}

/// A color at a position in 0.0..=1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColorStop {
    pub position: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub fn new(position: f64, color: Rgb) -> Self {
        Self { position, color }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum GradientKind {
    /// Horizontal bands from top to bottom.
    #[default]
    Linear,
    /// Concentric squares around the cell center.
    Path,
}

/// Gradient fill definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GradientFill {
    pub kind: GradientKind,
    pub stops: Vec<ColorStop>,
}

impl GradientFill {
    /// Stops ordered by ascending position.
    pub fn sorted_stops(&self) -> Vec<ColorStop> {
        let mut stops = self.stops.clone();
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        stops
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Fill {
    #[default]
    None,
    Solid {
        color: Rgb,
    },
    Pattern {
        pattern: PatternType,
        #[serde(default)]
        fg: Rgb,
        #[serde(default = "white")]
        bg: Rgb,
    },
    Gradient(GradientFill),
}

fn white() -> Rgb {
    Rgb::WHITE
}

impl Fill {
    pub fn solid(color: Rgb) -> Self {
        Fill::Solid { color }
    }

    /// The color text sits on, used to resolve automatic font colors.
    pub fn background_color(&self) -> Option<Rgb> {
        match self {
            Fill::None => None,
            Fill::Solid { color } => Some(*color),
            Fill::Pattern { pattern, fg, bg } => match pattern {
                PatternType::None => None,
                PatternType::Solid => Some(*fg),
                _ => Some(*bg),
            },
            Fill::Gradient(g) => g.sorted_stops().first().map(|s| s.color),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_border_widths() {
        assert_eq!(BorderStyle::Thin.width(), 1.0);
        assert_eq!(BorderStyle::Medium.width(), 2.0);
        assert_eq!(BorderStyle::Thick.width(), 3.0);
        assert_eq!(BorderStyle::Hair.width(), 0.5);
        assert_eq!(BorderStyle::Double.width(), 3.0);
        assert_eq!(BorderStyle::None.width(), 0.0);
    }

    #[test]
    fn test_fill_deserializes_tagged_variants() {
        let solid: Fill = serde_json::from_str(r##"{"type":"solid","color":"#FF0000"}"##).unwrap();
        assert_eq!(solid, Fill::solid(Rgb::RED));

        let pattern: Fill =
            serde_json::from_str(r##"{"type":"pattern","pattern":"darkGrid","fg":"#000000"}"##)
                .unwrap();
        assert_eq!(
            pattern,
            Fill::Pattern {
                pattern: PatternType::DarkGrid,
                fg: Rgb::BLACK,
                bg: Rgb::WHITE
            }
        );

        let gradient: Fill = serde_json::from_str(
            r##"{"type":"gradient","kind":"path","stops":[{"position":1.0,"color":"#000000"},{"position":0.0,"color":"#FFFFFF"}]}"##,
        )
        .unwrap();
        let Fill::Gradient(g) = gradient else {
            panic!("expected gradient");
        };
        assert_eq!(g.kind, GradientKind::Path);
        assert_eq!(g.sorted_stops().first().unwrap().color, Rgb::WHITE);
    }

    #[test]
    fn test_background_color() {
        assert_eq!(Fill::None.background_color(), None);
        assert_eq!(Fill::solid(Rgb::RED).background_color(), Some(Rgb::RED));
        let p = Fill::Pattern {
            pattern: PatternType::LightGrid,
            fg: Rgb::BLACK,
            bg: Rgb::new(1, 2, 3),
        };
        assert_eq!(p.background_color(), Some(Rgb::new(1, 2, 3)));
    }

    #[test]
    fn test_style_defaults() {
        let style: CellStyle = serde_json::from_str("{}").unwrap();
        assert_eq!(style.font.name, "Calibri");
        assert_eq!(style.font.size, 11.0);
        assert_eq!(style.alignment.vertical, VAlign::Bottom);
        assert_eq!(style.alignment.horizontal, HAlign::General);
        assert_eq!(style.number_format(), "General");
    }
}
