use serde::{Deserialize, Serialize};

use super::CellStyle;
use crate::numfmt::format_number;

/// A cell's raw value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum CellValue {
    #[default]
    Blank,
    Boolean(bool),
    Number(f64),
    Text(String),
    /// Formula text including the leading `=`; never evaluated.
    Formula(String),
}

/// Data type tag derived from the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    Blank,
    Boolean,
    Number,
    String,
    Formula,
}

impl CellValue {
    /// Infer a value from user input: `=...` is a formula, empty is blank,
    /// anything else is text.
    pub fn from_input(input: &str) -> Self {
        if input.is_empty() {
            CellValue::Blank
        } else if input.starts_with('=') {
            CellValue::Formula(input.to_string())
        } else {
            CellValue::Text(input.to_string())
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            CellValue::Blank => DataType::Blank,
            CellValue::Boolean(_) => DataType::Boolean,
            CellValue::Number(_) => DataType::Number,
            CellValue::Text(_) => DataType::String,
            CellValue::Formula(_) => DataType::Formula,
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Number(f64::from(v))
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Boolean(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::from_input(v)
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::from_input(&v)
    }
}

/// A single cell's data and style
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    #[serde(default)]
    pub value: CellValue,
    #[serde(default)]
    pub style: CellStyle,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            style: CellStyle::default(),
        }
    }

    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = style;
        self
    }

    pub fn data_type(&self) -> DataType {
        self.value.data_type()
    }

    /// Blank cells and empty strings render no content.
    pub fn is_blank(&self) -> bool {
        match &self.value {
            CellValue::Blank => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self.value, CellValue::Formula(_))
    }

    pub fn formula(&self) -> Option<&str> {
        match &self.value {
            CellValue::Formula(f) => Some(f),
            _ => None,
        }
    }

    pub fn numeric_value(&self) -> Option<f64> {
        match self.value {
            CellValue::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The text a reader would see, with numbers run through the number format.
    pub fn display_text(&self) -> String {
        match &self.value {
            CellValue::Blank => String::new(),
            CellValue::Boolean(true) => "TRUE".to_string(),
            CellValue::Boolean(false) => "FALSE".to_string(),
            CellValue::Number(n) => format_number(*n, self.style.number_format()),
            CellValue::Text(s) => s.clone(),
            CellValue::Formula(f) => f.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_value_inference() {
        assert_eq!(CellValue::from("=SUM(A1:A3)").data_type(), DataType::Formula);
        assert_eq!(CellValue::from("hello").data_type(), DataType::String);
        assert_eq!(CellValue::from("").data_type(), DataType::Blank);
        assert_eq!(CellValue::from(4.5).data_type(), DataType::Number);
        assert_eq!(CellValue::from(true).data_type(), DataType::Boolean);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(Cell::new(42).display_text(), "42");
        assert_eq!(Cell::new(0).display_text(), "0");
        assert_eq!(Cell::new(true).display_text(), "TRUE");
        assert_eq!(Cell::new("=A1+1").display_text(), "=A1+1");

        let mut pct = Cell::new(0.5);
        pct.style.number_format = "0%".to_string();
        assert_eq!(pct.display_text(), "50%");
    }

    #[test]
    fn test_blank_detection() {
        assert!(Cell::default().is_blank());
        assert!(Cell::new(CellValue::Text(String::new())).is_blank());
        assert!(!Cell::new(0).is_blank());
    }

    #[test]
    fn test_value_json_shape() {
        let json = serde_json::to_string(&CellValue::Number(1.5)).unwrap();
        assert_eq!(json, r#"{"type":"number","value":1.5}"#);
        let blank: CellValue = serde_json::from_str(r#"{"type":"blank"}"#).unwrap();
        assert_eq!(blank, CellValue::Blank);
    }
}
