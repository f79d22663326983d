use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::{
    Cell, CellStyle, CellValue, ConditionalFormat, ConditionalRule, PageMargins, PageSetup,
    SheetImage,
};
use crate::cell_ref::{parse_cell_range, CellRange};
use crate::error::{Result, XlrenderError};

/// Explicit row configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RowConfig {
    /// Height in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Explicit column configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnConfig {
    /// Width in characters (Excel's unit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

/// A sparse grid of styled cells plus sheet-level metadata.
///
/// Rows and columns are 1-indexed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Worksheet {
    pub name: String,
    #[serde(with = "cell_entries")]
    cells: BTreeMap<(u32, u32), Cell>,
    #[serde(deserialize_with = "merge_list::deserialize")]
    merged_ranges: Vec<CellRange>,
    rows: BTreeMap<u32, RowConfig>,
    columns: BTreeMap<u32, ColumnConfig>,
    pub page_setup: PageSetup,
    pub page_margins: PageMargins,
    conditional_formats: Vec<ConditionalFormat>,
    images: Vec<SheetImage>,
    /// Every merged member cell -> index into `merged_ranges`.
    #[serde(skip)]
    merge_lookup: OnceLock<HashMap<(u32, u32), usize>>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Cells
    // ------------------------------------------------------------------

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Get a cell, creating a blank one if absent.
    pub fn cell_mut(&mut self, row: u32, col: u32) -> &mut Cell {
        self.cells.entry((row, col)).or_default()
    }

    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.cells.insert((row, col), cell);
    }

    /// Set a cell's value, keeping its style. Strings starting with `=` become formulas.
    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) -> &mut Cell {
        let cell = self.cell_mut(row, col);
        cell.value = value.into();
        cell
    }

    /// Set a formula; a missing leading `=` is added.
    pub fn set_formula(&mut self, row: u32, col: u32, formula: &str) -> &mut Cell {
        let text = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={formula}")
        };
        self.set_value(row, col, CellValue::Formula(text))
    }

    pub fn set_style(&mut self, row: u32, col: u32, style: CellStyle) -> &mut Cell {
        let cell = self.cell_mut(row, col);
        cell.style = style;
        cell
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u32), &Cell)> {
        self.cells.iter().map(|(&k, v)| (k, v))
    }

    /// Cells of one row as `(col, cell)`, left to right.
    pub fn cells_in_row(&self, row: u32) -> impl Iterator<Item = (u32, &Cell)> {
        self.cells
            .range((row, 0)..=(row, u32::MAX))
            .map(|(&(_, col), cell)| (col, cell))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.merged_ranges.is_empty()
    }

    // ------------------------------------------------------------------
    // Rows and columns
    // ------------------------------------------------------------------

    pub fn row_config(&self, row: u32) -> Option<&RowConfig> {
        self.rows.get(&row)
    }

    pub fn column_config(&self, col: u32) -> Option<&ColumnConfig> {
        self.columns.get(&col)
    }

    pub fn row_config_mut(&mut self, row: u32) -> &mut RowConfig {
        self.rows.entry(row).or_default()
    }

    pub fn column_config_mut(&mut self, col: u32) -> &mut ColumnConfig {
        self.columns.entry(col).or_default()
    }

    /// Set a row height in points.
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_config_mut(row).height = Some(height);
    }

    /// Set a column width in characters.
    pub fn set_column_width(&mut self, col: u32, width: f64) {
        self.column_config_mut(col).width = Some(width);
    }

    /// Highest populated row, including merged extents. 0 when empty.
    pub fn max_row(&self) -> u32 {
        let from_cells = self.cells.keys().map(|&(r, _)| r).max().unwrap_or(0);
        let from_merges = self.merged_ranges.iter().map(|m| m.end_row).max().unwrap_or(0);
        from_cells.max(from_merges)
    }

    /// Highest populated column, including merged extents. 0 when empty.
    pub fn max_col(&self) -> u32 {
        let from_cells = self.cells.keys().map(|&(_, c)| c).max().unwrap_or(0);
        let from_merges = self.merged_ranges.iter().map(|m| m.end_col).max().unwrap_or(0);
        from_cells.max(from_merges)
    }

    // ------------------------------------------------------------------
    // Merges
    // ------------------------------------------------------------------

    /// Merge the cells of an A1-style range such as "A1:B2".
    ///
    /// # Errors
    /// Fails on a malformed reference, or if the range overlaps an existing merge.
    pub fn merge_cells(&mut self, range: &str) -> Result<CellRange> {
        let parsed = parse_cell_range(range)?;
        self.merge_range(parsed)?;
        Ok(parsed)
    }

    /// # Errors
    /// Fails if the range is inverted, a single cell, or overlaps an existing merge.
    pub fn merge_range(&mut self, range: CellRange) -> Result<()> {
        check_merge(&self.merged_ranges, &range)?;
        self.merged_ranges.push(range);
        self.merge_lookup = OnceLock::new();
        Ok(())
    }

    /// Re-check every merge the way [`merge_range`](Self::merge_range) does.
    ///
    /// # Errors
    /// Returns [`XlrenderError::Range`] for the first inverted, single-cell
    /// or overlapping merge.
    pub fn validate_merges(&self) -> Result<()> {
        validate_merge_list(&self.merged_ranges)
    }

    pub fn merged_ranges(&self) -> &[CellRange] {
        &self.merged_ranges
    }

    /// The merged range containing this cell, if any.
    pub fn merge_at(&self, row: u32, col: u32) -> Option<&CellRange> {
        let lookup = self.merge_lookup.get_or_init(|| {
            let mut map = HashMap::new();
            for (i, m) in self.merged_ranges.iter().enumerate() {
                for r in m.start_row..=m.end_row {
                    for c in m.start_col..=m.end_col {
                        map.insert((r, c), i);
                    }
                }
            }
            map
        });
        lookup
            .get(&(row, col))
            .and_then(|&i| self.merged_ranges.get(i))
    }

    pub fn is_merged(&self, row: u32, col: u32) -> bool {
        self.merge_at(row, col).is_some()
    }

    /// True only for the top-left (anchor) cell of a merged range.
    pub fn is_merged_parent(&self, row: u32, col: u32) -> bool {
        self.merge_at(row, col).is_some_and(|m| m.is_anchor(row, col))
    }

    // ------------------------------------------------------------------
    // Conditional formats and images
    // ------------------------------------------------------------------

    /// # Errors
    /// Fails on a malformed range reference.
    pub fn add_conditional_format(&mut self, range: &str, rule: ConditionalRule) -> Result<()> {
        let range = parse_cell_range(range)?;
        self.conditional_formats.push(ConditionalFormat { range, rule });
        Ok(())
    }

    pub fn conditional_formats(&self) -> &[ConditionalFormat] {
        &self.conditional_formats
    }

    /// Formats covering a cell, in declaration order.
    pub fn conditional_formats_at(
        &self,
        row: u32,
        col: u32,
    ) -> impl Iterator<Item = &ConditionalFormat> {
        self.conditional_formats
            .iter()
            .filter(move |cf| cf.range.contains(row, col))
    }

    pub fn add_image(&mut self, image: SheetImage) {
        self.images.push(image);
    }

    pub fn images(&self) -> &[SheetImage] {
        &self.images
    }
}

/// Cells serialize as a list of `{row, col, value, style}` entries.
/// Reject `range` if it is inverted, a single cell, or overlaps one of `existing`.
fn check_merge(existing: &[CellRange], range: &CellRange) -> Result<()> {
    if range.start_row > range.end_row || range.start_col > range.end_col {
        return Err(XlrenderError::Range(format!(
            "merge ({}, {})..({}, {}) ends before it starts",
            range.start_row, range.start_col, range.end_row, range.end_col
        )));
    }
    if range.is_single_cell() {
        return Err(XlrenderError::Range(format!(
            "{range} is a single cell and cannot be merged"
        )));
    }
    if let Some(other) = existing.iter().find(|m| m.intersects(range)) {
        return Err(XlrenderError::Range(format!(
            "{range} overlaps existing merge {other}"
        )));
    }
    Ok(())
}

fn validate_merge_list(ranges: &[CellRange]) -> Result<()> {
    for (i, range) in ranges.iter().enumerate() {
        check_merge(ranges.get(..i).unwrap_or_default(), range)?;
    }
    Ok(())
}

/// Loaded merges go through the same checks as [`Worksheet::merge_range`].
mod merge_list {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    use crate::cell_ref::CellRange;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<CellRange>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ranges = Vec::<CellRange>::deserialize(deserializer)?;
        super::validate_merge_list(&ranges).map_err(D::Error::custom)?;
        Ok(ranges)
    }
}

mod cell_entries {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::types::Cell;

    #[derive(Serialize)]
    struct EntryRef<'a> {
        row: u32,
        col: u32,
        #[serde(flatten)]
        cell: &'a Cell,
    }

    #[derive(Deserialize)]
    struct Entry {
        row: u32,
        col: u32,
        #[serde(flatten)]
        cell: Cell,
    }

    pub fn serialize<S>(cells: &BTreeMap<(u32, u32), Cell>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(
            cells
                .iter()
                .map(|(&(row, col), cell)| EntryRef { row, col, cell }),
        )
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<(u32, u32), Cell>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| ((e.row, e.col), e.cell))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::DataType;

    #[test]
    fn test_loaded_overlapping_merges_are_rejected() {
        let json = r#"{"name": "S", "mergedRanges": [
            {"startRow": 1, "startCol": 1, "endRow": 2, "endCol": 2},
            {"startRow": 2, "startCol": 2, "endRow": 3, "endCol": 3}
        ]}"#;
        let err = serde_json::from_str::<Worksheet>(json).unwrap_err();
        assert!(err.to_string().contains("overlaps"), "{err}");
    }

    #[test]
    fn test_loaded_inverted_merge_is_rejected() {
        let json = r#"{"name": "S", "mergedRanges": [
            {"startRow": 3, "startCol": 3, "endRow": 1, "endCol": 1}
        ]}"#;
        let err = serde_json::from_str::<Worksheet>(json).unwrap_err();
        assert!(err.to_string().contains("ends before it starts"), "{err}");
    }

    #[test]
    fn test_loaded_valid_merges_round_trip() {
        let json = r#"{"name": "S", "mergedRanges": [
            {"startRow": 1, "startCol": 1, "endRow": 2, "endCol": 2},
            {"startRow": 3, "startCol": 1, "endRow": 3, "endCol": 4}
        ]}"#;
        let ws: Worksheet = serde_json::from_str(json).unwrap();
        assert_eq!(ws.merged_ranges().len(), 2);
        assert!(ws.validate_merges().is_ok());
        assert!(ws.is_merged(2, 2));
    }

    #[test]
    fn test_inverted_range_literal_cannot_be_merged() {
        let mut ws = Worksheet::new("S");
        let inverted = CellRange {
            start_row: 4,
            start_col: 2,
            end_row: 1,
            end_col: 1,
        };
        assert!(matches!(ws.merge_range(inverted), Err(XlrenderError::Range(_))));
        assert!(ws.merged_ranges().is_empty());
    }

    #[test]
    fn test_empty_sheet_extent() {
        let ws = Worksheet::new("Empty");
        assert_eq!(ws.max_row(), 0);
        assert_eq!(ws.max_col(), 0);
        assert!(ws.is_empty());
    }

    #[test]
    fn test_extent_includes_merges() {
        let mut ws = Worksheet::new("S");
        ws.set_value(2, 2, "x");
        ws.merge_cells("C3:E7").unwrap();
        assert_eq!(ws.max_row(), 7);
        assert_eq!(ws.max_col(), 5);
    }

    #[test]
    fn test_merge_queries() {
        let mut ws = Worksheet::new("S");
        ws.merge_cells("A1:B2").unwrap();
        assert!(ws.is_merged_parent(1, 1));
        assert!(!ws.is_merged_parent(2, 2));
        assert!(ws.is_merged(2, 2));
        assert!(!ws.is_merged(3, 1));
        assert_eq!(ws.merge_at(2, 1).unwrap().to_string(), "A1:B2");
    }

    #[test]
    fn test_merge_rejects_bad_input() {
        let mut ws = Worksheet::new("S");
        assert!(ws.merge_cells("A1:").is_err());
        assert!(ws.merge_cells("B2").is_err());
        ws.merge_cells("A1:B2").unwrap();
        assert!(ws.merge_cells("B2:C3").is_err());
        // Lookup was not poisoned by the failed merges.
        assert!(!ws.is_merged(3, 3));
    }

    #[test]
    fn test_merge_lookup_refreshes_after_new_merge() {
        let mut ws = Worksheet::new("S");
        ws.merge_cells("A1:B1").unwrap();
        assert!(!ws.is_merged(5, 5));
        ws.merge_cells("E5:F6").unwrap();
        assert!(ws.is_merged(5, 5));
    }

    #[test]
    fn test_set_formula_adds_equals() {
        let mut ws = Worksheet::new("S");
        ws.set_formula(1, 1, "SUM(B1:B3)");
        assert_eq!(ws.cell(1, 1).unwrap().formula(), Some("=SUM(B1:B3)"));
        ws.set_value(1, 2, "=A1");
        assert_eq!(ws.cell(1, 2).unwrap().data_type(), DataType::Formula);
    }

    #[test]
    fn test_cells_in_row() {
        let mut ws = Worksheet::new("S");
        ws.set_value(1, 3, 1);
        ws.set_value(2, 1, 2);
        ws.set_value(2, 4, 3);
        let cols: Vec<u32> = ws.cells_in_row(2).map(|(c, _)| c).collect();
        assert_eq!(cols, vec![1, 4]);
    }

    #[test]
    fn test_json_roundtrip_keeps_cells_and_merges() {
        let mut ws = Worksheet::new("Data");
        ws.set_value(1, 1, "Hello");
        ws.set_value(1, 2, 42);
        ws.set_column_width(2, 20.0);
        ws.merge_cells("A3:C3").unwrap();

        let json = serde_json::to_string(&ws).unwrap();
        let back: Worksheet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cell(1, 1).unwrap().display_text(), "Hello");
        assert_eq!(back.cell(1, 2).unwrap().numeric_value(), Some(42.0));
        assert_eq!(back.column_config(2).unwrap().width, Some(20.0));
        assert!(back.is_merged_parent(3, 1));
    }
}
