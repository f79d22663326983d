//! Utilities for parsing and formatting Excel-style cell references and ranges.
//!
//! Rows and columns are 1-indexed throughout: "A1" is `(1, 1)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, XlrenderError};

/// Largest column Excel addresses ("XFD").
pub const MAX_COLUMN: u32 = 16_384;
/// Largest row Excel addresses.
pub const MAX_ROW: u32 = 1_048_576;

/// Parse a cell reference like "B3" or "$B$3" into `(row, col)`, both 1-indexed.
///
/// Letters must come before digits, and both parts are required.
///
/// # Errors
/// Returns [`XlrenderError::CellRef`] for empty, reordered, zero-row or
/// out-of-range references.
pub fn parse_cell_ref(cell_ref: &str) -> Result<(u32, u32)> {
    let trimmed = cell_ref.trim();
    let invalid = || XlrenderError::CellRef(cell_ref.to_string());

    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;
    let mut prev_dollar = false;

    for (i, ch) in trimmed.char_indices() {
        if ch == '$' {
            // Absolute markers are allowed once before the column and once before the row.
            if prev_dollar || saw_row || (i > 0 && !saw_col) {
                return Err(invalid());
            }
            prev_dollar = true;
            continue;
        }
        prev_dollar = false;
        match ch {
            'A'..='Z' | 'a'..='z' => {
                if saw_row {
                    return Err(invalid());
                }
                let digit = u32::from(ch.to_ascii_uppercase()) - u32::from('A') + 1;
                col = col
                    .checked_mul(26)
                    .and_then(|c| c.checked_add(digit))
                    .ok_or_else(invalid)?;
                saw_col = true;
            }
            '0'..='9' => {
                if !saw_col {
                    return Err(invalid());
                }
                let digit = u32::from(ch) - u32::from('0');
                row = row
                    .checked_mul(10)
                    .and_then(|r| r.checked_add(digit))
                    .ok_or_else(invalid)?;
                saw_row = true;
            }
            _ => return Err(invalid()),
        }
    }

    if !saw_col || !saw_row || row == 0 || row > MAX_ROW || col > MAX_COLUMN {
        return Err(invalid());
    }

    Ok((row, col))
}

/// Parse a range like "A1:C10" or a single reference "B2".
///
/// Corners may be given in any order; the result is normalized so that
/// `start <= end` on both axes.
///
/// # Errors
/// Returns [`XlrenderError::Range`] if the range has a missing or extra
/// corner, and [`XlrenderError::CellRef`] if a corner does not parse.
pub fn parse_cell_range(range: &str) -> Result<CellRange> {
    let trimmed = range.trim();
    let mut parts = trimmed.split(':');
    let first = parts.next().unwrap_or_default();
    let second = parts.next();
    if parts.next().is_some() || first.is_empty() || second.is_some_and(str::is_empty) {
        return Err(XlrenderError::Range(range.to_string()));
    }

    let (r1, c1) = parse_cell_ref(first)?;
    let (r2, c2) = match second {
        Some(end) => parse_cell_ref(end)?,
        None => (r1, c1),
    };
    Ok(CellRange::new(r1, c1, r2, c2))
}

/// Convert a 1-indexed column number to its letters (1 -> "A", 28 -> "AB").
///
/// Column 0 has no letters and yields an empty string.
pub fn column_letter(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Convert column letters to a 1-indexed column number ("A" -> 1, "AB" -> 28).
///
/// # Errors
/// Returns [`XlrenderError::CellRef`] if the input is empty or contains non-letters.
pub fn column_number(letters: &str) -> Result<u32> {
    let invalid = || XlrenderError::CellRef(letters.to_string());
    if letters.is_empty() {
        return Err(invalid());
    }
    letters.chars().try_fold(0u32, |acc, ch| {
        if !ch.is_ascii_alphabetic() {
            return Err(invalid());
        }
        let digit = u32::from(ch.to_ascii_uppercase()) - u32::from('A') + 1;
        acc.checked_mul(26)
            .and_then(|c| c.checked_add(digit))
            .ok_or_else(invalid)
    })
}

/// Format a 1-indexed `(row, col)` pair as an A1 reference.
pub fn format_cell_ref(row: u32, col: u32) -> String {
    format!("{}{}", column_letter(col), row)
}

/// An inclusive, normalized rectangular block of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl CellRange {
    /// Build a range from two corners in any order.
    pub fn new(row_a: u32, col_a: u32, row_b: u32, col_b: u32) -> Self {
        Self {
            start_row: row_a.min(row_b),
            start_col: col_a.min(col_b),
            end_row: row_a.max(row_b),
            end_col: col_a.max(col_b),
        }
    }

    /// A 1x1 range.
    pub fn single(row: u32, col: u32) -> Self {
        Self::new(row, col, row, col)
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    /// The top-left cell.
    pub fn anchor(&self) -> (u32, u32) {
        (self.start_row, self.start_col)
    }

    pub fn is_anchor(&self, row: u32, col: u32) -> bool {
        row == self.start_row && col == self.start_col
    }

    pub fn row_span(&self) -> u32 {
        self.end_row.saturating_sub(self.start_row) + 1
    }

    pub fn col_span(&self) -> u32 {
        self.end_col.saturating_sub(self.start_col) + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    pub fn intersects(&self, other: &CellRange) -> bool {
        self.start_row <= other.end_row
            && other.start_row <= self.end_row
            && self.start_col <= other.end_col
            && other.start_col <= self.end_col
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            f.write_str(&format_cell_ref(self.start_row, self.start_col))
        } else {
            write!(
                f,
                "{}:{}",
                format_cell_ref(self.start_row, self.start_col),
                format_cell_ref(self.end_row, self.end_col)
            )
        }
    }
}

impl FromStr for CellRange {
    type Err = XlrenderError;

    fn from_str(s: &str) -> Result<Self> {
        parse_cell_range(s)
    }
}
