use serde::{Deserialize, Serialize};

use super::Worksheet;

/// An ordered collection of worksheets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Workbook {
    pub sheets: Vec<Worksheet>,
    /// Index of the sheet shown/printed by default.
    pub active_sheet: usize,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet, returning its index.
    pub fn add_worksheet(&mut self, sheet: Worksheet) -> usize {
        self.sheets.push(sheet);
        self.sheets.len() - 1
    }

    pub fn worksheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn worksheet_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// The active sheet, falling back to the first.
    pub fn active(&self) -> Option<&Worksheet> {
        self.sheets
            .get(self.active_sheet)
            .or_else(|| self.sheets.first())
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_find_sheets() {
        let mut wb = Workbook::new();
        let mut one = Worksheet::new("One");
        one.set_value(1, 1, "a");
        assert_eq!(wb.add_worksheet(one), 0);
        assert_eq!(wb.add_worksheet(Worksheet::new("Two")), 1);
        assert_eq!(wb.sheet_names().collect::<Vec<_>>(), vec!["One", "Two"]);
        assert_eq!(wb.worksheet("One").unwrap().cell_count(), 1);
        assert!(wb.worksheet("Three").is_none());
        wb.active_sheet = 7;
        assert_eq!(wb.active().unwrap().name, "One");
    }
}
