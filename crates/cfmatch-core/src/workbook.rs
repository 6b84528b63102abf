//! The container the matcher and the formula engine read from

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// Characters a sheet name may not contain
const FORBIDDEN_IN_NAMES: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

/// An ordered set of worksheets
///
/// Sheets are addressed by index everywhere else in the workspace; names only matter for
/// `Sheet1!A1` style references.
#[derive(Debug)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    /// A workbook holding one empty sheet, `Sheet1`
    pub fn new() -> Self {
        Self {
            sheets: vec![Worksheet::new("Sheet1")],
        }
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.sheets.get_mut(index)
    }

    /// Like [`worksheet`](Self::worksheet), with [`Error::SheetOutOfBounds`] for a bad index
    pub fn try_worksheet(&self, index: usize) -> Result<&Worksheet> {
        self.worksheet(index)
            .ok_or(Error::SheetOutOfBounds(index, self.sheets.len()))
    }

    /// Index of the sheet called `name`, compared without regard to case
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.sheets
            .iter()
            .position(|sheet| sheet.name().to_lowercase() == wanted)
    }

    /// Append an empty sheet and return its index
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.check_new_name(name)?;
        self.sheets.push(Worksheet::new(name));
        Ok(self.sheets.len() - 1)
    }

    fn check_new_name(&self, name: &str) -> Result<()> {
        let problem = if name.is_empty() {
            Some("a sheet name cannot be empty".to_string())
        } else if name.chars().count() > MAX_SHEET_NAME_LEN {
            Some(format!("'{}' is longer than {} characters", name, MAX_SHEET_NAME_LEN))
        } else {
            name.chars()
                .find(|c| FORBIDDEN_IN_NAMES.contains(c))
                .map(|c| format!("'{}' contains '{}'", name, c))
        };

        match problem {
            Some(reason) => Err(Error::InvalidSheetName(reason)),
            None if self.sheet_index(name).is_some() => Err(Error::DuplicateSheetName(name.into())),
            None => Ok(()),
        }
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
