//! One sheet: a sparse cell store plus its conditional formatting rules

use ahash::AHashMap;

use crate::cell::{CellAddress, CellValue};
use crate::conditional_format::ConditionalFormatRule;
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// A named sheet
///
/// Cells are keyed by 1-based `(row, col)`; a cell never written (or set to
/// [`CellValue::Empty`]) takes no space.
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    cells: AHashMap<(u32, u16), CellValue>,
    rules: Vec<ConditionalFormatRule>,
}

impl Worksheet {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: AHashMap::new(),
            rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of cells holding something
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Owned copy of a cell, [`CellValue::Empty`] when blank
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.value_ref_at(row, col).cloned().unwrap_or_default()
    }

    /// The stored value, `None` for a blank cell
    pub fn value_ref_at(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Store `value` at an A1 address; storing `Empty` clears the cell
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.put(addr.row, addr.col, value.into())
    }

    /// Store an uncalculated formula; the leading `=` is optional
    pub fn set_cell_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        let text = match formula.strip_prefix('=') {
            Some(_) => formula.to_string(),
            None => format!("={}", formula),
        };
        self.put(addr.row, addr.col, CellValue::formula(text))
    }

    /// Write values down a column starting at `start`, one per row
    pub fn fill_column<I, V>(&mut self, start: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let start = CellAddress::parse(start)?;
        values
            .into_iter()
            .zip(start.row..)
            .try_for_each(|(value, row)| self.put(row, start.col, value.into()))
    }

    /// Record the last calculated result of a formula cell
    pub fn set_formula_result(&mut self, row: u32, col: u16, value: CellValue) -> Result<()> {
        let Some(CellValue::Formula { cached_value, .. }) = self.cells.get_mut(&(row, col)) else {
            return Err(Error::InvalidAddress(format!(
                "{} holds no formula",
                CellAddress::new(row, col)
            )));
        };
        *cached_value = Some(Box::new(value));
        Ok(())
    }

    fn put(&mut self, row: u32, col: u16, value: CellValue) -> Result<()> {
        if !(1..=MAX_ROWS).contains(&row) {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS));
        }
        if !(1..=MAX_COLS).contains(&col) {
            return Err(Error::ColumnOutOfBounds(u32::from(col), MAX_COLS));
        }
        if value == CellValue::Empty {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value);
        }
        Ok(())
    }

    pub fn add_conditional_format(&mut self, rule: ConditionalFormatRule) {
        self.rules.push(rule);
    }

    /// Rules in the order they were added
    pub fn conditional_formats(&self) -> &[ConditionalFormatRule] {
        &self.rules
    }

    /// Rules covering `addr`, lowest priority number first
    pub fn conditional_formats_at(&self, addr: &CellAddress) -> Vec<&ConditionalFormatRule> {
        let mut covering: Vec<_> = self.rules.iter().filter(|r| r.applies_to(addr)).collect();
        covering.sort_by_key(|r| r.priority);
        covering
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellRange;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_values() {
        let mut ws = Worksheet::new("Test");
        ws.set_cell_value("A1", "Hello").unwrap();
        ws.set_cell_value("b1", 42.0).unwrap();
        ws.set_cell_value("$C$1", true).unwrap();

        assert_eq!(ws.get_value_at(1, 1), CellValue::string("Hello"));
        assert_eq!(ws.get_value_at(1, 2), CellValue::Number(42.0));
        assert_eq!(ws.get_value_at(1, 3), CellValue::Boolean(true));
        assert_eq!(ws.get_value_at(1, 4), CellValue::Empty);
        assert_eq!(ws.value_ref_at(1, 4), None);
        assert_eq!(ws.cell_count(), 3);
    }

    #[test]
    fn test_setting_empty_clears_the_cell() {
        let mut ws = Worksheet::new("Test");
        ws.set_cell_value("A1", 1).unwrap();
        ws.set_cell_value("A1", CellValue::Empty).unwrap();
        assert_eq!(ws.cell_count(), 0);
    }

    #[test]
    fn test_bad_addresses() {
        let mut ws = Worksheet::new("Test");
        assert!(matches!(ws.set_cell_value("A0", 1), Err(Error::InvalidAddress(_))));
        assert!(ws.fill_column("A1048575", [1, 2, 3]).is_err());
        // Rows written before the failure stay written
        assert_eq!(ws.cell_count(), 2);
    }

    #[test]
    fn test_formula_cells() {
        let mut ws = Worksheet::new("Test");
        ws.set_cell_formula("A3", "A1+A2").unwrap();
        assert_eq!(ws.get_value_at(3, 1), CellValue::formula("=A1+A2"));

        ws.set_formula_result(3, 1, CellValue::Number(7.0)).unwrap();
        assert_eq!(ws.get_value_at(3, 1).as_number(), Some(7.0));
        assert!(ws.set_formula_result(1, 1, CellValue::Empty).is_err());
    }

    #[test]
    fn test_fill_column() {
        let mut ws = Worksheet::new("Test");
        ws.fill_column("B2", [0, 1, 1, 2, 3]).unwrap();
        assert_eq!(ws.get_value_at(6, 2), CellValue::Number(3.0));
        assert_eq!(ws.cell_count(), 5);
    }

    #[test]
    fn test_rules_at_a_cell() {
        let mut ws = Worksheet::new("Test");
        ws.add_conditional_format(
            ConditionalFormatRule::cell_is_greater_than("100")
                .with_range(CellRange::parse("A1:A10").unwrap())
                .with_priority(2),
        );
        ws.add_conditional_format(
            ConditionalFormatRule::contains_blanks()
                .with_range(CellRange::parse("A1:B10").unwrap())
                .with_priority(1),
        );

        let rules = ws.conditional_formats_at(&CellAddress::new(1, 1));
        assert_eq!(rules.iter().map(|r| r.priority).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(ws.conditional_formats_at(&CellAddress::new(1, 2)).len(), 1);
        assert!(ws.conditional_formats_at(&CellAddress::new(1, 3)).is_empty());
        assert_eq!(ws.conditional_formats().len(), 2);
    }
}
