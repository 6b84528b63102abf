//! A1-style cell addresses and rectangular ranges

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address such as `B7` or `$B$7`
///
/// Columns and rows are 1-based, so `A1` is `(col 1, row 1)`. A `$` marker locks its axis:
/// a locked axis keeps its value when a rule is re-anchored at another cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    pub row: u32,
    /// A=1 through XFD=16384
    pub col: u16,
    pub row_absolute: bool,
    pub col_absolute: bool,
}

/// Split `$AB$12` into its four parts without validating the numbers
fn split_a1(s: &str) -> Option<(bool, &str, bool, &str)> {
    let (col_absolute, rest) = match s.strip_prefix('$') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let letters_end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let (letters, rest) = rest.split_at(letters_end);
    let (row_absolute, digits) = match rest.strip_prefix('$') {
        Some(digits) => (true, digits),
        None => (false, rest),
    };
    let well_formed = !letters.is_empty()
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit());
    well_formed.then_some((col_absolute, letters, row_absolute, digits))
}

impl CellAddress {
    /// A relative address
    pub fn new(row: u32, col: u16) -> Self {
        Self::with_absolute(row, col, false, false)
    }

    pub fn with_absolute(row: u32, col: u16, row_absolute: bool, col_absolute: bool) -> Self {
        Self {
            row,
            col,
            row_absolute,
            col_absolute,
        }
    }

    /// `$A$1` style: both axes locked
    pub fn absolute(row: u32, col: u16) -> Self {
        Self::with_absolute(row, col, true, true)
    }

    /// Parse A1-style text; letters may be lowercase
    ///
    /// ```
    /// use cfmatch_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("$B$2").unwrap();
    /// assert_eq!((addr.col, addr.row), (2, 2));
    /// assert!(addr.row_absolute && addr.col_absolute);
    /// assert!(CellAddress::parse("B0").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (col_absolute, letters, row_absolute, digits) =
            split_a1(s).ok_or_else(|| Error::InvalidAddress(format!("'{}'", s)))?;

        let col = Self::letters_to_column(letters)?;
        let row: u32 = digits
            .parse()
            .map_err(|_| Error::RowOutOfBounds(u32::MAX, MAX_ROWS))?;
        if row == 0 {
            return Err(Error::InvalidAddress(format!("'{}' has row 0", s)));
        }
        if row > MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS));
        }

        Ok(Self::with_absolute(row, col, row_absolute, col_absolute))
    }

    /// 1 = A, 26 = Z, 27 = AA
    pub fn column_to_letters(col: u16) -> String {
        let mut letters = Vec::new();
        let mut rest = u32::from(col);
        while rest > 0 {
            let digit = (rest - 1) % 26;
            letters.push(char::from(b'A' + digit as u8));
            rest = (rest - 1) / 26;
        }
        letters.iter().rev().collect()
    }

    /// A = 1, Z = 26, AA = 27; case is ignored
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("no column letters".into()));
        }
        letters.chars().try_fold(0u16, |col, c| {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!("column letter '{}'", c)));
            }
            let digit = u32::from(c.to_ascii_uppercase()) - u32::from('A') + 1;
            let next = u32::from(col) * 26 + digit;
            u16::try_from(next)
                .ok()
                .filter(|&n| n <= MAX_COLS)
                .ok_or(Error::ColumnOutOfBounds(next, MAX_COLS))
        })
    }

    /// Move by `(d_col, d_row)`; locked axes stay put
    ///
    /// ```
    /// use cfmatch_core::CellAddress;
    ///
    /// let moved = CellAddress::parse("$A1").unwrap().shift(2, 4).unwrap();
    /// assert_eq!(moved.to_string(), "$A5");
    /// ```
    pub fn shift(&self, d_col: i64, d_row: i64) -> Result<Self> {
        let moved = |value: i64, locked: bool, delta: i64, max: i64| {
            let target = if locked { value } else { value + delta };
            (1..=max).contains(&target).then_some(target)
        };
        let col = moved(i64::from(self.col), self.col_absolute, d_col, i64::from(MAX_COLS));
        let row = moved(i64::from(self.row), self.row_absolute, d_row, i64::from(MAX_ROWS));

        match (col, row) {
            (Some(col), Some(row)) => Ok(Self {
                row: row as u32,
                col: col as u16,
                ..*self
            }),
            _ => Err(Error::ShiftOutOfBounds {
                reference: self.to_a1_string(),
                d_col,
                d_row,
            }),
        }
    }

    /// `(d_col, d_row)` from `origin` to this address
    pub fn offset_from(&self, origin: &CellAddress) -> (i64, i64) {
        (
            i64::from(self.col) - i64::from(origin.col),
            i64::from(self.row) - i64::from(origin.row),
        )
    }

    /// Same row and column, whatever the lock markers
    pub fn same_cell(&self, other: &CellAddress) -> bool {
        (self.row, self.col) == (other.row, other.col)
    }

    pub fn to_relative(&self) -> Self {
        Self::new(self.row, self.col)
    }

    pub fn to_absolute(&self) -> Self {
        Self::absolute(self.row, self.col)
    }

    /// A1 text with exactly the lock markers this address carries
    pub fn to_a1_string(&self) -> String {
        format!(
            "{}{}{}{}",
            if self.col_absolute { "$" } else { "" },
            Self::column_to_letters(self.col),
            if self.row_absolute { "$" } else { "" },
            self.row
        )
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangle of cells, always stored top-left to bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    /// Range spanning two corners given in any order
    ///
    /// Each corner keeps its own lock markers.
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress {
                row: a.row.min(b.row),
                col: a.col.min(b.col),
                ..a
            },
            end: CellAddress {
                row: a.row.max(b.row),
                col: a.col.max(b.col),
                ..b
            },
        }
    }

    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// `A1:B10`, or a single cell `A1`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (first, second) = s.split_once(':').unwrap_or((s, s));
        let start = CellAddress::parse(first).map_err(|e| range_error(s, e))?;
        let end = CellAddress::parse(second).map_err(|e| range_error(s, e))?;
        Ok(Self::new(start, end))
    }

    /// Top-left cell of a conditional-formatting range expression
    ///
    /// Lock markers are dropped and case is ignored. In a multi-area expression
    /// (`"A1:A10 C1:C10"` or `"A1:A10,C1:C10"`) the first area supplies the anchor.
    ///
    /// ```
    /// use cfmatch_core::{CellAddress, CellRange};
    ///
    /// let anchor = CellRange::anchor_from_range_text("$b$2:$c$11").unwrap();
    /// assert_eq!(anchor, CellAddress::new(2, 2));
    /// ```
    pub fn anchor_from_range_text(range_text: &str) -> Result<CellAddress> {
        let first = range_text
            .split(|c: char| c == ',' || c.is_whitespace())
            .find(|area| !area.is_empty())
            .ok_or_else(|| Error::InvalidRange(format!("no cells in '{}'", range_text)))?;
        Ok(Self::parse(first)?.start.to_relative())
    }

    pub fn contains(&self, addr: &CellAddress) -> bool {
        (self.start.row..=self.end.row).contains(&addr.row)
            && (self.start.col..=self.end.col).contains(&addr.col)
    }

    /// Every cell, row by row, as relative addresses
    pub fn cells(&self) -> impl Iterator<Item = CellAddress> {
        let (cols, rows) = (
            self.start.col..=self.end.col,
            self.start.row..=self.end.row,
        );
        rows.flat_map(move |row| cols.clone().map(move |col| CellAddress::new(row, col)))
    }

    /// `A1:B10`, or just `A1` for a single cell
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start, self.end)
        }
    }

    /// Both corners fully locked, e.g. `$A$2:$B$11`
    pub fn to_absolute_string(&self) -> String {
        Self::new(self.start.to_absolute(), self.end.to_absolute()).to_a1_string()
    }
}

fn range_error(text: &str, cause: Error) -> Error {
    Error::InvalidRange(format!("'{}': {}", text, cause))
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_column_letters() {
        for (col, letters) in [(1, "A"), (26, "Z"), (27, "AA"), (702, "ZZ"), (703, "AAA"), (16384, "XFD")] {
            assert_eq!(CellAddress::column_to_letters(col), letters);
            assert_eq!(CellAddress::letters_to_column(letters).unwrap(), col);
        }
        assert_eq!(CellAddress::letters_to_column("aa").unwrap(), 27);
        assert!(CellAddress::letters_to_column("XFE").is_err());
        assert!(CellAddress::letters_to_column("ZZZZ").is_err());
    }

    #[test]
    fn test_parse() {
        let addr = CellAddress::parse("$A1").unwrap();
        assert_eq!((addr.col_absolute, addr.row_absolute), (true, false));

        let addr = CellAddress::parse("c$7").unwrap();
        assert_eq!(addr, CellAddress::with_absolute(7, 3, true, false));

        let addr = CellAddress::parse("XFD1048576").unwrap();
        assert_eq!((addr.col, addr.row), (16384, 1048576));
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "A", "1", "$", "A0", "A1B", "A1:B2", "A$$1", "A1048577", "XFE1", "A99999999999"] {
            assert!(CellAddress::parse(bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_shift() {
        let anchor = CellAddress::new(1, 1);
        let (d_col, d_row) = CellAddress::new(5, 3).offset_from(&anchor);
        assert_eq!((d_col, d_row), (2, 4));

        let shift = |s: &str, d_col, d_row| CellAddress::parse(s).unwrap().shift(d_col, d_row);
        assert_eq!(shift("B2", d_col, d_row).unwrap().to_string(), "D6");
        assert_eq!(shift("A$1", 2, 4).unwrap().to_string(), "C$1");
        assert_eq!(shift("$A$1", -7, 9).unwrap().to_string(), "$A$1");
    }

    #[test]
    fn test_shift_off_sheet() {
        let err = CellAddress::parse("A1").unwrap().shift(-1, 0).unwrap_err();
        assert!(matches!(err, Error::ShiftOutOfBounds { .. }));
        assert!(CellAddress::parse("XFD1").unwrap().shift(1, 0).is_err());

        // A locked axis never leaves the sheet
        assert!(CellAddress::parse("$A2").unwrap().shift(-1, -1).is_ok());
    }

    #[test]
    fn test_range_corners_normalize() {
        let range = CellRange::parse("$C$11:A2").unwrap();
        assert_eq!(range.start, CellAddress::new(2, 1).to_absolute());
        assert_eq!(range.end, CellAddress::new(11, 3));
        assert_eq!(CellRange::parse("b5").unwrap().to_string(), "B5");
        assert!(CellRange::parse("A1:").is_err());
    }

    #[test]
    fn test_anchor_from_range_text() {
        assert_eq!(
            CellRange::anchor_from_range_text("A2:C11").unwrap(),
            CellAddress::new(2, 1)
        );
        assert_eq!(
            CellRange::anchor_from_range_text("$C$11:$A$2").unwrap(),
            CellAddress::new(2, 1)
        );
        assert_eq!(
            CellRange::anchor_from_range_text("d4:e5 A1:B2").unwrap(),
            CellAddress::new(4, 4)
        );
        assert!(CellRange::anchor_from_range_text(" , ").is_err());
        assert!(CellRange::anchor_from_range_text("Z:Z").is_err());
    }

    #[test]
    fn test_cells_row_by_row() {
        let range = CellRange::parse("A1:B2").unwrap();
        let cells: Vec<_> = range.cells().map(|a| a.to_string()).collect();
        assert_eq!(cells, vec!["A1", "B1", "A2", "B2"]);
        assert!(range.contains(&CellAddress::absolute(2, 2)));
        assert!(!range.contains(&CellAddress::new(3, 1)));
    }

    #[test]
    fn test_absolute_string() {
        let range = CellRange::parse("A2:B11").unwrap();
        assert_eq!(range.to_absolute_string(), "$A$2:$B$11");
    }

    proptest! {
        #[test]
        fn prop_format_parse_round_trip(
            col in 1u16..=16384,
            row in 1u32..=1_048_576,
            col_abs: bool,
            row_abs: bool,
        ) {
            let text = CellAddress::with_absolute(row, col, row_abs, col_abs).to_a1_string();
            let parsed = CellAddress::parse(&text).unwrap();
            prop_assert_eq!(parsed.to_a1_string(), text);
            prop_assert_eq!(parsed.col_absolute, col_abs);
            prop_assert_eq!(parsed.row_absolute, row_abs);
        }

        #[test]
        fn prop_locked_axes_never_move(
            d_col in -50i64..50,
            d_row in -50i64..50,
        ) {
            let addr = CellAddress::parse("$BZ$100").unwrap();
            prop_assert_eq!(addr.shift(d_col, d_row).unwrap(), addr);

            let col_locked = CellAddress::parse("$BZ100").unwrap();
            let moved = col_locked.shift(d_col, d_row).unwrap();
            prop_assert_eq!(moved.col, col_locked.col);
            prop_assert_eq!(moved.row as i64, 100 + d_row);
        }
    }
}
