//! Quote-safe reference rewriting
//!
//! Conditional-formatting condition text is written against the top-left cell of the
//! rule's range. To evaluate it at another cell of the range, every relative reference in
//! the text moves by the distance between the two cells, the same way a formula moves when
//! it is filled. Text inside double-quoted string literals is never touched.
//!
//! ```
//! use cfmatch::reference::shift_references;
//! use cfmatch_core::CellAddress;
//!
//! let moved = shift_references(
//!     r#"A1="A1 is not a ref""#,
//!     CellAddress::new(1, 1),
//!     CellAddress::new(5, 3),
//! )
//! .unwrap();
//! assert_eq!(moved, r#"C5="A1 is not a ref""#);
//! ```

use lazy_regex::{lazy_regex, Lazy};
use regex::Regex;

use crate::error::{MatchError, Result};
use cfmatch_core::CellAddress;

/// A1 reference with an optional `Sheet1!` or `'My Sheet'!` prefix
///
/// The regex crate has no look-around, so the boundary rules (what may precede or follow
/// a reference) are checked on the surrounding characters after each match.
static REFERENCE: Lazy<Regex> = lazy_regex!(
    r"(?i)(?:(?P<sheet>'(?:[^']|'')+'|[A-Z_][A-Z0-9_.]*)!)?(?P<cell>\$?[A-Z]{1,3}\$?[0-9]+)"
);

/// Text that replaces a reference shifted off the edge of the sheet
pub const REF_ERROR: &str = "#REF!";

/// A cell reference found in condition text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reference<'a> {
    /// Sheet prefix as written (quotes kept, `!` dropped)
    pub sheet: Option<&'a str>,
    /// The referenced cell, lock markers included
    pub address: CellAddress,
    /// The whole reference as written
    pub text: &'a str,
    /// Whether the reference is one end of an `A1:B2` range
    pub range_endpoint: bool,
}

impl Reference<'_> {
    /// Whether the reference names a cell on the evaluating sheet with no locked axis
    pub fn is_plain_relative(&self) -> bool {
        self.sheet.is_none() && !self.address.col_absolute && !self.address.row_absolute
    }

    /// A plain relative reference standing alone, not as part of a range
    pub fn is_single_cell(&self) -> bool {
        self.is_plain_relative() && !self.range_endpoint
    }

    /// The reference moved by `(d_col, d_row)`, or `#REF!` when it leaves the sheet
    pub fn shifted_text(&self, d_col: i64, d_row: i64) -> String {
        match self.address.shift(d_col, d_row) {
            Ok(moved) => match self.sheet {
                Some(sheet) => format!("{}!{}", sheet, moved),
                None => moved.to_a1_string(),
            },
            Err(err) => {
                log::trace!("{} -> {} ({})", self.text, REF_ERROR, err);
                REF_ERROR.to_string()
            }
        }
    }
}

/// Rewrite every reference outside string literals in `expression`
///
/// `resolver` receives each reference plus the `(d_col, d_row)` offset from `anchor` to
/// `target` and returns its replacement text. Quoted segments and every `"` delimiter are
/// reproduced exactly.
///
/// Fails with [`MatchError::MalformedExpression`] when the quotes are unbalanced.
pub fn rewrite<F>(
    expression: &str,
    anchor: CellAddress,
    target: CellAddress,
    mut resolver: F,
) -> Result<String>
where
    F: FnMut(&Reference<'_>, i64, i64) -> String,
{
    let segments: Vec<&str> = expression.split('"').collect();
    if segments.len() % 2 == 0 {
        return Err(MatchError::MalformedExpression(format!(
            "unbalanced quotes in '{}'",
            expression
        )));
    }

    let (d_col, d_row) = target.offset_from(&anchor);
    let mut out = String::with_capacity(expression.len());

    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('"');
        }
        if i % 2 == 1 {
            out.push_str(segment);
        } else {
            rewrite_segment(segment, &mut out, |r| resolver(r, d_col, d_row));
        }
    }

    log::trace!("rewrote '{}' as '{}'", expression, out);
    Ok(out)
}

/// Move every relative reference in `expression` by the distance from `from` to `to`
///
/// References shifted off the sheet become `#REF!`.
pub fn shift_references(expression: &str, from: CellAddress, to: CellAddress) -> Result<String> {
    rewrite(expression, from, to, |r, d_col, d_row| {
        r.shifted_text(d_col, d_row)
    })
}

/// Rewrite the references of one unquoted segment into `out`
fn rewrite_segment<F>(segment: &str, out: &mut String, mut resolve: F)
where
    F: FnMut(&Reference<'_>) -> String,
{
    let mut last = 0;

    for caps in REFERENCE.captures_iter(segment) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let Some(cell) = caps.name("cell") else {
            continue;
        };

        if !is_standalone(segment, whole.start(), whole.end()) {
            continue;
        }
        // Columns past XFD or rows past the sheet are names, not references
        let Ok(address) = CellAddress::parse(cell.as_str()) else {
            continue;
        };

        let reference = Reference {
            sheet: caps.name("sheet").map(|m| m.as_str()),
            address,
            text: whole.as_str(),
            range_endpoint: segment[..whole.start()].ends_with(':')
                || segment[whole.end()..].starts_with(':'),
        };

        out.push_str(&segment[last..whole.start()]);
        out.push_str(&resolve(&reference));
        last = whole.end();
    }

    out.push_str(&segment[last..]);
}

/// A match is a reference unless it is glued to a longer token: a name or `$` before it,
/// or a name character, `.`, `(` or `!` after it
fn is_standalone(segment: &str, start: usize, end: usize) -> bool {
    let before = segment[..start].chars().next_back();
    let after = segment[end..].chars().next();

    let glued_before = matches!(before, Some(c) if c.is_alphanumeric() || c == '_' || c == '$');
    let glued_after = matches!(
        after,
        Some(c) if c.is_alphanumeric() || c == '_' || c == '.' || c == '(' || c == '!'
    );
    !glued_before && !glued_after
}
