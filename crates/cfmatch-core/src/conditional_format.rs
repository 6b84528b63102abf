//! Conditional formatting rules
//!
//! A [`ConditionalFormatRule`] pairs a [`CfRuleType`] with the ranges it covers. Condition
//! text inside a rule is written relative to the top-left cell of its first range (the
//! rule's anchor); matching it against other cells is the job of the `cfmatch` crate.
//!
//! ```rust
//! use cfmatch_core::{CellAddress, CellRange, ConditionalFormatRule};
//!
//! let rule = ConditionalFormatRule::cell_is_greater_than("100")
//!     .with_range(CellRange::parse("B2:B20").unwrap())
//!     .with_dxf_id(0);
//!
//! assert_eq!(rule.anchor(), Some(CellAddress::new(2, 2)));
//! assert!(rule.applies_to(&CellAddress::new(9, 2)));
//! ```

use crate::cell::{CellAddress, CellRange};

/// A rule plus where and how it applies
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionalFormatRule {
    pub rule_type: CfRuleType,
    pub ranges: Vec<CellRange>,
    /// Lower numbers are applied first
    pub priority: u32,
    /// Later rules are skipped for a cell this rule matches
    pub stop_if_true: bool,
    /// Differential format applied on a match
    pub dxf_id: Option<u32>,
}

impl ConditionalFormatRule {
    /// A rule of the given kind with no ranges, priority 1 and no style
    pub fn new(rule_type: CfRuleType) -> Self {
        Self {
            rule_type,
            ranges: Vec::new(),
            priority: 1,
            stop_if_true: false,
            dxf_id: None,
        }
    }

    /// Compare the cell value against one condition, or two for the range operators
    pub fn cell_is<I, S>(operator: CfOperator, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(CfRuleType::CellIs {
            operator,
            conditions: conditions.into_iter().map(Into::into).collect(),
        })
    }

    pub fn cell_is_greater_than(condition: impl Into<String>) -> Self {
        Self::cell_is(CfOperator::GreaterThan, [condition])
    }

    pub fn cell_is_less_than(condition: impl Into<String>) -> Self {
        Self::cell_is(CfOperator::LessThan, [condition])
    }

    pub fn cell_is_equal_to(condition: impl Into<String>) -> Self {
        Self::cell_is(CfOperator::Equal, [condition])
    }

    /// Inclusive, with the bounds in either order
    pub fn cell_is_between(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::cell_is(CfOperator::Between, [first.into(), second.into()])
    }

    pub fn cell_is_not_between(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::cell_is(CfOperator::NotBetween, [first.into(), second.into()])
    }

    /// Matches where `formula` is truthy
    pub fn expression(formula: impl Into<String>) -> Self {
        Self::new(CfRuleType::Expression {
            formula: formula.into(),
        })
    }

    pub fn contains_text(text: impl Into<String>) -> Self {
        Self::new(CfRuleType::ContainsText { text: text.into() })
    }

    pub fn not_contains_text(text: impl Into<String>) -> Self {
        Self::new(CfRuleType::NotContainsText { text: text.into() })
    }

    pub fn begins_with(text: impl Into<String>) -> Self {
        Self::new(CfRuleType::BeginsWith { text: text.into() })
    }

    pub fn ends_with(text: impl Into<String>) -> Self {
        Self::new(CfRuleType::EndsWith { text: text.into() })
    }

    pub fn contains_blanks() -> Self {
        Self::new(CfRuleType::ContainsBlanks)
    }

    pub fn not_contains_blanks() -> Self {
        Self::new(CfRuleType::NotContainsBlanks)
    }

    pub fn contains_errors() -> Self {
        Self::new(CfRuleType::ContainsErrors)
    }

    pub fn not_contains_errors() -> Self {
        Self::new(CfRuleType::NotContainsErrors)
    }

    /// Dates falling in `period`, counted from today
    pub fn time_period(period: TimePeriod) -> Self {
        Self::new(CfRuleType::TimePeriod { period })
    }

    pub fn duplicate_values() -> Self {
        Self::new(CfRuleType::DuplicateValues)
    }

    pub fn unique_values() -> Self {
        Self::new(CfRuleType::UniqueValues)
    }

    /// The `n` largest values
    pub fn top_n(n: u32) -> Self {
        Self::new(CfRuleType::Top10 {
            rank: n,
            percent: false,
            bottom: false,
        })
    }

    pub fn above_average() -> Self {
        Self::new(CfRuleType::AboveAverage {
            above: true,
            equal_average: false,
            std_dev: None,
        })
    }

    pub fn with_range(mut self, range: CellRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Replace every range
    pub fn with_ranges(mut self, ranges: Vec<CellRange>) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn with_dxf_id(mut self, dxf_id: u32) -> Self {
        self.dxf_id = Some(dxf_id);
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_stop_if_true(mut self, stop: bool) -> Self {
        self.stop_if_true = stop;
        self
    }

    /// Whether any of the rule's ranges covers `addr`
    pub fn applies_to(&self, addr: &CellAddress) -> bool {
        self.ranges.iter().any(|r| r.contains(addr))
    }

    /// Top-left cell of the first range, which condition text is written against
    pub fn anchor(&self) -> Option<CellAddress> {
        self.ranges.first().map(|r| r.start.to_relative())
    }
}

/// Kinds of conditional formatting rule
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CfRuleType {
    /// Comparison operators read the last condition; `Between`/`NotBetween` read two
    CellIs {
        operator: CfOperator,
        conditions: Vec<String>,
    },
    Expression {
        formula: String,
    },
    ContainsText {
        text: String,
    },
    NotContainsText {
        text: String,
    },
    BeginsWith {
        text: String,
    },
    EndsWith {
        text: String,
    },
    ContainsBlanks,
    NotContainsBlanks,
    ContainsErrors,
    NotContainsErrors,
    TimePeriod {
        period: TimePeriod,
    },
    /// Ranking rules are stored but never matched cell by cell
    Top10 {
        rank: u32,
        percent: bool,
        bottom: bool,
    },
    AboveAverage {
        above: bool,
        equal_average: bool,
        std_dev: Option<u32>,
    },
    DuplicateValues,
    UniqueValues,
}

impl CfRuleType {
    /// Name of the rule kind as stored in workbook files
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::CellIs { .. } => "cellIs",
            Self::Expression { .. } => "expression",
            Self::ContainsText { .. } => "containsText",
            Self::NotContainsText { .. } => "notContainsText",
            Self::BeginsWith { .. } => "beginsWith",
            Self::EndsWith { .. } => "endsWith",
            Self::ContainsBlanks => "containsBlanks",
            Self::NotContainsBlanks => "notContainsBlanks",
            Self::ContainsErrors => "containsErrors",
            Self::NotContainsErrors => "notContainsErrors",
            Self::TimePeriod { .. } => "timePeriod",
            Self::Top10 { .. } => "top10",
            Self::AboveAverage { .. } => "aboveAverage",
            Self::DuplicateValues => "duplicateValues",
            Self::UniqueValues => "uniqueValues",
        }
    }
}

/// Fieldless enum whose variants have a stored name, with `name`/`from_name` both ways
macro_rules! stored_names {
    ($(#[$meta:meta])* pub enum $ty:ident { $($(#[$vmeta:meta])* $variant:ident => $name:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $ty {
            $($(#[$vmeta])* $variant,)+
        }

        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant,)+];

            /// Name as stored in workbook files
            pub fn name(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }

            /// Inverse of [`name`](Self::name); exact spelling required
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.name() == name)
            }
        }
    };
}

stored_names! {
    /// Comparison of a `CellIs` rule
    pub enum CfOperator {
        Between => "between",
        NotBetween => "notBetween",
        Equal => "equal",
        NotEqual => "notEqual",
        GreaterThan => "greaterThan",
        LessThan => "lessThan",
        GreaterThanOrEqual => "greaterThanOrEqual",
        LessThanOrEqual => "lessThanOrEqual",
    }
}

impl CfOperator {
    /// Formula comparison symbol, or `None` for the range operators
    pub fn symbol(&self) -> Option<&'static str> {
        Some(match self {
            CfOperator::Equal => "=",
            CfOperator::NotEqual => "<>",
            CfOperator::GreaterThan => ">",
            CfOperator::LessThan => "<",
            CfOperator::GreaterThanOrEqual => ">=",
            CfOperator::LessThanOrEqual => "<=",
            CfOperator::Between | CfOperator::NotBetween => return None,
        })
    }

    /// Whether the operator takes a pair of bounds
    pub fn is_range(&self) -> bool {
        self.symbol().is_none()
    }
}

stored_names! {
    /// Window of dates a `TimePeriod` rule matches, relative to today
    pub enum TimePeriod {
        Today => "today",
        Yesterday => "yesterday",
        Tomorrow => "tomorrow",
        /// Today and the six days before it
        Last7Days => "last7Days",
        /// Sunday through Saturday
        ThisWeek => "thisWeek",
        LastWeek => "lastWeek",
        NextWeek => "nextWeek",
        ThisMonth => "thisMonth",
        LastMonth => "lastMonth",
        NextMonth => "nextMonth",
    }
}
