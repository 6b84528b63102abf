//! Built-in Excel functions
//!
//! The set covers what conditional-formatting templates and typical user expressions
//! reach for: logic, type tests, text search, rounding, dates and `COUNTIF`.

pub mod criteria;
pub mod date;
pub mod info;
pub mod logical;
pub mod math;
pub mod statistical;
pub mod text;

use std::sync::OnceLock;

use ahash::AHashMap;

use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::FormulaValue;

/// Function implementation signature
///
/// Arguments arrive already evaluated, with their count checked against the definition.
/// The context carries the pinned `today` date and the current sheet.
pub type FunctionImpl = fn(&[FormulaValue], &EvaluationContext) -> FormulaResult<FormulaValue>;

/// A built-in function and the argument counts it accepts
#[derive(Debug, Clone, Copy)]
pub struct FunctionDef {
    pub name: &'static str,
    pub min_args: usize,
    /// `None` for variadic functions
    pub max_args: Option<usize>,
    pub implementation: FunctionImpl,
}

impl FunctionDef {
    const fn fixed(name: &'static str, args: usize, implementation: FunctionImpl) -> Self {
        Self::between(name, args, args, implementation)
    }

    const fn between(
        name: &'static str,
        min_args: usize,
        max_args: usize,
        implementation: FunctionImpl,
    ) -> Self {
        Self {
            name,
            min_args,
            max_args: Some(max_args),
            implementation,
        }
    }

    const fn variadic(name: &'static str, implementation: FunctionImpl) -> Self {
        Self {
            name,
            min_args: 1,
            max_args: None,
            implementation,
        }
    }

    /// Whether `count` arguments are acceptable
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }

    /// Human-readable argument count, for error messages
    pub fn arity(&self) -> String {
        match self.max_args {
            None => format!("at least {}", self.min_args),
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{} to {}", self.min_args, max),
        }
    }
}

const BUILTINS: &[FunctionDef] = &[
    // math
    FunctionDef::variadic("SUM", math::fn_sum),
    FunctionDef::variadic("AVERAGE", math::fn_average),
    FunctionDef::variadic("MIN", math::fn_min),
    FunctionDef::variadic("MAX", math::fn_max),
    FunctionDef::fixed("ABS", 1, math::fn_abs),
    FunctionDef::fixed("MOD", 2, math::fn_mod),
    FunctionDef::fixed("INT", 1, math::fn_int),
    FunctionDef::fixed("ROUND", 2, math::fn_round),
    FunctionDef::fixed("ROUNDDOWN", 2, math::fn_rounddown),
    FunctionDef::fixed("FLOOR", 2, math::fn_floor),
    // logical
    FunctionDef::between("IF", 2, 3, logical::fn_if),
    FunctionDef::variadic("AND", logical::fn_and),
    FunctionDef::variadic("OR", logical::fn_or),
    FunctionDef::fixed("NOT", 1, logical::fn_not),
    FunctionDef::fixed("IFERROR", 2, logical::fn_iferror),
    // text
    FunctionDef::fixed("LEN", 1, text::fn_len),
    FunctionDef::between("LEFT", 1, 2, text::fn_left),
    FunctionDef::between("RIGHT", 1, 2, text::fn_right),
    FunctionDef::fixed("MID", 3, text::fn_mid),
    FunctionDef::fixed("LOWER", 1, text::fn_lower),
    FunctionDef::fixed("UPPER", 1, text::fn_upper),
    FunctionDef::fixed("TRIM", 1, text::fn_trim),
    FunctionDef::between("FIND", 2, 3, text::fn_find),
    FunctionDef::between("SEARCH", 2, 3, text::fn_search),
    // information
    FunctionDef::fixed("ISBLANK", 1, info::fn_isblank),
    FunctionDef::fixed("ISNUMBER", 1, info::fn_isnumber),
    FunctionDef::fixed("ISTEXT", 1, info::fn_istext),
    FunctionDef::fixed("ISERROR", 1, info::fn_iserror),
    FunctionDef::fixed("ISODD", 1, info::fn_isodd),
    FunctionDef::fixed("ISEVEN", 1, info::fn_iseven),
    // date
    FunctionDef::fixed("DATE", 3, date::fn_date),
    FunctionDef::fixed("YEAR", 1, date::fn_year),
    FunctionDef::fixed("MONTH", 1, date::fn_month),
    FunctionDef::fixed("DAY", 1, date::fn_day),
    FunctionDef::between("WEEKDAY", 1, 2, date::fn_weekday),
    FunctionDef::fixed("EDATE", 2, date::fn_edate),
    FunctionDef::fixed("TODAY", 0, date::fn_today),
    // statistical
    FunctionDef::variadic("COUNT", statistical::fn_count),
    FunctionDef::variadic("COUNTA", statistical::fn_counta),
    FunctionDef::fixed("COUNTIF", 2, statistical::fn_countif),
];

/// Lookup table over the built-in functions
pub struct FunctionRegistry {
    functions: AHashMap<&'static str, FunctionDef>,
}

impl FunctionRegistry {
    /// The shared registry of built-ins
    pub fn global() -> &'static FunctionRegistry {
        static REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| FunctionRegistry {
            functions: BUILTINS.iter().map(|def| (def.name, *def)).collect(),
        })
    }

    /// Look up a function by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name.to_ascii_uppercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FunctionRegistry::global();
        assert!(registry.get("countif").is_some());
        assert!(registry.get("Search").is_some());
        assert!(registry.get("VLOOKUP").is_none());
        assert_eq!(registry.len(), BUILTINS.len());
    }

    #[test]
    fn test_template_functions_registered() {
        let registry = FunctionRegistry::global();
        for name in [
            "AND", "OR", "NOT", "ISERROR", "SEARCH", "LEFT", "RIGHT", "LEN", "TRIM", "FLOOR",
            "ROUNDDOWN", "TODAY", "WEEKDAY", "EDATE", "MONTH", "YEAR", "COUNTIF", "MIN", "MAX",
        ] {
            assert!(registry.get(name).is_some(), "{} missing", name);
        }
    }

    #[test]
    fn test_arity() {
        let registry = FunctionRegistry::global();
        let today = registry.get("TODAY").unwrap();
        assert!(today.accepts(0) && !today.accepts(1));
        assert_eq!(today.arity(), "0");

        let and = registry.get("AND").unwrap();
        assert!(!and.accepts(0) && and.accepts(30));
        assert_eq!(and.arity(), "at least 1");

        assert_eq!(registry.get("IF").unwrap().arity(), "2 to 3");
    }
}
