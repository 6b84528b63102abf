//! Tests for matching conditional-formatting rules against workbook cells

use cfmatch::prelude::*;
use cfmatch::FormulaResult;
use cfmatch_formula::functions::date::date_to_serial;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

/// B2:B11 holds the first ten Fibonacci numbers, D1:D3 some text
fn fib_workbook() -> Workbook {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet
        .fill_column("B2", [0, 1, 1, 2, 3, 5, 8, 13, 21, 34])
        .unwrap();
    sheet
        .fill_column("D1", ["Apple pie", "  ", "Banana"])
        .unwrap();
    sheet.set_cell_formula("D4", "=1/0").unwrap();
    wb
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn engine(wb: &Workbook) -> Calculation<'_> {
    Calculation::with_options(
        wb,
        CalculationOptions {
            today: Some(today()),
            ..Default::default()
        },
    )
}

fn range(text: &str) -> CellRange {
    CellRange::parse(text).unwrap()
}

fn cells(list: &[&str]) -> Vec<CellAddress> {
    list.iter().map(|c| CellAddress::parse(c).unwrap()).collect()
}

/// Cells of `target` matching `rule`, with the rule anchored on `conditional_range`
fn matching(wb: &Workbook, rule: &ConditionalFormatRule, conditional_range: &str, target: &str) -> Vec<CellAddress> {
    let matcher = RangeMatcher::new(wb, 0, conditional_range).unwrap();
    matcher.matching_cells(rule, &range(target), &mut engine(wb))
}

#[test]
fn test_relative_reference_follows_cell() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("C5", 7).unwrap();
    sheet.set_cell_value("D6", 7).unwrap();

    // Anchored at A1, evaluated at C5: A1 -> C5 and B2 -> D6
    let rule = ConditionalFormatRule::expression("A1=B2");
    let matcher = CellMatcher::new(&wb, 0, "C5", "A1:E9").unwrap();
    assert!(matcher.evaluate_conditional(&rule, &mut engine(&wb)));

    let locked = ConditionalFormatRule::expression("$A$1=B2");
    assert!(!matcher.evaluate_conditional(&locked, &mut engine(&wb)));
}

#[test]
fn test_quoted_text_is_not_a_reference() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("B2", "A1 is not a ref").unwrap();

    let rule = ConditionalFormatRule::expression(r#"A1="A1 is not a ref""#);
    let matcher = CellMatcher::new(&wb, 0, "B2", "A1:B2").unwrap();
    assert!(matcher.evaluate_conditional(&rule, &mut engine(&wb)));
}

#[test]
fn test_cell_is_comparisons() {
    let wb = fib_workbook();

    let greater = ConditionalFormatRule::cell_is_greater_than("10");
    assert_eq!(
        matching(&wb, &greater, "B2:B11", "B2:B11"),
        cells(&["B9", "B10", "B11"])
    );

    // At least twice the cell above; the reference moves with the target
    let growing = ConditionalFormatRule::cell_is(CfOperator::GreaterThanOrEqual, ["B2*2"]);
    assert_eq!(
        matching(&wb, &growing, "B3:B11", "B3:B11"),
        cells(&["B3", "B5"])
    );

    // Text values are compared as text
    let text = ConditionalFormatRule::cell_is_equal_to("\"banana\"");
    assert_eq!(matching(&wb, &text, "D1:D3", "D1:D3"), cells(&["D3"]));
}

#[test]
fn test_between_bounds_in_either_order() {
    let wb = fib_workbook();
    let low_high = ConditionalFormatRule::cell_is_between("3", "10");
    let high_low = ConditionalFormatRule::cell_is_between("10", "3");

    let expected = cells(&["B6", "B7", "B8"]);
    assert_eq!(matching(&wb, &low_high, "B2:B11", "B2:B11"), expected);
    assert_eq!(matching(&wb, &high_low, "B2:B11", "B2:B11"), expected);

    let outside = ConditionalFormatRule::cell_is_not_between("10", "3");
    assert_eq!(matching(&wb, &outside, "B2:B11", "B2:B11").len(), 7);

    // Bounds read from cells are ordered when evaluated
    let mut wb = fib_workbook();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("F1", 10).unwrap();
    sheet.set_cell_value("F2", 3).unwrap();
    let from_cells = ConditionalFormatRule::cell_is_between("$F$1", "$F$2");
    assert_eq!(matching(&wb, &from_cells, "B2:B11", "B2:B11"), expected);
}

#[test]
fn test_between_equal_bounds() {
    let mut wb = Workbook::new();
    wb.worksheet_mut(0).unwrap().fill_column("A1", [5, 4]).unwrap();

    let only_five = ConditionalFormatRule::cell_is_between("5", "5");
    assert_eq!(matching(&wb, &only_five, "A1:A2", "A1:A2"), cells(&["A1"]));

    let not_five = ConditionalFormatRule::cell_is_not_between("5", "5");
    assert_eq!(matching(&wb, &not_five, "A1:A2", "A1:A2"), cells(&["A2"]));
}

#[test]
fn test_expression_with_range_through_anchor() {
    let mut wb = Workbook::new();
    wb.worksheet_mut(0).unwrap().fill_column("A1", [5, 1, 1]).unwrap();

    // The anchor inside a range is a range endpoint, not the cell's value
    let rule = ConditionalFormatRule::expression("A1>AVERAGE(A1:A3)");
    assert_eq!(matching(&wb, &rule, "A1:A3", "A1:A3"), cells(&["A1"]));

    let matcher = CellMatcher::new(&wb, 0, "A1", "A1:A3").unwrap();
    assert!(matcher.evaluate_conditional(&rule, &mut engine(&wb)));
}

#[test]
fn test_duplicates_and_unique() {
    let wb = fib_workbook();
    let wizard = Wizard::new("$B$2:$B$11").unwrap().duplicates();

    let duplicates = wizard.conditional().unwrap();
    assert_eq!(
        matching(&wb, &duplicates, "$B$2:$B$11", "B2:B11"),
        cells(&["B3", "B4"])
    );

    let unique = wizard.unique().conditional().unwrap();
    assert_eq!(
        matching(&wb, &unique, "$B$2:$B$11", "B2:B11"),
        cells(&["B2", "B5", "B6", "B7", "B8", "B9", "B10", "B11"])
    );
}

#[test]
fn test_expression_wizard_over_block() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    for (col, start) in [("A", 1), ("B", 11), ("C", 21)] {
        sheet
            .fill_column(&format!("{}2", col), start..start + 10)
            .unwrap();
    }

    let rule = Wizard::new("A2:C11")
        .unwrap()
        .expression()
        .expression("ISODD(A1)")
        .conditional()
        .unwrap();

    // A4 holds 3, A5 holds 4
    let matcher = RangeMatcher::new(&wb, 0, "A2:C11").unwrap();
    let value = CellValue::Number(3.0);
    assert_eq!(
        cfmatch::compile(&rule, matcher.anchor(), CellAddress::new(4, 1), &value).unwrap(),
        "ISODD(3)"
    );

    let mut engine = engine(&wb);
    assert!(matcher.matches(&rule, CellAddress::new(4, 1), &mut engine));
    assert!(!matcher.matches(&rule, CellAddress::new(5, 1), &mut engine));
    assert_eq!(matcher.matching_cells(&rule, &range("A2:C11"), &mut engine).len(), 15);
}

#[test]
fn test_text_rules() {
    let wb = fib_workbook();
    let check = |rule: ConditionalFormatRule| matching(&wb, &rule, "D1:D3", "D1:D3");

    assert_eq!(check(ConditionalFormatRule::contains_text("PIE")), cells(&["D1"]));
    assert_eq!(
        check(ConditionalFormatRule::not_contains_text("an")),
        cells(&["D1", "D2"])
    );
    assert_eq!(check(ConditionalFormatRule::begins_with("app")), cells(&["D1"]));
    assert_eq!(check(ConditionalFormatRule::ends_with("NANA")), cells(&["D3"]));
}

#[test]
fn test_blanks_and_errors() {
    let wb = fib_workbook();

    // Whitespace-only and empty cells are blank
    assert_eq!(
        matching(&wb, &ConditionalFormatRule::contains_blanks(), "D1:D5", "D1:D5"),
        cells(&["D2", "D5"])
    );
    assert_eq!(
        matching(&wb, &ConditionalFormatRule::contains_errors(), "D1:D5", "D1:D5"),
        cells(&["D4"])
    );
    assert_eq!(
        matching(&wb, &ConditionalFormatRule::not_contains_errors(), "D1:D5", "D1:D5").len(),
        4
    );
}

#[test]
fn test_time_periods() {
    let dates = [
        (2024, 3, 2),
        (2024, 3, 3),
        (2024, 3, 9),
        (2024, 3, 10),
        (2024, 3, 14),
        (2024, 3, 15),
        (2024, 3, 16),
        (2024, 3, 17),
        (2024, 3, 23),
        (2024, 3, 24),
        (2024, 2, 29),
        (2024, 4, 1),
    ];
    let mut wb = Workbook::new();
    let serials = dates.iter().map(|&(y, m, d)| {
        date_to_serial(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    });
    wb.worksheet_mut(0).unwrap().fill_column("D1", serials).unwrap();
    // Today, in the afternoon
    wb.worksheet_mut(0)
        .unwrap()
        .set_cell_value("D6", date_to_serial(today()) + 0.75)
        .unwrap();

    let cases = [
        (TimePeriod::Yesterday, vec!["D5"]),
        (TimePeriod::Today, vec!["D6"]),
        (TimePeriod::Tomorrow, vec!["D7"]),
        (TimePeriod::Last7Days, vec!["D3", "D4", "D5", "D6"]),
        (TimePeriod::ThisWeek, vec!["D4", "D5", "D6", "D7"]),
        (TimePeriod::LastWeek, vec!["D2", "D3"]),
        (TimePeriod::NextWeek, vec!["D8", "D9"]),
        (
            TimePeriod::ThisMonth,
            vec!["D1", "D2", "D3", "D4", "D5", "D6", "D7", "D8", "D9", "D10"],
        ),
        (TimePeriod::LastMonth, vec!["D11"]),
        (TimePeriod::NextMonth, vec!["D12"]),
    ];
    for (period, expected) in cases {
        let rule = ConditionalFormatRule::time_period(period);
        assert_eq!(
            matching(&wb, &rule, "D1:D12", "D1:D12"),
            cells(&expected),
            "{}",
            period.name()
        );
    }
}

/// Records every call, delegating to a real engine
struct SpyEngine<'wb> {
    inner: Calculation<'wb>,
    calls: Vec<String>,
}

impl FormulaEngine for SpyEngine<'_> {
    fn flush(&mut self) {
        self.calls.push("flush".into());
        self.inner.flush();
    }

    fn calculate(&mut self, formula: &str, sheet: usize) -> FormulaResult<FormulaValue> {
        self.calls.push(formula.to_string());
        self.inner.calculate(formula, sheet)
    }

    fn cell_value(&mut self, sheet: usize, addr: CellAddress) -> FormulaValue {
        self.inner.cell_value(sheet, addr)
    }
}

#[test]
fn test_each_match_starts_from_flushed_engine() {
    let mut wb = fib_workbook();
    wb.worksheet_mut(0)
        .unwrap()
        .set_cell_formula("C2", "=SUM(B2:B11)")
        .unwrap();

    let rule_a = ConditionalFormatRule::expression("C2>80");
    let rule_b = ConditionalFormatRule::expression("$C$2=B2+88");
    let matcher = CellMatcher::new(&wb, 0, "B2", "B2:B11").unwrap();

    let mut alone = SpyEngine {
        inner: engine(&wb),
        calls: Vec::new(),
    };
    let b_alone = matcher.evaluate_conditional(&rule_b, &mut alone);

    let mut shared = SpyEngine {
        inner: engine(&wb),
        calls: Vec::new(),
    };
    let mut shared_results = Vec::new();
    for rule in [&rule_a, &rule_b] {
        shared_results.push(matcher.evaluate_conditional(rule, &mut shared));
    }

    assert!(b_alone);
    assert_eq!(shared_results, vec![true, b_alone]);
    assert_eq!(
        shared.calls,
        vec!["flush", "=C2>80", "flush", "=$C$2=0+88"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_unsupported_rules_never_match() {
    let wb = fib_workbook();
    let rules = [
        ConditionalFormatRule::top_n(3),
        ConditionalFormatRule::above_average(),
        ConditionalFormatRule::duplicate_values(),
        ConditionalFormatRule::unique_values(),
        ConditionalFormatRule::cell_is(CfOperator::Between, ["1", "2", "3"]),
        ConditionalFormatRule::cell_is(CfOperator::GreaterThan, Vec::<String>::new()),
        ConditionalFormatRule::cell_is_between("\"a\"", "\"z\""),
    ];
    for rule in &rules {
        assert_eq!(
            matching(&wb, rule, "B2:B11", "B2:D11"),
            Vec::<CellAddress>::new(),
            "{:?}",
            rule.rule_type
        );
    }
}

#[test]
fn test_invalid_formulas_never_match() {
    let wb = fib_workbook();
    let rules = [
        ConditionalFormatRule::expression("NOSUCHFUNCTION(B2)"),
        ConditionalFormatRule::expression("AND("),
        ConditionalFormatRule::expression("B2=\"open"),
        ConditionalFormatRule::expression("B2/0"),
        ConditionalFormatRule::cell_is_greater_than("NOSUCHFUNCTION(1)"),
        // Out-of-range DATE arguments are #NUM!
        ConditionalFormatRule::expression("DATE(2024,-1E300,1)>0"),
        ConditionalFormatRule::expression("DATE(2024,1,-1E300)>0"),
    ];
    for rule in &rules {
        assert_eq!(
            matching(&wb, rule, "B2:B11", "B2:B11"),
            Vec::<CellAddress>::new(),
            "{:?}",
            rule.rule_type
        );
    }
}

#[test]
fn test_rules_attached_to_worksheet() {
    let mut wb = fib_workbook();
    let rule = Wizard::new("B2:B11")
        .unwrap()
        .cell_value()
        .less_than(2)
        .with_dxf_id(1)
        .conditional()
        .unwrap();
    wb.worksheet_mut(0).unwrap().add_conditional_format(rule);

    let sheet = wb.worksheet(0).unwrap();
    let mut engine = engine(&wb);
    let target = CellAddress::new(3, 2);
    let applied: Vec<_> = sheet
        .conditional_formats_at(&target)
        .into_iter()
        .filter(|rule| {
            let anchor = rule.anchor().unwrap();
            let matcher = RangeMatcher::new(&wb, 0, &anchor.to_a1_string()).unwrap();
            matcher.matches(rule, target, &mut engine)
        })
        .filter_map(|rule| rule.dxf_id)
        .collect();
    assert_eq!(applied, vec![1]);
}
