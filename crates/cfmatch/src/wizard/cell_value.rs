//! Cell value comparisons
//!
//! Operands are typed: a text operand is always written as a quoted literal, so `"12"`
//! compares as text while `12` compares as a number. Formula operands are references or
//! calculations written against `A1`.

use cfmatch_core::cell::{format_number, quote_text};
use cfmatch_core::{CfOperator, CfRuleType, ConditionalFormatRule};

use super::{wrong_rule_type, RuleWizard, WizardBase};
use crate::error::{WizardError, WizardResult};

/// One side of a cell value comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f64),
    Text(String),
    Boolean(bool),
    /// Formula text relative to `A1` (`"B1*2"`, `"$Z$1"`, `"AVERAGE($A$1:$A$9)"`)
    Formula(String),
}

impl Operand {
    /// A formula operand; a leading `=` is dropped
    pub fn formula(text: impl Into<String>) -> Self {
        let text = text.into();
        Operand::Formula(text.strip_prefix('=').unwrap_or(&text).to_string())
    }

    /// Condition text for the stored rule
    fn to_condition(&self, base: &WizardBase) -> WizardResult<String> {
        Ok(match self {
            Operand::Number(n) => format_number(*n),
            Operand::Text(text) => quote_text(text),
            Operand::Boolean(true) => "TRUE".to_string(),
            Operand::Boolean(false) => "FALSE".to_string(),
            Operand::Formula(formula) => base.adjust(formula)?,
        })
    }

    /// Operand back from stored condition text
    fn from_condition(condition: &str, base: &WizardBase) -> WizardResult<Self> {
        let condition = condition.trim();
        let condition = condition.strip_prefix('=').unwrap_or(condition);

        if condition.len() >= 2 && condition.starts_with('"') && condition.ends_with('"') {
            let inner = &condition[1..condition.len() - 1];
            // Only a single literal; `"a"&"b"` is a formula
            if !inner.replace("\"\"", "").contains('"') {
                return Ok(Operand::Text(inner.replace("\"\"", "\"")));
            }
        }
        if condition.eq_ignore_ascii_case("TRUE") {
            return Ok(Operand::Boolean(true));
        }
        if condition.eq_ignore_ascii_case("FALSE") {
            return Ok(Operand::Boolean(false));
        }
        if let Ok(n) = condition.parse::<f64>() {
            if n.is_finite() {
                return Ok(Operand::Number(n));
            }
        }
        Ok(Operand::Formula(base.reverse_adjust(condition)?))
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Number(n)
    }
}

impl From<i32> for Operand {
    fn from(n: i32) -> Self {
        Operand::Number(n as f64)
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Boolean(b)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Text(s.to_string())
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::Text(s)
    }
}

/// Builds `cellIs` rules
#[derive(Debug, Clone, PartialEq)]
pub struct CellValueWizard {
    base: WizardBase,
    operator: Option<CfOperator>,
    operands: Vec<Operand>,
}

impl CellValueWizard {
    pub(super) fn with_base(base: WizardBase) -> Self {
        Self {
            base,
            operator: None,
            operands: Vec::new(),
        }
    }

    fn compare(mut self, operator: CfOperator, operand: impl Into<Operand>) -> Self {
        self.operator = Some(operator);
        self.operands = vec![operand.into()];
        self
    }

    fn range(mut self, operator: CfOperator, low: impl Into<Operand>, high: impl Into<Operand>) -> Self {
        self.operator = Some(operator);
        self.operands = vec![low.into(), high.into()];
        self
    }

    pub fn equals(self, operand: impl Into<Operand>) -> Self {
        self.compare(CfOperator::Equal, operand)
    }

    pub fn not_equals(self, operand: impl Into<Operand>) -> Self {
        self.compare(CfOperator::NotEqual, operand)
    }

    pub fn greater_than(self, operand: impl Into<Operand>) -> Self {
        self.compare(CfOperator::GreaterThan, operand)
    }

    pub fn greater_than_or_equal(self, operand: impl Into<Operand>) -> Self {
        self.compare(CfOperator::GreaterThanOrEqual, operand)
    }

    pub fn less_than(self, operand: impl Into<Operand>) -> Self {
        self.compare(CfOperator::LessThan, operand)
    }

    pub fn less_than_or_equal(self, operand: impl Into<Operand>) -> Self {
        self.compare(CfOperator::LessThanOrEqual, operand)
    }

    /// Inclusive range; the bounds may be given in either order
    pub fn between(self, low: impl Into<Operand>, high: impl Into<Operand>) -> Self {
        self.range(CfOperator::Between, low, high)
    }

    pub fn not_between(self, low: impl Into<Operand>, high: impl Into<Operand>) -> Self {
        self.range(CfOperator::NotBetween, low, high)
    }

    pub fn get_operator(&self) -> Option<CfOperator> {
        self.operator
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// Recover a wizard from a stored `cellIs` rule applied to `cell_range`
    pub fn from_conditional(rule: &ConditionalFormatRule, cell_range: &str) -> WizardResult<Self> {
        let CfRuleType::CellIs {
            operator,
            conditions,
        } = &rule.rule_type
        else {
            return Err(wrong_rule_type("a cell value", rule));
        };

        let mut base = WizardBase::new(cell_range)?;
        base.inherit(rule);
        let operands = conditions
            .iter()
            .map(|condition| Operand::from_condition(condition, &base))
            .collect::<WizardResult<Vec<_>>>()?;

        Ok(Self {
            base,
            operator: Some(*operator),
            operands,
        })
    }
}

impl RuleWizard for CellValueWizard {
    fn base(&self) -> &WizardBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WizardBase {
        &mut self.base
    }

    fn conditional(&self) -> WizardResult<ConditionalFormatRule> {
        let operator = self
            .operator
            .ok_or_else(|| WizardError::Incomplete("no comparison operator set".into()))?;
        let conditions = self
            .operands
            .iter()
            .map(|operand| operand.to_condition(&self.base))
            .collect::<WizardResult<Vec<_>>>()?;

        Ok(self.base.build(CfRuleType::CellIs {
            operator,
            conditions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::Wizard;
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell_is(rule: &ConditionalFormatRule) -> (CfOperator, Vec<String>) {
        match &rule.rule_type {
            CfRuleType::CellIs {
                operator,
                conditions,
            } => (*operator, conditions.clone()),
            other => panic!("not a cellIs rule: {:?}", other),
        }
    }

    #[test]
    fn test_typed_operands() {
        let wizard = Wizard::new("B2:B11").unwrap().cell_value();

        let rule = wizard.clone().equals(12).conditional().unwrap();
        assert_eq!(cell_is(&rule), (CfOperator::Equal, vec!["12".to_string()]));

        let rule = wizard.clone().equals("12").conditional().unwrap();
        assert_eq!(cell_is(&rule), (CfOperator::Equal, vec!["\"12\"".to_string()]));

        let rule = wizard.clone().not_equals(true).conditional().unwrap();
        assert_eq!(cell_is(&rule), (CfOperator::NotEqual, vec!["TRUE".to_string()]));

        let rule = wizard.less_than(r#"say "hi""#).conditional().unwrap();
        assert_eq!(
            cell_is(&rule),
            (CfOperator::LessThan, vec![r#""say ""hi""""#.to_string()])
        );
    }

    #[test]
    fn test_formula_operands_adjusted() {
        let rule = Wizard::new("B2:B11")
            .unwrap()
            .cell_value()
            .between(Operand::formula("A1"), Operand::formula("=$Z$1*2"))
            .conditional()
            .unwrap();
        assert_eq!(
            cell_is(&rule),
            (
                CfOperator::Between,
                vec!["B2".to_string(), "$Z$1*2".to_string()]
            )
        );
    }

    #[test]
    fn test_from_conditional() {
        let rule = ConditionalFormatRule::cell_is(
            CfOperator::NotBetween,
            ["C3+1", "\"a\"\"b\""],
        );
        let wizard = CellValueWizard::from_conditional(&rule, "C3:C9").unwrap();
        assert_eq!(wizard.get_operator(), Some(CfOperator::NotBetween));
        assert_eq!(
            wizard.operands(),
            &[
                Operand::Formula("A1+1".into()),
                Operand::Text("a\"b".into())
            ]
        );
        assert_eq!(wizard.conditional().unwrap().rule_type, rule.rule_type);

        let numbers = ConditionalFormatRule::cell_is_greater_than("2.5");
        let wizard = CellValueWizard::from_conditional(&numbers, "A1").unwrap();
        assert_eq!(wizard.operands(), &[Operand::Number(2.5)]);
    }

    #[test]
    fn test_concatenated_literals_are_formulas() {
        let rule = ConditionalFormatRule::cell_is_equal_to(r#""a"&"b""#);
        let wizard = CellValueWizard::from_conditional(&rule, "A1").unwrap();
        assert_eq!(wizard.operands(), &[Operand::Formula(r#""a"&"b""#.into())]);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            Wizard::new("A1").unwrap().cell_value().conditional(),
            Err(WizardError::Incomplete(_))
        ));
        assert!(matches!(
            CellValueWizard::from_conditional(&ConditionalFormatRule::unique_values(), "A1"),
            Err(WizardError::WrongRuleType {
                found: "uniqueValues",
                ..
            })
        ));
    }
}
