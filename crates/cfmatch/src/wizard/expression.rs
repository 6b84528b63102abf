use cfmatch_core::{CfRuleType, ConditionalFormatRule};

use super::{wrong_rule_type, RuleWizard, WizardBase};
use crate::error::{WizardError, WizardResult};

/// Builds `expression` rules from a formula written against `A1`
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionWizard {
    base: WizardBase,
    expression: Option<String>,
}

impl ExpressionWizard {
    pub(super) fn with_base(base: WizardBase) -> Self {
        Self {
            base,
            expression: None,
        }
    }

    /// Set the formula; a leading `=` is dropped
    pub fn expression(mut self, expression: impl Into<String>) -> Self {
        let expression = expression.into();
        let expression = expression.strip_prefix('=').unwrap_or(&expression).to_string();
        self.expression = Some(expression);
        self
    }

    /// Alias for [`expression`](Self::expression)
    pub fn formula(self, formula: impl Into<String>) -> Self {
        self.expression(formula)
    }

    /// The formula as authored (relative to `A1`)
    pub fn get_expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    /// Recover a wizard from a stored `expression` rule applied to `cell_range`
    pub fn from_conditional(rule: &ConditionalFormatRule, cell_range: &str) -> WizardResult<Self> {
        let CfRuleType::Expression { formula } = &rule.rule_type else {
            return Err(wrong_rule_type("an expression", rule));
        };

        let mut base = WizardBase::new(cell_range)?;
        base.inherit(rule);
        let expression = base.reverse_adjust(formula)?;
        Ok(Self {
            base,
            expression: Some(expression),
        })
    }
}

impl RuleWizard for ExpressionWizard {
    fn base(&self) -> &WizardBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WizardBase {
        &mut self.base
    }

    fn conditional(&self) -> WizardResult<ConditionalFormatRule> {
        let expression = self
            .expression
            .as_deref()
            .ok_or_else(|| WizardError::Incomplete("no expression set".into()))?;
        let formula = self.base.adjust(expression)?;
        Ok(self.base.build(CfRuleType::Expression { formula }))
    }
}
