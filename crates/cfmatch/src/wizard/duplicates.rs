use cfmatch_core::{CfRuleType, ConditionalFormatRule};

use super::{wrong_rule_type, RuleWizard, WizardBase};
use crate::error::WizardResult;

/// Builds duplicate / unique value rules
///
/// The rule is written as an expression counting the anchor's value over the whole range,
/// `COUNTIF($B$2:$B$11,B2)>1` for duplicates and `...=1` for unique values, so it can be
/// matched like any other expression.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicatesWizard {
    base: WizardBase,
    unique: bool,
}

impl DuplicatesWizard {
    pub(super) fn with_base(base: WizardBase) -> Self {
        Self {
            base,
            unique: false,
        }
    }

    /// Values appearing more than once (the default)
    pub fn duplicates(mut self) -> Self {
        self.unique = false;
        self
    }

    /// Values appearing exactly once
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    fn formula(&self, unique: bool) -> String {
        let range = self
            .base
            .ranges()
            .first()
            .map(|r| r.to_absolute_string())
            .unwrap_or_default();
        let test = if unique { "=1" } else { ">1" };
        format!("COUNTIF({},{}){}", range, self.base.anchor(), test)
    }

    /// Accepts stored `duplicateValues` / `uniqueValues` rules and expressions in the
    /// form this wizard writes for `cell_range`
    pub fn from_conditional(rule: &ConditionalFormatRule, cell_range: &str) -> WizardResult<Self> {
        let mut wizard = Self::with_base(WizardBase::new(cell_range)?);
        wizard.base.inherit(rule);

        wizard.unique = match &rule.rule_type {
            CfRuleType::DuplicateValues => false,
            CfRuleType::UniqueValues => true,
            CfRuleType::Expression { formula } if *formula == wizard.formula(false) => false,
            CfRuleType::Expression { formula } if *formula == wizard.formula(true) => true,
            _ => return Err(wrong_rule_type("a duplicates", rule)),
        };
        Ok(wizard)
    }
}

impl RuleWizard for DuplicatesWizard {
    fn base(&self) -> &WizardBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WizardBase {
        &mut self.base
    }

    fn conditional(&self) -> WizardResult<ConditionalFormatRule> {
        Ok(self.base.build(CfRuleType::Expression {
            formula: self.formula(self.unique),
        }))
    }
}
