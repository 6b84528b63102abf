use cfmatch_core::{CfRuleType, ConditionalFormatRule};

use super::{wrong_rule_type, RuleWizard, WizardBase};
use crate::error::WizardResult;

/// Builds `containsErrors` / `notContainsErrors` rules
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorsWizard {
    base: WizardBase,
    inverse: bool,
}

impl ErrorsWizard {
    pub(super) fn with_base(base: WizardBase) -> Self {
        Self {
            base,
            inverse: false,
        }
    }

    /// Match cells holding an error value (the default)
    pub fn is_error(mut self) -> Self {
        self.inverse = false;
        self
    }

    pub fn not_error(mut self) -> Self {
        self.inverse = true;
        self
    }

    pub fn from_conditional(rule: &ConditionalFormatRule, cell_range: &str) -> WizardResult<Self> {
        let inverse = match rule.rule_type {
            CfRuleType::ContainsErrors => false,
            CfRuleType::NotContainsErrors => true,
            _ => return Err(wrong_rule_type("an errors", rule)),
        };
        let mut base = WizardBase::new(cell_range)?;
        base.inherit(rule);
        Ok(Self { base, inverse })
    }
}

impl RuleWizard for ErrorsWizard {
    fn base(&self) -> &WizardBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WizardBase {
        &mut self.base
    }

    fn conditional(&self) -> WizardResult<ConditionalFormatRule> {
        Ok(self.base.build(if self.inverse {
            CfRuleType::NotContainsErrors
        } else {
            CfRuleType::ContainsErrors
        }))
    }
}
