use cfmatch_core::{CfRuleType, ConditionalFormatRule};

use super::{wrong_rule_type, RuleWizard, WizardBase};
use crate::error::WizardResult;

/// Builds `containsBlanks` / `notContainsBlanks` rules
///
/// A cell counts as blank when it is empty or holds only whitespace.
#[derive(Debug, Clone, PartialEq)]
pub struct BlanksWizard {
    base: WizardBase,
    inverse: bool,
}

impl BlanksWizard {
    pub(super) fn with_base(base: WizardBase) -> Self {
        Self {
            base,
            inverse: false,
        }
    }

    /// Match blank cells (the default)
    pub fn is_blank(mut self) -> Self {
        self.inverse = false;
        self
    }

    /// Match cells with content
    pub fn not_blank(mut self) -> Self {
        self.inverse = true;
        self
    }

    pub fn from_conditional(rule: &ConditionalFormatRule, cell_range: &str) -> WizardResult<Self> {
        let inverse = match rule.rule_type {
            CfRuleType::ContainsBlanks => false,
            CfRuleType::NotContainsBlanks => true,
            _ => return Err(wrong_rule_type("a blanks", rule)),
        };
        let mut base = WizardBase::new(cell_range)?;
        base.inherit(rule);
        Ok(Self { base, inverse })
    }
}

impl RuleWizard for BlanksWizard {
    fn base(&self) -> &WizardBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WizardBase {
        &mut self.base
    }

    fn conditional(&self) -> WizardResult<ConditionalFormatRule> {
        Ok(self.base.build(if self.inverse {
            CfRuleType::NotContainsBlanks
        } else {
            CfRuleType::ContainsBlanks
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::Wizard;
    use super::*;
    use crate::error::WizardError;

    #[test]
    fn test_blanks_round_trip() {
        let wizard = Wizard::new("A1:A9").unwrap().blanks();
        let blank = wizard.conditional().unwrap();
        assert_eq!(blank.rule_type, CfRuleType::ContainsBlanks);

        let not_blank = wizard.not_blank().conditional().unwrap();
        assert_eq!(not_blank.rule_type, CfRuleType::NotContainsBlanks);

        let recovered = BlanksWizard::from_conditional(&not_blank, "A1:A9").unwrap();
        assert_eq!(recovered.conditional().unwrap(), not_blank);
        assert!(matches!(
            BlanksWizard::from_conditional(&ConditionalFormatRule::contains_errors(), "A1"),
            Err(WizardError::WrongRuleType { .. })
        ));
    }
}
