use cfmatch_core::{CfRuleType, ConditionalFormatRule};

use super::{wrong_rule_type, RuleWizard, WizardBase};
use crate::error::{WizardError, WizardResult};

/// How the cell text is searched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextOperator {
    Contains,
    NotContains,
    BeginsWith,
    EndsWith,
}

/// Builds case-insensitive text search rules
#[derive(Debug, Clone, PartialEq)]
pub struct TextValueWizard {
    base: WizardBase,
    operator: TextOperator,
    text: Option<String>,
}

impl TextValueWizard {
    pub(super) fn with_base(base: WizardBase) -> Self {
        Self {
            base,
            operator: TextOperator::Contains,
            text: None,
        }
    }

    fn set(mut self, operator: TextOperator, text: impl Into<String>) -> Self {
        self.operator = operator;
        self.text = Some(text.into());
        self
    }

    /// Cell text contains `text` anywhere
    pub fn contains(self, text: impl Into<String>) -> Self {
        self.set(TextOperator::Contains, text)
    }

    pub fn does_not_contain(self, text: impl Into<String>) -> Self {
        self.set(TextOperator::NotContains, text)
    }

    pub fn begins_with(self, text: impl Into<String>) -> Self {
        self.set(TextOperator::BeginsWith, text)
    }

    pub fn ends_with(self, text: impl Into<String>) -> Self {
        self.set(TextOperator::EndsWith, text)
    }

    /// The text searched for
    pub fn get_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn from_conditional(rule: &ConditionalFormatRule, cell_range: &str) -> WizardResult<Self> {
        let (operator, text) = match &rule.rule_type {
            CfRuleType::ContainsText { text } => (TextOperator::Contains, text),
            CfRuleType::NotContainsText { text } => (TextOperator::NotContains, text),
            CfRuleType::BeginsWith { text } => (TextOperator::BeginsWith, text),
            CfRuleType::EndsWith { text } => (TextOperator::EndsWith, text),
            _ => return Err(wrong_rule_type("a text value", rule)),
        };
        let mut base = WizardBase::new(cell_range)?;
        base.inherit(rule);
        Ok(Self {
            base,
            operator,
            text: Some(text.clone()),
        })
    }
}

impl RuleWizard for TextValueWizard {
    fn base(&self) -> &WizardBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WizardBase {
        &mut self.base
    }

    fn conditional(&self) -> WizardResult<ConditionalFormatRule> {
        let text = self
            .text
            .clone()
            .ok_or_else(|| WizardError::Incomplete("no search text set".into()))?;
        let rule_type = match self.operator {
            TextOperator::Contains => CfRuleType::ContainsText { text },
            TextOperator::NotContains => CfRuleType::NotContainsText { text },
            TextOperator::BeginsWith => CfRuleType::BeginsWith { text },
            TextOperator::EndsWith => CfRuleType::EndsWith { text },
        };
        Ok(self.base.build(rule_type))
    }
}
