use cfmatch_core::{CfRuleType, ConditionalFormatRule, TimePeriod};

use super::{wrong_rule_type, RuleWizard, WizardBase};
use crate::error::{WizardError, WizardResult};

/// Builds `timePeriod` rules: dates relative to today
#[derive(Debug, Clone, PartialEq)]
pub struct DateValueWizard {
    base: WizardBase,
    period: Option<TimePeriod>,
}

macro_rules! period_setters {
    ($($(#[$doc:meta])* $name:ident => $period:ident,)*) => {
        $(
            $(#[$doc])*
            pub fn $name(self) -> Self {
                self.period(TimePeriod::$period)
            }
        )*
    };
}

impl DateValueWizard {
    pub(super) fn with_base(base: WizardBase) -> Self {
        Self { base, period: None }
    }

    /// Match dates within `period`
    pub fn period(mut self, period: TimePeriod) -> Self {
        self.period = Some(period);
        self
    }

    period_setters! {
        yesterday => Yesterday,
        today => Today,
        tomorrow => Tomorrow,
        /// Today and the six days before it
        last_7_days => Last7Days,
        /// Sunday through Saturday of the current week
        this_week => ThisWeek,
        last_week => LastWeek,
        next_week => NextWeek,
        this_month => ThisMonth,
        last_month => LastMonth,
        next_month => NextMonth,
    }

    pub fn get_period(&self) -> Option<TimePeriod> {
        self.period
    }

    pub fn from_conditional(rule: &ConditionalFormatRule, cell_range: &str) -> WizardResult<Self> {
        let CfRuleType::TimePeriod { period } = rule.rule_type else {
            return Err(wrong_rule_type("a time period", rule));
        };
        let mut base = WizardBase::new(cell_range)?;
        base.inherit(rule);
        Ok(Self {
            base,
            period: Some(period),
        })
    }
}

impl RuleWizard for DateValueWizard {
    fn base(&self) -> &WizardBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WizardBase {
        &mut self.base
    }

    fn conditional(&self) -> WizardResult<ConditionalFormatRule> {
        let period = self
            .period
            .ok_or_else(|| WizardError::Incomplete("no time period set".into()))?;
        Ok(self.base.build(CfRuleType::TimePeriod { period }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::Wizard;
    use super::*;

    #[test]
    fn test_period_setters() {
        let wizard = Wizard::new("D1:D30").unwrap().date_value();
        assert!(matches!(
            wizard.conditional(),
            Err(WizardError::Incomplete(_))
        ));

        let cases = [
            (wizard.clone().yesterday(), TimePeriod::Yesterday),
            (wizard.clone().last_7_days(), TimePeriod::Last7Days),
            (wizard.clone().this_week(), TimePeriod::ThisWeek),
            (wizard.clone().next_month(), TimePeriod::NextMonth),
        ];
        for (wizard, period) in cases {
            assert_eq!(
                wizard.conditional().unwrap().rule_type,
                CfRuleType::TimePeriod { period }
            );
        }
    }

    #[test]
    fn test_from_conditional() {
        let rule = ConditionalFormatRule::time_period(TimePeriod::LastMonth);
        let wizard = DateValueWizard::from_conditional(&rule, "D1:D30").unwrap();
        assert_eq!(wizard.get_period(), Some(TimePeriod::LastMonth));
        assert!(DateValueWizard::from_conditional(&ConditionalFormatRule::expression("TRUE"), "D1").is_err());
    }
}
