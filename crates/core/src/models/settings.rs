//! Store-wide operator settings.

use chrono::Weekday;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::{FieldError, Validate, require_non_negative};

/// Operator targets used by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Sales quota per weekday, Monday first.
    pub daily_goals: [Decimal; 7],
    /// Marketing budget for the current month, used for acquisition cost.
    pub monthly_marketing_spend: Decimal,
}

impl Settings {
    /// The sales quota for `weekday`.
    #[must_use]
    pub fn goal_for(&self, weekday: Weekday) -> Decimal {
        self.daily_goals
            .get(weekday.num_days_from_monday() as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Replace the quota for `weekday`.
    pub fn set_goal(&mut self, weekday: Weekday, goal: Decimal) {
        if let Some(slot) = self
            .daily_goals
            .get_mut(weekday.num_days_from_monday() as usize)
        {
            *slot = goal;
        }
    }
}

impl Validate for Settings {
    fn validate_into(&self, path: &str, errors: &mut Vec<FieldError>) {
        for (i, goal) in self.daily_goals.iter().enumerate() {
            require_non_negative(errors, path, &format!("dailyGoals[{i}]"), *goal);
        }
        require_non_negative(
            errors,
            path,
            "monthlyMarketingSpend",
            self.monthly_marketing_spend,
        );
    }
}
