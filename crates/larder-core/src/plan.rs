//! Meal plan shapes and the week bookkeeping around stored plans.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Days kept from a generated plan.
pub const MAX_PLAN_DAYS: usize = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealEntry {
    pub meal: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One day of the plan. A meal the model left out deserializes as an empty entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealDay {
    pub day: String,
    #[serde(default)]
    pub breakfast: MealEntry,
    #[serde(default)]
    pub lunch: MealEntry,
    #[serde(default)]
    pub dinner: MealEntry,
    #[serde(default)]
    pub dessert: MealEntry,
}

/// A generated week of meals plus the groceries the model thinks are missing.
///
/// The default value (no days, no groceries) is also what a reply without a
/// usable plan degrades to, so an empty `days` list means "nothing usable
/// came back", not "the backend was never called".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlan {
    pub days: Vec<MealDay>,
    #[serde(default)]
    pub grocery_list: Vec<String>,
}

impl MealPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Drop days beyond [`MAX_PLAN_DAYS`]; returns how many were removed.
    pub fn truncate_to_week(&mut self) -> usize {
        let extra = self.days.len().saturating_sub(MAX_PLAN_DAYS);
        self.days.truncate(MAX_PLAN_DAYS);
        extra
    }
}

/// A plan as persisted by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanRecord {
    pub plan: MealPlan,
    pub generated_at: DateTime<Utc>,
    pub week_start: NaiveDate,
}

impl MealPlanRecord {
    #[must_use]
    pub fn new(plan: MealPlan, generated_at: DateTime<Utc>, today: NaiveDate) -> Self {
        Self {
            plan,
            generated_at,
            week_start: week_start(today),
        }
    }

    /// Stamp a freshly generated plan with the current time and local week.
    #[must_use]
    pub fn generated_now(plan: MealPlan) -> Self {
        Self::new(plan, Utc::now(), Local::now().date_naive())
    }
}

/// Monday of the week `today` falls in, counting weeks from Sunday.
///
/// Sunday therefore maps to the following Monday.
#[must_use]
pub fn week_start(today: NaiveDate) -> NaiveDate {
    let from_sunday = u64::from(today.weekday().num_days_from_sunday());
    today
        .checked_sub_days(Days::new(from_sunday))
        .and_then(|sunday| sunday.checked_add_days(Days::new(1)))
        .unwrap_or(today)
}

/// The most recently generated plan. Ties go to the later record.
#[must_use]
pub fn current_plan(records: &[MealPlanRecord]) -> Option<&MealPlanRecord> {
    records.iter().max_by_key(|r| r.generated_at)
}
