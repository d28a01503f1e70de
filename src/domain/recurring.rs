//! Recurring transaction templates and the cadence they repeat on.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::common::ensure_positive_amount;
use super::{Category, Identifiable, Owned, TransactionKind, UserId};
use crate::core::errors::SpendError;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("`{0}` is not a valid frequency (expected daily, weekly, monthly or yearly)")]
pub struct FrequencyError(pub String);

/// How often a recurring template produces a new transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    /// Approximated as a fixed 30 days, not a calendar month.
    Monthly,
    /// Approximated as a fixed 365 days, leap years ignored.
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];

    /// Whole days that must pass after the last materialization before the next one is due.
    pub fn threshold_days(self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 30,
            Frequency::Yearly => 365,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        };
        f.pad(label)
    }
}

impl FromStr for Frequency {
    type Err = FrequencyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(FrequencyError(value.to_string())),
        }
    }
}

/// A user's intent to periodically generate a transaction.
///
/// Instances produced from a template hold no reference back to it. The only scheduling state
/// kept here is `last_processed`, advanced once per materialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTemplate {
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub amount: f64,
    pub category: Category,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub last_processed: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringTemplate {
    /// Creates an active, never-processed template from validated input.
    pub fn from_input(
        user_id: UserId,
        input: NewRecurringTemplate,
        now: DateTime<Utc>,
    ) -> Result<Self, SpendError> {
        input.validate()?;
        let description = input.resolved_description();
        let template = Self {
            id: Uuid::new_v4(),
            user_id,
            name: input.name.trim().to_string(),
            amount: input.amount,
            category: input.category,
            kind: input.category.kind(),
            frequency: input.frequency,
            start_date: input.start_date,
            last_processed: None,
            end_date: input.end_date,
            is_active: true,
            description,
            created_at: now,
            updated_at: now,
        };
        Ok(template)
    }

    /// Checks the invariants a persisted template must hold.
    pub fn validate(&self) -> Result<(), SpendError> {
        if self.name.trim().is_empty() {
            return Err(SpendError::InvalidInput(
                "recurring transaction name must not be empty".into(),
            ));
        }
        ensure_positive_amount(self.amount, "amount")?;
        if self.kind != self.category.kind() {
            return Err(SpendError::InvalidInput(format!(
                "kind {} does not match category {}",
                self.kind, self.category
            )));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(SpendError::InvalidInput(format!(
                    "end date {end} is before the start date {}",
                    self.start_date
                )));
            }
        }
        if let Some(last) = self.last_processed {
            if last < self.start_date {
                return Err(SpendError::InvalidInput(format!(
                    "last processed date {last} is before the start date {}",
                    self.start_date
                )));
            }
        }
        Ok(())
    }

    /// Applies the fields set on `update`, re-deriving `kind` from the category.
    pub fn apply(&mut self, update: TemplateUpdate, now: DateTime<Utc>) -> Result<(), SpendError> {
        let mut next = self.clone();
        if let Some(name) = update.name {
            next.name = name.trim().to_string();
        }
        if let Some(amount) = update.amount {
            next.amount = amount;
        }
        if let Some(category) = update.category {
            next.category = category;
            next.kind = category.kind();
        }
        if let Some(frequency) = update.frequency {
            next.frequency = frequency;
        }
        if let Some(start_date) = update.start_date {
            next.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            next.end_date = end_date;
        }
        if let Some(description) = update.description {
            next.description = description;
        }
        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }
}

impl Identifiable for RecurringTemplate {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for RecurringTemplate {
    fn owner(&self) -> &UserId {
        &self.user_id
    }
}

/// User input for defining a new recurring template.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurringTemplate {
    pub name: String,
    pub amount: f64,
    pub category: Category,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl NewRecurringTemplate {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        category: Category,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            category,
            frequency,
            start_date,
            end_date: None,
            description: None,
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn validate(&self) -> Result<(), SpendError> {
        if self.name.trim().is_empty() {
            return Err(SpendError::InvalidInput(
                "recurring transaction name must not be empty".into(),
            ));
        }
        ensure_positive_amount(self.amount, "amount")?;
        match self.end_date {
            Some(end) if end < self.start_date => Err(SpendError::InvalidInput(format!(
                "end date {end} is before the start date {}",
                self.start_date
            ))),
            _ => Ok(()),
        }
    }

    fn resolved_description(&self) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!("Recurring {}", self.category.code()),
        }
    }
}

/// Partial edit of a template. `end_date: Some(None)` clears the cutoff.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub description: Option<String>,
}

impl TemplateUpdate {
    pub fn is_empty(&self) -> bool {
        *self == TemplateUpdate::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap()
    }

    fn rent() -> RecurringTemplate {
        let input =
            NewRecurringTemplate::new("Rent", 1500.0, Category::Need, Frequency::Monthly, date(2025, 1, 1));
        RecurringTemplate::from_input(UserId::new("u1").unwrap(), input, now()).unwrap()
    }

    #[test]
    fn thresholds_match_cadence() {
        let days: Vec<i64> = Frequency::ALL.iter().map(|f| f.threshold_days()).collect();
        assert_eq!(days, vec![1, 7, 30, 365]);
    }

    #[test]
    fn unknown_frequency_fails_to_parse() {
        assert_eq!(
            "fortnightly".parse::<Frequency>(),
            Err(FrequencyError("fortnightly".into()))
        );
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
    }

    #[test]
    fn unknown_frequency_row_does_not_decode() {
        let mut row = serde_json::to_value(rent()).unwrap();
        row["frequency"] = serde_json::json!("quarterly");
        assert!(serde_json::from_value::<RecurringTemplate>(row).is_err());
    }

    #[test]
    fn new_template_is_active_and_unprocessed() {
        let template = rent();
        assert!(template.is_active);
        assert_eq!(template.last_processed, None);
        assert_eq!(template.kind, TransactionKind::Expense);
        assert_eq!(template.description, "Recurring need");
    }

    #[test]
    fn end_date_before_start_is_rejected() {
        let input = NewRecurringTemplate::new(
            "Gym",
            40.0,
            Category::Want,
            Frequency::Monthly,
            date(2025, 2, 1),
        )
        .with_end_date(date(2025, 1, 1));
        let err = RecurringTemplate::from_input(UserId::new("u1").unwrap(), input, now())
            .expect_err("end date must follow start date");
        assert!(matches!(err, SpendError::InvalidInput(_)));
    }

    #[test]
    fn changing_category_rederives_kind() {
        let mut template = rent();
        let later = now() + chrono::Duration::days(1);
        template
            .apply(
                TemplateUpdate {
                    category: Some(Category::Income),
                    ..TemplateUpdate::default()
                },
                later,
            )
            .unwrap();
        assert_eq!(template.kind, TransactionKind::Income);
        assert_eq!(template.updated_at, later);
    }

    #[test]
    fn rejected_update_leaves_template_untouched() {
        let mut template = rent();
        let before = template.clone();
        let result = template.apply(
            TemplateUpdate {
                amount: Some(-10.0),
                name: Some("Changed".into()),
                ..TemplateUpdate::default()
            },
            now(),
        );
        assert!(result.is_err());
        assert_eq!(template, before);
    }
}
