//! Savings goals.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::ensure_positive_amount;
use super::{Identifiable, Owned, UserId};
use crate::core::errors::SpendError;

const DEFAULT_GOAL_TAG: &str = "savings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn from_input(
        user_id: UserId,
        input: NewGoal,
        now: DateTime<Utc>,
    ) -> Result<Self, SpendError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(SpendError::InvalidInput("goal name must not be empty".into()));
        }
        ensure_positive_amount(input.target_amount, "target amount")?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            target_amount: input.target_amount,
            current_amount: 0.0,
            deadline: input.deadline,
            category: input
                .category
                .filter(|tag| !tag.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GOAL_TAG.to_string()),
            created_at: now,
        })
    }

    /// Percentage of the target reached, rounded and capped at 100.
    pub fn progress_percentage(&self) -> u32 {
        if self.target_amount <= 0.0 {
            return 0;
        }
        let raw = (self.current_amount / self.target_amount * 100.0).round();
        raw.clamp(0.0, 100.0) as u32
    }

    pub fn progress_tier(&self) -> ProgressTier {
        ProgressTier::from_percentage(self.progress_percentage())
    }

    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }

    /// Adds a contribution to the accumulated amount.
    pub fn contribute(&mut self, amount: f64) -> Result<(), SpendError> {
        ensure_positive_amount(amount, "contribution")?;
        self.current_amount += amount;
        Ok(())
    }
}

impl Identifiable for Goal {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for Goal {
    fn owner(&self) -> &UserId {
        &self.user_id
    }
}

/// Coarse progress bands used when presenting goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressTier {
    Started,
    Halfway,
    OnTrack,
    Complete,
}

impl ProgressTier {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            100.. => ProgressTier::Complete,
            75..=99 => ProgressTier::OnTrack,
            50..=74 => ProgressTier::Halfway,
            _ => ProgressTier::Started,
        }
    }
}

impl fmt::Display for ProgressTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProgressTier::Started => "Started",
            ProgressTier::Halfway => "Halfway",
            ProgressTier::OnTrack => "On track",
            ProgressTier::Complete => "Complete",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: f64,
    pub deadline: Option<NaiveDate>,
    pub category: Option<String>,
}

impl NewGoal {
    pub fn new(name: impl Into<String>, target_amount: f64) -> Self {
        Self {
            name: name.into(),
            target_amount,
            deadline: None,
            category: None,
        }
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }
}
