//! Spending categories and the income/expense split derived from them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("`{0}` is not a valid category (expected need, want, goal or income)")]
pub struct CategoryError(pub String);

/// Buckets every transaction falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Need,
    Want,
    Goal,
    Income,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Need,
        Category::Want,
        Category::Goal,
        Category::Income,
    ];

    /// Income is the only category that adds money.
    pub fn kind(self) -> TransactionKind {
        match self {
            Category::Income => TransactionKind::Income,
            Category::Need | Category::Want | Category::Goal => TransactionKind::Expense,
        }
    }

    /// Lowercase code used in rows and on the command line.
    pub fn code(self) -> &'static str {
        match self {
            Category::Need => "need",
            Category::Want => "want",
            Category::Goal => "goal",
            Category::Income => "income",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Need => "Need",
            Category::Want => "Want",
            Category::Goal => "Goal",
            Category::Income => "Income",
        };
        f.pad(label)
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "need" => Ok(Category::Need),
            "want" => Ok(Category::Want),
            "goal" => Ok(Category::Goal),
            "income" => Ok(Category::Income),
            _ => Err(CategoryError(value.to_string())),
        }
    }
}

/// Direction of money for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Applies the direction to an unsigned amount.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => f.pad("Income"),
            TransactionKind::Expense => f.pad("Expense"),
        }
    }
}
