use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Identifiable, Owned, TransactionKind, UserId};

/// A single concrete financial event. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInstance {
    pub id: Uuid,
    pub user_id: UserId,
    pub amount: f64,
    pub category: Category,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl TransactionInstance {
    /// Builds an instance with a fresh id; `kind` is derived from `category`.
    pub fn new(
        user_id: UserId,
        amount: f64,
        category: Category,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            category,
            kind: category.kind(),
            description: description.into(),
            created_at,
        }
    }

    /// Amount with its direction applied (income positive, expense negative).
    pub fn signed_amount(&self) -> f64 {
        self.kind.signed(self.amount)
    }
}

impl Identifiable for TransactionInstance {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for TransactionInstance {
    fn owner(&self) -> &UserId {
        &self.user_id
    }
}

/// User input for recording a transaction directly.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: f64,
    pub category: Category,
    pub description: Option<String>,
}

impl NewTransaction {
    pub fn new(amount: f64, category: Category) -> Self {
        Self {
            amount,
            category,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Description stored on the instance, falling back to a generated label.
    pub fn resolved_description(&self) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!("Quick {} transaction", self.category.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kind_follows_category() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let user = UserId::new("u1").unwrap();
        let salary = TransactionInstance::new(user.clone(), 3000.0, Category::Income, "Salary", at);
        let rent = TransactionInstance::new(user, 1200.0, Category::Need, "Rent", at);
        assert_eq!(salary.kind, TransactionKind::Income);
        assert_eq!(salary.signed_amount(), 3000.0);
        assert_eq!(rent.kind, TransactionKind::Expense);
        assert_eq!(rent.signed_amount(), -1200.0);
    }

    #[test]
    fn kind_is_stored_under_type_column() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let txn = TransactionInstance::new(UserId::new("u1").unwrap(), 5.0, Category::Want, "Tea", at);
        let row = serde_json::to_value(&txn).unwrap();
        assert_eq!(row["type"], "expense");
        assert_eq!(row["user_id"], "u1");
        assert_eq!(row["category"], "want");
    }

    #[test]
    fn blank_description_falls_back_to_generated_label() {
        let input = NewTransaction::new(20.0, Category::Want).with_description("   ");
        assert_eq!(input.resolved_description(), "Quick want transaction");
    }
}
