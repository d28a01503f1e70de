//! Domain entities owned by a user: transactions, recurring templates and goals.
//! No I/O here, only data types and their invariants.

pub mod category;
pub mod common;
pub mod goal;
pub mod recurring;
pub mod transaction;

pub use category::{Category, CategoryError, TransactionKind};
pub use common::{Identifiable, Owned, UserId};
pub use goal::{Goal, NewGoal, ProgressTier};
pub use recurring::{
    Frequency, FrequencyError, NewRecurringTemplate, RecurringTemplate, TemplateUpdate,
};
pub use transaction::{NewTransaction, TransactionInstance};
