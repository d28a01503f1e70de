pub mod goal_service;
pub mod insight_service;
pub mod recurring_service;
pub mod transaction_service;

pub use goal_service::{Contribution, GoalService};
pub use insight_service::{
    InsightReport, InsightService, MonthlyTotal, SpendingBreakdown, Timeframe,
};
pub use recurring_service::{ProcessReport, RecurringService};
pub use transaction_service::{TransactionFilter, TransactionService};

use uuid::Uuid;

use crate::core::errors::SpendError;
use crate::domain::UserId;
use crate::storage::{fetch_records_lossy, Record, RowStore};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] SpendError),
    #[error("{0}")]
    Invalid(String),
}

/// Loads the record `id` owned by `user`. Rows of other owners are reported as missing.
pub(crate) fn find_owned<R: Record>(
    store: &dyn RowStore,
    user: &UserId,
    id: Uuid,
) -> ServiceResult<R> {
    fetch_records_lossy::<R>(store, user)?
        .records
        .into_iter()
        .find(|record| record.id() == id && record.owner() == user)
        .ok_or_else(|| {
            SpendError::NotFound {
                collection: R::COLLECTION,
                id,
            }
            .into()
        })
}

#[cfg(test)]
mod tests;
