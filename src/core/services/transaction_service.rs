//! Business logic helpers for recording and querying transactions.

use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::services::{find_owned, ServiceError, ServiceResult};
use crate::domain::{Category, NewTransaction, TransactionInstance, TransactionKind, UserId};
use crate::storage::{delete_record, fetch_records_lossy, insert_record, RowStore};

/// Optional narrowing applied to a transaction listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
}

impl TransactionFilter {
    pub fn matches(&self, txn: &TransactionInstance) -> bool {
        if let Some(category) = self.category {
            if txn.category != category {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let needle = term.to_lowercase();
                txn.description.to_lowercase().contains(&needle)
                    || txn.amount.to_string().contains(&needle)
            }
        }
    }
}

/// Provides validated CRUD helpers for transaction instances.
pub struct TransactionService;

impl TransactionService {
    /// Validates and persists a directly entered transaction.
    pub fn record(
        store: &dyn RowStore,
        clock: &dyn Clock,
        user: &UserId,
        input: NewTransaction,
    ) -> ServiceResult<TransactionInstance> {
        if !input.amount.is_finite() || input.amount <= 0.0 {
            return Err(ServiceError::Invalid(
                "Amount must be greater than zero".into(),
            ));
        }
        let description = input.resolved_description();
        let txn = TransactionInstance::new(
            user.clone(),
            input.amount,
            input.category,
            description,
            clock.now(),
        );
        insert_record(store, &txn)?;
        tracing::info!(id = %txn.id, category = %txn.category, "recorded transaction");
        Ok(txn)
    }

    /// Transactions owned by `user`, newest first.
    pub fn list(store: &dyn RowStore, user: &UserId) -> ServiceResult<Vec<TransactionInstance>> {
        let mut rows = fetch_records_lossy::<TransactionInstance>(store, user)?.records;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub fn filter<'a>(
        rows: &'a [TransactionInstance],
        filter: &TransactionFilter,
    ) -> Vec<&'a TransactionInstance> {
        rows.iter().filter(|txn| filter.matches(txn)).collect()
    }

    /// Income minus expenses.
    pub fn net_total<'a, I>(rows: I) -> f64
    where
        I: IntoIterator<Item = &'a TransactionInstance>,
    {
        rows.into_iter()
            .map(|txn| match txn.kind {
                TransactionKind::Income => txn.amount,
                TransactionKind::Expense => -txn.amount,
            })
            .sum()
    }

    /// Removes the transaction identified by `id`, returning the removed instance.
    pub fn remove(
        store: &dyn RowStore,
        user: &UserId,
        id: Uuid,
    ) -> ServiceResult<TransactionInstance> {
        let txn = find_owned::<TransactionInstance>(store, user, id)?;
        delete_record::<TransactionInstance>(store, id)?;
        tracing::info!(%id, "removed transaction");
        Ok(txn)
    }
}
