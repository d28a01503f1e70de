use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::errors::SpendError;
use crate::core::services::{find_owned, ServiceError, ServiceResult};
use crate::domain::{Category, Goal, NewGoal, TransactionInstance, UserId};
use crate::storage::{delete_record, fetch_records_lossy, insert_record, update_record, RowStore};

/// Goal after a contribution, with the expense recorded for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub goal: Goal,
    pub transaction: TransactionInstance,
}

pub struct GoalService;

impl GoalService {
    pub fn create(
        store: &dyn RowStore,
        clock: &dyn Clock,
        user: &UserId,
        input: NewGoal,
    ) -> ServiceResult<Goal> {
        let goal = Goal::from_input(user.clone(), input, clock.now())?;
        insert_record(store, &goal)?;
        tracing::info!(id = %goal.id, "created goal");
        Ok(goal)
    }

    /// Goals owned by `user`, newest first.
    pub fn list(store: &dyn RowStore, user: &UserId) -> ServiceResult<Vec<Goal>> {
        let mut goals = fetch_records_lossy::<Goal>(store, user)?.records;
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(goals)
    }

    /// Adds `amount` to the goal and records it as a goal-category expense.
    ///
    /// When the expense cannot be written the goal is put back to its previous amount.
    pub fn contribute(
        store: &dyn RowStore,
        clock: &dyn Clock,
        user: &UserId,
        goal_id: Uuid,
        amount: f64,
    ) -> ServiceResult<Contribution> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ServiceError::Invalid(
                "Contribution must be greater than zero".into(),
            ));
        }
        let before = find_owned::<Goal>(store, user, goal_id)?;
        let mut goal = before.clone();
        goal.contribute(amount)?;
        update_record(store, &goal)?;

        let transaction = TransactionInstance::new(
            user.clone(),
            amount,
            Category::Goal,
            format!("Contribution to {}", goal.name),
            clock.now(),
        );
        if let Err(err) = insert_record(store, &transaction) {
            tracing::warn!(
                goal = %goal.id,
                error = %err,
                "failed to record contribution; restoring goal"
            );
            if let Err(rollback) = update_record(store, &before) {
                tracing::warn!(goal = %goal.id, error = %rollback, "rollback failed");
                return Err(SpendError::StorageError(format!(
                    "{err}; rollback failed: {rollback}"
                ))
                .into());
            }
            return Err(err.into());
        }
        tracing::info!(goal = %goal.id, amount, progress = goal.progress_percentage(), "recorded goal contribution");
        Ok(Contribution { goal, transaction })
    }

    pub fn remove(store: &dyn RowStore, user: &UserId, id: Uuid) -> ServiceResult<Goal> {
        let goal = find_owned::<Goal>(store, user, id)?;
        delete_record::<Goal>(store, id)?;
        tracing::info!(%id, "removed goal");
        Ok(goal)
    }
}
