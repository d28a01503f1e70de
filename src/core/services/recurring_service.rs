//! Recurring template management and materialization of due templates.

use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::recurrence::{materialize, select_due, Materialized};
use crate::core::services::{find_owned, ServiceResult};
use crate::domain::{
    NewRecurringTemplate, RecurringTemplate, TemplateUpdate, TransactionInstance, UserId,
};
use crate::storage::{
    delete_record, fetch_records_lossy, insert_record, update_record, RowStore,
};

/// Outcome of one processing pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProcessReport {
    pub created: Vec<TransactionInstance>,
    /// Template ids that could not be processed, with the reason.
    pub failures: Vec<(Uuid, String)>,
}

impl ProcessReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct RecurringService;

impl RecurringService {
    pub fn create(
        store: &dyn RowStore,
        clock: &dyn Clock,
        user: &UserId,
        input: NewRecurringTemplate,
    ) -> ServiceResult<RecurringTemplate> {
        let template = RecurringTemplate::from_input(user.clone(), input, clock.now())?;
        insert_record(store, &template)?;
        tracing::info!(id = %template.id, frequency = %template.frequency, "created recurring template");
        Ok(template)
    }

    /// Templates owned by `user`, newest first. Rows that fail to decode are skipped.
    pub fn list(store: &dyn RowStore, user: &UserId) -> ServiceResult<Vec<RecurringTemplate>> {
        let decoded = fetch_records_lossy::<RecurringTemplate>(store, user)?;
        if decoded.skipped > 0 {
            tracing::warn!(skipped = decoded.skipped, "ignored unreadable recurring templates");
        }
        let mut templates = decoded.records;
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(templates)
    }

    pub fn update(
        store: &dyn RowStore,
        clock: &dyn Clock,
        user: &UserId,
        id: Uuid,
        update: TemplateUpdate,
    ) -> ServiceResult<RecurringTemplate> {
        let mut template = find_owned::<RecurringTemplate>(store, user, id)?;
        template.apply(update, clock.now())?;
        update_record(store, &template)?;
        tracing::info!(%id, "updated recurring template");
        Ok(template)
    }

    /// Pauses (`false`) or resumes (`true`) a template.
    pub fn set_active(
        store: &dyn RowStore,
        clock: &dyn Clock,
        user: &UserId,
        id: Uuid,
        active: bool,
    ) -> ServiceResult<RecurringTemplate> {
        let mut template = find_owned::<RecurringTemplate>(store, user, id)?;
        if template.is_active != active {
            template.is_active = active;
            template.updated_at = clock.now();
            update_record(store, &template)?;
            tracing::info!(%id, active, "toggled recurring template");
        }
        Ok(template)
    }

    pub fn remove(
        store: &dyn RowStore,
        user: &UserId,
        id: Uuid,
    ) -> ServiceResult<RecurringTemplate> {
        let template = find_owned::<RecurringTemplate>(store, user, id)?;
        delete_record::<RecurringTemplate>(store, id)?;
        tracing::info!(%id, "removed recurring template");
        Ok(template)
    }

    /// Templates due today, newest first.
    pub fn due(
        store: &dyn RowStore,
        clock: &dyn Clock,
        user: &UserId,
    ) -> ServiceResult<Vec<RecurringTemplate>> {
        let templates = Self::list(store, user)?;
        Ok(select_due(&templates, clock.today())
            .into_iter()
            .cloned()
            .collect())
    }

    /// Materializes every due template and persists the results.
    ///
    /// The instance is written first, then the template. When the template write fails the
    /// instance is deleted again so a later pass cannot create a duplicate.
    pub fn process_due(
        store: &dyn RowStore,
        clock: &dyn Clock,
        user: &UserId,
    ) -> ServiceResult<ProcessReport> {
        let now = clock.now();
        let mut report = ProcessReport::default();
        for template in Self::due(store, clock, user)? {
            let Materialized {
                instance,
                template: advanced,
            } = materialize(&template, now);

            if let Err(err) = insert_record(store, &instance) {
                tracing::warn!(template = %template.id, error = %err, "failed to record instance");
                report.failures.push((template.id, err.to_string()));
                continue;
            }

            if let Err(err) = update_record(store, &advanced) {
                tracing::warn!(
                    template = %template.id,
                    error = %err,
                    "failed to advance template; rolling back instance"
                );
                let mut reason = err.to_string();
                if let Err(rollback) = delete_record::<TransactionInstance>(store, instance.id) {
                    tracing::warn!(instance = %instance.id, error = %rollback, "rollback failed");
                    reason = format!("{reason}; rollback failed: {rollback}");
                }
                report.failures.push((template.id, reason));
                continue;
            }

            tracing::info!(template = %template.id, instance = %instance.id, "materialized recurring transaction");
            report.created.push(instance);
        }
        Ok(report)
    }
}
