use serde_json::json;

use super::{clock_on, date, user, FlakyStore};
use crate::core::errors::SpendError;
use crate::core::services::{RecurringService, ServiceError, TransactionService};
use crate::domain::{
    Category, Frequency, NewRecurringTemplate, TemplateUpdate, TransactionKind,
};
use crate::storage::{Collection, MemoryStore, RowStore};

fn rent() -> NewRecurringTemplate {
    NewRecurringTemplate::new("Rent", 1500.0, Category::Need, Frequency::Monthly, date(2025, 1, 1))
}

#[test]
fn create_validates_and_defaults() {
    let store = MemoryStore::new();
    let demo = user("demo");
    let template = RecurringService::create(&store, &clock_on(2024, 12, 20), &demo, rent()).unwrap();
    assert!(template.is_active);
    assert_eq!(template.last_processed, None);
    assert_eq!(template.description, "Recurring need");

    let bad_end = rent().with_end_date(date(2024, 6, 1));
    let err = RecurringService::create(&store, &clock_on(2024, 12, 20), &demo, bad_end)
        .expect_err("end before start");
    assert!(matches!(err, ServiceError::Core(SpendError::InvalidInput(_))));

    let mut empty_name = rent();
    empty_name.name = "  ".into();
    assert!(RecurringService::create(&store, &clock_on(2024, 12, 20), &demo, empty_name).is_err());
    assert_eq!(RecurringService::list(&store, &demo).unwrap().len(), 1);
}

#[test]
fn process_due_materializes_once_per_day() {
    let store = MemoryStore::new();
    let demo = user("demo");
    let clock = clock_on(2025, 1, 1);
    let template = RecurringService::create(&store, &clock, &demo, rent()).unwrap();

    let report = RecurringService::process_due(&store, &clock, &demo).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.created.len(), 1);
    let instance = &report.created[0];
    assert_eq!(instance.amount, 1500.0);
    assert_eq!(instance.kind, TransactionKind::Expense);

    let stored = &RecurringService::list(&store, &demo).unwrap()[0];
    assert_eq!(stored.id, template.id);
    assert_eq!(stored.last_processed, Some(date(2025, 1, 1)));

    let second = RecurringService::process_due(&store, &clock, &demo).unwrap();
    assert!(second.created.is_empty());
    assert_eq!(TransactionService::list(&store, &demo).unwrap().len(), 1);

    let month_later = clock_on(2025, 1, 31);
    let third = RecurringService::process_due(&store, &month_later, &demo).unwrap();
    assert_eq!(third.created.len(), 1);
}

#[test]
fn paused_templates_are_not_processed_until_resumed() {
    let store = MemoryStore::new();
    let demo = user("demo");
    let clock = clock_on(2025, 1, 10);
    let template = RecurringService::create(&store, &clock, &demo, rent()).unwrap();

    let paused = RecurringService::set_active(&store, &clock, &demo, template.id, false).unwrap();
    assert!(!paused.is_active);
    assert!(RecurringService::due(&store, &clock, &demo).unwrap().is_empty());

    RecurringService::set_active(&store, &clock, &demo, template.id, true).unwrap();
    assert_eq!(RecurringService::due(&store, &clock, &demo).unwrap().len(), 1);
}

#[test]
fn failed_template_update_rolls_back_instance() {
    let store = FlakyStore {
        fail_update: Some(Collection::RecurringTemplates),
        ..FlakyStore::default()
    };
    let demo = user("demo");
    let clock = clock_on(2025, 2, 1);
    let template = RecurringService::create(&store, &clock, &demo, rent()).unwrap();

    let report = RecurringService::process_due(&store, &clock, &demo).unwrap();
    assert!(report.created.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, template.id);
    assert!(store.inner.fetch_all(Collection::Transactions, &demo).unwrap().is_empty());

    let stored = &RecurringService::list(&store, &demo).unwrap()[0];
    assert_eq!(stored.last_processed, None);
}

#[test]
fn failed_instance_insert_leaves_template_untouched() {
    let store = FlakyStore {
        fail_insert: Some(Collection::Transactions),
        ..FlakyStore::default()
    };
    let demo = user("demo");
    let clock = clock_on(2025, 2, 1);
    RecurringService::create(&store, &clock, &demo, rent()).unwrap();
    RecurringService::create(
        &store,
        &clock,
        &demo,
        NewRecurringTemplate::new("Pay", 3000.0, Category::Income, Frequency::Monthly, date(2025, 1, 1)),
    )
    .unwrap();

    let report = RecurringService::process_due(&store, &clock, &demo).unwrap();
    assert_eq!(report.failures.len(), 2, "processing continues after a failure");
    assert!(RecurringService::list(&store, &demo)
        .unwrap()
        .iter()
        .all(|t| t.last_processed.is_none()));
}

#[test]
fn update_rederives_kind_and_revalidates() {
    let store = MemoryStore::new();
    let demo = user("demo");
    let clock = clock_on(2025, 1, 1);
    let template = RecurringService::create(&store, &clock, &demo, rent()).unwrap();

    let update = TemplateUpdate {
        category: Some(Category::Income),
        frequency: Some(Frequency::Weekly),
        ..TemplateUpdate::default()
    };
    let later = clock_on(2025, 1, 2);
    let updated = RecurringService::update(&store, &later, &demo, template.id, update).unwrap();
    assert_eq!(updated.kind, TransactionKind::Income);
    assert_eq!(updated.frequency, Frequency::Weekly);
    assert_eq!(updated.updated_at, later.0);

    let bad = TemplateUpdate {
        amount: Some(-1.0),
        ..TemplateUpdate::default()
    };
    assert!(RecurringService::update(&store, &later, &demo, template.id, bad).is_err());
    assert_eq!(RecurringService::list(&store, &demo).unwrap()[0].amount, 1500.0);
}

#[test]
fn rows_with_unknown_frequency_are_skipped() {
    let store = MemoryStore::new();
    let demo = user("demo");
    let clock = clock_on(2025, 3, 1);
    let good = RecurringService::create(&store, &clock, &demo, rent()).unwrap();

    let mut corrupt = serde_json::to_value(&good).unwrap();
    corrupt["id"] = json!(uuid::Uuid::new_v4().to_string());
    corrupt["frequency"] = json!("fortnightly");
    store.insert(Collection::RecurringTemplates, corrupt).unwrap();

    let listed = RecurringService::list(&store, &demo).unwrap();
    assert_eq!(listed.len(), 1);
    let report = RecurringService::process_due(&store, &clock, &demo).unwrap();
    assert_eq!(report.created.len(), 1);
}

#[test]
fn remove_deletes_template_only_for_owner() {
    let store = MemoryStore::new();
    let demo = user("demo");
    let clock = clock_on(2025, 1, 1);
    let template = RecurringService::create(&store, &clock, &demo, rent()).unwrap();

    assert!(RecurringService::remove(&store, &user("other"), template.id).is_err());
    RecurringService::remove(&store, &demo, template.id).unwrap();
    assert!(RecurringService::list(&store, &demo).unwrap().is_empty());
}
