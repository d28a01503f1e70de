mod common;

use chrono::Duration;
use common::{date, demo_user, setup_test_env};
use spendwise_core::core::clock::FixedClock;
use spendwise_core::core::services::{InsightService, RecurringService, Timeframe, TransactionService};
use spendwise_core::domain::{Category, Frequency, NewRecurringTemplate};
use spendwise_core::storage::JsonStore;

#[test]
fn weekly_template_materializes_on_schedule_across_reopen() {
    let (store, _config) = setup_test_env();
    let user = demo_user();
    let start = date(2025, 1, 6);
    let template = RecurringService::create(
        &store,
        &FixedClock::on(start),
        &user,
        NewRecurringTemplate::new("Groceries", 85.0, Category::Need, Frequency::Weekly, start),
    )
    .unwrap();

    let mut created = 0;
    for offset in 0..21 {
        let clock = FixedClock::on(start + Duration::days(offset));
        created += RecurringService::process_due(&store, &clock, &user)
            .unwrap()
            .created
            .len();
    }
    assert_eq!(created, 3, "days 0, 7 and 14 produce instances");

    let reopened = JsonStore::open(store.root(), Some(3)).unwrap();
    let stored = RecurringService::list(&reopened, &user).unwrap();
    assert_eq!(stored[0].id, template.id);
    assert_eq!(stored[0].last_processed, Some(date(2025, 1, 20)));

    let rows = TransactionService::list(&reopened, &user).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|t| t.description == "Recurring need"));
}

#[test]
fn end_date_stops_materialization() {
    let (store, _config) = setup_test_env();
    let user = demo_user();
    let start = date(2025, 3, 1);
    RecurringService::create(
        &store,
        &FixedClock::on(start),
        &user,
        NewRecurringTemplate::new("Trial", 9.99, Category::Want, Frequency::Daily, start)
            .with_end_date(date(2025, 3, 3)),
    )
    .unwrap();

    let mut total = 0;
    for offset in 0..10 {
        let clock = FixedClock::on(start + Duration::days(offset));
        total += RecurringService::process_due(&store, &clock, &user)
            .unwrap()
            .created
            .len();
    }
    assert_eq!(total, 3);
}

#[test]
fn materialized_income_feeds_insights() {
    let (store, _config) = setup_test_env();
    let user = demo_user();
    let start = date(2025, 4, 1);
    let clock = FixedClock::on(start);
    for (name, amount, category) in [
        ("Salary", 3000.0, Category::Income),
        ("Rent", 1200.0, Category::Need),
        ("Streaming", 15.0, Category::Want),
    ] {
        RecurringService::create(
            &store,
            &clock,
            &user,
            NewRecurringTemplate::new(name, amount, category, Frequency::Monthly, start),
        )
        .unwrap();
    }
    let report = RecurringService::process_due(&store, &clock, &user).unwrap();
    assert_eq!(report.created.len(), 3);

    let rows = TransactionService::list(&store, &user).unwrap();
    let summary = InsightService::summarize(&rows, Timeframe::Month, clock.0);
    assert_eq!(summary.breakdown.income, 3000.0);
    assert_eq!(summary.breakdown.total_expenses(), 1215.0);
    assert_eq!(summary.monthly.len(), 1);
    assert_eq!(summary.monthly[0].month, "2025-04");
}
