//! Due-date evaluation for recurring templates.
//!
//! Everything here is a pure function of its inputs: nothing is persisted and templates are
//! never mutated in place. Callers own the write of the returned values.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::domain::{RecurringTemplate, TransactionInstance};

/// Result of materializing a due template.
#[derive(Debug, Clone, PartialEq)]
pub struct Materialized {
    pub instance: TransactionInstance,
    pub template: RecurringTemplate,
}

/// Decides whether `template` should produce a new instance on `now`.
///
/// Comparisons are whole-day. A never-processed template is due from its start date onward;
/// afterwards it is due once the frequency's day threshold has elapsed since `last_processed`.
/// Paused templates and dates past the end date are never due.
pub fn is_due(template: &RecurringTemplate, now: NaiveDate) -> bool {
    if !template.is_active {
        return false;
    }
    if template.end_date.is_some_and(|end| now > end) {
        return false;
    }
    match template.last_processed {
        None => now >= template.start_date,
        Some(last) => {
            let elapsed = (now - last).num_days();
            elapsed >= template.frequency.threshold_days()
        }
    }
}

/// Produces the instance for a due template and the template with its marker advanced.
///
/// Does not re-check [`is_due`]; callers filter first and persist both results before
/// evaluating again.
pub fn materialize(template: &RecurringTemplate, now: DateTime<Utc>) -> Materialized {
    let instance = TransactionInstance::new(
        template.user_id.clone(),
        template.amount,
        template.category,
        template.description.clone(),
        now,
    );
    let mut updated = template.clone();
    updated.last_processed = Some(now.date_naive());
    updated.updated_at = now;
    Materialized {
        instance,
        template: updated,
    }
}

/// Templates that are due on `now`, in input order.
pub fn select_due<'a, I>(templates: I, now: NaiveDate) -> Vec<&'a RecurringTemplate>
where
    I: IntoIterator<Item = &'a RecurringTemplate>,
{
    templates
        .into_iter()
        .filter(|template| is_due(template, now))
        .collect()
}

/// Earliest date on which [`is_due`] turns true, if any.
pub fn next_due_date(template: &RecurringTemplate) -> Option<NaiveDate> {
    if !template.is_active {
        return None;
    }
    let candidate = match template.last_processed {
        None => template.start_date,
        Some(last) => last + Duration::days(template.frequency.threshold_days()),
    };
    match template.end_date {
        Some(end) if candidate > end => None,
        _ => Some(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Category, Frequency, NewRecurringTemplate, TransactionKind, UserId,
    };
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template(frequency: Frequency, last_processed: Option<NaiveDate>) -> RecurringTemplate {
        let created = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        let input = NewRecurringTemplate::new("Rent", 1500.0, Category::Need, frequency, date(2025, 1, 1));
        let mut template =
            RecurringTemplate::from_input(UserId::new("demo").unwrap(), input, created).unwrap();
        template.last_processed = last_processed;
        template
    }

    fn elapsed(frequency: Frequency, days: i64) -> bool {
        let last = date(2025, 1, 1);
        is_due(&template(frequency, Some(last)), last + Duration::days(days))
    }

    #[test]
    fn inactive_templates_are_never_due() {
        for last in [None, Some(date(2025, 1, 1))] {
            let mut paused = template(Frequency::Daily, last);
            paused.is_active = false;
            assert!(!is_due(&paused, date(2030, 1, 1)));
            assert!(!is_due(&paused, date(2025, 1, 1)));
        }
    }

    #[test]
    fn unprocessed_template_waits_for_start_date() {
        let fresh = template(Frequency::Yearly, None);
        assert!(!is_due(&fresh, date(2024, 12, 31)));
        assert!(is_due(&fresh, date(2025, 1, 1)));
        assert!(is_due(&fresh, date(2025, 3, 9)));
    }

    #[test]
    fn daily_threshold() {
        assert!(!elapsed(Frequency::Daily, 0));
        assert!(elapsed(Frequency::Daily, 1));
    }

    #[test]
    fn weekly_threshold() {
        assert!(!elapsed(Frequency::Weekly, 6));
        assert!(elapsed(Frequency::Weekly, 7));
    }

    #[test]
    fn monthly_threshold_is_thirty_days() {
        assert!(!elapsed(Frequency::Monthly, 29));
        assert!(elapsed(Frequency::Monthly, 30));
    }

    #[test]
    fn yearly_threshold_is_365_days() {
        assert!(!elapsed(Frequency::Yearly, 364));
        assert!(elapsed(Frequency::Yearly, 365));
    }

    #[test]
    fn clock_before_last_processed_is_not_due() {
        assert!(!elapsed(Frequency::Daily, -3));
    }

    #[test]
    fn end_date_stops_new_instances() {
        let mut bounded = template(Frequency::Daily, Some(date(2025, 1, 5)));
        bounded.end_date = Some(date(2025, 1, 10));
        assert!(is_due(&bounded, date(2025, 1, 10)));
        assert!(!is_due(&bounded, date(2025, 1, 11)));
    }

    #[test]
    fn select_due_keeps_due_templates_in_order() {
        let today = date(2025, 2, 20);
        let a = template(Frequency::Daily, Some(today));
        let b = template(Frequency::Weekly, Some(today - Duration::days(8)));
        let mut c = template(Frequency::Daily, Some(date(2025, 1, 1)));
        c.is_active = false;
        let d = template(Frequency::Monthly, None);

        let templates = vec![a, b.clone(), c, d.clone()];
        let due = select_due(&templates, today);
        let ids: Vec<_> = due.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b.id, d.id]);

        let again: Vec<_> = select_due(&templates, today).iter().map(|t| t.id).collect();
        assert_eq!(again, ids);
    }

    #[test]
    fn select_due_skips_recent_and_paused_templates() {
        let today = date(2025, 2, 20);
        let a = template(Frequency::Daily, Some(today));
        let b = template(Frequency::Weekly, Some(today - Duration::days(8)));
        let mut c = template(Frequency::Weekly, Some(today - Duration::days(30)));
        c.is_active = false;
        let templates = [a, b.clone(), c];
        let due = select_due(templates.iter(), today);
        assert_eq!(due, vec![&b]);
    }

    #[test]
    fn materialize_copies_template_and_advances_marker() {
        let source = template(Frequency::Monthly, None);
        let now = Utc.with_ymd_and_hms(2025, 1, 3, 18, 30, 0).unwrap();

        let Materialized { instance, template } = materialize(&source, now);

        assert_eq!(instance.amount, 1500.0);
        assert_eq!(instance.category, Category::Need);
        assert_eq!(instance.kind, TransactionKind::Expense);
        assert_eq!(instance.description, source.description);
        assert_eq!(instance.user_id, source.user_id);
        assert_eq!(instance.created_at, now);

        assert_eq!(template.last_processed, Some(date(2025, 1, 3)));
        let mut expected = source.clone();
        expected.last_processed = template.last_processed;
        expected.updated_at = now;
        assert_eq!(template, expected);
        assert_eq!(source.last_processed, None, "input must not be mutated");
    }

    #[test]
    fn materialized_template_is_not_due_again_until_threshold() {
        let source = template(Frequency::Weekly, None);
        let now = Utc.with_ymd_and_hms(2025, 1, 3, 9, 0, 0).unwrap();
        let updated = materialize(&source, now).template;
        assert!(!is_due(&updated, date(2025, 1, 3)));
        assert!(!is_due(&updated, date(2025, 1, 9)));
        assert!(is_due(&updated, date(2025, 1, 10)));
    }

    #[test]
    fn next_due_date_tracks_marker_and_cutoff() {
        let fresh = template(Frequency::Weekly, None);
        assert_eq!(next_due_date(&fresh), Some(date(2025, 1, 1)));

        let mut processed = template(Frequency::Monthly, Some(date(2025, 1, 31)));
        assert_eq!(next_due_date(&processed), Some(date(2025, 3, 2)));

        processed.end_date = Some(date(2025, 2, 28));
        assert_eq!(next_due_date(&processed), None);

        processed.end_date = None;
        processed.is_active = false;
        assert_eq!(next_due_date(&processed), None);
    }
}
