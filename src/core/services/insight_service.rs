//! Spending analytics computed over in-memory transaction rows.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Duration, Months, Utc};

use crate::core::services::ServiceError;
use crate::domain::{Category, TransactionInstance, TransactionKind};

const MONTHS_SHOWN: usize = 6;

/// Lookback window for insights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    Week,
    #[default]
    Month,
    Year,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Week, Timeframe::Month, Timeframe::Year];

    /// Earliest timestamp included in the window ending at `now`.
    ///
    /// Month and year windows keep the calendar day, clamped to the end of shorter months.
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Timeframe::Week => now - Duration::days(7),
            Timeframe::Month => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            Timeframe::Year => now
                .checked_sub_months(Months::new(12))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::Year => "year",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Timeframe {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Timeframe::ALL
            .into_iter()
            .find(|frame| frame.code() == normalized)
            .ok_or_else(|| {
                ServiceError::Invalid(format!(
                    "unknown timeframe `{value}` (expected week, month or year)"
                ))
            })
    }
}

/// Totals per category bucket; expenses and income kept apart.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpendingBreakdown {
    pub need: f64,
    pub want: f64,
    pub goal: f64,
    pub income: f64,
}

impl SpendingBreakdown {
    pub fn total_expenses(&self) -> f64 {
        self.need + self.want + self.goal
    }

    /// Share of income left after expenses, as a percentage. Zero without income.
    pub fn savings_rate(&self) -> f64 {
        if self.income <= 0.0 {
            return 0.0;
        }
        (self.income - self.total_expenses()) / self.income * 100.0
    }

    /// Percentage of total expenses represented by `amount`.
    pub fn category_share(&self, amount: f64) -> f64 {
        let total = self.total_expenses();
        if total <= 0.0 {
            return 0.0;
        }
        amount / total * 100.0
    }

    pub fn amount_for(&self, category: Category) -> f64 {
        match category {
            Category::Need => self.need,
            Category::Want => self.want,
            Category::Goal => self.goal,
            Category::Income => self.income,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    /// `YYYY-MM`.
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightReport {
    pub timeframe: Timeframe,
    pub transaction_count: usize,
    pub breakdown: SpendingBreakdown,
    pub monthly: Vec<MonthlyTotal>,
}

pub struct InsightService;

impl InsightService {
    pub fn within<'a>(
        rows: &'a [TransactionInstance],
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> Vec<&'a TransactionInstance> {
        let cutoff = timeframe.cutoff(now);
        rows.iter().filter(|txn| txn.created_at >= cutoff).collect()
    }

    pub fn spending_breakdown<'a, I>(rows: I) -> SpendingBreakdown
    where
        I: IntoIterator<Item = &'a TransactionInstance>,
    {
        let mut breakdown = SpendingBreakdown::default();
        for txn in rows {
            if txn.kind == TransactionKind::Income {
                breakdown.income += txn.amount;
                continue;
            }
            match txn.category {
                Category::Need => breakdown.need += txn.amount,
                Category::Want => breakdown.want += txn.amount,
                Category::Goal => breakdown.goal += txn.amount,
                Category::Income => {}
            }
        }
        breakdown
    }

    /// Per-month totals for the most recent six months with activity, oldest first.
    pub fn monthly_totals<'a, I>(rows: I) -> Vec<MonthlyTotal>
    where
        I: IntoIterator<Item = &'a TransactionInstance>,
    {
        let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for txn in rows {
            let entry = months
                .entry(txn.created_at.format("%Y-%m").to_string())
                .or_default();
            match txn.kind {
                TransactionKind::Income => entry.0 += txn.amount,
                TransactionKind::Expense => entry.1 += txn.amount,
            }
        }
        let skip = months.len().saturating_sub(MONTHS_SHOWN);
        months
            .into_iter()
            .skip(skip)
            .map(|(month, (income, expenses))| MonthlyTotal {
                month,
                income,
                expenses,
                savings: income - expenses,
            })
            .collect()
    }

    /// Breakdown over the timeframe plus the monthly history of all rows.
    pub fn summarize(
        rows: &[TransactionInstance],
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> InsightReport {
        let window = Self::within(rows, timeframe, now);
        InsightReport {
            timeframe,
            transaction_count: window.len(),
            breakdown: Self::spending_breakdown(window.iter().copied()),
            monthly: Self::monthly_totals(rows),
        }
    }
}
