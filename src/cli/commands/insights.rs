use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{info, money, section};
use crate::cli::registry::CommandEntry;
use crate::core::services::{InsightService, Timeframe, TransactionService};
use crate::domain::Category;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "insights",
        "Summarize spending by category and month",
        "insights [week|month|year]",
        cmd_insights,
    )]
}

fn cmd_insights(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let timeframe = match args.first() {
        Some(raw) => raw
            .parse::<Timeframe>()
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))?,
        None => Timeframe::default(),
    };
    let user = context.user()?;
    let rows = TransactionService::list(&context.store, &user)?;
    let report = InsightService::summarize(&rows, timeframe, context.clock.now());
    let currency = context.currency();
    let breakdown = &report.breakdown;

    section(format!("Insights for the last {}", report.timeframe));
    info(format!("  Transactions : {}", report.transaction_count));
    info(format!("  Income       : {}", money(breakdown.income, currency)));
    info(format!(
        "  Expenses     : {}",
        money(breakdown.total_expenses(), currency)
    ));
    info(format!("  Savings rate : {:.1}%", breakdown.savings_rate()));
    for category in [Category::Need, Category::Want, Category::Goal] {
        let amount = breakdown.amount_for(category);
        info(format!(
            "  {:<12} : {} ({:.1}%)",
            category.to_string(),
            money(amount, currency),
            breakdown.category_share(amount)
        ));
    }

    if !report.monthly.is_empty() {
        section("Monthly totals");
        for month in &report.monthly {
            info(format!(
                "  {}  in {}  out {}  saved {}",
                month.month,
                money(month.income, currency),
                money(month.expenses, currency),
                money(month.savings, currency)
            ));
        }
    }
    Ok(())
}
