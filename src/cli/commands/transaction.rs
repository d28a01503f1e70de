use crate::cli::commands::{parse_amount, parse_category, ParsedArgs};
use crate::cli::core::{resolve_id, short_id, CommandError, CommandResult, ShellContext};
use crate::cli::output::{info, money, section, success};
use crate::cli::registry::CommandEntry;
use crate::core::services::{TransactionFilter, TransactionService};
use crate::domain::{NewTransaction, TransactionInstance};

const USAGE: &str = "transaction <add|list|remove|total>";
const ADD_USAGE: &str = "transaction add <amount> <need|want|goal|income> [description]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "transaction",
        "Record, list and remove transactions",
        "transaction <add <amount> <category> [description]|list [--category c] [--search text]|remove <id>|total>",
        cmd_transaction,
    )]
}

fn cmd_transaction(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(format!("usage: {USAGE}")));
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "add" => handle_add(context, rest),
        "list" => handle_list(context, rest),
        "remove" => handle_remove(context, rest),
        "total" => handle_total(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown transaction subcommand `{other}`"
        ))),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[])?;
    let amount = parse_amount(parsed.required(0, ADD_USAGE)?)?;
    let category = parse_category(parsed.required(1, ADD_USAGE)?)?;
    let mut input = NewTransaction::new(amount, category);
    if let Some(description) = parsed.rest(2) {
        input = input.with_description(description);
    }
    let user = context.user()?;
    let txn = TransactionService::record(&context.store, context.clock.as_ref(), &user, input)?;
    success(format!(
        "Recorded {} {} `{}` ({}).",
        txn.category,
        money(txn.amount, context.currency()),
        txn.description,
        short_id(txn.id)
    ));
    Ok(())
}

fn handle_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["category", "search"])?;
    let category = parsed.flag("category").map(parse_category).transpose()?;
    let filter = TransactionFilter {
        category,
        search: parsed.flag("search").map(String::from).or_else(|| parsed.rest(0)),
    };
    let user = context.user()?;
    let rows = TransactionService::list(&context.store, &user)?;
    let shown = TransactionService::filter(&rows, &filter);
    if shown.is_empty() {
        info("No transactions found.");
        return Ok(());
    }
    section("Transactions");
    for txn in &shown {
        info(format_row(txn, context.currency()));
    }
    info(format!(
        "{} shown, net {}",
        shown.len(),
        money(TransactionService::net_total(shown.iter().copied()), context.currency())
    ));
    Ok(())
}

fn handle_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: transaction remove <id>".into()))?;
    let user = context.user()?;
    let rows = TransactionService::list(&context.store, &user)?;
    let id = resolve_id(raw, rows.iter().map(|t| t.id), "transaction")?;
    let removed = TransactionService::remove(&context.store, &user, id)?;
    success(format!("Removed transaction `{}`.", removed.description));
    Ok(())
}

fn handle_total(context: &mut ShellContext) -> CommandResult {
    let user = context.user()?;
    let rows = TransactionService::list(&context.store, &user)?;
    info(format!(
        "Net total across {} transactions: {}",
        rows.len(),
        money(TransactionService::net_total(&rows), context.currency())
    ));
    Ok(())
}

fn format_row(txn: &TransactionInstance, currency: &str) -> String {
    format!(
        "  {}  {}  {:>14}  {:<6}  {}",
        short_id(txn.id),
        txn.created_at.format("%Y-%m-%d"),
        money(txn.signed_amount(), currency),
        txn.category,
        txn.description
    )
}
