use crate::cli::commands::{parse_amount, parse_date, ParsedArgs};
use crate::cli::core::{resolve_id, short_id, CommandError, CommandResult, ShellContext};
use crate::cli::output::{info, money, section, success};
use crate::cli::registry::CommandEntry;
use crate::core::services::GoalService;
use crate::domain::{Goal, NewGoal, UserId};

const USAGE: &str = "goal <add|list|contribute|remove>";
const ADD_USAGE: &str = "goal add <name> <target> [--deadline YYYY-MM-DD] [--tag label]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "goal",
        "Track savings goals and contributions",
        "goal <add <name> <target> [--deadline d] [--tag t]|list|contribute <id> <amount>|remove <id>>",
        cmd_goal,
    )]
}

fn cmd_goal(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(format!("usage: {USAGE}")));
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "add" => handle_add(context, rest),
        "list" => handle_list(context),
        "contribute" => handle_contribute(context, rest),
        "remove" => handle_remove(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown goal subcommand `{other}`"
        ))),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["deadline", "tag"])?;
    let name = parsed.required(0, ADD_USAGE)?;
    let target = parse_amount(parsed.required(1, ADD_USAGE)?)?;
    let mut input = NewGoal::new(name, target);
    if let Some(raw) = parsed.flag("deadline") {
        input = input.with_deadline(parse_date(raw)?);
    }
    input.category = parsed.flag("tag").map(String::from);
    let user = context.user()?;
    let goal = GoalService::create(&context.store, context.clock.as_ref(), &user, input)?;
    success(format!(
        "Created goal `{}` targeting {} ({}).",
        goal.name,
        money(goal.target_amount, context.currency()),
        short_id(goal.id)
    ));
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let user = context.user()?;
    let goals = GoalService::list(&context.store, &user)?;
    if goals.is_empty() {
        info("No goals yet.");
        return Ok(());
    }
    section("Goals");
    for goal in &goals {
        info(format_row(goal, context.currency()));
    }
    Ok(())
}

fn handle_contribute(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw_id, raw_amount, ..] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: goal contribute <id> <amount>".into(),
        ));
    };
    let amount = parse_amount(raw_amount)?;
    let user = context.user()?;
    let id = resolve_goal(context, &user, raw_id)?;
    let contribution =
        GoalService::contribute(&context.store, context.clock.as_ref(), &user, id, amount)?;
    let goal = &contribution.goal;
    success(format!(
        "Added {} to `{}`: {}% ({}).",
        money(amount, context.currency()),
        goal.name,
        goal.progress_percentage(),
        goal.progress_tier()
    ));
    Ok(())
}

fn handle_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: goal remove <id>".into()))?;
    let user = context.user()?;
    let id = resolve_goal(context, &user, raw)?;
    let removed = GoalService::remove(&context.store, &user, id)?;
    success(format!("Removed goal `{}`.", removed.name));
    Ok(())
}

fn resolve_goal(context: &ShellContext, user: &UserId, raw: &str) -> Result<uuid::Uuid, CommandError> {
    let goals = GoalService::list(&context.store, user)?;
    resolve_id(raw, goals.iter().map(|g| g.id), "goal")
}

fn format_row(goal: &Goal, currency: &str) -> String {
    let deadline = goal
        .deadline
        .map(|date| format!(" by {date}"))
        .unwrap_or_default();
    format!(
        "  {}  {:<20} {} / {}  {:>3}% {}{}",
        short_id(goal.id),
        goal.name,
        money(goal.current_amount, currency),
        money(goal.target_amount, currency),
        goal.progress_percentage(),
        goal.progress_tier(),
        deadline
    )
}
