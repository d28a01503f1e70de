use crate::cli::commands::{parse_amount, parse_category, parse_date, parse_frequency, ParsedArgs};
use crate::cli::core::{resolve_id, short_id, CommandError, CommandResult, ShellContext};
use crate::cli::output::{info, money, section, success, warning};
use crate::cli::registry::CommandEntry;
use crate::core::recurrence::next_due_date;
use crate::core::services::RecurringService;
use crate::domain::{NewRecurringTemplate, RecurringTemplate, TemplateUpdate, UserId};

const USAGE: &str = "recurring <add|list|due|process|pause|resume|edit|remove>";
const ADD_USAGE: &str = "recurring add <name> <amount> <category> <daily|weekly|monthly|yearly> \
[--start YYYY-MM-DD] [--end YYYY-MM-DD] [--description text]";
const EDIT_USAGE: &str =
    "recurring edit <id> <name|amount|category|frequency|start|end|description> <value>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "recurring",
        "Manage recurring transaction templates",
        "recurring <add <name> <amount> <category> <frequency> [--start d] [--end d] [--description t]|list|due|process|pause <id>|resume <id>|edit <id> <field> <value>|remove <id>>",
        cmd_recurring,
    )]
}

fn cmd_recurring(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(format!("usage: {USAGE}")));
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "add" => handle_add(context, rest),
        "list" => handle_list(context),
        "due" => handle_due(context),
        "process" => handle_process(context),
        "pause" => handle_toggle(context, rest, false),
        "resume" => handle_toggle(context, rest, true),
        "edit" => handle_edit(context, rest),
        "remove" => handle_remove(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown recurring subcommand `{other}`"
        ))),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["start", "end", "description"])?;
    let name = parsed.required(0, ADD_USAGE)?;
    let amount = parse_amount(parsed.required(1, ADD_USAGE)?)?;
    let category = parse_category(parsed.required(2, ADD_USAGE)?)?;
    let frequency = parse_frequency(parsed.required(3, ADD_USAGE)?)?;
    let start = match parsed.flag("start") {
        Some(raw) => parse_date(raw)?,
        None => context.clock.today(),
    };
    let mut input = NewRecurringTemplate::new(name, amount, category, frequency, start);
    if let Some(raw) = parsed.flag("end") {
        input = input.with_end_date(parse_date(raw)?);
    }
    if let Some(description) = parsed.flag("description") {
        input = input.with_description(description);
    }
    let user = context.user()?;
    let template = RecurringService::create(&context.store, context.clock.as_ref(), &user, input)?;
    success(format!(
        "Created {} template `{}` ({}), first due {}.",
        template.frequency,
        template.name,
        short_id(template.id),
        template.start_date
    ));
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let user = context.user()?;
    let templates = RecurringService::list(&context.store, &user)?;
    if templates.is_empty() {
        info("No recurring templates defined.");
        return Ok(());
    }
    section("Recurring templates");
    for template in &templates {
        info(format_row(template, context.currency()));
    }
    Ok(())
}

fn handle_due(context: &mut ShellContext) -> CommandResult {
    let user = context.user()?;
    let due = RecurringService::due(&context.store, context.clock.as_ref(), &user)?;
    if due.is_empty() {
        info("Nothing is due today.");
        return Ok(());
    }
    section(format!("Due on {}", context.clock.today()));
    for template in &due {
        info(format_row(template, context.currency()));
    }
    Ok(())
}

fn handle_process(context: &mut ShellContext) -> CommandResult {
    let user = context.user()?;
    let report = RecurringService::process_due(&context.store, context.clock.as_ref(), &user)?;
    for instance in &report.created {
        info(format!(
            "  + {} {} ({})",
            instance.description,
            money(instance.signed_amount(), context.currency()),
            short_id(instance.id)
        ));
    }
    for (template, reason) in &report.failures {
        warning(format!("Template {} was not processed: {reason}", short_id(*template)));
    }
    if report.created.is_empty() && report.is_clean() {
        info("Nothing is due today.");
    } else {
        success(format!("Created {} transaction(s).", report.created.len()));
    }
    Ok(())
}

fn handle_toggle(context: &mut ShellContext, args: &[&str], active: bool) -> CommandResult {
    let verb = if active { "resume" } else { "pause" };
    let raw = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: recurring {verb} <id>")))?;
    let user = context.user()?;
    let id = resolve_template(context, &user, raw)?;
    let template =
        RecurringService::set_active(&context.store, context.clock.as_ref(), &user, id, active)?;
    let state = if active { "resumed" } else { "paused" };
    success(format!("Template `{}` {state}.", template.name));
    Ok(())
}

fn handle_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw_id, field, value @ ..] = args else {
        return Err(CommandError::InvalidArguments(format!("usage: {EDIT_USAGE}")));
    };
    if value.is_empty() {
        return Err(CommandError::InvalidArguments(format!("usage: {EDIT_USAGE}")));
    }
    let value = value.join(" ");
    let mut update = TemplateUpdate::default();
    match field.to_ascii_lowercase().as_str() {
        "name" => update.name = Some(value),
        "amount" => update.amount = Some(parse_amount(&value)?),
        "category" => update.category = Some(parse_category(&value)?),
        "frequency" => update.frequency = Some(parse_frequency(&value)?),
        "start" => update.start_date = Some(parse_date(&value)?),
        "end" => {
            update.end_date = Some(match value.to_ascii_lowercase().as_str() {
                "none" | "clear" => None,
                _ => Some(parse_date(&value)?),
            })
        }
        "description" => update.description = Some(value),
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown field `{other}`; usage: {EDIT_USAGE}"
            )))
        }
    }
    let user = context.user()?;
    let id = resolve_template(context, &user, raw_id)?;
    let template =
        RecurringService::update(&context.store, context.clock.as_ref(), &user, id, update)?;
    success(format!("Updated template `{}`.", template.name));
    Ok(())
}

fn handle_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: recurring remove <id>".into()))?;
    let user = context.user()?;
    let id = resolve_template(context, &user, raw)?;
    let removed = RecurringService::remove(&context.store, &user, id)?;
    success(format!("Removed template `{}`.", removed.name));
    Ok(())
}

fn resolve_template(
    context: &ShellContext,
    user: &UserId,
    raw: &str,
) -> Result<uuid::Uuid, CommandError> {
    let templates = RecurringService::list(&context.store, user)?;
    resolve_id(raw, templates.iter().map(|t| t.id), "recurring template")
}

fn format_row(template: &RecurringTemplate, currency: &str) -> String {
    let next = match next_due_date(template) {
        Some(date) => format!("next {date}"),
        None if !template.is_active => "paused".to_string(),
        None => "ended".to_string(),
    };
    format!(
        "  {}  {:<20} {:>14}  {:<6} {:<8} {}",
        short_id(template.id),
        template.name,
        money(template.kind.signed(template.amount), currency),
        template.category,
        template.frequency,
        next
    )
}
