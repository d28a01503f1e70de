use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{info, success};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "user",
        "Show or select the active user",
        "user [show|set <id>]",
        cmd_user,
    )]
}

fn cmd_user(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|s| s.to_ascii_lowercase()).as_deref() {
        None | Some("show") => {
            match &context.config.user_id {
                Some(user) => info(format!("Active user: {user}")),
                None => info("No active user. Run `user set <id>` to choose one."),
            }
            Ok(())
        }
        Some("set") => {
            let id = args.get(1..).map(|rest| rest.join(" ")).unwrap_or_default();
            if id.trim().is_empty() {
                return Err(CommandError::InvalidArguments("usage: user set <id>".into()));
            }
            context.config.set("user", &id)?;
            context.save_config()?;
            success(format!("Active user set to `{}`.", id.trim()));
            Ok(())
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown user subcommand `{other}`"
        ))),
    }
}
