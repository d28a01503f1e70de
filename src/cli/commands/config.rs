use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{info, section, success};
use crate::cli::registry::CommandEntry;
use crate::config::CONFIG_KEYS;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change preferences",
        "config [show|set <key> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        section("Configuration");
        for (key, value) in context.config.entries() {
            info(format!("  {key:<17}: {value}"));
        }
        info(format!("  {:<17}: {}", "file", context.config_manager.path().display()));
        return Ok(());
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    CONFIG_KEYS.join("|")
                )));
            }
            let key = args[1];
            let value = args[2..].join(" ");
            let mut updated = context.config.clone();
            updated.set(key, &value)?;
            let previous = std::mem::replace(&mut context.config, updated);
            if let Err(err) = context.save_config() {
                context.config = previous;
                return Err(err);
            }
            success(format!("Set {key} to `{}`.", value.trim()));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config subcommand `{other}`"
        ))),
    }
}
