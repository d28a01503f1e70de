use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{info, section, success};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "backup",
        "Snapshot and restore the data directory",
        "backup <create [note]|list|restore <name>>",
        cmd_backup,
    )]
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(
            "usage: backup <create [note]|list|restore <name>>".into(),
        ));
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "create" => {
            let note = (!rest.is_empty()).then(|| rest.join(" "));
            let created = context.store.backup(note.as_deref())?;
            success(format!("Backup `{}` created.", created.name));
            Ok(())
        }
        "list" => {
            let backups = context.store.backup_details()?;
            if backups.is_empty() {
                info("No backups found.");
                return Ok(());
            }
            section("Backups");
            for backup in backups {
                let note = backup.note.map(|n| format!("  {n}")).unwrap_or_default();
                info(format!(
                    "  {}  {}{}",
                    backup.name,
                    backup.created_at.format("%Y-%m-%d %H:%M"),
                    note
                ));
            }
            Ok(())
        }
        "restore" => {
            let name = rest.first().ok_or_else(|| {
                CommandError::InvalidArguments("usage: backup restore <name>".into())
            })?;
            context.store.restore(name)?;
            success(format!("Restored backup `{name}`."));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown backup subcommand `{other}`"
        ))),
    }
}
