//! Shared runtime state and error types for command execution.

use std::io;

use uuid::Uuid;

use crate::cli::commands;
use crate::cli::output::{self, OutputPreferences};
use crate::cli::registry::CommandRegistry;
use crate::config::{Config, ConfigManager};
use crate::core::clock::{Clock, SystemClock};
use crate::core::errors::{CliError, SpendError};
use crate::core::services::ServiceError;
use crate::domain::UserId;
use crate::storage::JsonStore;

const MIN_ID_PREFIX: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    /// A single command taken from the process arguments.
    OneShot,
    /// Commands read line by line from stdin.
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Core(#[from] SpendError),
    #[error(transparent)]
    Service(ServiceError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(err) => CommandError::Core(err),
            invalid => CommandError::Service(invalid),
        }
    }
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub store: JsonStore,
    pub clock: Box<dyn Clock>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::new()?, Box::new(SystemClock))
    }

    pub fn with_config_manager(
        mode: CliMode,
        config_manager: ConfigManager,
        clock: Box<dyn Clock>,
    ) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        let store = open_store(&config_manager, &config)?;
        output::set_preferences(OutputPreferences {
            color_enabled: config.ui_color_enabled,
        });
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);
        Ok(Self {
            mode,
            registry,
            config_manager,
            config,
            store,
            clock,
            last_command: None,
            running: true,
        })
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    /// Active user from configuration.
    pub fn user(&self) -> Result<UserId, CommandError> {
        self.config.user()?.ok_or_else(|| {
            CommandError::Message("No active user. Run `user set <id>` first.".into())
        })
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    /// Persists the configuration and applies settings that affect the running shell.
    pub fn save_config(&mut self) -> Result<(), CommandError> {
        let store = open_store(&self.config_manager, &self.config)?;
        self.config_manager.save(&self.config)?;
        self.store = store;
        output::set_preferences(OutputPreferences {
            color_enabled: self.config.ui_color_enabled,
        });
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(best) = self.registry.suggest(input) {
            output::info(format!("Suggestion: `{best}`?"));
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
            }
            other => output::error(other),
        }
    }
}

fn open_store(manager: &ConfigManager, config: &Config) -> Result<JsonStore, SpendError> {
    JsonStore::open(
        config.data_dir(manager.base_dir()),
        Some(config.backup_retention),
    )
}

/// Resolves a full id or a unique prefix of at least four characters against `ids`.
pub fn resolve_id<I>(input: &str, ids: I, what: &str) -> Result<Uuid, CommandError>
where
    I: IntoIterator<Item = Uuid>,
{
    let needle = input.trim().to_ascii_lowercase();
    if let Ok(id) = Uuid::parse_str(&needle) {
        return Ok(id);
    }
    if needle.len() < MIN_ID_PREFIX {
        return Err(CommandError::InvalidArguments(format!(
            "id prefix `{input}` is too short (use at least {MIN_ID_PREFIX} characters)"
        )));
    }
    let matches: Vec<Uuid> = ids
        .into_iter()
        .filter(|id| id.to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CommandError::Message(format!("No {what} matches `{input}`."))),
        _ => Err(CommandError::Message(format!(
            "`{input}` matches {} {what}s; use a longer prefix.",
            matches.len()
        ))),
    }
}

/// First eight characters of an id, as shown in listings.
pub fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn context() -> (ShellContext, TempDir) {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        let context =
            ShellContext::with_config_manager(CliMode::Script, manager, Box::new(clock)).unwrap();
        (context, temp)
    }

    #[test]
    fn unknown_commands_do_not_abort() {
        let (mut context, _guard) = context();
        let control = context.dispatch("trasaction", "trasaction", &[]).unwrap();
        assert_eq!(control, LoopControl::Continue);
        assert_eq!(context.registry.suggest("trasaction"), Some("transaction"));
        assert_eq!(context.registry.suggest("zzzzzzzzzz"), None);
    }

    #[test]
    fn exit_stops_the_loop() {
        let (mut context, _guard) = context();
        assert_eq!(context.dispatch("exit", "exit", &[]).unwrap(), LoopControl::Exit);
    }

    #[test]
    fn commands_need_an_active_user() {
        let (mut context, _guard) = context();
        let err = context
            .dispatch("transaction", "transaction", &["list"])
            .expect_err("no user configured");
        assert!(err.to_string().contains("user set"));

        context.dispatch("user", "user", &["set", "demo"]).unwrap();
        assert_eq!(context.user().unwrap().as_str(), "demo");
        context
            .dispatch("transaction", "transaction", &["add", "12", "need", "Lunch"])
            .unwrap();
    }

    #[test]
    fn id_prefixes_must_be_unique_and_long_enough() {
        let a = Uuid::parse_str("aaaa1111-0000-4000-8000-000000000000").unwrap();
        let b = Uuid::parse_str("aaaa2222-0000-4000-8000-000000000000").unwrap();
        assert_eq!(resolve_id("AAAA1", [a, b], "goal").unwrap(), a);
        assert!(resolve_id("aaaa", [a, b], "goal").is_err());
        assert!(resolve_id("aaa", [a], "goal").is_err());
        assert!(resolve_id("bbbb", [a, b], "goal").is_err());
        assert_eq!(resolve_id(&b.to_string(), [a], "goal").unwrap(), b);
        assert_eq!(short_id(a), "aaaa1111");
    }
}
