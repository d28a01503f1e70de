pub mod backup;
pub mod config;
pub mod goal;
pub mod insights;
pub mod recurring;
pub mod system;
pub mod transaction;
pub mod user;

use chrono::NaiveDate;

use crate::cli::core::CommandError;
use crate::domain::{Category, Frequency};
use crate::cli::registry::{CommandEntry, CommandRegistry};

const ROOT_COMMAND_ORDER: &[&str] = &[
    "user",
    "transaction",
    "recurring",
    "goal",
    "insights",
    "backup",
    "config",
    "help",
    "version",
    "exit",
];

pub(crate) fn all_entries() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(user::definitions());
    commands.extend(transaction::definitions());
    commands.extend(recurring::definitions());
    commands.extend(goal::definitions());
    commands.extend(insights::definitions());
    commands.extend(backup::definitions());
    commands.extend(config::definitions());
    commands.extend(system::definitions());
    commands
}

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let mut entries = all_entries();
    entries.sort_by_key(|entry| {
        ROOT_COMMAND_ORDER
            .iter()
            .position(|name| entry.name.eq_ignore_ascii_case(name))
            .unwrap_or(ROOT_COMMAND_ORDER.len())
    });
    for entry in entries {
        registry.register(entry);
    }
}

/// Positional arguments plus `--flag value` pairs.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    flags: Vec<(&'a str, &'a str)>,
}

impl<'a> ParsedArgs<'a> {
    pub fn parse(args: &[&'a str], known_flags: &[&str]) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            let Some(flag) = arg.strip_prefix("--") else {
                parsed.positional.push(arg);
                continue;
            };
            if !known_flags.contains(&flag) {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `--{flag}`"
                )));
            }
            let value = iter.next().ok_or_else(|| {
                CommandError::InvalidArguments(format!("option `--{flag}` needs a value"))
            })?;
            parsed.flags.push((flag, value));
        }
        Ok(parsed)
    }

    pub fn flag(&self, name: &str) -> Option<&'a str> {
        self.flags
            .iter()
            .rev()
            .find(|(flag, _)| *flag == name)
            .map(|(_, value)| *value)
    }

    pub fn required(&self, index: usize, usage: &str) -> Result<&'a str, CommandError> {
        self.positional
            .get(index)
            .copied()
            .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))
    }

    /// Positional arguments from `index` on, joined with spaces.
    pub fn rest(&self, index: usize) -> Option<String> {
        let rest = self.positional.get(index..)?;
        (!rest.is_empty()).then(|| rest.join(" "))
    }
}

pub(crate) fn parse_amount(raw: &str) -> Result<f64, CommandError> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{raw}` is not a positive amount"
        ))),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("`{raw}` is not a date (expected YYYY-MM-DD)"))
    })
}

pub(crate) fn parse_category(raw: &str) -> Result<Category, CommandError> {
    raw.parse()
        .map_err(|err: crate::domain::CategoryError| CommandError::InvalidArguments(err.to_string()))
}

pub(crate) fn parse_frequency(raw: &str) -> Result<Frequency, CommandError> {
    raw.parse()
        .map_err(|err: crate::domain::FrequencyError| CommandError::InvalidArguments(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_split_from_positionals() {
        let args = ["Rent", "--end", "2025-12-31", "1500"];
        let parsed = ParsedArgs::parse(&args, &["end"]).unwrap();
        assert_eq!(parsed.positional, vec!["Rent", "1500"]);
        assert_eq!(parsed.flag("end"), Some("2025-12-31"));
        assert!(ParsedArgs::parse(&["--bogus", "x"], &["end"]).is_err());
        assert!(ParsedArgs::parse(&["--end"], &["end"]).is_err());
    }

    #[test]
    fn amounts_must_be_positive() {
        assert_eq!(parse_amount("1,250.50").unwrap(), 1250.5);
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }
}
