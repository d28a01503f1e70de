use std::io::{self, BufRead};

use shell_words::split;

use crate::cli::core::{CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;
use crate::core::errors::CliError;

const SCRIPT_ENV: &str = "SPENDWISE_CLI_SCRIPT";

/// Runs the command named by the process arguments, or reads commands from stdin when
/// `SPENDWISE_CLI_SCRIPT` is set or no arguments were given.
pub fn run_cli() -> Result<(), CliError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() || args.is_empty() {
        CliMode::Script
    } else {
        CliMode::OneShot
    };

    let mut context = ShellContext::new(mode)?;
    match mode {
        CliMode::OneShot => run_once(&mut context, &args),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_once(context: &mut ShellContext, args: &[String]) -> Result<(), CliError> {
    let Some((command, rest)) = args.split_first() else {
        return Ok(());
    };
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
    let name = command.to_lowercase();
    if context.registry.get(&name).is_none() {
        context.suggest_command(command);
        return Err(CliError::Input(format!("unknown command `{command}`")));
    }
    context
        .dispatch(&name, command, &rest)
        .map(|_| ())
        .map_err(|err| CliError::Command(err.to_string()))
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err),
        }
    }
    Ok(())
}

pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(LoopControl::Continue);
    }
    let tokens = match split(trimmed) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not parse `{trimmed}`: {err}"));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let command = raw.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    context.last_command = Some(trimmed.to_string());

    match context.dispatch(&command, raw, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}
