use super::{Arity, Command, Invocation, COMMANDS};
use crate::error::ShellError;
use crate::output::CommandOutput;
use crate::shell::Shell;

pub struct Clear;

impl Command for Clear {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn description(&self) -> &'static str {
        "Clear screen"
    }

    fn arity(&self) -> Arity {
        Arity::exactly(0)
    }

    fn run(&self, _inv: &Invocation<'_>, _shell: &mut Shell) -> Result<CommandOutput, ShellError> {
        Ok(CommandOutput::clear_screen())
    }
}

pub struct Exit;

impl Command for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn description(&self) -> &'static str {
        "Terminate the terminal emulator session"
    }

    fn arity(&self) -> Arity {
        Arity::exactly(0)
    }

    fn run(&self, _inv: &Invocation<'_>, shell: &mut Shell) -> Result<CommandOutput, ShellError> {
        shell.terminate();
        Ok(CommandOutput::text("Exiting terminal..."))
    }
}

pub struct Help;

impl Command for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "List commands, or describe one"
    }

    fn arity(&self) -> Arity {
        Arity::between(0, 1)
    }

    fn run(&self, inv: &Invocation<'_>, _shell: &mut Shell) -> Result<CommandOutput, ShellError> {
        if let Some(name) = inv.operands.first() {
            let cmd = super::lookup(name)
                .ok_or_else(|| ShellError::CommandNotFound(name.to_string()))?;
            return Ok(CommandOutput::text(cmd.description()));
        }
        let lines: Vec<String> = COMMANDS
            .iter()
            .map(|c| format!("{:<8}{}", c.name(), c.description()))
            .collect();
        Ok(CommandOutput::text(lines.join("\n")))
    }
}
