use super::{Arity, Command, Invocation};
use crate::error::ShellError;
use crate::output::CommandOutput;
use crate::shell::Shell;

pub struct Ls;

impl Command for Ls {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn description(&self) -> &'static str {
        "List directory contents"
    }

    fn arity(&self) -> Arity {
        Arity::between(0, 1)
    }

    fn run(&self, inv: &Invocation<'_>, shell: &mut Shell) -> Result<CommandOutput, ShellError> {
        let listing = shell.vfs().list_directory(inv.operands.first().copied())?;
        Ok(CommandOutput::text(listing))
    }
}

pub struct Cd;

impl Command for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn description(&self) -> &'static str {
        "Change the current working directory"
    }

    fn arity(&self) -> Arity {
        Arity::exactly(1)
    }

    fn run(&self, inv: &Invocation<'_>, shell: &mut Shell) -> Result<CommandOutput, ShellError> {
        shell.vfs_mut().change_directory(inv.operands[0])?;
        Ok(CommandOutput::default())
    }
}

pub struct Pwd;

impl Command for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn description(&self) -> &'static str {
        "Print working directory"
    }

    fn arity(&self) -> Arity {
        Arity::exactly(0)
    }

    fn run(&self, _inv: &Invocation<'_>, shell: &mut Shell) -> Result<CommandOutput, ShellError> {
        Ok(CommandOutput::text(shell.vfs().current_directory()?))
    }
}
