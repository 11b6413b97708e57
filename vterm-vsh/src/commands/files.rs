use super::{for_each_operand, Arity, Command, Invocation};
use crate::error::ShellError;
use crate::output::CommandOutput;
use crate::shell::Shell;

pub struct Cat;

impl Command for Cat {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn description(&self) -> &'static str {
        "Print the file's content"
    }

    fn arity(&self) -> Arity {
        Arity::exactly(1)
    }

    fn run(&self, inv: &Invocation<'_>, shell: &mut Shell) -> Result<CommandOutput, ShellError> {
        Ok(CommandOutput::text(shell.vfs().cat_file(inv.operands[0])?))
    }
}

/// Creates empty files. Existing files are an error, not a timestamp bump.
pub struct Touch;

impl Command for Touch {
    fn name(&self) -> &'static str {
        "touch"
    }

    fn description(&self) -> &'static str {
        "Create an empty file(s)"
    }

    fn arity(&self) -> Arity {
        Arity::at_least(1)
    }

    fn run(&self, inv: &Invocation<'_>, shell: &mut Shell) -> Result<CommandOutput, ShellError> {
        Ok(for_each_operand(self.name(), &inv.operands, |path| {
            Ok(shell.vfs_mut().create_file(path, Vec::new())?)
        }))
    }
}
