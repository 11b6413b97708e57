use super::{for_each_operand, Arity, Command, Invocation};
use crate::error::ShellError;
use crate::output::CommandOutput;
use crate::shell::Shell;

pub struct Mkdir;

impl Command for Mkdir {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn description(&self) -> &'static str {
        "Create an empty directory(s), use -p to create missing parents"
    }

    fn arity(&self) -> Arity {
        Arity::at_least(1)
    }

    fn flags(&self) -> &'static [&'static str] {
        &["-p", "--parents"]
    }

    fn run(&self, inv: &Invocation<'_>, shell: &mut Shell) -> Result<CommandOutput, ShellError> {
        let parents = inv.has_flag("-p", "--parents");
        Ok(for_each_operand(self.name(), &inv.operands, |path| {
            Ok(shell.vfs_mut().create_directory(path, parents)?)
        }))
    }
}

pub struct Rmdir;

impl Command for Rmdir {
    fn name(&self) -> &'static str {
        "rmdir"
    }

    fn description(&self) -> &'static str {
        "Remove an empty directory"
    }

    fn arity(&self) -> Arity {
        Arity::at_least(1)
    }

    fn run(&self, inv: &Invocation<'_>, shell: &mut Shell) -> Result<CommandOutput, ShellError> {
        Ok(for_each_operand(self.name(), &inv.operands, |path| {
            Ok(shell.vfs_mut().delete_directory(path)?)
        }))
    }
}

pub struct Rm;

impl Command for Rm {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn description(&self) -> &'static str {
        "Remove files or directories (use -r for directories)"
    }

    fn arity(&self) -> Arity {
        Arity::at_least(1)
    }

    fn flags(&self) -> &'static [&'static str] {
        &["-r", "--recursive"]
    }

    fn run(&self, inv: &Invocation<'_>, shell: &mut Shell) -> Result<CommandOutput, ShellError> {
        let recursive = inv.has_flag("-r", "--recursive");
        Ok(for_each_operand(self.name(), &inv.operands, |path| {
            Ok(shell.vfs_mut().delete(path, recursive)?)
        }))
    }
}

/// `mv SRC DEST` renames; `mv SRC... DIR` moves every source into `DIR`.
pub struct Mv;

impl Command for Mv {
    fn name(&self) -> &'static str {
        "mv"
    }

    fn description(&self) -> &'static str {
        "Move files and directories"
    }

    fn arity(&self) -> Arity {
        Arity::at_least(2)
    }

    fn run(&self, inv: &Invocation<'_>, shell: &mut Shell) -> Result<CommandOutput, ShellError> {
        let Some((dest, sources)) = inv.operands.split_last() else {
            return Err(ShellError::TooFewArguments { min: 2 });
        };
        let rename_mode = sources.len() == 1;
        Ok(for_each_operand(self.name(), sources, |src| {
            Ok(shell.vfs_mut().move_node(src, dest, rename_mode)?)
        }))
    }
}
