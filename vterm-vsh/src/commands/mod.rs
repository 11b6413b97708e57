// ---------------------------------------------------------------------------
// Command registry
// ---------------------------------------------------------------------------
//
// Each command is a unit struct implementing `Command`. The shell looks the
// name up case-insensitively, strips recognized flags, checks the operand
// count, then runs it.
// ---------------------------------------------------------------------------

mod files;
mod navigation;
mod session;
mod tree;

use crate::error::ShellError;
use crate::output::CommandOutput;
use crate::shell::Shell;

pub use files::{Cat, Touch};
pub use navigation::{Cd, Ls, Pwd};
pub use session::{Clear, Exit, Help};
pub use tree::{Mkdir, Mv, Rm, Rmdir};

pub const HELP_FLAGS: [&str; 2] = ["-h", "--help"];

/// Allowed operand count after flags are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    pub const fn at_least(n: usize) -> Self {
        Self { min: n, max: None }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        Self { min, max: Some(max) }
    }

    pub fn check(&self, count: usize) -> Result<(), ShellError> {
        if count < self.min {
            return Err(ShellError::TooFewArguments { min: self.min });
        }
        match self.max {
            Some(max) if count > max => Err(ShellError::TooManyArguments { max }),
            _ => Ok(()),
        }
    }
}

/// Arguments split into the flags a command declared and everything else.
#[derive(Debug, Default)]
pub struct Invocation<'a> {
    pub flags: Vec<&'a str>,
    pub operands: Vec<&'a str>,
}

impl<'a> Invocation<'a> {
    /// Tokens listed in `known` are flags; anything else, including unknown
    /// dash-prefixed tokens, is an operand.
    pub fn split(args: &'a [String], known: &[&str]) -> Self {
        let mut inv = Self::default();
        for arg in args {
            if known.contains(&arg.as_str()) {
                inv.flags.push(arg);
            } else {
                inv.operands.push(arg);
            }
        }
        inv
    }

    pub fn has_flag(&self, short: &str, long: &str) -> bool {
        self.flags.iter().any(|f| *f == short || *f == long)
    }
}

pub trait Command: Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn arity(&self) -> Arity;

    /// Flags understood besides `-h`/`--help`.
    fn flags(&self) -> &'static [&'static str] {
        &[]
    }

    fn run(&self, inv: &Invocation<'_>, shell: &mut Shell) -> Result<CommandOutput, ShellError>;
}

pub static COMMANDS: &[&dyn Command] = &[
    &Ls, &Cd, &Pwd, &Cat, &Touch, &Mkdir, &Rmdir, &Rm, &Mv, &Clear, &Exit, &Help,
];

/// Case-insensitive lookup.
pub fn lookup(name: &str) -> Option<&'static dyn Command> {
    COMMANDS
        .iter()
        .copied()
        .find(|c| c.name().eq_ignore_ascii_case(name))
}

/// Apply `op` to every operand, collecting one `name: message` line per
/// failure and carrying on with the rest.
pub(crate) fn for_each_operand<F>(
    name: &str,
    operands: &[&str],
    mut op: F,
) -> CommandOutput
where
    F: FnMut(&str) -> Result<(), ShellError>,
{
    let failures: Vec<String> = operands
        .iter()
        .filter_map(|&operand| op(operand).err())
        .map(|e| format!("{}: {}", name, e))
        .collect();
    if failures.is_empty() {
        CommandOutput::default()
    } else {
        CommandOutput::failure(failures.join("\n"))
    }
}
