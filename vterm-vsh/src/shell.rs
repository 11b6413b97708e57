use std::io::{self, BufRead, Write};

use vterm_vfs::VirtualFs;

use crate::commands::{self, Invocation, HELP_FLAGS};
use crate::error::ShellError;
use crate::output::CommandOutput;
use crate::parser;

/// ANSI clear-screen plus cursor-home.
const CLEAR_SEQUENCE: &str = "\x1b[2J\x1b[H";

/// A shell session: one filesystem and whether `exit` has been run.
pub struct Shell {
    vfs: VirtualFs,
    running: bool,
}

impl Shell {
    pub fn new(vfs: VirtualFs) -> Self {
        Self { vfs, running: true }
    }

    /// A session over the built-in default tree.
    pub fn with_default_tree() -> Self {
        let mut vfs = VirtualFs::default();
        vfs.load_default();
        Self::new(vfs)
    }

    pub fn vfs(&self) -> &VirtualFs {
        &self.vfs
    }

    pub fn vfs_mut(&mut self) -> &mut VirtualFs {
        &mut self.vfs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn terminate(&mut self) {
        self.running = false;
    }

    pub fn prompt(&self) -> String {
        let cwd = self
            .vfs
            .current_directory()
            .unwrap_or_else(|_| "?".to_string());
        format!("vterm:{}$ ", cwd)
    }

    /// Parse and run one command line.
    pub fn execute(&mut self, input: &str) -> CommandOutput {
        let parsed = match parser::parse(input) {
            Ok(Some(p)) => p,
            Ok(None) => return CommandOutput::default(),
            Err(e) => return CommandOutput::failure(format!("vsh: {}", e)),
        };

        let Some(cmd) = commands::lookup(&parsed.name) else {
            return CommandOutput::failure(ShellError::CommandNotFound(parsed.name).to_string());
        };

        if parsed.args.iter().any(|a| HELP_FLAGS.contains(&a.as_str())) {
            return CommandOutput::text(cmd.description());
        }

        let inv = Invocation::split(&parsed.args, cmd.flags());
        let result = cmd
            .arity()
            .check(inv.operands.len())
            .and_then(|()| cmd.run(&inv, self));

        match result {
            Ok(out) => out,
            Err(e) => {
                tracing::debug!(command = cmd.name(), code = e.code(), "{}", e);
                CommandOutput::failure(format!("{}: {}", cmd.name(), e))
            }
        }
    }

    // ── Drivers ─────────────────────────────────────────────────────────

    /// Run each non-blank line as if typed, echoing `$ line` first. Stops
    /// early on `exit`.
    pub fn run_script<W: Write>(&mut self, script: &str, out: &mut W) -> io::Result<()> {
        for line in script.lines().map(str::trim).filter(|l| !l.is_empty()) {
            writeln!(out, "$ {}", line)?;
            let result = self.execute(line);
            render(&result, out)?;
            if !self.running {
                break;
            }
        }
        Ok(())
    }

    /// Prompt, read a line, execute, print; until EOF or `exit`.
    pub fn run_interactive<R: BufRead, W: Write>(
        &mut self,
        input: R,
        out: &mut W,
    ) -> io::Result<()> {
        let mut lines = input.lines();
        while self.running {
            write!(out, "{}", self.prompt())?;
            out.flush()?;
            let Some(line) = lines.next().transpose()? else {
                writeln!(out)?;
                break;
            };
            let result = self.execute(&line);
            render(&result, out)?;
        }
        Ok(())
    }
}

/// Print a command's result the way a terminal would.
pub fn render<W: Write>(result: &CommandOutput, out: &mut W) -> io::Result<()> {
    if result.clear {
        write!(out, "{}", CLEAR_SEQUENCE)?;
    }
    if !result.output.is_empty() {
        writeln!(out, "{}", result.output)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_tracks_cwd() {
        let mut shell = Shell::with_default_tree();
        assert_eq!(shell.prompt(), "vterm:/$ ");
        shell.execute("cd /home/user");
        assert_eq!(shell.prompt(), "vterm:/home/user$ ");
    }

    #[test]
    fn script_echoes_and_stops_on_exit() {
        let mut shell = Shell::with_default_tree();
        let mut out = Vec::new();
        shell
            .run_script("pwd\n\n  cd home \nexit\nmkdir /never\n", &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "$ pwd\n/\n$ cd home\n$ exit\nExiting terminal...\n");
        assert!(!shell.is_running());
        assert!(!shell.vfs().exists("/never").unwrap());
    }

    #[test]
    fn interactive_loop_until_eof() {
        let mut shell = Shell::with_default_tree();
        let mut out = Vec::new();
        shell
            .run_interactive("cd home\nls\n".as_bytes(), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "vterm:/$ vterm:/home$ .\t..\tuser\tbin\nvterm:/home$ \n"
        );
        assert!(shell.is_running());
    }

    #[test]
    fn clear_emits_escape_sequence() {
        let mut out = Vec::new();
        render(&CommandOutput::clear_screen(), &mut out).unwrap();
        assert_eq!(out, CLEAR_SEQUENCE.as_bytes());
    }
}
