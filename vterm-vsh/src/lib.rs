//! A small POSIX-flavored shell over the `vterm_vfs` in-memory filesystem.
//!
//! [`Shell::execute`] takes one line of input and returns a
//! [`CommandOutput`]; the binary wraps it in a script runner and an
//! interactive loop.

pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod shell;

pub use error::ShellError;
pub use output::CommandOutput;
pub use shell::Shell;
