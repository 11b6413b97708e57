use thiserror::Error;
use vterm_vfs::VfsError;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Unclosed quotes in command")]
    UnclosedQuotes,
    #[error("Too few arguments. Expected at least {min}")]
    TooFewArguments { min: usize },
    #[error("Too many arguments. Expected at most {max}")]
    TooManyArguments { max: usize },
    #[error("command not found: {0}")]
    CommandNotFound(String),
    #[error(transparent)]
    Vfs(#[from] VfsError),
}

impl ShellError {
    pub fn code(&self) -> &str {
        match self {
            Self::UnclosedQuotes => "VSH_UNCLOSED_QUOTES",
            Self::TooFewArguments { .. } => "VSH_TOO_FEW_ARGUMENTS",
            Self::TooManyArguments { .. } => "VSH_TOO_MANY_ARGUMENTS",
            Self::CommandNotFound(_) => "VSH_COMMAND_NOT_FOUND",
            Self::Vfs(e) => e.code(),
        }
    }
}
