/// What one command line produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Text to print; may span several lines.
    pub output: String,
    pub error: bool,
    /// The terminal should be cleared before printing.
    pub clear: bool,
}

impl CommandOutput {
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..Self::default()
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: true,
            clear: false,
        }
    }

    pub fn clear_screen() -> Self {
        Self {
            clear: true,
            ..Self::default()
        }
    }
}
