use std::path::PathBuf;

use clap::Parser;
use vterm_vfs::VfsConfig;

#[derive(Parser, Debug)]
#[command(name = "vterm-vsh", about = "Virtual shell over an in-memory filesystem")]
pub struct CliArgs {
    /// Descriptor document (.json) to load instead of the built-in tree
    #[arg(long, env = "VTERM_VFS")]
    pub vfs: Option<PathBuf>,

    /// Run each line of this file before going interactive
    #[arg(long, env = "VTERM_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Reject `..` past the root instead of staying at `/`
    #[arg(long, env = "VTERM_STRICT_PARENT")]
    pub strict_parent: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "VTERM_LOG_LEVEL")]
    pub log_level: String,
}

impl CliArgs {
    pub fn vfs_config(&self) -> VfsConfig {
        if self.strict_parent {
            VfsConfig::strict()
        } else {
            VfsConfig::default()
        }
    }
}
