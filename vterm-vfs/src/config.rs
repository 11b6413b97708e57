use clap::Parser;

use crate::path::{ParentPolicy, VfsLimits};

/// Per-session engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VfsConfig {
    pub parent_policy: ParentPolicy,
    pub limits: VfsLimits,
}

impl VfsConfig {
    /// `..` past the root fails with `PathEscapesRoot` instead of clamping.
    pub fn strict() -> Self {
        Self {
            parent_policy: ParentPolicy::Reject,
            ..Self::default()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "vterm-vfs", about = "In-memory VFS server over JSON-RPC 2.0 / NDJSON stdio")]
pub struct CliArgs {
    /// Reject `..` past the root instead of staying at `/`
    #[arg(long, env = "VTERM_STRICT_PARENT")]
    pub strict_parent: bool,

    /// Maximum number of nodes per session, root included
    #[arg(long, env = "VTERM_MAX_NODES")]
    pub max_node_count: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "VTERM_LOG_LEVEL")]
    pub log_level: String,
}

impl CliArgs {
    /// Defaults every `initialize` request starts from.
    pub fn vfs_config(&self) -> VfsConfig {
        let mut config = if self.strict_parent {
            VfsConfig::strict()
        } else {
            VfsConfig::default()
        };
        if let Some(max) = self.max_node_count {
            config.limits.max_node_count = max;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_clamp() {
        let args = CliArgs::parse_from(["vterm-vfs"]);
        assert_eq!(args.log_level, "info");
        assert_eq!(args.vfs_config(), VfsConfig::default());
    }

    #[test]
    fn strict_parent_flag() {
        let args = CliArgs::parse_from(["vterm-vfs", "--strict-parent", "--max-node-count", "50"]);
        let config = args.vfs_config();
        assert_eq!(config.parent_policy, ParentPolicy::Reject);
        assert_eq!(config.limits.max_node_count, 50);
    }
}
