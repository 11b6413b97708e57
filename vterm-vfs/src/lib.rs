//! In-memory hierarchical virtual filesystem.
//!
//! [`VirtualFs`] owns a tree of named files and directories plus a
//! current-directory cursor. Paths are resolved against the cursor,
//! mutations validate fully before changing anything, and trees can be
//! loaded from descriptor documents or the built-in default structure.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod path;
pub mod protocol;
pub mod server;
pub mod transport;
pub mod tree;
pub mod vfs;

pub use config::VfsConfig;
pub use descriptor::{default_structure, NodeDescriptor};
pub use error::VfsError;
pub use path::{AbsolutePath, ParentPolicy, VfsLimits};
pub use tree::NodeType;
pub use vfs::{DirEntryResult, LoadSource, MetricsResult, NodeTemplate, StatResult, VirtualFs};
