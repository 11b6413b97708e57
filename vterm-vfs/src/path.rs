use std::fmt;

use serde::Deserialize;

use crate::error::VfsError;

// ── Constants ───────────────────────────────────────────────────────────────

pub const ROOT: &str = "/";
pub const SEPARATOR: char = '/';

// ── Policy ──────────────────────────────────────────────────────────────────

/// What `..` does when there is no segment left to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParentPolicy {
    /// Stay at the root (`cd ../../..` from `/` is `/`).
    #[default]
    Clamp,
    /// Fail with `PathEscapesRoot`.
    Reject,
}

// ── Limits ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsLimits {
    pub max_path_depth: usize,
    pub max_name_length: usize,
    pub max_node_count: usize,
    pub max_file_size: u64,
}

impl Default for VfsLimits {
    fn default() -> Self {
        Self {
            max_path_depth: 32,
            max_name_length: 255,
            max_node_count: 10_000,
            max_file_size: 10 * 1024 * 1024, // 10 MB
        }
    }
}

// ── AbsolutePath ────────────────────────────────────────────────────────────

/// Canonical absolute path: `/` or `/seg1/seg2`, never containing `.`, `..`
/// or empty segments. Only produced by [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AbsolutePath {
    segments: Vec<String>,
}

impl AbsolutePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Root has depth 0, `/foo` has depth 1, `/foo/bar` has depth 2.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Drop the last segment. The root has no parent.
    pub fn parent(&self) -> Result<AbsolutePath, VfsError> {
        match self.segments.split_last() {
            Some((_, rest)) => Ok(Self {
                segments: rest.to_vec(),
            }),
            None => Err(VfsError::PathEscapesRoot(ROOT.to_string())),
        }
    }

    /// Final segment, or an empty string for the root.
    pub fn base_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn join(&self, name: &str) -> AbsolutePath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Segment-wise prefix test: `/a` contains `/a/b` but not `/ab`.
    pub fn is_ancestor_or_equal(&self, other: &AbsolutePath) -> bool {
        other.segments.starts_with(&self.segments)
    }
}

impl fmt::Display for AbsolutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str(ROOT);
        }
        for seg in &self.segments {
            write!(f, "{}{}", SEPARATOR, seg)?;
        }
        Ok(())
    }
}

// ── Resolution ──────────────────────────────────────────────────────────────

/// Turn a user-supplied path into an absolute one, relative to `cwd` unless
/// it starts with `/`. A single trailing `/` is accepted; any other empty
/// segment (`a//b`) is rejected.
pub fn resolve(
    path: &str,
    cwd: &AbsolutePath,
    policy: ParentPolicy,
) -> Result<AbsolutePath, VfsError> {
    if path.is_empty() {
        return Err(VfsError::InvalidPath(path.to_string()));
    }

    let (mut segments, rest) = match path.strip_prefix(SEPARATOR) {
        Some(rest) => (Vec::new(), rest),
        None => (cwd.segments.clone(), path),
    };

    if rest.is_empty() {
        return Ok(AbsolutePath { segments });
    }

    let body = rest.strip_suffix(SEPARATOR).unwrap_or(rest);
    if body.is_empty() {
        return Err(VfsError::InvalidPath(path.to_string()));
    }

    for seg in body.split(SEPARATOR) {
        match seg {
            "" => return Err(VfsError::InvalidPath(path.to_string())),
            "." => continue,
            ".." => {
                if segments.pop().is_none() && policy == ParentPolicy::Reject {
                    return Err(VfsError::PathEscapesRoot(path.to_string()));
                }
            }
            name => {
                if has_forbidden_chars(name) {
                    return Err(VfsError::InvalidPath(path.to_string()));
                }
                segments.push(name.to_string());
            }
        }
    }

    Ok(AbsolutePath { segments })
}

/// Control characters and backslashes never appear in node names.
fn has_forbidden_chars(segment: &str) -> bool {
    segment.bytes().any(|b| b <= 0x1f || b == b'\\')
}

/// Validate a node name as stored in the tree. Returns `Some(error_message)`
/// if invalid.
pub fn validate_name(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("node name cannot be empty".to_string());
    }
    if name.contains(SEPARATOR) {
        return Some(format!("node name cannot contain '{}': {}", SEPARATOR, name));
    }
    if name == "." || name == ".." {
        return Some(format!("reserved node name: {}", name));
    }
    if has_forbidden_chars(name) {
        return Some(format!("node name contains forbidden characters: {:?}", name));
    }
    None
}

// ── Tests ───────────────────────────────────────────────────────────────────
