use serde::{Deserialize, Serialize};

use crate::path::{ParentPolicy, VfsLimits};
use crate::tree::NodeType;
use crate::vfs::{DirEntryResult, MetricsResult, StatResult};

// ── JSON-RPC 2.0 error codes ────────────────────────────────────────────────

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const VFS_ERROR: i32 = -32000;

// ── Incoming request ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

// ── Params ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub limits: Option<LimitsParams>,
    pub parent_policy: Option<ParentPolicy>,
    /// A `{"vfs": [...]}` document; the built-in tree is used when absent.
    pub document: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsParams {
    pub max_file_size: Option<u64>,
    pub max_path_depth: Option<usize>,
    pub max_name_length: Option<usize>,
    pub max_node_count: Option<usize>,
}

impl LimitsParams {
    /// Overlay the supplied fields on `base`.
    pub fn apply(&self, base: VfsLimits) -> VfsLimits {
        VfsLimits {
            max_file_size: self.max_file_size.unwrap_or(base.max_file_size),
            max_path_depth: self.max_path_depth.unwrap_or(base.max_path_depth),
            max_name_length: self.max_name_length.unwrap_or(base.max_name_length),
            max_node_count: self.max_node_count.unwrap_or(base.max_node_count),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathParams {
    pub path: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionalPathParams {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MkdirParams {
    pub path: String,
    pub recursive: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchParams {
    pub path: String,
    pub content: Option<String>,
    /// `"text"` (default) or `"binary"`, in which case `content` is base64.
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    pub path: String,
    pub recursive: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveParams {
    pub from: String,
    pub to: String,
    pub rename_mode: Option<bool>,
}

// ── Result types ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult {
    pub entries: Vec<String>,
    /// Entries joined with a tab, as a terminal would print them.
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
}

impl From<DirEntryResult> for DirEntry {
    fn from(e: DirEntryResult) -> Self {
        Self {
            name: e.name,
            node_type: e.node_type,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadFileResult {
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub size: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatResponse {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub size: u64,
    pub child_count: usize,
}

impl From<StatResult> for StatResponse {
    fn from(s: StatResult) -> Self {
        Self {
            path: s.path,
            name: s.name,
            node_type: s.node_type,
            size: s.size,
            child_count: s.child_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub node_count: usize,
    pub file_count: usize,
    pub directory_count: usize,
    pub total_size: u64,
}

impl From<MetricsResult> for MetricsResponse {
    fn from(m: MetricsResult) -> Self {
        Self {
            node_count: m.node_count,
            file_count: m.file_count,
            directory_count: m.directory_count,
            total_size: m.total_size,
        }
    }
}
