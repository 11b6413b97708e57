//! Descriptor document loader.
//!
//! Reads a JSON document whose root object carries a `vfs` array of nodes and
//! translates it 1:1 into [`NodeDescriptor`]s:
//!
//! ```json
//! { "vfs": [
//!     { "name": "etc", "type": "directory", "children": [
//!         { "name": "motd", "type": "file", "content": "hi" },
//!         { "name": "logo", "type": "file",
//!           "content": { "encoding": "base64", "value": "AAEC" } }
//!     ] }
//! ] }
//! ```
//!
//! Content decoding happens here. Structural validation (names, kinds,
//! sibling uniqueness, limits) is left to the engine.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::descriptor::NodeDescriptor;
use crate::error::VfsError;

pub const DOCUMENT_EXTENSION: &str = ".json";

#[derive(Debug, Deserialize, Serialize)]
struct Document {
    vfs: Option<Vec<RawNode>>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RawNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    node_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<RawContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<Vec<RawNode>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
enum RawContent {
    Plain(String),
    Encoded {
        encoding: Option<String>,
        #[serde(default)]
        value: String,
    },
}

impl RawContent {
    fn decode(&self) -> Result<Vec<u8>, VfsError> {
        match self {
            Self::Plain(text) => Ok(text.as_bytes().to_vec()),
            Self::Encoded { encoding, value } => match encoding.as_deref() {
                None | Some("text") => Ok(value.as_bytes().to_vec()),
                Some("base64") => BASE64
                    .decode(value.trim())
                    .map_err(|_| VfsError::FormatError("invalid base64 encoding".to_string())),
                Some(other) => Err(VfsError::FormatError(format!(
                    "unsupported encoding: {}",
                    other
                ))),
            },
        }
    }
}

impl RawContent {
    /// UTF-8 payloads stay plain text, anything else is base64.
    fn encode(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::Plain(text.to_string()),
            Err(_) => Self::Encoded {
                encoding: Some("base64".to_string()),
                value: BASE64.encode(bytes),
            },
        }
    }
}

impl RawNode {
    fn from_descriptor(desc: &NodeDescriptor) -> Self {
        Self {
            name: Some(desc.name.clone()),
            node_type: Some(desc.kind.clone()),
            content: desc.content.as_deref().map(RawContent::encode),
            children: desc
                .children
                .as_ref()
                .map(|kids| kids.iter().map(RawNode::from_descriptor).collect()),
        }
    }

    fn into_descriptor(self) -> Result<NodeDescriptor, VfsError> {
        let content = self.content.as_ref().map(RawContent::decode).transpose()?;
        let children = self
            .children
            .map(|kids| {
                kids.into_iter()
                    .map(RawNode::into_descriptor)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(NodeDescriptor {
            name: self.name.unwrap_or_default(),
            kind: self.node_type.unwrap_or_default(),
            content,
            children,
        })
    }
}

fn into_descriptors(doc: Document) -> Result<Vec<NodeDescriptor>, VfsError> {
    let nodes = doc
        .vfs
        .ok_or_else(|| VfsError::FormatError("root element must be \"vfs\"".to_string()))?;
    nodes.into_iter().map(RawNode::into_descriptor).collect()
}

fn structure_error(e: serde_json::Error) -> VfsError {
    VfsError::FormatError(format!("invalid document structure ({})", e))
}

/// Parse a descriptor document from text.
pub fn parse_document(text: &str) -> Result<Vec<NodeDescriptor>, VfsError> {
    into_descriptors(serde_json::from_str(text).map_err(structure_error)?)
}

/// Parse a descriptor document that already arrived as JSON, e.g. inside a
/// request.
pub fn parse_value(value: serde_json::Value) -> Result<Vec<NodeDescriptor>, VfsError> {
    into_descriptors(serde_json::from_value(value).map_err(structure_error)?)
}

/// Inverse of [`parse_value`]: UTF-8 file content is written as a plain
/// string, binary content as `{"encoding": "base64", "value": ...}`.
pub fn to_document(descriptors: &[NodeDescriptor]) -> serde_json::Value {
    let doc = Document {
        vfs: Some(descriptors.iter().map(RawNode::from_descriptor).collect()),
    };
    serde_json::to_value(doc).unwrap_or(serde_json::Value::Null)
}

/// Read and parse a descriptor document from disk. The file name must end
/// in `.json`.
pub fn load_document(path: impl AsRef<Path>) -> Result<Vec<NodeDescriptor>, VfsError> {
    let path = path.as_ref();
    if !path.to_string_lossy().trim().ends_with(DOCUMENT_EXTENSION) {
        return Err(VfsError::FormatError(format!(
            "expected {}",
            DOCUMENT_EXTENSION
        )));
    }
    let text = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "Read VFS document");
    parse_document(&text)
}
