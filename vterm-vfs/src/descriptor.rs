//! Format-agnostic node descriptors used to populate a tree at load time.
//!
//! Decoders (see [`crate::loader`]) translate their input 1:1 into this shape;
//! the engine validates it when building a [`crate::tree::Tree`].

pub const KIND_FILE: &str = "file";
pub const KIND_DIRECTORY: &str = "directory";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
	pub name: String,
	/// Exactly `file` or `directory`; anything else is a format error.
	pub kind: String,
	/// Decoded payload, required for files.
	pub content: Option<Vec<u8>>,
	/// Child descriptors, required (possibly empty) for directories.
	pub children: Option<Vec<NodeDescriptor>>,
}

impl NodeDescriptor {
	pub fn file(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
		Self {
			name: name.into(),
			kind: KIND_FILE.to_string(),
			content: Some(content.into()),
			children: None,
		}
	}

	pub fn directory(name: impl Into<String>, children: Vec<NodeDescriptor>) -> Self {
		Self {
			name: name.into(),
			kind: KIND_DIRECTORY.to_string(),
			content: None,
			children: Some(children),
		}
	}
}

/// Built-in tree installed when no external source is supplied or loading fails.
pub fn default_structure() -> Vec<NodeDescriptor> {
	vec![NodeDescriptor::directory(
		"home",
		vec![
			NodeDescriptor::directory(
				"user",
				vec![
					NodeDescriptor::file("file1.txt", "Hello from VFS!"),
					NodeDescriptor::file("file2.txt", "Another hello from VFS!"),
				],
			),
			NodeDescriptor::directory("bin", Vec::new()),
		],
	)]
}
