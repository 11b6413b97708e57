// ---------------------------------------------------------------------------
// Node store: arena of nodes addressed by stable indices
// ---------------------------------------------------------------------------

use std::collections::HashSet;

use serde::Serialize;

use crate::descriptor::{NodeDescriptor, KIND_DIRECTORY, KIND_FILE};
use crate::error::VfsError;
use crate::path::{validate_name, AbsolutePath, VfsLimits};

// ---------------------------------------------------------------------------
// Node types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
	File,
	Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	/// Children in insertion order, which is also display order.
	Directory { children: Vec<NodeId> },
	File { content: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
	pub name: String,
	pub kind: NodeKind,
}

impl Node {
	pub fn directory(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind: NodeKind::Directory {
				children: Vec::new(),
			},
		}
	}

	pub fn file(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
		Self {
			name: name.into(),
			kind: NodeKind::File {
				content: content.into(),
			},
		}
	}

	pub fn node_type(&self) -> NodeType {
		match self.kind {
			NodeKind::Directory { .. } => NodeType::Directory,
			NodeKind::File { .. } => NodeType::File,
		}
	}

	pub fn is_dir(&self) -> bool {
		matches!(self.kind, NodeKind::Directory { .. })
	}

	pub fn is_file(&self) -> bool {
		matches!(self.kind, NodeKind::File { .. })
	}
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// Owns the root directory and every descendant. A directory owns its
/// children outright; there are no child-to-parent links.
#[derive(Debug, Clone)]
pub struct Tree {
	slots: Vec<Node>,
	free: Vec<usize>,
	root: NodeId,
}

impl Default for Tree {
	fn default() -> Self {
		Self::new()
	}
}

impl Tree {
	/// A tree holding only an empty root. The root's name is never part of a path.
	pub fn new() -> Self {
		Self {
			slots: vec![Node::directory("")],
			free: Vec::new(),
			root: NodeId(0),
		}
	}

	/// Build a tree from descriptors, validating everything before the tree
	/// is handed out. Fails with `FormatError` on malformed input and
	/// `LimitExceeded` when the tree is too large or too deep.
	pub fn from_descriptors(
		descriptors: &[NodeDescriptor],
		limits: &VfsLimits,
	) -> Result<Self, VfsError> {
		let mut tree = Self::new();
		let root = tree.root;
		tree.build_children(root, "", descriptors, 1, limits)?;
		Ok(tree)
	}

	fn build_children(
		&mut self,
		parent: NodeId,
		parent_path: &str,
		descriptors: &[NodeDescriptor],
		depth: usize,
		limits: &VfsLimits,
	) -> Result<(), VfsError> {
		let mut seen: HashSet<&str> = HashSet::new();
		for desc in descriptors {
			if let Some(err) = validate_name(&desc.name) {
				return Err(VfsError::FormatError(format!(
					"node must have a valid name attribute ({})",
					err
				)));
			}
			let path = format!("{}/{}", parent_path, desc.name);
			if !seen.insert(desc.name.as_str()) {
				return Err(VfsError::FormatError(format!("duplicate node name: {}", path)));
			}
			if depth > limits.max_path_depth {
				return Err(VfsError::LimitExceeded(format!(
					"path exceeds max depth ({}): {}",
					limits.max_path_depth, path
				)));
			}
			if desc.name.len() > limits.max_name_length {
				return Err(VfsError::LimitExceeded(format!(
					"name exceeds max length ({}): {}",
					limits.max_name_length, path
				)));
			}
			if self.node_count() >= limits.max_node_count {
				return Err(VfsError::LimitExceeded(format!(
					"maximum node count exceeded ({})",
					limits.max_node_count
				)));
			}

			match desc.kind.as_str() {
				KIND_FILE => {
					if desc.children.is_some() {
						return Err(VfsError::FormatError(format!(
							"file node cannot have children: {}",
							path
						)));
					}
					let content = desc.content.as_ref().ok_or_else(|| {
						VfsError::FormatError(format!("file node must have content: {}", path))
					})?;
					if content.len() as u64 > limits.max_file_size {
						return Err(VfsError::LimitExceeded(format!(
							"file size {} exceeds limit ({}): {}",
							content.len(),
							limits.max_file_size,
							path
						)));
					}
					self.insert_child(parent, Node::file(desc.name.clone(), content.clone()));
				}
				KIND_DIRECTORY => {
					if desc.content.is_some() {
						return Err(VfsError::FormatError(format!(
							"directory node cannot have content: {}",
							path
						)));
					}
					let children = desc.children.as_deref().ok_or_else(|| {
						VfsError::FormatError(format!(
							"directory node must have children: {}",
							path
						))
					})?;
					let dir = self.insert_child(parent, Node::directory(desc.name.clone()));
					self.build_children(dir, &path, children, depth + 1, limits)?;
				}
				other => {
					return Err(VfsError::FormatError(format!(
						"node must have type \"file\" or \"directory\", got \"{}\": {}",
						other, path
					)));
				}
			}
		}
		Ok(())
	}

	// -- Access -----------------------------------------------------------

	pub fn root(&self) -> NodeId {
		self.root
	}

	pub fn node(&self, id: NodeId) -> &Node {
		&self.slots[id.0]
	}

	pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
		&mut self.slots[id.0]
	}

	/// Children of a directory in storage order; empty for files.
	pub fn children(&self, id: NodeId) -> &[NodeId] {
		match &self.node(id).kind {
			NodeKind::Directory { children } => children.as_slice(),
			NodeKind::File { .. } => &[],
		}
	}

	/// Exact, case-sensitive match among a directory's children.
	pub fn child_named(&self, dir: NodeId, name: &str) -> Option<NodeId> {
		self.children(dir)
			.iter()
			.copied()
			.find(|&c| self.node(c).name == name)
	}

	/// Walk from the root. Every intermediate node must be a directory.
	pub fn lookup(&self, path: &AbsolutePath) -> Option<NodeId> {
		let mut current = self.root;
		for seg in path.segments() {
			if !self.node(current).is_dir() {
				return None;
			}
			current = self.child_named(current, seg)?;
		}
		Some(current)
	}

	/// Levels below `id`: 0 for a file or empty directory, 1 for a directory
	/// holding only leaves, and so on.
	pub fn subtree_height(&self, id: NodeId) -> usize {
		let mut height = 0;
		let mut stack = vec![(id, 0)];
		while let Some((current, level)) = stack.pop() {
			height = height.max(level);
			stack.extend(self.children(current).iter().map(|&c| (c, level + 1)));
		}
		height
	}

	/// Live nodes, root included.
	pub fn node_count(&self) -> usize {
		self.slots.len() - self.free.len()
	}

	// -- Mutation ---------------------------------------------------------

	fn alloc(&mut self, node: Node) -> NodeId {
		match self.free.pop() {
			Some(idx) => {
				self.slots[idx] = node;
				NodeId(idx)
			}
			None => {
				self.slots.push(node);
				NodeId(self.slots.len() - 1)
			}
		}
	}

	/// Allocate `node` and append it to `parent`'s children. `parent` must be
	/// a directory.
	pub fn insert_child(&mut self, parent: NodeId, node: Node) -> NodeId {
		let id = self.alloc(node);
		self.attach(parent, id);
		id
	}

	/// Append an already-allocated, detached node to `parent`.
	pub fn attach(&mut self, parent: NodeId, child: NodeId) {
		if let NodeKind::Directory { children } = &mut self.node_mut(parent).kind {
			children.push(child);
		}
	}

	/// Unlink `child` from `parent`, keeping the subtree allocated.
	/// Returns false if `child` was not a child of `parent`.
	pub fn detach(&mut self, parent: NodeId, child: NodeId) -> bool {
		if let NodeKind::Directory { children } = &mut self.node_mut(parent).kind {
			if let Some(pos) = children.iter().position(|&c| c == child) {
				children.remove(pos);
				return true;
			}
		}
		false
	}

	/// Free a detached node and its whole subtree.
	pub fn release(&mut self, id: NodeId) {
		let mut stack = vec![id];
		while let Some(current) = stack.pop() {
			let kind = std::mem::replace(
				&mut self.node_mut(current).kind,
				NodeKind::File {
					content: Vec::new(),
				},
			);
			if let NodeKind::Directory { children } = kind {
				stack.extend(children);
			}
			self.node_mut(current).name.clear();
			self.free.push(current.0);
		}
	}

	// -- Export -----------------------------------------------------------

	pub fn to_descriptor(&self, id: NodeId) -> NodeDescriptor {
		let node = self.node(id);
		match &node.kind {
			NodeKind::File { content } => NodeDescriptor::file(node.name.clone(), content.clone()),
			NodeKind::Directory { children } => NodeDescriptor::directory(
				node.name.clone(),
				children.iter().map(|&c| self.to_descriptor(c)).collect(),
			),
		}
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;
	use crate::descriptor::default_structure;
	use crate::path::{resolve, ParentPolicy};

	fn abs(p: &str) -> AbsolutePath {
		resolve(p, &AbsolutePath::root(), ParentPolicy::Clamp).unwrap()
	}

	fn default_tree() -> Tree {
		Tree::from_descriptors(&default_structure(), &VfsLimits::default()).unwrap()
	}

	#[test]
	fn root_resolves_directly() {
		let tree = Tree::new();
		assert_eq!(tree.lookup(&AbsolutePath::root()), Some(tree.root()));
		assert_eq!(tree.node_count(), 1);
	}

	#[test]
	fn lookup_walks_segments() {
		let tree = default_tree();
		let id = tree.lookup(&abs("/home/user/file1.txt")).unwrap();
		let node = tree.node(id);
		assert_eq!(node.name, "file1.txt");
		assert_eq!(
			node.kind,
			NodeKind::File {
				content: b"Hello from VFS!".to_vec()
			}
		);
		assert!(tree.lookup(&abs("/home/nope")).is_none());
	}

	#[test]
	fn lookup_through_file_fails() {
		let tree = default_tree();
		assert!(tree.lookup(&abs("/home/user/file1.txt/x")).is_none());
	}

	#[test]
	fn lookup_is_case_sensitive() {
		let tree = default_tree();
		assert!(tree.lookup(&abs("/Home")).is_none());
	}

	#[test]
	fn children_keep_insertion_order() {
		let tree = default_tree();
		let home = tree.lookup(&abs("/home")).unwrap();
		let names: Vec<&str> = tree
			.children(home)
			.iter()
			.map(|&c| tree.node(c).name.as_str())
			.collect();
		assert_eq!(names, vec!["user", "bin"]);
	}

	#[test]
	fn release_frees_whole_subtree_and_reuses_slots() {
		let mut tree = default_tree();
		assert_eq!(tree.node_count(), 6);
		let home = tree.lookup(&abs("/home")).unwrap();
		let user = tree.lookup(&abs("/home/user")).unwrap();
		assert!(tree.detach(home, user));
		tree.release(user);
		assert_eq!(tree.node_count(), 3);
		assert!(tree.lookup(&abs("/home/user")).is_none());

		let tmp = tree.insert_child(home, Node::directory("tmp"));
		assert_eq!(tree.node_count(), 4);
		assert_eq!(tree.lookup(&abs("/home/tmp")), Some(tmp));
	}

	#[test]
	fn subtree_height_counts_levels_below() {
		let tree = default_tree();
		assert_eq!(tree.subtree_height(tree.root()), 3);
		assert_eq!(tree.subtree_height(tree.lookup(&abs("/home")).unwrap()), 2);
		assert_eq!(tree.subtree_height(tree.lookup(&abs("/home/bin")).unwrap()), 0);
		assert_eq!(
			tree.subtree_height(tree.lookup(&abs("/home/user/file1.txt")).unwrap()),
			0
		);
	}

	#[test]
	fn detach_unknown_child_is_noop() {
		let mut tree = default_tree();
		let bin = tree.lookup(&abs("/home/bin")).unwrap();
		let user = tree.lookup(&abs("/home/user")).unwrap();
		assert!(!tree.detach(bin, user));
	}

	#[test]
	fn descriptors_round_trip() {
		let tree = default_tree();
		let exported: Vec<NodeDescriptor> = tree
			.children(tree.root())
			.iter()
			.map(|&c| tree.to_descriptor(c))
			.collect();
		assert_eq!(exported, default_structure());
	}

	#[test]
	fn rejects_unknown_kind() {
		let mut bad = NodeDescriptor::file("x", "y");
		bad.kind = "symlink".into();
		let err = Tree::from_descriptors(&[bad], &VfsLimits::default()).unwrap_err();
		assert!(matches!(err, VfsError::FormatError(_)));
	}

	#[test]
	fn rejects_empty_name() {
		let err = Tree::from_descriptors(
			&[NodeDescriptor::directory("", Vec::new())],
			&VfsLimits::default(),
		)
		.unwrap_err();
		assert!(matches!(err, VfsError::FormatError(_)));
	}

	#[test]
	fn rejects_file_without_content() {
		let mut bad = NodeDescriptor::file("x", "");
		bad.content = None;
		let err = Tree::from_descriptors(&[bad], &VfsLimits::default()).unwrap_err();
		assert!(matches!(err, VfsError::FormatError(_)));
	}

	#[test]
	fn rejects_directory_without_children() {
		let mut bad = NodeDescriptor::directory("d", Vec::new());
		bad.children = None;
		let err = Tree::from_descriptors(&[bad], &VfsLimits::default()).unwrap_err();
		assert!(matches!(err, VfsError::FormatError(_)));
	}

	#[test]
	fn rejects_duplicate_siblings() {
		let err = Tree::from_descriptors(
			&[
				NodeDescriptor::file("a", "1"),
				NodeDescriptor::directory("a", Vec::new()),
			],
			&VfsLimits::default(),
		)
		.unwrap_err();
		assert!(matches!(err, VfsError::FormatError(_)));
	}

	#[test]
	fn rejects_too_deep_trees() {
		let limits = VfsLimits {
			max_path_depth: 2,
			..VfsLimits::default()
		};
		let deep = vec![NodeDescriptor::directory(
			"a",
			vec![NodeDescriptor::directory(
				"b",
				vec![NodeDescriptor::directory("c", Vec::new())],
			)],
		)];
		let err = Tree::from_descriptors(&deep, &limits).unwrap_err();
		assert!(matches!(err, VfsError::LimitExceeded(_)));
	}
}
