// ---------------------------------------------------------------------------
// VirtualFs: session facade over the node store
//
// Owns the tree and the working-directory cursor. Every operation resolves
// its paths first, validates everything, and only then mutates, so a failure
// never leaves a partial change behind.
// ---------------------------------------------------------------------------

use crate::config::VfsConfig;
use crate::descriptor::{default_structure, NodeDescriptor};
use crate::error::VfsError;
use crate::path::{resolve, AbsolutePath};
use crate::tree::{Node, NodeId, NodeKind, NodeType, Tree};

/// Separator used by [`VirtualFs::list_directory`].
pub const LIST_SEPARATOR: &str = "\t";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// What to create at the final path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTemplate {
	Directory,
	File(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
	Default,
	External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatResult {
	pub path: String,
	pub name: String,
	pub node_type: NodeType,
	pub size: u64,
	pub child_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryResult {
	pub name: String,
	pub node_type: NodeType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsResult {
	pub node_count: usize,
	pub file_count: usize,
	pub directory_count: usize,
	pub total_size: u64,
}

// ---------------------------------------------------------------------------
// VirtualFs
// ---------------------------------------------------------------------------

pub struct VirtualFs {
	tree: Option<Tree>,
	cwd: AbsolutePath,
	config: VfsConfig,
}

impl Default for VirtualFs {
	fn default() -> Self {
		Self::new(VfsConfig::default())
	}
}

impl VirtualFs {
	/// An unloaded session. Every query fails with `NotLoaded` until one of
	/// the `load_*` methods installs a tree.
	pub fn new(config: VfsConfig) -> Self {
		Self {
			tree: None,
			cwd: AbsolutePath::root(),
			config,
		}
	}

	// -- Loading ----------------------------------------------------------

	pub fn load_default(&mut self) {
		// The built-in structure is well-formed; an empty root is the only
		// sensible fallback if custom limits reject it.
		let tree = Tree::from_descriptors(&default_structure(), &self.config.limits)
			.unwrap_or_else(|e| {
				tracing::warn!("Default tree rejected by limits: {}", e);
				Tree::new()
			});
		self.install(tree);
	}

	/// Validate `descriptors` completely, then replace the current tree.
	/// On failure the session is left untouched.
	pub fn load_from(&mut self, descriptors: &[NodeDescriptor]) -> Result<(), VfsError> {
		let tree = Tree::from_descriptors(descriptors, &self.config.limits)?;
		self.install(tree);
		Ok(())
	}

	/// Install an externally decoded tree, falling back to the default tree
	/// when decoding or validation failed.
	pub fn load_or_default(
		&mut self,
		descriptors: Result<Vec<NodeDescriptor>, VfsError>,
	) -> LoadSource {
		match descriptors.and_then(|d| self.load_from(&d)) {
			Ok(()) => LoadSource::External,
			Err(e) => {
				tracing::warn!("VFS loading error, using default tree: {}", e);
				self.load_default();
				LoadSource::Default
			}
		}
	}

	fn install(&mut self, tree: Tree) {
		tracing::info!(nodes = tree.node_count(), "VFS tree loaded");
		self.tree = Some(tree);
		self.cwd = AbsolutePath::root();
	}

	// -- Helpers (private) ------------------------------------------------

	fn tree(&self) -> Result<&Tree, VfsError> {
		self.tree.as_ref().ok_or(VfsError::NotLoaded)
	}

	fn tree_mut(&mut self) -> Result<&mut Tree, VfsError> {
		self.tree.as_mut().ok_or(VfsError::NotLoaded)
	}

	/// Normalize `path` against the cursor.
	pub fn resolve(&self, path: &str) -> Result<AbsolutePath, VfsError> {
		resolve(path, &self.cwd, self.config.parent_policy)
	}

	fn resolve_or_cwd(&self, path: Option<&str>) -> Result<AbsolutePath, VfsError> {
		match path {
			Some(p) => self.resolve(p),
			None => Ok(self.cwd.clone()),
		}
	}

	fn assert_directory(&self, target: &AbsolutePath) -> Result<NodeId, VfsError> {
		let tree = self.tree()?;
		tree.lookup(target)
			.filter(|&id| tree.node(id).is_dir())
			.ok_or_else(|| VfsError::DirectoryNotFound(target.to_string()))
	}

	fn assert_exists(&self, target: &AbsolutePath) -> Result<NodeId, VfsError> {
		self.tree()?
			.lookup(target)
			.ok_or_else(|| VfsError::FileOrDirectoryNotFound(target.to_string()))
	}

	/// The cursor must always resolve to a directory, so nothing on the path
	/// from the root down to it may be removed or relocated.
	fn assert_not_busy(&self, target: &AbsolutePath) -> Result<(), VfsError> {
		if target.is_ancestor_or_equal(&self.cwd) {
			return Err(VfsError::DirectoryIsBusy(target.to_string()));
		}
		Ok(())
	}

	fn assert_name_length(&self, name: &str, path: &AbsolutePath) -> Result<(), VfsError> {
		let max = self.config.limits.max_name_length;
		if name.len() > max {
			return Err(VfsError::LimitExceeded(format!(
				"name exceeds max length ({}): {}",
				max, path
			)));
		}
		Ok(())
	}

	// -- Queries ----------------------------------------------------------

	/// `.`, then `..` unless the target is the root, then child names in
	/// storage order.
	pub fn list(&self, path: Option<&str>) -> Result<Vec<String>, VfsError> {
		let target = self.resolve_or_cwd(path)?;
		let id = self.assert_directory(&target)?;
		let tree = self.tree()?;

		let mut names = vec![".".to_string()];
		if !target.is_root() {
			names.push("..".to_string());
		}
		names.extend(tree.children(id).iter().map(|&c| tree.node(c).name.clone()));
		Ok(names)
	}

	/// [`list`](Self::list) joined with [`LIST_SEPARATOR`].
	pub fn list_directory(&self, path: Option<&str>) -> Result<String, VfsError> {
		Ok(self.list(path)?.join(LIST_SEPARATOR))
	}

	/// Typed children of a directory, without `.` and `..`.
	pub fn read_dir(&self, path: Option<&str>) -> Result<Vec<DirEntryResult>, VfsError> {
		let target = self.resolve_or_cwd(path)?;
		let id = self.assert_directory(&target)?;
		let tree = self.tree()?;
		Ok(tree
			.children(id)
			.iter()
			.map(|&c| {
				let node = tree.node(c);
				DirEntryResult {
					name: node.name.clone(),
					node_type: node.node_type(),
				}
			})
			.collect())
	}

	pub fn read_file(&self, path: &str) -> Result<&[u8], VfsError> {
		let target = self.resolve(path)?;
		let tree = self.tree()?;
		match tree.lookup(&target).map(|id| &tree.node(id).kind) {
			Some(NodeKind::File { content }) => Ok(content),
			_ => Err(VfsError::FileNotFound(target.to_string())),
		}
	}

	/// File content as text; invalid UTF-8 is replaced.
	pub fn cat_file(&self, path: &str) -> Result<String, VfsError> {
		Ok(String::from_utf8_lossy(self.read_file(path)?).into_owned())
	}

	/// The only way the cursor moves.
	pub fn change_directory(&mut self, path: &str) -> Result<(), VfsError> {
		let target = self.resolve(path)?;
		self.assert_directory(&target)?;
		tracing::debug!(from = %self.cwd, to = %target, "cd");
		self.cwd = target;
		Ok(())
	}

	pub fn current_directory(&self) -> Result<String, VfsError> {
		self.tree()?;
		Ok(self.cwd.to_string())
	}

	pub fn stat(&self, path: &str) -> Result<StatResult, VfsError> {
		let target = self.resolve(path)?;
		let id = self.assert_exists(&target)?;
		let tree = self.tree()?;
		let node = tree.node(id);
		let (size, child_count) = match &node.kind {
			NodeKind::File { content } => (content.len() as u64, 0),
			NodeKind::Directory { children } => (0, children.len()),
		};
		Ok(StatResult {
			path: target.to_string(),
			name: node.name.clone(),
			node_type: node.node_type(),
			size,
			child_count,
		})
	}

	pub fn exists(&self, path: &str) -> Result<bool, VfsError> {
		let target = self.resolve(path)?;
		Ok(self.tree()?.lookup(&target).is_some())
	}

	pub fn metrics(&self) -> Result<MetricsResult, VfsError> {
		let tree = self.tree()?;
		let mut m = MetricsResult::default();
		let mut stack = vec![tree.root()];
		while let Some(id) = stack.pop() {
			m.node_count += 1;
			match &tree.node(id).kind {
				NodeKind::File { content } => {
					m.file_count += 1;
					m.total_size += content.len() as u64;
				}
				NodeKind::Directory { children } => {
					m.directory_count += 1;
					stack.extend(children.iter().copied());
				}
			}
		}
		Ok(m)
	}

	/// The whole tree as descriptors, suitable for [`load_from`](Self::load_from).
	pub fn snapshot(&self) -> Result<Vec<NodeDescriptor>, VfsError> {
		let tree = self.tree()?;
		Ok(tree
			.children(tree.root())
			.iter()
			.map(|&c| tree.to_descriptor(c))
			.collect())
	}

	// -- Mutation ---------------------------------------------------------

	/// Create a node at `path`. With `recursive`, missing intermediate
	/// directories are synthesized; otherwise they fail `DirectoryNotFound`.
	pub fn create(
		&mut self,
		path: &str,
		template: NodeTemplate,
		recursive: bool,
	) -> Result<(), VfsError> {
		let target = self.resolve(path)?;
		let limits = self.config.limits.clone();
		let tree = self.tree()?;

		let Some((name, intermediates)) = target.segments().split_last() else {
			return Err(VfsError::DirectoryAlreadyExists(target.to_string()));
		};

		// Walk the existing prefix; `missing` is where synthesis would start.
		let mut parent = tree.root();
		let mut walked = AbsolutePath::root();
		let mut missing = None;
		for (i, seg) in intermediates.iter().enumerate() {
			walked = walked.join(seg);
			match tree.child_named(parent, seg) {
				Some(id) if tree.node(id).is_dir() => parent = id,
				Some(_) => return Err(VfsError::DirectoryNotFound(walked.to_string())),
				None if recursive => {
					missing = Some(i);
					break;
				}
				None => return Err(VfsError::DirectoryNotFound(walked.to_string())),
			}
		}

		if missing.is_none() {
			if let Some(existing) = tree.child_named(parent, name) {
				return Err(match tree.node(existing).node_type() {
					NodeType::Directory => VfsError::DirectoryAlreadyExists(target.to_string()),
					NodeType::File => VfsError::FileAlreadyExists(target.to_string()),
				});
			}
		}

		if target.depth() > limits.max_path_depth {
			return Err(VfsError::LimitExceeded(format!(
				"path exceeds max depth ({}): {}",
				limits.max_path_depth, target
			)));
		}
		let new_segments = &target.segments()[missing.unwrap_or(intermediates.len())..];
		for seg in new_segments {
			self.assert_name_length(seg, &target)?;
		}
		if tree.node_count() + new_segments.len() > limits.max_node_count {
			return Err(VfsError::LimitExceeded(format!(
				"maximum node count exceeded ({})",
				limits.max_node_count
			)));
		}
		if let NodeTemplate::File(content) = &template {
			if content.len() as u64 > limits.max_file_size {
				return Err(VfsError::LimitExceeded(format!(
					"file size {} exceeds limit ({}): {}",
					content.len(),
					limits.max_file_size,
					target
				)));
			}
		}

		// Validation passed, commit
		let tree = self.tree_mut()?;
		if let Some(start) = missing {
			for seg in &intermediates[start..] {
				parent = tree.insert_child(parent, Node::directory(seg.clone()));
			}
		}
		let node = match template {
			NodeTemplate::Directory => Node::directory(name.clone()),
			NodeTemplate::File(content) => Node::file(name.clone(), content),
		};
		tree.insert_child(parent, node);

		tracing::debug!(path = %target, recursive, "create");
		Ok(())
	}

	pub fn create_directory(&mut self, path: &str, recursive: bool) -> Result<(), VfsError> {
		self.create(path, NodeTemplate::Directory, recursive)
	}

	/// Create a file whose parent directory must already exist.
	pub fn create_file(&mut self, path: &str, content: impl Into<Vec<u8>>) -> Result<(), VfsError> {
		self.create(path, NodeTemplate::File(content.into()), false)
	}

	/// Remove a file or directory. Non-empty directories need `recursive`.
	pub fn delete(&mut self, path: &str, recursive: bool) -> Result<(), VfsError> {
		let target = self.resolve(path)?;
		let id = self.assert_exists(&target)?;
		self.assert_not_busy(&target)?;

		let tree = self.tree()?;
		if !recursive && !tree.children(id).is_empty() {
			return Err(VfsError::DirectoryNotEmpty(target.to_string()));
		}
		let parent = self.assert_directory(&target.parent()?)?;

		let tree = self.tree_mut()?;
		tree.detach(parent, id);
		tree.release(id);

		tracing::debug!(path = %target, recursive, "delete");
		Ok(())
	}

	/// Remove an empty directory; files are rejected.
	pub fn delete_directory(&mut self, path: &str) -> Result<(), VfsError> {
		let target = self.resolve(path)?;
		self.assert_directory(&target)?;
		self.delete(&target.to_string(), false)
	}

	/// Relocate a node.
	///
	/// With `rename_mode`, `to` is a literal destination: if it does not
	/// exist the node is moved into its parent under `to`'s base name; if it
	/// is a directory the node moves into it keeping its name. Without
	/// `rename_mode`, `to` must be an existing directory.
	pub fn move_node(&mut self, from: &str, to: &str, rename_mode: bool) -> Result<(), VfsError> {
		let source = self.resolve(from)?;
		let dest = self.resolve(to)?;
		let src_id = self.assert_exists(&source)?;
		self.assert_not_busy(&source)?;

		let tree = self.tree()?;
		let src_node = tree.node(src_id);

		let (container, name) = if rename_mode {
			match tree.lookup(&dest) {
				Some(id) if tree.node(id).is_file() => {
					return Err(VfsError::FileAlreadyExists(dest.to_string()));
				}
				Some(_) => {
					let inner = dest.join(&src_node.name);
					if tree.lookup(&inner).is_some() {
						return Err(VfsError::FileAlreadyExists(inner.to_string()));
					}
					(dest.clone(), src_node.name.clone())
				}
				None => {
					let parent = dest.parent()?;
					self.assert_directory(&parent)?;
					(parent, dest.base_name().to_string())
				}
			}
		} else {
			self.assert_directory(&dest)?;
			let inner = dest.join(&src_node.name);
			if tree.lookup(&inner).is_some() {
				return Err(VfsError::FileOrDirectoryAlreadyExists(inner.to_string()));
			}
			(dest.clone(), src_node.name.clone())
		};

		if src_node.is_dir() && source.is_ancestor_or_equal(&container) {
			return Err(VfsError::MoveIntoItself {
				from: source.to_string(),
				to: dest.to_string(),
			});
		}
		let final_path = container.join(&name);
		self.assert_name_length(&name, &final_path)?;
		// Every descendant moves with the node, so the deepest one decides.
		let max_depth = self.config.limits.max_path_depth;
		if final_path.depth() + tree.subtree_height(src_id) > max_depth {
			return Err(VfsError::LimitExceeded(format!(
				"path exceeds max depth ({}): {}",
				max_depth, final_path
			)));
		}

		let old_parent = self.assert_directory(&source.parent()?)?;
		let new_parent = self.assert_directory(&container)?;

		// Validation passed, relink in one step
		let tree = self.tree_mut()?;
		tree.detach(old_parent, src_id);
		tree.node_mut(src_id).name = name;
		tree.attach(new_parent, src_id);

		tracing::debug!(from = %source, to = %final_path, rename_mode, "move");
		Ok(())
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
