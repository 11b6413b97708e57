// ---------------------------------------------------------------------------
// VfsServer: JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Routes JSON-RPC 2.0 requests (NDJSON over stdin) to a single VirtualFs
// session. `initialize` (re)creates the session; everything else runs
// against it and fails with VFS_NOT_LOADED until then.
// ---------------------------------------------------------------------------

use std::io::{self, BufRead, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;

use crate::config::VfsConfig;
use crate::error::VfsError;
use crate::loader;
use crate::protocol::*;
use crate::transport::NdjsonTransport;
use crate::vfs::VirtualFs;

// ---------------------------------------------------------------------------
// Handler failures
// ---------------------------------------------------------------------------

enum Failure {
	InvalidParams(String),
	Vfs(VfsError),
}

impl From<VfsError> for Failure {
	fn from(e: VfsError) -> Self {
		Self::Vfs(e)
	}
}

type HandlerResult = Result<serde_json::Value, Failure>;

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub struct VfsServer<W: Write = io::Stdout> {
	transport: NdjsonTransport<W>,
	/// Settings `initialize` starts from before applying its own params.
	base_config: VfsConfig,
	vfs: VirtualFs,
}

impl<W: Write> VfsServer<W> {
	pub fn new(transport: NdjsonTransport<W>, base_config: VfsConfig) -> Self {
		Self {
			transport,
			vfs: VirtualFs::new(base_config.clone()),
			base_config,
		}
	}

	/// Main loop: read JSON-RPC messages from stdin, dispatch to handlers.
	pub fn run(&mut self) -> Result<(), VfsError> {
		let stdin = io::stdin();
		self.serve(stdin.lock())
	}

	pub fn serve<R: BufRead>(&mut self, reader: R) -> Result<(), VfsError> {
		for line_result in reader.lines() {
			let line = line_result?;
			self.handle_line(&line);
		}
		Ok(())
	}

	/// Process one NDJSON line. Blank lines are ignored.
	pub fn handle_line(&mut self, line: &str) {
		let trimmed = line.trim();
		if trimmed.is_empty() {
			return;
		}
		match serde_json::from_str::<JsonRpcRequest>(trimmed) {
			Ok(req) => self.dispatch(req),
			Err(e) => {
				tracing::warn!("Parse error: {}", e);
				self.transport
					.write_error(0, PARSE_ERROR, "Parse error: invalid JSON", None);
			}
		}
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		tracing::debug!(id, method = %req.method, "request");

		let vfs = &mut self.vfs;
		let result = match req.method.as_str() {
			"initialize" => {
				handle_initialize(&self.base_config, req.params).map(|(session, value)| {
					self.vfs = session;
					value
				})
			}

			// -- Queries ---------------------------------------------------
			"vfs/list" => handle_list(vfs, req.params),
			"vfs/readdir" => handle_readdir(vfs, req.params),
			"vfs/readFile" => handle_read_file(vfs, req.params),
			"vfs/pwd" => vfs
				.current_directory()
				.map(|cwd| serde_json::json!({ "cwd": cwd }))
				.map_err(Failure::from),
			"vfs/stat" => handle_stat(vfs, req.params),
			"vfs/exists" => handle_exists(vfs, req.params),
			"vfs/snapshot" => vfs
				.snapshot()
				.map(|descs| loader::to_document(&descs))
				.map_err(Failure::from),
			"vfs/metrics" => vfs
				.metrics()
				.map_err(Failure::from)
				.and_then(|m| to_json(&MetricsResponse::from(m))),

			// -- Cursor ----------------------------------------------------
			"vfs/cd" => handle_cd(vfs, req.params),

			// -- Mutation --------------------------------------------------
			"vfs/mkdir" => handle_mkdir(vfs, req.params),
			"vfs/touch" => handle_touch(vfs, req.params),
			"vfs/delete" => handle_delete(vfs, req.params),
			"vfs/rmdir" => handle_rmdir(vfs, req.params),
			"vfs/move" => handle_move(vfs, req.params),

			// -- Unknown ---------------------------------------------------
			_ => {
				self.transport.write_error(
					id,
					METHOD_NOT_FOUND,
					format!("Unknown method: {}", req.method),
					None,
				);
				return;
			}
		};

		match result {
			Ok(value) => self.transport.write_response(id, value),
			Err(Failure::InvalidParams(msg)) => {
				self.transport.write_error(id, INVALID_PARAMS, msg, None)
			}
			Err(Failure::Vfs(e)) => {
				tracing::debug!(id, code = e.code(), "{}", e);
				self.transport.write_error(
					id,
					VFS_ERROR,
					e.to_string(),
					Some(e.to_json_rpc_error()),
				)
			}
		}
	}
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_params<T: serde::de::DeserializeOwned>(
	params: serde_json::Value,
) -> Result<T, Failure> {
	let params = if params.is_null() {
		serde_json::json!({})
	} else {
		params
	};
	serde_json::from_value(params)
		.map_err(|e| Failure::InvalidParams(format!("Invalid params: {}", e)))
}

fn to_json<T: Serialize>(value: &T) -> HandlerResult {
	serde_json::to_value(value).map_err(|e| Failure::Vfs(e.into()))
}

fn ok() -> HandlerResult {
	Ok(serde_json::json!({}))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_initialize(
	base: &VfsConfig,
	params: serde_json::Value,
) -> Result<(VirtualFs, serde_json::Value), Failure> {
	let p: InitializeParams = parse_params(params)?;

	let mut config = base.clone();
	if let Some(limits) = &p.limits {
		config.limits = limits.apply(config.limits);
	}
	if let Some(policy) = p.parent_policy {
		config.parent_policy = policy;
	}

	let mut vfs = VirtualFs::new(config);
	match p.document {
		Some(doc) => vfs.load_from(&loader::parse_value(doc)?)?,
		None => vfs.load_default(),
	}

	let metrics = vfs.metrics()?;
	Ok((
		vfs,
		serde_json::json!({ "cwd": "/", "nodeCount": metrics.node_count }),
	))
}

fn handle_list(vfs: &VirtualFs, params: serde_json::Value) -> HandlerResult {
	let p: OptionalPathParams = parse_params(params)?;
	let entries = vfs.list(p.path.as_deref())?;
	to_json(&ListResult {
		text: entries.join(crate::vfs::LIST_SEPARATOR),
		entries,
	})
}

fn handle_readdir(vfs: &VirtualFs, params: serde_json::Value) -> HandlerResult {
	let p: OptionalPathParams = parse_params(params)?;
	let entries: Vec<DirEntry> = vfs
		.read_dir(p.path.as_deref())?
		.into_iter()
		.map(DirEntry::from)
		.collect();
	Ok(serde_json::json!({ "entries": to_json(&entries)? }))
}

fn handle_read_file(vfs: &VirtualFs, params: serde_json::Value) -> HandlerResult {
	let p: PathParams = parse_params(params)?;
	let bytes = vfs.read_file(&p.path)?;
	let result = match std::str::from_utf8(bytes) {
		Ok(text) => ReadFileResult {
			content_type: "text".to_string(),
			text: Some(text.to_string()),
			data: None,
			size: bytes.len() as u64,
		},
		Err(_) => ReadFileResult {
			content_type: "binary".to_string(),
			text: None,
			data: Some(BASE64.encode(bytes)),
			size: bytes.len() as u64,
		},
	};
	to_json(&result)
}

fn handle_stat(vfs: &VirtualFs, params: serde_json::Value) -> HandlerResult {
	let p: PathParams = parse_params(params)?;
	to_json(&StatResponse::from(vfs.stat(&p.path)?))
}

fn handle_exists(vfs: &VirtualFs, params: serde_json::Value) -> HandlerResult {
	let p: PathParams = parse_params(params)?;
	Ok(serde_json::json!({ "exists": vfs.exists(&p.path)? }))
}

fn handle_cd(vfs: &mut VirtualFs, params: serde_json::Value) -> HandlerResult {
	let p: PathParams = parse_params(params)?;
	vfs.change_directory(&p.path)?;
	Ok(serde_json::json!({ "cwd": vfs.current_directory()? }))
}

fn handle_mkdir(vfs: &mut VirtualFs, params: serde_json::Value) -> HandlerResult {
	let p: MkdirParams = parse_params(params)?;
	vfs.create_directory(&p.path, p.recursive.unwrap_or(false))?;
	ok()
}

fn handle_touch(vfs: &mut VirtualFs, params: serde_json::Value) -> HandlerResult {
	let p: TouchParams = parse_params(params)?;
	let content = p.content.unwrap_or_default();
	let bytes = match p.content_type.as_deref() {
		None | Some("text") => content.into_bytes(),
		Some("binary") => BASE64
			.decode(content.trim())
			.map_err(|_| Failure::InvalidParams("Invalid base64 content".to_string()))?,
		Some(other) => {
			return Err(Failure::InvalidParams(format!(
				"Unsupported contentType: {}",
				other
			)))
		}
	};
	vfs.create_file(&p.path, bytes)?;
	ok()
}

fn handle_delete(vfs: &mut VirtualFs, params: serde_json::Value) -> HandlerResult {
	let p: DeleteParams = parse_params(params)?;
	vfs.delete(&p.path, p.recursive.unwrap_or(false))?;
	ok()
}

fn handle_rmdir(vfs: &mut VirtualFs, params: serde_json::Value) -> HandlerResult {
	let p: PathParams = parse_params(params)?;
	vfs.delete_directory(&p.path)?;
	ok()
}

fn handle_move(vfs: &mut VirtualFs, params: serde_json::Value) -> HandlerResult {
	let p: MoveParams = parse_params(params)?;
	vfs.move_node(&p.from, &p.to, p.rename_mode.unwrap_or(false))?;
	ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use serde_json::{json, Value};

	use super::*;

	fn server() -> VfsServer<Vec<u8>> {
		VfsServer::new(NdjsonTransport::with_writer(Vec::new()), VfsConfig::default())
	}

	/// Send one request and return the single response line it produced.
	fn send(server: &mut VfsServer<Vec<u8>>, method: &str, params: Value) -> Value {
		let line = json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params});
		server.handle_line(&line.to_string());
		let out = std::mem::take(server.transport.get_mut());
		serde_json::from_slice(&out).unwrap()
	}

	fn initialized() -> VfsServer<Vec<u8>> {
		let mut s = server();
		let resp = send(&mut s, "initialize", json!({}));
		assert_eq!(resp["result"]["nodeCount"], 6);
		s
	}

	#[test]
	fn queries_before_initialize_fail() {
		let mut s = server();
		let resp = send(&mut s, "vfs/pwd", Value::Null);
		assert_eq!(resp["error"]["code"], VFS_ERROR);
		assert_eq!(resp["error"]["data"]["vfsCode"], "VFS_NOT_LOADED");
	}

	#[test]
	fn list_returns_entries_and_text() {
		let mut s = initialized();
		let resp = send(&mut s, "vfs/list", json!({"path": "/home/user"}));
		assert_eq!(
			resp["result"]["entries"],
			json!([".", "..", "file1.txt", "file2.txt"])
		);
		assert_eq!(resp["result"]["text"], ".\t..\tfile1.txt\tfile2.txt");
	}

	#[test]
	fn cd_moves_cursor() {
		let mut s = initialized();
		let resp = send(&mut s, "vfs/cd", json!({"path": "home/user"}));
		assert_eq!(resp["result"]["cwd"], "/home/user");
		let resp = send(&mut s, "vfs/readFile", json!({"path": "file1.txt"}));
		assert_eq!(resp["result"]["contentType"], "text");
		assert_eq!(resp["result"]["text"], "Hello from VFS!");
		assert_eq!(resp["result"]["size"], 15);
	}

	#[test]
	fn binary_content_is_base64() {
		let mut s = initialized();
		send(
			&mut s,
			"vfs/touch",
			json!({"path": "/home/bin/blob", "content": "/wA=", "contentType": "binary"}),
		);
		let resp = send(&mut s, "vfs/readFile", json!({"path": "/home/bin/blob"}));
		assert_eq!(resp["result"]["contentType"], "binary");
		assert_eq!(resp["result"]["data"], "/wA=");
		assert!(resp["result"].get("text").is_none());
	}

	#[test]
	fn vfs_errors_carry_code() {
		let mut s = initialized();
		let resp = send(&mut s, "vfs/mkdir", json!({"path": "/tmp/a/b"}));
		assert_eq!(resp["error"]["code"], VFS_ERROR);
		assert_eq!(resp["error"]["data"]["vfsCode"], "VFS_DIRECTORY_NOT_FOUND");
		assert_eq!(resp["error"]["message"], "no such directory: /tmp");
	}

	#[test]
	fn bad_params_are_invalid_params() {
		let mut s = initialized();
		let resp = send(&mut s, "vfs/move", json!({"from": "/home"}));
		assert_eq!(resp["error"]["code"], INVALID_PARAMS);
	}

	#[test]
	fn unknown_method() {
		let mut s = initialized();
		let resp = send(&mut s, "vfs/format", json!({}));
		assert_eq!(resp["error"]["code"], METHOD_NOT_FOUND);
	}

	#[test]
	fn malformed_json_is_parse_error() {
		let mut s = server();
		s.handle_line("{ not json");
		let out = std::mem::take(s.transport.get_mut());
		let resp: Value = serde_json::from_slice(&out).unwrap();
		assert_eq!(resp["error"]["code"], PARSE_ERROR);
		assert_eq!(resp["id"], 0);
	}

	#[test]
	fn blank_lines_produce_nothing() {
		let mut s = server();
		s.handle_line("   ");
		assert!(s.transport.get_mut().is_empty());
	}

	#[test]
	fn initialize_with_document_and_strict_policy() {
		let mut s = server();
		let resp = send(
			&mut s,
			"initialize",
			json!({
				"parentPolicy": "reject",
				"document": {"vfs": [{"name": "etc", "type": "directory", "children": []}]}
			}),
		);
		assert_eq!(resp["result"]["nodeCount"], 2);
		let resp = send(&mut s, "vfs/cd", json!({"path": "../.."}));
		assert_eq!(resp["error"]["data"]["vfsCode"], "VFS_PATH_ESCAPES_ROOT");
	}

	#[test]
	fn failed_initialize_keeps_session() {
		let mut s = initialized();
		let resp = send(&mut s, "initialize", json!({"document": {"nodes": []}}));
		assert_eq!(resp["error"]["data"]["vfsCode"], "VFS_FORMAT_ERROR");
		let resp = send(&mut s, "vfs/exists", json!({"path": "/home/user"}));
		assert_eq!(resp["result"]["exists"], true);
	}

	#[test]
	fn snapshot_feeds_initialize() {
		let mut s = initialized();
		send(&mut s, "vfs/move", json!({"from": "/home/user", "to": "/home/admin", "renameMode": true}));
		let snap = send(&mut s, "vfs/snapshot", Value::Null)["result"].clone();

		let mut other = server();
		send(&mut other, "initialize", json!({"document": snap}));
		let resp = send(&mut other, "vfs/stat", json!({"path": "/home/admin"}));
		assert_eq!(resp["result"]["type"], "directory");
		assert_eq!(resp["result"]["childCount"], 2);
	}

	#[test]
	fn serve_reads_every_line() {
		let mut s = server();
		let input = concat!(
			"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\"}\n",
			"\n",
			"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"vfs/metrics\"}\n",
		);
		s.serve(input.as_bytes()).unwrap();
		let out = String::from_utf8(s.transport.into_inner()).unwrap();
		let lines: Vec<Value> = out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
		assert_eq!(lines.len(), 2);
		assert_eq!(lines[1]["id"], 2);
		assert_eq!(lines[1]["result"]["fileCount"], 2);
		assert_eq!(lines[1]["result"]["totalSize"], 38);
	}
}
