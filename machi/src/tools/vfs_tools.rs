//! `vfs.read` / `vfs.write`: the agent's own scratchpad, exposed as tools.

use std::sync::Arc;

use crate::{
    tool::{ToolDescriptor, ToolRegistration, ToolResult},
    vfs::Vfs,
};

/// Build the `vfs.read` descriptor + registration pair.
#[must_use]
pub fn register_read(vfs: Arc<Vfs>) -> (ToolDescriptor, ToolRegistration) {
    let descriptor = ToolDescriptor::builtin("vfs.read", "vfs.read")
        .with_description("Read the current content of a path in the workspace filesystem.")
        .with_input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "The path to read" }
            },
            "required": ["path"]
        }))
        .with_permission("vfs.read");

    let registration = ToolRegistration::builtin(move |args| {
        let vfs = vfs.clone();
        async move {
            let Some(path) = args.get("path").and_then(|v| v.as_str()) else {
                return ToolResult::err("missing required argument `path`");
            };
            match vfs.read(path) {
                Some(content) => ToolResult::ok(serde_json::json!({ "content": String::from_utf8_lossy(&content) })),
                None => ToolResult::err(format!("no such path: {path}")),
            }
        }
    });

    (descriptor, registration)
}

/// Build the `vfs.write` descriptor + registration pair.
#[must_use]
pub fn register_write(vfs: Arc<Vfs>) -> (ToolDescriptor, ToolRegistration) {
    let descriptor = ToolDescriptor::builtin("vfs.write", "vfs.write")
        .with_description("Write content to a path in the workspace filesystem, creating a new version.")
        .with_input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "The path to write" },
                "content": { "type": "string", "description": "The content to write" }
            },
            "required": ["path", "content"]
        }))
        .with_permission("vfs.write");

    let registration = ToolRegistration::builtin(move |args| {
        let vfs = vfs.clone();
        async move {
            let Some(path) = args.get("path").and_then(|v| v.as_str()) else {
                return ToolResult::err("missing required argument `path`");
            };
            let Some(content) = args.get("content").and_then(|v| v.as_str()) else {
                return ToolResult::err("missing required argument `content`");
            };
            let version = vfs.write(path, content.as_bytes().to_vec(), Some("agent"));
            ToolResult::ok(serde_json::json!({ "versionId": version.id }))
        }
    });

    (descriptor, registration)
}
