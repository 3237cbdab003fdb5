//! `machi tools:list` and `machi tools:docs`.

use std::{path::Path, sync::Arc};

use machi::{
    bus::EventBus,
    tool::{ToolDescriptor, ToolEngine},
    vfs::Vfs,
};

use crate::error::CliError;

fn default_engine() -> ToolEngine {
    let bus = Arc::new(EventBus::default());
    let engine = ToolEngine::new(Arc::clone(&bus));
    let vfs = Arc::new(Vfs::new(bus));
    machi::tools::register_builtins(&engine, vfs);
    engine
}

/// Print every registered tool's id and description, one per line.
///
/// # Errors
///
/// Currently infallible; returns `Result` for symmetry with the other
/// commands and to leave room for a future registry that can fail to load.
pub fn tools_list() -> Result<(), CliError> {
    for descriptor in default_engine().list() {
        println!("{}\t{}", descriptor.id, descriptor.description.as_deref().unwrap_or(""));
    }
    Ok(())
}

/// Write one Markdown file per registered tool under `out` (default
/// `docs/tools`).
///
/// # Errors
///
/// Returns [`CliError::Io`] if the output directory cannot be created or a
/// file cannot be written.
pub fn tools_docs(out: Option<&Path>) -> Result<(), CliError> {
    let default_dir = Path::new("docs/tools").to_path_buf();
    let dir = out.unwrap_or(&default_dir);
    std::fs::create_dir_all(dir)?;

    for descriptor in default_engine().list() {
        let path = dir.join(format!("{}.md", descriptor.id.replace('.', "_")));
        std::fs::write(path, render_tool_doc(&descriptor))?;
    }
    Ok(())
}

fn render_tool_doc(descriptor: &ToolDescriptor) -> String {
    let mut body = format!("# {}\n\n", descriptor.id);
    if let Some(description) = &descriptor.description {
        body.push_str(description);
        body.push_str("\n\n");
    }
    body.push_str(&format!("- Runner: `{}`\n", descriptor.runner));
    if !descriptor.permissions.is_empty() {
        body.push_str(&format!("- Required permissions: {:?}\n", descriptor.permissions));
    }
    body.push_str("\n## Input schema\n\n```json\n");
    body.push_str(&serde_json::to_string_pretty(&descriptor.input_schema).unwrap_or_default());
    body.push_str("\n```\n");
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_markdown_with_id_heading() {
        let descriptor = ToolDescriptor::builtin("fs.read", "fs.read").with_description("reads a file");
        let doc = render_tool_doc(&descriptor);
        assert!(doc.starts_with("# fs.read"));
        assert!(doc.contains("reads a file"));
    }
}
