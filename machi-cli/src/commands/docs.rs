//! `machi docs:generate`: the workspace's full documentation set.

use std::{path::Path, sync::Arc};

use machi::{bus::EventBus, tool::ToolEngine, vfs::Vfs};

use crate::error::CliError;

/// Write `docs/README.md` summarizing the registered tool library, plus one
/// Markdown file per tool (delegating to [`super::tools_docs`]).
///
/// # Errors
///
/// Returns [`CliError::Io`] if the output directory cannot be created or a
/// file cannot be written.
pub fn docs_generate(out: Option<&Path>, include_examples: bool) -> Result<(), CliError> {
    let default_dir = Path::new("docs").to_path_buf();
    let dir = out.unwrap_or(&default_dir);
    std::fs::create_dir_all(dir)?;

    let bus = Arc::new(EventBus::default());
    let engine = ToolEngine::new(Arc::clone(&bus));
    let vfs = Arc::new(Vfs::new(bus));
    machi::tools::register_builtins(&engine, vfs);
    let descriptors = engine.list();

    let mut readme = String::from("# Workspace documentation\n\n## Registered tools\n\n");
    for descriptor in &descriptors {
        readme.push_str(&format!("- `{}` ({})\n", descriptor.id, descriptor.runner));
        if include_examples {
            readme.push_str(&format!(
                "  - example: `engine.invoke(\"{}\", serde_json::json!({{}}), &granted).await`\n",
                descriptor.id
            ));
        }
    }
    std::fs::write(dir.join("README.md"), readme)?;

    super::tools_docs(Some(&dir.join("tools")))
}
