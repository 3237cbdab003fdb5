//! Builtin tools registered on every [`crate::tool::ToolEngine`] by default.
//!
//! These are the ambient tools the agent core ships with: reading and
//! writing the workspace filesystem, and fetching a webpage. Everything
//! else is expected to arrive through [`crate::tool::ToolEngine::register`].

mod net_fetch;
mod vfs_tools;

use std::sync::Arc;

use crate::{tool::ToolEngine, vfs::Vfs};

/// Register the builtin tool library onto `engine`.
pub fn register_builtins(engine: &ToolEngine, vfs: Arc<Vfs>) {
    let (descriptor, registration) = vfs_tools::register_read(vfs.clone());
    engine.register(descriptor, registration);

    let (descriptor, registration) = vfs_tools::register_write(vfs);
    engine.register(descriptor, registration);

    let (descriptor, registration) = net_fetch::register();
    engine.register(descriptor, registration);
}
