//! Bootstrap configuration read from the process environment.
//!
//! None of this is consumed by the `machi` library core, which only ever
//! accepts explicit `AgentConfig`/`BusConfig`/`Vfs` values; it exists purely
//! to translate the CLI's environment into those explicit values.

use std::path::PathBuf;

/// Configuration assembled from environment variables at CLI startup.
#[derive(Debug, Clone)]
pub struct AriumConfig {
    /// Root directory the CLI scaffolds and reads workspace files from.
    pub workspace_path: PathBuf,
    /// Identifier for the current project, surfaced in generated docs.
    pub project_id: String,
    /// Whether persistent (on-disk) backings should be used. Reserved for a
    /// future persistent bus/VFS implementation; the bundled core is
    /// in-memory regardless of this flag.
    pub persistent_storage: bool,
    /// `OPENAI_API_KEY`, if set. Not currently wired to a bundled adapter;
    /// an HTTP-backed `ModelAdapter` implementation is an external
    /// collaborator, not part of this crate.
    pub openai_api_key: Option<String>,
    /// `OPENAI_MODEL`, if set.
    pub openai_model: Option<String>,
}

impl AriumConfig {
    /// Read configuration from the environment.
    ///
    /// `WORKSPACE_PATH` defaults to the current directory, `PROJECT_ID`
    /// defaults to `"default"`, `PERSISTENT_STORAGE` defaults to enabled
    /// (only the literal string `"false"` disables it).
    #[must_use]
    pub fn from_env() -> Self {
        let workspace_path = std::env::var("WORKSPACE_PATH").map_or_else(|_| PathBuf::from("."), PathBuf::from);
        let project_id = std::env::var("PROJECT_ID").unwrap_or_else(|_| "default".to_string());
        let persistent_storage = std::env::var("PERSISTENT_STORAGE").is_none_or(|v| v != "false");
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let openai_model = std::env::var("OPENAI_MODEL").ok();

        Self { workspace_path, project_id, persistent_storage, openai_api_key, openai_model }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        // SAFETY: test runs single-threaded with respect to these vars via
        // serial execution of this module; no other test in the crate reads them.
        unsafe {
            std::env::remove_var("WORKSPACE_PATH");
            std::env::remove_var("PROJECT_ID");
            std::env::remove_var("PERSISTENT_STORAGE");
        }
        let config = AriumConfig::from_env();
        assert_eq!(config.workspace_path, PathBuf::from("."));
        assert_eq!(config.project_id, "default");
        assert!(config.persistent_storage);
    }

    #[test]
    fn persistent_storage_disabled_only_by_exact_false() {
        unsafe {
            std::env::set_var("PERSISTENT_STORAGE", "false");
        }
        assert!(!AriumConfig::from_env().persistent_storage);
        unsafe {
            std::env::set_var("PERSISTENT_STORAGE", "0");
        }
        assert!(AriumConfig::from_env().persistent_storage);
        unsafe {
            std::env::remove_var("PERSISTENT_STORAGE");
        }
    }
}
