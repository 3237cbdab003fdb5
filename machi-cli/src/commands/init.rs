//! `machi init`: scaffold a workspace.

use std::path::Path;

use tracing::info;

use crate::{config::AriumConfig, error::CliError};

const CONFIG_FILE: &str = "arium.config.json";

/// Write `arium.config.json`, `tests/golden/`, and `docs/` under
/// `config.workspace_path`.
///
/// # Errors
///
/// Returns [`CliError::Usage`] if the config file already exists and
/// `force` is `false`, or [`CliError::Io`] if a filesystem operation fails.
pub fn init(config: &AriumConfig, force: bool) -> Result<(), CliError> {
    let root = &config.workspace_path;
    let config_path = root.join(CONFIG_FILE);

    if config_path.exists() && !force {
        return Err(CliError::Usage(format!(
            "{} already exists; pass --force to overwrite",
            config_path.display()
        )));
    }

    std::fs::create_dir_all(root)?;
    std::fs::create_dir_all(root.join("tests/golden"))?;
    std::fs::create_dir_all(root.join("docs"))?;
    write_config(&config_path, config)?;

    info!(workspace = %root.display(), "workspace initialized");
    Ok(())
}

fn write_config(path: &Path, config: &AriumConfig) -> Result<(), CliError> {
    let body = serde_json::json!({
        "projectId": config.project_id,
        "persistentStorage": config.persistent_storage,
    });
    std::fs::write(path, serde_json::to_string_pretty(&body)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffolds_expected_layout() {
        use std::sync::atomic::{AtomicU32, Ordering};
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!("machi-cli-init-test-{}-{n}", std::process::id()));
        let config = AriumConfig {
            workspace_path: dir.clone(),
            project_id: "demo".to_string(),
            persistent_storage: true,
            openai_api_key: None,
            openai_model: None,
        };

        init(&config, false).expect("init");
        assert!(dir.join(CONFIG_FILE).exists());
        assert!(dir.join("tests/golden").is_dir());
        assert!(dir.join("docs").is_dir());

        let err = init(&config, false).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));

        init(&config, true).expect("force re-init");
        std::fs::remove_dir_all(&dir).ok();
    }
}
