//! `machi run`: execute a golden case, or a one-off task piped on stdin.

use std::{io::Read as _, sync::Arc};

use machi::prelude::{Agent, EventBus, MockModel, ToolEngine};
use machi::providers::ModelResponse;
use machi::vfs::Vfs;
use serde::Deserialize;
use tracing::info;

use crate::{config::AriumConfig, error::CliError};

/// A scripted dev/test scenario: the task, the model responses to replay,
/// and (optionally) a substring the final answer must contain.
#[derive(Debug, Deserialize)]
struct GoldenCase {
    task: String,
    #[serde(default)]
    max_steps: Option<usize>,
    mock_responses: Vec<ModelResponse>,
    #[serde(default)]
    expected_contains: Option<String>,
}

/// Run `--case <name>` if given, otherwise read a task from stdin and run
/// it against the mock adapter.
///
/// # Errors
///
/// Returns [`CliError::Usage`] for an unsupported `adapter`, a missing case
/// file, or empty stdin; [`CliError::Assertion`] if a case's
/// `expected_contains` is not met; [`CliError::Agent`] if the run itself
/// returns `Err`.
pub async fn run_case_or_stdin(config: &AriumConfig, case: Option<&str>, adapter: &str) -> Result<(), CliError> {
    if adapter != "mock" {
        return Err(CliError::Usage(format!(
            "adapter '{adapter}' is not bundled; only 'mock' ships with this crate, wire an external ModelAdapter for others"
        )));
    }

    if let Some(name) = case {
        run_golden_case(config, name).await
    } else {
        run_stdin_task(config).await
    }
}

async fn run_golden_case(config: &AriumConfig, name: &str) -> Result<(), CliError> {
    let path = config.workspace_path.join("tests/golden").join(format!("{name}.json"));
    let body = std::fs::read_to_string(&path).map_err(|err| {
        CliError::Usage(format!("could not read golden case {}: {err}", path.display()))
    })?;
    let case: GoldenCase = serde_json::from_str(&body)?;

    let bus = Arc::new(EventBus::default());
    let tools = Arc::new(ToolEngine::new(Arc::clone(&bus)));
    let vfs = Arc::new(Vfs::new(Arc::clone(&bus)));
    machi::tools::register_builtins(&tools, Arc::clone(&vfs));

    let model = MockModel::new(case.mock_responses);
    let mut builder = Agent::builder().model(Box::new(model)).tools(tools).bus(bus).vfs(vfs);
    if let Some(max_steps) = case.max_steps {
        builder = builder.max_steps(max_steps);
    }
    let agent = builder.build();

    let outcome = agent.run(case.task.as_str()).await?;

    if let Some(expected) = &case.expected_contains {
        let data = outcome.data.as_ref().and_then(|v| v.as_str()).unwrap_or_default();
        if !data.contains(expected.as_str()) {
            return Err(CliError::Assertion(format!(
                "case '{name}' expected output containing {expected:?}, got {data:?}"
            )));
        }
    }

    info!(case = name, ok = outcome.ok, steps = outcome.steps_taken, "golden case completed");
    println!("{name}: ok={} steps={}", outcome.ok, outcome.steps_taken);
    Ok(())
}

async fn run_stdin_task(config: &AriumConfig) -> Result<(), CliError> {
    let mut task = String::new();
    std::io::stdin().read_to_string(&mut task)?;
    let task = task.trim();
    if task.is_empty() {
        return Err(CliError::Usage("no task provided; pipe one to stdin or pass --case <name>".to_string()));
    }

    let bus = Arc::new(EventBus::default());
    let tools = Arc::new(ToolEngine::new(Arc::clone(&bus)));
    let vfs = Arc::new(Vfs::new(Arc::clone(&bus)));
    machi::tools::register_builtins(&tools, Arc::clone(&vfs));

    let agent = Agent::builder()
        .model(Box::new(MockModel::final_text(format!("(mock) received: {task}"))))
        .tools(tools)
        .bus(bus)
        .vfs(vfs)
        .id(config.project_id.clone())
        .name("machi-dev")
        .build();

    let outcome = agent.run(task).await?;
    println!("{}", outcome.data.unwrap_or_default());
    Ok(())
}
