//! Execution backends for registered tools.
//!
//! Each runner normalizes every failure mode (thrown exception, timeout,
//! non-conforming return value, process spawn failure) into
//! [`ToolResult::Err`]; nothing here ever propagates a raised error across
//! the engine boundary.

use std::time::Duration;

use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::error::ToolError;

use super::ToolResult;

/// Default per-invocation deadline for sandboxed runners.
pub const DEFAULT_RUNNER_TIMEOUT: Duration = Duration::from_secs(10);

/// Run a native callable in-process, isolating panics so a buggy builtin
/// cannot take the engine down with it.
pub async fn run_builtin(
    implementation: super::registration::BuiltinFn,
    args: Value,
    timeout: Duration,
) -> ToolResult {
    let call = tokio::spawn(async move { implementation(args).await });
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => ToolResult::from(ToolError::runner_failure(format!("builtin tool panicked: {join_err}"))),
        Err(_) => ToolResult::from(ToolError::timeout(timeout.as_millis() as u64)),
    }
}

/// Run Python source in a fresh interpreter subprocess.
///
/// The subprocess is fed a small wrapper that executes the tool's source,
/// calls `run(args)` with the JSON-decoded arguments, and writes the
/// result as one line of JSON on stdout, matching the `def run(args): ...`
/// entrypoint contract. A fresh process per invocation means no mutable
/// state can leak between calls.
pub async fn run_py(source: &str, args: Value, timeout: Duration) -> ToolResult {
    let wrapper = format!(
        "import sys, json\n{source}\n__args = json.loads(sys.stdin.readline())\n__result = run(__args)\nsys.stdout.write(json.dumps(__result))\n"
    );

    let spawn = tokio::process::Command::new("python3")
        .arg("-c")
        .arg(&wrapper)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn();

    let mut child = match spawn {
        Ok(child) => child,
        Err(err) => return ToolResult::from(ToolError::runner_failure(format!("failed to spawn python3: {err}"))),
    };

    if let Some(mut stdin) = child.stdin.take() {
        let payload = match serde_json::to_vec(&args) {
            Ok(bytes) => bytes,
            Err(err) => return ToolResult::from(ToolError::runner_failure(format!("failed to encode args: {err}"))),
        };
        if let Err(err) = stdin.write_all(&payload).await {
            return ToolResult::from(ToolError::runner_failure(format!("failed to write stdin: {err}")));
        }
        if let Err(err) = stdin.write_all(b"\n").await {
            return ToolResult::from(ToolError::runner_failure(format!("failed to write stdin: {err}")));
        }
    }

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            match serde_json::from_str::<Value>(&stdout) {
                Ok(value) => value_to_tool_result(value),
                Err(err) => ToolResult::from(ToolError::runner_failure(format!("non-conforming python output: {err}"))),
            }
        }
        Ok(Ok(output)) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            ToolResult::from(ToolError::runner_failure(format!("python tool exited non-zero: {stderr}")))
        }
        Ok(Err(err)) => ToolResult::from(ToolError::runner_failure(format!("failed to collect python output: {err}"))),
        Err(_) => {
            let _ = child.start_kill();
            ToolResult::from(ToolError::timeout(timeout.as_millis() as u64))
        }
    }
}

/// Run JavaScript source in an isolated `rquickjs` context with no ambient
/// I/O beyond the arguments passed in and the result returned.
///
/// `run` is resolved as a promise (draining the engine's job queue) so an
/// `async function run(args)` entrypoint, per the external interface
/// contract, works the same as a plain synchronous one.
#[cfg(feature = "js-runner")]
pub async fn run_js(source: &str, args: Value, timeout: Duration) -> ToolResult {
    let source = source.to_string();
    let call = tokio::task::spawn_blocking(move || run_js_blocking(&source, args));
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => ToolResult::from(ToolError::runner_failure(format!("js runtime panicked: {join_err}"))),
        Err(_) => ToolResult::from(ToolError::timeout(timeout.as_millis() as u64)),
    }
}

#[cfg(feature = "js-runner")]
fn run_js_blocking(source: &str, args: Value) -> ToolResult {
    let runtime = match rquickjs::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => return ToolResult::from(ToolError::runner_failure(format!("failed to start js runtime: {err}"))),
    };
    let context = match rquickjs::Context::full(&runtime) {
        Ok(context) => context,
        Err(err) => return ToolResult::from(ToolError::runner_failure(format!("failed to start js context: {err}"))),
    };

    let args_json = serde_json::to_string(&args).unwrap_or_else(|_| "{}".to_string());
    let outcome = context.with(|ctx| -> Result<String, String> {
        let wrapper = format!(
            r#"
            globalThis.__toolResult = undefined;
            globalThis.__toolError = undefined;
            {source}
            Promise.resolve(run(JSON.parse({args_json:?})))
                .then((r) => {{ globalThis.__toolResult = JSON.stringify(r); }})
                .catch((e) => {{ globalThis.__toolError = String(e); }});
            "#
        );
        ctx.eval::<(), _>(wrapper).map_err(|e| e.to_string())?;

        while runtime.is_job_pending() {
            runtime.execute_pending_job().map_err(|e| format!("{e:?}"))?;
        }

        let globals = ctx.globals();
        if let Ok(error) = globals.get::<_, String>("__toolError") {
            return Err(error);
        }
        globals.get::<_, String>("__toolResult").map_err(|e| e.to_string())
    });

    match outcome {
        Ok(json) => match serde_json::from_str::<Value>(&json) {
            Ok(value) => value_to_tool_result(value),
            Err(err) => ToolResult::from(ToolError::runner_failure(format!("non-conforming js result: {err}"))),
        },
        Err(message) => ToolResult::from(ToolError::runner_failure(message)),
    }
}

#[cfg(not(feature = "js-runner"))]
pub async fn run_js(_source: &str, _args: Value, _timeout: Duration) -> ToolResult {
    ToolResult::from(ToolError::runner_failure("js runner disabled (build without the `js-runner` feature)"))
}

/// Interpret a runner's raw JSON return value as a [`ToolResult`]: either
/// an already-enveloped `{ok, ...}` shape, or a bare value treated as the
/// success payload.
fn value_to_tool_result(value: Value) -> ToolResult {
    match serde_json::from_value::<ToolResult>(value.clone()) {
        Ok(result) => result,
        Err(_) => ToolResult::ok(value),
    }
}
