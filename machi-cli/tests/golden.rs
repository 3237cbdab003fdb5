//! End-to-end coverage for `machi run --case <name>`, exercised against the
//! compiled binary the way a user actually invokes it.

use std::{
    path::PathBuf,
    process::Command,
    sync::atomic::{AtomicU32, Ordering},
};

static COUNTER: AtomicU32 = AtomicU32::new(0);

fn temp_workspace() -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("machi-cli-golden-{}-{n}", std::process::id()));
    std::fs::create_dir_all(dir.join("tests/golden")).expect("create workspace");
    dir
}

fn write_case(workspace: &PathBuf, name: &str, body: &str) {
    std::fs::write(workspace.join("tests/golden").join(format!("{name}.json")), body).expect("write case");
}

#[test]
fn final_answer_case_passes_with_matching_expectation() {
    let workspace = temp_workspace();
    write_case(
        &workspace,
        "greeting",
        r#"{
            "task": "say hi",
            "mock_responses": [{"type": "final", "content": "hello there"}],
            "expected_contains": "hello"
        }"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_machi"))
        .args(["run", "--case", "greeting"])
        .env("WORKSPACE_PATH", &workspace)
        .output()
        .expect("spawn machi");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ok=true"), "stdout: {stdout}");

    std::fs::remove_dir_all(&workspace).ok();
}

#[test]
fn mismatched_expectation_fails_with_nonzero_exit() {
    let workspace = temp_workspace();
    write_case(
        &workspace,
        "off-script",
        r#"{
            "task": "say hi",
            "mock_responses": [{"type": "final", "content": "goodbye"}],
            "expected_contains": "hello"
        }"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_machi"))
        .args(["run", "--case", "off-script"])
        .env("WORKSPACE_PATH", &workspace)
        .output()
        .expect("spawn machi");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("expected output"));

    std::fs::remove_dir_all(&workspace).ok();
}

#[test]
fn tool_loop_case_exhausts_max_steps() {
    let workspace = temp_workspace();
    write_case(
        &workspace,
        "loops",
        r#"{
            "task": "loop forever",
            "max_steps": 2,
            "mock_responses": [{"type": "tool", "tool": "vfs.read", "arguments": {"path": "missing.txt"}}]
        }"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_machi"))
        .args(["run", "--case", "loops"])
        .env("WORKSPACE_PATH", &workspace)
        .output()
        .expect("spawn machi");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ok=false"), "stdout: {stdout}");
    assert!(stdout.contains("steps=2"), "stdout: {stdout}");

    std::fs::remove_dir_all(&workspace).ok();
}
