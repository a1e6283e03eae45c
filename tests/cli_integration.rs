//! Integration tests for the jingjie binary
//!
//! Every run gets its own config with logs in a temp dir, a short traversal
//! delay and an API key variable that is never set, so narratives come from
//! the offline fallbacks.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const MISSING_KEY_NARRATIVE: &str = "Simulation failed: API Key missing.";

/// Helper to get the jingjie binary path
fn jingjie_binary() -> PathBuf {
    // When running tests, the binary is in target/debug/jingjie
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove deps
    path.push("jingjie");
    path
}

/// Write a config pointing logs into `dir`
fn write_config(dir: &Path) -> PathBuf {
    let config = format!(
        r#"log_level: debug
paths:
  logs: {logs}
narrative:
  api_key_env: JINGJIE_TEST_UNSET_KEY
timing:
  tick_interval_ms: 1000
  traversal_delay_ms: 20
"#,
        logs = dir.join("logs").display()
    );
    let path = dir.join("jingjie.yaml");
    fs::write(&path, config).unwrap();
    path
}

fn command(dir: &Path, args: &[&str]) -> Command {
    let config = write_config(dir);
    let mut cmd = Command::new(jingjie_binary());
    cmd.env("JINGJIE_DIR", dir)
        .env_remove("JINGJIE_TEST_UNSET_KEY")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config)
        .args(args);
    cmd
}

fn run_jingjie(dir: &Path, args: &[&str]) -> Output {
    command(dir, args).output().expect("Failed to execute jingjie")
}

fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = run_jingjie(dir, args);
    assert!(
        output.status.success(),
        "jingjie {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_agents_json_lists_roster() {
    let temp = TempDir::new().unwrap();
    let agents = run_json(temp.path(), &["agents", "-o", "json"]);
    let agents = agents.as_array().unwrap();
    assert_eq!(agents.len(), 5);
    assert_eq!(agents[0]["id"], "wang_xizhi");
    assert_eq!(agents[1]["realm"], "solvay");
}

#[test]
fn test_agent_unknown_fails() {
    let temp = TempDir::new().unwrap();
    let output = run_jingjie(temp.path(), &["agent", "socrates"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("socrates"));
}

#[test]
fn test_realms_json_includes_activity() {
    let temp = TempDir::new().unwrap();
    let realms = run_json(temp.path(), &["realms", "-o", "json"]);
    let realms = realms.as_array().unwrap();
    assert_eq!(realms.len(), 4);
    assert_eq!(realms[2]["id"], "goose_lake");
    assert_eq!(realms[2]["activity"], 78);
    assert_eq!(realms[2]["occupants"], serde_json::json!(["zhu_xi", "lu_jiuyuan"]));
}

#[test]
fn test_experiment_without_key_uses_fallback() {
    let temp = TempDir::new().unwrap();
    let report = run_json(temp.path(), &["experiment", "einstein", "--preset", "foolishness", "-o", "json"]);

    assert_eq!(report["log"]["status"], "resolved");
    assert_eq!(report["log"]["outcome"], MISSING_KEY_NARRATIVE);
    assert_eq!(report["log"]["impact"], "No measurable change");
    assert!(
        report["log"]["scenario"]
            .as_str()
            .unwrap()
            .starts_with("[FOOLISHNESS PROTOCOL] ")
    );
    assert_eq!(report["agent"]["stats"]["science"], 98);
}

#[test]
fn test_experiment_blank_scenario_fails() {
    let temp = TempDir::new().unwrap();
    let output = run_jingjie(temp.path(), &["experiment", "einstein", "   "]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("scenario is empty"));
}

#[test]
fn test_traverse_moves_agent() {
    let temp = TempDir::new().unwrap();
    let report = run_json(temp.path(), &["traverse", "einstein", "lanting", "-o", "json"]);

    assert_eq!(report["record"]["from"], "solvay");
    assert_eq!(report["record"]["to"], "lanting");
    assert!(!report["record"]["completed_at"].is_null());
    assert_eq!(
        report["record"]["narrative"],
        "Albert Einstein moved from solvay to lanting."
    );
    assert_eq!(report["agent"]["current_realm"], "lanting");
    assert_eq!(report["agent"]["status"], "idle");
}

#[test]
fn test_traverse_same_realm_fails() {
    let temp = TempDir::new().unwrap();
    let output = run_jingjie(temp.path(), &["traverse", "zhu_xi", "goose-lake"]);
    assert!(!output.status.success());
}

#[test]
fn test_console_scripted_session() {
    let temp = TempDir::new().unwrap();
    let mut child = command(temp.path(), &["console"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start console");

    {
        let stdin = child.stdin.as_mut().unwrap();
        stdin
            .write_all(b"select lu_jiuyuan\nrun Debate the nature of mind\nlog\nquit\n")
            .unwrap();
    }
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Selected"));
    assert!(stdout.contains(MISSING_KEY_NARRATIVE));
}

#[test]
fn test_config_get() {
    let temp = TempDir::new().unwrap();
    let output = run_jingjie(temp.path(), &["config", "get", "timing.traversal_delay_ms"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "20");
}

#[test]
fn test_logs_written_to_configured_dir() {
    let temp = TempDir::new().unwrap();
    run_json(temp.path(), &["agents", "-o", "json"]);
    let log = fs::read_to_string(temp.path().join("logs").join("jingjie.log")).unwrap();
    assert!(log.contains("Logging initialized"));
}
