#[allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// ─── helpers ───────────────────────────────────────────────────────

struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("create tempdir");
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("clo").expect("binary");
        cmd.arg("--dir").arg(self.dir.path());
        cmd.env_remove("CLO_HOME").env_remove("CLO_LOG");
        cmd
    }

    /// Run one session fed with `lines` and return its stdout.
    fn session(&self, lines: &[&str]) -> String {
        let mut input = lines.join("\n");
        input.push('\n');
        let output = self.cmd().write_stdin(input).output().expect("run");
        assert!(
            output.status.success(),
            "session failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

// ─── 1. sessions and persistence ───────────────────────────────────

#[test]
fn test_quit_exits_zero() {
    let env = TestEnv::new();
    env.cmd()
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(">> "));
}

#[test]
fn test_tasks_persist_between_sessions() {
    let env = TestEnv::new();
    let out = env.session(&["t a buy milk", "p 1", "m", "q"]);
    assert!(out.contains("buy milk"));
    assert!(env.path("tasks.db").exists());

    let out = env.session(&["t da", "m", "q"]);
    assert!(out.contains("buy milk"));
    assert!(out.contains("| 1 "));
}

#[test]
fn test_end_of_input_saves() {
    let env = TestEnv::new();
    env.session(&["t a call mum"]);
    let out = env.session(&["t da"]);
    assert!(out.contains("call mum"));
}

#[test]
fn test_closed_tasks_only_in_full_listing() {
    let env = TestEnv::new();
    env.session(&["t a old chore", "c", "a new chore", "m", "q"]);
    let out = env.session(&["t da", "m", "q"]);
    assert!(out.contains("new chore"));
    assert!(!out.contains("old chore"));

    let out = env.session(&["t dac", "m", "q"]);
    assert!(out.contains("old chore"));
    assert!(out.contains("closed"));
}

#[test]
fn test_file_override() {
    let env = TestEnv::new();
    let custom = env.path("elsewhere.db");
    env.cmd()
        .arg("--file")
        .arg(&custom)
        .write_stdin("t a from override\nm\nq\n")
        .assert()
        .success();
    assert!(custom.exists());
    assert!(!env.path("tasks.db").exists());
}

#[test]
fn test_config_file_renames_stores() {
    let env = TestEnv::new();
    fs::write(env.path("config.json"), r#"{"task_file": "work.db"}"#).unwrap();
    env.session(&["t a configured", "m", "q"]);
    assert!(env.path("work.db").exists());
    assert!(!env.path("tasks.db").exists());
}

#[test]
fn test_malformed_config_fails_startup() {
    let env = TestEnv::new();
    fs::write(env.path("config.json"), "{ nope").unwrap();
    env.cmd()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config.json"));
}

#[test]
fn test_corrupt_store_starts_empty() {
    let env = TestEnv::new();
    fs::write(env.path("tasks.db"), "garbage, certainly not a sqlite file. ".repeat(64)).unwrap();
    let out = env.session(&["t a fresh start", "m", "q"]);
    assert!(out.contains("fresh start"));
    assert!(env.path("tasks.db.corrupt").exists());

    let out = env.session(&["t da", "m", "q"]);
    assert!(out.contains("fresh start"));
}

// ─── 2. dispatcher behaviour through the binary ────────────────────

#[test]
fn test_unknown_command_keeps_going() {
    let env = TestEnv::new();
    let out = env.session(&["xyz", "t a still works", "m", "q"]);
    assert!(out.contains("Command not found"));
    assert!(out.contains("still works"));
}

#[test]
fn test_errors_reported_not_fatal() {
    let env = TestEnv::new();
    let out = env.session(&["t a x", "p high", "sc 9", "m", "q"]);
    assert!(out.contains("INVALID_VALUE"));
    assert!(out.contains("INDEX_OUT_OF_RANGE"));
}

#[test]
fn test_projects_join_tasks() {
    let env = TestEnv::new();
    let out = env.session(&[
        "t a dig beds",
        "pr garden",
        "m p a garden",
        "n buy seeds",
        "dat",
        "m",
        "q",
    ]);
    assert!(out.contains("buy seeds"));
    assert!(out.contains("dig beds"));
    assert!(env.path("projects.db").exists());
}

// ─── 3. inbox ──────────────────────────────────────────────────────

#[test]
fn test_inbox_written_as_lines() {
    let env = TestEnv::new();
    env.session(&["i a call bank", "a renew passport", "m", "q"]);
    let raw = fs::read_to_string(env.path("inbox.txt")).unwrap();
    assert_eq!(raw.lines().collect::<Vec<_>>(), ["call bank", "renew passport"]);
}

#[test]
fn test_inbox_processing_nested_loop() {
    let env = TestEnv::new();
    fs::write(env.path("inbox.txt"), "renew passport\n").unwrap();
    let out = env.session(&[
        "i p 0",
        "t a renew passport",
        "m",
        "q",
        "d",
        "m",
        "q",
    ]);
    assert!(out.contains("Processing: renew passport"));
    assert!(out.contains("inbox[1] t> "));

    let raw = fs::read_to_string(env.path("inbox.txt")).unwrap();
    assert!(raw.trim().is_empty());

    let out = env.session(&["t da", "m", "q"]);
    assert!(out.contains("renew passport"));
}

#[test]
fn test_process_all_empties_inbox() {
    let env = TestEnv::new();
    fs::write(env.path("inbox.txt"), "x\ny\n").unwrap();
    let out = env.session(&["i pa", "q", "q", "m", "q"]);
    let x = out.find("Processing: x").expect("x processed");
    let y = out.find("Processing: y").expect("y processed");
    assert!(x < y);
    let raw = fs::read_to_string(env.path("inbox.txt")).unwrap();
    assert!(raw.is_empty());
}

// ─── 4. help ───────────────────────────────────────────────────────

#[test]
fn test_help_flag_describes_modes() {
    let env = TestEnv::new();
    env.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("MODES"))
        .stdout(predicate::str::contains("CHAINING"));
}

#[test]
fn test_in_session_help() {
    let env = TestEnv::new();
    let out = env.session(&["h", "q"]);
    assert!(out.contains("switch to task mode"));
    assert!(out.contains("save everything and quit"));
}
