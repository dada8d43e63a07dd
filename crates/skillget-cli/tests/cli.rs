//! End-to-end runs of the `skill-get` binary against a scratch home.
//!
//! Only offline commands are exercised; the registry URL points at a closed
//! port so anything that reaches the network fails fast.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

struct Sandbox {
    home: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_skill-get"))
            .args(args)
            .env("SKILL_GET_HOME", self.home.path())
            .env("SKILL_GET_CONFIG", self.home.path().join("state.json"))
            .env("SKILL_GET_API_URL", "http://127.0.0.1:9")
            .env_remove("RUST_LOG")
            .env_remove("CLAUDE_CODE")
            .env_remove("CURSOR_SESSION")
            .env_remove("WINDSURF_SESSION")
            .env_remove("CODEX_SESSION")
            .output()
            .unwrap()
    }

    fn bundle(&self, dir: &str, heading: &str) -> std::path::PathBuf {
        let path = self.home.path().join("src").join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(
            path.join("SKILL.md"),
            format!("# {heading}\n\nThis skill explains how to do the thing it is named after.\n"),
        )
        .unwrap();
        path
    }
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn list_json_is_empty_array_on_fresh_home() {
    let sb = Sandbox::new();
    let out = sb.run(&["list", "--json"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "[]");
}

#[test]
fn local_install_list_and_remove() {
    let sb = Sandbox::new();
    let bundle = sb.bundle("demo", "Demo Skill");

    let out = sb.run(&["install", "--local", bundle.to_str().unwrap()]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).contains("Installed demo-skill from local directory"));

    let installed = sb.home.path().join(".ai-skills").join("demo-skill");
    assert!(Path::new(&installed).join("SKILL.md").is_file());

    let out = sb.run(&["list", "--json"]);
    let records: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(records[0]["name"], "demo-skill");
    assert_eq!(records[0]["version"], "local");
    assert_eq!(records[0]["source"], "local");

    let out = sb.run(&["rm", "demo-skill", "--yes"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(!installed.exists());
    assert_eq!(stdout(&sb.run(&["ls", "--json"])).trim(), "[]");
}

#[test]
fn removing_unknown_skill_fails_with_marker() {
    let sb = Sandbox::new();
    let out = sb.run(&["remove", "ghost", "-y"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).starts_with("✗ "));
    assert!(stderr(&out).contains("ghost"));
}

#[test]
fn local_install_without_marker_fails() {
    let sb = Sandbox::new();
    let empty = sb.home.path().join("empty");
    fs::create_dir_all(&empty).unwrap();

    let out = sb.run(&["install", "-l", empty.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("No SKILL.md found"));
}

#[test]
fn config_agent_is_persisted() {
    let sb = Sandbox::new();
    let out = sb.run(&["config", "--agent", "cursor"]);
    assert!(out.status.success(), "{}", stderr(&out));

    let out = sb.run(&["config", "--list"]);
    let text = stdout(&out);
    assert!(text.contains("Agent:       Cursor"));
    assert!(text.contains(".cursor"));
}

#[test]
fn config_rejects_unknown_agent() {
    let sb = Sandbox::new();
    let out = sb.run(&["config", "--agent", "emacs"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("unknown agent"));
}

#[test]
fn whoami_without_login() {
    let sb = Sandbox::new();
    let out = sb.run(&["whoami"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Not logged in"));
}

#[test]
fn publish_dry_run_prints_summary_without_login() {
    let sb = Sandbox::new();
    let bundle = sb.bundle("pub", "Publish Me");
    fs::write(
        bundle.join("package.json"),
        r#"{"name": "publish-me", "version": "0.3.0", "keywords": ["a", "b"]}"#,
    )
    .unwrap();

    let out = sb.run(&["publish", bundle.to_str().unwrap(), "--dry-run"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Name:        publish-me"));
    assert!(text.contains("Version:     0.3.0"));
    assert!(text.contains("Keywords:    a, b"));
    assert!(text.contains("License:     MIT"));
    assert!(text.contains("Dry run"));
}

#[test]
fn publish_requires_login() {
    let sb = Sandbox::new();
    let bundle = sb.bundle("pub", "Publish Me");
    let out = sb.run(&["publish", bundle.to_str().unwrap(), "-y"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("logged in"));
}
