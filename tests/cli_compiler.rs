//! Integration tests for the `cbt` command line.
//!
//! Each test points the binary at its own settings file, so the user's real
//! compiler settings are never touched.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn get_cbt_binary() -> PathBuf {
    let mut path = std::env::current_exe().expect("Failed to locate current test exe");
    path.pop();
    path.pop();
    if cfg!(windows) {
        path.join("cbt.exe")
    } else {
        path.join("cbt")
    }
}

/// Run `cbt` with `settings`; `None` when the binary has not been built.
fn run_cbt(settings: &Path, args: &[&str]) -> Option<Output> {
    let cbt = get_cbt_binary();
    if !cbt.exists() {
        eprintln!("Skipping: cbt binary not found at {:?}", cbt);
        return None;
    }

    let output = Command::new(cbt)
        .arg("--settings")
        .arg(settings)
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("CBT_SETTINGS")
        .output()
        .expect("Failed to run cbt");
    Some(output)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_list_shows_builtin_compilers() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("compilers.toml");
    let Some(output) = run_cbt(&settings, &["compiler", "list"]) else {
        return;
    };

    assert!(output.status.success(), "{:?}", output);
    let text = stdout(&output);
    assert!(text.contains("gcc"), "{}", text);
    assert!(text.contains("clang"), "{}", text);
}

#[test]
fn test_copy_then_show_reports_lineage() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("compilers.toml");
    let Some(output) = run_cbt(&settings, &["compiler", "copy", "gcc", "--name", "My GCC"]) else {
        return;
    };
    assert!(output.status.success(), "{:?}", output);
    assert!(settings.exists());

    let output = run_cbt(&settings, &["compiler", "show", "gcc-copy"]).unwrap();
    assert!(output.status.success(), "{:?}", output);
    let text = stdout(&output);
    assert!(text.contains("My GCC"), "{}", text);
    assert!(text.contains("Derived from: gcc"), "{}", text);
}

#[test]
fn test_remove_relinks_persisted_children() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("compilers.toml");
    let Some(first) = run_cbt(&settings, &["compiler", "copy", "gcc"]) else {
        return;
    };
    assert!(first.status.success(), "{:?}", first);
    let second = run_cbt(&settings, &["compiler", "copy", "gcc-copy"]).unwrap();
    assert!(second.status.success(), "{:?}", second);

    let removed = run_cbt(&settings, &["compiler", "remove", "gcc-copy", "--yes"]).unwrap();
    assert!(removed.status.success(), "{:?}", removed);

    let output = run_cbt(&settings, &["compiler", "show", "gcc-copy-copy"]).unwrap();
    assert!(output.status.success(), "{:?}", output);
    assert!(stdout(&output).contains("Derived from: gcc"));
}

#[test]
fn test_unknown_compiler_fails() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("compilers.toml");
    let Some(output) = run_cbt(&settings, &["compiler", "default", "nonexistent-id"]) else {
        return;
    };
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nonexistent-id"), "{}", stderr);
}

#[test]
fn test_resolve_json_uses_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("compilers.toml");
    let manifest = dir.path().join("cbt.toml");
    fs::write(
        &manifest,
        r#"
name = "app"
compiler = "gcc"

[options]
compiler = ["-O2"]

[[target]]
name = "debug"
options = { compiler = ["-g"] }
"#,
    )
    .unwrap();

    let install = dir.path().join("toolchain");
    let Some(output) = run_cbt(
        &settings,
        &["compiler", "set-path", "gcc", install.to_str().unwrap()],
    ) else {
        return;
    };
    assert!(output.status.success(), "{:?}", output);

    let output = run_cbt(
        &settings,
        &[
            "resolve",
            "--project",
            manifest.to_str().unwrap(),
            "--target",
            "debug",
            "--json",
        ],
    )
    .unwrap();
    assert!(output.status.success(), "{:?}", output);

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["compiler"], "gcc");
    let args: Vec<&str> = value["compiler_args"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(&args[args.len() - 2..], &["-O2", "-g"]);
}

#[test]
fn test_completions_generate_script() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("compilers.toml");
    let Some(output) = run_cbt(&settings, &["completions", "bash"]) else {
        return;
    };
    assert!(output.status.success());
    assert!(stdout(&output).contains("cbt"));
}
