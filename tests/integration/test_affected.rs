//! Integration tests for `monotest affected` command

use crate::helpers::{TestWorkspace, git, monotest, run_monotest};
use anyhow::Result;

const CHAIN: &[(&str, &str, &[&str])] = &[
  ("a", "pkg/a", &[]),
  ("b", "pkg/b", &["a"]),
  ("c", "app/c", &["b"]),
];

fn names(value: &serde_json::Value) -> Vec<String> {
  value
    .as_array()
    .map(|items| items.iter().filter_map(|v| v.as_str().map(String::from)).collect())
    .unwrap_or_default()
}

#[test]
fn test_affected_json_output() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, "")?;

  ws.write_file("pkg/a/index.js", "module.exports = 1;\n")?;
  ws.commit("Change a")?;

  let output = run_monotest(&ws.path, &["affected", "--format", "json"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  let json: serde_json::Value = serde_json::from_str(&stdout).expect("Should be valid JSON");
  assert_eq!(names(&json["changed_files"]), vec!["pkg/a/index.js"]);
  assert_eq!(names(&json["impact"]["dirty"]), vec!["a"]);
  assert_eq!(names(&json["impact"]["testing"]), vec!["a", "b", "c"]);
  assert_eq!(names(&json["impact"]["dependents"]), vec!["b", "c"]);
  assert_eq!(names(&json["impact"]["targets"]), vec!["app/c/", "pkg/a/", "pkg/b/"]);

  Ok(())
}

#[test]
fn test_affected_reports_diagnostics() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, "")?;
  ws.write_file("pkg/b/index.js", "module.exports = 2;\n")?;
  ws.commit("Change b")?;

  let output = run_monotest(&ws.path, &["affected"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stderr.contains("dirty workspaces: b"), "stderr: {}", stderr);
  assert!(stderr.contains("testing workspaces: b, c"), "stderr: {}", stderr);
  assert!(stdout.contains("Dirty workspaces: 1"), "stdout: {}", stdout);
  assert!(stdout.contains("Transitive dependents: 1"), "stdout: {}", stdout);

  Ok(())
}

#[test]
fn test_affected_includes_uncommitted_changes() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, "")?;

  // Untracked file outside every workspace plus a modified tracked file
  ws.write_file("scripts/ci.test.js", "test('ci', () => {});\n")?;
  ws.write_file("app/c/package.json", "{ \"name\": \"c\", \"private\": true }\n")?;

  let output = run_monotest(&ws.path, &["affected", "--format", "locations"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  let lines: Vec<&str> = stdout.lines().collect();

  assert_eq!(lines, vec!["app/c/", "scripts/ci.test.js"]);

  Ok(())
}

#[test]
fn test_affected_test_globs_filter_unmatched() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, "\n[changes]\ntests = [\"**/*.test.js\"]\n")?;

  let output = run_monotest(
    &ws.path,
    &[
      "affected",
      "--format",
      "locations",
      "--files",
      "docs/guide.md",
      "scripts/ci.test.js",
    ],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["scripts/ci.test.js"]);

  Ok(())
}

#[test]
fn test_affected_explicit_files() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, "")?;

  let output = run_monotest(&ws.path, &["affected", "--format", "names", "--files", "/pkg/b/src/x.js"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["b", "c"]);

  Ok(())
}

#[test]
fn test_affected_since_ref() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, "")?;
  ws.write_file("pkg/a/index.js", "module.exports = 1;\n")?;
  let first = ws.commit("Change a")?;
  ws.write_file("app/c/index.js", "module.exports = 3;\n")?;
  ws.commit("Change c")?;

  let output = run_monotest(&ws.path, &["affected", "--format", "names", "--since", &first])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["c"]);

  Ok(())
}

#[test]
fn test_affected_since_ref_is_not_replaced_by_branch_detection() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, "")?;

  git(&ws.path, &["checkout", "-b", "develop"])?;
  ws.write_file("pkg/a/index.js", "module.exports = 1;\n")?;
  let first = ws.commit("Change a on develop")?;

  git(&ws.path, &["checkout", "-b", "feature"])?;
  ws.write_file("app/c/index.js", "module.exports = 3;\n")?;
  ws.commit("Change c on feature")?;

  let output = run_monotest(&ws.path, &["affected", "--format", "names", "--since", &first])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["c"]);

  Ok(())
}

#[test]
fn test_affected_reports_survive_quiet() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, "")?;

  let output = run_monotest(&ws.path, &["--quiet", "affected", "--files", "pkg/b/x.js"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert!(stderr.contains("dirty workspaces: b"), "stderr: {}", stderr);
  assert!(stderr.contains("testing workspaces: b, c"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_affected_falls_back_to_last_commit() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, "")?;

  // HEAD == origin/master and a clean tree: the last commit is inspected instead
  let output = run_monotest(&ws.path, &["affected", "--format", "names"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["a", "b", "c"]);

  Ok(())
}

#[test]
fn test_affected_cargo_workspace() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("Cargo.toml", "[workspace]\nmembers = [\"crates/*\"]\nresolver = \"2\"\n")?;
  ws.add_crate("lib-a", &[])?;
  ws.add_crate("lib-b", &["lib-a"])?;
  ws.add_crate("lib-c", &[])?;
  ws.commit("Add crates")?;
  git(&ws.path, &["branch", "-f", "origin/master"])?;

  ws.write_file("crates/lib-a/src/lib.rs", "pub fn hello() {}\n")?;
  ws.commit("Modify lib-a")?;

  let output = run_monotest(&ws.path, &["affected", "--format", "names"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["lib-a", "lib-b"]);

  Ok(())
}

#[test]
fn test_affected_malformed_manifest() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file(
    "workspaces.json",
    r#"{ "good": { "location": "pkg/good" }, "broken": { "dependencies": [] } }"#,
  )?;

  let output = monotest(
    &ws.path,
    &["--manifest", "workspaces.json", "affected", "--files", "pkg/good/a.js"],
    &[],
  )?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("broken"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_affected_unknown_format() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, "")?;

  let output = monotest(&ws.path, &["affected", "--format", "yaml"], &[])?;
  assert!(!output.status.success());

  Ok(())
}
