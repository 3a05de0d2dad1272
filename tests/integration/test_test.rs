//! Integration tests for `monotest test` command
//!
//! The runner is `sh -c 'echo "TZ=$TZ" "$@"'`, so stdout shows exactly what a
//! real test runner would have received.

use crate::helpers::{ECHO_RUNNER, TestWorkspace, monotest, run_monotest};
use anyhow::Result;

const CHAIN: &[(&str, &str, &[&str])] = &[
  ("a", "pkg/a", &[]),
  ("b", "pkg/b", &["a"]),
  ("c", "app/c", &["b"]),
];

fn runner_lines(stdout: &str) -> Vec<&str> {
  stdout.lines().filter(|line| line.starts_with("TZ=")).collect()
}

#[test]
fn test_runs_selected_locations_in_baseline_timezone() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, ECHO_RUNNER)?;

  let output = run_monotest(&ws.path, &["test", "--files", "pkg/b/index.js", "tools/x.test.js", "--", "--ci"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(runner_lines(&stdout), vec!["TZ=UTC app/c/ pkg/b/ tools/x.test.js --ci"]);
  assert!(stderr.contains("Running tests in timezone: UTC"), "stderr: {}", stderr);
  // Diagnostics come before the runner starts
  assert!(stderr.contains("dirty workspaces: b"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_shard_timezones() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, ECHO_RUNNER)?;

  let expected = [("1", "UTC"), ("2", "Asia/Tokyo"), ("3", "America/Lima")];
  for (index, timezone) in expected {
    let output = monotest(
      &ws.path,
      &["test", "--files", "pkg/a/x.js"],
      &[("CI_NODE_INDEX", index), ("CI_NODE_TOTAL", "3")],
    )?;
    assert!(output.status.success(), "shard {} failed", index);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
      runner_lines(&stdout),
      vec![format!("TZ={} app/c/ pkg/a/ pkg/b/", timezone)],
      "shard {}",
      index
    );
  }

  Ok(())
}

#[test]
fn test_shard_flags_override_environment() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, ECHO_RUNNER)?;

  let output = monotest(
    &ws.path,
    &["test", "--files", "app/c/x.js", "--shard-index", "2", "--shard-total", "2"],
    &[("CI_NODE_INDEX", "1"), ("CI_NODE_TOTAL", "3")],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(runner_lines(&stdout), vec!["TZ=Asia/Tokyo app/c/"]);

  Ok(())
}

#[test]
fn test_unsupported_shard() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, ECHO_RUNNER)?;

  let output = monotest(
    &ws.path,
    &["test", "--files", "pkg/a/x.js"],
    &[("CI_NODE_INDEX", "4"), ("CI_NODE_TOTAL", "4")],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("CI node with index 4 (of 4) is not supported."), "stderr: {}", stderr);
  assert!(runner_lines(&stdout).is_empty(), "runner must not start");

  Ok(())
}

#[test]
fn test_explicit_tests_bypass_selection() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, ECHO_RUNNER)?;

  let output = run_monotest(&ws.path, &["test", "--files", "pkg/a/x.js", "--", "app/c/one.test.js"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(runner_lines(&stdout), vec!["TZ=UTC app/c/one.test.js"]);

  Ok(())
}

#[test]
fn test_all_runs_without_targets() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, ECHO_RUNNER)?;

  let output = run_monotest(&ws.path, &["test", "--all", "--", "--ci"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(runner_lines(&stdout), vec!["TZ=UTC --ci"]);

  Ok(())
}

#[test]
fn test_nothing_to_test() -> Result<()> {
  let config = format!("{}\n[changes]\ntests = [\"**/*.test.js\"]\n", ECHO_RUNNER);
  let ws = TestWorkspace::with_workspaces(CHAIN, &config)?;

  let output = run_monotest(&ws.path, &["test", "--files", "docs/guide.md"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Nothing to test"), "stdout: {}", stdout);
  assert!(runner_lines(&stdout).is_empty());

  Ok(())
}

#[test]
fn test_dry_run() -> Result<()> {
  let ws = TestWorkspace::with_workspaces(CHAIN, ECHO_RUNNER)?;

  let output = monotest(
    &ws.path,
    &["test", "--dry-run", "--files", "pkg/b/x.js"],
    &[("CI_NODE_INDEX", "3"), ("CI_NODE_TOTAL", "3")],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(output.status.success());
  assert!(stdout.contains("DRY RUN"), "stdout: {}", stdout);
  assert!(stdout.contains("TZ=America/Lima sh -c"), "stdout: {}", stdout);
  assert!(stdout.contains("app/c/ pkg/b/"), "stdout: {}", stdout);
  assert!(runner_lines(&stdout).is_empty(), "runner must not start");

  Ok(())
}

#[test]
fn test_runner_exit_code_is_propagated() -> Result<()> {
  let config = "\n[runner]\ncommand = \"sh\"\nargs = [\"-c\", \"exit 7\", \"runner\"]\n";
  let ws = TestWorkspace::with_workspaces(CHAIN, config)?;

  let output = monotest(&ws.path, &["test", "--files", "pkg/a/x.js"], &[])?;
  assert_eq!(output.status.code(), Some(7));

  Ok(())
}

#[test]
fn test_missing_runner() -> Result<()> {
  let config = "\n[runner]\ncommand = \"no-such-test-runner-7f3a\"\n";
  let ws = TestWorkspace::with_workspaces(CHAIN, config)?;

  let output = monotest(&ws.path, &["test", "--files", "pkg/a/x.js"], &[])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(2));
  assert!(stderr.contains("no-such-test-runner-7f3a"), "stderr: {}", stderr);

  Ok(())
}
