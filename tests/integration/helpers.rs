//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Runner that prints its timezone and arguments instead of running jest
pub const ECHO_RUNNER: &str = r#"
[runner]
command = "sh"
args = ["-c", "echo \"TZ=$TZ\" \"$@\"", "runner"]
"#;

/// A test workspace with git history.
///
/// `origin/master` is a local branch pointing at the initial commit, so change
/// detection has a baseline without any remote.
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a new test workspace with basic structure
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=master"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(path.join("README.md"), "# monorepo\n")?;
    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial commit"])?;
    git(&path, &["branch", "origin/master"])?;

    Ok(Self { _root: root, path })
  }

  /// Workspace with the file provider configured and the given workspaces,
  /// `(name, location, dependencies)`, each with a package.json.
  pub fn with_workspaces(workspaces: &[(&str, &str, &[&str])], extra_config: &str) -> Result<Self> {
    let ws = Self::new()?;

    let mut manifest = serde_json::Map::new();
    for (name, location, deps) in workspaces {
      manifest.insert(
        name.to_string(),
        serde_json::json!({ "location": location, "workspaceDependencies": deps }),
      );
      ws.write_file(&format!("{}/package.json", location), &format!("{{ \"name\": \"{}\" }}\n", name))?;
    }
    ws.write_file("workspaces.json", &serde_json::to_string_pretty(&manifest)?)?;
    ws.write_file(
      "monotest.toml",
      &format!("[manifest]\nprovider = \"file\"\npath = \"workspaces.json\"\n{}", extra_config),
    )?;

    ws.commit("Add workspaces")?;
    git(&ws.path, &["branch", "-f", "origin/master"])?;
    Ok(ws)
  }

  /// Add a crate to a Cargo workspace rooted here
  pub fn add_crate(&self, name: &str, deps: &[&str]) -> Result<PathBuf> {
    let crate_path = self.path.join("crates").join(name);
    std::fs::create_dir_all(crate_path.join("src"))?;

    let mut cargo_toml = format!(
      r#"[package]
name = "{}"
version = "0.1.0"
edition = "2021"

[dependencies]
"#,
      name
    );
    for dep in deps {
      cargo_toml.push_str(&format!("{} = {{ path = \"../{}\" }}\n", dep, dep));
    }

    std::fs::write(crate_path.join("Cargo.toml"), cargo_toml)?;
    std::fs::write(crate_path.join("src/lib.rs"), format!("//! {} crate\n", name))?;

    Ok(crate_path)
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Write a file relative to the workspace root, creating parent directories
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let file_path = self.path.join(path);
    if let Some(parent) = file_path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run monotest without checking its exit status
pub fn monotest(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_monotest"));
  cmd
    .current_dir(cwd)
    .args(args)
    .env_remove("CI_NODE_INDEX")
    .env_remove("CI_NODE_TOTAL")
    .env_remove("RUST_LOG");
  for (key, value) in env {
    cmd.env(key, value);
  }

  cmd.output().context("Failed to run monotest")
}

/// Run monotest CLI command, failing on a non-zero exit
pub fn run_monotest(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = monotest(cwd, args, &[])?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "monotest command failed: monotest {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
