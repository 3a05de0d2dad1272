//! System git backend
//!
//! Uses git porcelain/plumbing commands through `std::process::Command`:
//! - Isolated environment (no system config, never prompts)
//! - Paths reported relative to the top-level, re-anchored to the workspace root

use crate::core::error::{GitError, MonoError, MonoResult, ResultExt};
use crate::utils::reanchor_to_workspace;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git
pub struct SystemGit {
  /// Workspace root (where monotest runs)
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> MonoResult<Self> {
    let repo_path = path
      .canonicalize()
      .with_context(|| format!("Failed to resolve {}", path.display()))?;

    let output = Command::new("git")
      .arg("-C")
      .arg(&repo_path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(MonoError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(MonoError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = PathBuf::from(stdout.trim());
    let work_tree = work_tree.canonicalize().unwrap_or(work_tree);

    Ok(Self { repo_path, work_tree })
  }

  /// Untracked files, honoring .gitignore
  pub fn untracked_files(&self) -> MonoResult<Vec<String>> {
    self.rows(&["ls-files", "--others", "--exclude-standard", "--full-name"])
  }

  /// Uncommitted (staged or not) changes against HEAD
  pub fn worktree_changed_files(&self) -> MonoResult<Vec<String>> {
    self.rows(&["diff", "--name-only", "HEAD"])
  }

  /// Files changed on this branch since it diverged from `base`
  pub fn changed_files_since(&self, base: &str) -> MonoResult<Vec<String>> {
    self.rows(&["diff", "--name-only", &format!("{}...HEAD", base)])
  }

  /// Files touched by the last commit (every file for a root commit)
  pub fn last_commit_changes(&self) -> MonoResult<Vec<String>> {
    if self.has_parent_commit() {
      self.rows(&["diff", "--name-only", "HEAD^", "HEAD"])
    } else {
      self.rows(&["diff-tree", "--root", "--no-commit-id", "--name-only", "-r", "HEAD"])
    }
  }

  /// The branch this one was started from, as seen by `git show-branch`.
  ///
  /// Falls back to `base` when show-branch fails or finds nothing better.
  pub fn previous_branch_name(&self, base: &str) -> String {
    let output = self
      .git_cmd()
      .args(["show-branch", "--topics", "--all", base, "HEAD"])
      .output();

    match output {
      Ok(output) if output.status.success() => {
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_previous_branch(&stdout).unwrap_or_else(|| base.to_string())
      }
      Ok(output) => {
        log::debug!(
          "git show-branch failed, using {}: {}",
          base,
          String::from_utf8_lossy(&output.stderr).trim()
        );
        base.to_string()
      }
      Err(e) => {
        log::debug!("git show-branch could not run, using {}: {}", base, e);
        base.to_string()
      }
    }
  }

  /// Everything a test run should consider changed, relative to the branch
  /// this one was started from (detected from `base`).
  pub fn changes_to_test(&self, base: &str) -> MonoResult<Vec<String>> {
    let previous = self.previous_branch_name(base);
    log::debug!("comparing against {}", previous);
    self.changes_since_ref(&previous)
  }

  /// Everything a test run should consider changed, relative to `git_ref` as given.
  ///
  /// untracked + worktree + branch changes since `git_ref`; when all of those
  /// are empty, the last commit's changes. Deduplicated, first occurrence
  /// wins, re-anchored to the workspace root.
  pub fn changes_since_ref(&self, git_ref: &str) -> MonoResult<Vec<String>> {
    let mut changes = self.untracked_files()?;
    changes.extend(self.worktree_changed_files()?);
    changes.extend(self.changed_files_since(git_ref)?);

    if changes.is_empty() {
      log::debug!("no changes since {}, using the last commit", git_ref);
      changes = self.last_commit_changes()?;
    }

    let mut seen = HashSet::new();
    Ok(
      changes
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .map(|path| reanchor_to_workspace(&self.work_tree, &self.repo_path, &path))
        .collect(),
    )
  }

  fn has_parent_commit(&self) -> bool {
    self
      .git_cmd()
      .args(["rev-parse", "--verify", "--quiet", "HEAD^"])
      .output()
      .map(|output| output.status.success())
      .unwrap_or(false)
  }

  /// Run git and split stdout into non-empty rows
  fn rows(&self, args: &[&str]) -> MonoResult<Vec<String>> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(MonoError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: stderr.to_string(),
      }));
    }

    Ok(parse_rows(&String::from_utf8_lossy(&output.stdout)))
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Ignores system config and never prompts for credentials
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("--no-pager");
    cmd.arg("-C").arg(&self.repo_path);

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }
    cmd.env("GIT_CONFIG_NOSYSTEM", "1");
    cmd.env("GIT_TERMINAL_PROMPT", "0");

    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}

fn parse_rows(stdout: &str) -> Vec<String> {
  stdout
    .lines()
    .map(|line| line.trim_end_matches('\r'))
    .filter(|line| !line.is_empty())
    .map(String::from)
    .collect()
}

/// Pick the branch name from `git show-branch --topics` output.
///
/// First row marked both `*` (on HEAD) and `+` (on another branch) that is not
/// HEAD itself; the name is the last bracketed part of that row.
fn parse_previous_branch(stdout: &str) -> Option<String> {
  let row = parse_rows(stdout)
    .into_iter()
    .find(|row| row.contains('*') && row.contains('+') && !row.contains("HEAD"))?;

  let open = row.rfind('[')?;
  let close = row.rfind(']')?;
  if close <= open {
    return None;
  }

  let name = row[open + 1..close].trim();
  if name.is_empty() { None } else { Some(name.to_string()) }
}
