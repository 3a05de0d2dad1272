//! Change detection
//!
//! The selection engine only ever sees a list of changed paths; where that list
//! comes from (git, an explicit `--files` list) is decided here.

pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::MonoResult;

/// Source of the changed file paths for one selection run
pub trait ChangeProvider {
  /// Paths relative to the workspace root (or absolute when outside it)
  fn changed_paths(&self) -> MonoResult<Vec<String>>;
}

/// Changes detected by git
pub struct GitChanges {
  git: SystemGit,
  base: String,
  /// Compare against the branch `base` was forked into instead of `base` itself
  detect_previous: bool,
}

impl GitChanges {
  /// Against the configured baseline branch, with previous-branch detection
  pub fn from_base(git: SystemGit, base: impl Into<String>) -> Self {
    Self {
      git,
      base: base.into(),
      detect_previous: true,
    }
  }

  /// Against an explicit ref, diffed exactly as given
  pub fn since(git: SystemGit, git_ref: impl Into<String>) -> Self {
    Self {
      git,
      base: git_ref.into(),
      detect_previous: false,
    }
  }
}

impl ChangeProvider for GitChanges {
  fn changed_paths(&self) -> MonoResult<Vec<String>> {
    if self.detect_previous {
      self.git.changes_to_test(&self.base)
    } else {
      self.git.changes_since_ref(&self.base)
    }
  }
}

/// An explicit list of changed paths
pub struct StaticChanges(pub Vec<String>);

impl ChangeProvider for StaticChanges {
  fn changed_paths(&self) -> MonoResult<Vec<String>> {
    Ok(self.0.clone())
  }
}
