//! Unified workspace context - build once, pass everywhere
//!
//! Holds what every command needs (root, config, manifest override). The
//! workspace graph itself is loaded on demand: it is rebuilt from a freshly
//! fetched manifest on every run and never cached.

use crate::core::config::MonotestConfig;
use crate::core::error::MonoResult;
use crate::core::vcs::{ChangeProvider, GitChanges, StaticChanges, SystemGit};
use crate::graph::workspace_graph::{WorkspaceGraph, normalize};
use crate::manifest::provider_for;
use std::path::{Path, PathBuf};

/// Shared workspace-level data for all commands.
pub struct WorkspaceContext {
  /// Workspace root directory
  pub root: PathBuf,

  /// monotest.toml (defaults when absent)
  pub config: MonotestConfig,

  /// `--manifest` file, overriding the configured provider
  pub manifest_override: Option<PathBuf>,
}

impl WorkspaceContext {
  /// Build workspace context from a root directory.
  pub fn build(workspace_root: &Path, manifest_override: Option<PathBuf>) -> MonoResult<Self> {
    let config = MonotestConfig::load(workspace_root)?;

    Ok(Self {
      root: workspace_root.to_path_buf(),
      config,
      manifest_override,
    })
  }

  /// Fetch the raw manifest and normalize it into a graph.
  pub fn load_graph(&self) -> MonoResult<WorkspaceGraph> {
    let provider = provider_for(&self.root, &self.config.manifest, self.manifest_override.as_deref())?;
    log::debug!("fetching workspace manifest via {}", provider.name());

    let raw = provider.fetch()?;
    if raw.is_empty() {
      log::warn!("{} reported no workspaces; every change will be treated as unmatched", provider.name());
    } else {
      log::debug!("{} reported {} workspace(s)", provider.name(), raw.len());
    }
    normalize(&raw)
  }

  /// Explicit files win; otherwise git against `since` as given, or the
  /// branch detected from the configured base.
  pub fn change_provider(&self, since: Option<&str>, files: Vec<String>) -> MonoResult<Box<dyn ChangeProvider>> {
    if !files.is_empty() {
      return Ok(Box::new(StaticChanges(files)));
    }

    let git = SystemGit::open(&self.root)?;
    match since {
      Some(git_ref) => Ok(Box::new(GitChanges::since(git, git_ref))),
      None => Ok(Box::new(GitChanges::from_base(git, &self.config.changes.base))),
    }
  }

  /// Get workspace root as Path reference (convenience)
  pub fn workspace_root(&self) -> &Path {
    &self.root
  }
}
