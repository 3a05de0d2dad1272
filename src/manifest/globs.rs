//! Workspace manifest discovery from the root package.json `workspaces` globs
//!
//! ```text
//! src/apps        =>  src/apps/package.json
//! src/packages/*  =>  src/packages/*/package.json
//! ```

use crate::core::error::{MonoError, MonoResult, ResultExt, ValidationError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "package.json";

/// Root package.json (only the fields we read)
#[derive(Debug, Deserialize)]
struct RootPackageJson {
  #[serde(default)]
  workspaces: Option<WorkspaceSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkspaceSpec {
  Array(Vec<String>),
  Object { packages: Vec<String> },
}

impl WorkspaceSpec {
  fn into_patterns(self) -> Vec<String> {
    match self {
      WorkspaceSpec::Array(patterns) => patterns,
      WorkspaceSpec::Object { packages } => packages,
    }
  }
}

/// Enumerates workspace manifests under the declared workspace globs
#[derive(Debug, Clone)]
pub struct ManifestGlobSource {
  root: PathBuf,
  patterns: Vec<String>,
}

impl ManifestGlobSource {
  /// Read the workspace globs from `<root>/package.json`
  pub fn load(root: &Path) -> MonoResult<Self> {
    let path = root.join(MANIFEST_FILE);
    let content =
      std::fs::read_to_string(&path).with_context(|| format!("Failed to read root manifest {}", path.display()))?;
    let package: RootPackageJson =
      serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    let patterns = package.workspaces.map(WorkspaceSpec::into_patterns).ok_or_else(|| {
      MonoError::with_help(
        format!("{} does not declare any workspaces", path.display()),
        "Add a \"workspaces\" array to the root package.json",
      )
    })?;

    Ok(Self::from_patterns(root, patterns))
  }

  pub fn from_patterns(root: &Path, patterns: Vec<String>) -> Self {
    Self {
      root: root.to_path_buf(),
      patterns,
    }
  }

  pub fn patterns(&self) -> &[String] {
    &self.patterns
  }

  /// Invoke `cb` once per manifest matched by any declared workspace glob
  pub fn iterate_workspaces(&self, mut cb: impl FnMut(&Path)) -> MonoResult<()> {
    for pattern in &self.patterns {
      for manifest in self.glob(&manifest_glob(pattern))? {
        cb(&manifest);
      }
    }
    Ok(())
  }

  /// Invoke `cb` once per manifest directly under `path`, which must be one of
  /// the declared workspace directories.
  pub fn iterate_workspaces_in_path(&self, path: &str, mut cb: impl FnMut(&Path)) -> MonoResult<()> {
    let dir = path.trim_end_matches(['/', '\\']);
    if !self.is_workspace_directory(dir) {
      return Err(MonoError::Validation(ValidationError::NotWorkspaceDirectory {
        path: path.to_string(),
        patterns: self.patterns.clone(),
      }));
    }

    let pattern = format!("{}/*/{}", dir, MANIFEST_FILE);
    for manifest in self.glob(&pattern)? {
      cb(&manifest);
    }
    Ok(())
  }

  /// `src/packages` and `src/packages/` both match the glob `src/packages/*`
  fn is_workspace_directory(&self, dir: &str) -> bool {
    let dir = crate::utils::normalize_separators(dir);
    self.patterns.iter().any(|pattern| {
      let base = pattern.trim_end_matches('*').trim_end_matches('/');
      !base.is_empty() && dir.ends_with(base)
    })
  }

  /// Expand a root-relative (or absolute) glob into sorted absolute paths
  fn glob(&self, pattern: &str) -> MonoResult<Vec<PathBuf>> {
    let full = if Path::new(pattern).is_absolute() {
      pattern.to_string()
    } else {
      format!(
        "{}/{}",
        glob::Pattern::escape(&self.root.to_string_lossy()),
        pattern
      )
    };

    let mut paths = Vec::new();
    for entry in glob::glob(&full)? {
      paths.push(entry?);
    }
    paths.sort();
    Ok(paths)
  }
}

/// Turn a workspace glob into the glob of its manifests
fn manifest_glob(pattern: &str) -> String {
  format!("{}/{}", pattern.trim_end_matches('/'), MANIFEST_FILE)
}
