//! Raw workspace manifests and the providers that produce them
//!
//! A manifest is the declared shape of the monorepo: workspace name →
//! `{ location, dependencies }`. This module only fetches and deserializes it;
//! validation and normalization happen in [`crate::graph::workspace_graph::normalize`].
//!
//! Providers:
//! - **yarn**: `yarn workspaces info --json`
//! - **cargo**: `cargo metadata` workspace members
//! - **file**: a JSON file with the yarn shape

pub mod cargo;
pub mod file;
pub mod globs;
pub mod yarn;

use crate::core::config::{ManifestConfig, ManifestProviderKind};
use crate::core::error::{MonoError, MonoResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One workspace entry exactly as the collaborator reported it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWorkspace {
  /// Declared root of the workspace; missing or empty is a malformed manifest
  #[serde(default)]
  pub location: Option<String>,

  /// Declared dependency names, possibly dangling or duplicated
  #[serde(default, alias = "workspaceDependencies")]
  pub dependencies: Vec<String>,
}

/// Workspace name → raw entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawManifest {
  pub workspaces: BTreeMap<String, RawWorkspace>,
}

impl RawManifest {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add an entry (builder style)
  #[cfg(test)]
  pub fn with_workspace(mut self, name: &str, location: &str, dependencies: &[&str]) -> Self {
    self.insert(name, location, dependencies.iter().map(|d| d.to_string()).collect());
    self
  }

  pub fn insert(&mut self, name: &str, location: &str, dependencies: Vec<String>) {
    self.workspaces.insert(
      name.to_string(),
      RawWorkspace {
        location: Some(location.to_string()),
        dependencies,
      },
    );
  }

  pub fn from_json(json: &str) -> MonoResult<Self> {
    Ok(serde_json::from_str(json)?)
  }

  pub fn len(&self) -> usize {
    self.workspaces.len()
  }

  pub fn is_empty(&self) -> bool {
    self.workspaces.is_empty()
  }
}

/// Source of the raw manifest.
///
/// Implementations run an external tool or read a file; failures are
/// collaborator errors and are propagated as-is.
pub trait ManifestProvider {
  /// Human-readable provider name for logs
  fn name(&self) -> &str;

  /// Fetch the raw manifest
  fn fetch(&self) -> MonoResult<RawManifest>;
}

/// Pick the manifest provider for a workspace.
///
/// An explicit `--manifest` file always wins over the config.
pub fn provider_for(
  root: &Path,
  config: &ManifestConfig,
  manifest_override: Option<&Path>,
) -> MonoResult<Box<dyn ManifestProvider>> {
  if let Some(path) = manifest_override {
    return Ok(Box::new(file::FileProvider::new(root.join(path))));
  }

  match config.provider {
    ManifestProviderKind::Yarn => Ok(Box::new(yarn::YarnProvider::new(root))),
    ManifestProviderKind::Cargo => Ok(Box::new(cargo::CargoProvider::new(root))),
    ManifestProviderKind::File => {
      let path = config
        .path
        .as_ref()
        .ok_or_else(|| MonoError::message("manifest.path is required when provider = \"file\""))?;
      Ok(Box::new(file::FileProvider::new(root.join(path))))
    }
    ManifestProviderKind::Auto => detect_provider(root),
  }
}

/// Detect the provider from the files present at the root.
///
/// Tries: package.json → yarn, Cargo.toml → cargo
fn detect_provider(root: &Path) -> MonoResult<Box<dyn ManifestProvider>> {
  if root.join("package.json").exists() {
    return Ok(Box::new(yarn::YarnProvider::new(root)));
  }

  if root.join("Cargo.toml").exists() {
    return Ok(Box::new(cargo::CargoProvider::new(root)));
  }

  Err(MonoError::with_help(
    format!("Could not detect a workspace manifest at {}", root.display()),
    "Supported: yarn workspaces (package.json), Cargo workspaces (Cargo.toml), or --manifest <file.json>",
  ))
}
