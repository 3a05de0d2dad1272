//! Cargo workspace manifest provider
//!
//! Maps `cargo metadata` onto the same raw shape yarn produces: one entry per
//! workspace member, its location is the manifest directory relative to the
//! workspace root, its dependencies are every declared dependency name.
//! Registry dependencies are dropped later by normalization like any other
//! dangling name.

use super::{ManifestProvider, RawManifest};
use crate::core::error::MonoResult;
use crate::utils::path_to_git_format;
use cargo_metadata::{Metadata, MetadataCommand};
use std::path::{Path, PathBuf};

pub struct CargoProvider {
  root: PathBuf,
}

impl CargoProvider {
  pub fn new(root: &Path) -> Self {
    Self {
      root: root.to_path_buf(),
    }
  }
}

impl ManifestProvider for CargoProvider {
  fn name(&self) -> &str {
    "cargo"
  }

  fn fetch(&self) -> MonoResult<RawManifest> {
    let metadata = MetadataCommand::new()
      .manifest_path(self.root.join("Cargo.toml"))
      .no_deps()
      .exec()?;
    Ok(manifest_from_metadata(&metadata))
  }
}

fn manifest_from_metadata(metadata: &Metadata) -> RawManifest {
  let workspace_root = metadata.workspace_root.as_std_path();
  let mut manifest = RawManifest::new();

  for package in metadata.workspace_packages() {
    let manifest_path = package.manifest_path.as_std_path();
    let dir = manifest_path.parent().unwrap_or(workspace_root);
    let location = match dir.strip_prefix(workspace_root) {
      Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
      Ok(rel) => path_to_git_format(rel),
      Err(_) => path_to_git_format(dir),
    };

    let dependencies = package.dependencies.iter().map(|dep| dep.name.clone()).collect();
    manifest.insert(package.name.as_str(), &location, dependencies);
  }

  manifest
}
