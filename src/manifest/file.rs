//! JSON file manifest provider (`--manifest`, or `provider = "file"`)

use super::{ManifestProvider, RawManifest};
use crate::core::error::{MonoResult, ResultExt};
use std::path::PathBuf;

pub struct FileProvider {
  path: PathBuf,
}

impl FileProvider {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }
}

impl ManifestProvider for FileProvider {
  fn name(&self) -> &str {
    "file"
  }

  fn fetch(&self) -> MonoResult<RawManifest> {
    let content = std::fs::read_to_string(&self.path)
      .with_context(|| format!("Failed to read workspace manifest {}", self.path.display()))?;
    RawManifest::from_json(&content).with_context(|| format!("Failed to parse {}", self.path.display()))
  }
}
