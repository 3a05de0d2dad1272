//! Yarn workspaces manifest provider
//!
//! Yarn v1 prints `yarn workspaces info --json` as an event envelope:
//! `{"type":"log","data":"<manifest as a JSON string>"}`, so the payload is
//! parsed twice. Plain output (the manifest object itself, possibly wrapped in
//! yarn's banner lines) is accepted as well.

use super::{ManifestProvider, RawManifest};
use crate::core::error::{ManifestError, MonoError, MonoResult};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;

const YARN: &str = "yarn";

pub struct YarnProvider {
  root: PathBuf,
}

impl YarnProvider {
  pub fn new(root: &Path) -> Self {
    Self {
      root: root.to_path_buf(),
    }
  }
}

impl ManifestProvider for YarnProvider {
  fn name(&self) -> &str {
    "yarn"
  }

  fn fetch(&self) -> MonoResult<RawManifest> {
    let unavailable = |reason: String| {
      MonoError::Manifest(ManifestError::Unavailable {
        tool: "yarn workspaces info".to_string(),
        reason,
      })
    };

    let yarn = which::which(YARN).map_err(|e| unavailable(format!("{} not found: {}", YARN, e)))?;

    let output = Command::new(yarn)
      .current_dir(&self.root)
      .args(["workspaces", "info", "--json"])
      .output()
      .map_err(|e| unavailable(e.to_string()))?;

    if !output.status.success() {
      return Err(unavailable(String::from_utf8_lossy(&output.stderr).trim().to_string()));
    }

    let stdout = String::from_utf8(output.stdout)?;
    parse_yarn_output(&stdout)
  }
}

/// Parse the stdout of `yarn workspaces info [--json]`
pub fn parse_yarn_output(stdout: &str) -> MonoResult<RawManifest> {
  // --json: one event per line, the manifest lives in a `log` event's data string
  for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
    if let Ok(Value::Object(event)) = serde_json::from_str::<Value>(line)
      && let Some(Value::String(data)) = event.get("data")
      && event.get("type").and_then(Value::as_str) == Some("log")
    {
      return RawManifest::from_json(data);
    }
  }

  // Plain: the manifest object between yarn's banner and "Done in ..."
  let start = stdout.find('{');
  let end = stdout.rfind('}');
  match (start, end) {
    (Some(start), Some(end)) if start < end => RawManifest::from_json(&stdout[start..=end]),
    _ => Err(MonoError::Manifest(ManifestError::Unavailable {
      tool: "yarn workspaces info".to_string(),
      reason: "output did not contain a workspace manifest".to_string(),
    })),
  }
}
