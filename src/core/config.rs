use crate::core::error::{ConfigError, MonoError, MonoResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for monotest
/// Searched in order: monotest.toml, .monotest.toml, .config/monotest.toml
///
/// Every table is optional; a repository without a config file runs with the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonotestConfig {
  #[serde(default)]
  pub manifest: ManifestConfig,
  #[serde(default)]
  pub changes: ChangesConfig,
  #[serde(default)]
  pub runner: RunnerConfig,
  #[serde(default)]
  pub shards: ShardsConfig,
}

/// Where the raw workspace manifest comes from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestConfig {
  #[serde(default)]
  pub provider: ManifestProviderKind,

  /// JSON manifest path (provider = "file"), relative to the workspace root
  #[serde(default)]
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestProviderKind {
  /// yarn when package.json exists, otherwise cargo
  #[default]
  Auto,
  Yarn,
  Cargo,
  File,
}

/// Change detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangesConfig {
  /// Baseline branch (default: "origin/master")
  #[serde(default = "default_base")]
  pub base: String,

  /// Globs a path outside every workspace must match to be run as a test file.
  /// Empty = every unmatched path is forwarded.
  #[serde(default)]
  pub tests: Vec<String>,
}

fn default_base() -> String {
  "origin/master".to_string()
}

impl Default for ChangesConfig {
  fn default() -> Self {
    Self {
      base: default_base(),
      tests: Vec::new(),
    }
  }
}

/// Test runner invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
  /// Runner executable (default: "jest")
  #[serde(default = "default_runner_command")]
  pub command: String,

  /// Arguments placed before the selected locations
  #[serde(default = "default_runner_args")]
  pub args: Vec<String>,

  /// Environment variable carrying the shard timezone (default: "TZ")
  #[serde(default = "default_timezone_var")]
  pub timezone_var: String,
}

fn default_runner_command() -> String {
  "jest".to_string()
}

fn default_runner_args() -> Vec<String> {
  vec!["--config=jest.config.js".to_string()]
}

fn default_timezone_var() -> String {
  "TZ".to_string()
}

impl Default for RunnerConfig {
  fn default() -> Self {
    Self {
      command: default_runner_command(),
      args: default_runner_args(),
      timezone_var: default_timezone_var(),
    }
  }
}

/// Shard → timezone registry. Index 0 is the baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardsConfig {
  #[serde(default = "default_timezones")]
  pub timezones: Vec<String>,
}

fn default_timezones() -> Vec<String> {
  vec![
    "UTC".to_string(),
    "Asia/Tokyo".to_string(),   // +9
    "America/Lima".to_string(), // -5
  ]
}

impl Default for ShardsConfig {
  fn default() -> Self {
    Self {
      timezones: default_timezones(),
    }
  }
}

impl MonotestConfig {
  /// Find config file in search order: monotest.toml, .monotest.toml, .config/monotest.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("monotest.toml"),
      path.join(".monotest.toml"),
      path.join(".config").join("monotest.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists
  pub fn load(path: &Path) -> MonoResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      log::debug!("no monotest.toml under {}, using defaults", path.display());
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).map_err(|e| {
      MonoError::Config(ConfigError::Invalid {
        path: config_path.clone(),
        reason: e.to_string(),
      })
    })?;

    log::debug!("loaded config from {}", config_path.display());
    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> MonoResult<Self> {
    let config: MonotestConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> MonoResult<()> {
    if self.manifest.provider == ManifestProviderKind::File && self.manifest.path.is_none() {
      return Err(MonoError::Config(ConfigError::MissingField {
        field: "manifest.path (required when provider = \"file\")".to_string(),
      }));
    }

    if self.shards.timezones.is_empty() {
      return Err(MonoError::with_help(
        "shards.timezones must list at least the baseline timezone",
        "Use timezones = [\"UTC\"] to run every shard in UTC",
      ));
    }

    if self.runner.command.trim().is_empty() {
      return Err(MonoError::Config(ConfigError::MissingField {
        field: "runner.command".to_string(),
      }));
    }

    for pattern in &self.changes.tests {
      glob::Pattern::new(pattern)?;
    }

    Ok(())
  }
}
