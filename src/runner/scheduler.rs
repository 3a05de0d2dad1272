//! Shard scheduling
//!
//! Each CI shard runs the same selection in a different timezone so that
//! date-handling bugs surface in CI. Shard `i` (1-based) of a multi-shard run
//! gets `registry[i - 1]`; single-shard runs always get the baseline.

use crate::core::error::{MonoError, MonoResult, ShardError};
use std::collections::BTreeMap;
use std::fmt;
use std::process::Command;

/// Position of this process among the parallel CI shards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardSpec {
  /// 1-based
  pub index: usize,
  pub total: usize,
}

impl ShardSpec {
  pub fn new(index: usize, total: usize) -> Self {
    Self { index, total }
  }

  /// The only shard of a non-sharded run
  pub fn single() -> Self {
    Self { index: 1, total: 1 }
  }
}

impl Default for ShardSpec {
  fn default() -> Self {
    Self::single()
  }
}

impl fmt::Display for ShardSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.index, self.total)
  }
}

/// Ordered timezone registry; index 0 is the baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneRegistry {
  timezones: Vec<String>,
}

impl Default for TimezoneRegistry {
  fn default() -> Self {
    Self::new(vec![
      "UTC".to_string(),
      "Asia/Tokyo".to_string(),
      "America/Lima".to_string(),
    ])
  }
}

impl TimezoneRegistry {
  /// An empty list is replaced by a UTC-only registry.
  pub fn new(timezones: Vec<String>) -> Self {
    if timezones.is_empty() {
      return Self {
        timezones: vec!["UTC".to_string()],
      };
    }
    Self { timezones }
  }

  pub fn len(&self) -> usize {
    self.timezones.len()
  }

  pub fn baseline(&self) -> &str {
    &self.timezones[0]
  }

  /// Timezone assigned to a shard.
  ///
  /// # Errors
  /// [`ShardError::Unsupported`] when a multi-shard index has no registry entry.
  pub fn timezone_for(&self, shard: ShardSpec) -> MonoResult<&str> {
    if shard.total <= 1 {
      return Ok(self.baseline());
    }

    shard
      .index
      .checked_sub(1)
      .and_then(|slot| self.timezones.get(slot))
      .map(String::as_str)
      .ok_or(MonoError::Shard(ShardError::Unsupported {
        index: shard.index,
        total: shard.total,
        supported: self.timezones.len(),
      }))
  }

  /// Resolve the environment a shard's test run executes with.
  pub fn environment_for(&self, shard: ShardSpec, timezone_var: &str) -> MonoResult<ShardEnvironment> {
    let timezone = self.timezone_for(shard)?.to_string();
    let env = EnvOverlay::new().with(timezone_var, &timezone);
    Ok(ShardEnvironment { shard, timezone, env })
  }
}

/// Environment variables layered onto the runner's inherited environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
  vars: BTreeMap<String, String>,
}

impl EnvOverlay {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, key: &str, value: &str) -> Self {
    self.vars.insert(key.to_string(), value.to_string());
    self
  }

  #[cfg(test)]
  pub fn get(&self, key: &str) -> Option<&str> {
    self.vars.get(key).map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Apply to a child command (never to this process)
  pub fn apply(&self, cmd: &mut Command) {
    cmd.envs(&self.vars);
  }
}

/// Everything resolved for one shard before dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardEnvironment {
  pub shard: ShardSpec,
  pub timezone: String,
  pub env: EnvOverlay,
}
