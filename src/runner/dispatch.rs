//! Test runner dispatch
//!
//! The runner receives: configured args, then the selected locations, then
//! the caller's passthrough args verbatim.

use super::scheduler::{EnvOverlay, ShardEnvironment};
use crate::core::config::RunnerConfig;
use crate::core::error::{MonoError, MonoResult, RunnerError};
use std::path::{Path, PathBuf};
use std::process::Command;

/// External test runner
pub trait TestRunner {
  /// Run tests scoped to `targets`, inheriting stdio. Returns the exit status.
  fn run(&self, targets: &[String], passthrough: &[String], env: &EnvOverlay) -> MonoResult<i32>;

  /// Command line for dry runs and logs
  fn describe(&self, targets: &[String], passthrough: &[String]) -> String;
}

/// Runs a configured executable (jest by default)
pub struct CommandRunner {
  command: String,
  args: Vec<String>,
  cwd: PathBuf,
}

impl CommandRunner {
  pub fn new(config: &RunnerConfig, cwd: &Path) -> Self {
    Self {
      command: config.command.clone(),
      args: config.args.clone(),
      cwd: cwd.to_path_buf(),
    }
  }

  fn arguments<'a>(&'a self, targets: &'a [String], passthrough: &'a [String]) -> impl Iterator<Item = &'a String> {
    self.args.iter().chain(targets).chain(passthrough)
  }
}

impl TestRunner for CommandRunner {
  fn run(&self, targets: &[String], passthrough: &[String], env: &EnvOverlay) -> MonoResult<i32> {
    let program = which::which(&self.command).map_err(|_| {
      MonoError::Runner(RunnerError::NotFound {
        command: self.command.clone(),
      })
    })?;

    let mut cmd = Command::new(program);
    cmd.current_dir(&self.cwd).args(self.arguments(targets, passthrough));
    env.apply(&mut cmd);

    log::debug!("executing: {}", self.describe(targets, passthrough));
    let status = cmd.status().map_err(|e| {
      MonoError::Runner(RunnerError::SpawnFailed {
        command: self.command.clone(),
        reason: e.to_string(),
      })
    })?;

    // Killed by a signal: no code, report a generic failure
    Ok(status.code().unwrap_or(1))
  }

  fn describe(&self, targets: &[String], passthrough: &[String]) -> String {
    std::iter::once(&self.command)
      .chain(self.arguments(targets, passthrough))
      .cloned()
      .collect::<Vec<_>>()
      .join(" ")
  }
}

/// Run the tests for one shard.
///
/// A non-zero runner exit becomes [`RunnerError::TestsFailed`] carrying the
/// runner's exit status, which `main` exits with.
pub fn dispatch(
  runner: &dyn TestRunner,
  targets: &[String],
  passthrough: &[String],
  shard_env: &ShardEnvironment,
) -> MonoResult<()> {
  log::info!("Running tests in timezone: {}", shard_env.timezone);

  let code = runner.run(targets, passthrough, &shard_env.env)?;
  if code != 0 {
    return Err(MonoError::Runner(RunnerError::TestsFailed { code }));
  }

  Ok(())
}
