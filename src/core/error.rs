//! Error types for monotest with contextual messages and exit codes
//!
//! A single error type categorizes failures and carries a help message where
//! the user can do something about it. Only two failures come out of the
//! selection engine itself (a malformed manifest and an unsupported shard);
//! everything else is a collaborator (git, yarn, cargo, the test runner)
//! failing and is propagated unchanged.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for monotest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, malformed manifest, unsupported shard)
  User,
  /// System error (git, collaborator tools, I/O)
  System,
  /// Validation failure (path is not a workspace directory, etc.)
  Validation,
  /// The test runner's own exit status
  Runner(i32),
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    match self {
      ExitCode::User => 1,
      ExitCode::System => 2,
      ExitCode::Validation => 3,
      ExitCode::Runner(code) => code,
    }
  }
}

/// Main error type for monotest
#[derive(Debug)]
pub enum MonoError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Workspace manifest errors
  Manifest(ManifestError),

  /// Shard scheduling errors
  Shard(ShardError),

  /// Test runner errors
  Runner(RunnerError),

  /// Validation errors
  Validation(ValidationError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl MonoError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    MonoError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    MonoError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      MonoError::Message { message, context, help } => MonoError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      MonoError::Io(err) => MonoError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      MonoError::Config(_) => ExitCode::User,
      MonoError::Git(_) => ExitCode::System,
      MonoError::Manifest(ManifestError::Malformed { .. }) => ExitCode::User,
      MonoError::Manifest(ManifestError::Unavailable { .. }) => ExitCode::System,
      MonoError::Shard(_) => ExitCode::User,
      MonoError::Runner(RunnerError::TestsFailed { code }) => ExitCode::Runner(*code),
      MonoError::Runner(_) => ExitCode::System,
      MonoError::Validation(_) => ExitCode::Validation,
      MonoError::Io(_) => ExitCode::System,
      MonoError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      MonoError::Config(e) => e.help_message(),
      MonoError::Git(e) => e.help_message(),
      MonoError::Manifest(e) => e.help_message(),
      MonoError::Shard(e) => e.help_message(),
      MonoError::Runner(e) => e.help_message(),
      MonoError::Validation(e) => e.help_message(),
      MonoError::Message { help, .. } => help.clone(),
      MonoError::Io(_) => None,
    }
  }
}

impl fmt::Display for MonoError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MonoError::Config(e) => write!(f, "{}", e),
      MonoError::Git(e) => write!(f, "{}", e),
      MonoError::Manifest(e) => write!(f, "{}", e),
      MonoError::Shard(e) => write!(f, "{}", e),
      MonoError::Runner(e) => write!(f, "{}", e),
      MonoError::Validation(e) => write!(f, "{}", e),
      MonoError::Io(e) => write!(f, "I/O error: {}", e),
      MonoError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for MonoError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      MonoError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for MonoError {
  fn from(err: io::Error) -> Self {
    MonoError::Io(err)
  }
}

impl From<String> for MonoError {
  fn from(msg: String) -> Self {
    MonoError::message(msg)
  }
}

impl From<&str> for MonoError {
  fn from(msg: &str) -> Self {
    MonoError::message(msg)
  }
}

impl From<toml_edit::de::Error> for MonoError {
  fn from(err: toml_edit::de::Error) -> Self {
    MonoError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for MonoError {
  fn from(err: serde_json::Error) -> Self {
    MonoError::message(format!("JSON error: {}", err))
  }
}

impl From<cargo_metadata::Error> for MonoError {
  fn from(err: cargo_metadata::Error) -> Self {
    MonoError::Manifest(ManifestError::Unavailable {
      tool: "cargo metadata".to_string(),
      reason: err.to_string(),
    })
  }
}

impl From<glob::PatternError> for MonoError {
  fn from(err: glob::PatternError) -> Self {
    MonoError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<glob::GlobError> for MonoError {
  fn from(err: glob::GlobError) -> Self {
    MonoError::message(format!("Glob traversal error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for MonoError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    MonoError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// A config file exists but is not usable
  Invalid { path: PathBuf, reason: String },

  /// Missing required field
  MissingField { field: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Invalid { .. } => {
        Some("Check the [manifest], [changes], [runner] and [shards] tables of monotest.toml.".to_string())
      }
      ConfigError::MissingField { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Run monotest inside a git checkout, or pass the changed files explicitly with --files: {}",
        path.display()
      )),
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
    }
  }
}

/// Workspace manifest errors
#[derive(Debug)]
pub enum ManifestError {
  /// An entry has no usable location
  Malformed { workspace: String, reason: String },

  /// The tool producing the manifest could not be run or returned garbage
  Unavailable { tool: String, reason: String },
}

impl ManifestError {
  fn help_message(&self) -> Option<String> {
    match self {
      ManifestError::Malformed { workspace, .. } => Some(format!(
        "Every workspace needs a non-empty \"location\". Check the package that declares '{}'.",
        workspace
      )),
      ManifestError::Unavailable { tool, .. } => Some(format!(
        "Make sure `{}` works in this directory, or point --manifest at a JSON file.",
        tool
      )),
    }
  }
}

impl fmt::Display for ManifestError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ManifestError::Malformed { workspace, reason } => {
        write!(f, "Malformed workspace manifest entry '{}': {}", workspace, reason)
      }
      ManifestError::Unavailable { tool, reason } => {
        write!(f, "Could not read workspace manifest from {}: {}", tool, reason)
      }
    }
  }
}

/// Shard scheduling errors
#[derive(Debug)]
pub enum ShardError {
  /// Shard index outside the timezone registry
  Unsupported { index: usize, total: usize, supported: usize },
}

impl ShardError {
  fn help_message(&self) -> Option<String> {
    match self {
      ShardError::Unsupported { supported, .. } => Some(format!(
        "Only {} shard(s) have a registered timezone. Add more under [shards] timezones in monotest.toml.",
        supported
      )),
    }
  }
}

impl fmt::Display for ShardError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShardError::Unsupported { index, total, .. } => {
        write!(f, "CI node with index {} (of {}) is not supported.", index, total)
      }
    }
  }
}

/// Test runner errors
#[derive(Debug)]
pub enum RunnerError {
  /// Runner binary not found on PATH
  NotFound { command: String },

  /// Runner could not be spawned
  SpawnFailed { command: String, reason: String },

  /// Runner exited unsuccessfully
  TestsFailed { code: i32 },
}

impl RunnerError {
  fn help_message(&self) -> Option<String> {
    match self {
      RunnerError::NotFound { command } => Some(format!(
        "Install `{}` or set [runner] command in monotest.toml.",
        command
      )),
      _ => None,
    }
  }
}

impl fmt::Display for RunnerError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RunnerError::NotFound { command } => {
        write!(
          f,
          "Command '{}' doesn't exist in your OS and therefore cannot be executed.",
          command
        )
      }
      RunnerError::SpawnFailed { command, reason } => {
        write!(f, "Failed to execute {}: {}", command, reason)
      }
      RunnerError::TestsFailed { code } => {
        write!(f, "Tests failed with exit code: {}", code)
      }
    }
  }
}

/// Validation errors
#[derive(Debug)]
pub enum ValidationError {
  /// Path does not correspond to any declared workspace glob
  NotWorkspaceDirectory { path: String, patterns: Vec<String> },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::NotWorkspaceDirectory { .. } => {
        Some("Pass one of the directories listed under \"workspaces\" in the root package.json.".to_string())
      }
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::NotWorkspaceDirectory { path, patterns } => {
        write!(
          f,
          "Path {} is not workspace directory. It must be one of: {}",
          path,
          patterns.join(", ")
        )
      }
    }
  }
}

/// Result type alias for monotest
pub type MonoResult<T> = Result<T, MonoError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> MonoResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> MonoResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<MonoError>,
{
  fn context(self, ctx: impl Into<String>) -> MonoResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> MonoResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &MonoError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for MonoError {
  fn from(err: anyhow::Error) -> Self {
    MonoError::message(format!("{:#}", err))
  }
}
