//! CLI commands for monotest
//!
//! - **affected**: Show workspaces affected by changes
//! - **test**: Run the test runner for affected workspaces, per CI shard
//! - **workspaces**: List declared workspace manifests and their dependencies
//!
//! All commands accept `&WorkspaceContext` to avoid redundant workspace loads.

pub mod affected;
pub mod workspaces;

pub use affected::run_affected;
pub use test::{TestOptions, run_test};
pub use workspaces::run_workspaces;
