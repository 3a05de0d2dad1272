//! Core building blocks shared by every command
//!
//! - **config**: monotest.toml parsing and validation
//! - **context**: Unified workspace context passed to commands
//! - **error**: Error types with contextual help messages and exit codes
//! - **vcs**: Change detection (system git, explicit file lists)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
