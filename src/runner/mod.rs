//! Test execution
//!
//! - **scheduler**: shard → timezone assignment, resolved into an environment overlay
//! - **dispatch**: the test runner seam and the single place a runner is spawned
//!
//! Nothing here mutates the process environment; the overlay is applied to the
//! child command only.

pub mod dispatch;
pub mod scheduler;

pub use dispatch::{CommandRunner, TestRunner, dispatch};
pub use scheduler::{ShardEnvironment, ShardSpec, TimezoneRegistry};
