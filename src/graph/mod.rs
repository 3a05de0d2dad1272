//! Workspace graph and change-driven test selection
//!
//! Built on petgraph; the raw manifest is normalized once per run and the
//! selection is recomputed from scratch for every change set.

pub mod affected;
pub mod workspace_graph;

pub use affected::{Selection, select_targets};
pub use workspace_graph::WorkspaceGraph;
