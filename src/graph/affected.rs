//! Affected workspace analysis
//!
//! Given a set of changed files, determine:
//! - Which workspaces directly contain those files (dirty)
//! - Which workspaces transitively depend on the dirty ones (testing = dirty + dependents)
//! - Which changed files live outside every workspace (unmatched, forwarded as-is)

use super::workspace_graph::{WorkspaceGraph, dependents_closure};
use std::collections::BTreeSet;

/// Result of a test-target selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
  /// Workspaces containing at least one changed file
  pub dirty: BTreeSet<String>,

  /// Dirty workspaces plus everything depending on them
  pub testing: BTreeSet<String>,

  /// Changed paths owned by no workspace, verbatim and in input order
  pub unmatched: Vec<String>,
}

impl Selection {
  pub fn is_empty(&self) -> bool {
    self.testing.is_empty() && self.unmatched.is_empty()
  }

  /// Workspaces pulled in only through dependencies
  pub fn dependents(&self) -> BTreeSet<String> {
    self.testing.difference(&self.dirty).cloned().collect()
  }

  /// Final list handed to the test runner: `locations(testing) ∪ unmatched`
  pub fn target_locations(&self, graph: &WorkspaceGraph) -> Vec<String> {
    let mut targets = graph.locations(&self.testing);
    for path in &self.unmatched {
      if !targets.contains(path) {
        targets.push(path.clone());
      }
    }
    targets
  }

  /// Keep only the unmatched paths accepted by `keep`
  pub fn retain_unmatched(&mut self, keep: impl Fn(&str) -> bool) {
    self.unmatched.retain(|path| keep(path));
  }
}

/// Select the workspaces to test for a batch of changed paths.
///
/// Algorithm:
/// 1. Map each path → owning workspace (longest location wins)
/// 2. Collect unowned paths verbatim
/// 3. Close the dirty set over reverse dependencies
///
/// Logs the dirty and testing sets for CI visibility; the logs never change the result.
pub fn select_targets(graph: &WorkspaceGraph, changed_files: &[String]) -> Selection {
  let mut dirty = BTreeSet::new();
  let mut unmatched = Vec::new();

  for path in changed_files {
    match graph.owner_of(path) {
      Some(owner) => {
        dirty.insert(owner.to_string());
      }
      None => {
        if !unmatched.contains(path) {
          unmatched.push(path.clone());
        }
      }
    }
  }

  let testing = if dirty.is_empty() {
    BTreeSet::new()
  } else {
    dependents_closure(&dirty, graph, &graph.reverse_index())
  };

  // Warn level: the reports must survive --quiet
  log::warn!("dirty workspaces: {}", join(&dirty));
  log::warn!("testing workspaces: {}", join(&testing));

  Selection {
    dirty,
    testing,
    unmatched,
  }
}

fn join(names: &BTreeSet<String>) -> String {
  if names.is_empty() {
    "(none)".to_string()
  } else {
    names.iter().cloned().collect::<Vec<_>>().join(", ")
  }
}
