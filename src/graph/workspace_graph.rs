//! Workspace dependency graph built from a raw manifest + petgraph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A depends on B"
//! - **Nodes**: Workspaces of the monorepo only; external packages are not modeled
//! - **Index**: name → node, plus locations ordered most-specific first for ownership
//! - **Reverse index**: name → names that depend on it, built on demand for closures
//!
//! Built once per invocation and never mutated afterwards.

use crate::core::error::{ManifestError, MonoError, MonoResult};
use crate::manifest::RawManifest;
use crate::utils::{location_contains, normalize_changed_path, normalize_location};
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, VecDeque};

/// A normalized workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
  pub name: String,
  /// Slash-terminated, forward-slash location (`./` for the repository root)
  pub location: String,
  /// Known workspace names only; no self edge
  pub dependencies: BTreeSet<String>,
}

/// Workspace dependency graph.
#[derive(Debug)]
pub struct WorkspaceGraph {
  graph: DiGraph<Workspace, ()>,

  /// Index: workspace name → node index
  name_to_node: HashMap<String, NodeIndex>,

  /// Nodes ordered by location length (desc), then name (asc).
  /// The first location containing a path owns it.
  by_specificity: Vec<NodeIndex>,
}

/// Names that declare a dependency on a given name.
#[derive(Debug, Clone, Default)]
pub struct ReverseIndex {
  dependents: HashMap<String, BTreeSet<String>>,
}

impl ReverseIndex {
  /// Direct dependents of `name` (empty for leaves and unknown names)
  pub fn dependents_of<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
    self.dependents.get(name).into_iter().flatten().map(String::as_str)
  }
}

/// Normalize a raw manifest into a [`WorkspaceGraph`].
///
/// Locations become slash-terminated with forward slashes; dependency lists
/// become sets of known workspace names. Dangling names and self references
/// are dropped silently. The only failure is an entry without a usable location.
pub fn normalize(raw: &RawManifest) -> MonoResult<WorkspaceGraph> {
  let mut graph = DiGraph::new();
  let mut name_to_node = HashMap::new();

  for (name, entry) in &raw.workspaces {
    let location = entry
      .location
      .as_deref()
      .and_then(normalize_location)
      .ok_or_else(|| {
        MonoError::Manifest(ManifestError::Malformed {
          workspace: name.clone(),
          reason: if entry.location.is_none() {
            "missing \"location\"".to_string()
          } else {
            "empty \"location\"".to_string()
          },
        })
      })?;

    let node = graph.add_node(Workspace {
      name: name.clone(),
      location,
      dependencies: BTreeSet::new(),
    });
    name_to_node.insert(name.clone(), node);
  }

  for (name, entry) in &raw.workspaces {
    let from = name_to_node[name];
    let declared: BTreeSet<&String> = entry.dependencies.iter().collect();

    for dep in declared {
      if dep == name {
        log::debug!("{}: dropping self dependency", name);
        continue;
      }
      match name_to_node.get(dep) {
        Some(&to) => {
          graph.add_edge(from, to, ());
          graph[from].dependencies.insert(dep.clone());
        }
        None => log::debug!("{}: '{}' is not a workspace, treating as external", name, dep),
      }
    }
  }

  let mut by_specificity: Vec<NodeIndex> = graph.node_indices().collect();
  by_specificity.sort_by(|&a, &b| {
    let (wa, wb) = (&graph[a], &graph[b]);
    wb.location
      .len()
      .cmp(&wa.location.len())
      .then_with(|| wa.name.cmp(&wb.name))
  });

  let workspace_graph = WorkspaceGraph {
    graph,
    name_to_node,
    by_specificity,
  };

  for cycle in workspace_graph.find_cycles() {
    log::warn!("dependency cycle between workspaces: {}", cycle.join(" ↔ "));
  }

  log::debug!("normalized {} workspaces", workspace_graph.len());
  Ok(workspace_graph)
}

impl WorkspaceGraph {
  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  /// Get a workspace by name.
  pub fn get(&self, name: &str) -> Option<&Workspace> {
    self.name_to_node.get(name).map(|&idx| &self.graph[idx])
  }

  /// All workspaces, sorted by name.
  pub fn workspaces(&self) -> Vec<&Workspace> {
    let mut all: Vec<_> = self.graph.node_weights().collect();
    all.sort_by(|a, b| a.name.cmp(&b.name));
    all
  }

  /// Get all workspace names, sorted.
  pub fn names(&self) -> Vec<String> {
    self.workspaces().into_iter().map(|ws| ws.name.clone()).collect()
  }

  /// Map a changed file path to the workspace owning it.
  ///
  /// A workspace owns a path when its location is a prefix of the path; with
  /// nested locations the longest one wins. Returns `None` for paths outside
  /// every workspace.
  pub fn owner_of(&self, path: &str) -> Option<&str> {
    let normalized = normalize_changed_path(path);

    self
      .by_specificity
      .iter()
      .map(|&idx| &self.graph[idx])
      .find(|ws| location_contains(&ws.location, &normalized))
      .map(|ws| ws.name.as_str())
  }

  /// Build the name → dependents index.
  pub fn reverse_index(&self) -> ReverseIndex {
    let mut dependents: HashMap<String, BTreeSet<String>> = HashMap::new();

    for edge in self.graph.raw_edges() {
      let dependent = &self.graph[edge.source()].name;
      let dependency = &self.graph[edge.target()].name;
      dependents.entry(dependency.clone()).or_default().insert(dependent.clone());
    }

    ReverseIndex { dependents }
  }

  /// Map workspace names back to their locations, sorted. Unknown names are skipped.
  pub fn locations<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut locations: Vec<String> = names
      .into_iter()
      .filter_map(|name| self.get(name))
      .map(|ws| ws.location.clone())
      .collect();
    locations.sort();
    locations.dedup();
    locations
  }

  /// Get direct dependencies of a workspace (what it uses).
  pub fn direct_dependencies(&self, name: &str) -> MonoResult<Vec<String>> {
    self.neighbors(name, Direction::Outgoing)
  }

  /// Get direct dependents of a workspace (what uses it).
  pub fn direct_dependents(&self, name: &str) -> MonoResult<Vec<String>> {
    self.neighbors(name, Direction::Incoming)
  }

  fn neighbors(&self, name: &str, direction: Direction) -> MonoResult<Vec<String>> {
    let node_idx = self.find_node(name)?;

    let mut names: Vec<String> = self
      .graph
      .neighbors_directed(node_idx, direction)
      .map(|idx| self.graph[idx].name.clone())
      .collect();

    names.sort();
    names.dedup();
    Ok(names)
  }

  /// Detect dependency cycles using Tarjan's SCC algorithm.
  ///
  /// Returns strongly connected components with size > 1, each sorted.
  pub fn find_cycles(&self) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = algo::tarjan_scc(&self.graph)
      .into_iter()
      .filter(|component| component.len() > 1)
      .map(|component| {
        let mut names: Vec<String> = component.into_iter().map(|idx| self.graph[idx].name.clone()).collect();
        names.sort();
        names
      })
      .collect();
    cycles.sort();
    cycles
  }

  /// Find node index by workspace name.
  fn find_node(&self, name: &str) -> MonoResult<NodeIndex> {
    self.name_to_node.get(name).copied().ok_or_else(|| {
      MonoError::message(format!(
        "Workspace '{}' not found. Available workspaces: {}",
        name,
        self.names().join(", ")
      ))
    })
  }
}

/// Everything that transitively depends on `seed`, plus `seed` itself.
///
/// Breadth-first over the reverse index; a name is expanded at most once, so
/// diamonds and declared cycles terminate. O(V + E).
pub fn dependents_closure(seed: &BTreeSet<String>, graph: &WorkspaceGraph, reverse: &ReverseIndex) -> BTreeSet<String> {
  let mut visited: BTreeSet<String> = seed.clone();
  let mut queue: VecDeque<&str> = seed.iter().map(String::as_str).collect();

  for name in seed {
    if graph.get(name).is_none() {
      log::debug!("closure seed '{}' is not a workspace", name);
    }
  }

  while let Some(current) = queue.pop_front() {
    for dependent in reverse.dependents_of(current) {
      if visited.insert(dependent.to_string()) {
        queue.push_back(dependent);
      }
    }
  }

  visited
}
