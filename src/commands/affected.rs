//! `monotest affected` - Show which workspaces are affected by changes
//!
//! This command analyzes file changes (via git or `--files`) and determines:
//! - Which workspaces directly contain changed files
//! - Which workspaces transitively depend on those
//! - Which changed files live outside every workspace

use crate::core::context::WorkspaceContext;
use crate::core::error::{MonoError, MonoResult};
use crate::graph::{Selection, WorkspaceGraph, select_targets};
use crate::utils::normalize_changed_path;
use glob::{MatchOptions, Pattern};

/// Output format for affected command
#[derive(Debug, Clone, Copy)]
enum OutputFormat {
  Text,
  Json,
  NamesOnly,
  Locations,
}

impl OutputFormat {
  fn from_str(s: &str) -> MonoResult<Self> {
    match s.to_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      "names" | "names-only" => Ok(Self::NamesOnly),
      "locations" => Ok(Self::Locations),
      _ => Err(MonoError::message(format!(
        "Unknown format '{}'. Valid formats: text, json, names-only, locations",
        s
      ))),
    }
  }
}

/// Run the affected command
pub fn run_affected(ctx: &WorkspaceContext, since: Option<String>, files: Vec<String>, format: String) -> MonoResult<()> {
  let output_format = OutputFormat::from_str(&format)?;

  let graph = ctx.load_graph()?;
  let changed_files = ctx.change_provider(since.as_deref(), files)?.changed_paths()?;
  let selection = select_for_changes(ctx, &graph, &changed_files)?;

  match output_format {
    OutputFormat::Text => display_text(&graph, &selection, &changed_files),
    OutputFormat::Json => display_json(&graph, &selection, &changed_files)?,
    OutputFormat::NamesOnly => selection.testing.iter().for_each(|name| println!("{}", name)),
    OutputFormat::Locations => selection
      .target_locations(&graph)
      .iter()
      .for_each(|location| println!("{}", location)),
  }

  Ok(())
}

/// Select targets and apply the configured test-file filter to unmatched paths
pub(crate) fn select_for_changes(
  ctx: &WorkspaceContext,
  graph: &WorkspaceGraph,
  changed_files: &[String],
) -> MonoResult<Selection> {
  let mut selection = select_targets(graph, changed_files);

  let patterns = &ctx.config.changes.tests;
  if !patterns.is_empty() {
    let compiled = patterns.iter().map(|p| Pattern::new(p)).collect::<Result<Vec<_>, _>>()?;
    selection.retain_unmatched(|path| is_test_file(&compiled, path));
  }

  Ok(selection)
}

fn is_test_file(patterns: &[Pattern], path: &str) -> bool {
  let options = MatchOptions {
    require_literal_separator: true,
    ..MatchOptions::new()
  };
  let normalized = normalize_changed_path(path);
  patterns.iter().any(|p| p.matches_with(&normalized, options))
}

/// Display results in human-readable text format
fn display_text(graph: &WorkspaceGraph, selection: &Selection, changed_files: &[String]) {
  println!("Affected Analysis");
  println!("=================");
  println!();

  println!("Changed files: {}", changed_files.len());
  if !changed_files.is_empty() && changed_files.len() <= 20 {
    for file in changed_files {
      println!("  {}", file);
    }
    println!();
  }

  println!("Dirty workspaces: {}", selection.dirty.len());
  for name in &selection.dirty {
    println!("  📦 {}", name);
  }
  println!();

  let dependents = selection.dependents();
  println!("Transitive dependents: {}", dependents.len());
  for name in &dependents {
    println!("  ⬆  {}", name);
  }
  println!();

  println!("Outside any workspace: {}", selection.unmatched.len());
  for path in &selection.unmatched {
    println!("  📄 {}", path);
  }
  println!();

  let targets = selection.target_locations(graph);
  println!("Test targets: {}", targets.len());
  for target in &targets {
    println!("  🎯 {}", target);
  }
}

/// Display results in JSON format
fn display_json(graph: &WorkspaceGraph, selection: &Selection, changed_files: &[String]) -> MonoResult<()> {
  use serde_json::json;

  let dependents = selection.dependents();
  let targets = selection.target_locations(graph);

  let output = json!({
      "changed_files": changed_files,
      "impact": {
          "dirty": selection.dirty,
          "dependents": dependents,
          "testing": selection.testing,
          "unmatched": selection.unmatched,
          "targets": targets
      },
      "summary": {
          "changed_files_count": changed_files.len(),
          "dirty_count": selection.dirty.len(),
          "dependents_count": dependents.len(),
          "testing_count": selection.testing.len(),
          "unmatched_count": selection.unmatched.len()
      }
  });

  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}
