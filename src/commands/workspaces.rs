//! `monotest workspaces` - List workspace manifests and their dependencies

use crate::core::context::WorkspaceContext;
use crate::core::error::MonoResult;
use crate::graph::WorkspaceGraph;
use crate::manifest::globs::ManifestGlobSource;
use crate::utils::{normalize_location, path_to_git_format};
use std::path::Path;

/// One discovered manifest, joined with the graph entry at the same location
struct Listing {
  manifest: String,
  name: Option<String>,
  dependencies: Vec<String>,
  dependents: Vec<String>,
}

/// Run the workspaces command
pub fn run_workspaces(ctx: &WorkspaceContext, path: Option<String>, json: bool) -> MonoResult<()> {
  let source = ManifestGlobSource::load(ctx.workspace_root())?;

  let mut manifests = Vec::new();
  let collect = |manifest: &Path| manifests.push(manifest.to_path_buf());
  match path.as_deref() {
    Some(dir) => source.iterate_workspaces_in_path(dir, collect)?,
    None => source.iterate_workspaces(collect)?,
  }

  let graph = match ctx.load_graph() {
    Ok(graph) => Some(graph),
    Err(e) => {
      log::warn!("workspace graph unavailable, listing manifests only: {}", e);
      None
    }
  };

  let listings = manifests
    .iter()
    .map(|manifest| listing_for(ctx.workspace_root(), manifest, graph.as_ref()))
    .collect::<MonoResult<Vec<_>>>()?;

  if json {
    display_json(&listings)
  } else {
    display_text(source.patterns(), &listings);
    Ok(())
  }
}

fn listing_for(root: &Path, manifest: &Path, graph: Option<&WorkspaceGraph>) -> MonoResult<Listing> {
  let relative = manifest.strip_prefix(root).unwrap_or(manifest);
  let mut listing = Listing {
    manifest: path_to_git_format(relative),
    name: None,
    dependencies: Vec::new(),
    dependents: Vec::new(),
  };

  let Some(graph) = graph else {
    return Ok(listing);
  };

  let location = relative
    .parent()
    .and_then(|dir| normalize_location(&path_to_git_format(dir)));
  let workspace = graph
    .workspaces()
    .into_iter()
    .find(|ws| Some(&ws.location) == location.as_ref());

  if let Some(workspace) = workspace {
    listing.dependencies = graph.direct_dependencies(&workspace.name)?;
    listing.dependents = graph.direct_dependents(&workspace.name)?;
    listing.name = Some(workspace.name.clone());
  }

  Ok(listing)
}

fn display_text(patterns: &[String], listings: &[Listing]) {
  println!("Workspaces ({})", patterns.join(", "));
  println!("==========");
  println!();

  for listing in listings {
    match &listing.name {
      Some(name) => println!("📦 {} ({})", name, listing.manifest),
      None => println!("📄 {}", listing.manifest),
    }
    if !listing.dependencies.is_empty() {
      println!("   depends on: {}", listing.dependencies.join(", "));
    }
    if !listing.dependents.is_empty() {
      println!("   used by:    {}", listing.dependents.join(", "));
    }
  }

  println!();
  println!("Total: {}", listings.len());
}

fn display_json(listings: &[Listing]) -> MonoResult<()> {
  use serde_json::json;

  let output: Vec<_> = listings
    .iter()
    .map(|listing| {
      json!({
          "manifest": listing.manifest,
          "name": listing.name,
          "dependencies": listing.dependencies,
          "dependents": listing.dependents
      })
    })
    .collect();

  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}
