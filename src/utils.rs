//! Utility functions for cross-platform path handling
//!
//! Workspace locations and changed paths are compared as plain strings with
//! forward slashes, so everything entering the graph goes through here first.

use std::path::Path;

/// Location string used for a workspace rooted at the repository root
pub const ROOT_LOCATION: &str = "./";

/// Replace platform separators with forward slashes
pub fn normalize_separators(path: &str) -> String {
  path.replace('\\', "/")
}

/// Strip any number of leading `./` segments
fn strip_dot_prefix(mut path: &str) -> &str {
  while let Some(rest) = path.strip_prefix("./") {
    path = rest;
  }
  path
}

/// Normalize a workspace location into a slash-terminated prefix.
///
/// Returns `None` for an empty location. `.` and `./` become [`ROOT_LOCATION`].
///
/// - `src/apps` → `src/apps/`
/// - `src\packages\utils\` → `src/packages/utils/`
/// - `./src/apps` → `src/apps/`
pub fn normalize_location(raw: &str) -> Option<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  let slashed = normalize_separators(trimmed);
  let body = strip_dot_prefix(&slashed);
  let body = body.trim_end_matches('/');

  if body.is_empty() || body == "." {
    return Some(ROOT_LOCATION.to_string());
  }

  Some(format!("{}/", body))
}

/// Normalize a changed file path for prefix matching against locations.
///
/// Leading `./` and `/` are dropped so `/src/a.js`, `./src/a.js` and `src/a.js`
/// all compare equal.
pub fn normalize_changed_path(raw: &str) -> String {
  let slashed = normalize_separators(raw.trim());
  strip_dot_prefix(&slashed).trim_start_matches('/').to_string()
}

/// Does a normalized location contain a normalized changed path?
///
/// Changed paths have their leading `/` stripped, so an absolute location is
/// compared the same way.
pub fn location_contains(location: &str, path: &str) -> bool {
  location == ROOT_LOCATION || path.starts_with(location.trim_start_matches('/'))
}

/// Convert a path to Git format (always forward slashes)
///
/// Git expects paths with forward slashes, even on Windows.
pub fn path_to_git_format(path: &Path) -> String {
  normalize_separators(&path.to_string_lossy())
}

/// Re-anchor a path reported relative to the git top-level so it is relative
/// to the workspace root instead.
///
/// Paths outside the workspace root are returned absolute, which keeps them
/// out of every workspace location.
pub fn reanchor_to_workspace(git_root: &Path, workspace_root: &Path, git_path: &str) -> String {
  let absolute = git_root.join(git_path);
  match absolute.strip_prefix(workspace_root) {
    Ok(relative) => path_to_git_format(relative),
    Err(_) => path_to_git_format(&absolute),
  }
}
