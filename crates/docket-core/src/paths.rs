use crate::error::{DocketError, Result};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DOCKET_DIR: &str = ".docket";
pub const CONFIG_FILE: &str = ".docket/config.yaml";

/// Scratch file for unfiled ideas; never a work item.
pub const IDEAS_FILE: &str = "IDEAS.md";
pub const TEMPLATE_MARKER: &str = "template";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn docket_dir(root: &Path) -> PathBuf {
    root.join(DOCKET_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn status_dir(root: &Path, folder: &str) -> PathBuf {
    root.join(folder)
}

/// Path relative to `root` for display, falling back to the full path.
pub fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// True when a root-relative path must not be treated as a work item.
pub fn is_excluded(relative: &Path) -> bool {
    if relative.file_name().and_then(|n| n.to_str()) == Some(IDEAS_FILE) {
        return true;
    }
    relative.components().any(|c| match c {
        Component::Normal(seg) => seg.to_string_lossy().contains(TEMPLATE_MARKER),
        _ => false,
    })
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_string_lossy().starts_with('.')
}

/// Find every markdown work item under `root`, sorted by path.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_hidden_dir(e));
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if is_excluded(relative) {
            debug!(path = %relative.display(), "skipping excluded file");
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    Ok(files)
}

// ---------------------------------------------------------------------------
// Root confinement
// ---------------------------------------------------------------------------

/// Reject `path` unless it resolves to a location inside `root`.
pub fn ensure_within_root(root: &Path, path: &Path) -> Result<PathBuf> {
    let root = root.canonicalize()?;
    let resolved = if path.exists() {
        path.canonicalize()?
    } else {
        let parent = path
            .parent()
            .ok_or_else(|| DocketError::PathOutsideRoot(path.to_path_buf()))?;
        let name = path
            .file_name()
            .ok_or_else(|| DocketError::PathOutsideRoot(path.to_path_buf()))?;
        parent.canonicalize()?.join(name)
    };
    if !resolved.starts_with(&root) {
        return Err(DocketError::PathOutsideRoot(path.to_path_buf()));
    }
    Ok(resolved)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
