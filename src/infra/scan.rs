//! Input discovery: flat scan of a directory for supported activity files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Input formats the merge engine can dispatch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Gpx,
    Tcx,
}

impl InputKind {
    /// Classify a path by its extension, case-insensitive.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "gpx" => Some(InputKind::Gpx),
            "tcx" => Some(InputKind::Tcx),
            _ => None,
        }
    }
}

/// List supported activity files directly under `dir`, sorted by path for
/// a deterministic merge order.
pub fn find_activity_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("reading input directory {}", dir.display()))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() && InputKind::from_path(&path).is_some() {
            found.push(path);
        }
    }

    found.sort();
    debug!("found {} activity files in {}", found.len(), dir.display());
    Ok(found)
}
