use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::consts::DESCRIPTOR_EXTENSION;

use super::types::BuildError;

/// Find every descriptor under `dir`, sorted by path.
///
/// # Errors
///
/// Returns [`BuildError::Discover`] if the directory cannot be walked.
pub fn discover_units(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
  let mut units = Vec::new();
  for entry in WalkDir::new(dir).follow_links(true) {
    let entry = entry.map_err(|e| BuildError::Discover {
      path: dir.to_path_buf(),
      message: e.to_string(),
    })?;
    let is_descriptor = entry.file_type().is_file()
      && entry.path().extension().and_then(|ext| ext.to_str()) == Some(DESCRIPTOR_EXTENSION);
    if is_descriptor {
      units.push(entry.into_path());
    }
  }
  units.sort();
  debug!(dir = ?dir, count = units.len(), "discovered entry configs");
  Ok(units)
}
