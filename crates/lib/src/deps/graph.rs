use std::collections::HashMap;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use tracing::debug;

use super::types::{DependencyRecord, DepsError};

/// Topological ordering over source files.
///
/// Implementations must be deterministic: the same entries always yield the
/// same order, with every file placed after the files it requires.
pub trait DependencyOrder {
  /// Check whether `path` is a node of the graph.
  fn contains(&self, path: &Path) -> bool;

  /// Every file transitively required by `entries`, dependencies first.
  ///
  /// Each file appears once even if reachable from several entries.
  fn order(&self, entries: &[PathBuf]) -> Result<Vec<PathBuf>, DepsError>;
}

/// In-memory dependency graph keyed by file path and provided symbol.
#[derive(Debug, Default)]
pub struct DependencyGraph {
  records: Vec<DependencyRecord>,
  by_path: HashMap<PathBuf, usize>,
  by_symbol: HashMap<String, usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
  New,
  Active,
  Done,
}

impl DependencyGraph {
  /// Build a graph from dependency records.
  ///
  /// # Errors
  ///
  /// Returns `DuplicatePath` or `DuplicateProvide` if two records collide.
  pub fn new(records: Vec<DependencyRecord>) -> Result<Self, DepsError> {
    let mut by_path = HashMap::new();
    let mut by_symbol: HashMap<String, usize> = HashMap::new();

    for (idx, record) in records.iter().enumerate() {
      if by_path.insert(record.path.clone(), idx).is_some() {
        return Err(DepsError::DuplicatePath(record.path.clone()));
      }
      for symbol in &record.provides {
        if let Some(&first) = by_symbol.get(symbol) {
          return Err(DepsError::DuplicateProvide {
            symbol: symbol.clone(),
            first: records[first].path.clone(),
            second: record.path.clone(),
          });
        }
        by_symbol.insert(symbol.clone(), idx);
      }
    }

    Ok(Self {
      records,
      by_path,
      by_symbol,
    })
  }

  /// Load a graph from a JSON dependency manifest.
  ///
  /// Relative record paths are resolved against the manifest's directory.
  pub async fn load(manifest: &Path) -> Result<Self, DepsError> {
    let content = tokio::fs::read_to_string(manifest).await.map_err(|e| DepsError::Read {
      path: manifest.to_path_buf(),
      message: e.to_string(),
    })?;

    let mut records: Vec<DependencyRecord> = serde_json::from_str(&content).map_err(|e| DepsError::Parse {
      path: manifest.to_path_buf(),
      message: e.to_string(),
    })?;

    let base_dir = manifest.parent().unwrap_or(Path::new(""));
    for record in &mut records {
      record.path = base_dir.join(&record.path).clean();
    }

    debug!(manifest = %manifest.display(), records = records.len(), "loaded dependency manifest");
    Self::new(records)
  }

  /// Number of records in the graph.
  pub fn len(&self) -> usize {
    self.records.len()
  }

  /// Returns true if the graph has no records.
  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Get the record for a path.
  pub fn get(&self, path: &Path) -> Option<&DependencyRecord> {
    self.by_path.get(path).map(|&idx| &self.records[idx])
  }

  fn visit(
    &self,
    idx: usize,
    state: &mut [Visit],
    stack: &mut Vec<usize>,
    out: &mut Vec<PathBuf>,
  ) -> Result<(), DepsError> {
    match state[idx] {
      Visit::Done => return Ok(()),
      Visit::Active => {
        let start = stack.iter().position(|&i| i == idx).unwrap_or(0);
        let chain = stack[start..]
          .iter()
          .chain(std::iter::once(&idx))
          .map(|&i| self.records[i].path.display().to_string())
          .collect::<Vec<_>>()
          .join(" -> ");
        return Err(DepsError::CircularRequire { chain });
      }
      Visit::New => {}
    }

    state[idx] = Visit::Active;
    stack.push(idx);

    let record = &self.records[idx];
    for symbol in &record.requires {
      let &dep = self.by_symbol.get(symbol).ok_or_else(|| DepsError::MissingProvide {
        symbol: symbol.clone(),
        required_by: record.path.clone(),
      })?;
      // a file requiring its own symbol is not a cycle
      if dep != idx {
        self.visit(dep, state, stack, out)?;
      }
    }

    stack.pop();
    state[idx] = Visit::Done;
    out.push(record.path.clone());
    Ok(())
  }
}

impl DependencyOrder for DependencyGraph {
  fn contains(&self, path: &Path) -> bool {
    self.by_path.contains_key(path)
  }

  fn order(&self, entries: &[PathBuf]) -> Result<Vec<PathBuf>, DepsError> {
    let mut state = vec![Visit::New; self.records.len()];
    let mut stack = Vec::new();
    let mut out = Vec::new();

    for entry in entries {
      let &idx = self
        .by_path
        .get(entry)
        .ok_or_else(|| DepsError::UnknownEntry(entry.clone()))?;
      self.visit(idx, &mut state, &mut stack, &mut out)?;
    }

    Ok(out)
  }
}
