use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One source file with the symbols it provides and requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
  pub path: PathBuf,
  #[serde(default)]
  pub provides: Vec<String>,
  #[serde(default)]
  pub requires: Vec<String>,
}

/// Errors from loading or querying the dependency graph.
///
/// Messages are kept as strings so a failed load can be shared by every
/// build unit waiting on it.
#[derive(Debug, Clone, Error)]
pub enum DepsError {
  /// The dependency manifest could not be read.
  #[error("failed to read dependency manifest {path}: {message}")]
  Read { path: PathBuf, message: String },

  /// The dependency manifest is not a valid record list.
  #[error("invalid dependency manifest {path}: {message}")]
  Parse { path: PathBuf, message: String },

  /// Two records share a path.
  #[error("duplicate dependency record: {0}")]
  DuplicatePath(PathBuf),

  /// Two records provide the same symbol.
  #[error("'{symbol}' is provided by both {first} and {second}")]
  DuplicateProvide {
    symbol: String,
    first: PathBuf,
    second: PathBuf,
  },

  /// A required symbol is not provided by any record.
  #[error("'{symbol}' required by {required_by} is not provided by any file")]
  MissingProvide { symbol: String, required_by: PathBuf },

  /// Requires form a cycle.
  #[error("circular require: {chain}")]
  CircularRequire { chain: String },

  /// An entry point is not a record of the graph.
  #[error("unknown entry point: {0}")]
  UnknownEntry(PathBuf),
}
