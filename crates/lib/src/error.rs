//! Configuration errors.
//!
//! Every malformed or contradictory descriptor surfaces as a [`ConfigError`],
//! whether it is found while resolving `inherits`, building the chunk DAG,
//! splitting inputs or translating compiler options.

use std::path::PathBuf;

use thiserror::Error;

use crate::deps::DepsError;

/// Errors raised for malformed or contradictory build configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
  /// A descriptor file could not be read.
  #[error("failed to read {path}: {message}")]
  Read { path: PathBuf, message: String },

  /// A descriptor is not valid JSON (after comment stripping).
  #[error("invalid JSON in {path}: {message}")]
  Parse { path: PathBuf, message: String },

  /// The merged descriptor does not match the entry config shape.
  #[error("invalid entry config {path}: {message}")]
  Invalid { path: PathBuf, message: String },

  /// `inherits` chain visits the same descriptor twice.
  #[error("circular inherits: {chain}")]
  CircularInherits { chain: String },

  /// A chunk was declared without `inputs`.
  #[error("no module inputs: {0}")]
  MissingChunkInputs(String),

  /// No chunk has empty `deps`.
  #[error("no root module")]
  NoRootChunk,

  /// More than one chunk has empty `deps`.
  #[error("many root modules: {}", .0.join(", "))]
  ManyRootChunks(Vec<String>),

  /// A chunk depends on an id that is not declared.
  #[error("module '{chunk}' depends on unknown module '{dep}'")]
  UnknownChunkDependency { chunk: String, dep: String },

  /// An id passed to a DAG query is not a declared chunk.
  #[error("unknown module: {0}")]
  UnknownChunk(String),

  /// The chunk graph contains a cycle.
  #[error("module dependency cycle detected")]
  ChunkCycle,

  /// A chunk input is not a node of the dependency graph.
  #[error("input not found in dependency graph: {0}")]
  InputNotInGraph(PathBuf),

  /// `module-output-path` does not end with the chunk placeholder suffix.
  #[error("\"module-output-path\" must end with \"{suffix}\", but actual \"{actual}\"")]
  InvalidOutputPath { suffix: String, actual: String },

  /// A field required for this build shape is missing.
  #[error("missing \"{field}\" in entry config {id}")]
  MissingField { id: String, field: String },

  /// A chunk build was requested without a dependency manifest.
  #[error("chunk build {0} requires a dependency manifest")]
  MissingDependencyManifest(String),

  /// The dependency graph rejected the request.
  #[error(transparent)]
  Dependency(#[from] DepsError),
}
