use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Compilation mode of a build unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
  /// Concatenate sources without optimization.
  Raw,
  /// Strip whitespace and comments only.
  Whitespace,
  /// Local renaming and simple optimizations.
  Simple,
  /// Whole-program optimization.
  Advanced,
}

impl Mode {
  pub fn as_str(self) -> &'static str {
    match self {
      Mode::Raw => "RAW",
      Mode::Whitespace => "WHITESPACE",
      Mode::Simple => "SIMPLE",
      Mode::Advanced => "ADVANCED",
    }
  }
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Mode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_uppercase().as_str() {
      "RAW" => Ok(Mode::Raw),
      "WHITESPACE" => Ok(Mode::Whitespace),
      "SIMPLE" => Ok(Mode::Simple),
      "ADVANCED" => Ok(Mode::Advanced),
      other => Err(format!("unknown mode '{}' (expected RAW, WHITESPACE, SIMPLE or ADVANCED)", other)),
    }
  }
}

/// Compiler warning verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningLevel {
  Quiet,
  Default,
  Verbose,
}

/// A chunk declaration after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDecl {
  /// Entry files of the chunk (absolute after resolution).
  pub inputs: Vec<PathBuf>,
  /// Chunks that must be loaded before this one.
  #[serde(default)]
  pub deps: Vec<String>,
}

/// A fully resolved entry config.
///
/// Produced once per build unit by [`resolve`](super::resolve) and never
/// mutated afterwards. All path-valued fields are absolute.
///
/// # Example
///
/// ```json
/// {
///   // comments are allowed
///   "id": "app",
///   "mode": "ADVANCED",
///   "inherits": "../base.json",
///   "paths": ["../js"],
///   "modules": {
///     "base": { "inputs": "../js/base.js" },
///     "main": { "inputs": ["../js/main.js"], "deps": "base" }
///   },
///   "module-production-uri": "https://cdn.example.com/%s.js"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EntryConfig {
  pub id: String,
  pub mode: Mode,
  /// Directories scanned for source files.
  #[serde(default)]
  pub paths: Vec<PathBuf>,
  /// Page entry points. Ignored when `modules` is present.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub inputs: Option<Vec<PathBuf>>,
  /// Chunk declarations in declaration order.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub modules: Option<IndexMap<String, ChunkDecl>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub define: Option<IndexMap<String, serde_json::Value>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub externs: Option<Vec<PathBuf>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub language_in: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub language_out: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub level: Option<WarningLevel>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub debug: Option<bool>,
  #[serde(default)]
  pub pretty_print: bool,
  #[serde(default)]
  pub print_input_delimiter: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub test_excludes: Option<Vec<PathBuf>>,
  /// Output file of a page build.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output_file: Option<String>,
  /// Output path template of a chunk build, must end with `%s.js`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub module_output_path: Option<String>,
  /// URI template for chunks at runtime, `%s` is replaced by the chunk id.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub module_production_uri: Option<String>,
}

impl EntryConfig {
  /// Returns true if this unit is a multi-chunk build.
  pub fn is_chunked(&self) -> bool {
    self.modules.is_some()
  }
}
