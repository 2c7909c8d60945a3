//! Tool settings.
//!
//! `duckling.json` holds defaults for the CLI so a project can run a bare
//! `duckling build`:
//!
//! ```json
//! {
//!   "entryConfigDir": "entry-config",
//!   "concurrency": 4,
//!   "depsManifest": "build/deps.json",
//!   "compiler": { "program": "java", "args": ["-jar", "closure-compiler.jar"] }
//! }
//! ```
//!
//! Relative paths are resolved against the directory containing the file.
//! Command-line flags override every value.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::TOOL_CONFIG_FILE;
use crate::entry::jsonc::strip_comments;

#[derive(Debug, Error)]
pub enum ToolConfigError {
  #[error("failed to read {path}: {message}")]
  Read { path: PathBuf, message: String },

  #[error("invalid tool config {path}: {message}")]
  Parse { path: PathBuf, message: String },
}

/// Compiler executable and the arguments placed before the options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerCommand {
  pub program: String,
  #[serde(default)]
  pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToolConfig {
  /// Directory scanned for entry configs.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub entry_config_dir: Option<PathBuf>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub concurrency: Option<usize>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deps_manifest: Option<PathBuf>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub compiler: Option<CompilerCommand>,
  /// Remote compile service endpoint.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub remote: Option<String>,
}

impl ToolConfig {
  /// Path of the tool config in `dir`, if there is one.
  pub fn find(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(TOOL_CONFIG_FILE);
    path.is_file().then_some(path)
  }

  /// Load the tool config in `dir`, or the defaults if there is none.
  pub fn discover(dir: &Path) -> Result<Self, ToolConfigError> {
    match Self::find(dir) {
      Some(path) => Self::load(&path),
      None => {
        debug!(dir = ?dir, "no tool config found, using defaults");
        Ok(Self::default())
      }
    }
  }

  /// Load the tool config at `path`.
  pub fn load(path: &Path) -> Result<Self, ToolConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ToolConfigError::Read {
      path: path.to_path_buf(),
      message: e.to_string(),
    })?;
    let mut config: ToolConfig =
      serde_json::from_str(&strip_comments(&content)).map_err(|e| ToolConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
      })?;

    let base_dir = path.parent().unwrap_or(Path::new(""));
    let abs = |p: &PathBuf| base_dir.join(p).clean();
    config.entry_config_dir = config.entry_config_dir.as_ref().map(abs);
    config.deps_manifest = config.deps_manifest.as_ref().map(abs);

    debug!(path = ?path, "loaded tool config");
    Ok(config)
  }
}
