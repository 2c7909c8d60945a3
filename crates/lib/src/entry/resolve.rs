//! `inherits` resolution.
//!
//! Resolution walks the `inherits` chain with an explicit loop carrying the
//! merged fields and the path of the descriptor visited last. Each step merges
//! shallowly with the child's fields winning, and the directory context moves
//! to the parent. Relative paths in the final config are resolved against the
//! directory of the topmost ancestor, not the descriptor that was requested.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::consts::DESCRIPTOR_EXTENSION;
use crate::error::ConfigError;

use super::jsonc::strip_comments;
use super::types::{EntryConfig, Mode};

type JsonObject = Map<String, Value>;

/// Resolve the entry config `unit_id` stored in `base_dir/<unit_id>.json`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a descriptor in the chain is missing or is not
/// valid JSON-with-comments, a chunk declares no `inputs`, or the `inherits`
/// chain is circular.
pub fn resolve(unit_id: &str, base_dir: &Path, mode: Option<Mode>) -> Result<EntryConfig, ConfigError> {
  let path = base_dir.join(format!("{}.{}", unit_id, DESCRIPTOR_EXTENSION));
  resolve_descriptor(&path, unit_id, mode)
}

/// Resolve the entry config stored at `path`.
///
/// The unit id defaults to the file stem when the descriptor has no `id`.
pub fn resolve_path(path: &Path, mode: Option<Mode>) -> Result<EntryConfig, ConfigError> {
  resolve_descriptor(path, &unit_id_for(path), mode)
}

/// Derive a unit id from a descriptor path.
pub fn unit_id_for(path: &Path) -> String {
  path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.display().to_string())
}

fn resolve_descriptor(path: &Path, unit_id: &str, mode: Option<Mode>) -> Result<EntryConfig, ConfigError> {
  let path = path.clean();
  let (mut merged, base_dir) = load_inherited(&path)?;

  if !merged.contains_key("id") {
    merged.insert("id".to_string(), Value::String(unit_id.to_string()));
  }

  let mut config: EntryConfig = serde_json::from_value(Value::Object(merged)).map_err(|e| ConfigError::Invalid {
    path: path.clone(),
    message: e.to_string(),
  })?;

  resolve_paths(&mut config, &base_dir);

  if let Some(mode) = mode {
    config.mode = mode;
  }

  debug!(id = %config.id, base_dir = %base_dir.display(), chunked = config.is_chunked(), "resolved entry config");
  Ok(config)
}

/// Load `path` and merge every ancestor into it.
///
/// Returns the merged fields and the directory of the last descriptor visited.
fn load_inherited(path: &Path) -> Result<(JsonObject, PathBuf), ConfigError> {
  let mut merged = load_json(path)?;
  let mut current = path.to_path_buf();
  let mut visited = vec![current.clone()];

  while let Some(inherits) = merged.shift_remove("inherits") {
    let Value::String(inherits) = inherits else {
      return Err(ConfigError::Invalid {
        path: current,
        message: "\"inherits\" must be a string".to_string(),
      });
    };

    let parent_path = parent_dir(&current).join(&inherits).clean();
    if visited.contains(&parent_path) {
      visited.push(parent_path);
      let chain = visited
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ");
      return Err(ConfigError::CircularInherits { chain });
    }
    trace!(child = %current.display(), parent = %parent_path.display(), "following inherits");

    let mut parent = load_json(&parent_path)?;
    for (key, value) in merged {
      parent.insert(key, value);
    }

    merged = parent;
    visited.push(parent_path.clone());
    current = parent_path;
  }

  Ok((merged, parent_dir(&current)))
}

fn parent_dir(path: &Path) -> PathBuf {
  path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Read, strip comments, parse and normalize a single descriptor.
fn load_json(path: &Path) -> Result<JsonObject, ConfigError> {
  let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
    path: path.to_path_buf(),
    message: e.to_string(),
  })?;

  let value: Value = serde_json::from_str(&strip_comments(&content)).map_err(|e| ConfigError::Parse {
    path: path.to_path_buf(),
    message: e.to_string(),
  })?;

  let Value::Object(mut json) = value else {
    return Err(ConfigError::Invalid {
      path: path.to_path_buf(),
      message: "top level must be an object".to_string(),
    });
  };

  normalize(&mut json)?;
  Ok(json)
}

/// Wrap scalar `inputs`/`deps`/`test-excludes` into sequences and default `deps`.
fn normalize(json: &mut JsonObject) -> Result<(), ConfigError> {
  if let Some(Value::Object(modules)) = json.get_mut("modules") {
    for (id, module) in modules.iter_mut() {
      let Value::Object(module) = module else {
        return Err(ConfigError::MissingChunkInputs(id.clone()));
      };

      match module.get_mut("inputs") {
        Some(inputs) if !is_falsy(inputs) => wrap_scalar(inputs),
        _ => return Err(ConfigError::MissingChunkInputs(id.clone())),
      }

      match module.get_mut("deps") {
        Some(deps) if !is_falsy(deps) => wrap_scalar(deps),
        _ => {
          module.insert("deps".to_string(), Value::Array(Vec::new()));
        }
      }
    }
  }

  if let Some(excludes) = json.get_mut("test-excludes") {
    wrap_scalar(excludes);
  }

  Ok(())
}

/// `null`, `false`, `0` and `""` count as absent.
fn is_falsy(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::Bool(b) => !b,
    Value::Number(n) => n.as_f64() == Some(0.0),
    Value::String(s) => s.is_empty(),
    Value::Array(_) | Value::Object(_) => false,
  }
}

fn wrap_scalar(value: &mut Value) {
  if !value.is_array() {
    let scalar = value.take();
    *value = Value::Array(vec![scalar]);
  }
}

fn resolve_paths(config: &mut EntryConfig, base_dir: &Path) {
  let abs = |p: &PathBuf| base_dir.join(p).clean();

  config.paths = config.paths.iter().map(abs).collect();
  if let Some(inputs) = &mut config.inputs {
    *inputs = inputs.iter().map(abs).collect();
  }
  if let Some(externs) = &mut config.externs {
    *externs = externs.iter().map(abs).collect();
  }
  if let Some(modules) = &mut config.modules {
    for chunk in modules.values_mut() {
      chunk.inputs = chunk.inputs.iter().map(abs).collect();
    }
  }
  if let Some(excludes) = &mut config.test_excludes {
    *excludes = excludes.iter().map(abs).collect();
  }
}
