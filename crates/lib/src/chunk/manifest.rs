//! Module manifest for the runtime chunk loader.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::consts::{CHUNK_ID_PLACEHOLDER, MODULE_INFO_VAR, MODULE_URIS_VAR, OUTPUT_PLACEHOLDER};
use crate::entry::ChunkDecl;
use crate::error::ConfigError;

/// Chunk dependencies and URIs, keyed by chunk id in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleManifest {
  /// Direct dependencies of each chunk.
  pub module_info: IndexMap<String, Vec<String>>,
  /// Runtime URIs of each chunk.
  pub module_uris: IndexMap<String, Vec<String>>,
  /// The chunk with no dependencies, which carries the preamble.
  pub root_id: String,
}

impl ModuleManifest {
  /// Build the manifest from chunk declarations.
  ///
  /// `uris` maps a chunk id to the URIs it is served from.
  ///
  /// # Errors
  ///
  /// Returns `NoRootChunk` or `ManyRootChunks` unless exactly one chunk has
  /// empty `deps`.
  pub fn build<F>(chunks: &IndexMap<String, ChunkDecl>, uris: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Vec<String>,
  {
    let mut module_info = IndexMap::new();
    let mut module_uris = IndexMap::new();
    let mut roots = Vec::new();

    for (id, chunk) in chunks {
      module_info.insert(id.clone(), chunk.deps.clone());
      module_uris.insert(id.clone(), uris(id));
      if chunk.deps.is_empty() {
        roots.push(id.clone());
      }
    }

    let root_id = match roots.len() {
      0 => return Err(ConfigError::NoRootChunk),
      1 => roots.remove(0),
      _ => return Err(ConfigError::ManyRootChunks(roots)),
    };

    Ok(Self {
      module_info,
      module_uris,
      root_id,
    })
  }

  /// JavaScript declaring the manifest globals, followed by the output placeholder.
  pub fn preamble(&self) -> String {
    format!(
      "var {} = {};\nvar {} = {};\n{}",
      MODULE_INFO_VAR,
      to_json_object(&self.module_info),
      MODULE_URIS_VAR,
      to_json_object(&self.module_uris),
      OUTPUT_PLACEHOLDER
    )
  }

  /// Compiler `chunk_wrapper` value that wraps the root chunk with the preamble.
  pub fn root_wrapper(&self) -> String {
    format!("{}:{}", self.root_id, self.preamble())
  }
}

fn to_json_object(map: &IndexMap<String, Vec<String>>) -> Value {
  Value::Object(
    map
      .iter()
      .map(|(id, values)| {
        (
          id.clone(),
          Value::Array(values.iter().cloned().map(Value::String).collect()),
        )
      })
      .collect(),
  )
}

/// URI function that substitutes the chunk id into every `%s` of `template`.
pub fn templated_uris(template: &str) -> impl Fn(&str) -> Vec<String> + '_ {
  move |id| vec![template.replace(CHUNK_ID_PLACEHOLDER, id)]
}
