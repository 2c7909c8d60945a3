//! Translation from entry configs to compiler options.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chunk::SplitOutput;
use crate::consts::CHUNK_OUTPUT_SUFFIX;
use crate::entry::{EntryConfig, Mode, WarningLevel};
use crate::error::ConfigError;

/// Compiler optimization level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompilationLevel {
  Whitespace,
  Simple,
  Advanced,
}

impl CompilationLevel {
  pub fn as_str(self) -> &'static str {
    match self {
      CompilationLevel::Whitespace => "WHITESPACE",
      CompilationLevel::Simple => "SIMPLE",
      CompilationLevel::Advanced => "ADVANCED",
    }
  }
}

impl From<Mode> for CompilationLevel {
  /// RAW has no compiler counterpart and compiles as WHITESPACE.
  fn from(mode: Mode) -> Self {
    match mode {
      Mode::Raw | Mode::Whitespace => CompilationLevel::Whitespace,
      Mode::Simple => CompilationLevel::Simple,
      Mode::Advanced => CompilationLevel::Advanced,
    }
  }
}

/// How the compiler selects inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyMode {
  /// Use `js` exactly as given, in order.
  None,
  /// Keep only what the entry points transitively require.
  Prune,
}

impl DependencyMode {
  pub fn as_str(self) -> &'static str {
    match self {
      DependencyMode::None => "NONE",
      DependencyMode::Prune => "PRUNE",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IsolationMode {
  Iife,
}

impl IsolationMode {
  pub fn as_str(self) -> &'static str {
    match self {
      IsolationMode::Iife => "IIFE",
    }
  }
}

/// Options for one compiler invocation.
///
/// Field names are the compiler's flag names. Serializes to JSON for
/// print-only mode and the remote backend; [`to_args`](Self::to_args) renders
/// command-line flags for the process backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub compilation_level: Option<CompilationLevel>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub dependency_mode: Option<DependencyMode>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub entry_point: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub js: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub js_output_file: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub chunk: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub chunk_wrapper: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub chunk_output_path_prefix: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub language_in: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub language_out: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub warning_level: Option<WarningLevel>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub debug: Option<bool>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub formatting: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub define: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub externs: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub isolation_mode: Option<IsolationMode>,
}

impl CompilerOptions {
  /// Render as `--flag=value` arguments, repeating list-valued flags.
  pub fn to_args(&self) -> Vec<String> {
    let mut args = Vec::new();
    let mut push = |flag: &str, value: &str| args.push(format!("--{}={}", flag, value));

    if let Some(level) = self.compilation_level {
      push("compilation_level", level.as_str());
    }
    if let Some(mode) = self.dependency_mode {
      push("dependency_mode", mode.as_str());
    }
    for entry in &self.entry_point {
      push("entry_point", entry);
    }
    for js in &self.js {
      push("js", js);
    }
    if let Some(file) = &self.js_output_file {
      push("js_output_file", file);
    }
    for chunk in &self.chunk {
      push("chunk", chunk);
    }
    for wrapper in &self.chunk_wrapper {
      push("chunk_wrapper", wrapper);
    }
    if let Some(prefix) = &self.chunk_output_path_prefix {
      push("chunk_output_path_prefix", prefix);
    }
    if let Some(lang) = &self.language_in {
      push("language_in", lang);
    }
    if let Some(lang) = &self.language_out {
      push("language_out", lang);
    }
    if let Some(level) = self.warning_level {
      let level = match level {
        WarningLevel::Quiet => "QUIET",
        WarningLevel::Default => "DEFAULT",
        WarningLevel::Verbose => "VERBOSE",
      };
      push("warning_level", level);
    }
    if let Some(debug) = self.debug {
      push("debug", if debug { "true" } else { "false" });
    }
    for formatting in &self.formatting {
      push("formatting", formatting);
    }
    for define in &self.define {
      push("define", define);
    }
    for externs in &self.externs {
      push("externs", externs);
    }
    if let Some(mode) = self.isolation_mode {
      push("isolation_mode", mode.as_str());
    }

    args
  }
}

fn path_string(path: &Path) -> String {
  path.display().to_string()
}

/// Fields shared by page and chunk builds.
fn base_options(config: &EntryConfig) -> CompilerOptions {
  let mut formatting = Vec::new();
  if config.pretty_print {
    formatting.push("PRETTY_PRINT".to_string());
  }
  if config.print_input_delimiter {
    formatting.push("PRINT_INPUT_DELIMITER".to_string());
  }

  let define = config
    .define
    .iter()
    .flatten()
    .map(|(key, value)| match value {
      serde_json::Value::String(s) => format!("{}={}", key, s),
      other => format!("{}={}", key, other),
    })
    .collect();

  CompilerOptions {
    compilation_level: Some(config.mode.into()),
    language_in: config.language_in.clone(),
    language_out: config.language_out.clone(),
    warning_level: config.level,
    debug: config.debug,
    formatting,
    define,
    externs: config.externs.iter().flatten().map(|p| path_string(p)).collect(),
    js_output_file: config.output_file.clone(),
    ..Default::default()
  }
}

/// Options for a page build: prune the search paths down to what the entry
/// points require and wrap the result in an IIFE.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] if the config has no `inputs`.
pub fn for_page(config: &EntryConfig) -> Result<CompilerOptions, ConfigError> {
  let inputs = config.inputs.as_ref().ok_or_else(|| ConfigError::MissingField {
    id: config.id.clone(),
    field: "inputs".to_string(),
  })?;

  let mut js: Vec<String> = config.paths.iter().map(|p| path_string(p)).collect();
  js.extend(config.test_excludes.iter().flatten().map(|p| format!("!{}", p.display())));

  let options = CompilerOptions {
    dependency_mode: Some(DependencyMode::Prune),
    entry_point: inputs.iter().map(|p| path_string(p)).collect(),
    js,
    isolation_mode: Some(IsolationMode::Iife),
    ..base_options(config)
  };
  debug!(unit = %config.id, js = options.js.len(), "page options built");
  Ok(options)
}

/// Options for a chunk build from its split output.
///
/// Inputs are passed in chunk order with dependency resolution disabled; the
/// root chunk is wrapped with the runtime loader preamble.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidOutputPath`] if `module-output-path` does not
/// end with `%s.js`.
pub fn for_chunks(config: &EntryConfig, split: &SplitOutput) -> Result<CompilerOptions, ConfigError> {
  let chunk_output_path_prefix = match &config.module_output_path {
    Some(path) => match path.strip_suffix(CHUNK_OUTPUT_SUFFIX) {
      Some(prefix) => Some(prefix.to_string()),
      None => {
        return Err(ConfigError::InvalidOutputPath {
          suffix: CHUNK_OUTPUT_SUFFIX.to_string(),
          actual: path.clone(),
        });
      }
    },
    None => None,
  };

  let options = CompilerOptions {
    dependency_mode: Some(DependencyMode::None),
    js: split.js().iter().map(|p| path_string(p)).collect(),
    chunk: split.chunk_flags.clone(),
    chunk_wrapper: vec![split.manifest.root_wrapper()],
    chunk_output_path_prefix,
    ..base_options(config)
  };
  debug!(unit = %config.id, chunks = options.chunk.len(), js = options.js.len(), "chunk options built");
  Ok(options)
}
