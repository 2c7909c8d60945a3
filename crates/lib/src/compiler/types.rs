use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity of a compiler diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLevel {
  Error,
  Warning,
  Info,
}

/// One structured compiler diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileErrorItem {
  pub level: ErrorLevel,
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub line: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub column: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub key: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub context: Option<String>,
}

impl CompileErrorItem {
  /// An error item without location, used for failures outside the compiler.
  pub fn error(description: impl Into<String>) -> Self {
    Self {
      level: ErrorLevel::Error,
      description: description.into(),
      source: None,
      line: None,
      column: None,
      key: None,
      context: None,
    }
  }

  /// `source:line:column` if the item has a location.
  pub fn location(&self) -> Option<String> {
    let source = self.source.as_deref()?;
    Some(match (self.line, self.column) {
      (Some(line), Some(column)) => format!("{}:{}:{}", source, line, column),
      (Some(line), None) => format!("{}:{}", source, line),
      _ => source.to_string(),
    })
  }
}

/// One compiled output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
  pub path: PathBuf,
  pub src: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_map: Option<String>,
}

/// Result of a successful compile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOutput {
  #[serde(default)]
  pub outputs: Vec<OutputFile>,
  #[serde(default)]
  pub warnings: Vec<CompileErrorItem>,
}

/// Errors from a compiler backend.
#[derive(Debug, Error)]
pub enum CompilerError {
  /// The compiler ran and reported a failure.
  ///
  /// `message` is the command line on the first line, then the compiler's
  /// error stream.
  #[error(
    "compiler reported errors (exit code {}):\n{message}",
    .exit_code.map_or_else(|| "none".to_string(), |c| c.to_string())
  )]
  Reported { message: String, exit_code: Option<i32> },

  /// The compiler process could not be started.
  #[error("failed to run compiler {program}: {message}")]
  Spawn { program: String, message: String },

  /// The compiler succeeded but its output could not be read.
  #[error("invalid compiler output: {0}")]
  Output(String),

  /// The remote execution backend failed.
  #[error("remote compiler failed: {0}")]
  Remote(String),
}

impl CompilerError {
  /// A reported failure for `command` with the compiler's error stream `body`.
  pub fn reported(command: &str, body: &str, exit_code: Option<i32>) -> Self {
    CompilerError::Reported {
      message: format!("{}\n\n{}", command, body.trim()),
      exit_code,
    }
  }
}

/// A reported compiler failure split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedFailure {
  /// The command line that was run.
  pub command: String,
  /// The structured diagnostics.
  pub items: Vec<CompileErrorItem>,
}

/// Split a reported failure message into command and error items.
///
/// Returns `None` if the body after the first line is not a JSON list of
/// error items, which means the compiler failed for a reason other than the
/// sources (bad flags, crash).
pub fn parse_reported(message: &str) -> Option<ReportedFailure> {
  let (command, body) = message.split_once('\n').unwrap_or((message, ""));
  let items: Vec<CompileErrorItem> = serde_json::from_str(body).ok()?;
  Some(ReportedFailure {
    command: command.to_string(),
    items,
  })
}
