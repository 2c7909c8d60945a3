//! Local compiler process backend.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::consts::DEFAULT_COMPILER;

use super::backend::CompileBackend;
use super::options::CompilerOptions;
use super::types::{CompileErrorItem, CompileOutput, CompilerError, OutputFile};

/// Flags that make the compiler report outputs and diagnostics as JSON.
const JSON_FLAGS: [&str; 2] = ["--json_streams=OUT", "--error_format=JSON"];

/// Runs a compiler executable once per unit.
///
/// The compiler writes outputs as a JSON array on stdout and diagnostics as a
/// JSON array on stderr. A non-zero exit is a reported failure.
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
  program: String,
  args: Vec<String>,
}

impl Default for ProcessCompiler {
  fn default() -> Self {
    Self::new(DEFAULT_COMPILER)
  }
}

impl ProcessCompiler {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
    }
  }

  /// Arguments placed before the rendered options, e.g. `-jar compiler.jar`.
  pub fn with_args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args = args.into_iter().map(Into::into).collect();
    self
  }

  /// Full argument list for `options`.
  pub fn command_args(&self, options: &CompilerOptions) -> Vec<String> {
    let mut args = self.args.clone();
    args.extend(options.to_args());
    args.extend(JSON_FLAGS.iter().map(|s| s.to_string()));
    args
  }

  /// The command line as a single shell-quoted string.
  pub fn command_line(&self, options: &CompilerOptions) -> String {
    std::iter::once(self.program.clone())
      .chain(self.command_args(options))
      .map(|arg| shell_quote(&arg))
      .collect::<Vec<_>>()
      .join(" ")
  }
}

#[async_trait]
impl CompileBackend for ProcessCompiler {
  async fn compile(&self, options: &CompilerOptions) -> Result<CompileOutput, CompilerError> {
    let args = self.command_args(options);
    info!(program = %self.program, args = args.len(), "executing compiler");

    let output = Command::new(&self.program)
      .args(&args)
      .stdin(Stdio::null())
      .output()
      .await
      .map_err(|e| CompilerError::Spawn {
        program: self.program.clone(),
        message: e.to_string(),
      })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
      debug!(code = ?output.status.code(), "compiler failed");
      return Err(CompilerError::reported(
        &self.command_line(options),
        &stderr,
        output.status.code(),
      ));
    }

    let outputs: Vec<OutputFile> = if stdout.trim().is_empty() {
      Vec::new()
    } else {
      serde_json::from_str(&stdout).map_err(|e| CompilerError::Output(e.to_string()))?
    };

    let warnings = if stderr.trim().is_empty() {
      Vec::new()
    } else {
      match serde_json::from_str::<Vec<CompileErrorItem>>(&stderr) {
        Ok(items) => items,
        Err(_) => {
          warn!(stderr = %stderr.trim(), "ignoring non-JSON compiler diagnostics");
          Vec::new()
        }
      }
    };

    debug!(outputs = outputs.len(), warnings = warnings.len(), "compiler finished");
    Ok(CompileOutput { outputs, warnings })
  }
}

fn shell_quote(arg: &str) -> String {
  let plain = !arg.is_empty()
    && arg
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || "-_=./:,%@+".contains(c));
  if plain {
    arg.to_string()
  } else {
    format!("'{}'", arg.replace('\'', r"'\''"))
  }
}
