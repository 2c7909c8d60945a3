//! Implementation of the `duckling build` command.
//!
//! Resolves settings from the tool config and flags, discovers entry configs
//! and runs the build orchestrator, then reports every unit's result.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::debug;

use duckling_lib::build::{BuildError, BuildOptions, BuildOutcome, discover_units, run};
use duckling_lib::compiler::{CompileBackend, CompileErrorItem, ProcessCompiler, RemoteCompiler};
use duckling_lib::config::ToolConfig;
use duckling_lib::consts::DEFAULT_ENTRY_CONFIG_DIR;
use duckling_lib::entry::Mode;

use crate::output::{
  OutputFormat, format_duration, print_error, print_info, print_json, print_stat, print_success, print_warning,
};

#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Entry config files to build (default: every .json under the entry config dir)
  units: Vec<PathBuf>,

  /// Directory scanned for entry configs
  #[arg(long)]
  entry_config_dir: Option<PathBuf>,

  /// Number of units compiled at the same time
  #[arg(short = 'j', long)]
  concurrency: Option<usize>,

  /// Override the compilation mode of every unit (RAW, WHITESPACE, SIMPLE, ADVANCED)
  #[arg(long)]
  mode: Option<Mode>,

  /// Dependency manifest used by chunk builds
  #[arg(long)]
  deps_manifest: Option<PathBuf>,

  /// Compiler executable
  #[arg(long, conflicts_with = "remote")]
  compiler: Option<String>,

  /// Remote compile service endpoint
  #[arg(long)]
  remote: Option<String>,

  /// Print the compiler options of each unit instead of compiling
  #[arg(long)]
  print_config: bool,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
  format: OutputFormat,
}

/// Execute the build command.
pub fn cmd_build(args: BuildArgs, config_path: Option<&Path>) -> Result<()> {
  let start = Instant::now();
  let cwd = std::env::current_dir().context("Failed to read current directory")?;

  let tool = match config_path {
    Some(path) => ToolConfig::load(&cwd.join(path)).with_context(|| format!("Failed to load {}", path.display()))?,
    None => ToolConfig::discover(&cwd).context("Failed to load tool config")?,
  };
  debug!(config = ?tool, "tool config");

  let units = if args.units.is_empty() {
    let dir = args
      .entry_config_dir
      .clone()
      .or_else(|| tool.entry_config_dir.clone())
      .unwrap_or_else(|| cwd.join(DEFAULT_ENTRY_CONFIG_DIR));
    discover_units(&cwd.join(dir))?
  } else {
    args.units.iter().map(|unit| cwd.join(unit)).collect()
  };

  if units.is_empty() {
    print_info("No entry configs found");
    return Ok(());
  }

  let options = BuildOptions {
    concurrency: args.concurrency.or(tool.concurrency).unwrap_or(1),
    mode: args.mode,
    deps_manifest: args
      .deps_manifest
      .as_ref()
      .map(|path| cwd.join(path))
      .or_else(|| tool.deps_manifest.clone()),
    print_only: args.print_config,
  };
  let backend = select_backend(&args, &tool);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  match rt.block_on(run(&units, &options, backend)) {
    Ok(outcome) => report(&outcome, args.format, args.print_config, start.elapsed()),
    Err(BuildError::Compilation { failed, total, outcome }) => {
      report(&outcome, args.format, args.print_config, start.elapsed())?;
      bail!("Failed to compile ({}/{})", failed, total)
    }
    Err(e) => Err(e).context("Build aborted"),
  }
}

fn select_backend(args: &BuildArgs, tool: &ToolConfig) -> Arc<dyn CompileBackend> {
  if let Some(endpoint) = args.remote.as_ref().or(tool.remote.as_ref()) {
    return Arc::new(RemoteCompiler::new(endpoint.as_str()));
  }
  match (&args.compiler, &tool.compiler) {
    (Some(program), _) => Arc::new(ProcessCompiler::new(program.as_str())),
    (None, Some(command)) => {
      Arc::new(ProcessCompiler::new(command.program.as_str()).with_args(command.args.iter().cloned()))
    }
    (None, None) => Arc::new(ProcessCompiler::default()),
  }
}

fn report(outcome: &BuildOutcome, format: OutputFormat, print_config: bool, elapsed: Duration) -> Result<()> {
  if format.is_json() {
    return print_json(outcome);
  }

  if print_config {
    for success in &outcome.successes {
      print_info(&success.unit_id);
      if let Some(options) = &success.options {
        print_json(options)?;
      }
    }
  } else {
    for success in &outcome.successes {
      print_success(&format!("{} ({} warnings)", success.unit_id, success.warnings.len()));
      for warning in &success.warnings {
        print_warning(&describe(warning));
      }
    }
  }

  for failure in &outcome.failures {
    print_error(&failure.unit_id);
    if let Some(command) = &failure.command {
      print_stat("Command", command);
    }
    for item in &failure.items {
      print_error(&describe(item));
    }
  }

  println!();
  print_stat("Units", &outcome.total.to_string());
  print_stat("Succeeded", &outcome.successes.len().to_string());
  print_stat("Failed", &outcome.failures.len().to_string());
  print_stat("Warnings", &outcome.warning_count().to_string());
  print_stat("Duration", &format_duration(elapsed));
  Ok(())
}

fn describe(item: &CompileErrorItem) -> String {
  match item.location() {
    Some(location) => format!("{}: {}", location, item.description),
    None => item.description.clone(),
  }
}
