//! Types for build orchestration.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::compiler::{CompileErrorItem, CompilerError, CompilerOptions};
use crate::entry::Mode;

/// Settings for one orchestrator run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Maximum number of unit pipelines in flight.
  pub concurrency: usize,
  /// Compilation mode applied to every unit, overriding the descriptors.
  pub mode: Option<Mode>,
  /// Dependency manifest used by chunk builds.
  pub deps_manifest: Option<PathBuf>,
  /// Report compiler options instead of compiling.
  pub print_only: bool,
}

impl Default for BuildOptions {
  fn default() -> Self {
    Self {
      concurrency: 1,
      mode: None,
      deps_manifest: None,
      print_only: false,
    }
  }
}

/// A unit that compiled, or whose options were printed.
#[derive(Debug, Clone, Serialize)]
pub struct UnitSuccess {
  pub unit_id: String,
  pub path: PathBuf,
  pub warnings: Vec<CompileErrorItem>,
  /// Files written for this unit.
  pub outputs: Vec<PathBuf>,
  /// Resolved options, set in print-only mode.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub options: Option<CompilerOptions>,
}

/// A unit that failed.
#[derive(Debug, Clone, Serialize)]
pub struct UnitFailure {
  pub unit_id: String,
  pub path: PathBuf,
  /// Compiler command line, absent when the unit failed before compiling.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub command: Option<String>,
  pub items: Vec<CompileErrorItem>,
}

/// Lifecycle of one unit of work.
#[derive(Debug, Clone)]
pub enum JobState {
  Pending,
  Running,
  Succeeded(UnitSuccess),
  Failed(UnitFailure),
}

/// One queued build unit.
#[derive(Debug, Clone)]
pub struct CompileJob {
  pub unit_id: String,
  pub path: PathBuf,
  pub state: JobState,
}

impl CompileJob {
  pub fn new(unit_id: impl Into<String>, path: &Path) -> Self {
    Self {
      unit_id: unit_id.into(),
      path: path.to_path_buf(),
      state: JobState::Pending,
    }
  }

  pub fn start(&mut self) {
    self.state = JobState::Running;
  }

  pub fn succeed(&mut self, warnings: Vec<CompileErrorItem>, outputs: Vec<PathBuf>, options: Option<CompilerOptions>) {
    self.state = JobState::Succeeded(UnitSuccess {
      unit_id: self.unit_id.clone(),
      path: self.path.clone(),
      warnings,
      outputs,
      options,
    });
  }

  pub fn fail(&mut self, command: Option<String>, items: Vec<CompileErrorItem>) {
    self.state = JobState::Failed(UnitFailure {
      unit_id: self.unit_id.clone(),
      path: self.path.clone(),
      command,
      items,
    });
  }

  pub fn is_settled(&self) -> bool {
    matches!(self.state, JobState::Succeeded(_) | JobState::Failed(_))
  }
}

/// Aggregate result of a build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildOutcome {
  pub successes: Vec<UnitSuccess>,
  pub failures: Vec<UnitFailure>,
  /// Number of units in the build.
  pub total: usize,
}

impl BuildOutcome {
  /// Reduce settled jobs, ordered by descriptor path.
  pub fn from_jobs(jobs: Vec<CompileJob>, total: usize) -> Self {
    let mut outcome = BuildOutcome {
      total,
      ..Default::default()
    };
    for job in jobs {
      match job.state {
        JobState::Succeeded(success) => outcome.successes.push(success),
        JobState::Failed(failure) => outcome.failures.push(failure),
        JobState::Pending | JobState::Running => {}
      }
    }
    outcome.successes.sort_by(|a, b| a.path.cmp(&b.path));
    outcome.failures.sort_by(|a, b| a.path.cmp(&b.path));
    outcome
  }

  pub fn is_success(&self) -> bool {
    self.failures.is_empty()
  }

  pub fn warning_count(&self) -> usize {
    self.successes.iter().map(|s| s.warnings.len()).sum()
  }
}

/// Errors that end a build run.
#[derive(Debug, Error)]
pub enum BuildError {
  /// One or more units failed. Carries every unit's result.
  #[error("failed to compile ({failed}/{total})")]
  Compilation {
    failed: usize,
    total: usize,
    outcome: BuildOutcome,
  },

  /// The compiler failed with a body that is not a list of error items.
  #[error("unexpected non-JSON error from compiler for {unit}:\n{message}")]
  UnexpectedCompilerOutput { unit: String, message: String },

  /// The compiler backend itself failed.
  #[error("compiler backend failed for {unit}: {source}")]
  Backend {
    unit: String,
    #[source]
    source: CompilerError,
  },

  /// Entry configs could not be discovered.
  #[error("failed to discover entry configs in {path}: {message}")]
  Discover { path: PathBuf, message: String },
}

impl BuildError {
  /// The per-unit outcome, if the run got that far.
  pub fn outcome(&self) -> Option<&BuildOutcome> {
    match self {
      BuildError::Compilation { outcome, .. } => Some(outcome),
      _ => None,
    }
  }
}
