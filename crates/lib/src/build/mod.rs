//! Build orchestration.
//!
//! [`run`] drives every build unit through its pipeline:
//! - resolve the entry config
//! - for chunk builds, split inputs using the build-wide dependency graph
//! - translate to compiler options
//! - compile (or report the options in print-only mode)
//! - write outputs
//!
//! Units run concurrently up to `concurrency`. Every unit settles even if
//! others fail; the results are reduced into a [`BuildOutcome`] and the
//! backend is cleaned up exactly once, whatever the outcome.

mod discover;
mod types;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tokio::sync::{OnceCell, Semaphore};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::chunk::{split, templated_uris};
use crate::compiler::{
  self, CompileBackend, CompileErrorItem, CompilerError, CompilerOptions, OutputFile, parse_reported,
};
use crate::deps::{DependencyGraph, DepsError};
use crate::entry::{EntryConfig, Mode, resolve_path, unit_id_for};
use crate::error::ConfigError;

pub use discover::discover_units;
pub use types::*;

/// Why a unit pipeline stopped.
#[derive(Debug, Error)]
enum UnitError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Compiler(#[from] CompilerError),

  #[error("entry config resolution did not finish: {0}")]
  Resolve(#[from] tokio::task::JoinError),

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// What a finished pipeline produced.
struct Compiled {
  warnings: Vec<CompileErrorItem>,
  outputs: Vec<PathBuf>,
  options: Option<CompilerOptions>,
}

/// State shared by every unit of one run.
struct Shared {
  options: BuildOptions,
  backend: Arc<dyn CompileBackend>,
  deps: OnceCell<Result<Arc<DependencyGraph>, DepsError>>,
  started: AtomicUsize,
  finished: AtomicUsize,
  total: usize,
}

/// Build every unit in `units`.
///
/// Returns the outcome if every unit succeeded.
///
/// # Errors
///
/// - [`BuildError::Compilation`] if any unit failed, carrying the full outcome
/// - [`BuildError::UnexpectedCompilerOutput`] or [`BuildError::Backend`] if
///   the compiler failed in a way that is not about the sources; the run is
///   aborted
pub async fn run(
  units: &[PathBuf],
  options: &BuildOptions,
  backend: Arc<dyn CompileBackend>,
) -> Result<BuildOutcome, BuildError> {
  let total = units.len();
  info!(
    units = total,
    concurrency = options.concurrency,
    print_only = options.print_only,
    "starting build"
  );

  let shared = Arc::new(Shared {
    options: options.clone(),
    backend,
    deps: OnceCell::new(),
    started: AtomicUsize::new(0),
    finished: AtomicUsize::new(0),
    total,
  });
  let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));

  let mut join_set = JoinSet::new();
  let mut paths = HashMap::new();

  for path in units {
    let path = path.clone();
    let shared = shared.clone();
    let semaphore = semaphore.clone();
    let span = info_span!("unit", path = %path.display());

    let task_path = path.clone();
    let handle = join_set.spawn(
      async move {
        // The semaphore is never closed, so acquiring only waits.
        let _permit = semaphore.acquire().await.ok();
        shared.run_unit(&task_path).await
      }
      .instrument(span),
    );
    paths.insert(handle.id(), path);
  }

  let collected = collect_jobs(join_set, paths).await;

  if let Err(e) = shared.backend.cleanup().await {
    warn!(error = %e, "backend cleanup failed");
  }

  let outcome = BuildOutcome::from_jobs(collected?, total);
  info!(
    succeeded = outcome.successes.len(),
    failed = outcome.failures.len(),
    warnings = outcome.warning_count(),
    "build complete"
  );

  if outcome.is_success() {
    Ok(outcome)
  } else {
    Err(BuildError::Compilation {
      failed: outcome.failures.len(),
      total,
      outcome,
    })
  }
}

/// Wait for every unit. A fatal error aborts the units still running.
async fn collect_jobs(
  mut join_set: JoinSet<Result<CompileJob, BuildError>>,
  paths: HashMap<tokio::task::Id, PathBuf>,
) -> Result<Vec<CompileJob>, BuildError> {
  let mut jobs = Vec::new();

  while let Some(joined) = join_set.join_next_with_id().await {
    match joined {
      Ok((_, Ok(job))) => jobs.push(job),
      Ok((_, Err(e))) => {
        error!(error = %e, "aborting build");
        join_set.abort_all();
        return Err(e);
      }
      Err(e) => {
        error!(error = %e, "unit task panicked");
        if let Some(path) = paths.get(&e.id()) {
          let mut job = CompileJob::new(unit_id_for(path), path);
          job.fail(None, vec![CompileErrorItem::error(format!("unit task panicked: {}", e))]);
          jobs.push(job);
        }
      }
    }
  }

  Ok(jobs)
}

impl Shared {
  async fn run_unit(&self, path: &Path) -> Result<CompileJob, BuildError> {
    let mut job = CompileJob::new(unit_id_for(path), path);
    job.start();

    match self.pipeline(&mut job).await {
      Ok(compiled) => {
        if compiled.options.is_none() {
          self.progress("Compiled", path);
        }
        job.succeed(compiled.warnings, compiled.outputs, compiled.options);
      }
      Err(UnitError::Compiler(CompilerError::Reported { message, .. })) => match parse_reported(&message) {
        Some(failure) => {
          self.progress("Failed", path);
          job.fail(Some(failure.command), failure.items);
        }
        None => {
          return Err(BuildError::UnexpectedCompilerOutput {
            unit: job.unit_id,
            message,
          });
        }
      },
      Err(UnitError::Compiler(source)) => {
        return Err(BuildError::Backend {
          unit: job.unit_id,
          source,
        });
      }
      Err(e) => {
        self.progress("Failed", path);
        error!(unit = %job.unit_id, error = %e, "unit failed");
        job.fail(None, vec![CompileErrorItem::error(e.to_string())]);
      }
    }

    Ok(job)
  }

  async fn pipeline(&self, job: &mut CompileJob) -> Result<Compiled, UnitError> {
    let config = resolve_entry(&job.path, self.options.mode).await?;
    job.unit_id = config.id.clone();

    let options = self.compiler_options(&config).await?;

    if self.options.print_only {
      info!(unit = %config.id, "resolved compiler options");
      return Ok(Compiled {
        warnings: Vec::new(),
        outputs: Vec::new(),
        options: Some(options),
      });
    }

    let n = self.started.fetch_add(1, Ordering::SeqCst) + 1;
    info!("[{}/{}] Compiling: {}", n, self.total, job.path.display());

    let output = self.backend.compile(&options).await?;

    let mut written = Vec::with_capacity(output.outputs.len());
    for file in output.outputs {
      write_output(&file).await?;
      written.push(file.path);
    }

    Ok(Compiled {
      warnings: output.warnings,
      outputs: written,
      options: None,
    })
  }

  async fn compiler_options(&self, config: &EntryConfig) -> Result<CompilerOptions, ConfigError> {
    let Some(modules) = &config.modules else {
      return compiler::for_page(config);
    };

    let graph = self.dependency_graph(&config.id).await?;
    let template = config
      .module_production_uri
      .as_deref()
      .ok_or_else(|| ConfigError::MissingField {
        id: config.id.clone(),
        field: "module-production-uri".to_string(),
      })?;
    let output = split(modules, graph.as_ref(), templated_uris(template))?;
    compiler::for_chunks(config, &output)
  }

  /// The build-wide dependency graph, loaded by the first unit that asks.
  async fn dependency_graph(&self, unit: &str) -> Result<Arc<DependencyGraph>, ConfigError> {
    let manifest = self
      .options
      .deps_manifest
      .as_deref()
      .ok_or_else(|| ConfigError::MissingDependencyManifest(unit.to_string()))?;

    let loaded = self
      .deps
      .get_or_init(|| async {
        info!(manifest = %manifest.display(), "loading dependency manifest");
        DependencyGraph::load(manifest).await.map(Arc::new)
      })
      .await;

    loaded.clone().map_err(ConfigError::from)
  }

  fn progress(&self, label: &str, path: &Path) {
    let n = self.finished.fetch_add(1, Ordering::SeqCst) + 1;
    info!("[{}/{}] {}: {}", n, self.total, label, path.display());
  }
}

/// Resolve a descriptor chain on the blocking pool.
async fn resolve_entry(path: &Path, mode: Option<Mode>) -> Result<EntryConfig, UnitError> {
  let path = path.to_path_buf();
  let config = tokio::task::spawn_blocking(move || resolve_path(&path, mode)).await??;
  Ok(config)
}

async fn write_output(file: &OutputFile) -> Result<(), UnitError> {
  let write_err = |source| UnitError::Write {
    path: file.path.clone(),
    source,
  };
  if let Some(parent) = file.path.parent() {
    tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
  }
  tokio::fs::write(&file.path, &file.src).await.map_err(write_err)?;
  debug!(path = ?file.path, bytes = file.src.len(), "wrote output");
  Ok(())
}
