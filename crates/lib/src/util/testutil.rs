//! Test utilities for duckling-lib.
//!
//! Helpers for laying out descriptor trees on disk and for running a shell
//! script in place of the real compiler.

use std::path::{Path, PathBuf};

use crate::deps::DependencyRecord;

/// Write `content` to `root/relative`, creating parent directories.
///
/// Returns the full path of the written file.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
  let path = root.join(relative);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(&path, content).unwrap();
  path
}

/// Returns the shell command and args to execute a shell script.
///
/// Arguments appended after these are passed to the script as positional
/// parameters and otherwise ignored.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  (
    "/bin/sh",
    vec!["-c".to_string(), script.to_string(), "compiler".to_string()],
  )
}

/// Build a dependency record from string slices.
pub fn record(path: &str, provides: &[&str], requires: &[&str]) -> DependencyRecord {
  DependencyRecord {
    path: PathBuf::from(path),
    provides: provides.iter().map(|s| s.to_string()).collect(),
    requires: requires.iter().map(|s| s.to_string()).collect(),
  }
}
