//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Fake compiler: writes `--js_output_file` with the entry points as
/// content, and fails with a JSON error when an input is named `broken.js`.
#[cfg(unix)]
pub const FAKE_COMPILER: &str = r#"
out=""
entries=""
for arg in "$@"; do
  case "$arg" in
    --js_output_file=*) out="${arg#--js_output_file=}" ;;
    --entry_point=*) entries="$entries ${arg#--entry_point=}" ;;
  esac
done
case "$entries" in
  *broken.js*)
    echo '[{"level":"error","description":"Parse error","source":"broken.js","line":1,"column":4}]' >&2
    exit 1
    ;;
esac
echo '[{"level":"warning","description":"unused variable"}]' >&2
printf '[{"path":"%s","src":"compiled:%s"}]' "$out" "$entries"
"#;

/// Isolated project directory.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Project root, canonicalized so paths printed by the binary match.
  pub fn root(&self) -> PathBuf {
    let p = self.temp.path().to_path_buf();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.root().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Page entry config `entry-config/<name>.json` compiling `js/<input>`.
  pub fn page(&self, name: &str, input: &str) -> PathBuf {
    let out = self.root().join("out").join(format!("{}.js", name));
    let content = serde_json::json!({
      "mode": "SIMPLE",
      "paths": ["../js"],
      "inputs": [format!("../js/{}", input)],
      "output-file": out.display().to_string(),
    });
    self.write_file(&format!("entry-config/{}.json", name), &content.to_string())
  }

  /// Tool config that runs [`FAKE_COMPILER`].
  #[cfg(unix)]
  pub fn use_fake_compiler(&self) {
    let script = self.write_file("compiler.sh", FAKE_COMPILER);
    let config = serde_json::json!({
      "compiler": { "program": "/bin/sh", "args": [script.display().to_string()] },
      "depsManifest": "deps.json",
    });
    self.write_file("duckling.json", &config.to_string());
  }

  /// Get a Command for the duckling binary running in the project root.
  pub fn duckling_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("duckling");
    cmd.current_dir(self.root());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
