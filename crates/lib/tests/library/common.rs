//! Shared fixtures for library tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
  let path = root.join(relative);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(&path, content).unwrap();
  path
}

/// A project with a three-level `inherits` chain and a four-chunk build.
///
/// ```text
/// base          <- also gets shared.js (every leaf) and util.js (app, admin)
/// ├── app
/// ├── admin
/// └── search
/// ```
pub fn chunked_project() -> TempDir {
  let temp = TempDir::new().unwrap();
  let root = temp.path();

  write_file(
    root,
    "config/defaults/root.json",
    r#"{
      "mode": "SIMPLE",
      "modules": {
        "base": { "inputs": "js/base.js" },
        "app": { "inputs": "js/app.js", "deps": "base" },
        "admin": { "inputs": ["js/admin.js"], "deps": ["base"] },
        "search": { "inputs": ["js/search.js"], "deps": ["base"] }
      },
      "module-output-path": "out/%s.js",
      "module-production-uri": "/assets/%s.js"
    }"#,
  );
  write_file(
    root,
    "config/shared/middle.json",
    r#"{ "inherits": "../defaults/root.json", "mode": "WHITESPACE", "debug": true }"#,
  );
  write_file(
    root,
    "entry/site.json",
    r#"{
      // the leaf only chooses the mode
      "inherits": "../config/shared/middle.json",
      "mode": "ADVANCED"
    }"#,
  );
  write_file(
    root,
    "deps.json",
    r#"[
      { "path": "config/defaults/js/base.js", "provides": ["base"], "requires": [] },
      { "path": "config/defaults/js/shared.js", "provides": ["shared"], "requires": ["base"] },
      { "path": "config/defaults/js/util.js", "provides": ["util"], "requires": ["shared"] },
      { "path": "config/defaults/js/app.js", "provides": ["app"], "requires": ["util"] },
      { "path": "config/defaults/js/admin.js", "provides": ["admin"], "requires": ["util", "shared"] },
      { "path": "config/defaults/js/search.js", "provides": ["search"], "requires": ["shared"] }
    ]"#,
  );

  temp
}
