//! Build command integration tests.

use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

const CHUNKED: &str = r#"{
  // two chunks sharing util.js
  "mode": "ADVANCED",
  "modules": {
    "base": { "inputs": "../js/base.js" },
    "app": { "inputs": ["../js/app.js"], "deps": "base" },
    "admin": { "inputs": ["../js/admin.js"], "deps": ["base"] }
  },
  "module-output-path": "out/%s.js",
  "module-production-uri": "/assets/%s.js"
}"#;

const DEPS: &str = r#"[
  { "path": "js/base.js", "provides": ["base"], "requires": [] },
  { "path": "js/util.js", "provides": ["util"], "requires": ["base"] },
  { "path": "js/app.js", "provides": ["app"], "requires": ["util"] },
  { "path": "js/admin.js", "provides": ["admin"], "requires": ["util"] }
]"#;

#[test]
fn print_config_emits_page_options() {
  let env = TestEnv::new();
  env.page("home", "home.js");

  let output = env
    .duckling_cmd()
    .args(["build", "--print-config", "--format", "json"])
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();

  let outcome: Value = serde_json::from_slice(&output).unwrap();
  let options = &outcome["successes"][0]["options"];
  assert_eq!(outcome["total"], 1);
  assert_eq!(options["dependency_mode"], "PRUNE");
  assert_eq!(options["compilation_level"], "SIMPLE");
  assert_eq!(options["isolation_mode"], "IIFE");
  assert_eq!(
    options["entry_point"][0],
    env.root().join("js/home.js").display().to_string()
  );
}

#[test]
fn print_config_places_shared_file_in_common_chunk() {
  let env = TestEnv::new();
  env.write_file("entry-config/chunks.json", CHUNKED);
  env.write_file("deps.json", DEPS);

  let output = env
    .duckling_cmd()
    .args(["build", "--print-config", "--format", "json", "--deps-manifest", "deps.json"])
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();

  let outcome: Value = serde_json::from_slice(&output).unwrap();
  let options = &outcome["successes"][0]["options"];
  assert_eq!(
    options["chunk"],
    serde_json::json!(["base:2:", "app:1:base", "admin:1:base"])
  );
  let js: Vec<String> = options["js"]
    .as_array()
    .unwrap()
    .iter()
    .map(|v| v.as_str().unwrap().to_string())
    .collect();
  let root = env.root();
  assert_eq!(
    js,
    ["js/base.js", "js/util.js", "js/app.js", "js/admin.js"]
      .iter()
      .map(|p| root.join(p).display().to_string())
      .collect::<Vec<_>>()
  );
  assert_eq!(options["chunk_output_path_prefix"], "out/");
  assert!(options["chunk_wrapper"][0].as_str().unwrap().starts_with("base:var PLOVR_MODULE_INFO"));
}

#[test]
fn print_config_text_mode_prints_options_per_unit() {
  let env = TestEnv::new();
  env.page("home", "home.js");

  env
    .duckling_cmd()
    .args(["build", "--print-config", "--mode", "advanced"])
    .assert()
    .success()
    .stdout(predicate::str::contains("home"))
    .stdout(predicate::str::contains("\"compilation_level\": \"ADVANCED\""));
}

#[test]
fn explicit_unit_paths_skip_discovery() {
  let env = TestEnv::new();
  let home = env.page("home", "home.js");
  env.page("about", "about.js");

  let output = env
    .duckling_cmd()
    .args(["build", "--print-config", "--format", "json"])
    .arg(&home)
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();

  let outcome: Value = serde_json::from_slice(&output).unwrap();
  assert_eq!(outcome["total"], 1);
  assert_eq!(outcome["successes"][0]["unit_id"], "home");
}

#[test]
fn invalid_descriptor_fails_the_build() {
  let env = TestEnv::new();
  env.page("home", "home.js");
  env.write_file(
    "entry-config/two-roots.json",
    r#"{
      "mode": "SIMPLE",
      "modules": {
        "a": { "inputs": "../js/a.js" },
        "b": { "inputs": "../js/b.js" }
      },
      "module-production-uri": "/%s.js"
    }"#,
  );
  env.write_file("deps.json", "[]");

  env
    .duckling_cmd()
    .args(["build", "--print-config", "--deps-manifest", "deps.json"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("many root modules: a, b"))
    .stderr(predicate::str::contains("Failed to compile (1/2)"));
}

#[cfg(unix)]
#[test]
fn compiles_with_external_compiler() {
  let env = TestEnv::new();
  env.use_fake_compiler();
  env.page("home", "home.js");
  env.page("about", "about.js");

  env
    .duckling_cmd()
    .args(["build", "--concurrency", "2"])
    .assert()
    .success()
    .stdout(predicate::str::contains("home (1 warnings)"))
    .stdout(predicate::str::contains("Succeeded: 2"));

  let compiled = std::fs::read_to_string(env.root().join("out/home.js")).unwrap();
  assert!(compiled.starts_with("compiled:"));
  assert!(compiled.ends_with("js/home.js"));
  assert!(env.root().join("out/about.js").exists());
}

#[cfg(unix)]
#[test]
fn reports_compile_errors_and_keeps_other_outputs() {
  let env = TestEnv::new();
  env.use_fake_compiler();
  env.page("good", "good.js");
  env.page("bad", "broken.js");

  env
    .duckling_cmd()
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("broken.js:1:4: Parse error"))
    .stderr(predicate::str::contains("Failed to compile (1/2)"));

  assert!(env.root().join("out/good.js").exists());
  assert!(!env.root().join("out/bad.js").exists());
}

#[cfg(unix)]
#[test]
fn json_format_reports_failures() {
  let env = TestEnv::new();
  env.use_fake_compiler();
  env.page("bad", "broken.js");

  let output = env
    .duckling_cmd()
    .args(["build", "--format", "json"])
    .assert()
    .failure()
    .get_output()
    .stdout
    .clone();

  let outcome: Value = serde_json::from_slice(&output).unwrap();
  let failure = &outcome["failures"][0];
  assert_eq!(failure["unit_id"], "bad");
  assert!(failure["command"].as_str().unwrap().starts_with("/bin/sh"));
  assert_eq!(failure["items"][0]["key"], Value::Null);
  assert_eq!(failure["items"][0]["description"], "Parse error");
}
