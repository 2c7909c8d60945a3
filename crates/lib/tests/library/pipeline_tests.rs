//! Resolution, splitting and option translation through the public API.

use std::collections::HashSet;
use std::path::PathBuf;

use duckling_lib::chunk::{ChunkDag, split, templated_uris};
use duckling_lib::compiler::{CompilationLevel, for_chunks};
use duckling_lib::deps::{DependencyGraph, DependencyOrder};
use duckling_lib::entry::{self, Mode};

use super::common::chunked_project;

#[tokio::test]
async fn inherited_chunk_build_end_to_end() {
  let project = chunked_project();
  let root = project.path();

  let config = entry::resolve("site", &root.join("entry"), None).unwrap();

  // Leaf fields win, paths follow the root ancestor.
  assert_eq!(config.id, "site");
  assert_eq!(config.mode, Mode::Advanced);
  assert_eq!(config.debug, Some(true));
  let modules = config.modules.as_ref().unwrap();
  assert_eq!(modules["app"].inputs, vec![root.join("config/defaults/js/app.js")]);

  let graph = DependencyGraph::load(&root.join("deps.json")).await.unwrap();
  let output = split(modules, &graph, templated_uris("/assets/%s.js")).unwrap();

  assert_eq!(output.sorted_chunk_ids, vec!["base", "app", "admin", "search"]);
  assert_eq!(output.chunk_flags, vec!["base:3:", "app:1:base", "admin:1:base", "search:1:base"]);

  let options = for_chunks(&config, &output).unwrap();
  assert_eq!(options.compilation_level, Some(CompilationLevel::Advanced));
  assert_eq!(options.js.len(), 6);
  assert_eq!(options.chunk_output_path_prefix.as_deref(), Some("out/"));
}

#[tokio::test]
async fn every_file_is_emitted_once_into_a_common_ancestor() {
  let project = chunked_project();
  let root = project.path();
  let config = entry::resolve("site", &root.join("entry"), None).unwrap();
  let modules = config.modules.as_ref().unwrap();
  let graph = DependencyGraph::load(&root.join("deps.json")).await.unwrap();
  let dag = ChunkDag::build(modules).unwrap();

  let output = split(modules, &graph, templated_uris("/assets/%s.js")).unwrap();

  let mut seen = HashSet::new();
  for (chunk, files) in &output.assignment {
    for file in files {
      assert!(seen.insert(file.clone()), "{} emitted twice", file.display());
      // Every chunk whose closure needs the file must load `chunk` first.
      for (other, decl) in modules {
        let closure = graph.order(&decl.inputs).unwrap();
        if closure.contains(file) {
          assert!(
            dag.is_ancestor(chunk, other).unwrap(),
            "{} in {} is not available to {}",
            file.display(),
            chunk,
            other
          );
        }
      }
    }
  }
  assert_eq!(seen.len(), graph.len());

  let base: Vec<PathBuf> = ["base.js", "shared.js", "util.js"]
    .iter()
    .map(|f| root.join("config/defaults/js").join(f))
    .collect();
  assert_eq!(output.assignment["base"], base);
}

#[tokio::test]
async fn resolving_and_splitting_twice_is_identical() {
  let project = chunked_project();
  let root = project.path();
  let graph = DependencyGraph::load(&root.join("deps.json")).await.unwrap();

  let run = || {
    let config = entry::resolve("site", &root.join("entry"), None).unwrap();
    let output = split(config.modules.as_ref().unwrap(), &graph, templated_uris("/assets/%s.js")).unwrap();
    (
      serde_json::to_string(&output).unwrap(),
      output.manifest.preamble(),
      serde_json::to_string(&for_chunks(&config, &output).unwrap()).unwrap(),
    )
  };

  assert_eq!(run(), run());
}

#[test]
fn override_mode_applies_after_inheritance() {
  let project = chunked_project();

  let config = entry::resolve("site", &project.path().join("entry"), Some(Mode::Raw)).unwrap();

  assert_eq!(config.mode, Mode::Raw);
}
