//! Chunk splitting.
//!
//! Each chunk's declared inputs are expanded to their transitive closure in the
//! dependency graph. A file needed by several chunks is then placed in the
//! lowest common ancestor of those chunks, so it loads before every chunk that
//! needs it and is never duplicated.
//!
//! Assignment itself is set-based; the order inside each chunk is the order in
//! which files first appear when walking the closures chunk by chunk in
//! topological order. Every closure lists dependencies first, so that order is
//! a topological order of the dependency graph restricted to the chunk.

use std::collections::HashMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, trace};

use crate::deps::DependencyOrder;
use crate::entry::ChunkDecl;
use crate::error::ConfigError;

use super::dag::ChunkDag;
use super::manifest::ModuleManifest;

/// The result of splitting a chunked build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitOutput {
  /// Chunk ids, dependencies first.
  pub sorted_chunk_ids: Vec<String>,
  /// Ordered, deduplicated inputs per chunk, in `sorted_chunk_ids` order.
  pub assignment: IndexMap<String, Vec<PathBuf>>,
  /// Compiler chunk flags `id:inputCount:comma-joined-deps`.
  pub chunk_flags: Vec<String>,
  /// The chunk with no dependencies.
  pub root_chunk_id: String,
  /// Chunk metadata for the runtime loader.
  pub manifest: ModuleManifest,
}

impl SplitOutput {
  /// All inputs concatenated in chunk order, as the compiler expects them.
  pub fn js(&self) -> Vec<PathBuf> {
    self.assignment.values().flatten().cloned().collect()
  }
}

/// Split the transitive inputs of `chunks` across the chunk DAG.
///
/// `uris` supplies the runtime URIs recorded in the manifest.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the chunk graph is invalid, a declared input
/// is not in the dependency graph, or the dependency graph cannot order the
/// inputs.
pub fn split<G, F>(chunks: &IndexMap<String, ChunkDecl>, graph: &G, uris: F) -> Result<SplitOutput, ConfigError>
where
  G: DependencyOrder + ?Sized,
  F: Fn(&str) -> Vec<String>,
{
  let dag = ChunkDag::build(chunks)?;
  let sorted_chunk_ids = dag.topological_order();

  // Step 1: transitive closure per chunk.
  let mut closures: Vec<(&str, Vec<PathBuf>)> = Vec::with_capacity(sorted_chunk_ids.len());
  for id in &sorted_chunk_ids {
    let chunk = &chunks[id.as_str()];
    if let Some(missing) = chunk.inputs.iter().find(|input| !graph.contains(input)) {
      return Err(ConfigError::InputNotInGraph(missing.clone()));
    }
    let closure = graph.order(&chunk.inputs)?;
    trace!(chunk = %id, files = closure.len(), "computed transitive closure");
    closures.push((id.as_str(), closure));
  }

  // Step 2: which chunks need each file, in first-appearance order.
  let mut needed_by: IndexMap<&PathBuf, Vec<&str>> = IndexMap::new();
  for (id, closure) in &closures {
    for file in closure {
      needed_by.entry(file).or_default().push(*id);
    }
  }

  let mut assigned: HashMap<&str, Vec<PathBuf>> = HashMap::new();
  for (file, ids) in needed_by {
    let target = dag.lowest_common_ancestor(ids.iter().copied())?;
    if ids.len() > 1 {
      trace!(file = %file.display(), chunks = ?ids, target = %target, "moved shared file");
    }
    assigned.entry(target).or_default().push(file.clone());
  }

  // Step 3: per-chunk lists, linkage flags and manifest.
  let assignment: IndexMap<String, Vec<PathBuf>> = sorted_chunk_ids
    .iter()
    .map(|id| (id.clone(), assigned.remove(id.as_str()).unwrap_or_default()))
    .collect();

  let chunk_flags = assignment
    .iter()
    .map(|(id, inputs)| format!("{}:{}:{}", id, inputs.len(), chunks[id.as_str()].deps.join(",")))
    .collect();

  let manifest = ModuleManifest::build(chunks, uris)?;

  debug!(
    chunks = sorted_chunk_ids.len(),
    files = assignment.values().map(Vec::len).sum::<usize>(),
    root = %dag.root(),
    "split inputs into chunks"
  );

  Ok(SplitOutput {
    root_chunk_id: dag.root().to_string(),
    sorted_chunk_ids,
    assignment,
    chunk_flags,
    manifest,
  })
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;
  use std::path::Path;

  use super::*;
  use crate::deps::DependencyGraph;
  use crate::util::testutil::record;

  fn chunks(decls: &[(&str, &[&str], &[&str])]) -> IndexMap<String, ChunkDecl> {
    decls
      .iter()
      .map(|(id, inputs, deps)| {
        (
          id.to_string(),
          ChunkDecl {
            inputs: inputs.iter().map(PathBuf::from).collect(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
          },
        )
      })
      .collect()
  }

  fn no_uris(_: &str) -> Vec<String> {
    Vec::new()
  }

  fn files(list: &[PathBuf]) -> Vec<&str> {
    list.iter().map(|p| p.to_str().unwrap()).collect()
  }

  #[test]
  fn shared_file_moves_to_base() {
    let graph = DependencyGraph::new(vec![
      record("/base.js", &["base"], &["shared"]),
      record("/main.js", &["main"], &["shared", "util"]),
      record("/shared.js", &["shared"], &[]),
      record("/util.js", &["util"], &[]),
    ])
    .unwrap();
    let chunks = chunks(&[("base", &["/base.js"], &[]), ("main", &["/main.js"], &["base"])]);

    let out = split(&chunks, &graph, no_uris).unwrap();

    assert_eq!(out.sorted_chunk_ids, vec!["base", "main"]);
    assert_eq!(files(&out.assignment["base"]), vec!["/shared.js", "/base.js"]);
    assert_eq!(files(&out.assignment["main"]), vec!["/util.js", "/main.js"]);
    assert_eq!(out.chunk_flags, vec!["base:2:", "main:2:base"]);
    assert_eq!(out.root_chunk_id, "base");
    assert_eq!(files(&out.js()), vec!["/shared.js", "/base.js", "/util.js", "/main.js"]);
  }

  #[test]
  fn single_chunk_keeps_closure_order() {
    let graph = DependencyGraph::new(vec![
      record("/app.js", &["app"], &["b", "a"]),
      record("/a.js", &["a"], &["c"]),
      record("/b.js", &["b"], &[]),
      record("/c.js", &["c"], &[]),
    ])
    .unwrap();
    let chunks = chunks(&[("app", &["/app.js"], &[])]);

    let out = split(&chunks, &graph, no_uris).unwrap();
    let closure = graph.order(&[PathBuf::from("/app.js")]).unwrap();

    assert_eq!(out.assignment["app"], closure);
    assert_eq!(out.chunk_flags, vec!["app:4:"]);
  }

  #[test]
  fn sibling_shared_file_goes_to_common_parent() {
    let graph = DependencyGraph::new(vec![
      record("/base.js", &["base"], &[]),
      record("/left.js", &["left"], &["dom"]),
      record("/right.js", &["right"], &["dom"]),
      record("/dom.js", &["dom"], &["base"]),
    ])
    .unwrap();
    let chunks = chunks(&[
      ("base", &["/base.js"], &[]),
      ("left", &["/left.js"], &["base"]),
      ("right", &["/right.js"], &["base"]),
    ]);

    let out = split(&chunks, &graph, no_uris).unwrap();

    assert_eq!(files(&out.assignment["base"]), vec!["/base.js", "/dom.js"]);
    assert_eq!(files(&out.assignment["left"]), vec!["/left.js"]);
    assert_eq!(files(&out.assignment["right"]), vec!["/right.js"]);
  }

  #[test]
  fn every_file_lands_in_exactly_one_ancestor_chunk() {
    let graph = DependencyGraph::new(vec![
      record("/core.js", &["core"], &[]),
      record("/ui.js", &["ui"], &["core"]),
      record("/grid.js", &["grid"], &["ui"]),
      record("/chart.js", &["chart"], &["ui", "math"]),
      record("/math.js", &["math"], &[]),
      record("/report.js", &["report"], &["grid", "chart"]),
      record("/root.js", &["root"], &[]),
    ])
    .unwrap();
    let chunks = chunks(&[
      ("root", &["/root.js"], &[]),
      ("grid", &["/grid.js"], &["root"]),
      ("chart", &["/chart.js"], &["root"]),
      ("report", &["/report.js"], &["grid", "chart"]),
    ]);
    let dag = ChunkDag::build(&chunks).unwrap();

    let out = split(&chunks, &graph, no_uris).unwrap();

    let mut seen = HashSet::new();
    for (chunk, inputs) in &out.assignment {
      for file in inputs {
        assert!(seen.insert(file.clone()), "{} assigned twice", file.display());
        for (other, decl) in &chunks {
          let closure = graph.order(&decl.inputs).unwrap();
          if closure.contains(file) {
            assert!(
              dag.is_ancestor(chunk, other).unwrap(),
              "{} placed in {} which does not precede {}",
              file.display(),
              chunk,
              other
            );
          }
        }
      }
    }
    assert_eq!(seen.len(), 7);
    assert_eq!(files(&out.assignment["root"]), vec!["/root.js", "/core.js", "/ui.js"]);
    assert_eq!(files(&out.assignment["chart"]), vec!["/math.js", "/chart.js"]);
  }

  #[test]
  fn input_missing_from_graph_is_error() {
    let graph = DependencyGraph::new(vec![record("/base.js", &["base"], &[])]).unwrap();
    let chunks = chunks(&[("base", &["/base.js"], &[]), ("main", &["/nope.js"], &["base"])]);

    let err = split(&chunks, &graph, no_uris).unwrap_err();
    assert!(matches!(err, ConfigError::InputNotInGraph(ref p) if p == Path::new("/nope.js")));
  }

  #[test]
  fn unknown_chunk_dependency_fails_before_ordering() {
    let graph = DependencyGraph::default();
    let chunks = chunks(&[("base", &["/base.js"], &[]), ("main", &["/main.js"], &["ghost"])]);

    let err = split(&chunks, &graph, no_uris).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownChunkDependency { .. }));
  }

  #[test]
  fn splitting_is_deterministic() {
    let graph = DependencyGraph::new(vec![
      record("/a.js", &["a"], &["s1", "s2"]),
      record("/b.js", &["b"], &["s2", "s1"]),
      record("/s1.js", &["s1"], &[]),
      record("/s2.js", &["s2"], &[]),
      record("/root.js", &["root"], &[]),
    ])
    .unwrap();
    let chunks = chunks(&[
      ("root", &["/root.js"], &[]),
      ("a", &["/a.js"], &["root"]),
      ("b", &["/b.js"], &["root"]),
    ]);

    let first = split(&chunks, &graph, |id| vec![format!("/{}.js", id)]).unwrap();
    let second = split(&chunks, &graph, |id| vec![format!("/{}.js", id)]).unwrap();

    assert_eq!(
      serde_json::to_string(&first).unwrap(),
      serde_json::to_string(&second).unwrap()
    );
    assert_eq!(first.manifest.preamble(), second.manifest.preamble());
  }
}
