//! Chunk DAG.
//!
//! Chunks live in a petgraph index graph whose node indices follow
//! declaration order, with edges from a dependency to its dependent. Ancestor
//! sets and topological ranks are computed once at construction so LCA
//! queries are plain array lookups.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use indexmap::IndexMap;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::entry::ChunkDecl;
use crate::error::ConfigError;

/// A validated chunk dependency graph with exactly one root.
#[derive(Debug)]
pub struct ChunkDag {
  /// Chunk ids as nodes, edges from dependency to dependent.
  graph: DiGraph<String, ()>,

  /// Map from chunk id to node index.
  nodes: HashMap<String, NodeIndex>,

  /// Node indices in topological order.
  order: Vec<NodeIndex>,

  /// Position of each node (by index) in `order`.
  rank: Vec<usize>,

  /// `ancestors[a][b]` is true if `b` is `a` or loads before `a`.
  ancestors: Vec<Vec<bool>>,

  root: NodeIndex,
}

impl ChunkDag {
  /// Build the DAG from chunk declarations.
  ///
  /// # Errors
  ///
  /// Returns a [`ConfigError`] if a dependency id is not declared, if there
  /// is not exactly one chunk with empty `deps`, or if the graph has a cycle.
  pub fn build(chunks: &IndexMap<String, ChunkDecl>) -> Result<Self, ConfigError> {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    for id in chunks.keys() {
      let idx = graph.add_node(id.clone());
      nodes.insert(id.clone(), idx);
    }

    for (id, chunk) in chunks {
      let dependent = nodes[id];
      for dep in &chunk.deps {
        let &dependency = nodes.get(dep).ok_or_else(|| ConfigError::UnknownChunkDependency {
          chunk: id.clone(),
          dep: dep.clone(),
        })?;
        graph.update_edge(dependency, dependent, ());
      }
    }

    let roots: Vec<NodeIndex> = graph
      .node_indices()
      .filter(|&idx| graph.neighbors_directed(idx, Direction::Incoming).next().is_none())
      .collect();
    let root = match roots.as_slice() {
      [] => return Err(ConfigError::NoRootChunk),
      [root] => *root,
      many => return Err(ConfigError::ManyRootChunks(many.iter().map(|&i| graph[i].clone()).collect())),
    };

    let order = topological_sort(&graph)?;

    let mut rank = vec![0; graph.node_count()];
    for (pos, idx) in order.iter().enumerate() {
      rank[idx.index()] = pos;
    }

    // Dependencies come first in `order`, so each node's ancestor set is
    // complete once all of its direct dependencies have been processed.
    let mut ancestors = vec![vec![false; graph.node_count()]; graph.node_count()];
    for &idx in &order {
      let mut set = vec![false; graph.node_count()];
      set[idx.index()] = true;
      for dep in graph.neighbors_directed(idx, Direction::Incoming) {
        for (slot, &is_ancestor) in set.iter_mut().zip(&ancestors[dep.index()]) {
          *slot |= is_ancestor;
        }
      }
      ancestors[idx.index()] = set;
    }

    Ok(Self {
      graph,
      nodes,
      order,
      rank,
      ancestors,
      root,
    })
  }

  /// Chunk ids with every chunk after all of its dependencies.
  ///
  /// Ties are broken by declaration order.
  pub fn topological_order(&self) -> Vec<String> {
    self.order.iter().map(|&idx| self.graph[idx].clone()).collect()
  }

  /// The unique chunk without dependencies.
  pub fn root(&self) -> &str {
    &self.graph[self.root]
  }

  /// Number of chunks.
  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  /// Returns true if the DAG has no chunks.
  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }

  /// Direct dependencies of a chunk.
  pub fn direct_deps(&self, id: &str) -> Result<Vec<&str>, ConfigError> {
    let idx = self.index(id)?;
    let mut deps: Vec<NodeIndex> = self.graph.neighbors_directed(idx, Direction::Incoming).collect();
    deps.sort();
    Ok(deps.into_iter().map(|dep| self.graph[dep].as_str()).collect())
  }

  /// Check whether `ancestor` is `id` itself or loads before it.
  pub fn is_ancestor(&self, ancestor: &str, id: &str) -> Result<bool, ConfigError> {
    let ancestor = self.index(ancestor)?;
    let id = self.index(id)?;
    Ok(self.ancestors[id.index()][ancestor.index()])
  }

  /// The most specific chunk that is an ancestor of every chunk in `ids`.
  ///
  /// A single id is its own LCA. Among several common ancestors, the one
  /// farthest from the root by topological rank wins. An empty set yields the
  /// root.
  pub fn lowest_common_ancestor<'a, I>(&self, ids: I) -> Result<&str, ConfigError>
  where
    I: IntoIterator<Item = &'a str>,
  {
    let mut common: Option<Vec<bool>> = None;

    for id in ids {
      let set = &self.ancestors[self.index(id)?.index()];
      common = Some(match common {
        None => set.clone(),
        Some(mut acc) => {
          for (slot, &is_ancestor) in acc.iter_mut().zip(set) {
            *slot &= is_ancestor;
          }
          acc
        }
      });
    }

    let Some(common) = common else {
      return Ok(self.root());
    };

    let lca = self
      .order
      .iter()
      .rev()
      .find(|idx| common[idx.index()])
      .copied()
      .unwrap_or(self.root);

    Ok(&self.graph[lca])
  }

  /// Topological rank of a chunk (0 for the root).
  pub fn rank(&self, id: &str) -> Result<usize, ConfigError> {
    Ok(self.rank[self.index(id)?.index()])
  }

  fn index(&self, id: &str) -> Result<NodeIndex, ConfigError> {
    self
      .nodes
      .get(id)
      .copied()
      .ok_or_else(|| ConfigError::UnknownChunk(id.to_string()))
  }
}

/// Kahn's algorithm, releasing ready nodes in declaration order.
fn topological_sort(graph: &DiGraph<String, ()>) -> Result<Vec<NodeIndex>, ConfigError> {
  let mut in_degree: Vec<usize> = graph
    .node_indices()
    .map(|idx| graph.neighbors_directed(idx, Direction::Incoming).count())
    .collect();

  let mut ready: BinaryHeap<Reverse<NodeIndex>> = graph
    .node_indices()
    .filter(|idx| in_degree[idx.index()] == 0)
    .map(Reverse)
    .collect();

  let mut order = Vec::with_capacity(graph.node_count());
  while let Some(Reverse(idx)) = ready.pop() {
    order.push(idx);
    for dependent in graph.neighbors_directed(idx, Direction::Outgoing) {
      let degree = &mut in_degree[dependent.index()];
      *degree -= 1;
      if *degree == 0 {
        ready.push(Reverse(dependent));
      }
    }
  }

  if order.len() != graph.node_count() {
    return Err(ConfigError::ChunkCycle);
  }

  Ok(order)
}
