//! Chunk graph and code splitting.
//!
//! A chunked build declares chunks with load-order dependencies. This module:
//! - builds the chunk DAG and answers topological and LCA queries ([`dag`])
//! - places every transitively required source file into exactly one chunk,
//!   the most specific chunk that loads before every chunk needing it ([`split`])
//! - describes the chunk graph for the runtime module loader ([`manifest`])

pub mod dag;
pub mod manifest;
pub mod split;

pub use dag::ChunkDag;
pub use manifest::{ModuleManifest, templated_uris};
pub use split::{SplitOutput, split};
