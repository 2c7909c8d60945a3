//! Source dependency graph.
//!
//! The splitter needs to know, for a set of entry files, every source file
//! they transitively require, in load order. That knowledge lives behind the
//! [`DependencyOrder`] trait. [`DependencyGraph`] implements it over records
//! loaded from a JSON dependency manifest:
//!
//! ```json
//! [
//!   { "path": "lib/base.js", "provides": ["goog"], "requires": [] },
//!   { "path": "app/main.js", "provides": ["app.main"], "requires": ["goog"] }
//! ]
//! ```

mod graph;
mod types;

pub use graph::{DependencyGraph, DependencyOrder};
pub use types::*;
