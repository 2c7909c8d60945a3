//! Entry config descriptors.
//!
//! An entry config is a JSON-with-comments file describing one build unit:
//! either a single page bundle (`inputs`) or a multi-chunk build (`modules`).
//! Descriptors may extend another descriptor through `inherits`; resolution
//! merges the chain and turns every relative path into an absolute one.
//!
//! # Submodules
//!
//! - [`jsonc`] - comment stripping for descriptor files
//! - `resolve` - `inherits` merging, normalization and path resolution

pub mod jsonc;
mod resolve;
mod types;

pub use resolve::{resolve, resolve_path, unit_id_for};
pub use types::*;
