//! duckling-lib: Core types and logic for duckling
//!
//! This crate provides the pieces behind `duckling build`:
//! - `entry`: entry config descriptors, `inherits` resolution and path normalization
//! - `chunk`: the chunk DAG and the splitter that places every source file in one chunk
//! - `compiler`: compiler options and the local/remote compiler backends
//! - `deps`: the source dependency graph loaded from a dependency manifest
//! - `build`: the concurrent orchestrator that drives every build unit to completion
//! - `config`: tool settings read from `duckling.json`

pub mod build;
pub mod chunk;
pub mod compiler;
pub mod config;
pub mod consts;
pub mod deps;
pub mod entry;
pub mod error;
pub mod util;

pub use error::ConfigError;
