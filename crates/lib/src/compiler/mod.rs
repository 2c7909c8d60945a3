//! Compiler options and backends.
//!
//! The optimizing compiler is an external collaborator. This module turns a
//! resolved entry config into [`CompilerOptions`] and hands them to a
//! [`CompileBackend`]:
//! - [`ProcessCompiler`] runs a local compiler executable
//! - [`RemoteCompiler`] submits jobs to a remote execution service
//!
//! A failed compile comes back as [`CompilerError::Reported`] whose message is
//! the command line, a blank line and the JSON list of error items; see
//! [`parse_reported`].

mod backend;
mod options;
mod process;
mod remote;
mod types;

pub use backend::CompileBackend;
pub use options::{CompilationLevel, CompilerOptions, DependencyMode, IsolationMode, for_chunks, for_page};
pub use process::ProcessCompiler;
pub use remote::RemoteCompiler;
pub use types::*;
