use async_trait::async_trait;

use super::options::CompilerOptions;
use super::types::{CompileOutput, CompilerError};

/// The external compiler collaborator.
///
/// Backends are shared by every unit of a build, so `compile` may be called
/// concurrently.
#[async_trait]
pub trait CompileBackend: Send + Sync {
  /// Compile one unit.
  ///
  /// A compile that fails on the sources returns
  /// [`CompilerError::Reported`]; every other error aborts the build.
  async fn compile(&self, options: &CompilerOptions) -> Result<CompileOutput, CompilerError>;

  /// Release backend resources. Called once after every unit has settled.
  async fn cleanup(&self) -> Result<(), CompilerError> {
    Ok(())
  }
}
