//! Remote execution backend.
//!
//! Compile jobs are POSTed to `{endpoint}/compile` as the JSON form of
//! [`CompilerOptions`]. The service answers `{outputs, warnings}` on success or
//! `422 {message}` when the compiler reported a failure, with `message` in the
//! same `command\n\n<JSON>` shape as a local failure. `cleanup` ends the
//! session with `DELETE {endpoint}/session`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use super::backend::CompileBackend;
use super::options::CompilerOptions;
use super::types::{CompileOutput, CompilerError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportedBody {
  message: String,
  #[serde(default)]
  exit_code: Option<i32>,
}

/// Client for a remote compile service.
#[derive(Debug, Clone)]
pub struct RemoteCompiler {
  client: reqwest::Client,
  endpoint: String,
}

impl RemoteCompiler {
  pub fn new(endpoint: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      endpoint: endpoint.into().trim_end_matches('/').to_string(),
    }
  }

  fn url(&self, path: &str) -> String {
    format!("{}/{}", self.endpoint, path)
  }
}

fn transport(e: reqwest::Error) -> CompilerError {
  CompilerError::Remote(e.to_string())
}

#[async_trait]
impl CompileBackend for RemoteCompiler {
  async fn compile(&self, options: &CompilerOptions) -> Result<CompileOutput, CompilerError> {
    let url = self.url("compile");
    debug!(url = %url, "submitting remote compile");

    let response = self.client.post(&url).json(options).send().await.map_err(transport)?;
    let status = response.status();

    if status.is_success() {
      return response.json::<CompileOutput>().await.map_err(|e| CompilerError::Output(e.to_string()));
    }

    let body = response.text().await.map_err(transport)?;
    if status == StatusCode::UNPROCESSABLE_ENTITY {
      let reported: ReportedBody =
        serde_json::from_str(&body).map_err(|e| CompilerError::Output(format!("invalid failure body: {}", e)))?;
      return Err(CompilerError::Reported {
        message: reported.message,
        exit_code: reported.exit_code,
      });
    }

    Err(CompilerError::Remote(format!("HTTP {}: {}", status, body.trim())))
  }

  async fn cleanup(&self) -> Result<(), CompilerError> {
    let url = self.url("session");
    let response = self.client.delete(&url).send().await.map_err(transport)?;
    if !response.status().is_success() {
      return Err(CompilerError::Remote(format!("cleanup failed: HTTP {}", response.status())));
    }
    info!(endpoint = %self.endpoint, "remote session closed");
    Ok(())
  }
}
