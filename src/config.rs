use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use flowforge_editor::EditorConfig;
use flowforge_layout::LayoutOptions;
use flowforge_simulation::HttpServiceConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_FILE: &str = "config.json";

/// Settings read from `<data_dir>/config.json`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
  /// Base URL of the simulation and automation services.
  pub service_url: String,
  pub request_timeout_secs: u64,
  pub max_history: usize,
  pub layout: LayoutOptions,
}

impl Default for AppConfig {
  fn default() -> Self {
    let service = HttpServiceConfig::default();
    let editor = EditorConfig::default();
    Self {
      service_url: service.base_url,
      request_timeout_secs: service.timeout.as_secs(),
      max_history: editor.max_history,
      layout: editor.layout,
    }
  }
}

impl AppConfig {
  /// Load the config file from the data directory, falling back to defaults
  /// when it does not exist.
  pub async fn load(data_dir: &Path) -> Result<Self> {
    let path = data_dir.join(CONFIG_FILE);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
      debug!(path = %path.display(), "no config file, using defaults");
      return Ok(Self::default());
    }

    let content = tokio::fs::read_to_string(&path)
      .await
      .with_context(|| format!("failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
      .with_context(|| format!("failed to parse config file: {}", path.display()))
  }

  pub fn service(&self) -> HttpServiceConfig {
    HttpServiceConfig {
      base_url: self.service_url.clone(),
      timeout: Duration::from_secs(self.request_timeout_secs),
    }
  }

  pub fn editor(&self) -> EditorConfig {
    EditorConfig {
      max_history: self.max_history,
      layout: self.layout.clone(),
    }
  }
}

pub fn default_data_dir() -> Result<PathBuf> {
  let home = dirs::home_dir().context("could not determine home directory")?;
  Ok(home.join(".flowforge"))
}
