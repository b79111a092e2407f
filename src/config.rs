use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;

use crate::sync::SyncOptions;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the NoteHub API.
  #[serde(default = "default_api_url")]
  pub url: String,
  /// Notes per listing page.
  #[serde(default = "default_page_size")]
  pub page_size: u16,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: default_api_url(),
      page_size: default_page_size(),
    }
  }
}

fn default_api_url() -> String {
  "https://notehub-public.goit.study/api".to_string()
}

fn default_page_size() -> u16 {
  12
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
  /// Milliseconds of quiet before a typed search term is applied.
  #[serde(default = "default_debounce_ms")]
  pub debounce_ms: u64,
  /// Seconds before a cached page is refetched on access.
  #[serde(default = "default_max_age_secs")]
  pub max_age_secs: u64,
}

impl Default for SyncConfig {
  fn default() -> Self {
    Self {
      debounce_ms: default_debounce_ms(),
      max_age_secs: default_max_age_secs(),
    }
  }
}

fn default_debounce_ms() -> u64 {
  1000
}

fn default_max_age_secs() -> u64 {
  60
}

impl SyncConfig {
  pub fn options(&self) -> SyncOptions {
    SyncOptions {
      debounce: Duration::from_millis(self.debounce_ms),
      max_age: Duration::from_secs(self.max_age_secs),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./notehub.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/notehub/config.yaml
  ///
  /// No file found means defaults: the public NoteHub instance.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("notehub.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("notehub").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the NoteHub API bearer token from the environment.
  pub fn api_token() -> Result<String> {
    std::env::var("NOTEHUB_TOKEN")
      .map_err(|_| eyre!("NoteHub API token not found. Set the NOTEHUB_TOKEN environment variable."))
  }
}
