use crate::crm::EntityKind;
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub backend: BackendConfig,
  /// Custom title for header (defaults to the backend host if not set)
  pub title: Option<String>,
  /// Entity list opened at startup (a command name such as "leads")
  #[serde(default = "default_view")]
  pub default_view: String,
  #[serde(default)]
  pub master_data: MasterDataConfig,
  /// Directory CSV exports are written to (defaults to the working directory)
  pub export_dir: Option<PathBuf>,
  /// Log filter used when RUST_LOG is unset, e.g. "debug" or "crmview=trace"
  pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  /// Base URL of the REST API, e.g. https://crm.example.com/api
  pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MasterDataConfig {
  /// Minutes a fetched region/country list stays fresh
  #[serde(default = "default_cache_minutes")]
  pub cache_minutes: i64,
}

impl Default for MasterDataConfig {
  fn default() -> Self {
    Self {
      cache_minutes: default_cache_minutes(),
    }
  }
}

/// One year
const MAX_CACHE_MINUTES: i64 = 525_600;

fn default_view() -> String {
  "leads".to_string()
}

fn default_cache_minutes() -> i64 {
  crate::master_data::DEFAULT_TTL_MINUTES
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./crmview.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/crmview/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = match explicit_path {
      Some(p) if p.exists() => Some(p.to_path_buf()),
      Some(p) => return Err(eyre!("Config file not found: {}", p.display())),
      None => Self::find_config_file(),
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/crmview/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("crmview.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("crmview").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    if self.backend.url.trim().is_empty() {
      return Err(eyre!("backend.url must not be empty"));
    }
    if self.entity().is_none() {
      let names: Vec<&str> = EntityKind::ALL.iter().map(|k| k.command()).collect();
      return Err(eyre!(
        "default_view '{}' is not one of: {}",
        self.default_view,
        names.join(", ")
      ));
    }
    if !(1..=MAX_CACHE_MINUTES).contains(&self.master_data.cache_minutes) {
      return Err(eyre!(
        "master_data.cache_minutes must be between 1 and {}",
        MAX_CACHE_MINUTES
      ));
    }
    Ok(())
  }

  /// Entity list opened at startup
  pub fn entity(&self) -> Option<EntityKind> {
    EntityKind::from_command(&self.default_view)
  }

  /// Directory for CSV exports
  pub fn export_dir(&self) -> PathBuf {
    self
      .export_dir
      .clone()
      .unwrap_or_else(|| PathBuf::from("."))
  }

  /// Directory for rolling log files
  pub fn log_dir() -> PathBuf {
    dirs::data_dir()
      .unwrap_or_else(std::env::temp_dir)
      .join("crmview")
      .join("logs")
  }

  /// Get the API token from environment variables, if any.
  ///
  /// Checks CRMVIEW_TOKEN first, then CRM_API_TOKEN as fallback.
  pub fn get_api_token() -> Option<String> {
    std::env::var("CRMVIEW_TOKEN")
      .or_else(|_| std::env::var("CRM_API_TOKEN"))
      .ok()
      .filter(|token| !token.trim().is_empty())
  }
}
