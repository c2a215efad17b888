use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// Base URL of the tracking server, e.g. "https://track.example.com".
  pub url: String,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./flowtrack.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/flowtrack/config.yaml
  /// 4. ~/.config/flowtrack/config.yaml
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
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/flowtrack/config.yaml\n\
                 with at least a server url."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("flowtrack.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("flowtrack").join("config.yaml");
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

  /// Get the API token from environment variables, if one is set.
  ///
  /// Checks FLOWTRACK_TOKEN first, then FLOWTRACK_API_TOKEN as fallback.
  /// Most read routes are open, so a missing token is not an error here;
  /// protected routes come back `success: false` from the server instead.
  pub fn api_token() -> Option<String> {
    std::env::var("FLOWTRACK_TOKEN")
      .or_else(|_| std::env::var("FLOWTRACK_API_TOKEN"))
      .ok()
  }
}
