use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub store: StoreConfig,
  /// Custom title for the header (defaults to the store project id)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Hosted store project id holding the roster collection
  pub project_id: String,
  /// Database id within the project
  #[serde(default = "default_database")]
  pub database: String,
}

fn default_database() -> String {
  "(default)".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./rosterm.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/rosterm/config.yaml
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
        "No configuration file found. Create one at ~/.config/rosterm/config.yaml\n\
                 with a `store.project_id` entry."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("rosterm.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("rosterm").join("config.yaml");
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

  /// Get the store API key from environment variables.
  ///
  /// Checks ROSTERM_API_KEY first, then FIRESTORE_API_KEY as fallback.
  pub fn get_api_key() -> Result<String> {
    std::env::var("ROSTERM_API_KEY")
      .or_else(|_| std::env::var("FIRESTORE_API_KEY"))
      .map_err(|_| {
        eyre!("Store API key not found. Set ROSTERM_API_KEY or FIRESTORE_API_KEY environment variable.")
      })
  }

  /// The title shown in the header
  pub fn display_title(&self) -> &str {
    self.title.as_deref().unwrap_or(&self.store.project_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("store:\n  project_id: my-roster\n").unwrap();
    assert_eq!(config.store.project_id, "my-roster");
    assert_eq!(config.store.database, "(default)");
    assert_eq!(config.display_title(), "my-roster");
  }

  #[test]
  fn test_parse_full_config() {
    let yaml = "store:\n  project_id: my-roster\n  database: staging\ntitle: Office Members\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.store.database, "staging");
    assert_eq!(config.display_title(), "Office Members");
  }
}
