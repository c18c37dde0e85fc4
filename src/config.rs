use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides `api.base_url`
pub const API_URL_ENV: &str = "TFDASH_API_URL";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  /// Custom title for header (defaults to the API host if not set)
  pub title: Option<String>,
  /// Seconds between automatic project list reloads; 0 disables
  pub refresh_secs: u64,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api: ApiConfig::default(),
      title: None,
      refresh_secs: 30,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Root of the tfwatch REST API, e.g. http://localhost:3000/api/
  pub base_url: String,
  /// Per-request timeout enforced by the HTTP transport
  pub timeout_secs: u64,
  /// Keep and resend session cookies set by the server
  pub credentials: bool,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:3000/api/".to_string(),
      timeout_secs: 30,
      credentials: false,
    }
  }
}

impl ApiConfig {
  /// Parsed base URL, normalised to end with `/`.
  pub fn base_url(&self) -> Result<Url> {
    let mut url = Url::parse(self.base_url.trim())
      .map_err(|e| eyre!("Invalid API base URL '{}': {}", self.base_url, e))?;

    if !matches!(url.scheme(), "http" | "https") {
      return Err(eyre!(
        "Invalid API base URL '{}': scheme must be http or https",
        self.base_url
      ));
    }

    if !url.path().ends_with('/') {
      let path = format!("{}/", url.path());
      url.set_path(&path);
    }

    Ok(url)
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./tfdash.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/tfdash/config.yaml
  ///
  /// Without a file, defaults are used. `TFDASH_API_URL` overrides the
  /// base URL either way.
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

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    Ok(config.with_api_url(std::env::var(API_URL_ENV).ok()))
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("tfdash.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("tfdash").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    config.api.base_url()?;
    Ok(config)
  }

  /// Replace the API base URL when an override is given.
  pub fn with_api_url(self, url: Option<String>) -> Self {
    match url.filter(|u| !u.trim().is_empty()) {
      Some(base_url) => Config {
        api: ApiConfig {
          base_url,
          ..self.api
        },
        ..self
      },
      None => self,
    }
  }

  /// Directory for log files.
  pub fn log_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("tfdash").join("logs"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(
      config.api.base_url().unwrap().as_str(),
      "http://localhost:3000/api/"
    );
    assert_eq!(config.api.timeout_secs, 30);
    assert!(!config.api.credentials);
    assert_eq!(config.refresh_secs, 30);
    assert!(config.title.is_none());
  }

  #[test]
  fn test_from_yaml() {
    let config = Config::from_yaml(
      "title: Staging\nrefresh_secs: 0\napi:\n  base_url: https://tfwatch.internal/api\n  timeout_secs: 5\n  credentials: true\n",
    )
    .unwrap();

    assert_eq!(config.title.as_deref(), Some("Staging"));
    assert_eq!(config.refresh_secs, 0);
    assert_eq!(config.api.timeout_secs, 5);
    assert!(config.api.credentials);
    assert_eq!(
      config.api.base_url().unwrap().as_str(),
      "https://tfwatch.internal/api/"
    );
  }

  #[test]
  fn test_partial_yaml_uses_defaults() {
    let config = Config::from_yaml("title: Prod\n").unwrap();
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.refresh_secs, 30);
  }

  #[test]
  fn test_invalid_base_url_is_rejected() {
    assert!(Config::from_yaml("api:\n  base_url: not a url\n").is_err());
    assert!(Config::from_yaml("api:\n  base_url: ftp://example.com/\n").is_err());
  }

  #[test]
  fn test_api_url_override() {
    let config = Config::default().with_api_url(Some("http://10.0.0.5:3000/api".into()));
    assert_eq!(config.api.base_url, "http://10.0.0.5:3000/api");
    assert_eq!(config.api.timeout_secs, 30);

    let config = Config::default().with_api_url(Some("  ".into()));
    assert_eq!(config.api.base_url, "http://localhost:3000/api/");
  }

  #[test]
  fn test_missing_explicit_path() {
    let err = Config::load(Some(Path::new("/nonexistent/tfdash.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
