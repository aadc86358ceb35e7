use crate::error::ConfigError;
use crate::pagination::{DEFAULT_ALERTS_PAGE_SIZE, DEFAULT_MACHINES_PAGE_SIZE};
use crate::topology::{Area, Topology};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};

pub const CONFIG_PATH_ENV: &str = "FLOORWATCH_CONFIG";
pub const API_URL_ENV: &str = "FLOORWATCH_API_URL";
pub const DEFAULT_CONFIG_PATH: &str = "floorwatch.yaml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub fixture: FixtureConfig,
    pub pagination: PaginationConfig,
    /// Replaces the built-in factory layout when present
    pub areas: Option<Vec<Area>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FixtureConfig {
    pub path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PaginationConfig {
    pub alerts_page_size: NonZeroUsize,
    pub machines_page_size: NonZeroUsize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            fixture: FixtureConfig::default(),
            pagination: PaginationConfig::default(),
            areas: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            timeout_secs: 10,
        }
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/machine_data.csv"),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            alerts_page_size: DEFAULT_ALERTS_PAGE_SIZE,
            machines_page_size: DEFAULT_MACHINES_PAGE_SIZE,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DashboardConfig {
    /// Parse and validate YAML text. Empty text gives the defaults.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config = Self::parse_yaml(text)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_yaml(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "api.base_url",
                reason: format!("expected an http(s) url, got {base:?}"),
            });
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "api.timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        self.topology()?;
        Ok(())
    }

    /// Configured areas, or the default factory layout
    pub fn topology(&self) -> Result<Topology, ConfigError> {
        match &self.areas {
            Some(areas) => Ok(Topology::new(areas.clone())?),
            None => Ok(Topology::default()),
        }
    }

    fn override_api_url(&mut self, url: Option<String>) {
        if let Some(url) = url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            self.api.base_url = url.to_string();
        }
    }

    fn apply_env(&mut self) {
        self.override_api_url(std::env::var(API_URL_ENV).ok());
    }
}

/// Read the config file at `path`, then apply environment overrides.
/// A missing file is not an error.
pub async fn load_config_from(path: &Path) -> Result<DashboardConfig, ConfigError> {
    load_with_api_url(path, std::env::var(API_URL_ENV).ok()).await
}

/// Validation runs once, after the override.
async fn load_with_api_url(
    path: &Path,
    api_url: Option<String>,
) -> Result<DashboardConfig, ConfigError> {
    let mut config = if path.exists() {
        let text = fs::read_to_string(path).await?;
        DashboardConfig::parse_yaml(&text)?
    } else {
        info!(path = %path.display(), "no config file, using defaults");
        DashboardConfig::default()
    };
    config.override_api_url(api_url);
    config.validate()?;
    Ok(config)
}

/// Load from `$FLOORWATCH_CONFIG` (default `floorwatch.yaml`), with `.env` applied first.
pub async fn load_config() -> Result<DashboardConfig, ConfigError> {
    let _ = dotenvy::dotenv();
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    load_config_from(Path::new(&path)).await
}

/// Like `load_config`, but an unreadable or invalid file falls back to defaults.
pub async fn load_config_or_default() -> DashboardConfig {
    load_config().await.unwrap_or_else(|e| {
        warn!(error = %e, "invalid config, using defaults");
        let mut config = DashboardConfig::default();
        config.apply_env();
        config
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(DashboardConfig::from_yaml("").unwrap(), DashboardConfig::default());
        assert_eq!(DashboardConfig::default().api.base_url, "http://localhost:8080");
        assert_eq!(DashboardConfig::default().pagination.alerts_page_size.get(), 10);
        assert_eq!(DashboardConfig::default().pagination.machines_page_size.get(), 5);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = DashboardConfig::from_yaml(
            "api:\n  base_url: http://factory.local:9000\npagination:\n  alerts_page_size: 25\n",
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://factory.local:9000");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.pagination.alerts_page_size.get(), 25);
        assert_eq!(config.pagination.machines_page_size.get(), 5);
        assert_eq!(config.fixture.path, PathBuf::from("data/machine_data.csv"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = DashboardConfig::from_yaml("pagination:\n  machines_page_size: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = DashboardConfig::from_yaml("api:\n  base_url: localhost\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "api.base_url", .. }));

        let err = DashboardConfig::from_yaml("api:\n  timeout_secs: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "api.timeout_secs", .. }));
    }

    #[test]
    fn test_custom_topology() {
        let yaml = "areas:\n  \
            - {id: 1, name: Press, type: workspace, floor: 1}\n  \
            - {id: 1, name: Press 2, type: workspace, floor: 1}\n";
        let err = DashboardConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Topology(_)));

        let yaml = "areas:\n  - {id: 1, name: Press, type: workspace, floor: 3}\n";
        let topology = DashboardConfig::from_yaml(yaml).unwrap().topology().unwrap();
        assert_eq!(topology.floors(), vec![3]);
    }

    #[tokio::test]
    async fn test_load_from_file_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"fixture:\n  path: /tmp/other.csv\n").unwrap();

        let config = load_config_from(file.path()).await.unwrap();
        assert_eq!(config.fixture.path, PathBuf::from("/tmp/other.csv"));

        let config = load_config_from(Path::new("/nonexistent/floorwatch.yaml")).await.unwrap();
        assert_eq!(config.fixture, FixtureConfig::default());
    }

    #[tokio::test]
    async fn test_env_url_replaces_invalid_file_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"api:\n  base_url: factory.local\n").unwrap();

        let config = load_with_api_url(file.path(), Some("http://localhost:9000".into()))
            .await
            .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9000");

        let err = load_with_api_url(file.path(), None).await.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "api.base_url", .. }));

        let err = load_with_api_url(file.path(), Some("  ".into())).await.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "api.base_url", .. }));
    }
}
