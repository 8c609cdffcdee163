use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Current-weather endpoint. Query pairs are appended directly after the `?`.
pub const DEFAULT_SERVICE_URI: &str = "http://api.openweathermap.org/data/2.5/weather?";

/// Name the service reports for San Jose, CA lookups.
pub const SAN_JOSE_NAME: &str = "San Jose";

/// Name the service reports for zip 10000 in France.
pub const TROYES_NAME: &str = "Troyes";

/// Well-formed but unregistered key, always rejected with 401.
pub const API_KEY_INVALID: &str = "0123456789abcdef0123456789abcdef";

/// Environment variable consulted for the API key when no flag is given.
pub const API_KEY_ENV: &str = "OWM_API_KEY";

/// Base URI every request URL is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    base_uri: String,
}

impl ServiceEndpoint {
    /// A base URI without a query separator gets one, so that
    /// `http://host/weather` and `http://host/weather?` behave the same.
    pub fn new(base_uri: impl Into<String>) -> Self {
        let mut base_uri = base_uri.into();
        if !base_uri.ends_with('?') && !base_uri.ends_with('&') {
            base_uri.push(if base_uri.contains('?') { '&' } else { '?' });
        }
        Self { base_uri }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }
}

impl Default for ServiceEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_URI)
    }
}

/// Settings stored on disk between runs.
///
/// Example TOML:
/// api_key = "..."
/// service_uri = "http://api.openweathermap.org/data/2.5/weather?"
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub service_uri: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-conformance", "conformance")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Pick the API key: explicit value (flag or environment) first, then
    /// the stored one, then the empty string. An empty key makes every
    /// authenticated scenario come back 401.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> String {
        explicit
            .or(self.api_key.as_deref())
            .unwrap_or_default()
            .to_string()
    }

    pub fn resolve_endpoint(&self, explicit: Option<&str>) -> ServiceEndpoint {
        explicit
            .or(self.service_uri.as_deref())
            .map(ServiceEndpoint::new)
            .unwrap_or_default()
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }
}
