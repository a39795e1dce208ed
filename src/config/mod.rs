//! Configuration file for the `panther` CLI

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::ClientConfig;
use crate::error::{ConfigError, Result};

/// Environment variable holding the API token
pub const ENV_API_TOKEN: &str = "PANTHER_API_TOKEN";
/// Environment variable holding the Panther domain
pub const ENV_DOMAIN: &str = "PANTHER_DOMAIN";
/// Environment variable pointing at an alternate config file
pub const ENV_CONFIG: &str = "PANTHER_CONFIG";

/// Persisted CLI settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Panther API token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Panther domain, e.g. `acme.runpanther.net`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Convert timestamp fields in output
    #[serde(default)]
    pub convert: bool,

    /// Per-request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".panther").join("config.yaml"))
    }

    /// Resolve the config path: explicit path, then `PANTHER_CONFIG`, then the default.
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => match std::env::var(ENV_CONFIG) {
                Ok(p) if !p.is_empty() => Ok(PathBuf::from(p)),
                _ => Self::default_path(),
            },
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Load from `path` (or the resolved default). A missing file is an empty config.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        match Self::load_from(Self::resolve_path(path)?) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // The token is a secret: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    /// Let `PANTHER_API_TOKEN` and `PANTHER_DOMAIN` override file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(token) = std::env::var(ENV_API_TOKEN) {
            if !token.is_empty() {
                self.api_key = Some(token);
            }
        }
        if let Ok(domain) = std::env::var(ENV_DOMAIN) {
            if !domain.is_empty() {
                self.domain = Some(domain);
            }
        }
        self
    }

    /// Validate that required configuration is present
    pub fn validate_auth(&self) -> Result<()> {
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingApiKey.into());
        }
        if self.domain.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingDomain.into());
        }
        Ok(())
    }

    /// Client options from this config. Fails when the token or domain is missing.
    pub fn client_config(&self) -> Result<ClientConfig> {
        self.validate_auth()?;
        let (Some(api_key), Some(domain)) = (&self.api_key, &self.domain) else {
            return Err(ConfigError::MissingApiKey.into());
        };

        let mut config = ClientConfig::new(api_key.clone(), domain.clone()).conversion(self.convert);
        if let Some(secs) = self.timeout_secs {
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}
