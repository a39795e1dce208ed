//! Authenticated session shared by every transport

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use tokio::sync::RwLock;

use crate::error::{ApiError, Result};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9\-\.]+[a-z0-9]$").expect("static regex should not panic")
});

/// Client construction options.
///
/// # Example
/// ```ignore
/// let config = ClientConfig::new("token", "acme.runpanther.net")
///     .conversion(true)
///     .timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credential: String,
    pub domain: String,
    pub conversion_enabled: bool,
    pub timeout: Duration,
    /// Scheme and host to send requests to instead of `https://{domain}`
    pub api_base: Option<String>,
}

impl ClientConfig {
    pub fn new(credential: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            domain: domain.into(),
            conversion_enabled: false,
            timeout: DEFAULT_TIMEOUT,
            api_base: None,
        }
    }

    /// Enable or disable value conversion.
    pub fn conversion(mut self, enabled: bool) -> Self {
        self.conversion_enabled = enabled;
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the base URL (tests, proxies).
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }
}

/// Credential, domain and conversion flag for one client.
///
/// The credential sits behind a single slot holding an immutable `Arc<str>`.
/// Rotation swaps the whole value, so a request reads either the old or the
/// new credential, never a mix.
#[derive(Debug)]
pub struct Session {
    credential: RwLock<Arc<str>>,
    domain: String,
    base_url: String,
    conversion_enabled: bool,
}

impl Session {
    /// Validate the config and build a session.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        if !DOMAIN_PATTERN.is_match(&config.domain) {
            return Err(ApiError::validation(format!(
                "Invalid domain '{}'. Ensure the domain is valid, and doesn't include the \
                 transport schema (https, http). Examples of valid domains are \
                 'acme.runpanther.net', 'panther.secops.acme.com'.",
                config.domain
            ))
            .into());
        }

        let base_url = match &config.api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}", config.domain),
        };

        Ok(Self {
            credential: RwLock::new(Arc::from(config.credential.as_str())),
            domain: config.domain.clone(),
            base_url,
            conversion_enabled: config.conversion_enabled,
        })
    }

    /// Current credential.
    pub async fn credential(&self) -> Arc<str> {
        self.credential.read().await.clone()
    }

    /// Replace the credential in one step.
    pub async fn rotate(&self, credential: impl Into<String>) {
        let next: Arc<str> = Arc::from(credential.into());
        *self.credential.write().await = next;
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn conversion_enabled(&self) -> bool {
        self.conversion_enabled
    }

    /// The single GraphQL endpoint.
    pub fn graphql_url(&self) -> String {
        format!("{}/public/graphql", self.base_url)
    }

    /// URL of a REST resource.
    pub fn rest_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
