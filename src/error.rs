//! Error types for the Panther client

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::api::TestResult;

/// Result type alias for Panther client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the library
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The API error behind this error, if any.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    /// Human-readable error message.
    pub message: String,

    /// Path within the response where the error occurred.
    #[serde(default)]
    pub path: Vec<PathSegment>,

    /// Extensions metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

/// GraphQL response path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Field name.
    Key(String),
    /// Array index.
    Index(i64),
}

/// How a failed GraphQL call should be read by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphqlFailure {
    /// The requested entity does not exist.
    NotFound(String),
    /// The API token may not call the named method.
    AccessDenied { method: String },
    /// Any other server-reported failure.
    Other,
}

/// API-related errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response ({reason}): {body}")]
    Decode { reason: String, body: String },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("GraphQL error: {}", join_messages(.0))]
    Graphql(Vec<GraphqlError>),

    #[error("Invalid request: {0}")]
    Validation(String),

    /// Panther refused to save a rule because its unit tests failed.
    #[error("Cannot save rule {id}; failing unit tests: {}", failed_names(.results))]
    FailingTests { id: String, results: Vec<TestResult> },
}

fn failed_names(results: &[TestResult]) -> String {
    results
        .iter()
        .filter(|r| r.failed())
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_messages(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ApiError {
    /// Shorthand for a validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    /// Server-provided messages of a GraphQL failure.
    pub fn messages(&self) -> Vec<&str> {
        match self {
            ApiError::Graphql(errors) => errors.iter().map(|e| e.message.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Classify a GraphQL failure. Returns `None` for every other kind.
    pub fn graphql_failure(&self) -> Option<GraphqlFailure> {
        let ApiError::Graphql(errors) = self else {
            return None;
        };

        for err in errors {
            let msg = err.message.as_str();
            if msg.ends_with("does not exist") || msg.ends_with("not found") {
                return Some(GraphqlFailure::NotFound(msg.to_string()));
            }
            if msg == "access denied" {
                let method = match err.path.last() {
                    Some(PathSegment::Key(name)) => name.clone(),
                    _ => "<UNKNOWN_METHOD>".to_string(),
                };
                return Some(GraphqlFailure::AccessDenied { method });
            }
        }
        Some(GraphqlFailure::Other)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `panther init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("API token not configured. Run `panther init` or set PANTHER_API_TOKEN.")]
    MissingApiKey,

    #[error("Panther domain not configured. Run `panther init` or set PANTHER_DOMAIN.")]
    MissingDomain,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
